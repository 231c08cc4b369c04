// File: crates/evolution-core/src/curve.rs
// Summary: The fixed set of interpolation curves and their path tracing algorithms.

use std::fmt;
use std::str::FromStr;

use crate::error::ChartError;
use crate::geometry::Path;
use crate::types::Point;

/// Interpolation algorithm connecting consecutive plotted points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Curve {
    #[default]
    Linear,
    Step,
    StepBefore,
    StepAfter,
    MonotoneX,
    Basis,
    BasisOpen,
    Bundle,
    Cardinal,
    CardinalOpen,
    CatmullRom,
    CatmullRomOpen,
    Natural,
}

const BUNDLE_BETA: f32 = 0.85;
const CARDINAL_TENSION: f32 = 0.0;
const CATMULL_ROM_ALPHA: f32 = 0.5;
const EPSILON: f32 = 1e-12;

impl Curve {
    pub const ALL: [Curve; 13] = [
        Curve::Linear,
        Curve::Step,
        Curve::StepBefore,
        Curve::StepAfter,
        Curve::MonotoneX,
        Curve::Basis,
        Curve::BasisOpen,
        Curve::Bundle,
        Curve::Cardinal,
        Curve::CardinalOpen,
        Curve::CatmullRom,
        Curve::CatmullRomOpen,
        Curve::Natural,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Curve::Linear => "curveLinear",
            Curve::Step => "curveStep",
            Curve::StepBefore => "curveStepBefore",
            Curve::StepAfter => "curveStepAfter",
            Curve::MonotoneX => "curveMonotoneX",
            Curve::Basis => "curveBasis",
            Curve::BasisOpen => "curveBasisOpen",
            Curve::Bundle => "curveBundle",
            Curve::Cardinal => "curveCardinal",
            Curve::CardinalOpen => "curveCardinalOpen",
            Curve::CatmullRom => "curveCatmullRom",
            Curve::CatmullRomOpen => "curveCatmullRomOpen",
            Curve::Natural => "curveNatural",
        }
    }

    /// Append the curve through `pts` to `out`. When `join` is set the first
    /// emitted point connects to the current subpath instead of starting a new one.
    pub fn trace(self, pts: &[Point], join: bool, out: &mut Path) {
        match self {
            Curve::Linear => linear(pts, join, out),
            Curve::Step => step(pts, 0.5, join, out),
            Curve::StepBefore => step(pts, 0.0, join, out),
            Curve::StepAfter => step(pts, 1.0, join, out),
            Curve::MonotoneX => {
                let mut m = Monotone::new(join, out);
                for &p in pts { m.point(p); }
                m.end();
            }
            Curve::Basis => basis(pts, join, out),
            Curve::BasisOpen => basis_open(pts, join, out),
            Curve::Bundle => bundle(pts, join, out),
            Curve::Cardinal => cardinal(pts, join, out),
            Curve::CardinalOpen => cardinal_open(pts, join, out),
            Curve::CatmullRom | Curve::CatmullRomOpen => {
                let mut c = CatmullRom::new(self == Curve::CatmullRomOpen, join, out);
                for &p in pts { c.point(p); }
                c.end();
            }
            Curve::Natural => natural(pts, join, out),
        }
    }
}

impl FromStr for Curve {
    type Err = ChartError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Curve::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| ChartError::UnknownCurve(s.to_string()))
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[inline]
fn start(out: &mut Path, p: Point, join: bool) {
    if join { out.line_to(p) } else { out.move_to(p) }
}

#[inline]
fn pt(x: f32, y: f32) -> Point { Point::new(x, y) }

fn linear(pts: &[Point], join: bool, out: &mut Path) {
    let Some((&first, rest)) = pts.split_first() else { return };
    start(out, first, join);
    for &p in rest { out.line_to(p); }
}

/// `t` = 0 steps at the previous x, 1 at the next x, 0.5 midway.
fn step(pts: &[Point], t: f32, join: bool, out: &mut Path) {
    let Some(&first) = pts.first() else { return };
    start(out, first, join);
    for w in pts.windows(2) {
        let (a, b) = (w[0], w[1]);
        if t <= 0.0 {
            out.line_to(pt(a.x, b.y));
            out.line_to(b);
        } else {
            let x1 = a.x * (1.0 - t) + b.x * t;
            out.line_to(pt(x1, a.y));
            out.line_to(pt(x1, b.y));
        }
    }
    if t > 0.0 && t < 1.0 && pts.len() >= 2 {
        out.line_to(pts[pts.len() - 1]);
    }
}

fn basis_segment(out: &mut Path, p0: Point, p1: Point, p: Point) {
    out.cubic_to(
        pt((2.0 * p0.x + p1.x) / 3.0, (2.0 * p0.y + p1.y) / 3.0),
        pt((p0.x + 2.0 * p1.x) / 3.0, (p0.y + 2.0 * p1.y) / 3.0),
        pt((p0.x + 4.0 * p1.x + p.x) / 6.0, (p0.y + 4.0 * p1.y + p.y) / 6.0),
    );
}

fn basis(pts: &[Point], join: bool, out: &mut Path) {
    let n = pts.len();
    if n == 0 { return; }
    start(out, pts[0], join);
    match n {
        1 => {}
        2 => out.line_to(pts[1]),
        _ => {
            out.line_to(pt((5.0 * pts[0].x + pts[1].x) / 6.0, (5.0 * pts[0].y + pts[1].y) / 6.0));
            for i in 2..n {
                basis_segment(out, pts[i - 2], pts[i - 1], pts[i]);
            }
            basis_segment(out, pts[n - 2], pts[n - 1], pts[n - 1]);
            out.line_to(pts[n - 1]);
        }
    }
}

fn basis_open(pts: &[Point], join: bool, out: &mut Path) {
    let n = pts.len();
    if n < 3 { return; }
    let (a, b, c) = (pts[0], pts[1], pts[2]);
    start(out, pt((a.x + 4.0 * b.x + c.x) / 6.0, (a.y + 4.0 * b.y + c.y) / 6.0), join);
    for i in 3..n {
        basis_segment(out, pts[i - 2], pts[i - 1], pts[i]);
    }
}

/// Basis spline through points pulled toward the chord by `1 - beta`.
fn bundle(pts: &[Point], join: bool, out: &mut Path) {
    let n = pts.len();
    if n < 2 { return; }
    let j = (n - 1) as f32;
    let (p0, pj) = (pts[0], pts[n - 1]);
    let (dx, dy) = (pj.x - p0.x, pj.y - p0.y);
    let straightened: Vec<Point> = pts
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let t = i as f32 / j;
            pt(
                BUNDLE_BETA * p.x + (1.0 - BUNDLE_BETA) * (p0.x + t * dx),
                BUNDLE_BETA * p.y + (1.0 - BUNDLE_BETA) * (p0.y + t * dy),
            )
        })
        .collect();
    basis(&straightened, join, out);
}

fn cardinal_segment(out: &mut Path, x0: Point, x1: Point, x2: Point, x: Point) {
    let k = (1.0 - CARDINAL_TENSION) / 6.0;
    out.cubic_to(
        pt(x1.x + k * (x2.x - x0.x), x1.y + k * (x2.y - x0.y)),
        pt(x2.x + k * (x1.x - x.x), x2.y + k * (x1.y - x.y)),
        x2,
    );
}

fn cardinal(pts: &[Point], join: bool, out: &mut Path) {
    let n = pts.len();
    if n == 0 { return; }
    start(out, pts[0], join);
    match n {
        1 => {}
        2 => out.line_to(pts[1]),
        _ => {
            // The first segment mirrors its outer neighbour, giving a zero start tangent.
            for i in 2..n {
                let x0 = if i == 2 { pts[1] } else { pts[i - 3] };
                cardinal_segment(out, x0, pts[i - 2], pts[i - 1], pts[i]);
            }
            cardinal_segment(out, pts[n - 3], pts[n - 2], pts[n - 1], pts[n - 2]);
        }
    }
}

fn cardinal_open(pts: &[Point], join: bool, out: &mut Path) {
    let n = pts.len();
    if n < 3 { return; }
    start(out, pts[1], join);
    for i in 3..n {
        cardinal_segment(out, pts[i - 3], pts[i - 2], pts[i - 1], pts[i]);
    }
}

/// Centripetal Catmull–Rom, incremental so chord lengths carry between points.
struct CatmullRom<'a> {
    out: &'a mut Path,
    open: bool,
    join: bool,
    p0: Point,
    p1: Point,
    p2: Point,
    l01_a: f32,
    l12_a: f32,
    l23_a: f32,
    l01_2a: f32,
    l12_2a: f32,
    l23_2a: f32,
    count: u8,
}

impl<'a> CatmullRom<'a> {
    fn new(open: bool, join: bool, out: &'a mut Path) -> Self {
        let nan = pt(f32::NAN, f32::NAN);
        Self {
            out, open, join,
            p0: nan, p1: nan, p2: nan,
            l01_a: 0.0, l12_a: 0.0, l23_a: 0.0,
            l01_2a: 0.0, l12_2a: 0.0, l23_2a: 0.0,
            count: 0,
        }
    }

    fn segment(&mut self, p: Point) {
        let (mut c1, mut c2) = (self.p1, self.p2);
        if self.l01_a > EPSILON {
            let a = 2.0 * self.l01_2a + 3.0 * self.l01_a * self.l12_a + self.l12_2a;
            let n = 3.0 * self.l01_a * (self.l01_a + self.l12_a);
            c1 = pt(
                (self.p1.x * a - self.p0.x * self.l12_2a + self.p2.x * self.l01_2a) / n,
                (self.p1.y * a - self.p0.y * self.l12_2a + self.p2.y * self.l01_2a) / n,
            );
        }
        if self.l23_a > EPSILON {
            let b = 2.0 * self.l23_2a + 3.0 * self.l23_a * self.l12_a + self.l12_2a;
            let m = 3.0 * self.l23_a * (self.l23_a + self.l12_a);
            c2 = pt(
                (self.p2.x * b + self.p1.x * self.l23_2a - p.x * self.l12_2a) / m,
                (self.p2.y * b + self.p1.y * self.l23_2a - p.y * self.l12_2a) / m,
            );
        }
        self.out.cubic_to(c1, c2, self.p2);
    }

    fn point(&mut self, p: Point) {
        if self.count > 0 {
            let (dx, dy) = (self.p2.x - p.x, self.p2.y - p.y);
            self.l23_2a = (dx * dx + dy * dy).powf(CATMULL_ROM_ALPHA);
            self.l23_a = self.l23_2a.sqrt();
        }
        match (self.open, self.count) {
            (false, 0) => { self.count = 1; start(self.out, p, self.join); }
            (false, 1) => self.count = 2,
            (false, 2) => { self.count = 3; self.segment(p); }
            (true, 0) => self.count = 1,
            (true, 1) => self.count = 2,
            (true, 2) => { self.count = 3; start(self.out, self.p2, self.join); }
            (true, 3) => { self.count = 4; self.segment(p); }
            _ => self.segment(p),
        }
        self.l01_a = self.l12_a;
        self.l12_a = self.l23_a;
        self.l01_2a = self.l12_2a;
        self.l12_2a = self.l23_2a;
        self.p0 = self.p1;
        self.p1 = self.p2;
        self.p2 = p;
    }

    fn end(&mut self) {
        if self.open { return; }
        match self.count {
            2 => self.out.line_to(self.p2),
            3 => { let last = self.p2; self.point(last); }
            _ => {}
        }
    }
}

/// Monotone cubic interpolation in x (Steffen), skipping coincident points.
struct Monotone<'a> {
    out: &'a mut Path,
    join: bool,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    t0: f32,
    count: u8,
}

impl<'a> Monotone<'a> {
    fn new(join: bool, out: &'a mut Path) -> Self {
        Self { out, join, x0: f32::NAN, y0: f32::NAN, x1: f32::NAN, y1: f32::NAN, t0: f32::NAN, count: 0 }
    }

    fn sign(v: f32) -> f32 { if v < 0.0 { -1.0 } else { 1.0 } }

    fn slope3(&self, x2: f32, y2: f32) -> f32 {
        let h0 = self.x1 - self.x0;
        let h1 = x2 - self.x1;
        let den = |h: f32, neg: bool| if h != 0.0 { h } else if neg { -0.0 } else { 0.0 };
        let s0 = (self.y1 - self.y0) / den(h0, h1 < 0.0);
        let s1 = (y2 - self.y1) / den(h1, h0 < 0.0);
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        if s0.is_nan() || s1.is_nan() || p.is_nan() { return 0.0; }
        let r = (Self::sign(s0) + Self::sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        if r.is_nan() { 0.0 } else { r }
    }

    fn slope2(&self, t: f32) -> f32 {
        let h = self.x1 - self.x0;
        if h != 0.0 { (3.0 * (self.y1 - self.y0) / h - t) / 2.0 } else { t }
    }

    fn segment(&mut self, t0: f32, t1: f32) {
        let dx = (self.x1 - self.x0) / 3.0;
        self.out.cubic_to(
            pt(self.x0 + dx, self.y0 + dx * t0),
            pt(self.x1 - dx, self.y1 - dx * t1),
            pt(self.x1, self.y1),
        );
    }

    fn point(&mut self, p: Point) {
        if p.x == self.x1 && p.y == self.y1 { return; }
        let mut t1 = f32::NAN;
        match self.count {
            0 => { self.count = 1; start(self.out, p, self.join); }
            1 => self.count = 2,
            2 => {
                self.count = 3;
                t1 = self.slope3(p.x, p.y);
                let t0 = self.slope2(t1);
                self.segment(t0, t1);
            }
            _ => {
                t1 = self.slope3(p.x, p.y);
                self.segment(self.t0, t1);
            }
        }
        self.x0 = self.x1;
        self.x1 = p.x;
        self.y0 = self.y1;
        self.y1 = p.y;
        self.t0 = t1;
    }

    fn end(&mut self) {
        match self.count {
            2 => self.out.line_to(pt(self.x1, self.y1)),
            3 => {
                let t0 = self.t0;
                let t1 = self.slope2(t0);
                self.segment(t0, t1);
            }
            _ => {}
        }
    }
}

/// First and second Bézier control coordinates of a natural cubic spline (Thomas algorithm).
fn natural_controls(x: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let n = x.len() - 1;
    let mut a = vec![0.0f32; n];
    let mut b = vec![0.0f32; n];
    let mut r = vec![0.0f32; n];
    a[0] = 0.0;
    b[0] = 2.0;
    r[0] = x[0] + 2.0 * x[1];
    for i in 1..n.saturating_sub(1) {
        a[i] = 1.0;
        b[i] = 4.0;
        r[i] = 4.0 * x[i] + 2.0 * x[i + 1];
    }
    a[n - 1] = 2.0;
    b[n - 1] = 7.0;
    r[n - 1] = 8.0 * x[n - 1] + x[n];
    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m;
        r[i] -= m * r[i - 1];
    }
    a[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n.saturating_sub(1)).rev() {
        a[i] = (r[i] - a[i + 1]) / b[i];
    }
    b[n - 1] = (x[n] + a[n - 1]) / 2.0;
    for i in 0..n.saturating_sub(1) {
        b[i] = 2.0 * x[i + 1] - a[i + 1];
    }
    (a, b)
}

fn natural(pts: &[Point], join: bool, out: &mut Path) {
    let n = pts.len();
    if n == 0 { return; }
    start(out, pts[0], join);
    if n == 1 { return; }
    if n == 2 {
        out.line_to(pts[1]);
        return;
    }
    let xs: Vec<f32> = pts.iter().map(|p| p.x).collect();
    let ys: Vec<f32> = pts.iter().map(|p| p.y).collect();
    let (ax, bx) = natural_controls(&xs);
    let (ay, by) = natural_controls(&ys);
    for i in 0..n - 1 {
        out.cubic_to(pt(ax[i], ay[i]), pt(bx[i], by[i]), pts[i + 1]);
    }
}
