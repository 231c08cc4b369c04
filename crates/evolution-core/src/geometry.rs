// File: crates/evolution-core/src/geometry.rs
// Summary: Path commands, line/area generators over defined runs, and pixel hit-testing helpers.

use crate::curve::Curve;
use crate::types::Point;

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self { Self { x, y, w, h } }
    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// Retained vector path, backend independent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self { Self::default() }

    pub fn move_to(&mut self, p: Point) { self.commands.push(PathCommand::MoveTo(p)); }
    pub fn line_to(&mut self, p: Point) { self.commands.push(PathCommand::LineTo(p)); }
    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) { self.commands.push(PathCommand::CubicTo(c1, c2, p)); }
    pub fn close(&mut self) { self.commands.push(PathCommand::Close); }

    pub fn is_empty(&self) -> bool { self.commands.is_empty() }

    /// True when both paths have the same command sequence (coordinates may differ).
    pub fn same_structure(&self, other: &Path) -> bool {
        self.commands.len() == other.commands.len()
            && self.commands.iter().zip(&other.commands).all(|(a, b)| std::mem::discriminant(a) == std::mem::discriminant(b))
    }

    /// Point-wise interpolation between two paths of identical structure.
    /// Mismatched structures resolve to `to` as soon as `t > 0`.
    pub fn lerp(from: &Path, to: &Path, t: f32) -> Path {
        if t >= 1.0 || !from.same_structure(to) {
            return if t <= 0.0 { from.clone() } else { to.clone() };
        }
        let commands = from
            .commands
            .iter()
            .zip(&to.commands)
            .map(|(a, b)| match (*a, *b) {
                (PathCommand::MoveTo(p), PathCommand::MoveTo(q)) => PathCommand::MoveTo(p.lerp(q, t)),
                (PathCommand::LineTo(p), PathCommand::LineTo(q)) => PathCommand::LineTo(p.lerp(q, t)),
                (PathCommand::CubicTo(a1, a2, ap), PathCommand::CubicTo(b1, b2, bp)) => {
                    PathCommand::CubicTo(a1.lerp(b1, t), a2.lerp(b2, t), ap.lerp(bp, t))
                }
                _ => PathCommand::Close,
            })
            .collect();
        Path { commands }
    }

    /// Flatten into polylines, one per subpath. Cubics are sampled uniformly.
    pub fn flatten(&self, steps_per_cubic: usize) -> Vec<Vec<Point>> {
        let steps = steps_per_cubic.max(1);
        let mut out: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 { out.push(std::mem::take(&mut current)); }
                    current.clear();
                    current.push(p);
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::CubicTo(c1, c2, p) => {
                    let p0 = current.last().copied().unwrap_or(p);
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        current.push(cubic_point(p0, c1, c2, p, t));
                    }
                }
                PathCommand::Close => {
                    if let Some(&first) = current.first() { current.push(first); }
                }
            }
        }
        if current.len() > 1 { out.push(current); }
        out
    }

    /// Even-odd containment test against the flattened path.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for poly in self.flatten(8) {
            let n = poly.len();
            for i in 0..n {
                let a = poly[i];
                let b = poly[(i + 1) % n];
                if (a.y > p.y) != (b.y > p.y) {
                    let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                    if p.x < x { inside = !inside; }
                }
            }
        }
        inside
    }

    /// Shortest distance from `p` to the flattened stroke.
    pub fn distance_to(&self, p: Point) -> f32 {
        self.flatten(8)
            .iter()
            .flat_map(|poly| poly.windows(2).map(|w| segment_distance(p, w[0], w[1])))
            .fold(f32::INFINITY, f32::min)
    }
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p.x,
        a * p0.y + b * c1.y + c * c2.y + d * p.y,
    )
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 <= f32::EPSILON { return p.distance(a); }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// One plotted sample in plot-local pixels. `y0` is the area baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub y0: f32,
    pub defined: bool,
}

/// Maximal runs of consecutive defined vertices.
fn defined_runs(vertices: &[Vertex]) -> impl Iterator<Item = &[Vertex]> {
    vertices.split(|v| !v.defined).filter(|run| !run.is_empty())
}

/// Stroke geometry: each defined run traced separately, gaps left open.
pub fn line_path(vertices: &[Vertex], curve: Curve) -> Path {
    let mut path = Path::new();
    for run in defined_runs(vertices) {
        let tops: Vec<Point> = run.iter().map(|v| Point::new(v.x, v.y)).collect();
        curve.trace(&tops, false, &mut path);
    }
    path
}

/// Fill geometry between `y0` and `y` for each defined run: top edge forward,
/// baseline backward, closed.
pub fn area_path(vertices: &[Vertex], curve: Curve) -> Path {
    let mut path = Path::new();
    for run in defined_runs(vertices) {
        let tops: Vec<Point> = run.iter().map(|v| Point::new(v.x, v.y)).collect();
        let bases: Vec<Point> = run.iter().rev().map(|v| Point::new(v.x, v.y0)).collect();
        let start = path.commands.len();
        curve.trace(&tops, false, &mut path);
        curve.trace(&bases, path.commands.len() > start, &mut path);
        if path.commands.len() > start { path.close(); }
    }
    path
}
