// File: crates/evolution-render-skia/src/lib.rs
// Summary: Headless rasterization of resolved chart frames using Skia CPU raster surfaces.

pub mod text;
pub mod theme;

use anyhow::{Context, Result};
use evolution_core::{Color, Frame, Paint, Path, PathCommand, ResolvedTick};
use skia_safe as skia;

pub use text::{Anchor, TextShaper};
pub use theme::Theme;

/// Length of axis tick marks in pixels.
const TICK_SIZE: f32 = 6.0;
/// Gap between a tick mark and its label.
const TICK_PADDING: f32 = 3.0;
const TICK_FONT_PX: f32 = 10.0;
const TITLE_FONT_PX: f32 = 14.0;
const LABEL_FONT_PX: f32 = 12.0;
/// Stroke width of line series.
const LINE_WIDTH: f32 = 2.0;

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub theme: Theme,
    /// Text is skipped when false, which keeps output identical across font setups.
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { theme: Theme::default(), draw_labels: true }
    }
}

/// Render `frame` to a PNG at `output_png_path`.
pub fn render_to_png(frame: &Frame, opts: &RenderOptions, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
    let output_png_path = output_png_path.as_ref();
    let bytes = render_to_png_bytes(frame, opts)?;
    if let Some(parent) = output_png_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    std::fs::write(output_png_path, &bytes).with_context(|| format!("writing {}", output_png_path.display()))?;
    tracing::debug!(path = %output_png_path.display(), bytes = bytes.len(), "png written");
    Ok(())
}

/// Render `frame` and return the encoded PNG.
pub fn render_to_png_bytes(frame: &Frame, opts: &RenderOptions) -> Result<Vec<u8>> {
    let mut surface = rasterize(frame, opts)?;
    let image = surface.image_snapshot();
    #[allow(deprecated)]
    let data = image
        .encode_to_data(skia::EncodedImageFormat::PNG)
        .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
    Ok(data.as_bytes().to_vec())
}

/// Render `frame` into an unpremultiplied RGBA8 buffer.
/// Returns `(pixels, width, height, stride)`.
pub fn render_to_rgba8(frame: &Frame, opts: &RenderOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
    let mut surface = rasterize(frame, opts)?;
    let (w, h) = (frame.width, frame.height);
    let info = skia::ImageInfo::new(
        (w as i32, h as i32),
        skia::ColorType::RGBA8888,
        skia::AlphaType::Unpremul,
        None,
    );
    let stride = w as usize * 4;
    let mut pixels = vec![0u8; stride * h as usize];
    if !surface.canvas().read_pixels(&info, &mut pixels, stride, (0, 0)) {
        anyhow::bail!("reading back {w}x{h} pixels failed");
    }
    Ok((pixels, w, h, stride))
}

fn rasterize(frame: &Frame, opts: &RenderOptions) -> Result<skia::Surface> {
    let (w, h) = (frame.width as i32, frame.height as i32);
    let mut surface = skia::surfaces::raster_n32_premul((w, h))
        .ok_or_else(|| anyhow::anyhow!("failed to create {w}x{h} raster surface"))?;
    let text = opts.draw_labels.then(TextShaper::new);
    draw_frame(surface.canvas(), frame, &opts.theme, text.as_ref());
    tracing::trace!(
        width = w,
        height = h,
        series = frame.series.len(),
        null_regions = frame.null_regions.len(),
        "frame rasterized"
    );
    Ok(surface)
}

/// Paint one frame onto `canvas`. Text is drawn only when a shaper is given.
pub fn draw_frame(canvas: &skia::Canvas, frame: &Frame, theme: &Theme, text: Option<&TextShaper>) {
    canvas.clear(theme.background);

    canvas.save();
    canvas.translate((frame.plot.x, frame.plot.y));
    draw_grid(canvas, frame, theme);
    for region in &frame.null_regions {
        let paint = fill_paint(fade(theme.null_region, region.opacity));
        canvas.draw_path(&to_skia_path(&region.path), &paint);
    }
    for s in &frame.series {
        let color = with_opacity(s.color, s.opacity);
        let paint = match s.paint {
            Paint::Fill => fill_paint(color),
            Paint::Stroke => stroke_paint(color, LINE_WIDTH),
        };
        canvas.draw_path(&to_skia_path(&s.path), &paint);
    }
    draw_axes(canvas, frame, theme, text);
    if let Some(text) = text {
        let label = &frame.y_label;
        let color = fade(theme.axis_label, label.opacity);
        text.draw(canvas, &label.text, label.pos.x, label.pos.y, LABEL_FONT_PX, color, Anchor::Start, false);
    }
    canvas.restore();

    for item in &frame.legend {
        let fill = with_opacity(item.color, item.fill_opacity);
        canvas.draw_circle((item.center.x, item.center.y), item.radius, &fill_paint(fill));
        canvas.draw_circle((item.center.x, item.center.y), item.radius, &stroke_paint(to_skia(item.color), 1.0));
        if let Some(text) = text {
            let baseline = item.label_pos.y + 0.3 * LABEL_FONT_PX;
            text.draw(canvas, &item.label, item.label_pos.x, baseline, LABEL_FONT_PX, theme.axis_label, Anchor::Start, false);
        }
    }

    if let Some(text) = text {
        let a = frame.title_anchor;
        let heading = match (frame.title.is_empty(), frame.time_range.is_empty()) {
            (true, _) => frame.time_range.clone(),
            (false, true) => frame.title.clone(),
            (false, false) => format!("{} {}", frame.title, frame.time_range),
        };
        text.draw(canvas, &heading, a.x, a.y, TITLE_FONT_PX, theme.title, Anchor::Middle, true);
    }
}

fn draw_grid(canvas: &skia::Canvas, frame: &Frame, theme: &Theme) {
    let (w, h) = (frame.plot.w, frame.plot.h);
    for t in &frame.x_ticks {
        canvas.draw_line((t.pos, 0.0), (t.pos, h), &stroke_paint(fade(theme.grid, t.opacity), 1.0));
    }
    for t in &frame.y_ticks {
        canvas.draw_line((0.0, t.pos), (w, t.pos), &stroke_paint(fade(theme.grid, t.opacity), 1.0));
    }
}

fn draw_axes(canvas: &skia::Canvas, frame: &Frame, theme: &Theme, text: Option<&TextShaper>) {
    let (w, h) = (frame.plot.w, frame.plot.h);
    let axis = stroke_paint(theme.axis_line, 1.0);
    canvas.draw_line((0.0, h), (w, h), &axis);
    canvas.draw_line((0.0, 0.0), (0.0, h), &axis);

    for t in &frame.x_ticks {
        canvas.draw_line((t.pos, h), (t.pos, h + TICK_SIZE), &stroke_paint(fade(theme.tick, t.opacity), 1.0));
        if let Some(text) = text {
            let baseline = h + TICK_SIZE + TICK_PADDING + TICK_FONT_PX;
            let color = fade(theme.axis_label, t.opacity);
            text.draw(canvas, &t.label, t.pos, baseline, TICK_FONT_PX, color, Anchor::Middle, false);
        }
    }
    let zero = std::iter::once(&frame.zero_tick);
    for t in frame.y_ticks.iter().chain(zero) {
        draw_y_tick(canvas, t, theme, text);
    }
}

fn draw_y_tick(canvas: &skia::Canvas, t: &ResolvedTick, theme: &Theme, text: Option<&TextShaper>) {
    canvas.draw_line((-TICK_SIZE, t.pos), (0.0, t.pos), &stroke_paint(fade(theme.tick, t.opacity), 1.0));
    if let Some(text) = text {
        let baseline = t.pos + 0.32 * TICK_FONT_PX;
        let color = fade(theme.axis_label, t.opacity);
        text.draw(canvas, &t.label, -(TICK_SIZE + TICK_PADDING), baseline, TICK_FONT_PX, color, Anchor::End, false);
    }
}

// ---- helpers ----------------------------------------------------------------

fn fill_paint(color: skia::Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(color);
    paint
}

fn stroke_paint(color: skia::Color, width: f32) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width);
    paint.set_color(color);
    paint
}

pub fn to_skia(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn with_opacity(c: Color, opacity: f32) -> skia::Color {
    fade(to_skia(c), opacity)
}

/// Scale the alpha channel of `c` by `opacity` (clamped to `[0, 1]`).
fn fade(c: skia::Color, opacity: f32) -> skia::Color {
    let a = (c.a() as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    c.with_a(a)
}

/// Convert backend-independent path commands to a Skia path.
pub fn to_skia_path(path: &Path) -> skia::Path {
    let mut out = skia::Path::new();
    for cmd in &path.commands {
        match *cmd {
            PathCommand::MoveTo(p) => { out.move_to((p.x, p.y)); }
            PathCommand::LineTo(p) => { out.line_to((p.x, p.y)); }
            PathCommand::CubicTo(c1, c2, p) => { out.cubic_to((c1.x, c1.y), (c2.x, c2.y), (p.x, p.y)); }
            PathCommand::Close => { out.close(); }
        }
    }
    out
}
