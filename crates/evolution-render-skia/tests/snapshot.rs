// File: crates/evolution-render-skia/tests/snapshot.rs
// Purpose: Golden snapshot harness with bless flow.
// Behavior:
// - Renders small deterministic charts to PNG bytes without text.
// - If env UPDATE_SNAPSHOTS=1, (re)writes the snapshot file.
// - Else, if the snapshot exists, compares decoded pixels for an exact match.
// - Else, logs a note and returns (skips) without failing to ease first run.
// - Pixel checks against series colors run regardless of goldens.

use evolution_core::{Chart, Dataset, Hit, PartialOptions, Point, Sample, SeriesKey, CATEGORY10};
use evolution_render_skia::{render_to_png_bytes, render_to_rgba8, RenderOptions};

fn bless_mode() -> bool {
    std::env::var("UPDATE_SNAPSHOTS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

fn write_or_compare(name: &str, bytes: &[u8]) {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/__snapshots__").join(name);
    if bless_mode() {
        if let Some(parent) = path.parent() { std::fs::create_dir_all(parent).ok(); }
        std::fs::write(&path, bytes).expect("write snapshot");
        eprintln!("[snapshot] Updated {} ({} bytes)", path.display(), bytes.len());
        return;
    }
    if path.exists() {
        let want = std::fs::read(&path).expect("read snapshot");
        // Compare decoded pixel buffers to avoid PNG encoder variance
        let got_img = image::load_from_memory(bytes).expect("decode got").to_rgba8();
        let want_img = image::load_from_memory(&want).expect("decode want").to_rgba8();
        assert_eq!(got_img.dimensions(), want_img.dimensions());
        assert_eq!(got_img.as_raw(), want_img.as_raw(), "Pixels differ: {}", path.display());
    } else {
        eprintln!("[snapshot] Missing {}; set UPDATE_SNAPSHOTS=1 to bless.", path.display());
    }
}

fn golden_chart(opts: &str) -> Chart {
    let mut chart = Chart::new("golden", &PartialOptions::from_json(opts).unwrap()).unwrap();
    chart.set_data(Dataset::from(vec![
        vec![Sample::value(0.0, 1.0), Sample::value(60.0, 2.0), Sample::gap(120.0), Sample::value(180.0, 0.0)],
        vec![Sample::value(0.0, 3.0), Sample::value(60.0, 4.0), Sample::value(120.0, 5.0), Sample::value(180.0, 2.0)],
    ]));
    chart.settle();
    chart
}

fn no_text() -> RenderOptions {
    RenderOptions { draw_labels: false, ..RenderOptions::default() }
}

fn render_bytes(opts: &str) -> Vec<u8> {
    render_to_png_bytes(&golden_chart(opts).frame(), &no_text()).expect("render bytes")
}

/// Surface pixel well inside series `index`: it and its neighbours 3 px away all hit that series.
fn interior_of(chart: &Chart, index: usize) -> (u32, u32) {
    let frame = chart.frame();
    let key = Hit::Series(SeriesKey::Index(index));
    let (x0, y0) = (frame.plot.x as u32 + 4, frame.plot.y as u32 + 4);
    let (x1, y1) = (frame.plot.right() as u32 - 4, frame.plot.bottom() as u32 - 4);
    for y in y0..y1 {
        for x in x0..x1 {
            let inside = [(0.5, 0.5), (3.5, 0.5), (-2.5, 0.5), (0.5, 3.5), (0.5, -2.5)]
                .iter()
                .all(|(dx, dy)| frame.hit_test(Point::new(x as f32 + dx, y as f32 + dy)).as_ref() == Some(&key));
            if inside {
                return (x, y);
            }
        }
    }
    panic!("series {index} covers no interior pixel");
}

fn pixel(px: &[u8], stride: usize, (x, y): (u32, u32)) -> [u8; 4] {
    let i = y as usize * stride + x as usize * 4;
    [px[i], px[i + 1], px[i + 2], px[i + 3]]
}

#[test]
fn golden_stacked_area() {
    write_or_compare("stacked_area.png", &render_bytes(r#"{"type": "area", "width": 320, "height": 200}"#));
}

#[test]
fn golden_log_lines() {
    let bytes = render_bytes(r#"{"yScale": "log", "interpolate": "curveStepAfter", "width": 320, "height": 200}"#);
    write_or_compare("log_lines.png", &bytes);
}

#[test]
fn decoded_output_matches_frame_size() {
    let bytes = render_bytes(r#"{"width": 300, "height": 150}"#);
    let img = image::load_from_memory(&bytes).expect("decode").to_rgba8();
    assert_eq!(img.dimensions(), (300, 150));
}

#[test]
fn area_pixels_follow_series_visibility() {
    let mut chart = golden_chart(r#"{"type": "area", "width": 320, "height": 200}"#);
    let at = interior_of(&chart, 0);
    let c = CATEGORY10[0];

    let (px, _, _, stride) = render_to_rgba8(&chart.frame(), &no_text()).expect("rgba render");
    let got = pixel(&px, stride, at);
    for (g, w) in got.iter().zip([c.r, c.g, c.b, 255]) {
        assert!(g.abs_diff(w) <= 1, "pixel {at:?} is {got:?}, want series color {c}");
    }

    let center = chart.frame().legend[0].center;
    chart.pointer_down(center.x, center.y);
    chart.settle();
    let (px, _, _, stride) = render_to_rgba8(&chart.frame(), &no_text()).expect("rgba render");
    let got = pixel(&px, stride, at);
    let distance: u32 = got.iter().zip([c.r, c.g, c.b]).map(|(g, w)| g.abs_diff(w) as u32).sum();
    assert!(distance > 60, "hidden series still painted at {at:?}: {got:?}");
}
