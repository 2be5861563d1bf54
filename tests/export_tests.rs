use colorbook::{EngineSettings, PaintEngine, PointerEvent, PointerKind, Tool};
use image::{Rgba, RgbaImage};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn settings(width: u32, height: u32) -> EngineSettings {
    let mut s = EngineSettings::default();
    s.canvas_width = width;
    s.canvas_height = height;
    s
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().into_rgba8()
}

#[test]
fn export_of_untouched_canvas_equals_the_base_layer() {
    // A 2:1 gray template letterboxed into a square canvas.
    let template = RgbaImage::from_pixel(40, 20, Rgba([90, 90, 90, 255]));
    let mut engine = PaintEngine::new(settings(40, 40));
    engine.load_template(&template);

    let exported = decode(&engine.export_png().unwrap());
    assert_eq!(exported.dimensions(), (40, 40));
    assert!(&exported == engine.layers().unwrap().base().as_image());

    // Spot-check the letterbox: white margins, gray band in the middle.
    assert_eq!(*exported.get_pixel(20, 2), WHITE);
    assert_eq!(*exported.get_pixel(20, 20), Rgba([90, 90, 90, 255]));
    assert_eq!(*exported.get_pixel(20, 38), WHITE);
}

#[test]
fn export_composites_paint_over_base() {
    let mut boxed = RgbaImage::from_pixel(24, 24, WHITE);
    for i in 4..=11 {
        boxed.put_pixel(i, 4, Rgba([0, 0, 0, 255]));
        boxed.put_pixel(i, 11, Rgba([0, 0, 0, 255]));
        boxed.put_pixel(4, i, Rgba([0, 0, 0, 255]));
        boxed.put_pixel(11, i, Rgba([0, 0, 0, 255]));
    }
    let mut engine = PaintEngine::new(settings(24, 24));
    engine.load_template(&boxed);
    engine.set_tool(Tool::Fill);
    engine.set_color(Rgba([255, 0, 0, 255]));
    engine.handle_pointer(PointerEvent::new(PointerKind::Down, 7.0, 7.0));
    engine.handle_pointer(PointerEvent::new(PointerKind::Up, 7.0, 7.0));

    let exported = decode(&engine.export_png().unwrap());
    assert_eq!(*exported.get_pixel(7, 7), Rgba([255, 0, 0, 255]));
    // Everywhere outside the filled region the base shows through.
    assert_eq!(*exported.get_pixel(20, 20), WHITE);
    assert_eq!(*exported.get_pixel(4, 4), Rgba([0, 0, 0, 255]));
}

#[test]
fn export_is_opaque_even_where_paint_is_translucent() {
    let template = RgbaImage::from_pixel(32, 32, WHITE);
    let mut engine = PaintEngine::new(settings(32, 32));
    engine.load_template(&template);

    // A single brush dab leaves translucent paint; over the opaque base the
    // exported pixel must still be fully opaque.
    engine.set_color(Rgba([0, 0, 0, 255]));
    engine.handle_pointer(PointerEvent::new(PointerKind::Down, 16.0, 16.0));
    engine.handle_pointer(PointerEvent::new(PointerKind::Up, 16.0, 16.0));

    let exported = decode(&engine.export_png().unwrap());
    let px = *exported.get_pixel(16, 16);
    assert_eq!(px.0[3], 255);
    // Partially darkened toward the black dab, but not black.
    assert!(px.0[0] < 255 && px.0[0] > 0);
}

#[test]
fn export_reflects_undo() {
    let template = RgbaImage::from_pixel(16, 16, WHITE);
    let mut engine = PaintEngine::new(settings(16, 16));
    engine.load_template(&template);

    engine.set_tool(Tool::Fill);
    engine.set_color(Rgba([0, 255, 0, 255]));
    engine.handle_pointer(PointerEvent::new(PointerKind::Down, 8.0, 8.0));
    engine.handle_pointer(PointerEvent::new(PointerKind::Up, 8.0, 8.0));
    engine.undo();

    let exported = decode(&engine.export_png().unwrap());
    assert!(&exported == engine.layers().unwrap().base().as_image());
}

#[test]
fn export_before_load_yields_nothing() {
    let engine = PaintEngine::new(settings(16, 16));
    assert!(engine.export_png().is_none());
}
