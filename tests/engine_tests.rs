use colorbook::{AudioCue, EngineSettings, PaintEngine, PointerEvent, PointerKind, Tool, Viewport};
use image::{Rgba, RgbaImage};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn settings(width: u32, height: u32) -> EngineSettings {
    let mut s = EngineSettings::default();
    s.canvas_width = width;
    s.canvas_height = height;
    s
}

/// Engine with an all-white template the same size as the canvas (no
/// letterbox), ready to draw.
fn blank_engine(width: u32, height: u32) -> PaintEngine {
    let mut engine = PaintEngine::new(settings(width, height));
    engine.load_template(&RgbaImage::from_pixel(width, height, WHITE));
    engine
}

fn press(engine: &mut PaintEngine, x: f32, y: f32) {
    engine.handle_pointer(PointerEvent::new(PointerKind::Down, x, y));
}

fn drag(engine: &mut PaintEngine, x: f32, y: f32) {
    engine.handle_pointer(PointerEvent::new(PointerKind::Move, x, y));
}

fn release(engine: &mut PaintEngine, x: f32, y: f32) {
    engine.handle_pointer(PointerEvent::new(PointerKind::Up, x, y));
}

fn paint_alpha(engine: &PaintEngine, x: i32, y: i32) -> u8 {
    engine.layers().unwrap().paint().get(x, y).0[3]
}

#[test]
fn engine_ignores_everything_before_template_load() {
    let mut engine = PaintEngine::new(settings(64, 48));
    assert!(!engine.is_ready());

    press(&mut engine, 10.0, 10.0);
    drag(&mut engine, 20.0, 10.0);
    release(&mut engine, 20.0, 10.0);
    engine.undo();
    engine.reset();

    assert!(!engine.can_undo());
    assert!(engine.export_png().is_none());
    assert!(engine.take_cues().is_empty());
    assert_eq!(engine.merged_color(10, 10), Rgba([0, 0, 0, 0]));
}

#[test]
fn brush_stroke_paints_and_commits_once() {
    let mut engine = blank_engine(64, 48);
    assert!(!engine.can_undo());

    press(&mut engine, 10.0, 10.0);
    drag(&mut engine, 30.0, 10.0);
    release(&mut engine, 30.0, 10.0);

    assert!(paint_alpha(&engine, 10, 10) > 0);
    assert!(engine.can_undo());

    // The whole stroke is one commit: a single undo returns to blank.
    engine.undo();
    assert_eq!(paint_alpha(&engine, 10, 10), 0);
    assert!(!engine.can_undo());
}

#[test]
fn fast_stroke_leaves_no_gaps() {
    let mut engine = blank_engine(320, 40);
    engine.set_brush_size(20);

    // One motion sample covering 300 pixels of travel.
    press(&mut engine, 0.0, 20.0);
    drag(&mut engine, 300.0, 20.0);
    release(&mut engine, 300.0, 20.0);

    for x in 0..=300 {
        assert!(
            paint_alpha(&engine, x, 20) > 0,
            "gap in stroke coverage at x={}",
            x
        );
    }
}

#[test]
fn overlapping_dabs_darken_progressively() {
    let mut engine = blank_engine(64, 48);
    engine.set_color(Rgba([0, 0, 0, 255]));

    press(&mut engine, 20.0, 20.0);
    let after_one = paint_alpha(&engine, 20, 20);
    // Scrub back and forth over the same spot.
    drag(&mut engine, 24.0, 20.0);
    drag(&mut engine, 20.0, 20.0);
    drag(&mut engine, 24.0, 20.0);
    release(&mut engine, 24.0, 20.0);
    let after_many = paint_alpha(&engine, 20, 20);

    assert!(after_one > 0 && after_one < 255);
    assert!(after_many > after_one);
}

#[test]
fn eraser_removes_paint_but_not_template() {
    let mut engine = blank_engine(64, 48);

    // Lay down opaque paint with a fill, then erase its center.
    engine.set_tool(Tool::Fill);
    engine.set_color(Rgba([255, 0, 0, 255]));
    press(&mut engine, 32.0, 24.0);
    release(&mut engine, 32.0, 24.0);
    assert_eq!(engine.merged_color(32, 24), Rgba([255, 0, 0, 255]));

    engine.set_tool(Tool::Eraser);
    press(&mut engine, 32.0, 24.0);
    release(&mut engine, 32.0, 24.0);

    assert_eq!(paint_alpha(&engine, 32, 24), 0);
    // With coverage gone the template shows through again.
    assert_eq!(engine.merged_color(32, 24), WHITE);
}

#[test]
fn audio_cues_fire_per_tool_and_drain() {
    let mut engine = blank_engine(64, 48);

    press(&mut engine, 10.0, 10.0);
    release(&mut engine, 10.0, 10.0);
    assert_eq!(
        engine.take_cues(),
        vec![AudioCue::BrushStarted, AudioCue::StrokeEnded]
    );
    // Draining empties the queue.
    assert!(engine.take_cues().is_empty());

    engine.set_tool(Tool::Eraser);
    press(&mut engine, 10.0, 10.0);
    release(&mut engine, 10.0, 10.0);
    assert_eq!(
        engine.take_cues(),
        vec![AudioCue::EraserStarted, AudioCue::StrokeEnded]
    );

    engine.set_tool(Tool::Fill);
    engine.set_color(Rgba([0, 0, 255, 255]));
    press(&mut engine, 32.0, 24.0);
    release(&mut engine, 32.0, 24.0);
    assert_eq!(engine.take_cues(), vec![AudioCue::FillApplied]);
}

#[test]
fn undo_then_new_stroke_discards_the_redo_branch() {
    let mut engine = blank_engine(128, 32);
    engine.set_brush_size(10);

    for x in [10.0f32, 40.0, 70.0] {
        press(&mut engine, x, 16.0);
        release(&mut engine, x, 16.0);
    }
    engine.undo(); // drop the stroke at x=70
    engine.undo(); // drop the stroke at x=40
    assert!(paint_alpha(&engine, 10, 16) > 0);
    assert_eq!(paint_alpha(&engine, 40, 16), 0);

    press(&mut engine, 100.0, 16.0);
    release(&mut engine, 100.0, 16.0);

    // History is now [blank, x=10, x=100]; the undone strokes are gone for good.
    engine.undo();
    assert!(paint_alpha(&engine, 10, 16) > 0);
    assert_eq!(paint_alpha(&engine, 40, 16), 0);
    assert_eq!(paint_alpha(&engine, 70, 16), 0);
    assert_eq!(paint_alpha(&engine, 100, 16), 0);
    engine.undo();
    assert_eq!(paint_alpha(&engine, 10, 16), 0);
    assert!(!engine.can_undo());
}

#[test]
fn repeated_undo_bottoms_out_quietly() {
    let mut engine = blank_engine(64, 48);
    press(&mut engine, 10.0, 10.0);
    release(&mut engine, 10.0, 10.0);

    for _ in 0..10 {
        engine.undo();
    }
    assert!(!engine.can_undo());
    assert_eq!(paint_alpha(&engine, 10, 10), 0);
}

#[test]
fn reset_clears_paint_and_restarts_history() {
    let mut engine = blank_engine(64, 48);
    engine.set_tool(Tool::Fill);
    engine.set_color(Rgba([200, 100, 0, 255]));
    press(&mut engine, 32.0, 24.0);
    release(&mut engine, 32.0, 24.0);

    engine.reset();
    assert_eq!(engine.merged_color(32, 24), WHITE);
    assert!(!engine.can_undo());

    // A stroke after reset undoes back to blank, never to the pre-reset fill.
    engine.set_tool(Tool::Brush);
    press(&mut engine, 10.0, 10.0);
    release(&mut engine, 10.0, 10.0);
    engine.undo();
    assert_eq!(engine.merged_color(32, 24), WHITE);
    assert_eq!(paint_alpha(&engine, 10, 10), 0);
}

#[test]
fn moves_without_a_press_are_ignored() {
    let mut engine = blank_engine(64, 48);
    drag(&mut engine, 20.0, 20.0);
    drag(&mut engine, 40.0, 20.0);
    assert_eq!(paint_alpha(&engine, 20, 20), 0);
    assert!(!engine.can_undo());
}

#[test]
fn brush_size_is_clamped_to_configured_bounds() {
    let mut engine = blank_engine(64, 48);
    engine.set_brush_size(5);
    assert_eq!(engine.brush_size(), 10);
    engine.set_brush_size(99);
    assert_eq!(engine.brush_size(), 50);
    engine.set_brush_size(23);
    assert_eq!(engine.brush_size(), 23);
}

#[test]
fn invalid_hex_color_keeps_current_selection() {
    let mut engine = blank_engine(64, 48);
    assert!(engine.set_color_hex("#0F0"));
    assert!(!engine.set_color_hex("chartreuse"));

    engine.set_tool(Tool::Fill);
    press(&mut engine, 32.0, 24.0);
    release(&mut engine, 32.0, 24.0);
    assert_eq!(engine.merged_color(32, 24), Rgba([0, 255, 0, 255]));
}

#[test]
fn viewport_scales_device_coordinates_to_buffer_space() {
    let mut engine = blank_engine(100, 50);
    // Canvas displayed at 2x, offset by (10, 20) on the page.
    engine.set_viewport(Viewport {
        left: 10.0,
        top: 20.0,
        display_width: 200.0,
        display_height: 100.0,
    });

    press(&mut engine, 30.0, 30.0); // → buffer (10, 5)
    release(&mut engine, 30.0, 30.0);

    assert!(paint_alpha(&engine, 10, 5) > 0);
    assert_eq!(paint_alpha(&engine, 60, 25), 0);
}

#[test]
fn first_touch_point_drives_multi_touch_events() {
    let touches = [(30.0, 40.0), (200.0, 300.0)];
    let event = PointerEvent::from_touches(PointerKind::Down, &touches).unwrap();
    assert_eq!((event.x, event.y), (30.0, 40.0));
    assert!(PointerEvent::from_touches(PointerKind::Down, &[]).is_none());
}

#[test]
fn pointer_leave_commits_like_release() {
    let mut engine = blank_engine(64, 48);
    press(&mut engine, 10.0, 10.0);
    drag(&mut engine, 20.0, 10.0);
    engine.handle_pointer(PointerEvent::new(PointerKind::Leave, 20.0, 10.0));

    assert!(engine.can_undo());
    // The stroke ended: further moves must not paint.
    drag(&mut engine, 40.0, 10.0);
    assert_eq!(paint_alpha(&engine, 40, 10), 0);
}
