//! The paint engine — owns the canvas layers, history, brush, and tool
//! state, and turns device pointer events into strokes and fills.
//!
//! Everything runs synchronously inside the caller's event handlers: one
//! logical writer, no locking, no background work. The engine is not usable
//! until a template has been loaded; until then every draw, fill, undo,
//! reset, and export call is a silent no-op.

use image::{Rgba, RgbaImage};

use crate::canvas::LayerStore;
use crate::color;
use crate::history::SnapshotHistory;
use crate::io;
use crate::settings::EngineSettings;
use crate::tools::{self, BrushMode, BrushTip};
use crate::{log_err, log_info, log_warn};

// ============================================================================
// INPUT MODEL
// ============================================================================

/// Active tool.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Fill,
}

/// What a pointer sample reports. `Leave` ends a stroke exactly like `Up` —
/// dragging off the canvas must not leave a stroke dangling uncommitted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

/// One pointer/touch sample in device coordinates.
#[derive(Clone, Copy, Debug)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }

    /// Build an event from a touch-point list; only the first touch point
    /// drives drawing. `None` when the list is empty.
    pub fn from_touches(kind: PointerKind, touches: &[(f32, f32)]) -> Option<Self> {
        touches.first().map(|&(x, y)| Self { kind, x, y })
    }
}

/// Maps device-space pointer positions onto the canvas backing buffer.
///
/// The backing resolution is fixed while the displayed size follows layout,
/// zoom, and fullscreen, so client coordinates are first made canvas-relative
/// and then scaled by the backing/display ratio per axis.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    /// Canvas position in device coordinates.
    pub left: f32,
    pub top: f32,
    /// Displayed (CSS) size of the canvas.
    pub display_width: f32,
    pub display_height: f32,
}

impl Viewport {
    /// 1:1 mapping, for headless use or before the first layout pass.
    pub fn identity(buffer_width: u32, buffer_height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            display_width: buffer_width as f32,
            display_height: buffer_height as f32,
        }
    }

    /// Device position → buffer position. A degenerate (zero-size) display
    /// maps everything to the origin rather than dividing by zero.
    pub fn to_buffer(
        &self,
        buffer_width: u32,
        buffer_height: u32,
        client_x: f32,
        client_y: f32,
    ) -> (f32, f32) {
        if self.display_width <= 0.0 || self.display_height <= 0.0 {
            return (0.0, 0.0);
        }
        (
            (client_x - self.left) * (buffer_width as f32 / self.display_width),
            (client_y - self.top) * (buffer_height as f32 / self.display_height),
        )
    }
}

/// Discrete feedback events for the embedding layer's audio. Fire-and-forget:
/// the engine queues them, the collaborator drains the queue with
/// [`PaintEngine::take_cues`] and owns playback, looping, and volume.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AudioCue {
    BrushStarted,
    EraserStarted,
    StrokeEnded,
    FillApplied,
}

// ============================================================================
// PAINT ENGINE
// ============================================================================

/// The engine façade. Owns both pixel layers, the snapshot history, the
/// brush tip, and the active tool state; external callers get methods, never
/// raw buffer handles.
pub struct PaintEngine {
    settings: EngineSettings,
    layers: Option<LayerStore>,
    history: SnapshotHistory,
    brush: BrushTip,
    viewport: Viewport,
    tool: Tool,
    color: Rgba<u8>,
    diameter: u32,
    tolerance: u8,
    /// Previous buffer-space sample of the in-flight stroke.
    last_point: Option<(f32, f32)>,
    stroke_active: bool,
    cues: Vec<AudioCue>,
}

impl PaintEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let diameter = settings
            .default_brush_size
            .clamp(settings.brush_min, settings.brush_max);
        Self {
            viewport: Viewport::identity(settings.canvas_width, settings.canvas_height),
            history: SnapshotHistory::new(settings.max_undo_steps),
            brush: BrushTip::round(64),
            layers: None,
            tool: Tool::Brush,
            color: Rgba([0, 0, 0, 255]),
            diameter,
            tolerance: settings.fill_tolerance,
            last_point: None,
            stroke_active: false,
            cues: Vec::new(),
            settings,
        }
    }

    // -- readiness & sources -------------------------------------------------

    /// A template has been loaded and draw operations are accepted.
    pub fn is_ready(&self) -> bool {
        self.layers.is_some()
    }

    /// Letterbox an already-decoded template into the fixed canvas, reset
    /// the paint layer, and restart history from the blank state. Loading a
    /// new template discards all prior paint and undo entries.
    pub fn load_template(&mut self, source: &RgbaImage) {
        let store = LayerStore::from_template(
            source,
            self.settings.canvas_width,
            self.settings.canvas_height,
        );
        self.history.clear();
        self.history.commit(store.snapshot_paint());
        self.layers = Some(store);
        self.last_point = None;
        self.stroke_active = false;
        log_info!(
            "template loaded: {}x{} source into {}x{} canvas",
            source.width(),
            source.height(),
            self.settings.canvas_width,
            self.settings.canvas_height
        );
    }

    /// Replace the brush tip mask (already decoded; any dimensions).
    pub fn set_brush_tip(&mut self, mask: RgbaImage) {
        self.brush = BrushTip::new(mask);
    }

    // -- tool state ----------------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Set the active color from a hex string (3- or 6-digit). Invalid
    /// strings keep the current color and return `false`.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        match color::parse_hex(hex) {
            Some(c) => {
                self.color = c;
                true
            }
            None => {
                log_warn!("ignoring invalid hex color {:?}", hex);
                false
            }
        }
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    /// Brush diameter in buffer pixels, clamped to the configured bounds.
    pub fn set_brush_size(&mut self, diameter: u32) {
        self.diameter = diameter.clamp(self.settings.brush_min, self.settings.brush_max);
    }

    pub fn brush_size(&self) -> u32 {
        self.diameter
    }

    /// Per-channel flood-fill tolerance.
    pub fn set_fill_tolerance(&mut self, tolerance: u8) {
        self.tolerance = tolerance;
    }

    /// Tell the engine where and how large the canvas is currently displayed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // -- pointer protocol ----------------------------------------------------

    /// Feed one pointer/touch sample. Ignored until a template is loaded.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let Some(layers) = self.layers.as_ref() else {
            return;
        };
        let pos = self
            .viewport
            .to_buffer(layers.width(), layers.height(), event.x, event.y);
        match event.kind {
            PointerKind::Down => self.pointer_down(pos),
            PointerKind::Move => self.pointer_move(pos),
            PointerKind::Up | PointerKind::Leave => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, pos: (f32, f32)) {
        if self.tool == Tool::Fill {
            self.fill_at(pos);
            return;
        }
        let mode = self.brush_mode();
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        self.brush
            .apply_dab(layers.paint_mut(), pos, self.color, self.diameter, mode);
        self.last_point = Some(pos);
        self.stroke_active = true;
        self.cues.push(match self.tool {
            Tool::Eraser => AudioCue::EraserStarted,
            _ => AudioCue::BrushStarted,
        });
    }

    fn pointer_move(&mut self, pos: (f32, f32)) {
        if !self.stroke_active {
            return;
        }
        let mode = self.brush_mode();
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        match self.last_point {
            Some(from) => self.brush.stroke_to(
                layers.paint_mut(),
                from,
                pos,
                self.color,
                self.diameter,
                mode,
            ),
            None => {
                self.brush
                    .apply_dab(layers.paint_mut(), pos, self.color, self.diameter, mode)
            }
        }
        self.last_point = Some(pos);
    }

    fn pointer_up(&mut self) {
        if self.stroke_active {
            self.commit();
            self.cues.push(AudioCue::StrokeEnded);
        }
        self.stroke_active = false;
        self.last_point = None;
    }

    fn brush_mode(&self) -> BrushMode {
        match self.tool {
            Tool::Eraser => BrushMode::Erase,
            _ => BrushMode::Paint,
        }
    }

    fn fill_at(&mut self, pos: (f32, f32)) {
        let tolerance = self.tolerance;
        let color = self.color;
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        if tools::flood_fill(layers, pos, color, tolerance) {
            self.commit();
            self.cues.push(AudioCue::FillApplied);
        }
    }

    /// Push a snapshot of the current paint layer onto the history stack.
    fn commit(&mut self) {
        if let Some(layers) = self.layers.as_ref() {
            self.history.commit(layers.snapshot_paint());
        }
    }

    // -- commands ------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Restore the previous commit point. No-op at the oldest surviving
    /// entry, and before a template is loaded.
    pub fn undo(&mut self) {
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        if let Some(snapshot) = self.history.undo() {
            layers.restore_paint(snapshot);
        }
    }

    /// Clear the paint layer and restart history from the blank state. The
    /// template itself is untouched.
    pub fn reset(&mut self) {
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        layers.paint_mut().clear();
        self.history.reset(layers.snapshot_paint());
        self.last_point = None;
        self.stroke_active = false;
    }

    // -- output --------------------------------------------------------------

    /// Merge base + paint at the canvas's native resolution and encode as
    /// PNG. `None` before a template is loaded (or on an encode failure,
    /// which is logged).
    pub fn export_png(&self) -> Option<Vec<u8>> {
        let layers = self.layers.as_ref()?;
        match io::encode_png(&layers.composite()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log_err!("export failed: {}", e);
                None
            }
        }
    }

    /// Drain the queued audio cues.
    pub fn take_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    // -- read-only views (sampling, export collaborators, tests) -------------

    pub fn layers(&self) -> Option<&LayerStore> {
        self.layers.as_ref()
    }

    /// Merged (paint-over-base) color at a buffer coordinate; transparent
    /// black before a template is loaded or outside the canvas.
    pub fn merged_color(&self, x: i32, y: i32) -> Rgba<u8> {
        match &self.layers {
            Some(layers) => layers.merged_color(x, y),
            None => color::TRANSPARENT,
        }
    }
}
