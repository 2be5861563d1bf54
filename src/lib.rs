//! colorbook — a raster painting engine for coloring over line-art templates.
//!
//! The engine owns a two-layer canvas (the letterboxed template under a
//! transparent paint overlay), composites soft brush strokes and
//! tolerance-based flood fills into the paint layer, keeps a bounded
//! snapshot history for undo, and exports the merged result as PNG.
//!
//! The GUI shell, audio playback, and asset pipelines are external
//! collaborators: the engine consumes already-decoded images and pointer
//! samples, and emits PNG bytes and discrete audio cues. A headless batch
//! CLI (`colorbook`) drives the same engine from the command line.

pub mod canvas;
pub mod cli;
pub mod color;
pub mod engine;
pub mod history;
pub mod io;
pub mod logger;
pub mod settings;
pub mod tools;

pub use engine::{AudioCue, PaintEngine, PointerEvent, PointerKind, Tool, Viewport};
pub use settings::EngineSettings;
