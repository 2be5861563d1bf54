// ============================================================================
// colorbook CLI — headless template painting via command-line arguments
// ============================================================================
//
// Usage examples:
//   colorbook --input lineart.png --fill 400,300,#FFD166 --output colored.png
//   colorbook -i "pages/*.png" --fill 10,10,#F00 --output-dir out/
//   colorbook -i sketch.jpg -o out.png          (plain letterboxed export)
//
// No GUI exists; all processing runs synchronously on the current thread
// through the same engine the interactive embeddings drive.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::color;
use crate::engine::{PaintEngine, PointerEvent, PointerKind, Tool};
use crate::io;
use crate::settings::EngineSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// colorbook headless template painter.
///
/// Letterbox line-art templates onto the canvas, apply flood fills, and
/// export the merged result as PNG — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "colorbook",
    about = "colorbook headless template painter",
    long_about = "Load line-art templates, apply flood fills at given canvas\n\
                  coordinates, and export the merged result as PNG.\n\n\
                  Example:\n  \
                  colorbook --input lineart.png --fill 400,300,#FFD166 --output colored.png\n  \
                  colorbook -i \"pages/*.png\" --fill 10,10,#F00 --output-dir out/"
)]
pub struct CliArgs {
    /// Input template file(s). Glob patterns accepted (e.g. "pages/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Brush tip mask image (only its alpha channel is used). Optional —
    /// fills don't need one, and the built-in round tip covers the rest.
    #[arg(long, value_name = "MASK.png")]
    pub brush_tip: Option<PathBuf>,

    /// Flood fill to apply after loading, as "X,Y,#RRGGBB" in canvas
    /// coordinates. May be given multiple times; fills run in order.
    #[arg(long = "fill", value_name = "X,Y,#HEX")]
    pub fills: Vec<String>,

    /// Per-channel fill tolerance (0–255). Overrides the settings value.
    #[arg(short, long, value_name = "0-255")]
    pub tolerance: Option<u8>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and a .png extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// A parsed `--fill` request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillOp {
    pub x: f32,
    pub y: f32,
    pub color: image::Rgba<u8>,
}

/// Parse "X,Y,#HEX" into a [`FillOp`].
pub fn parse_fill_op(spec: &str) -> Result<FillOp, String> {
    let parts: Vec<&str> = spec.splitn(3, ',').collect();
    if parts.len() != 3 {
        return Err(format!("fill '{}' is not of the form X,Y,#HEX", spec));
    }
    let x: f32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| format!("fill '{}': bad X coordinate", spec))?;
    let y: f32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("fill '{}': bad Y coordinate", spec))?;
    let color = color::parse_hex(parts[2].trim())
        .ok_or_else(|| format!("fill '{}': bad hex color", spec))?;
    Ok(FillOp { x, y, color })
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    // Resolve glob patterns / literal paths → concrete PathBufs
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    // Multiple inputs require --output-dir, not --output
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    // Parse fill specs up front so a typo fails before any work happens
    let fill_ops = match args
        .fills
        .iter()
        .map(|s| parse_fill_op(s))
        .collect::<Result<Vec<FillOp>, String>>()
    {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Load the brush tip once; it is shared by every input
    let brush_tip = match &args.brush_tip {
        Some(path) => match io::load_image(path) {
            Ok(img) => Some(img),
            Err(e) => {
                eprintln!("error: could not load brush tip: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    // Create output directory if specified
    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    let mut settings = EngineSettings::load();
    if let Some(t) = args.tolerance {
        settings.fill_tolerance = t;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let output_path =
            match build_output_path(input_path, args.output.as_deref(), args.output_dir.as_deref())
            {
                Some(p) => p,
                None => {
                    eprintln!(
                        "  error: cannot determine output path for '{}'.",
                        input_path.display()
                    );
                    any_failure = true;
                    continue;
                }
            };

        match run_one(
            input_path,
            &output_path,
            &settings,
            brush_tip.as_ref(),
            &fill_ops,
        ) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    settings: &EngineSettings,
    brush_tip: Option<&image::RgbaImage>,
    fill_ops: &[FillOp],
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let template = io::load_image(input).map_err(|e| format!("load failed: {}", e))?;

    let mut engine = PaintEngine::new(settings.clone());
    if let Some(tip) = brush_tip {
        engine.set_brush_tip(tip.clone());
    }
    engine.load_template(&template);

    // -- Step 2: Apply fills (optional) ----------------------------------
    // Driven through the real pointer protocol with the identity viewport,
    // so the CLI exercises the same path an interactive embedding does.
    engine.set_tool(Tool::Fill);
    for op in fill_ops {
        engine.set_color(op.color);
        engine.handle_pointer(PointerEvent::new(PointerKind::Down, op.x, op.y));
        engine.handle_pointer(PointerEvent::new(PointerKind::Up, op.x, op.y));
    }

    // -- Step 3: Save ----------------------------------------------------
    let bytes = engine
        .export_png()
        .ok_or_else(|| "export produced no output".to_string())?;
    std::fs::write(output, bytes).map_err(|e| format!("save failed: {}", e))?;

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path — use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        // Treat as glob pattern
        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, `.png` extension
///    (appends `_painted` to the stem if it would collide with the input)
pub fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.png", stem)));
    }

    // Write next to the input file
    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.png", stem));

    // Avoid silent overwrite of the input
    if candidate == input {
        Some(parent.join(format!("{}_painted.png", stem)))
    } else {
        Some(candidate)
    }
}
