//! Engine settings — tunables persisted as a `key=value` `.cfg` file in the
//! platform config directory. Missing or corrupt files fall back to the
//! defaults; unknown keys are ignored so old files keep loading.

use std::path::PathBuf;

/// Tunable engine parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    /// Canvas backing resolution — the template is letterboxed into this.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Maximum number of undo snapshots kept in memory.
    pub max_undo_steps: usize,
    /// Default per-channel flood-fill tolerance. Not derived from the
    /// template; kept configurable because anti-aliased line art can bleed
    /// at the stock value.
    pub fill_tolerance: u8,
    /// Brush diameter bounds and the starting diameter, in buffer pixels.
    pub brush_min: u32,
    pub brush_max: u32,
    pub default_brush_size: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1340,
            canvas_height: 750,
            max_undo_steps: 50,
            fill_tolerance: 50,
            brush_min: 10,
            brush_max: 50,
            default_brush_size: 15,
        }
    }
}

impl EngineSettings {
    /// Path to the settings file.
    /// On Linux:   `~/.config/colorbook/colorbook_settings.cfg` (XDG respected)
    /// On Windows: `%APPDATA%\colorbook\colorbook_settings.cfg`
    /// On macOS:   `~/Library/Application Support/colorbook/colorbook_settings.cfg`
    /// Fallback:   same directory as the executable.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("colorbook");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("colorbook_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            let config_dir = PathBuf::from(appdata).join("colorbook");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("colorbook_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("colorbook");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("colorbook_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("colorbook_settings.cfg")))
        }
    }

    /// Serialize to the config file format.
    pub fn to_config_string(&self) -> String {
        format!(
            "canvas_width={}\n\
             canvas_height={}\n\
             max_undo_steps={}\n\
             fill_tolerance={}\n\
             brush_min={}\n\
             brush_max={}\n\
             default_brush_size={}\n",
            self.canvas_width,
            self.canvas_height,
            self.max_undo_steps,
            self.fill_tolerance,
            self.brush_min,
            self.brush_max,
            self.default_brush_size,
        )
    }

    /// Parse config file content over the defaults. Unparseable values keep
    /// the default for that key.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let val = val.trim();
            match key {
                "canvas_width" => {
                    if let Ok(v) = val.parse() {
                        s.canvas_width = v;
                    }
                }
                "canvas_height" => {
                    if let Ok(v) = val.parse() {
                        s.canvas_height = v;
                    }
                }
                "max_undo_steps" => {
                    if let Ok(v) = val.parse::<usize>() {
                        s.max_undo_steps = v.max(1);
                    }
                }
                "fill_tolerance" => {
                    if let Ok(v) = val.parse() {
                        s.fill_tolerance = v;
                    }
                }
                "brush_min" => {
                    if let Ok(v) = val.parse() {
                        s.brush_min = v;
                    }
                }
                "brush_max" => {
                    if let Ok(v) = val.parse() {
                        s.brush_max = v;
                    }
                }
                "default_brush_size" => {
                    if let Ok(v) = val.parse() {
                        s.default_brush_size = v;
                    }
                }
                _ => {}
            }
        }
        if s.brush_max < s.brush_min {
            std::mem::swap(&mut s.brush_min, &mut s.brush_max);
        }
        s
    }

    /// Save settings to disk.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else {
            return;
        };
        let _ = std::fs::write(path, self.to_config_string());
    }

    /// Load settings from disk (returns defaults if file missing or corrupt).
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::from_config_str(&content)
    }
}
