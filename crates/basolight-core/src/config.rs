//! Configuration loading
//!
//! The two tunables of the published heuristic (`INTENSITY_THRESHOLD`,
//! `NEW_INTENSITY`) plus the bright floors and the red gate are exposed as
//! configuration rather than module constants, loaded once per process.

use crate::models::{RedGate, StainProfile};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

// Global verbose flag for controlling debug output
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbose flag. When true, debug messages will be printed.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose mode is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print a message to stderr only if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if $crate::config::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Canonical list of candidate config file names we search for on disk.
const CONFIG_FILENAMES: &[&str] = &["basolight.yml", "basolight.yaml"];

/// Public handle that stores the loaded configuration, its source path, and warnings.
pub struct HighlightConfigHandle {
    pub config: HighlightConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl HighlightConfigHandle {
    fn with_config(
        config: HighlightConfig,
        source: Option<PathBuf>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }
}

/// Complete configuration file structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HighlightConfig {
    pub defaults: HighlightDefaults,
}

impl HighlightConfig {
    fn sanitize(mut self) -> Self {
        self.defaults.sanitize();
        self
    }
}

/// Default highlight parameter values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HighlightDefaults {
    /// Scales the purple-qualification bar (1.0 = published behavior)
    pub intensity_threshold: f32,
    /// Amplification factor for basophilic pixels
    pub new_intensity: f32,
    /// Per-channel floors (R, G, B) for the grayscale branch
    pub bright_floor: [u8; 3],
    /// Red-channel gate for the basophilic branch
    pub red_gate: RedGate,
}

impl HighlightDefaults {
    pub(crate) fn sanitize(&mut self) {
        self.intensity_threshold = self.intensity_threshold.clamp(0.0, 4.0);
        self.new_intensity = self.new_intensity.clamp(0.0, 8.0);
    }

    /// Build a stain profile from these defaults.
    pub fn to_profile(&self) -> StainProfile {
        StainProfile {
            intensity_threshold: self.intensity_threshold,
            new_intensity: self.new_intensity,
            bright_floor: self.bright_floor,
            red_gate: self.red_gate,
        }
    }
}

impl Default for HighlightDefaults {
    fn default() -> Self {
        let profile = StainProfile::highlight();
        Self {
            intensity_threshold: profile.intensity_threshold,
            new_intensity: profile.new_intensity,
            bright_floor: profile.bright_floor,
            red_gate: profile.red_gate,
        }
    }
}

/// Load configuration from disk, optionally forcing a specific path.
pub fn load_highlight_config(custom_path: Option<&Path>) -> HighlightConfigHandle {
    let mut warnings = Vec::new();
    let candidates = get_config_candidates(custom_path);

    for candidate in candidates {
        if !candidate.exists() || !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match serde_yaml::from_str::<HighlightConfig>(&contents) {
                Ok(config) => {
                    let sanitized = config.sanitize();
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return HighlightConfigHandle::with_config(sanitized, Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse highlight config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read highlight config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No highlight config found; using built-in defaults.".to_string());
    HighlightConfigHandle::with_config(HighlightConfig::default(), None, warnings)
}

/// Get list of config file candidates to try
fn get_config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("BASOLIGHT_CONFIG") {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(home_dir) = dirs::home_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(home_dir.join("basolight").join(name));
        }
    }

    candidates
}

static HIGHLIGHT_CONFIG_HANDLE: OnceLock<HighlightConfigHandle> = OnceLock::new();
static PRINT_CONFIG_ONCE: Once = Once::new();

/// Access the global highlight configuration (loaded once per process).
pub fn highlight_config_handle() -> &'static HighlightConfigHandle {
    HIGHLIGHT_CONFIG_HANDLE.get_or_init(|| load_highlight_config(None))
}

/// Print config source and warnings the first time it is requested (only in verbose mode).
pub fn log_config_usage() {
    PRINT_CONFIG_ONCE.call_once(|| {
        if !is_verbose() {
            return;
        }
        let handle = highlight_config_handle();
        if let Some(source) = &handle.source {
            eprintln!(
                "[basolight] Loaded highlight config from {}",
                source.display()
            );
        } else {
            eprintln!("[basolight] Using built-in highlight defaults");
        }

        for warning in &handle.warnings {
            eprintln!("[basolight] Config warning: {}", warning);
        }
    });
}
