/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to the tuned defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::entity::ColorTag;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub jump: JumpConfig,
    pub chain: ChainConfig,
    pub outcome: OutcomeConfig,
    pub camera: CameraConfig,
    pub motion: MotionConfig,
    pub gamepad: GamepadConfig,
    pub keyboard: KeyboardConfig,
    pub general: GeneralConfig,
}

/// Classifier thresholds, in degrees of pitch change.
#[derive(Clone, Copy, Debug)]
pub struct JumpConfig {
    pub short_threshold: f64,
    pub long_threshold: f64,
}

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub platform_spacing: f32,
    pub landing_offset: f32,
    pub first_target_offset: f32,
    pub retain: usize,           // slots kept in memory; indices never shift
    pub palette: Vec<ColorTag>,
}

#[derive(Clone, Copy, Debug)]
pub struct OutcomeConfig {
    pub short_overshoot: f32,
    pub long_overshoot: f32,
    pub feedback_lead: f32,      // feedback marker sits this far past the target
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub initial_height: f32,
    /// Sorted: bounded tiers ascending, the unbounded tier last.
    pub tiers: Vec<CameraTier>,
}

/// Camera step applied while the target index is below `until`.
/// `until == None` covers everything past the previous tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTier {
    pub until: Option<usize>,
    pub step: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct MotionConfig {
    pub sample_hz: u32,
    pub accel_threshold: f64,
    pub min_pitch_delta: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct GamepadConfig {
    pub pitch_scale_deg: f64,
    pub invert_pitch: bool,
}

#[derive(Clone, Debug)]
pub struct KeyboardConfig {
    pub charge_deg_per_sec: f64,
    pub jump: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub log_file: PathBuf,
    pub log_level: String,
    pub seed: Option<u64>,
}

impl CameraConfig {
    /// Camera rise for a perfect landing that made `target_index` the new target.
    pub fn step_for(&self, target_index: usize) -> f32 {
        self.tiers
            .iter()
            .find(|t| t.until.map_or(true, |u| target_index < u))
            .or_else(|| self.tiers.last())
            .map(|t| t.step)
            .unwrap_or(0.0)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    jump: TomlJump,
    #[serde(default)]
    chain: TomlChain,
    #[serde(default)]
    outcome: TomlOutcome,
    #[serde(default)]
    camera: TomlCamera,
    #[serde(default)]
    motion: TomlMotion,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    keyboard: TomlKeyboard,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlJump {
    #[serde(default = "default_short_threshold")]
    short_threshold: f64,
    #[serde(default = "default_long_threshold")]
    long_threshold: f64,
}

#[derive(Deserialize, Debug)]
struct TomlChain {
    #[serde(default = "default_spacing")]
    platform_spacing: f32,
    #[serde(default = "default_landing_offset")]
    landing_offset: f32,
    #[serde(default = "default_first_target_offset")]
    first_target_offset: f32,
    #[serde(default = "default_retain")]
    retain: usize,
    #[serde(default = "default_palette")]
    palette: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlOutcome {
    #[serde(default = "default_overshoot")]
    short_overshoot: f32,
    #[serde(default = "default_overshoot")]
    long_overshoot: f32,
    #[serde(default = "default_feedback_lead")]
    feedback_lead: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCamera {
    #[serde(default = "default_camera_height")]
    initial_height: f32,
    #[serde(default = "default_camera_tiers")]
    tiers: Vec<TomlCameraTier>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct TomlCameraTier {
    #[serde(default)]
    until: Option<usize>,
    step: f32,
}

#[derive(Deserialize, Debug)]
struct TomlMotion {
    #[serde(default = "default_sample_hz")]
    sample_hz: u32,
    #[serde(default = "default_accel_threshold")]
    accel_threshold: f64,
    #[serde(default = "default_min_pitch_delta")]
    min_pitch_delta: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pitch_scale")]
    pitch_scale_deg: f64,
    #[serde(default)]
    invert_pitch: bool,
}

#[derive(Deserialize, Debug)]
struct TomlKeyboard {
    #[serde(default = "default_charge_rate")]
    charge_deg_per_sec: f64,
    #[serde(default = "default_jump_keys")]
    jump: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_short_threshold() -> f64 { 15.0 }
fn default_long_threshold() -> f64 { 500.0 }
fn default_spacing() -> f32 { 5.0 }
fn default_landing_offset() -> f32 { -15.0 }
fn default_first_target_offset() -> f32 { -20.0 }
fn default_retain() -> usize { 64 }
fn default_palette() -> Vec<String> {
    ColorTag::ALL.iter().map(|c| c.name().to_string()).collect()
}
fn default_overshoot() -> f32 { 2.0 }
fn default_feedback_lead() -> f32 { 3.0 }
fn default_camera_height() -> f32 { 20.0 }
fn default_camera_tiers() -> Vec<TomlCameraTier> {
    vec![
        TomlCameraTier { until: Some(90), step: 4.5 },
        TomlCameraTier { until: Some(320), step: 4.60 },
        TomlCameraTier { until: None, step: 4.7 },
    ]
}
fn default_sample_hz() -> u32 { 25 }
fn default_accel_threshold() -> f64 { 0.55 }
fn default_min_pitch_delta() -> f64 { 10.0 }
fn default_pitch_scale() -> f64 { 90.0 }
fn default_charge_rate() -> f64 { 300.0 }  // ~0.05s tap = short, >1.67s = long
fn default_jump_keys() -> Vec<String> { vec!["Space".into(), "Enter".into()] }
fn default_log_file() -> String { "hopper.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlJump {
    fn default() -> Self {
        TomlJump {
            short_threshold: default_short_threshold(),
            long_threshold: default_long_threshold(),
        }
    }
}

impl Default for TomlChain {
    fn default() -> Self {
        TomlChain {
            platform_spacing: default_spacing(),
            landing_offset: default_landing_offset(),
            first_target_offset: default_first_target_offset(),
            retain: default_retain(),
            palette: default_palette(),
        }
    }
}

impl Default for TomlOutcome {
    fn default() -> Self {
        TomlOutcome {
            short_overshoot: default_overshoot(),
            long_overshoot: default_overshoot(),
            feedback_lead: default_feedback_lead(),
        }
    }
}

impl Default for TomlCamera {
    fn default() -> Self {
        TomlCamera {
            initial_height: default_camera_height(),
            tiers: default_camera_tiers(),
        }
    }
}

impl Default for TomlMotion {
    fn default() -> Self {
        TomlMotion {
            sample_hz: default_sample_hz(),
            accel_threshold: default_accel_threshold(),
            min_pitch_delta: default_min_pitch_delta(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            pitch_scale_deg: default_pitch_scale(),
            invert_pitch: false,
        }
    }
}

impl Default for TomlKeyboard {
    fn default() -> Self {
        TomlKeyboard {
            charge_deg_per_sec: default_charge_rate(),
            jump: default_jump_keys(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            log_file: default_log_file(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/hopper.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document without touching the search path.
    #[cfg(test)]
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str::<TomlConfig>(text)
            .map(|cfg| GameConfig::from_toml(cfg, &[]))
            .map_err(|e| format!("config parse error: {e}"))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Keep the thresholds ordered; a swapped pair would make PERFECT unreachable
        let (short_threshold, long_threshold) = if cfg.jump.short_threshold <= cfg.jump.long_threshold {
            (cfg.jump.short_threshold, cfg.jump.long_threshold)
        } else {
            (cfg.jump.long_threshold, cfg.jump.short_threshold)
        };

        let mut palette: Vec<ColorTag> = cfg.chain.palette.iter()
            .filter_map(|s| ColorTag::from_name(s))
            .collect();
        if palette.is_empty() {
            palette = ColorTag::ALL.to_vec();
        }

        let mut tiers: Vec<CameraTier> = cfg.camera.tiers.iter()
            .map(|t| CameraTier { until: t.until, step: t.step })
            .collect();
        // Bounded tiers ascending, unbounded last
        tiers.sort_by_key(|t| t.until.unwrap_or(usize::MAX));
        if tiers.is_empty() {
            tiers = default_camera_tiers().iter()
                .map(|t| CameraTier { until: t.until, step: t.step })
                .collect();
        }

        // A relative log path lives next to the first search dir (exe dir)
        let log_file = PathBuf::from(&cfg.general.log_file);
        let log_file = if log_file.is_absolute() {
            log_file
        } else {
            search_dirs.first()
                .map(|d| d.join(&log_file))
                .unwrap_or(log_file)
        };

        GameConfig {
            jump: JumpConfig { short_threshold, long_threshold },
            chain: ChainConfig {
                platform_spacing: cfg.chain.platform_spacing,
                landing_offset: cfg.chain.landing_offset,
                first_target_offset: cfg.chain.first_target_offset,
                retain: cfg.chain.retain.max(2),
                palette,
            },
            outcome: OutcomeConfig {
                short_overshoot: cfg.outcome.short_overshoot,
                long_overshoot: cfg.outcome.long_overshoot,
                feedback_lead: cfg.outcome.feedback_lead,
            },
            camera: CameraConfig {
                initial_height: cfg.camera.initial_height,
                tiers,
            },
            motion: MotionConfig {
                sample_hz: cfg.motion.sample_hz.max(1),
                accel_threshold: cfg.motion.accel_threshold,
                min_pitch_delta: cfg.motion.min_pitch_delta,
            },
            gamepad: GamepadConfig {
                pitch_scale_deg: cfg.gamepad.pitch_scale_deg,
                invert_pitch: cfg.gamepad.invert_pitch,
            },
            keyboard: KeyboardConfig {
                charge_deg_per_sec: cfg.keyboard.charge_deg_per_sec,
                jump: cfg.keyboard.jump,
            },
            general: GeneralConfig {
                log_file,
                log_level: cfg.general.log_level,
                seed: cfg.general.seed,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/hopper)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hopper");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_tuned_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.jump.short_threshold, 15.0);
        assert_eq!(cfg.jump.long_threshold, 500.0);
        assert_eq!(cfg.chain.platform_spacing, 5.0);
        assert_eq!(cfg.chain.palette.len(), 10);
        assert_eq!(cfg.outcome.short_overshoot, 2.0);
        assert_eq!(cfg.outcome.long_overshoot, 2.0);
        assert_eq!(cfg.motion.sample_hz, 25);
        assert_eq!(cfg.camera.tiers.len(), 3);
        assert!(cfg.general.seed.is_none());
    }

    #[test]
    fn camera_tiers_cover_all_three_ranges() {
        let cam = GameConfig::default().camera;
        assert!((cam.step_for(0) - 4.5).abs() < 1e-6);
        assert!((cam.step_for(89) - 4.5).abs() < 1e-6);
        assert!((cam.step_for(90) - 4.60).abs() < 1e-6);
        assert!((cam.step_for(319) - 4.60).abs() < 1e-6);
        assert!((cam.step_for(320) - 4.7).abs() < 1e-6);
        assert!((cam.step_for(100_000) - 4.7).abs() < 1e-6);
    }

    #[test]
    fn tiers_are_sorted_with_unbounded_last() {
        let cfg = GameConfig::parse(r#"
            [camera]
            tiers = [ { step = 9.0 }, { until = 50, step = 1.0 }, { until = 10, step = 0.5 } ]
        "#).unwrap();
        let untils: Vec<_> = cfg.camera.tiers.iter().map(|t| t.until).collect();
        assert_eq!(untils, vec![Some(10), Some(50), None]);
        assert!((cfg.camera.step_for(10) - 1.0).abs() < 1e-6);
        assert!((cfg.camera.step_for(70) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn bounded_only_tiers_fall_back_to_last() {
        let cfg = GameConfig::parse(r#"
            [camera]
            tiers = [ { until = 5, step = 1.0 }, { until = 10, step = 2.0 } ]
        "#).unwrap();
        assert!((cfg.camera.step_for(42) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_palette_names_are_skipped() {
        let cfg = GameConfig::parse(r#"
            [chain]
            palette = ["red", "chartreuse", "BLUE"]
        "#).unwrap();
        assert_eq!(cfg.chain.palette, vec![ColorTag::Red, ColorTag::Blue]);

        let cfg = GameConfig::parse("[chain]\npalette = [\"nope\"]").unwrap();
        assert_eq!(cfg.chain.palette.len(), 10);
    }

    #[test]
    fn swapped_thresholds_are_reordered() {
        let cfg = GameConfig::parse("[jump]\nshort_threshold = 600.0\nlong_threshold = 20.0").unwrap();
        assert_eq!(cfg.jump.short_threshold, 20.0);
        assert_eq!(cfg.jump.long_threshold, 600.0);
    }

    #[test]
    fn malformed_document_reports_error() {
        assert!(GameConfig::parse("[jump\nshort_threshold = ").is_err());
    }
}
