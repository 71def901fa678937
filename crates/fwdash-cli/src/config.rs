//! Configuration – reads/writes `~/.fwdash/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fwdash_types::DashError;
use fwdash_widgets::WidgetConfig;

/// Persisted user configuration stored in `~/.fwdash/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Vendor pattern, dial default and size bands.
    #[serde(default)]
    pub widgets: WidgetConfig,

    /// Directory holding `<kind>.svg` widget artwork. The built-in
    /// placeholders are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_dir: Option<PathBuf>,

    /// How long `render` waits for widget artwork before printing the
    /// spinner instead.
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
}

fn default_load_timeout_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            widgets: WidgetConfig::default(),
            asset_dir: None,
            load_timeout_ms: default_load_timeout_ms(),
        }
    }
}

impl Config {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

/// Return the path to `~/.fwdash/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".fwdash").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, DashError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, DashError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| DashError::Io(format!("failed to read config at {}: {e}", path.display())))?;
    let mut cfg = parse(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Parse a config file body, without environment overrides.
pub(crate) fn parse(raw: &str) -> Result<Config, DashError> {
    toml::from_str(raw).map_err(|e| DashError::Config(format!("failed to parse config: {e}")))
}

/// Apply `FWDASH_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `FWDASH_ASSET_DIR` | `asset_dir` |
/// | `FWDASH_CLICKS_PER_TURN` | `widgets.default_clicks_per_turn` |
/// | `FWDASH_LOAD_TIMEOUT_MS` | `load_timeout_ms` |
/// | `FWDASH_VENDOR_PATTERN` | `widgets.vendor_pattern` |
///
/// Unparsable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("FWDASH_ASSET_DIR") {
        cfg.asset_dir = Some(PathBuf::from(v));
    }
    if let Ok(v) = std::env::var("FWDASH_CLICKS_PER_TURN")
        && let Ok(clicks) = v.parse::<u16>()
    {
        cfg.widgets.default_clicks_per_turn = clicks;
    }
    if let Ok(v) = std::env::var("FWDASH_LOAD_TIMEOUT_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.load_timeout_ms = ms;
    }
    if let Ok(v) = std::env::var("FWDASH_VENDOR_PATTERN") {
        cfg.widgets.vendor_pattern = v;
    }
}

/// Write the default config to `~/.fwdash/config.toml` and return its path.
pub fn init(force: bool) -> Result<PathBuf, DashError> {
    let path = config_path();
    init_at(&path, force)?;
    Ok(path)
}

/// Write the default config to `path`. An existing file is only replaced
/// when `force` is set.
pub(crate) fn init_at(path: &Path, force: bool) -> Result<(), DashError> {
    if path.exists() && !force {
        return Err(DashError::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    save_to(&Config::default(), path)
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), DashError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DashError::Io(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| DashError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| DashError::Io(format!("failed to write config at {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env override tests run concurrently, so file contents are checked
    // through `parse`.
    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");
        assert!(load_from(&path).expect("load ok").is_some());

        let loaded = parse(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.widgets.default_clicks_per_turn, 20);
        assert_eq!(loaded.widgets.size_bands.wide, "clamp(6rem, 15vw, 20vh)");
        assert_eq!(loaded.load_timeout_ms, 2000);
    }

    #[test]
    fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        init_at(&path, false).expect("init");
        let written = parse(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(written, Config::default());

        std::fs::write(&path, "load_timeout_ms = 10\n").expect("write");
        assert!(matches!(init_at(&path, false), Err(DashError::Config(_))));
        let kept = parse(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(kept.load_timeout_ms, 10);

        init_at(&path, true).expect("forced init");
        let replaced = parse(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(replaced.load_timeout_ms, 2000);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let loaded =
            parse("asset_dir = \"/srv/widgets\"\n\n[widgets]\ndefault_clicks_per_turn = 24\n")
                .expect("parse");
        assert_eq!(loaded.asset_dir, Some(PathBuf::from("/srv/widgets")));
        assert_eq!(loaded.load_timeout_ms, 2000);
        assert_eq!(
            loaded.widgets,
            WidgetConfig {
                default_clicks_per_turn: 24,
                ..WidgetConfig::default()
            }
        );
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "load_timeout_ms = \"soon\"").expect("write");
        assert!(matches!(load_from(&path), Err(DashError::Config(_))));
    }

    #[test]
    fn config_path_points_to_fwdash_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".fwdash"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn apply_env_overrides_changes_asset_dir() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FWDASH_ASSET_DIR", "/opt/fwdash/svg") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.asset_dir, Some(PathBuf::from("/opt/fwdash/svg")));
        unsafe { std::env::remove_var("FWDASH_ASSET_DIR") };
    }

    #[test]
    fn apply_env_overrides_changes_clicks_per_turn() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FWDASH_CLICKS_PER_TURN", "12") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.widgets.default_clicks_per_turn, 12);
        unsafe { std::env::remove_var("FWDASH_CLICKS_PER_TURN") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_timeout() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FWDASH_LOAD_TIMEOUT_MS", "later") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.load_timeout_ms, 2000);
        unsafe { std::env::remove_var("FWDASH_LOAD_TIMEOUT_MS") };
    }

    #[test]
    fn apply_env_overrides_changes_vendor_pattern() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("FWDASH_VENDOR_PATTERN", "acme") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.widgets.vendor_pattern, "acme");
        unsafe { std::env::remove_var("FWDASH_VENDOR_PATTERN") };
    }
}
