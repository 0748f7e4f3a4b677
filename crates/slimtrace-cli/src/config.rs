//! Optional `slimtrace.toml` config file: threshold overrides and a default
//! prescription, parsed the way the teacher's `agtrace-runtime::config`
//! parses its own TOML config. Every field is optional — an absent or
//! missing file is not an error, it just means every CLI default applies
//! unmodified.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub default_prescription: Option<String>,
    pub hard_threshold_mb: Option<u64>,
    pub soft_threshold_mb: Option<u64>,
    pub threshold_tokens: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

/// Load `<data_dir>/slimtrace.toml`, returning the default (empty) config
/// if it doesn't exist. A malformed file is a hard error — silently
/// ignoring a config the user wrote but mistyped would be more surprising
/// than failing loudly.
pub fn load(data_dir: &Path) -> anyhow::Result<FileConfig> {
    let path = data_dir.join("slimtrace.toml");
    if !path.is_file() {
        return Ok(FileConfig::default());
    }
    let text = std::fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&text)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path()).unwrap();
        assert!(config.default_prescription.is_none());
    }

    #[test]
    fn parses_threshold_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("slimtrace.toml"),
            "default_prescription = \"aggressive\"\nhard_threshold_mb = 80\n",
        )
        .unwrap();
        let config = load(dir.path()).unwrap();
        assert_eq!(config.default_prescription.as_deref(), Some("aggressive"));
        assert_eq!(config.hard_threshold_mb, Some(80));
    }
}
