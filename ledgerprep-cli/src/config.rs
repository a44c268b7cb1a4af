use anyhow::{Context, Result, bail};
use ledgerprep_ingest::DetectionThresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::state::ensure_ledgerprep_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionThresholds,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Field separator for CSV output; must be a single ASCII character
    pub delimiter: char,
    pub include_header: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }
}

impl OutputSection {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("output delimiter must be ASCII, got {:?}", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }
}

/// `explicit` when given, otherwise `~/.ledgerprep/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(ensure_ledgerprep_home()?.join("config.toml")),
    }
}

/// Missing file means defaults. A file that does not parse is reported and
/// ignored.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    match toml::from_str(&s) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed config; using defaults");
            Ok(Config::default())
        }
    }
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn show_config(path: &Path) -> Result<()> {
    let cfg = load_config(path)?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[detection]
absa_min_score = 5

[output]
delimiter = ";"
"#,
        )
        .unwrap();

        assert_eq!(cfg.detection.absa_min_score, 5);
        assert_eq!(cfg.detection.fnb_min_header_hits, 2);
        assert_eq!(cfg.output.delimiter, ';');
        assert!(cfg.output.include_header);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[detection\nabsa_min_score = ").unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.detection.sample_lines = 30;
        cfg.output.include_header = false;
        save_config(&path, &cfg).unwrap();

        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn test_delimiter_byte() {
        let mut out = OutputSection::default();
        assert_eq!(out.delimiter_byte().unwrap(), b',');
        out.delimiter = '\t';
        assert_eq!(out.delimiter_byte().unwrap(), b'\t');
        out.delimiter = '§';
        assert!(out.delimiter_byte().is_err());
    }
}
