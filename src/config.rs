use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::countdown::parse_offset;
use crate::orcid::DEFAULT_BASE_URL;
use crate::template::TemplateConfig;
use crate::validator::Manifest;

const CONFIG_FILE: &str = "ec2g.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub period_secs: u64,
    pub max_slides: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self { Self { period_secs: 10, max_slides: 5 } }
}

impl CarouselConfig {
    pub fn period(&self) -> Duration { Duration::from_secs(self.period_secs.max(1)) }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Overrides the first event's date.
    pub target: Option<String>,
    /// Offset used for dates written without one.
    pub utc_offset: String,
    pub tick_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self { Self { target: None, utc_offset: "-03:00".into(), tick_ms: 1000 } }
}

impl CountdownConfig {
    pub fn tick(&self) -> Duration { Duration::from_millis(self.tick_ms.max(1)) }

    pub fn offset(&self) -> FixedOffset {
        parse_offset(&self.utc_offset).unwrap_or_else(|| {
            tracing::warn!(offset = %self.utc_offset, "invalid countdown utc_offset, using UTC");
            Utc.fix()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrcidConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OrcidConfig {
    fn default() -> Self { Self { base_url: DEFAULT_BASE_URL.into(), timeout_secs: 10 } }
}

impl OrcidConfig {
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublicationsConfig {
    pub limit: usize,
}

impl Default for PublicationsConfig {
    fn default() -> Self { Self { limit: 5 } }
}

/// `ec2g.toml`. Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub carousel: CarouselConfig,
    pub countdown: CountdownConfig,
    pub orcid: OrcidConfig,
    pub publications: PublicationsConfig,
    pub template: TemplateConfig,
    pub validator: Manifest,
}

impl SiteConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> { toml::from_str(raw).context("parsing site config") }

    /// Explicit path, else `./ec2g.toml`, else the user config dir, else defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::read(p)?,
            None => match Self::discover() {
                Some(p) => Self::read(&p)?,
                None => Self::default(),
            },
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
        let cfg = Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded site config");
        Ok(cfg)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() { return Some(local); }
        let user = ProjectDirs::from("cl", "ec2g", "ec2g-site")?.config_dir().join(CONFIG_FILE);
        user.is_file().then_some(user)
    }

    fn apply_env(&mut self) {
        self.apply_overrides(|k| std::env::var(k).ok());
    }

    pub(crate) fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("EC2G_ORCID_BASE_URL").filter(|s| !s.trim().is_empty()) {
            self.orcid.base_url = url;
        }
        if let Some(secs) = var("EC2G_CAROUSEL_PERIOD_SECS").and_then(|s| s.parse().ok()) {
            self.carousel.period_secs = secs;
        }
        if let Some(target) = var("EC2G_COUNTDOWN_TARGET").filter(|s| !s.trim().is_empty()) {
            self.countdown.target = Some(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.carousel.period(), Duration::from_secs(10));
        assert_eq!(cfg.carousel.max_slides, 5);
        assert_eq!(cfg.countdown.tick(), Duration::from_secs(1));
        assert_eq!(cfg.countdown.offset(), FixedOffset::west_opt(3 * 3600).unwrap());
        assert_eq!(cfg.orcid.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.publications.limit, 5);
        assert_eq!(cfg.validator.required_files.len(), 8);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = SiteConfig::from_toml_str(
            r#"
            [carousel]
            period_secs = 4

            [countdown]
            target = "2026-01-15T09:00:00"
            utc_offset = "+00:00"

            [validator]
            required_files = ["index.html"]
            "#,
        ).unwrap();
        assert_eq!(cfg.carousel.period_secs, 4);
        assert_eq!(cfg.carousel.max_slides, 5);
        assert_eq!(cfg.countdown.target.as_deref(), Some("2026-01-15T09:00:00"));
        assert_eq!(cfg.countdown.tick_ms, 1000);
        assert_eq!(cfg.validator.required_files, vec!["index.html".to_string()]);
        assert_eq!(cfg.validator.required_directories.len(), 5);
    }

    #[test]
    fn env_overrides_win() {
        let mut cfg = SiteConfig::default();
        cfg.apply_overrides(|k| match k {
            "EC2G_ORCID_BASE_URL" => Some("http://127.0.0.1:9/v3.0".into()),
            "EC2G_CAROUSEL_PERIOD_SECS" => Some("3".into()),
            "EC2G_COUNTDOWN_TARGET" => Some("".into()),
            _ => None,
        });
        assert_eq!(cfg.orcid.base_url, "http://127.0.0.1:9/v3.0");
        assert_eq!(cfg.carousel.period_secs, 3);
        assert!(cfg.countdown.target.is_none());
    }

    #[test]
    fn bad_offset_falls_back_to_utc() {
        let cfg = CountdownConfig { utc_offset: "somewhere".into(), ..Default::default() };
        assert_eq!(cfg.offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SiteConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
