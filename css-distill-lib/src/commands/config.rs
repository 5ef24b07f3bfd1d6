use crate::Result;
use crate::classify::{RadiusBuckets, ShadowTiers, SpacingScale};
use crate::crawl::{Backoff, RetryPolicy};
use crate::extractors::ExtractionSettings;
use crate::values::DimensionOptions;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

const LOG_TARGET: &str = "    config";

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "css-distill.toml";

/// A configuration value that cannot produce a sensible run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("minimum_occurrences must be at least 1, got {0}")]
    MinimumOccurrences(u64),

    #[error("concurrency must be at least 1")]
    Concurrency,

    #[error("max_pages must be at least 1")]
    MaxPages,

    #[error("root_font_size must be positive, got {0}")]
    RootFontSize(f64),

    #[error("color_similarity_threshold must be between 0 and 100, got {0}")]
    ColorSimilarityThreshold(f32),

    #[error("radius buckets must satisfy 0 < sm < md < lg, got sm={sm}, md={md}, lg={lg}")]
    RadiusBuckets { sm: f64, md: f64, lg: f64 },

    #[error("radius tolerance must be between 0 and 1, got {0}")]
    RadiusTolerance(f64),

    #[error("shadow sm_max_blur ({sm}) must be less than md_max_blur ({md})")]
    ShadowTiers { sm: f64, md: f64 },

    #[error("spacing ratio_threshold must be greater than 1, got {0}")]
    SpacingRatio(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Tokens seen fewer times than this are dropped
    #[serde(default = "default_minimum_occurrences")]
    pub minimum_occurrences: u64,

    /// Convert absolute units to px
    #[serde(default = "default_true")]
    pub normalize_values: bool,

    /// Size of `1rem` in px
    #[serde(default = "default_root_font_size")]
    pub root_font_size: f64,

    #[serde(default)]
    pub group_similar_values: bool,

    /// CIEDE2000 distance under which two colors are merged when grouping
    #[serde(default = "default_color_similarity_threshold")]
    pub color_similarity_threshold: f32,

    #[serde(default = "default_true")]
    pub include_text_colors: bool,

    #[serde(default = "default_true")]
    pub include_background_colors: bool,

    #[serde(default = "default_true")]
    pub include_border_colors: bool,

    #[serde(default = "default_true")]
    pub include_typography: bool,

    #[serde(default = "default_true")]
    pub include_spacing: bool,

    #[serde(default = "default_true")]
    pub include_borders: bool,

    #[serde(default = "default_true")]
    pub include_animations: bool,

    #[serde(default = "default_true")]
    pub include_components: bool,

    /// Pages processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retries after a transient page failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; each later retry doubles it
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Upper bound on pages discovered from the starting URL
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// How long a previous run's output is reused
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Component names recognized in class names and `data-component` attributes
    #[serde(default = "default_components")]
    pub components: Vec<String>,

    /// Discovered URLs containing any of these substrings are not visited
    #[serde(default)]
    pub exclude_url_patterns: Vec<String>,

    #[serde(default)]
    pub radius: RadiusBuckets,

    #[serde(default)]
    pub shadow: ShadowTiers,

    #[serde(default)]
    pub spacing: SpacingScale,
}

const fn default_minimum_occurrences() -> u64 {
    1
}

const fn default_true() -> bool {
    true
}

const fn default_root_font_size() -> f64 {
    16.0
}

const fn default_color_similarity_threshold() -> f32 {
    2.0
}

const fn default_concurrency() -> usize {
    3
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_retry_base_delay_ms() -> u64 {
    500
}

const fn default_max_pages() -> usize {
    20
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_components() -> Vec<String> {
    ExtractionSettings::default().components
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `css-distill.toml` in the current directory is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading css-distill configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = Utf8PathBuf::from(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "No '{CONFIG_FILE_NAME}' found, using the default configuration");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading css-distill configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Check that the values can produce a sensible run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_occurrences < 1 {
            return Err(ConfigError::MinimumOccurrences(self.minimum_occurrences));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }

        if self.max_pages == 0 {
            return Err(ConfigError::MaxPages);
        }

        if !(self.root_font_size > 0.0 && self.root_font_size.is_finite()) {
            return Err(ConfigError::RootFontSize(self.root_font_size));
        }

        if !(0.0..=100.0).contains(&self.color_similarity_threshold) {
            return Err(ConfigError::ColorSimilarityThreshold(self.color_similarity_threshold));
        }

        let RadiusBuckets { sm, md, lg, tolerance, .. } = self.radius;
        if !(0.0 < sm && sm < md && md < lg) {
            return Err(ConfigError::RadiusBuckets { sm, md, lg });
        }

        if !(0.0..=1.0).contains(&tolerance) {
            return Err(ConfigError::RadiusTolerance(tolerance));
        }

        if self.shadow.sm_max_blur >= self.shadow.md_max_blur {
            return Err(ConfigError::ShadowTiers {
                sm: self.shadow.sm_max_blur,
                md: self.shadow.md_max_blur,
            });
        }

        if self.spacing.ratio_threshold <= 1.0 {
            return Err(ConfigError::SpacingRatio(self.spacing.ratio_threshold));
        }

        Ok(())
    }

    #[must_use]
    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            dimensions: DimensionOptions {
                normalize: self.normalize_values,
                root_font_size: self.root_font_size,
            },
            group_similar_values: self.group_similar_values,
            color_similarity_threshold: self.color_similarity_threshold,
            include_text_colors: self.include_text_colors,
            include_background_colors: self.include_background_colors,
            include_border_colors: self.include_border_colors,
            include_typography: self.include_typography,
            include_spacing: self.include_spacing,
            include_borders: self.include_borders,
            include_animations: self.include_animations,
            include_components: self.include_components,
            radius: self.radius.clone(),
            shadow: self.shadow.clone(),
            spacing: self.spacing.clone(),
            components: self.components.clone(),
        }
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            backoff: Backoff::Exponential,
        }
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(3600))
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_config_matches_field_defaults() {
        let from_empty: Config = toml::from_str("").unwrap();
        assert_eq!(from_empty, Config::default());
    }

    #[test]
    fn test_default_settings_match_extractor_defaults() {
        let settings = Config::default().extraction_settings();
        let defaults = ExtractionSettings::default();

        assert_eq!(settings.dimensions, defaults.dimensions);
        assert_eq!(settings.components, defaults.components);
        assert_eq!(settings.radius, defaults.radius);
        assert!((settings.color_similarity_threshold - defaults.color_similarity_threshold).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_minimum_occurrences() {
        let config = Config { minimum_occurrences: 0, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::MinimumOccurrences(0)));
    }

    #[test]
    fn test_validate_concurrency() {
        let config = Config { concurrency: 0, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::Concurrency));
    }

    #[test]
    fn test_validate_root_font_size() {
        let config = Config { root_font_size: 0.0, ..Config::default() };
        assert!(matches!(config.validate(), Err(ConfigError::RootFontSize(_))));

        let config = Config { root_font_size: -4.0, ..Config::default() };
        assert!(matches!(config.validate(), Err(ConfigError::RootFontSize(_))));
    }

    #[test]
    fn test_validate_similarity_threshold() {
        let config = Config { color_similarity_threshold: 150.0, ..Config::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ColorSimilarityThreshold(_))));
    }

    #[test]
    fn test_validate_radius_order() {
        let config = Config {
            radius: RadiusBuckets { md: 2.0, ..RadiusBuckets::default() },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::RadiusBuckets { .. })));
    }

    #[test]
    fn test_validate_shadow_and_spacing() {
        let config = Config {
            shadow: ShadowTiers { sm_max_blur: 12.0, md_max_blur: 4.0 },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ShadowTiers { .. })));

        let config = Config {
            spacing: SpacingScale { ratio_threshold: 1.0 },
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SpacingRatio(_))));
    }

    #[test]
    fn test_retry_policy_and_ttl() {
        let config = Config { max_retries: 4, retry_base_delay_ms: 250, cache_ttl_hours: 2, ..Config::default() };
        let policy = config.retry_policy();

        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.backoff, Backoff::Exponential);
        assert_eq!(config.cache_ttl(), Duration::from_secs(7200));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: core::result::Result<Config, _> = toml::from_str("unknown_field = 1\n");
        assert!(result.is_err());

        let result: core::result::Result<Config, _> = toml::from_str("[radius]\nhuge = 1.0\n");
        assert!(result.is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from(dir.path().to_string_lossy().to_string()).join("bad.toml");
        fs::write(&path, "concurrency = 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("concurrency must be at least 1"), "{err}");
    }
}
