//! Validator configuration.
//!
//! Built in three layers: defaults, then `PBV_*` environment variables, then
//! command-line flags. Environment values are parsed strictly; a value that
//! does not parse is an error rather than a silent default.

use std::path::PathBuf;

use pbv_core::{LoadOptions, DEFAULT_MAX_FILE_BYTES};
use pbv_schema::{ansible, SchemaRegistry, SchemaTable, SchemaTableError};

use crate::validate::ValidateArgs;

pub const ENV_USE_FALLBACK: &str = "PBV_USE_FALLBACK";
pub const ENV_MAX_FILE_SIZE: &str = "PBV_MAX_FILE_SIZE";
pub const ENV_SCHEMAS: &str = "PBV_SCHEMAS";
pub const ENV_EXCLUDE: &str = "PBV_EXCLUDE";

/// Effective settings for one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Validate files without their own schema as play lists.
    pub use_fallback: bool,
    pub max_file_bytes: u64,
    /// Schema table replacing the built-in one.
    pub schemas: Option<PathBuf>,
    /// File names excluded in addition to the table's own list.
    pub exclude: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            use_fallback: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            schemas: None,
            exclude: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PBV_USE_FALLBACK`: `1/true/yes/on` or `0/false/no/off` (default: off)
    /// - `PBV_MAX_FILE_SIZE`: bytes, greater than zero (default: 10 MiB)
    /// - `PBV_SCHEMAS`: path to a schema table file
    /// - `PBV_EXCLUDE`: comma-separated file names
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_USE_FALLBACK) {
            config.use_fallback = parse_flag(ENV_USE_FALLBACK, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_FILE_SIZE) {
            config.max_file_bytes = parse_size(ENV_MAX_FILE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SCHEMAS) {
            if !raw.trim().is_empty() {
                config.schemas = Some(PathBuf::from(raw.trim()));
            }
        }
        if let Some(raw) = lookup(ENV_EXCLUDE) {
            config.exclude = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }

        Ok(config)
    }

    /// Layer command-line flags over this configuration.
    pub fn with_args(mut self, args: &ValidateArgs) -> Result<Self, ConfigError> {
        self.use_fallback |= args.fallback;
        if let Some(bytes) = args.max_file_size {
            if bytes == 0 {
                return Err(ConfigError::ZeroFileSize);
            }
            self.max_file_bytes = bytes;
        }
        if let Some(path) = &args.schemas {
            self.schemas = Some(path.clone());
        }
        self.exclude.extend(args.exclude.iter().cloned());
        Ok(self)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            max_file_bytes: self.max_file_bytes,
        }
    }

    /// Build the registry: the schema table (file or built-in) plus the
    /// configured exclusions and fallback policy.
    pub fn registry(&self) -> Result<SchemaRegistry, SchemaTableError> {
        let mut table = match &self.schemas {
            Some(path) => SchemaTable::load(path)?,
            None => ansible::table(),
        };
        table.exclude.extend(self.exclude.iter().cloned());
        table.into_registry(self.use_fallback)
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_owned(),
            expected: "a boolean (true/false)",
        }),
    }
}

fn parse_size(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::ZeroFileSize),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_owned(),
            expected: "a byte count",
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("maximum file size must be greater than zero")]
    ZeroFileSize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    fn args() -> ValidateArgs {
        ValidateArgs {
            directory: PathBuf::from("."),
            fallback: false,
            exclude: Vec::new(),
            max_file_size: None,
            schemas: None,
            format: Default::default(),
        }
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ValidatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.load_options().max_file_bytes, DEFAULT_MAX_FILE_BYTES);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ValidatorConfig::from_lookup(lookup(&[
            (ENV_USE_FALLBACK, "Yes"),
            (ENV_MAX_FILE_SIZE, "2048"),
            (ENV_SCHEMAS, "/etc/pbv/schemas.yml"),
            (ENV_EXCLUDE, "vault.yml, ,local.yml"),
        ]))
        .unwrap();
        assert!(config.use_fallback);
        assert_eq!(config.max_file_bytes, 2048);
        assert_eq!(config.schemas, Some(PathBuf::from("/etc/pbv/schemas.yml")));
        assert_eq!(config.exclude, vec!["vault.yml", "local.yml"]);
    }

    #[test]
    fn invalid_environment_values_are_errors() {
        let err = ValidatorConfig::from_lookup(lookup(&[(ENV_USE_FALLBACK, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: ENV_USE_FALLBACK, .. }));

        let err = ValidatorConfig::from_lookup(lookup(&[(ENV_MAX_FILE_SIZE, "10MB")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_FILE_SIZE));

        let err = ValidatorConfig::from_lookup(lookup(&[(ENV_MAX_FILE_SIZE, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroFileSize);
    }

    #[test]
    fn flags_layer_over_environment() {
        let base = ValidatorConfig::from_lookup(lookup(&[(ENV_EXCLUDE, "vault.yml")])).unwrap();
        let mut flags = args();
        flags.fallback = true;
        flags.max_file_size = Some(512);
        flags.exclude = vec!["local.yml".into()];

        let config = base.with_args(&flags).unwrap();
        assert!(config.use_fallback);
        assert_eq!(config.max_file_bytes, 512);
        assert_eq!(config.exclude, vec!["vault.yml", "local.yml"]);
    }

    #[test]
    fn zero_size_flag_is_rejected() {
        let mut flags = args();
        flags.max_file_size = Some(0);
        assert_eq!(
            ValidatorConfig::default().with_args(&flags).unwrap_err(),
            ConfigError::ZeroFileSize
        );
    }

    #[test]
    fn registry_keeps_default_exclusion_and_adds_configured_ones() {
        let config = ValidatorConfig {
            exclude: vec!["vault.yml".into()],
            ..ValidatorConfig::default()
        };
        let registry = config.registry().unwrap();
        assert!(registry.is_excluded("secret.yml"));
        assert!(registry.is_excluded("vault.yml"));
        assert!(!registry.has_fallback());
    }
}
