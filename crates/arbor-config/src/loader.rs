//! Config file discovery and layered loading.
//!
//! Layers, lowest precedence first:
//! 1. Embedded `defaults.toml`
//! 2. System `/etc/arbor/config.toml`
//! 3. User `~/.arbor/config.toml`, or `$ARBOR_HOME/config.toml`
//! 4. An explicit file (`--config`)
//! 5. `ARBOR_*` environment overrides
//!
//! The merged tree is deserialized into [`Config`] and validated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// System-wide config file.
const SYSTEM_CONFIG_PATH: &str = "/etc/arbor/config.toml";

/// Maximum allowed config file size (1 MiB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A merged configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The validated configuration.
    pub config: Config,
    /// The Arbor home directory (`~/.arbor` or `$ARBOR_HOME`).
    pub home: PathBuf,
    /// Files that contributed, in merge order.
    pub loaded_files: Vec<PathBuf>,
}

/// Inputs to a layered load. Defaults to the real system locations.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file merged above the user layer. Must exist.
    pub explicit: Option<PathBuf>,
    /// Arbor home override, bypassing `~/.arbor` and `ARBOR_HOME`.
    pub home: Option<PathBuf>,
    /// System config override.
    pub system: Option<PathBuf>,
    /// Environment to read; `None` reads the process environment.
    pub env: Option<HashMap<String, String>>,
}

/// Load configuration with full layering.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file cannot be read or parsed, or the
/// merged configuration fails validation.
pub fn load(options: &LoadOptions) -> ConfigResult<LoadedConfig> {
    let env_vars = options.env.clone().unwrap_or_else(collect_env_vars);
    let home = match &options.home {
        Some(home) => home.clone(),
        None => arbor_home(&env_vars)?,
    };

    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut loaded_files = Vec::new();

    let system = options
        .system
        .clone()
        .unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG_PATH));
    let user = home.join("config.toml");

    for (layer, path) in [("system", system), ("user", user)] {
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge(&mut merged, &overlay);
            info!(layer, path = %path.display(), "Loaded config");
            loaded_files.push(path);
        }
    }

    if let Some(path) = &options.explicit {
        let overlay = read_value(path)?;
        deep_merge(&mut merged, &overlay);
        info!(layer = "explicit", path = %path.display(), "Loaded config");
        loaded_files.push(path.clone());
    }

    let overrides = apply_env_overrides(&mut merged, &env_vars);
    if overrides > 0 {
        debug!(count = overrides, "Applied environment overrides");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;
    validate::validate(&config)?;

    Ok(LoadedConfig {
        config,
        home,
        loaded_files,
    })
}

/// Load a single file on top of the defaults, with no other layers.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or
/// validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    deep_merge(&mut merged, &read_value(path)?);

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// The Arbor home: `$ARBOR_HOME` if set, else `~/.arbor`.
fn arbor_home<S: std::hash::BuildHasher>(
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<PathBuf> {
    if let Some(home) = env_vars.get("ARBOR_HOME").filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".arbor"))
        .ok_or(ConfigError::NoHomeDir)
}

/// Read and parse `path`, which must exist.
fn read_value(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_checked(path, &content)
}

/// Read and parse `path`, returning `None` if it does not exist.
///
/// Reads once and checks the size afterwards, so there is no window between
/// a stat and the read.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_checked(path, &content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

fn parse_checked(path: &Path, content: &str) -> ConfigResult<toml::Value> {
    let len = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {len} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }

    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            path
        }

        fn options(&self) -> LoadOptions {
            LoadOptions {
                explicit: None,
                home: Some(self.dir.path().join("home")),
                system: Some(self.dir.path().join("etc").join("config.toml")),
                env: Some(HashMap::new()),
            }
        }
    }

    #[test]
    fn test_defaults_deserialize_to_default_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_without_files() {
        let fixture = Fixture::new();
        let loaded = load(&fixture.options()).unwrap();
        assert_eq!(loaded.config, Config::default());
        assert!(loaded.loaded_files.is_empty());
        assert_eq!(loaded.home, fixture.dir.path().join("home"));
    }

    #[test]
    fn test_layer_precedence() {
        let fixture = Fixture::new();
        let system = fixture.write(
            "etc/config.toml",
            "[claims]\nissuer = \"system\"\nttl_secs = 100\nleeway_secs = 5\n",
        );
        let user = fixture.write("home/config.toml", "[claims]\nttl_secs = 200\n");
        let explicit = fixture.write("explicit.toml", "[claims]\nleeway_secs = 10\n");

        let mut options = fixture.options();
        options.explicit = Some(explicit.clone());
        options.env = Some(HashMap::from([(
            "ARBOR_CLAIMS_ISSUER".to_owned(),
            "env".to_owned(),
        )]));

        let loaded = load(&options).unwrap();
        assert_eq!(loaded.config.claims.issuer, "env");
        assert_eq!(loaded.config.claims.ttl_secs, 200);
        assert_eq!(loaded.config.claims.leeway_secs, 10);
        assert_eq!(loaded.loaded_files, vec![system, user, explicit]);
    }

    #[test]
    fn test_arbor_home_from_env() {
        let fixture = Fixture::new();
        let home = fixture.dir.path().join("custom-home");
        fixture.write("custom-home/config.toml", "[logging]\nlevel = \"debug\"\n");

        let mut options = fixture.options();
        options.home = None;
        options.env = Some(HashMap::from([(
            "ARBOR_HOME".to_owned(),
            home.display().to_string(),
        )]));

        let loaded = load(&options).unwrap();
        assert_eq!(loaded.home, home);
        assert_eq!(loaded.config.logging.level, "debug");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let fixture = Fixture::new();
        let mut options = fixture.options();
        options.explicit = Some(fixture.dir.path().join("missing.toml"));
        assert!(matches!(load(&options), Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_invalid_merged_config_is_rejected() {
        let fixture = Fixture::new();
        fixture.write("home/config.toml", "[claims]\nttl_secs = 0\n");
        assert!(matches!(
            load(&fixture.options()),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_bad_env_integer_is_a_parse_error() {
        let fixture = Fixture::new();
        let mut options = fixture.options();
        options.env = Some(HashMap::from([(
            "ARBOR_CLAIMS_TTL_SECS".to_owned(),
            "soon".to_owned(),
        )]));
        assert!(matches!(load(&options), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let fixture = Fixture::new();
        fixture.write("home/config.toml", "[claims\n");
        assert!(matches!(
            load(&fixture.options()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let fixture = Fixture::new();
        let path = fixture.write("arbor.toml", "[catalog]\npath = \"/srv/catalog.toml\"\n");
        let config = load_file(&path).unwrap();
        assert_eq!(
            config.catalog.path,
            Some(PathBuf::from("/srv/catalog.toml"))
        );
        assert_eq!(config.claims, crate::ClaimsSection::default());
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/arbor.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_oversized_config_rejected() {
        let fixture = Fixture::new();
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        let path = fixture.write("huge.toml", &data);

        assert!(matches!(
            try_load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
