use super::models::Config;
use config::{ConfigError, Environment, File, Map};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "ZIPLINE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "zipline.toml";
const DOTENV_PATH: &str = ".env";
const ENV_PREFIX: &str = "ZIPLINE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path, `.env` and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    load_layers(&config_path, Path::new(DOTENV_PATH))
}

fn load_layers(config_path: &Path, dotenv_path: &Path) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // ZIPLINE__FETCH__MAX_CONCURRENT -> fetch.max_concurrent
    builder = builder
        .add_source(environment().source(Some(read_dotenv(dotenv_path))))
        .add_source(environment());

    let config = builder.build()?;
    config.try_deserialize()
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// Variables from a `.env` file, without exporting them to the process.
/// A missing file yields nothing; malformed lines are skipped.
fn read_dotenv(path: &Path) -> Map<String, String> {
    let mut vars = Map::new();
    let Ok(entries) = dotenvy::from_path_iter(path) else {
        return vars;
    };

    for entry in entries {
        match entry {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "Skipping .env entry"),
        }
    }
    vars
}
