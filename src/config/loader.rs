//! Configuration loading from disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::SpaceConfig;

/// Name of the configuration file in the home and project directories.
pub const CONFIG_FILE_NAME: &str = ".tsapp";

/// Error type for configuration loading and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Read one config file as a raw table. A missing file is not an error.
pub fn read_table(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let table = content.parse::<toml::Table>().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(table))
}

/// Persist a table, replacing the file. The file is private to the user.
pub fn write_table(path: &Path, table: &toml::Table) -> Result<(), ConfigError> {
    let content = toml::to_string(table)?;
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    Ok(())
}

/// Load configuration from `layers`, later files overriding earlier ones,
/// with defaults applied for anything left unset.
pub fn load_layered(layers: &[PathBuf]) -> Result<SpaceConfig, ConfigError> {
    let mut merged = toml::Table::new();
    for path in layers {
        if let Some(table) = read_table(path)? {
            merged.extend(table);
        }
    }
    from_table(merged)
}

/// Apply defaults to a raw table. Blank optional values count as unset.
pub fn from_table(table: toml::Table) -> Result<SpaceConfig, ConfigError> {
    let mut config: SpaceConfig = toml::Value::Table(table).try_into()?;
    config.auth_token = config.auth_token.filter(|t| !t.trim().is_empty());
    config.server_prefix = config.server_prefix.filter(|p| !p.trim().is_empty());
    Ok(config)
}
