//! Configuration for Kiln.
//!
//! A TOML file can declare types (whose instances become [`Record`]s) and
//! per-type arguments that a [`ConfiguredArgumentsResolver`] feeds into the
//! pipeline:
//!
//! ```toml
//! [[types]]
//! name = "Mailer"
//! parameters = [{ name = "host" }, { name = "port", default = 25 }]
//!
//! [arguments.Mailer]
//! host = "${MAIL_HOST}"
//! ```
//!
//! String argument values go through `${VAR}` expansion.

mod record;
mod resolver;
mod vars;

use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kiln_core::{DuplicateTypeError, Pipeline};
use kiln_types::TypeDescriptor;
use serde::Deserialize;
use thiserror::Error;

pub use record::Record;
pub use resolver::ConfiguredArgumentsResolver;
pub use vars::{expand_env_vars, toml_to_argument};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "KILN_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid argument '{name}' for type {type_name}: {reason}")]
    InvalidArgument {
        type_name: String,
        name: String,
        reason: String,
    },
    #[error(transparent)]
    DuplicateType(#[from] DuplicateTypeError),
}

impl ConfigError {
    fn invalid_argument(type_name: &str, name: &str, reason: String) -> Self {
        ConfigError::InvalidArgument {
            type_name: type_name.to_string(),
            name: name.to_string(),
            reason,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => {
                Some(path.as_path())
            }
            ConfigError::InvalidArgument { .. } | ConfigError::DuplicateType(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KilnConfig {
    /// Types declared in configuration. Built as [`Record`]s.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    /// `[arguments.<Type>]` tables: named arguments supplied per type.
    #[serde(default)]
    pub arguments: BTreeMap<String, toml::Table>,
}

impl KilnConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => {
                tracing::debug!(
                    path = %path.display(),
                    types = config.types.len(),
                    configured = config.arguments.len(),
                    "Loaded config"
                );
                Ok(config)
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    /// Load from [`config_path`]. `Ok(None)` when no file exists there.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Build the resolver for the `[arguments.*]` tables.
    ///
    /// For types declared in this file, argument names are checked against
    /// the declared parameters up front.
    pub fn resolver(&self) -> Result<ConfiguredArgumentsResolver, ConfigError> {
        let mut resolver = ConfiguredArgumentsResolver::new();
        for (type_name, table) in &self.arguments {
            let declared = self.types.iter().find(|ty| ty.name() == type_name);
            for (name, value) in table {
                if let Some(ty) = declared
                    && ty.parameter(name).is_none()
                {
                    let reason = format!("{ty} has no such parameter");
                    return Err(ConfigError::invalid_argument(type_name, name, reason));
                }
                let value = toml_to_argument(value)
                    .map_err(|reason| ConfigError::invalid_argument(type_name, name, reason))?;
                resolver.insert(type_name.as_str(), name.as_str(), value);
            }
        }
        Ok(resolver)
    }

    /// Register every declared type as a [`Record`]-building factory.
    ///
    /// Nothing is registered unless every declared name is free, both within
    /// this file and in `pipeline`.
    pub fn register_types(&self, pipeline: &mut Pipeline) -> Result<(), DuplicateTypeError> {
        self.check_type_names(pipeline)?;
        for ty in &self.types {
            pipeline.register_factory(ty.clone(), Record::factory(ty))?;
        }
        Ok(())
    }

    fn check_type_names(&self, pipeline: &Pipeline) -> Result<(), DuplicateTypeError> {
        let mut seen = HashSet::new();
        for ty in &self.types {
            if !seen.insert(ty.name()) || pipeline.types().get(ty.name()).is_some() {
                return Err(DuplicateTypeError(ty.name().to_string()));
            }
        }
        Ok(())
    }

    /// Register declared types, then append the configured-arguments resolver.
    ///
    /// On error the pipeline is left exactly as it was.
    pub fn install(&self, pipeline: &mut Pipeline) -> Result<(), ConfigError> {
        let resolver = self.resolver()?;
        self.register_types(pipeline)?;
        pipeline.register_argument_resolver(resolver);
        tracing::debug!(types = self.types.len(), "Installed config into pipeline");
        Ok(())
    }
}

/// `$KILN_CONFIG` if set, else `~/.kiln/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".kiln").join("config.toml"))
}
