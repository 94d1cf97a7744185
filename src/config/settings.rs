//! TOML-based configuration for ormql.
//!
//! Selects the dialect and declares entities for callers (such as the CLI)
//! that have no Rust types to describe them.
//!
//! Example configuration:
//! ```toml
//! [dialect]
//! name = "custom"
//! base = "postgres"
//! quote = "`"
//!
//! [dialect.operators]
//! ne = "!="
//!
//! [entities.user]
//! table = "user"
//! columns = ["Id", "FirstName", "Age"]
//!
//! [entities.order_detail]
//! table = "order_detail"
//! fields = { OrderId = "order_id", ItemId = "item" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::db::Db;
use crate::metadata::{EntityMetadata, Registry};
use crate::sql::dialect::{CustomDialect, Dialect, SqlDialect};
use crate::sql::error::BuildError;
use crate::sql::expr::Operator;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ORMQL_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Unknown operator in [dialect.operators]: {0}")]
    UnknownOperator(String),

    #[error("Invalid entity '{0}': {1}")]
    InvalidEntity(String, #[source] BuildError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub dialect: DialectSettings,

    /// Entities keyed by registry name.
    pub entities: BTreeMap<String, EntitySettings>,
}

/// `[dialect]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectSettings {
    /// `mysql`, `postgres`, `sqlite`, or any other name for a custom dialect.
    pub name: String,

    /// Built-in dialect a custom dialect starts from.
    pub base: Option<String>,

    /// Identifier quote character override.
    pub quote: Option<char>,

    /// Operator spelling overrides, keyed by operator name (`ne`, `not_like`, ...).
    pub operators: BTreeMap<String, String>,
}

impl Default for DialectSettings {
    fn default() -> Self {
        Self {
            name: Dialect::default().to_string(),
            base: None,
            quote: None,
            operators: BTreeMap::new(),
        }
    }
}

/// `[entities.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EntitySettings {
    /// Table name; defaults to the entity name.
    pub table: Option<String>,

    /// Logical fields whose columns are their snake_case form.
    pub columns: Vec<String>,

    /// Logical field to explicit column.
    pub fields: BTreeMap<String, String>,
}

impl EntitySettings {
    pub fn metadata(&self, name: &str) -> EntityMetadata {
        let table = self.table.as_deref().unwrap_or(name);
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        self.fields
            .iter()
            .fold(EntityMetadata::new(table).fields(&columns), |meta, (l, c)| {
                meta.field(l, c)
            })
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        debug!(path = %path.display(), entities = settings.entities.len(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ORMQL_CONFIG`
    /// 2. `./ormql.toml`
    /// 3. `~/.config/ormql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("ormql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ormql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Build the configured dialect.
    ///
    /// A built-in name with no overrides yields the built-in itself.
    pub fn dialect(&self) -> Result<Arc<dyn SqlDialect>, SettingsError> {
        let d = &self.dialect;
        let builtin = d.name.parse::<Dialect>().ok();

        if let Some(builtin) = builtin {
            if d.quote.is_none() && d.operators.is_empty() {
                return Ok(Arc::new(builtin));
            }
        }

        let base = match (&d.base, builtin) {
            (Some(base), _) => base
                .parse::<Dialect>()
                .map_err(|_| SettingsError::UnknownDialect(base.clone()))?,
            (None, Some(builtin)) => builtin,
            (None, None) => Dialect::default(),
        };

        let mut custom = CustomDialect::new(d.name.clone(), base);
        if let Some(quote) = d.quote {
            custom = custom.with_quote(quote);
        }
        for (key, text) in &d.operators {
            let op = key
                .parse::<Operator>()
                .map_err(|_| SettingsError::UnknownOperator(key.clone()))?;
            custom = custom.with_operator(op, text.clone());
        }
        Ok(Arc::new(custom))
    }

    /// Registry holding every configured entity.
    pub fn registry(&self) -> Result<Registry, SettingsError> {
        let registry = Registry::new();
        for (name, entity) in &self.entities {
            registry
                .register(name, entity.metadata(name))
                .map_err(|e| SettingsError::InvalidEntity(name.clone(), e))?;
        }
        Ok(registry)
    }

    /// Session over the configured dialect and entities.
    pub fn db(&self) -> Result<Db, SettingsError> {
        Ok(Db::new(Arc::new(self.registry()?), self.dialect()?))
    }
}
