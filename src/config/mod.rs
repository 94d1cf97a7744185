//! Configuration module for ormql.
//!
//! Handles the dialect selection and configured entities.

mod settings;

pub use settings::{DialectSettings, EntitySettings, Settings, SettingsError, CONFIG_ENV};
