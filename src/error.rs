//! Error types for the field schema registry

use std::fmt;

use thiserror::Error;

use crate::value::ValueType;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Which registry category an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Section,
    Setting,
    Control,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Section => "section",
            EntityKind::Setting => "setting",
            EntityKind::Control => "control",
        };
        f.write_str(name)
    }
}

/// Renders an optional "did you mean" hint for unknown-id errors.
fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// Field schema registry errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{kind} already registered: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("default for setting '{setting}' is not a {expected} value (got {actual})")]
    InvalidDefault {
        setting: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("control '{control}' references unknown section '{section}'{}", hint(.suggestion))]
    UnknownSection {
        control: String,
        section: String,
        suggestion: Option<String>,
    },

    #[error("control '{control}' references unknown setting '{setting}'{}", hint(.suggestion))]
    UnknownSetting {
        control: String,
        setting: String,
        suggestion: Option<String>,
    },

    #[error("control '{control}' of type {control_type} requires choices")]
    MissingChoices { control: String, control_type: String },

    #[error("control '{control}' of type {control_type} does not take choices")]
    ChoicesNotAllowed { control: String, control_type: String },

    #[error("invalid choices for control '{control}': {reason}")]
    InvalidChoiceShape { control: String, reason: String },

    #[error(
        "control '{control}' of type {control_type} cannot edit {value_type} setting '{setting}'"
    )]
    IncompatibleSetting {
        control: String,
        control_type: String,
        setting: String,
        value_type: ValueType,
    },

    #[error("{kind} not found: {id}{}", hint(.suggestion))]
    NotFound {
        kind: EntityKind,
        id: String,
        suggestion: Option<String>,
    },

    #[error("invalid value for setting '{setting}': {reason}")]
    InvalidValue { setting: String, reason: String },

    #[error("setting '{setting}' has custom sanitizer '{sanitizer}' with no document form")]
    UnrepresentableSanitizer { setting: String, sanitizer: String },

    #[error("manager '{manager}' is frozen: cannot register {kind} '{id}'")]
    Frozen {
        manager: String,
        kind: EntityKind,
        id: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SchemaError {
    /// The id of the entity the error is about, when there is one.
    pub fn subject(&self) -> Option<&str> {
        match self {
            SchemaError::DuplicateId { id, .. }
            | SchemaError::NotFound { id, .. }
            | SchemaError::Frozen { id, .. } => Some(id),
            SchemaError::InvalidDefault { setting, .. }
            | SchemaError::InvalidValue { setting, .. }
            | SchemaError::UnrepresentableSanitizer { setting, .. } => Some(setting),
            SchemaError::UnknownSection { control, .. }
            | SchemaError::UnknownSetting { control, .. }
            | SchemaError::MissingChoices { control, .. }
            | SchemaError::ChoicesNotAllowed { control, .. }
            | SchemaError::InvalidChoiceShape { control, .. }
            | SchemaError::IncompatibleSetting { control, .. } => Some(control),
            _ => None,
        }
    }
}
