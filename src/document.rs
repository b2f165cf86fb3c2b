//! Declarative manager documents
//!
//! A manager can be described in TOML (or JSON) and loaded through the same
//! registration calls code would use:
//!
//! ```toml
//! [manager]
//! id = "hrct_example"
//! label = "Haricot Example"
//! contexts = ["category"]
//!
//! [[section]]
//! id = "hrct_text_fields"
//! label = "Text Fields"
//! icon = "dashicons-edit"
//!
//! [[setting]]
//! id = "hrct_text_a"
//! default = "yay"
//! sanitize = "strip_tags"
//!
//! [[control]]
//! id = "hrct_text_a"
//! type = "text"
//! section = "hrct_text_fields"
//! label = "Example Text"
//! attributes = { class = "widefat" }
//! ```
//!
//! [`ManagerDocument::from_manager`] goes the other way, so a manager built in
//! code can be written out and loaded back unchanged.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::registry::{DuplicatePolicy, Manager};
use crate::sanitize::BuiltinSanitizer;
use crate::schema::{Choice, Control, ControlType, Section, Setting};
use crate::value::{SettingValue, ValueType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerHeader {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,
}

/// A setting as written in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<BuiltinSanitizer>,
}

impl SettingEntry {
    fn into_setting(self) -> Result<Setting> {
        let mut setting = Setting::new(self.id, self.value_type);
        if let Some(raw) = &self.default {
            let default = SettingValue::from_json(self.value_type, raw).map_err(|actual| {
                SchemaError::InvalidDefault {
                    setting: setting.id.clone(),
                    expected: self.value_type,
                    actual,
                }
            })?;
            setting.default = Some(default);
        }
        setting.sanitizer = self.sanitize.map(BuiltinSanitizer::sanitizer);
        Ok(setting)
    }

    fn from_setting(setting: &Setting) -> Result<Self> {
        let sanitize = match &setting.sanitizer {
            None => None,
            Some(sanitizer) => Some(sanitizer.builtin().ok_or_else(|| {
                SchemaError::UnrepresentableSanitizer {
                    setting: setting.id.clone(),
                    sanitizer: sanitizer.name().to_string(),
                }
            })?),
        };
        let default = setting
            .default
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        Ok(Self {
            id: setting.id.clone(),
            value_type: setting.value_type,
            default,
            sanitize,
        })
    }
}

/// A control as written in a document; `setting` defaults to the control id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    pub section: String,
    #[serde(rename = "type")]
    pub control_type: ControlType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl From<&Control> for ControlEntry {
    fn from(control: &Control) -> Self {
        ControlEntry {
            id: control.id.clone(),
            setting: (control.setting != control.id).then(|| control.setting.clone()),
            section: control.section.clone(),
            control_type: control.control_type,
            label: control.label.clone(),
            description: control.description.clone(),
            choices: control.choices.clone(),
            attributes: control.attributes.clone(),
        }
    }
}

impl From<ControlEntry> for Control {
    fn from(entry: ControlEntry) -> Self {
        Control {
            setting: entry.setting.unwrap_or_else(|| entry.id.clone()),
            id: entry.id,
            section: entry.section,
            control_type: entry.control_type,
            label: entry.label,
            description: entry.description,
            choices: entry.choices,
            attributes: entry.attributes,
        }
    }
}

/// A whole manager described as data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerDocument {
    pub manager: ManagerHeader,
    #[serde(default, rename = "section", skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(default, rename = "setting", skip_serializing_if = "Vec::is_empty")]
    pub settings: Vec<SettingEntry>,
    #[serde(default, rename = "control", skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<ControlEntry>,
}

impl ManagerDocument {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a document; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading manager document");
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Describe an existing manager in registration order.
    ///
    /// Fails with `UnrepresentableSanitizer` when a setting carries a closure
    /// instead of a built-in sanitizer.
    pub fn from_manager(manager: &Manager) -> Result<Self> {
        let settings = manager
            .settings()
            .map(SettingEntry::from_setting)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            manager: ManagerHeader {
                id: manager.id().to_string(),
                label: manager.label().to_string(),
                contexts: manager.contexts().to_vec(),
            },
            sections: manager.sections().cloned().collect(),
            settings,
            controls: manager.controls().map(ControlEntry::from).collect(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register everything in order: sections, settings, then controls.
    ///
    /// Fails on the first registration error.
    pub fn into_manager(self, policy: DuplicatePolicy) -> Result<Manager> {
        let mut manager = Manager::new(self.manager.id, self.manager.label)
            .with_contexts(self.manager.contexts)
            .with_policy(policy);

        for section in self.sections {
            manager.register_section(section)?;
        }
        for entry in self.settings {
            manager.register_setting(entry.into_setting()?)?;
        }
        for entry in self.controls {
            manager.register_control(entry.into())?;
        }

        Ok(manager)
    }
}
