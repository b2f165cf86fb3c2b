//! Snapshots for rendering consumers
//!
//! A [`ManagerSnapshot`] is the registry laid out the way a renderer walks
//! it: sections in order, each carrying its controls in order, followed by
//! the settings. The fingerprint lets consumers cache rendered output.

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::registry::Manager;
use crate::schema::{Control, Section};
use crate::value::{SettingValue, ValueType};

#[derive(Debug, Clone, Serialize)]
pub struct SectionSnapshot {
    #[serde(flatten)]
    pub section: Section,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<SettingValue>,
    /// Name of the sanitizer, if one is attached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitizer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerSnapshot {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,
    pub sections: Vec<SectionSnapshot>,
    pub settings: Vec<SettingSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Checksum>,
}

/// Header fields used when reading a snapshot back for its fingerprint
#[derive(Debug, Deserialize)]
struct FingerprintOnly {
    fingerprint: Option<Checksum>,
}

impl ManagerSnapshot {
    pub fn from_manager(manager: &Manager) -> Result<Self> {
        let sections = manager
            .sections()
            .map(|section| SectionSnapshot {
                section: section.clone(),
                controls: manager
                    .list_controls_by_section(&section.id)
                    .cloned()
                    .collect(),
            })
            .collect();

        let settings = manager
            .settings()
            .map(|setting| SettingSnapshot {
                id: setting.id.clone(),
                value_type: setting.value_type,
                default: setting.default.clone(),
                sanitizer: setting.sanitizer.as_ref().map(|s| s.name().to_string()),
            })
            .collect();

        let mut snapshot = Self {
            id: manager.id().to_string(),
            label: manager.label().to_string(),
            contexts: manager.contexts().to_vec(),
            sections,
            settings,
            fingerprint: None,
        };
        snapshot.fingerprint = Some(snapshot.compute_fingerprint()?);
        Ok(snapshot)
    }

    fn compute_fingerprint(&self) -> Result<Checksum> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.remove("fingerprint");
        }
        Ok(Checksum::from_json(&value))
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let out = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(out)
    }
}

/// Check an exported JSON snapshot against its embedded fingerprint.
pub fn verify_export(json: &str) -> Result<bool> {
    let header: FingerprintOnly = serde_json::from_str(json)?;
    let Some(expected) = header.fingerprint else {
        return Ok(false);
    };
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    if let Some(map) = value.as_object_mut() {
        map.remove("fingerprint");
    }
    Ok(expected.verify_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ControlType, Setting};

    fn manager() -> Manager {
        let mut manager = Manager::new("hrct_example", "Haricot Example");
        manager
            .register_section(
                Section::new("hrct_color_fields", "Color Fields").with_icon("dashicons-art"),
            )
            .unwrap();
        manager
            .register_setting(Setting::string("hrct_color_a").with_default("#232323"))
            .unwrap();
        manager
            .register_control(
                Control::new("hrct_color_a", "hrct_color_fields", ControlType::Color)
                    .label("Pick a color"),
            )
            .unwrap();
        manager
    }

    #[test]
    fn test_snapshot_groups_controls_under_sections() {
        let snapshot = ManagerSnapshot::from_manager(&manager()).unwrap();
        assert_eq!(snapshot.sections.len(), 1);
        assert_eq!(snapshot.sections[0].controls[0].id, "hrct_color_a");

        let json: serde_json::Value =
            serde_json::from_str(&snapshot.render(OutputFormat::Compact).unwrap()).unwrap();
        assert_eq!(json["sections"][0]["icon"], "dashicons-art");
        assert_eq!(json["sections"][0]["controls"][0]["type"], "color");
        assert_eq!(json["settings"][0]["default"], "#232323");
    }

    #[test]
    fn test_export_verifies_and_detects_tampering() {
        let snapshot = ManagerSnapshot::from_manager(&manager()).unwrap();
        let pretty = snapshot.render(OutputFormat::Pretty).unwrap();
        assert!(verify_export(&pretty).unwrap());

        let tampered = pretty.replace("Pick a color", "Pick a colour");
        assert!(!verify_export(&tampered).unwrap());
    }
}
