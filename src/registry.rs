//! Field Schema Registry
//!
//! A [`Manager`] accumulates sections, settings and controls, checks them as
//! they arrive, and hands them out in registration order. Each category is a
//! `Vec` in insertion order plus an id index into it.

use std::collections::HashMap;
use std::fmt;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EntityKind, Result, SchemaError};
use crate::schema::{Control, Section, Setting};
use crate::value::SettingValue;

/// What `register_*` does with an id that is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateId`
    #[default]
    Reject,
    /// Overwrite in place, keeping the original position
    Replace,
}

/// Kind of problem found by [`Manager::validate`] or [`Manager::lint_defaults`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    UnknownSection,
    UnknownSetting,
    MissingChoices,
    ChoicesNotAllowed,
    InvalidChoiceShape,
    InvalidDefault,
    IncompatibleSetting,
    /// Only reported by `lint_defaults`
    DefaultNotInChoices,
}

/// One consistency problem in a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Id of the setting or control at fault
    pub subject: String,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, subject: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Insertion-ordered entries with an id index
#[derive(Debug, Clone)]
struct Ordered<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Ordered<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Ordered<T> {
    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Store `item` under `id`. Returns true when an existing entry was replaced.
    fn put(&mut self, id: String, item: T, replace: bool, kind: EntityKind) -> Result<bool> {
        match self.index.get(&id).copied() {
            Some(i) if replace => {
                self.items[i] = item;
                Ok(true)
            }
            Some(_) => Err(SchemaError::DuplicateId { kind, id }),
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(item);
                Ok(false)
            }
        }
    }
}

/// Best fuzzy match for `query` among `candidates`.
///
/// Only candidates containing `query` as an ordered subsequence score, so
/// dropped characters and abbreviations get a hint and transposed ones don't.
fn suggest<'a>(query: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let matcher = SkimMatcherV2::default();
    candidates
        .filter_map(|c| matcher.fuzzy_match(c, query).map(|score| (score, c)))
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, c)| c.to_string())
}

/// A manager: one settings panel's sections, settings and controls
#[derive(Debug, Clone)]
pub struct Manager {
    id: String,
    label: String,
    contexts: Vec<String>,
    policy: DuplicatePolicy,
    frozen: bool,
    sections: Ordered<Section>,
    settings: Ordered<Setting>,
    controls: Ordered<Control>,
}

impl Manager {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            contexts: Vec::new(),
            policy: DuplicatePolicy::default(),
            frozen: false,
            sections: Ordered::default(),
            settings: Ordered::default(),
            controls: Ordered::default(),
        }
    }

    /// Restrict the manager to the given contexts (e.g. `"category"`).
    pub fn with_contexts<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contexts = contexts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// An empty context list applies everywhere.
    pub fn applies_to(&self, context: &str) -> bool {
        self.contexts.is_empty() || self.contexts.iter().any(|c| c == context)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Close the registration phase. Lookups keep working.
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            info!(
                manager = %self.id,
                sections = self.sections.items.len(),
                settings = self.settings.items.len(),
                controls = self.controls.items.len(),
                "manager frozen"
            );
        }
    }

    fn ensure_open(&self, kind: EntityKind, id: &str) -> Result<()> {
        if self.frozen {
            return Err(SchemaError::Frozen {
                manager: self.id.clone(),
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    pub fn register_section(&mut self, section: Section) -> Result<()> {
        let replace = self.policy == DuplicatePolicy::Replace;
        self.insert_section(section, replace)
    }

    /// Register a section, overwriting any existing one with the same id.
    pub fn replace_section(&mut self, section: Section) -> Result<()> {
        self.insert_section(section, true)
    }

    fn insert_section(&mut self, section: Section, replace: bool) -> Result<()> {
        self.ensure_open(EntityKind::Section, &section.id)?;
        let id = section.id.clone();
        let replaced = self
            .sections
            .put(id.clone(), section, replace, EntityKind::Section)?;
        if replaced {
            warn!(manager = %self.id, section = %id, "replaced section");
        } else {
            debug!(manager = %self.id, section = %id, "registered section");
        }
        Ok(())
    }

    pub fn register_setting(&mut self, setting: Setting) -> Result<()> {
        let replace = self.policy == DuplicatePolicy::Replace;
        self.insert_setting(setting, replace)
    }

    /// Register a setting, overwriting any existing one with the same id.
    pub fn replace_setting(&mut self, setting: Setting) -> Result<()> {
        self.insert_setting(setting, true)
    }

    fn insert_setting(&mut self, setting: Setting, replace: bool) -> Result<()> {
        self.ensure_open(EntityKind::Setting, &setting.id)?;
        if let Some(default) = &setting.default {
            if !default.matches(setting.value_type) {
                return Err(SchemaError::InvalidDefault {
                    setting: setting.id.clone(),
                    expected: setting.value_type,
                    actual: default.value_type(),
                });
            }
        }
        let id = setting.id.clone();
        let value_type = setting.value_type;
        let replaced = self
            .settings
            .put(id.clone(), setting, replace, EntityKind::Setting)?;
        if replaced {
            warn!(manager = %self.id, setting = %id, "replaced setting");
        } else {
            debug!(manager = %self.id, setting = %id, %value_type, "registered setting");
        }
        Ok(())
    }

    pub fn register_control(&mut self, control: Control) -> Result<()> {
        let replace = self.policy == DuplicatePolicy::Replace;
        self.insert_control(control, replace)
    }

    /// Register a control, overwriting any existing one with the same id.
    pub fn replace_control(&mut self, control: Control) -> Result<()> {
        self.insert_control(control, true)
    }

    fn insert_control(&mut self, control: Control, replace: bool) -> Result<()> {
        self.ensure_open(EntityKind::Control, &control.id)?;
        self.check_control(&control)?;
        let id = control.id.clone();
        let section = control.section.clone();
        let replaced = self
            .controls
            .put(id.clone(), control, replace, EntityKind::Control)?;
        if replaced {
            warn!(manager = %self.id, control = %id, "replaced control");
        } else {
            debug!(manager = %self.id, control = %id, %section, "registered control");
        }
        Ok(())
    }

    /// Everything `register_control` verifies before storing.
    fn check_control(&self, control: &Control) -> Result<()> {
        if !self.sections.contains(&control.section) {
            return Err(SchemaError::UnknownSection {
                control: control.id.clone(),
                section: control.section.clone(),
                suggestion: suggest(&control.section, self.sections.ids()),
            });
        }

        let setting = self
            .settings
            .get(&control.setting)
            .ok_or_else(|| SchemaError::UnknownSetting {
                control: control.id.clone(),
                setting: control.setting.clone(),
                suggestion: suggest(&control.setting, self.settings.ids()),
            })?;

        let control_type = control.control_type;
        if control_type.is_choice_based() {
            if control.choices.is_empty() {
                return Err(SchemaError::MissingChoices {
                    control: control.id.clone(),
                    control_type: control_type.to_string(),
                });
            }
            control_type
                .check_choices(&control.choices)
                .map_err(|reason| SchemaError::InvalidChoiceShape {
                    control: control.id.clone(),
                    reason,
                })?;
        } else if !control.choices.is_empty() {
            return Err(SchemaError::ChoicesNotAllowed {
                control: control.id.clone(),
                control_type: control_type.to_string(),
            });
        }

        if !control_type.can_edit(setting.value_type) {
            return Err(SchemaError::IncompatibleSetting {
                control: control.id.clone(),
                control_type: control_type.to_string(),
                setting: setting.id.clone(),
                value_type: setting.value_type,
            });
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    pub fn get_section(&self, id: &str) -> Result<&Section> {
        self.sections.get(id).ok_or_else(|| SchemaError::NotFound {
            kind: EntityKind::Section,
            id: id.to_string(),
            suggestion: suggest(id, self.sections.ids()),
        })
    }

    pub fn get_setting(&self, id: &str) -> Result<&Setting> {
        self.settings.get(id).ok_or_else(|| SchemaError::NotFound {
            kind: EntityKind::Setting,
            id: id.to_string(),
            suggestion: suggest(id, self.settings.ids()),
        })
    }

    pub fn get_control(&self, id: &str) -> Result<&Control> {
        self.controls.get(id).ok_or_else(|| SchemaError::NotFound {
            kind: EntityKind::Control,
            id: id.to_string(),
            suggestion: suggest(id, self.controls.ids()),
        })
    }

    /// Sections in registration order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.items.iter()
    }

    /// Settings in registration order
    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.settings.items.iter()
    }

    /// Controls in registration order
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.controls.items.iter()
    }

    /// Controls of one section, in registration order.
    ///
    /// Each call starts a fresh pass over the current state; an unknown
    /// section simply yields nothing.
    pub fn list_controls_by_section<'a>(
        &'a self,
        section_id: &'a str,
    ) -> impl Iterator<Item = &'a Control> + 'a {
        self.controls
            .items
            .iter()
            .filter(move |c| c.section == section_id)
    }

    /// Default values of every setting that declares one, in registration order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.settings
            .items
            .iter()
            .filter_map(|s| s.default.as_ref().map(|d| (s.id.as_str(), d)))
    }

    /// Clean a submitted value with the named setting's sanitizer.
    pub fn sanitize(&self, setting_id: &str, value: SettingValue) -> Result<SettingValue> {
        self.get_setting(setting_id)?.sanitize(value)
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Check the whole registry and report every problem found.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for setting in self.settings() {
            if let Some(default) = &setting.default {
                if !default.matches(setting.value_type) {
                    violations.push(Violation::new(
                        ViolationKind::InvalidDefault,
                        &setting.id,
                        format!(
                            "default is {} but setting is declared {}",
                            default.value_type(),
                            setting.value_type
                        ),
                    ));
                }
            }
        }

        for control in self.controls() {
            self.validate_control(control, &mut violations);
        }

        violations
    }

    fn validate_control(&self, control: &Control, violations: &mut Vec<Violation>) {
        let id = &control.id;
        let control_type = control.control_type;

        if !self.sections.contains(&control.section) {
            violations.push(Violation::new(
                ViolationKind::UnknownSection,
                id,
                format!("section '{}' is not registered", control.section),
            ));
        }

        if control_type.is_choice_based() {
            if control.choices.is_empty() {
                violations.push(Violation::new(
                    ViolationKind::MissingChoices,
                    id,
                    format!("{} control has no choices", control_type),
                ));
            } else if let Err(reason) = control_type.check_choices(&control.choices) {
                violations.push(Violation::new(ViolationKind::InvalidChoiceShape, id, reason));
            }
        } else if !control.choices.is_empty() {
            violations.push(Violation::new(
                ViolationKind::ChoicesNotAllowed,
                id,
                format!("{} control does not take choices", control_type),
            ));
        }

        let Some(setting) = self.settings.get(&control.setting) else {
            violations.push(Violation::new(
                ViolationKind::UnknownSetting,
                id,
                format!("setting '{}' is not registered", control.setting),
            ));
            return;
        };

        if !control_type.can_edit(setting.value_type) {
            violations.push(Violation::new(
                ViolationKind::IncompatibleSetting,
                id,
                format!(
                    "{} control cannot edit {} setting '{}'",
                    control_type, setting.value_type, setting.id
                ),
            ));
        }
    }

    /// Opt-in check, separate from [`Manager::validate`]: report choice
    /// controls whose setting default is not one of the offered values.
    ///
    /// An out-of-list default is legal; a renderer just shows nothing
    /// selected. Controls that `validate()` already flags are skipped.
    pub fn lint_defaults(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for control in self.controls() {
            let control_type = control.control_type;
            if !control_type.is_choice_based()
                || control.choices.is_empty()
                || control_type.check_choices(&control.choices).is_err()
            {
                continue;
            }
            let Some(setting) = self.settings.get(&control.setting) else {
                continue;
            };
            let Some(default) = &setting.default else {
                continue;
            };
            if !control_type.can_edit(setting.value_type) {
                continue;
            }

            let allowed = control.choice_values();
            for value in default.choice_values() {
                if !allowed.contains(&value) {
                    violations.push(Violation::new(
                        ViolationKind::DefaultNotInChoices,
                        &control.id,
                        format!(
                            "default '{}' of setting '{}' is not one of the choices",
                            value, setting.id
                        ),
                    ));
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Choice, ControlType};
    use crate::value::ValueType;

    fn scaffold() -> Manager {
        let mut manager = Manager::new("hrct_example", "Haricot Example");
        manager
            .register_section(Section::new("text_fields", "Text Fields"))
            .unwrap();
        manager
            .register_section(Section::new("common_fields", "Common Fields"))
            .unwrap();
        manager
            .register_setting(Setting::string("text_a").with_default("yay"))
            .unwrap();
        manager
    }

    #[test]
    fn test_basic_scenario_validates_clean() {
        let mut manager = scaffold();
        manager
            .register_control(
                Control::new("text_a_ctrl", "text_fields", ControlType::Text).setting("text_a"),
            )
            .unwrap();

        assert!(manager.validate().is_empty());
        let ids: Vec<_> = manager
            .list_controls_by_section("text_fields")
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["text_a_ctrl"]);
    }

    #[test]
    fn test_default_round_trips() {
        let manager = scaffold();
        let setting = manager.get_setting("text_a").unwrap();
        assert_eq!(setting.default, Some(SettingValue::String("yay".into())));
        assert_eq!(setting.value_type, ValueType::String);
    }

    #[test]
    fn test_unknown_section_leaves_state_unchanged() {
        let mut manager = scaffold();
        let err = manager
            .register_control(
                Control::new("text_a_ctrl", "nonexistent", ControlType::Text).setting("text_a"),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSection { .. }));
        assert_eq!(manager.controls().count(), 0);
        assert!(manager.get_control("text_a_ctrl").is_err());
    }

    #[test]
    fn test_unknown_section_wins_over_other_problems() {
        let mut manager = scaffold();
        // Unknown setting and missing choices too; the section is reported.
        let err = manager
            .register_control(Control::new("radio", "nowhere", ControlType::Radio))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSection { .. }));
    }

    #[test]
    fn test_unknown_section_suggestion() {
        let mut manager = scaffold();
        let err = manager
            .register_control(Control::new("text_a", "text", ControlType::Text))
            .unwrap_err();
        match err {
            SchemaError::UnknownSection { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("text_fields"));
            }
            other => panic!("expected UnknownSection, got {:?}", other),
        }
    }

    #[test]
    fn test_suggestion_for_dropped_characters() {
        let mut manager = scaffold();
        let err = manager
            .register_control(Control::new("text_a", "txt_fields", ControlType::Text))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "control 'text_a' references unknown section 'txt_fields' \
             (did you mean 'text_fields'?)"
        );

        let err = manager.get_section("comon_fields").unwrap_err();
        match err {
            SchemaError::NotFound { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("common_fields"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_setting() {
        let mut manager = scaffold();
        let err = manager
            .register_control(Control::new("missing", "text_fields", ControlType::Text))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSetting { .. }));
    }

    #[test]
    fn test_missing_choices() {
        let mut manager = scaffold();
        manager.register_setting(Setting::string("radio_a")).unwrap();
        let err = manager
            .register_control(Control::new("radio_a", "common_fields", ControlType::Radio))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingChoices { .. }));
    }

    #[test]
    fn test_choices_not_allowed_on_text() {
        let mut manager = scaffold();
        let err = manager
            .register_control(
                Control::new("text_a", "text_fields", ControlType::Text).options([("a", "A")]),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::ChoicesNotAllowed { .. }));
    }

    #[test]
    fn test_nested_group_shape_rejected() {
        let mut manager = scaffold();
        manager.register_setting(Setting::string("select_a")).unwrap();
        let err = manager
            .register_control(
                Control::new("select_a", "common_fields", ControlType::Select)
                    .choices([Choice::group("Citrus", [("lemon", "Lemon")])]),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidChoiceShape { .. }));
    }

    #[test]
    fn test_grouped_select_keeps_shape() {
        let mut manager = scaffold();
        manager.register_setting(Setting::string("select_b")).unwrap();
        manager
            .register_control(
                Control::new("select_b", "common_fields", ControlType::SelectGrouped)
                    .choices([Choice::group("Citrus", [("lemon", "Lemon")])]),
            )
            .unwrap();

        assert!(manager.validate().is_empty());
        let control = manager.list_controls_by_section("common_fields").next().unwrap();
        match &control.choices[..] {
            [Choice::Group { label, choices }] => {
                assert_eq!(label, "Citrus");
                assert_eq!(choices.len(), 1);
                assert_eq!(choices[0].value, "lemon");
                assert_eq!(choices[0].label, "Lemon");
            }
            other => panic!("expected one group, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_default() {
        let mut manager = scaffold();
        let err = manager
            .register_setting(Setting::new("checkbox_a", ValueType::Boolean).with_default("yes"))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidDefault {
                expected: ValueType::Boolean,
                actual: ValueType::String,
                ..
            }
        ));
        assert!(manager.get_setting("checkbox_a").is_err());
    }

    #[test]
    fn test_incompatible_setting() {
        let mut manager = scaffold();
        let err = manager
            .register_control(
                Control::new("checks", "common_fields", ControlType::Checkboxes)
                    .setting("text_a")
                    .options([("a", "A"), ("b", "B")]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::IncompatibleSetting {
                value_type: ValueType::String,
                ..
            }
        ));

        manager
            .register_setting(Setting::new("list_a", ValueType::StringList))
            .unwrap();
        let err = manager
            .register_control(Control::new("list_a", "text_fields", ControlType::Text))
            .unwrap_err();
        assert!(matches!(err, SchemaError::IncompatibleSetting { .. }));
    }

    #[test]
    fn test_scalar_controls_edit_boolean_and_date_settings() {
        let mut manager = scaffold();
        manager
            .register_setting(Setting::new("enabled", ValueType::Boolean).with_default(true))
            .unwrap();
        manager
            .register_setting(Setting::new("published", ValueType::Date))
            .unwrap();
        manager
            .register_control(
                Control::new("enabled", "common_fields", ControlType::Radio)
                    .options([("1", "Yes"), ("", "No")]),
            )
            .unwrap();
        manager
            .register_control(Control::new("published", "common_fields", ControlType::Text))
            .unwrap();
        manager
            .register_control(
                Control::new("check_text", "common_fields", ControlType::Checkbox)
                    .setting("text_a"),
            )
            .unwrap();

        assert!(manager.validate().is_empty());
    }

    #[test]
    fn test_palette_and_radio_image_accept_plain_options() {
        let mut manager = scaffold();
        for id in ["palette_a", "palette_b", "radio_image_a"] {
            manager.register_setting(Setting::string(id)).unwrap();
        }
        manager
            .register_control(
                Control::new("palette_a", "common_fields", ControlType::Palette)
                    .options([("light", "Light"), ("dark", "Dark")]),
            )
            .unwrap();
        manager
            .register_control(
                Control::new("palette_b", "common_fields", ControlType::Palette)
                    .choices([Choice::group("Warm", [("red", "Red"), ("amber", "Amber")])]),
            )
            .unwrap();
        manager
            .register_control(
                Control::new("radio_image_a", "common_fields", ControlType::RadioImage)
                    .options([("left", "Left"), ("right", "Right")]),
            )
            .unwrap();

        assert!(manager.validate().is_empty());
        let palette = manager.get_control("palette_b").unwrap();
        assert_eq!(palette.choice_values(), ["red", "amber"]);
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut manager = scaffold();
        let err = manager
            .register_section(Section::new("text_fields", "Again"))
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateId {
                kind: EntityKind::Section,
                ..
            }
        ));
        assert_eq!(manager.get_section("text_fields").unwrap().label, "Text Fields");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut manager = scaffold();
        manager
            .replace_section(Section::new("text_fields", "Texts").with_icon("dashicons-edit"))
            .unwrap();
        let labels: Vec<_> = manager.sections().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Texts", "Common Fields"]);
    }

    #[test]
    fn test_replace_policy() {
        let mut manager = Manager::new("m", "M").with_policy(DuplicatePolicy::Replace);
        manager.register_setting(Setting::string("a")).unwrap();
        manager
            .register_setting(Setting::string("a").with_default("b"))
            .unwrap();
        assert_eq!(manager.settings().count(), 1);
        assert!(manager.get_setting("a").unwrap().default.is_some());
    }

    #[test]
    fn test_list_controls_by_section_order_and_filter() {
        let mut manager = scaffold();
        for id in ["c1", "c2", "c3", "c4"] {
            manager.register_setting(Setting::string(id)).unwrap();
        }
        let sections = ["common_fields", "text_fields", "common_fields", "common_fields"];
        for (id, section) in ["c1", "c2", "c3", "c4"].into_iter().zip(sections) {
            manager
                .register_control(Control::new(id, section, ControlType::Text))
                .unwrap();
        }

        let common: Vec<_> = manager
            .list_controls_by_section("common_fields")
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(common, ["c1", "c3", "c4"]);

        // Fresh pass each call
        assert_eq!(manager.list_controls_by_section("common_fields").count(), 3);
        assert_eq!(manager.list_controls_by_section("nope").count(), 0);
    }

    #[test]
    fn test_freeze_blocks_registration() {
        let mut manager = scaffold();
        manager.freeze();
        let err = manager
            .register_section(Section::new("late", "Late"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Frozen { .. }));
        assert!(manager.get_section("text_fields").is_ok());
    }

    #[test]
    fn test_default_outside_choices_is_only_linted() {
        let mut manager = scaffold();
        manager
            .register_setting(Setting::string("radio_a").with_default("choice_z"))
            .unwrap();
        manager
            .register_control(
                Control::new("radio_a", "common_fields", ControlType::Radio)
                    .options([("choice_a", "Choice A"), ("choice_b", "Choice B")]),
            )
            .unwrap();

        assert!(manager.validate().is_empty());

        let lints = manager.lint_defaults();
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].kind, ViolationKind::DefaultNotInChoices);
        assert_eq!(lints[0].subject, "radio_a");
        assert!(lints[0].message.contains("choice_z"));
    }

    #[test]
    fn test_validate_aggregates_after_replacement() {
        let mut manager = scaffold();
        manager
            .register_control(Control::new("text_a", "text_fields", ControlType::Text))
            .unwrap();
        manager.register_setting(Setting::string("text_b")).unwrap();
        manager
            .register_control(Control::new("text_b", "text_fields", ControlType::Text))
            .unwrap();

        // Retype both settings under the controls' feet
        manager
            .replace_setting(Setting::new("text_a", ValueType::StringList))
            .unwrap();
        manager
            .replace_setting(Setting::new("text_b", ValueType::StringList))
            .unwrap();

        let violations = manager.validate();
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::IncompatibleSetting));
    }

    #[test]
    fn test_sanitize_through_manager() {
        let mut manager = scaffold();
        manager
            .register_setting(
                Setting::string("key_a").with_sanitizer(crate::sanitize::BuiltinSanitizer::Key),
            )
            .unwrap();
        let out = manager.sanitize("key_a", "Choice A".into()).unwrap();
        assert_eq!(out, SettingValue::String("choicea".into()));
        assert!(matches!(
            manager.sanitize("nope", "x".into()),
            Err(SchemaError::NotFound { .. })
        ));
    }

    #[test]
    fn test_manager_is_shareable_once_frozen() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Manager>();
    }
}
