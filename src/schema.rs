//! Section, setting and control definitions

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::sanitize::Sanitizer;
use crate::value::{SettingValue, ValueType};

/// A named group of controls, rendered together (one tab of a manager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Section {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A named, typed value with an optional default and cleaning function
#[derive(Debug, Clone)]
pub struct Setting {
    pub id: String,
    pub value_type: ValueType,
    pub default: Option<SettingValue>,
    pub sanitizer: Option<Sanitizer>,
}

impl Setting {
    pub fn new(id: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            value_type,
            default: None,
            sanitizer: None,
        }
    }

    /// Shorthand for a `string` setting, the most common kind.
    pub fn string(id: impl Into<String>) -> Self {
        Self::new(id, ValueType::String)
    }

    pub fn with_default(mut self, default: impl Into<SettingValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: impl Into<Sanitizer>) -> Self {
        self.sanitizer = Some(sanitizer.into());
        self
    }

    /// Whether the default (if any) carries the declared value type.
    pub fn default_matches(&self) -> bool {
        self.default
            .as_ref()
            .map_or(true, |d| d.matches(self.value_type))
    }

    /// Clean an externally submitted value.
    ///
    /// Runs the sanitizer when there is one. `datetime` settings parse string
    /// input on their own. The result must carry the declared value type.
    pub fn sanitize(&self, value: SettingValue) -> Result<SettingValue> {
        let cleaned = match &self.sanitizer {
            Some(sanitizer) => sanitizer.apply(value),
            None => value,
        };

        let cleaned = match (self.value_type, cleaned) {
            (ValueType::Date, SettingValue::String(raw)) => SettingValue::parse_date(&raw)
                .map(SettingValue::Date)
                .ok_or_else(|| SchemaError::InvalidValue {
                    setting: self.id.clone(),
                    reason: format!("'{}' is not a date", raw),
                })?,
            (_, other) => other,
        };

        if !cleaned.matches(self.value_type) {
            return Err(SchemaError::InvalidValue {
                setting: self.id.clone(),
                reason: format!(
                    "expected {} value, got {}",
                    self.value_type,
                    cleaned.value_type()
                ),
            });
        }

        Ok(cleaned)
    }
}

/// The kind of input a control renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlType {
    Text,
    Textarea,
    Checkbox,
    Checkboxes,
    Radio,
    Select,
    #[serde(alias = "select-group")]
    SelectGrouped,
    Color,
    Palette,
    RadioImage,
    Image,
    Datetime,
}

impl ControlType {
    pub const ALL: [ControlType; 12] = [
        ControlType::Text,
        ControlType::Textarea,
        ControlType::Checkbox,
        ControlType::Checkboxes,
        ControlType::Radio,
        ControlType::Select,
        ControlType::SelectGrouped,
        ControlType::Color,
        ControlType::Palette,
        ControlType::RadioImage,
        ControlType::Image,
        ControlType::Datetime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlType::Text => "text",
            ControlType::Textarea => "textarea",
            ControlType::Checkbox => "checkbox",
            ControlType::Checkboxes => "checkboxes",
            ControlType::Radio => "radio",
            ControlType::Select => "select",
            ControlType::SelectGrouped => "select-grouped",
            ControlType::Color => "color",
            ControlType::Palette => "palette",
            ControlType::RadioImage => "radio-image",
            ControlType::Image => "image",
            ControlType::Datetime => "datetime",
        }
    }

    /// Whether rendering needs an enumerated list of choices
    pub fn is_choice_based(&self) -> bool {
        matches!(
            self,
            ControlType::Checkboxes
                | ControlType::Radio
                | ControlType::Select
                | ControlType::SelectGrouped
                | ControlType::Palette
                | ControlType::RadioImage
        )
    }

    /// Whether this control can edit a setting of the given type. Only the
    /// list-valued `checkboxes` edits arrays; every other type edits scalars.
    pub fn can_edit(&self, value_type: ValueType) -> bool {
        (*self == ControlType::Checkboxes) == (value_type == ValueType::StringList)
    }

    /// Check that every entry has a shape this control type can render.
    pub fn check_choices(&self, choices: &[Choice]) -> std::result::Result<(), String> {
        for (i, choice) in choices.iter().enumerate() {
            let allowed = match (self, choice) {
                (_, Choice::Option(_)) => true,
                (
                    ControlType::SelectGrouped | ControlType::Palette,
                    Choice::Group { choices, .. },
                ) => {
                    if choices.is_empty() {
                        return Err(format!("group #{} '{}' has no choices", i, choice.label()));
                    }
                    true
                }
                (ControlType::Palette, Choice::Swatch { colors, .. }) => {
                    if colors.is_empty() {
                        return Err(format!("swatch '{}' has no colors", choice.label()));
                    }
                    true
                }
                (ControlType::RadioImage, Choice::Image { .. }) => true,
                _ => false,
            };
            if !allowed {
                return Err(format!(
                    "entry #{} has shape {} but {} takes {}",
                    i,
                    choice.shape(),
                    self,
                    self.expected_shape()
                ));
            }
        }
        Ok(())
    }

    fn expected_shape(&self) -> &'static str {
        match self {
            ControlType::SelectGrouped => "options or groups of options",
            ControlType::Palette => "options, groups or swatches",
            ControlType::RadioImage => "options or images",
            _ => "options",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (value, label) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One entry in a control's ordered choice list
///
/// Group and swatch entries keep their nesting; nothing is flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    /// Labeled group of options (`select-grouped`)
    Group {
        label: String,
        choices: Vec<ChoiceOption>,
    },
    /// Labeled list of colors (`palette`)
    Swatch {
        value: String,
        label: String,
        colors: Vec<String>,
    },
    /// Labeled thumbnail (`radio-image`)
    Image {
        value: String,
        label: String,
        url: String,
    },
    Option(ChoiceOption),
}

impl Choice {
    pub fn option(value: impl Into<String>, label: impl Into<String>) -> Self {
        Choice::Option(ChoiceOption::new(value, label))
    }

    pub fn group<I, V, L>(label: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        Choice::Group {
            label: label.into(),
            choices: options
                .into_iter()
                .map(|(v, l)| ChoiceOption::new(v, l))
                .collect(),
        }
    }

    pub fn swatch<I, C>(value: impl Into<String>, label: impl Into<String>, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Choice::Swatch {
            value: value.into(),
            label: label.into(),
            colors: colors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn image(
        value: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Choice::Image {
            value: value.into(),
            label: label.into(),
            url: url.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Choice::Group { label, .. }
            | Choice::Swatch { label, .. }
            | Choice::Image { label, .. } => label,
            Choice::Option(opt) => &opt.label,
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            Choice::Group { .. } => "group",
            Choice::Swatch { .. } => "swatch",
            Choice::Image { .. } => "image",
            Choice::Option(_) => "option",
        }
    }

    /// Selectable values of this entry; a group yields its members.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Choice::Group { choices, .. } => choices.iter().map(|c| c.value.as_str()).collect(),
            Choice::Swatch { value, .. } | Choice::Image { value, .. } => vec![value.as_str()],
            Choice::Option(opt) => vec![opt.value.as_str()],
        }
    }
}

/// A UI input bound to one setting and shown in one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub setting: String,
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

impl Control {
    /// A control bound to the setting with the same id.
    pub fn new(
        id: impl Into<String>,
        section: impl Into<String>,
        control_type: ControlType,
    ) -> Self {
        let id = id.into();
        Self {
            setting: id.clone(),
            id,
            section: section.into(),
            control_type,
            label: String::new(),
            description: None,
            choices: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = setting.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices.extend(choices);
        self
    }

    /// Append flat (value, label) options.
    pub fn options<I, V, L>(self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.choices(options.into_iter().map(|(v, l)| Choice::option(v, l)))
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Every selectable value across all entries, in order.
    pub fn choice_values(&self) -> Vec<&str> {
        self.choices.iter().flat_map(Choice::values).collect()
    }
}
