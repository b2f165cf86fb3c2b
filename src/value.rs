//! Setting value types and values

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};

/// Storage format for `date` values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Declared type of a setting's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    String,
    Boolean,
    /// An ordered list of strings (multiple checkboxes)
    #[serde(rename = "array")]
    StringList,
    #[serde(rename = "datetime", alias = "date")]
    Date,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::StringList => "array",
            ValueType::Date => "datetime",
        };
        f.write_str(name)
    }
}

/// A concrete setting value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    String(String),
    Boolean(bool),
    StringList(Vec<String>),
    Date(NaiveDateTime),
}

impl SettingValue {
    /// The type this value carries
    pub fn value_type(&self) -> ValueType {
        match self {
            SettingValue::String(_) => ValueType::String,
            SettingValue::Boolean(_) => ValueType::Boolean,
            SettingValue::StringList(_) => ValueType::StringList,
            SettingValue::Date(_) => ValueType::Date,
        }
    }

    pub fn matches(&self, value_type: ValueType) -> bool {
        self.value_type() == value_type
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            SettingValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Parse a date in storage format, ISO-8601 `T` form, or a bare `YYYY-MM-DD`.
    pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// Convert a loosely-typed JSON value into a value of `value_type`.
    ///
    /// Returns `Err` with the type the JSON value actually looked like when it
    /// cannot be read as `value_type`.
    pub fn from_json(
        value_type: ValueType,
        raw: &serde_json::Value,
    ) -> std::result::Result<Self, ValueType> {
        use serde_json::Value;

        match (value_type, raw) {
            (ValueType::String, Value::String(s)) => Ok(SettingValue::String(s.clone())),
            (ValueType::Boolean, Value::Bool(b)) => Ok(SettingValue::Boolean(*b)),
            (ValueType::StringList, Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(SettingValue::StringList)
                .ok_or(ValueType::StringList),
            (ValueType::Date, Value::String(s)) => Self::parse_date(s)
                .map(SettingValue::Date)
                .ok_or(ValueType::String),
            (_, Value::Bool(_)) => Err(ValueType::Boolean),
            (_, Value::Array(_)) => Err(ValueType::StringList),
            _ => Err(ValueType::String),
        }
    }

    /// Every string this value holds, used to check values against choices.
    pub fn choice_values(&self) -> Vec<&str> {
        match self {
            SettingValue::String(s) => vec![s.as_str()],
            SettingValue::StringList(items) => items.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => write!(f, "{}", s),
            SettingValue::Boolean(b) => write!(f, "{}", b),
            SettingValue::StringList(items) => write!(f, "[{}]", items.join(", ")),
            SettingValue::Date(d) => write!(f, "{}", d.format(DATETIME_FORMAT)),
        }
    }
}

impl Serialize for SettingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SettingValue::String(s) => serializer.serialize_str(s),
            SettingValue::Boolean(b) => serializer.serialize_bool(*b),
            SettingValue::StringList(items) => items.serialize(serializer),
            SettingValue::Date(d) => serializer.collect_str(&d.format(DATETIME_FORMAT)),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Boolean(b)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(items: Vec<String>) -> Self {
        SettingValue::StringList(items)
    }
}

impl From<NaiveDateTime> for SettingValue {
    fn from(d: NaiveDateTime) -> Self {
        SettingValue::Date(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_matches_declared_type() {
        let v = SettingValue::from_json(ValueType::String, &json!("yay")).unwrap();
        assert_eq!(v, SettingValue::String("yay".into()));

        let v = SettingValue::from_json(ValueType::StringList, &json!(["a", "b"])).unwrap();
        assert_eq!(v.as_list().unwrap(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_from_json_reports_actual_type() {
        assert_eq!(
            SettingValue::from_json(ValueType::String, &json!(true)),
            Err(ValueType::Boolean)
        );
        assert_eq!(
            SettingValue::from_json(ValueType::StringList, &json!(["a", 1])),
            Err(ValueType::StringList)
        );
    }

    #[test]
    fn test_parse_date_forms() {
        let full = SettingValue::parse_date("2016-05-01 13:45:00").unwrap();
        let iso = SettingValue::parse_date("2016-05-01T13:45:00").unwrap();
        assert_eq!(full, iso);

        let bare = SettingValue::parse_date("2016-05-01").unwrap();
        assert_eq!(bare.format(DATETIME_FORMAT).to_string(), "2016-05-01 00:00:00");

        assert!(SettingValue::parse_date("yesterday").is_none());
    }

    #[test]
    fn test_serialize_date_as_storage_string() {
        let d = SettingValue::parse_date("2016-05-01 13:45:00").unwrap();
        let out = serde_json::to_string(&SettingValue::Date(d)).unwrap();
        assert_eq!(out, "\"2016-05-01 13:45:00\"");
    }

    #[test]
    fn test_value_type_serde_names() {
        assert_eq!(serde_json::to_string(&ValueType::StringList).unwrap(), "\"array\"");
        let t: ValueType = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(t, ValueType::Date);
    }
}
