//! Sanitizers: typed cleaning functions stored on settings
//!
//! A [`Sanitizer`] is a pure `SettingValue -> SettingValue` function. The
//! registry never resolves sanitizers by name; documents pick one of the
//! [`BuiltinSanitizer`] variants, everything else passes a closure.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::SettingValue;

type SanitizeFn = dyn Fn(SettingValue) -> SettingValue + Send + Sync;

/// A shareable, pure cleaning function for setting values
#[derive(Clone)]
pub struct Sanitizer {
    name: String,
    builtin: Option<BuiltinSanitizer>,
    func: Arc<SanitizeFn>,
}

impl Sanitizer {
    /// Wrap a closure. `name` only shows up in debug output and exports.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(SettingValue) -> SettingValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            builtin: None,
            func: Arc::new(func),
        }
    }

    /// Build a sanitizer from a string cleaner. Lists are cleaned element by
    /// element; booleans and dates pass through untouched.
    pub fn for_strings<F>(name: impl Into<String>, clean: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(name, move |value| match value {
            SettingValue::String(s) => SettingValue::String(clean(s.as_str())),
            SettingValue::StringList(items) => {
                SettingValue::StringList(items.iter().map(|s| clean(s.as_str())).collect())
            }
            other => other,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The built-in this sanitizer was made from, if any. Closures have none
    /// and cannot be written back to a document.
    pub fn builtin(&self) -> Option<BuiltinSanitizer> {
        self.builtin
    }

    pub fn apply(&self, value: SettingValue) -> SettingValue {
        (self.func)(value)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sanitizer").field(&self.name).finish()
    }
}

/// Cleaners available to declarative documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinSanitizer {
    /// Remove all markup
    StripTags,
    /// Keep markup, drop script/style blocks and inline event handlers
    KsesPost,
    /// Lowercase; keep only `a-z`, `0-9`, `_` and `-`
    Key,
    /// Three or six hex digits without a leading `#`
    HexColorNoHash,
    /// Three or six hex digits with a leading `#`
    HexColor,
    /// Truthy strings become `true`
    Boolean,
    /// Non-negative integer string, or empty
    Absint,
}

impl BuiltinSanitizer {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinSanitizer::StripTags => "strip_tags",
            BuiltinSanitizer::KsesPost => "kses_post",
            BuiltinSanitizer::Key => "key",
            BuiltinSanitizer::HexColorNoHash => "hex_color_no_hash",
            BuiltinSanitizer::HexColor => "hex_color",
            BuiltinSanitizer::Boolean => "boolean",
            BuiltinSanitizer::Absint => "absint",
        }
    }

    pub fn sanitizer(self) -> Sanitizer {
        let sanitizer = match self {
            BuiltinSanitizer::StripTags => Sanitizer::for_strings(self.name(), strip_tags),
            BuiltinSanitizer::KsesPost => Sanitizer::for_strings(self.name(), kses_post),
            BuiltinSanitizer::Key => Sanitizer::for_strings(self.name(), key),
            BuiltinSanitizer::HexColorNoHash => {
                Sanitizer::for_strings(self.name(), hex_color_no_hash)
            }
            BuiltinSanitizer::HexColor => Sanitizer::for_strings(self.name(), hex_color),
            BuiltinSanitizer::Absint => Sanitizer::for_strings(self.name(), absint),
            BuiltinSanitizer::Boolean => Sanitizer::new(self.name(), |value| match value {
                SettingValue::Boolean(b) => SettingValue::Boolean(b),
                SettingValue::String(s) => SettingValue::Boolean(is_truthy(&s)),
                SettingValue::StringList(items) => SettingValue::Boolean(!items.is_empty()),
                SettingValue::Date(_) => SettingValue::Boolean(true),
            }),
        };
        Sanitizer {
            builtin: Some(self),
            ..sanitizer
        }
    }
}

impl From<BuiltinSanitizer> for Sanitizer {
    fn from(builtin: BuiltinSanitizer) -> Self {
        builtin.sanitizer()
    }
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern"))
}

fn script_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
            .expect("script pattern")
    })
}

fn handler_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("handler pattern")
    })
}

fn hex_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[0-9A-Fa-f]{3}){1,2}$").expect("hex pattern"))
}

/// Remove every tag, keeping text content.
pub fn strip_tags(raw: &str) -> String {
    let without_scripts = script_pattern().replace_all(raw, "");
    tag_pattern().replace_all(&without_scripts, "").trim().to_string()
}

/// Keep post markup but drop script/style blocks and `on*=` handlers.
pub fn kses_post(raw: &str) -> String {
    let without_scripts = script_pattern().replace_all(raw, "");
    handler_pattern().replace_all(&without_scripts, "").into_owned()
}

pub fn key(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

pub fn hex_color_no_hash(raw: &str) -> String {
    let digits = raw.trim().trim_start_matches('#');
    if hex_pattern().is_match(digits) {
        digits.to_string()
    } else {
        String::new()
    }
}

pub fn hex_color(raw: &str) -> String {
    let digits = hex_color_no_hash(raw);
    if digits.is_empty() {
        digits
    } else {
        format!("#{}", digits)
    }
}

/// Absolute integer value of a numeric string.
///
/// Empty input, a bare `"0"` and non-numbers clear the value, as do numbers
/// too large for a `u64`. Fractions truncate, so `"0.5"` becomes `"0"`.
pub fn absint(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return String::new();
    }

    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if let Ok(n) = unsigned.parse::<u64>() {
        return n.to_string();
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n.abs() < u64::MAX as f64 => {
            (n.abs().trunc() as u64).to_string()
        }
        _ => String::new(),
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
        assert_eq!(strip_tags("a<script>alert(1)</script>b"), "ab");
    }

    #[test]
    fn test_kses_post_keeps_markup() {
        let raw = r#"<p onclick="evil()">Hello <em>world</em></p><script>x()</script>"#;
        let cleaned = kses_post(raw);
        assert_eq!(cleaned, "<p>Hello <em>world</em></p>");
    }

    #[test]
    fn test_key() {
        assert_eq!(key("Choice A!"), "choicea");
        assert_eq!(key("planet-burst"), "planet-burst");
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(hex_color_no_hash("#232323"), "232323");
        assert_eq!(hex_color_no_hash("fff"), "fff");
        assert_eq!(hex_color_no_hash("#12345"), "");
        assert_eq!(hex_color("bde066"), "#bde066");
        assert_eq!(hex_color("nope"), "");
    }

    #[test]
    fn test_absint() {
        assert_eq!(absint("42"), "42");
        assert_eq!(absint("-7"), "7");
        assert_eq!(absint("3.9"), "3");
        assert_eq!(absint("0"), "");
        assert_eq!(absint("abc"), "");
        assert_eq!(absint(""), "");
    }

    #[test]
    fn test_absint_fractions_and_overflow() {
        assert_eq!(absint("0.5"), "0");
        assert_eq!(absint("-0.9"), "0");
        assert_eq!(absint("18446744073709551615"), "18446744073709551615");
        assert_eq!(absint("1e30"), "");
        assert_eq!(absint("99999999999999999999"), "");
        assert_eq!(absint("inf"), "");
    }

    #[test]
    fn test_string_sanitizer_cleans_lists() {
        let s = BuiltinSanitizer::Key.sanitizer();
        let out = s.apply(SettingValue::StringList(vec!["Choice_D".into(), "E e".into()]));
        assert_eq!(out, SettingValue::StringList(vec!["choice_d".into(), "ee".into()]));
    }

    #[test]
    fn test_boolean_sanitizer() {
        let s = BuiltinSanitizer::Boolean.sanitizer();
        assert_eq!(s.apply("on".into()), SettingValue::Boolean(true));
        assert_eq!(s.apply("0".into()), SettingValue::Boolean(false));
        assert_eq!(s.name(), "boolean");
        assert_eq!(s.builtin(), Some(BuiltinSanitizer::Boolean));
        assert_eq!(Sanitizer::new("custom", |v| v).builtin(), None);
    }
}
