use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::FitBoxError;
use crate::fit::engine::DEFAULT_MAX_TRY_AMOUNT;
use crate::layout::FontFamily;

/// Quiet period after the last resize event before a re-sync runs.
pub const DEFAULT_RESIZE_DELAY_MS: u64 = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Per-instance options
// ────────────────────────────────────────────────────────────────────────────

/// Options for one FitBox instance. Immutable once the instance exists.
///
/// Deserialises from a plain options object. Numeric options accept numbers
/// or strings with an integer prefix (`"50px"`); zero or unparsable values
/// leave the option unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitBoxConfig {
    #[serde(deserialize_with = "de_px")]
    pub min_font_size: Option<u32>,
    #[serde(deserialize_with = "de_px")]
    pub max_font_size: Option<u32>,
    /// Re-sync after the viewport stops resizing. Only a literal `true`
    /// enables it.
    #[serde(alias = "adjustAfterWindowResize", deserialize_with = "de_strict_true")]
    pub adjust_after_resize: bool,
    #[serde(deserialize_with = "de_try_amount")]
    pub max_try_amount: u32,
    #[serde(deserialize_with = "de_selector")]
    pub ellipsis_selector: Option<String>,
    #[serde(deserialize_with = "de_truthy")]
    pub debug: bool,
    /// Count horizontal overflow as overflow during the search.
    pub width_aware: bool,
    pub resize_delay_ms: u64,
}

impl Default for FitBoxConfig {
    fn default() -> Self {
        FitBoxConfig {
            min_font_size: None,
            max_font_size: None,
            adjust_after_resize: false,
            max_try_amount: DEFAULT_MAX_TRY_AMOUNT,
            ellipsis_selector: None,
            debug: false,
            width_aware: true,
            resize_delay_ms: DEFAULT_RESIZE_DELAY_MS,
        }
    }
}

impl FitBoxConfig {
    /// Builds a config from container data attributes overlaid with explicit
    /// options. Explicit options win; a non-object `options` is ignored.
    pub fn from_options(
        data_attributes: Map<String, Value>,
        options: Option<&Value>,
    ) -> Result<Self, FitBoxError> {
        let mut merged = data_attributes;
        if let Some(Value::Object(explicit)) = options {
            for (key, value) in explicit {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(Value::Object(merged))?)
    }
}

/// Integer-prefix parse: optional leading whitespace and sign, then digits.
pub(crate) fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn positive_int(value: &Value) -> Option<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    };
    parsed
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn de_px<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(positive_int(&Value::deserialize(deserializer)?))
}

fn de_try_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(positive_int(&Value::deserialize(deserializer)?).unwrap_or(DEFAULT_MAX_TRY_AMOUNT))
}

fn de_strict_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn de_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

fn de_selector<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Binary configuration
// ────────────────────────────────────────────────────────────────────────────

/// Configuration for the `fitbox` binary, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font: FontFamily,
    pub line_height: f64,
    /// Text to fit. Read from stdin when unset.
    pub text: Option<String>,
    pub options: FitBoxConfig,
    pub rust_log: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let options = match lookup("FITBOX_OPTIONS") {
            Some(raw) => {
                let value: Value =
                    serde_json::from_str(&raw).context("FITBOX_OPTIONS must be a JSON object")?;
                FitBoxConfig::from_options(Map::new(), Some(&value))?
            }
            None => FitBoxConfig::default(),
        };

        Ok(AppConfig {
            width: parse_or(&lookup, "FITBOX_WIDTH", 300.0)?,
            height: parse_or(&lookup, "FITBOX_HEIGHT", 100.0)?,
            font_size: parse_or(&lookup, "FITBOX_FONT_SIZE", 16.0)?,
            font: parse_or(&lookup, "FITBOX_FONT", FontFamily::Sans)?,
            line_height: parse_or(&lookup, "FITBOX_LINE_HEIGHT", 1.2)?,
            text: lookup("FITBOX_TEXT"),
            options,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config: FitBoxConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, FitBoxConfig::default());
        assert_eq!(config.max_try_amount, 300);
        assert!(config.width_aware);
        assert_eq!(config.resize_delay_ms, 1000);
    }

    #[test]
    fn test_pixel_strings_parse_as_integer_prefix() {
        let config: FitBoxConfig = serde_json::from_value(json!({
            "minFontSize": "50px",
            "maxFontSize": 100.7,
            "maxTryAmount": "abc"
        }))
        .unwrap();
        assert_eq!(config.min_font_size, Some(50));
        assert_eq!(config.max_font_size, Some(100));
        assert_eq!(config.max_try_amount, 300);
    }

    #[test]
    fn test_zero_and_negative_sizes_are_unset() {
        let config: FitBoxConfig =
            serde_json::from_value(json!({ "minFontSize": 0, "maxFontSize": "-4px" })).unwrap();
        assert_eq!(config.min_font_size, None);
        assert_eq!(config.max_font_size, None);
    }

    #[test]
    fn test_window_resize_alias_requires_literal_true() {
        let config: FitBoxConfig =
            serde_json::from_value(json!({ "adjustAfterWindowResize": true })).unwrap();
        assert!(config.adjust_after_resize);

        let config: FitBoxConfig =
            serde_json::from_value(json!({ "adjustAfterResize": "yes" })).unwrap();
        assert!(!config.adjust_after_resize);
    }

    #[test]
    fn test_debug_is_truthy_and_selector_ignores_empty() {
        let config: FitBoxConfig =
            serde_json::from_value(json!({ "debug": 1, "ellipsisSelector": "" })).unwrap();
        assert!(config.debug);
        assert_eq!(config.ellipsis_selector, None);
    }

    #[test]
    fn test_explicit_options_override_data_attributes() {
        let mut data = Map::new();
        data.insert("minFontSize".to_string(), json!("12"));
        data.insert("maxFontSize".to_string(), json!("48"));
        let options = json!({ "maxFontSize": 30 });

        let config = FitBoxConfig::from_options(data, Some(&options)).unwrap();
        assert_eq!(config.min_font_size, Some(12));
        assert_eq!(config.max_font_size, Some(30));
    }

    #[test]
    fn test_non_object_options_fall_back_to_data() {
        let mut data = Map::new();
        data.insert("debug".to_string(), json!(true));
        let config = FitBoxConfig::from_options(data, Some(&json!("sync"))).unwrap();
        assert!(config.debug);
    }

    #[test]
    fn test_wrong_type_for_plain_field_is_invalid() {
        let err = FitBoxConfig::from_options(Map::new(), Some(&json!({ "widthAware": "no" })))
            .unwrap_err();
        assert!(matches!(err, FitBoxError::InvalidConfig(_)));
    }

    #[test]
    fn test_app_config_from_lookup() {
        let config = AppConfig::from_lookup(|key| match key {
            "FITBOX_WIDTH" => Some("240".to_string()),
            "FITBOX_FONT" => Some("mono".to_string()),
            "FITBOX_OPTIONS" => Some(r#"{"maxFontSize":"40px"}"#.to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.width, 240.0);
        assert_eq!(config.height, 100.0);
        assert_eq!(config.font, FontFamily::Mono);
        assert_eq!(config.options.max_font_size, Some(40));
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_app_config_rejects_bad_number() {
        let err = AppConfig::from_lookup(|key| {
            (key == "FITBOX_HEIGHT").then(|| "tall".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("FITBOX_HEIGHT"));
    }
}
