//! User display and alert preferences.
//!
//! Stores:
//! - Timer font color and size
//! - Window opacity and always-on-top (forwarded to the desktop shell)
//! - Warning threshold and sound toggle (read by the timer and notifier)
//!
//! Each field is persisted under its own `timer_settings_<field>` key.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::timer::DEFAULT_WARNING_SECS;

/// Threshold used when a warning value cannot be parsed.
pub const FALLBACK_WARNING_SECS: i64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Window opacity in percent.
    #[serde(default = "default_opacity")]
    pub opacity: u32,
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: i64,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub always_on_top: bool,
}

// Default functions
fn default_font_color() -> String {
    "#00ff00".into()
}
fn default_font_size() -> u32 {
    80
}
fn default_opacity() -> u32 {
    100
}
fn default_warning_seconds() -> i64 {
    DEFAULT_WARNING_SECS
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_color: default_font_color(),
            font_size: default_font_size(),
            opacity: default_opacity(),
            warning_seconds: default_warning_seconds(),
            sound_enabled: true,
            always_on_top: false,
        }
    }
}

impl Settings {
    /// Field names, in storage order.
    pub const FIELDS: [&'static str; 6] = [
        "font_color",
        "font_size",
        "opacity",
        "warning_seconds",
        "sound_enabled",
        "always_on_top",
    ];

    /// Get a value as string by field name.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a field from its string form. The existing value's JSON type
    /// decides how `value` is parsed.
    ///
    /// # Errors
    /// `UnknownKey` for a name not in [`Settings::FIELDS`], `InvalidValue`
    /// when the value does not parse or is out of range. On error the
    /// settings are unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(key, e.to_string()))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        let value = value.trim();
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(key, format!("cannot parse '{value}' as true/false")))?,
            ),
            serde_json::Value::Number(_) => match value.parse::<i64>() {
                Ok(n) => serde_json::Value::Number(n.into()),
                Err(_) if key == "warning_seconds" => {
                    serde_json::Value::Number(FALLBACK_WARNING_SECS.into())
                }
                Err(_) => return Err(invalid(key, format!("cannot parse '{value}' as number"))),
            },
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(key.to_string(), new_value);

        let updated: Settings =
            serde_json::from_value(json).map_err(|e| invalid(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check every field's range.
    ///
    /// # Errors
    /// `InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !is_hex_color(&self.font_color) {
            return Err(invalid("font_color", "expected a #rrggbb color"));
        }
        if !(1..=400).contains(&self.font_size) {
            return Err(invalid("font_size", "must be between 1 and 400"));
        }
        if self.opacity > 100 {
            return Err(invalid("opacity", "must be between 0 and 100"));
        }
        if self.warning_seconds < 0 {
            return Err(invalid("warning_seconds", "must not be negative"));
        }
        Ok(())
    }

    /// Opacity as the 0.0 ..= 1.0 fraction the window expects.
    pub fn opacity_fraction(&self) -> f64 {
        f64::from(self.opacity.min(100)) / 100.0
    }
}

fn invalid(key: &str, message: impl Into<String>) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
