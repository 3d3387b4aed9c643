//! Typed, resettable settings with change notification.

use peniko::Color;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Setting errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingError {
    #[error("Setting {id} expects a {expected} value, got {found}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// The value held by a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i32),
    /// Packed 0xAARRGGBB color.
    Color(u32),
    /// One of the options of an enum setting.
    Choice(String),
}

impl SettingValue {
    /// Short name of the value's variant, used in errors and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Color(_) => "color",
            Self::Choice(_) => "enum",
        }
    }

    /// Convert to the JSON representation used in the config document.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Color(c) => Value::from(*c),
            Self::Choice(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Choice(value.to_string())
    }
}

/// The type and domain constraint of a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKind {
    Boolean,
    /// Integer bounded to `[min, max]`.
    Integer { min: i32, max: i32 },
    Color,
    /// Enum with a fixed list of options for UI rendering.
    Choice { options: Vec<String> },
}

impl SettingKind {
    /// Short name of the kind, used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer { .. } => "integer",
            Self::Color => "color",
            Self::Choice { .. } => "enum",
        }
    }

    /// Parse a JSON value for this kind. Returns None if the JSON type doesn't fit.
    pub fn parse_json(&self, value: &Value) -> Option<SettingValue> {
        match self {
            Self::Boolean => value.as_bool().map(SettingValue::Bool),
            Self::Integer { .. } => value
                .as_i64()
                .map(|v| SettingValue::Int(v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)),
            Self::Color => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(SettingValue::Color),
            Self::Choice { .. } => value.as_str().map(|s| SettingValue::Choice(s.to_string())),
        }
    }
}

/// Callback invoked with the new value after every write.
pub type ChangeCallback = Box<dyn FnMut(&SettingValue)>;

/// A named, typed, resettable configuration value.
///
/// The stored value always satisfies the kind's constraint: integer writes
/// are clamped into range on every write, not only at construction.
pub struct Setting {
    id: String,
    display_name: String,
    description: String,
    kind: SettingKind,
    value: SettingValue,
    default: SettingValue,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("default", &self.default)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Setting {
    fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        kind: SettingKind,
        default: SettingValue,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            kind,
            value: default.clone(),
            default,
            on_change: None,
        }
    }

    /// Create a boolean setting.
    pub fn boolean(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        default: bool,
    ) -> Self {
        Self::new(id, display_name, description, SettingKind::Boolean, SettingValue::Bool(default))
    }

    /// Create an integer setting bounded to `[min, max]`.
    ///
    /// Swapped bounds are reordered, and the default is clamped into range.
    pub fn integer(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        default: i32,
        min: i32,
        max: i32,
    ) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self::new(
            id,
            display_name,
            description,
            SettingKind::Integer { min, max },
            SettingValue::Int(default.clamp(min, max)),
        )
    }

    /// Create a color setting holding a packed 0xAARRGGBB value.
    pub fn color(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        default: u32,
    ) -> Self {
        Self::new(id, display_name, description, SettingKind::Color, SettingValue::Color(default))
    }

    /// Create an enum setting with a fixed list of options.
    pub fn choice<I, S>(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        options: I,
        default: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        Self::new(
            id,
            display_name,
            description,
            SettingKind::Choice { options },
            SettingValue::Choice(default.into()),
        )
    }

    /// Attach a change callback.
    pub fn with_on_change(mut self, callback: impl FnMut(&SettingValue) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Replace the change callback.
    pub fn set_on_change(&mut self, callback: impl FnMut(&SettingValue) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    pub fn default_value(&self) -> &SettingValue {
        &self.default
    }

    /// Legal options of an enum setting (empty for other kinds).
    pub fn options(&self) -> &[String] {
        match &self.kind {
            SettingKind::Choice { options } => options,
            _ => &[],
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            SettingValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.value {
            SettingValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_packed_color(&self) -> Option<u32> {
        match self.value {
            SettingValue::Color(c) => Some(c),
            _ => None,
        }
    }

    /// Unpack a color setting into a `peniko::Color`.
    pub fn as_color(&self) -> Option<Color> {
        self.as_packed_color().map(|argb| {
            let [a, r, g, b] = argb.to_be_bytes();
            Color::from_rgba8(r, g, b, a)
        })
    }

    pub fn as_choice(&self) -> Option<&str> {
        match &self.value {
            SettingValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    /// Write a new value and fire the change callback.
    ///
    /// The callback fires even if the value is unchanged. Integer values are
    /// clamped, so the stored value may differ from `value`.
    pub fn set_value(&mut self, value: impl Into<SettingValue>) -> Result<(), SettingError> {
        self.value = self.normalize(value.into())?;
        self.notify();
        Ok(())
    }

    /// Restore the default value and fire the change callback.
    pub fn reset(&mut self) {
        self.value = self.default.clone();
        self.notify();
    }

    /// Store a persisted value without firing the change callback.
    pub(crate) fn load_silently(&mut self, value: SettingValue) -> Result<(), SettingError> {
        self.value = self.normalize(value)?;
        Ok(())
    }

    fn normalize(&self, value: SettingValue) -> Result<SettingValue, SettingError> {
        match (&self.kind, value) {
            (SettingKind::Boolean, v @ SettingValue::Bool(_)) => Ok(v),
            (SettingKind::Integer { min, max }, SettingValue::Int(v)) => {
                Ok(SettingValue::Int(v.clamp(*min, *max)))
            }
            (SettingKind::Color, v @ SettingValue::Color(_)) => Ok(v),
            (SettingKind::Choice { options }, SettingValue::Choice(v)) => {
                // Membership is not enforced here
                if !options.contains(&v) {
                    log::debug!("Setting {} accepted non-listed option {:?}", self.id, v);
                }
                Ok(SettingValue::Choice(v))
            }
            (kind, value) => Err(SettingError::TypeMismatch {
                id: self.id.clone(),
                expected: kind.name(),
                found: value.kind_name(),
            }),
        }
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.value);
        }
    }
}
