//! Editor configuration and the global settings section.

use crate::setting::{Setting, SettingError, SettingValue};
use serde::{Deserialize, Serialize};

/// Default thickness of the resize bands around a widget.
pub const DEFAULT_HANDLE_SIZE: f64 = 6.0;
/// Minimum width and height a resize can produce.
pub const MIN_WIDGET_SIZE: f64 = 12.0;

/// Key of the "onboarding guide shown" flag in the settings section.
pub const GUIDE_SHOWN_KEY: &str = "guideShown";

/// Tunables for the editor session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Thickness of the resize bands.
    pub handle_size: f64,
    /// Lower bound for width and height while resizing. There is no upper bound.
    pub min_widget_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: DEFAULT_HANDLE_SIZE,
            min_widget_size: MIN_WIDGET_SIZE,
        }
    }
}

/// Settings that belong to the add-on rather than to a module.
///
/// Persisted as the flat `settings` section of the config document.
#[derive(Debug)]
pub struct GlobalSettings {
    settings: Vec<Setting>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalSettings {
    pub fn new() -> Self {
        Self {
            settings: vec![Setting::boolean(
                GUIDE_SHOWN_KEY,
                "Guide shown",
                "Whether the onboarding guide has already been displayed",
                false,
            )],
        }
    }

    /// Whether the onboarding guide has been shown.
    pub fn guide_shown(&self) -> bool {
        self.get(GUIDE_SHOWN_KEY)
            .and_then(Setting::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, id: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Setting> {
        self.settings.iter_mut().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub(crate) fn load(&mut self, id: &str, value: SettingValue) -> Result<(), SettingError> {
        match self.get_mut(id) {
            Some(setting) => setting.load_silently(value),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_config_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.handle_size, 6.0);
        assert_eq!(config.min_widget_size, 12.0);
    }

    #[test]
    fn test_editor_config_partial_json() {
        let config: EditorConfig = serde_json::from_str(r#"{"handleSize": 4.0}"#).unwrap();
        assert_eq!(config.handle_size, 4.0);
        assert_eq!(config.min_widget_size, MIN_WIDGET_SIZE);
    }

    #[test]
    fn test_guide_shown_flag() {
        let mut settings = GlobalSettings::new();
        assert!(!settings.guide_shown());

        settings.get_mut(GUIDE_SHOWN_KEY).unwrap().set_value(true).unwrap();
        assert!(settings.guide_shown());
    }
}
