//! Alert capability: a standard settings bundle for modules that raise alerts.
//!
//! Only the configuration lives here. Condition checks, sounds and message
//! display belong to the host.

use crate::setting::Setting;
use peniko::Color;

pub const PLAY_SOUND_ID: &str = "playSound";
pub const TEXT_COLOR_ID: &str = "textColor";
pub const DISPLAY_SECONDS_ID: &str = "displaySeconds";
pub const TEXT_STYLE_ID: &str = "textStyle";

/// Text styles an alert can be drawn with.
pub const TEXT_STYLES: [&str; 3] = ["plain", "bold", "shadowed"];

const MIN_DISPLAY_SECONDS: i32 = 1;
const MAX_DISPLAY_SECONDS: i32 = 30;

/// Defaults for the alert settings a module installs.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub play_sound: bool,
    /// Packed 0xAARRGGBB.
    pub text_color: u32,
    pub display_seconds: i32,
    pub text_style: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            play_sound: true,
            text_color: 0xFFFF5555,
            display_seconds: 3,
            text_style: TEXT_STYLES[0].to_string(),
        }
    }
}

impl AlertSettings {
    pub fn with_text_color(mut self, argb: u32) -> Self {
        self.text_color = argb;
        self
    }

    pub fn with_display_seconds(mut self, seconds: i32) -> Self {
        self.display_seconds = seconds;
        self
    }

    /// Build the settings this capability installs into a module.
    pub(crate) fn build_settings(&self) -> Vec<Setting> {
        vec![
            Setting::boolean(
                PLAY_SOUND_ID,
                "Play sound",
                "Play a sound when the alert fires",
                self.play_sound,
            ),
            Setting::color(
                TEXT_COLOR_ID,
                "Text color",
                "Color of the alert message",
                self.text_color,
            ),
            Setting::integer(
                DISPLAY_SECONDS_ID,
                "Display time",
                "How long the alert stays on screen, in seconds",
                self.display_seconds,
                MIN_DISPLAY_SECONDS,
                MAX_DISPLAY_SECONDS,
            ),
            Setting::choice(
                TEXT_STYLE_ID,
                "Text style",
                "How the alert message is drawn",
                TEXT_STYLES,
                self.text_style.clone(),
            ),
        ]
    }
}

/// Snapshot of a module's current alert settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    pub play_sound: bool,
    pub text_color: u32,
    pub display_seconds: i32,
    pub text_style: String,
}

impl AlertConfig {
    /// Read the alert settings out of a module's settings, falling back to
    /// the capability defaults for anything missing.
    pub fn from_settings(settings: &[Setting]) -> Self {
        let defaults = AlertSettings::default();
        let find = |id: &str| settings.iter().find(|s| s.id() == id);
        Self {
            play_sound: find(PLAY_SOUND_ID)
                .and_then(Setting::as_bool)
                .unwrap_or(defaults.play_sound),
            text_color: find(TEXT_COLOR_ID)
                .and_then(Setting::as_packed_color)
                .unwrap_or(defaults.text_color),
            display_seconds: find(DISPLAY_SECONDS_ID)
                .and_then(Setting::as_int)
                .unwrap_or(defaults.display_seconds),
            text_style: find(TEXT_STYLE_ID)
                .and_then(Setting::as_choice)
                .map(str::to_string)
                .unwrap_or(defaults.text_style),
        }
    }

    pub fn color(&self) -> Color {
        let [a, r, g, b] = self.text_color.to_be_bytes();
        Color::from_rgba8(r, g, b, a)
    }
}
