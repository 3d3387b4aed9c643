//! Host shell: owns the registry and editor session and replays a scripted
//! editing session against them.

use crate::modules::{CLOCK_ID, CLOCK_WIDGET, ClockHooks, LOW_HEALTH_ID, register_builtin};
use hudforge_core::{
    ConfigStorage, EditorConfig, EditorSession, FileStorage, HudWidget, MemoryStorage,
    ModuleRegistry, MouseButton, PointerEvent, ResizeEdge, handles_for,
};
use kurbo::{Point, Size};
use std::path::PathBuf;

/// Screen shown while the scripted session runs.
const GAME_SCREEN: &str = "game";

/// Host shell configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the config document lives. `None` picks the platform default.
    pub storage_path: Option<PathBuf>,
    pub screen_size: Size,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            screen_size: Size::new(854.0, 480.0),
            editor: EditorConfig::default(),
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    registry: ModuleRegistry,
    session: EditorSession,
}

impl App {
    /// Create the shell with file-backed storage.
    pub fn with_config(config: AppConfig) -> Self {
        let storage = match &config.storage_path {
            Some(path) => Some(FileStorage::new(path.clone())),
            None => FileStorage::default_location()
                .map_err(|e| log::warn!("No data directory ({}); settings won't persist", e))
                .ok(),
        };
        match storage {
            Some(storage) => {
                log::info!("Using config at {}", storage.path().display());
                Self::with_storage(config, storage)
            }
            None => Self::with_storage(config, MemoryStorage::new()),
        }
    }

    /// Create the shell over any storage backend.
    pub fn with_storage(config: AppConfig, storage: impl ConfigStorage + 'static) -> Self {
        let mut registry = ModuleRegistry::new(storage);
        if let Err(e) = register_builtin(&mut registry) {
            log::error!("Failed to register built-in modules: {}", e);
        }
        registry.initialize();

        let session = EditorSession::with_config(config.editor);
        Self {
            config,
            registry,
            session,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Replay a short editing session: drag the clock, stretch it from its
    /// bottom-right corner, then leave editor mode.
    pub fn run(&mut self) {
        self.session.add_listener(|active| {
            log::info!("Editor mode {}", if active { "opened" } else { "closed" })
        });
        self.session.set_screen(GAME_SCREEN);

        let default_offset = Point::new(self.config.screen_size.width - 72.0, 8.0);
        let handle_size = self.config.editor.handle_size;
        let Some(widget) =
            HudWidget::attach(&mut self.registry, CLOCK_ID, CLOCK_WIDGET, default_offset)
                .map(|w| w.with_handle_size(handle_size))
        else {
            log::error!("Clock module has no widget geometry");
            return;
        };
        let key = self.session.register_widget(widget);

        if !self.registry.global_settings().guide_shown() {
            log::info!("Drag widgets to move them, pull their edges to resize");
            self.registry.mark_guide_shown();
        }

        self.session.set_active(true);

        let Some(bounds) = self.session.widget(key).map(|w| w.bounds()) else {
            return;
        };
        let grab = bounds.center();
        self.drag(grab, grab - kurbo::Vec2::new(40.0, -20.0));

        let Some(bounds) = self.session.widget(key).map(|w| w.bounds()) else {
            return;
        };
        let corner = handles_for(bounds)
            .into_iter()
            .find(|h| h.kind == ResizeEdge::BottomRight)
            .map_or(Point::new(bounds.x1, bounds.y1), |h| h.position);
        self.drag(corner, corner + kurbo::Vec2::new(16.0, 8.0));

        self.session.set_active(false);

        if let Some(geometry) = self.registry.geometry(CLOCK_ID, CLOCK_WIDGET) {
            log::info!(
                "Clock at ({}, {}) size {}x{}",
                geometry.offset_x(),
                geometry.offset_y(),
                geometry.width(),
                geometry.height()
            );
        }
        if let Some(hooks) = self.registry.hooks::<ClockHooks>() {
            log::info!("Clock enabled {} time(s), running: {}", hooks.enable_count, hooks.running);
        }
        if let Some(alert) = self.registry.get(LOW_HEALTH_ID).and_then(|m| m.alert_config()) {
            log::info!(
                "Low health alert shows for {}s in style {}",
                alert.display_seconds,
                alert.text_style
            );
        }
    }

    /// Press at `from`, move to `to`, release.
    fn drag(&mut self, from: Point, to: Point) {
        let events = [
            PointerEvent::Down {
                position: from,
                button: MouseButton::Left,
            },
            PointerEvent::Move { position: to },
            PointerEvent::Up {
                position: to,
                button: MouseButton::Left,
            },
        ];
        for event in events {
            self.session.handle_pointer(event, &mut self.registry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudforge_core::{EditableWidget, EditorState};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_scripted_session_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = App::with_storage(AppConfig::default(), storage.clone());
        app.run();

        assert_eq!(app.session().state(), EditorState::Inactive);
        let geometry = app.registry().geometry(CLOCK_ID, CLOCK_WIDGET).unwrap();
        // Default offset (782, 8) moved by (-40, +20), then 64x16 grown by (16, 8)
        assert_eq!(geometry.origin(), Point::new(742.0, 28.0));
        assert_eq!(geometry.size(), Size::new(80.0, 24.0));

        let doc = storage.document().unwrap();
        assert_eq!(doc["settings"]["guideShown"], json!(true));
        assert_eq!(doc["modules"][CLOCK_ID]["widgets"][CLOCK_WIDGET]["width"], json!(80.0));
        assert_eq!(app.registry().hooks::<ClockHooks>().unwrap().enable_count, 1);
    }

    #[test]
    fn test_restart_restores_geometry() {
        let storage = Arc::new(MemoryStorage::new());
        App::with_storage(AppConfig::default(), storage.clone()).run();

        let mut app = App::with_storage(AppConfig::default(), storage.clone());
        let widget =
            HudWidget::attach(&mut app.registry, CLOCK_ID, CLOCK_WIDGET, Point::ZERO).unwrap();
        assert_eq!(widget.position(), Point::new(742.0, 28.0));
    }
}
