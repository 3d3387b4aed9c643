//! hudforge Core Library
//!
//! Host-agnostic module registry, typed settings and the interactive
//! widget editor for hudforge.

pub mod alert;
pub mod config;
pub mod editable;
pub mod geometry;
pub mod input;
pub mod module;
pub mod registry;
pub mod session;
pub mod setting;
pub mod storage;

pub use alert::{AlertConfig, AlertSettings};
pub use config::{EditorConfig, GlobalSettings, DEFAULT_HANDLE_SIZE, MIN_WIDGET_SIZE};
pub use editable::{EditableWidget, Handle, HudWidget, ResizeEdge, handles_for};
pub use geometry::{GeometryHost, PendingGeometry, ResetScope, WidgetGeometry};
pub use input::{MouseButton, PointerEvent};
pub use module::{Module, ModuleHooks, NoHooks};
pub use registry::{ModuleRegistry, RegistryError};
pub use session::{EditorSession, EditorState, WidgetKey};
pub use setting::{Setting, SettingError, SettingKind, SettingValue};
pub use storage::{ConfigStorage, MemoryStorage, StorageError, StorageResult};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
