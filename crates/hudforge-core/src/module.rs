//! Toggleable modules and their attached capabilities.
//!
//! A module is plain data plus optional capabilities:
//! - a [`GeometryHost`] when it draws widgets
//! - an [`AlertSettings`] bundle when it raises alerts
//! - a [`ModuleHooks`] object for lifecycle behavior

use crate::alert::{AlertConfig, AlertSettings};
use crate::geometry::GeometryHost;
use crate::setting::Setting;
use std::any::{Any, TypeId};
use std::fmt;

/// Lifecycle hooks of a module. All hooks default to doing nothing.
pub trait ModuleHooks: Any {
    /// Called once when the module is added to a registry.
    fn on_register(&mut self) {}

    /// Called when the module becomes enabled, and at startup for modules
    /// that load as enabled.
    fn on_enable(&mut self) {}

    /// Called when the module becomes disabled.
    fn on_disable(&mut self) {}
}

/// Hooks for modules without lifecycle behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl ModuleHooks for NoHooks {}

/// A named, toggleable feature unit.
pub struct Module {
    id: String,
    display_name: String,
    description: String,
    enabled: bool,
    settings: Vec<Setting>,
    geometry: Option<GeometryHost>,
    alert: Option<AlertSettings>,
    hooks: Box<dyn ModuleHooks>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .field("settings", &self.settings)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl Module {
    /// Create a disabled module without capabilities.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            enabled: false,
            settings: Vec::new(),
            geometry: None,
            alert: None,
            hooks: Box::new(NoHooks),
        }
    }

    /// Set the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: impl ModuleHooks) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Attach the widget geometry capability.
    pub fn with_geometry(mut self, host: GeometryHost) -> Self {
        self.geometry = Some(host);
        self
    }

    /// Add a setting.
    pub fn with_setting(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }

    /// Attach the alert capability, installing its settings.
    pub fn with_alert_settings(mut self, alert: AlertSettings) -> Self {
        self.settings.extend(alert.build_settings());
        self.alert = Some(alert);
        self
    }

    /// Initial enabled state, before anything is loaded. Fires no hooks.
    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
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

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Change the enabled flag, firing `on_enable`/`on_disable` on a flip.
    ///
    /// Returns whether the flag changed. Outside the crate the flag is only
    /// reachable through [`crate::ModuleRegistry::set_module_enabled`], which
    /// saves after a flip.
    pub(crate) fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        if enabled {
            self.hooks.on_enable();
        } else {
            self.hooks.on_disable();
        }
        log::info!("Module {} {}", self.id, if enabled { "enabled" } else { "disabled" });
        true
    }

    /// Flip the enabled flag. Same contract as [`Module::set_enabled`].
    pub(crate) fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled)
    }

    /// Set the enabled flag from persisted state without firing any hook.
    pub(crate) fn load_enabled_silently(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn notify_registered(&mut self) {
        self.hooks.on_register();
    }

    pub(crate) fn notify_enabled(&mut self) {
        self.hooks.on_enable();
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn setting(&self, id: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.id() == id)
    }

    /// Writes go through [`crate::ModuleRegistry::set_module_setting`] so they
    /// are persisted.
    ///
    /// ```compile_fail
    /// use hudforge_core::{Module, Setting};
    ///
    /// let mut module = Module::new("clock", "Clock", "")
    ///     .with_setting(Setting::integer("scale", "Scale", "", 2, 1, 4));
    /// module.setting_mut("scale").unwrap().set_value(3).unwrap();
    /// ```
    pub(crate) fn setting_mut(&mut self, id: &str) -> Option<&mut Setting> {
        self.settings.iter_mut().find(|s| s.id() == id)
    }

    pub fn geometry_host(&self) -> Option<&GeometryHost> {
        self.geometry.as_ref()
    }

    pub fn geometry_host_mut(&mut self) -> Option<&mut GeometryHost> {
        self.geometry.as_mut()
    }

    pub fn alert_settings(&self) -> Option<&AlertSettings> {
        self.alert.as_ref()
    }

    /// Current alert configuration, for modules with the alert capability.
    pub fn alert_config(&self) -> Option<AlertConfig> {
        self.alert.as_ref().map(|_| AlertConfig::from_settings(&self.settings))
    }

    /// Type id of the concrete hooks object.
    pub fn hooks_type_id(&self) -> TypeId {
        let hooks: &dyn Any = self.hooks.as_ref();
        hooks.type_id()
    }

    /// Downcast the hooks object to its concrete type.
    pub fn hooks<T: ModuleHooks>(&self) -> Option<&T> {
        let hooks: &dyn Any = self.hooks.as_ref();
        hooks.downcast_ref()
    }

    pub fn hooks_mut<T: ModuleHooks>(&mut self) -> Option<&mut T> {
        let hooks: &mut dyn Any = self.hooks.as_mut();
        hooks.downcast_mut()
    }
}
