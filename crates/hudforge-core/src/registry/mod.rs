//! Module registry: ordered module collection plus persistence.
//!
//! The registry is constructed by the host and passed by reference. Its
//! lifecycle is `new` -> `register`* -> `initialize`; saving is a no-op until
//! `initialize` has loaded the stored document, so a default-only config can
//! never overwrite a file that hasn't been read yet.

mod document;

use crate::config::{GUIDE_SHOWN_KEY, GlobalSettings};
use crate::geometry::{ResetScope, WidgetGeometry};
use crate::module::{Module, ModuleHooks};
use crate::setting::{SettingError, SettingValue};
use crate::storage::ConfigStorage;
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use thiserror::Error;

/// Registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Module id already registered: {0}")]
    DuplicateId(String),
    #[error("Unknown module: {0}")]
    UnknownModule(String),
    #[error("Unknown setting {setting} in {scope}")]
    UnknownSetting { scope: String, setting: String },
    #[error(transparent)]
    Setting(#[from] SettingError),
}

/// Ordered collection of modules with lookup by id and by hooks type.
pub struct ModuleRegistry {
    modules: Vec<Module>,
    by_id: HashMap<String, usize>,
    by_type: HashMap<TypeId, usize>,
    settings: GlobalSettings,
    storage: Box<dyn ConfigStorage>,
    initialized: bool,
}

impl ModuleRegistry {
    /// Create an empty registry persisting through `storage`.
    pub fn new(storage: impl ConfigStorage + 'static) -> Self {
        Self {
            modules: Vec::new(),
            by_id: HashMap::new(),
            by_type: HashMap::new(),
            settings: GlobalSettings::new(),
            storage: Box::new(storage),
            initialized: false,
        }
    }

    /// Add a module and run its registration hook.
    ///
    /// Fails if the id is taken; the existing module is left untouched.
    pub fn register(&mut self, mut module: Module) -> Result<(), RegistryError> {
        if self.by_id.contains_key(module.id()) {
            log::error!("Refusing to register duplicate module id {}", module.id());
            return Err(RegistryError::DuplicateId(module.id().to_string()));
        }
        if self.initialized {
            log::warn!(
                "Module {} registered after initialization; its saved state was not loaded",
                module.id()
            );
        }

        let index = self.modules.len();
        self.by_id.insert(module.id().to_string(), index);
        // First module registered with a given hooks type wins the type lookup
        self.by_type.entry(module.hooks_type_id()).or_insert(index);

        module.notify_registered();
        log::debug!("Registered module {}", module.id());
        self.modules.push(module);
        Ok(())
    }

    /// Load stored state, mark the registry initialized, then fire
    /// `on_enable` for every module that is enabled after the load.
    ///
    /// Loading never writes to storage. Calling this twice does nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            log::warn!("Module registry already initialized");
            return;
        }

        self.load_config();
        self.initialized = true;

        for module in &mut self.modules {
            if module.is_enabled() {
                module.notify_enabled();
            }
        }
        log::info!("Module registry initialized with {} modules", self.modules.len());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Apply the stored document to the registered modules.
    ///
    /// Missing data keeps defaults. A malformed field stops the load there,
    /// keeping what was already applied.
    pub fn load_config(&mut self) {
        match self.storage.load() {
            Ok(Some(document)) => {
                if let Err(e) = document::apply(&document, &mut self.settings, &mut self.modules) {
                    log::warn!("{}; remaining fields keep their defaults", e);
                }
            }
            Ok(None) => log::info!("No saved config, using defaults"),
            Err(e) => log::error!("Failed to load config: {}", e),
        }
    }

    /// The document that `save_config` would write.
    pub fn to_document(&self) -> Value {
        document::build(&self.settings, &self.modules)
    }

    /// Write the current state. No-op before `initialize`.
    ///
    /// Failures are logged; the in-memory state stays authoritative.
    pub fn save_config(&self) {
        if !self.initialized {
            log::debug!("Skipping save before initialization");
            return;
        }
        if let Err(e) = self.storage.save(&self.to_document()) {
            log::error!("Failed to save config: {}", e);
        }
    }

    /// All modules in registration order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Module> {
        self.by_id.get(id).map(|&index| &self.modules[index])
    }

    /// Persisted state changes go through the `set_*`/`reset_*` wrappers
    /// instead, which save.
    ///
    /// ```compile_fail
    /// use hudforge_core::{MemoryStorage, Module, ModuleRegistry};
    ///
    /// let mut registry = ModuleRegistry::new(MemoryStorage::new());
    /// registry.register(Module::new("clock", "Clock", "")).unwrap();
    /// registry.get_mut("clock").unwrap().set_enabled(true);
    /// ```
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Module> {
        self.by_id.get(id).map(|&index| &mut self.modules[index])
    }

    /// The first module registered with hooks of type `T`.
    pub fn get_by_type<T: ModuleHooks>(&self) -> Option<&Module> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|&index| &self.modules[index])
    }

    /// The hooks object of the first module registered with hooks of type `T`.
    pub fn hooks<T: ModuleHooks>(&self) -> Option<&T> {
        self.get_by_type::<T>().and_then(Module::hooks::<T>)
    }

    /// Mutable hooks of the first module registered with hooks of type `T`.
    pub fn hooks_mut<T: ModuleHooks>(&mut self) -> Option<&mut T> {
        let index = *self.by_type.get(&TypeId::of::<T>())?;
        self.modules[index].hooks_mut::<T>()
    }

    fn module_mut(&mut self, id: &str) -> Result<&mut Module, RegistryError> {
        self.get_mut(id)
            .ok_or_else(|| RegistryError::UnknownModule(id.to_string()))
    }

    /// Enable or disable a module, saving once if the flag flipped.
    pub fn set_module_enabled(&mut self, id: &str, enabled: bool) -> Result<bool, RegistryError> {
        let changed = self.module_mut(id)?.set_enabled(enabled);
        if changed {
            self.save_config();
        }
        Ok(changed)
    }

    /// Flip a module's enabled flag and save.
    pub fn toggle_module(&mut self, id: &str) -> Result<bool, RegistryError> {
        let changed = self.module_mut(id)?.toggle();
        self.save_config();
        Ok(changed)
    }

    /// Write a module setting and save.
    pub fn set_module_setting(
        &mut self,
        module_id: &str,
        setting_id: &str,
        value: impl Into<SettingValue>,
    ) -> Result<(), RegistryError> {
        let module = self.module_mut(module_id)?;
        let setting = module
            .setting_mut(setting_id)
            .ok_or_else(|| RegistryError::UnknownSetting {
                scope: module_id.to_string(),
                setting: setting_id.to_string(),
            })?;
        setting.set_value(value)?;
        self.save_config();
        Ok(())
    }

    /// Reset a module setting to its default and save.
    pub fn reset_module_setting(
        &mut self,
        module_id: &str,
        setting_id: &str,
    ) -> Result<(), RegistryError> {
        let module = self.module_mut(module_id)?;
        let setting = module
            .setting_mut(setting_id)
            .ok_or_else(|| RegistryError::UnknownSetting {
                scope: module_id.to_string(),
                setting: setting_id.to_string(),
            })?;
        setting.reset();
        self.save_config();
        Ok(())
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Write a global setting and save.
    pub fn set_global_setting(
        &mut self,
        id: &str,
        value: impl Into<SettingValue>,
    ) -> Result<(), RegistryError> {
        let setting = self
            .settings
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownSetting {
                scope: "settings".to_string(),
                setting: id.to_string(),
            })?;
        setting.set_value(value)?;
        self.save_config();
        Ok(())
    }

    /// Record that the onboarding guide has been displayed.
    pub fn mark_guide_shown(&mut self) {
        if !self.settings.guide_shown() {
            // The key is registered by GlobalSettings::new, so this cannot miss
            let _ = self.set_global_setting(GUIDE_SHOWN_KEY, true);
        }
    }

    /// Get or create a widget's geometry in a module's geometry host.
    ///
    /// Returns None if the module is unknown or has no geometry capability.
    pub fn get_or_create_geometry(
        &mut self,
        module_id: &str,
        widget_id: &str,
        default_offset_x: f64,
        default_offset_y: f64,
    ) -> Option<WidgetGeometry> {
        let host = self.get_mut(module_id)?.geometry_host_mut()?;
        Some(
            host.get_or_create_geometry(widget_id, default_offset_x, default_offset_y)
                .clone(),
        )
    }

    pub fn geometry(&self, module_id: &str, widget_id: &str) -> Option<&WidgetGeometry> {
        self.get(module_id)?.geometry_host()?.geometry(widget_id)
    }

    /// Store a widget's live geometry and save. Returns false if there was
    /// no such geometry record.
    pub fn commit_geometry(
        &mut self,
        module_id: &str,
        widget_id: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> bool {
        let committed = self
            .get_mut(module_id)
            .and_then(Module::geometry_host_mut)
            .is_some_and(|host| host.commit(widget_id, x, y, width, height));
        if committed {
            self.save_config();
        } else {
            log::warn!("No geometry for widget {}/{}", module_id, widget_id);
        }
        committed
    }

    /// Reset one widget (`Some(id)`) or all widgets of a module, then save.
    ///
    /// Returns the number of geometry records touched.
    pub fn reset_geometry(
        &mut self,
        module_id: &str,
        scope: ResetScope,
        widget_id: Option<&str>,
    ) -> usize {
        let touched = self
            .get_mut(module_id)
            .and_then(Module::geometry_host_mut)
            .map_or(0, |host| host.reset(scope, widget_id));
        if touched > 0 {
            self.save_config();
        }
        touched
    }

    /// Reset every widget of every module, then save once.
    pub fn reset_all_geometry(&mut self, scope: ResetScope) -> usize {
        let touched: usize = self
            .modules
            .iter_mut()
            .filter_map(Module::geometry_host_mut)
            .map(|host| host.reset(scope, None))
            .sum();
        if touched > 0 {
            self.save_config();
        }
        touched
    }
}
