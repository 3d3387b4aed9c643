//! Built-in modules shipped with the shell.

use hudforge_core::{
    AlertSettings, GeometryHost, Module, ModuleHooks, ModuleRegistry, RegistryError, Setting,
};

pub const CLOCK_ID: &str = "clock";
pub const LOW_HEALTH_ID: &str = "low_health";

/// Widget ids drawn by the clock module.
pub const CLOCK_WIDGET: &str = "time";

/// Tracks how often the clock was switched on.
#[derive(Debug, Default)]
pub struct ClockHooks {
    pub enable_count: u32,
    pub running: bool,
}

impl ModuleHooks for ClockHooks {
    fn on_enable(&mut self) {
        self.enable_count += 1;
        self.running = true;
        log::debug!("Clock started");
    }

    fn on_disable(&mut self) {
        self.running = false;
        log::debug!("Clock stopped");
    }
}

fn clock() -> Module {
    Module::new(CLOCK_ID, "Clock", "Shows the local time")
        .with_hooks(ClockHooks::default())
        .with_geometry(GeometryHost::new(64.0, 16.0))
        .with_setting(Setting::boolean(
            "seconds",
            "Show seconds",
            "Include seconds in the time",
            false,
        ))
        .with_setting(Setting::choice("format", "Format", "Clock format", ["24h", "12h"], "24h"))
        .enabled_by_default(true)
}

fn low_health() -> Module {
    Module::new(LOW_HEALTH_ID, "Low health alert", "Warns when health drops low")
        .with_setting(Setting::integer(
            "threshold",
            "Threshold",
            "Health below which to warn",
            6,
            1,
            19,
        ))
        .with_alert_settings(AlertSettings::default().with_display_seconds(5))
}

/// Register every built-in module.
pub fn register_builtin(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register(clock())?;
    registry.register(low_health())?;
    Ok(())
}
