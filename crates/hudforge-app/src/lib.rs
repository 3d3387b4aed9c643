//! hudforge host shell
//!
//! Wires storage, the module registry and the editor session together and
//! drives them the way a game screen would.

mod app;
mod modules;

pub use app::{App, AppConfig};
pub use modules::{CLOCK_ID, CLOCK_WIDGET, ClockHooks, LOW_HEALTH_ID, register_builtin};
