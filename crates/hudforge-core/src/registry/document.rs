//! Conversion between registry state and the persisted JSON document.
//!
//! Loading walks the document field by field so that a malformed field stops
//! the load at that point while everything applied before it stays.

use crate::config::GlobalSettings;
use crate::geometry::{GeometryHost, PendingGeometry};
use crate::module::Module;
use crate::setting::Setting;
use serde_json::{Map, Value, json};
use thiserror::Error;

pub(crate) const SETTINGS_KEY: &str = "settings";
pub(crate) const MODULES_KEY: &str = "modules";
const ENABLED_KEY: &str = "enabled";
const WIDGETS_KEY: &str = "widgets";

const OFFSET_X_KEY: &str = "offsetX";
const OFFSET_Y_KEY: &str = "offsetY";
const WIDTH_KEY: &str = "width";
const HEIGHT_KEY: &str = "height";

/// A field of the document had an unexpected shape.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Malformed config at {path}: expected {expected}")]
pub(crate) struct MalformedDocument {
    pub path: String,
    pub expected: &'static str,
}

fn malformed(path: impl Into<String>, expected: &'static str) -> MalformedDocument {
    MalformedDocument {
        path: path.into(),
        expected,
    }
}

/// `null` counts as missing.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn object_at<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, MalformedDocument> {
    value.as_object().ok_or_else(|| malformed(path, "an object"))
}

/// Build the document for the current state.
pub(crate) fn build(settings: &GlobalSettings, modules: &[Module]) -> Value {
    let settings: Map<String, Value> = settings
        .iter()
        .map(|s| (s.id().to_string(), s.value().to_json()))
        .collect();

    let modules: Map<String, Value> = modules
        .iter()
        .map(|module| (module.id().to_string(), build_module(module)))
        .collect();

    json!({
        SETTINGS_KEY: settings,
        MODULES_KEY: modules,
    })
}

fn build_module(module: &Module) -> Value {
    let mut entry = Map::new();
    entry.insert(ENABLED_KEY.to_string(), Value::Bool(module.is_enabled()));

    if !module.settings().is_empty() {
        let settings: Map<String, Value> = module
            .settings()
            .iter()
            .map(|s| (s.id().to_string(), s.value().to_json()))
            .collect();
        entry.insert(SETTINGS_KEY.to_string(), Value::Object(settings));
    }

    if let Some(host) = module.geometry_host() {
        entry.insert(WIDGETS_KEY.to_string(), Value::Object(build_widgets(host)));
    }

    Value::Object(entry)
}

fn build_widgets(host: &GeometryHost) -> Map<String, Value> {
    let mut widgets = Map::new();

    // Values whose widget hasn't been created this session are kept as loaded
    for (id, pending) in host.pending() {
        let mut record = Map::new();
        let fields = [
            (OFFSET_X_KEY, pending.offset_x),
            (OFFSET_Y_KEY, pending.offset_y),
            (WIDTH_KEY, pending.width),
            (HEIGHT_KEY, pending.height),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                record.insert(key.to_string(), json!(value));
            }
        }
        widgets.insert(id.to_string(), Value::Object(record));
    }

    for (id, geometry) in host.geometries() {
        widgets.insert(
            id.to_string(),
            json!({
                OFFSET_X_KEY: geometry.offset_x(),
                OFFSET_Y_KEY: geometry.offset_y(),
                WIDTH_KEY: geometry.width(),
                HEIGHT_KEY: geometry.height(),
            }),
        );
    }

    widgets
}

/// Apply a loaded document. Unknown keys are ignored; missing ones keep defaults.
pub(crate) fn apply(
    document: &Value,
    settings: &mut GlobalSettings,
    modules: &mut [Module],
) -> Result<(), MalformedDocument> {
    let root = object_at(document, "$")?;

    if let Some(section) = present(root, SETTINGS_KEY) {
        let section = object_at(section, SETTINGS_KEY)?;
        for (key, raw) in section {
            let Some(setting) = settings.get(key) else {
                continue;
            };
            let path = format!("{}.{}", SETTINGS_KEY, key);
            let expected = setting.kind().name();
            let value = setting
                .kind()
                .parse_json(raw)
                .ok_or_else(|| malformed(path.as_str(), expected))?;
            settings.load(key, value).map_err(|_| malformed(path, expected))?;
        }
    }

    if let Some(section) = present(root, MODULES_KEY) {
        let section = object_at(section, MODULES_KEY)?;
        for (id, entry) in section {
            let Some(module) = modules.iter_mut().find(|m| m.id() == id.as_str()) else {
                log::debug!("Ignoring config for unknown module {}", id);
                continue;
            };
            apply_module(&format!("{}.{}", MODULES_KEY, id), entry, module)?;
        }
    }

    Ok(())
}

fn apply_module(path: &str, entry: &Value, module: &mut Module) -> Result<(), MalformedDocument> {
    let entry = object_at(entry, path)?;

    if let Some(enabled) = present(entry, ENABLED_KEY) {
        let enabled = enabled
            .as_bool()
            .ok_or_else(|| malformed(format!("{}.{}", path, ENABLED_KEY), "a boolean"))?;
        module.load_enabled_silently(enabled);
    }

    if let Some(section) = present(entry, SETTINGS_KEY) {
        let settings_path = format!("{}.{}", path, SETTINGS_KEY);
        let section = object_at(section, &settings_path)?;
        for (key, raw) in section {
            let Some(setting) = module.setting_mut(key) else {
                continue;
            };
            apply_setting(&format!("{}.{}", settings_path, key), raw, setting)?;
        }
    }

    if let Some(section) = present(entry, WIDGETS_KEY) {
        let widgets_path = format!("{}.{}", path, WIDGETS_KEY);
        let section = object_at(section, &widgets_path)?;
        let Some(host) = module.geometry_host_mut() else {
            return Ok(());
        };
        for (widget_id, record) in section {
            let record_path = format!("{}.{}", widgets_path, widget_id);
            let record = object_at(record, &record_path)?;
            let field = |key: &str| -> Result<Option<f64>, MalformedDocument> {
                match present(record, key) {
                    None => Ok(None),
                    Some(v) => v
                        .as_f64()
                        .map(Some)
                        .ok_or_else(|| malformed(format!("{}.{}", record_path, key), "a number")),
                }
            };
            let pending = PendingGeometry {
                offset_x: field(OFFSET_X_KEY)?,
                offset_y: field(OFFSET_Y_KEY)?,
                width: field(WIDTH_KEY)?,
                height: field(HEIGHT_KEY)?,
            };
            host.load_pending(widget_id, pending);
        }
    }

    Ok(())
}

fn apply_setting(path: &str, raw: &Value, setting: &mut Setting) -> Result<(), MalformedDocument> {
    let expected = setting.kind().name();
    let value = setting
        .kind()
        .parse_json(raw)
        .ok_or_else(|| malformed(path, expected))?;
    setting
        .load_silently(value)
        .map_err(|_| malformed(path, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GUIDE_SHOWN_KEY;
    use crate::geometry::GeometryHost;

    fn modules() -> Vec<Module> {
        vec![
            Module::new("clock", "Clock", "")
                .with_geometry(GeometryHost::new(80.0, 20.0))
                .with_setting(Setting::integer("scale", "Scale", "", 2, 1, 4)),
            Module::new("fps", "FPS", ""),
        ]
    }

    #[test]
    fn test_build_shape() {
        let settings = GlobalSettings::new();
        let mut modules = modules();
        modules[0]
            .geometry_host_mut()
            .unwrap()
            .get_or_create_geometry("main", 1.0, 2.0);

        let doc = build(&settings, &modules);
        assert_eq!(doc["settings"][GUIDE_SHOWN_KEY], json!(false));
        assert_eq!(doc["modules"]["clock"]["enabled"], json!(false));
        assert_eq!(doc["modules"]["clock"]["settings"]["scale"], json!(2));
        assert_eq!(
            doc["modules"]["clock"]["widgets"]["main"],
            json!({"offsetX": 1.0, "offsetY": 2.0, "width": 80.0, "height": 20.0})
        );
        assert!(doc["modules"]["fps"].get("widgets").is_none());
    }

    #[test]
    fn test_build_keeps_pending_widgets() {
        let mut modules = modules();
        modules[0]
            .geometry_host_mut()
            .unwrap()
            .load_pending("later", PendingGeometry { width: Some(50.0), ..Default::default() });

        let doc = build(&GlobalSettings::new(), &modules);
        assert_eq!(doc["modules"]["clock"]["widgets"]["later"], json!({"width": 50.0}));
    }

    #[test]
    fn test_apply_tolerates_missing_and_unknown() {
        let mut settings = GlobalSettings::new();
        let mut modules = modules();
        let doc = json!({
            "future": 1,
            "modules": {
                "ghost": {"enabled": true},
                "clock": {"enabled": true, "widgets": {"main": {"offsetX": 9.0}}},
            }
        });

        apply(&doc, &mut settings, &mut modules).unwrap();
        assert!(modules[0].is_enabled());
        assert!(!modules[1].is_enabled());

        let geometry = modules[0]
            .geometry_host_mut()
            .unwrap()
            .get_or_create_geometry("main", 1.0, 2.0);
        assert_eq!((geometry.offset_x(), geometry.offset_y()), (9.0, 2.0));
    }

    #[test]
    fn test_apply_stops_at_malformed_field() {
        let mut settings = GlobalSettings::new();
        let mut modules = modules();
        let doc = json!({
            "settings": {"guideShown": true},
            "modules": {
                "clock": {"enabled": true, "settings": {"scale": "big"}},
                "fps": {"enabled": true},
            }
        });

        let err = apply(&doc, &mut settings, &mut modules).unwrap_err();
        assert_eq!(err.path, "modules.clock.settings.scale");

        // Applied before the failure
        assert!(settings.guide_shown());
        assert!(modules[0].is_enabled());
        // Not reached
        assert_eq!(modules[0].setting("scale").unwrap().as_int(), Some(2));
        assert!(!modules[1].is_enabled());
    }

    #[test]
    fn test_apply_rejects_non_object_root() {
        let err = apply(&json!([1, 2]), &mut GlobalSettings::new(), &mut modules()).unwrap_err();
        assert_eq!(err.path, "$");
    }
}
