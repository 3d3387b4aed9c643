//! Widget geometry records and the geometry-owning module capability.

use kurbo::{Point, Rect, Size};
use std::collections::{BTreeMap, HashMap};

/// Position and size of one widget, with immutable defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetGeometry {
    offset_x: f64,
    offset_y: f64,
    width: f64,
    height: f64,
    default_offset_x: f64,
    default_offset_y: f64,
    default_width: f64,
    default_height: f64,
}

impl WidgetGeometry {
    /// Create a geometry record sitting at its defaults.
    pub fn new(
        default_offset_x: f64,
        default_offset_y: f64,
        default_width: f64,
        default_height: f64,
    ) -> Self {
        Self {
            offset_x: default_offset_x,
            offset_y: default_offset_y,
            width: default_width,
            height: default_height,
            default_offset_x,
            default_offset_y,
            default_width,
            default_height,
        }
    }

    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn default_offset(&self) -> Point {
        Point::new(self.default_offset_x, self.default_offset_y)
    }

    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounds as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset_x = x;
        self.offset_y = y;
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn reset_offset(&mut self) {
        self.offset_x = self.default_offset_x;
        self.offset_y = self.default_offset_y;
    }

    pub fn reset_size(&mut self) {
        self.width = self.default_width;
        self.height = self.default_height;
    }

    pub fn reset(&mut self) {
        self.reset_offset();
        self.reset_size();
    }

    /// Whether offset and size both sit at their defaults.
    pub fn is_default(&self) -> bool {
        self.origin() == self.default_offset() && self.size() == self.default_size()
    }
}

/// Raw geometry values loaded from storage before the widget exists.
///
/// Fields missing from the persisted document stay `None` and leave the
/// widget's own default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingGeometry {
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl PendingGeometry {
    /// Pending values with every field present.
    pub fn full(offset_x: f64, offset_y: f64, width: f64, height: f64) -> Self {
        Self {
            offset_x: Some(offset_x),
            offset_y: Some(offset_y),
            width: Some(width),
            height: Some(height),
        }
    }

    fn apply_to(&self, geometry: &mut WidgetGeometry) {
        let x = self.offset_x.unwrap_or(geometry.offset_x);
        let y = self.offset_y.unwrap_or(geometry.offset_y);
        let w = self.width.unwrap_or(geometry.width);
        let h = self.height.unwrap_or(geometry.height);
        geometry.set_offset(x, y);
        geometry.set_size(w, h);
    }
}

/// Which part of a geometry record a reset restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    Offset,
    Size,
    All,
}

/// Capability of a module that owns on-screen widgets.
///
/// Geometry records are created lazily the first time a widget asks for
/// them with its defaults. Values loaded from storage before that moment are
/// parked in a pending map and applied exactly once, on creation.
#[derive(Debug, Clone)]
pub struct GeometryHost {
    geometries: BTreeMap<String, WidgetGeometry>,
    pending: HashMap<String, PendingGeometry>,
    default_width: f64,
    default_height: f64,
}

impl GeometryHost {
    /// Create a host whose widgets default to the given size.
    pub fn new(default_width: f64, default_height: f64) -> Self {
        Self {
            geometries: BTreeMap::new(),
            pending: HashMap::new(),
            default_width,
            default_height,
        }
    }

    pub fn default_width(&self) -> f64 {
        self.default_width
    }

    pub fn default_height(&self) -> f64 {
        self.default_height
    }

    /// Get the geometry for a widget, creating it from the defaults if needed.
    ///
    /// On creation, any pending loaded values override the defaults and the
    /// pending entry is discarded. Once the record exists, the supplied
    /// defaults are ignored.
    pub fn get_or_create_geometry(
        &mut self,
        widget_id: &str,
        default_offset_x: f64,
        default_offset_y: f64,
    ) -> &WidgetGeometry {
        if !self.geometries.contains_key(widget_id) {
            let mut geometry = WidgetGeometry::new(
                default_offset_x,
                default_offset_y,
                self.default_width,
                self.default_height,
            );
            if let Some(pending) = self.pending.remove(widget_id) {
                log::debug!("Applying loaded geometry to widget {}", widget_id);
                pending.apply_to(&mut geometry);
            }
            self.geometries.insert(widget_id.to_string(), geometry);
        }
        &self.geometries[widget_id]
    }

    /// Store raw loaded values for a widget.
    pub fn load_pending_geometry(
        &mut self,
        widget_id: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) {
        self.load_pending(widget_id, PendingGeometry::full(x, y, width, height));
    }

    /// Store possibly partial loaded values for a widget.
    ///
    /// If the widget's geometry already exists (a reload), the values are
    /// applied right away instead of being parked.
    pub fn load_pending(&mut self, widget_id: &str, pending: PendingGeometry) {
        match self.geometries.get_mut(widget_id) {
            Some(geometry) => pending.apply_to(geometry),
            None => {
                self.pending.insert(widget_id.to_string(), pending);
            }
        }
    }

    /// Loaded values still waiting for their widget.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &PendingGeometry)> {
        self.pending.iter().map(|(id, p)| (id.as_str(), p))
    }

    /// Whether loaded values are still waiting for this widget.
    pub fn has_pending(&self, widget_id: &str) -> bool {
        self.pending.contains_key(widget_id)
    }

    pub fn geometry(&self, widget_id: &str) -> Option<&WidgetGeometry> {
        self.geometries.get(widget_id)
    }

    /// All live geometry records, ordered by widget id.
    pub fn geometries(&self) -> impl Iterator<Item = (&str, &WidgetGeometry)> {
        self.geometries.iter().map(|(id, g)| (id.as_str(), g))
    }

    /// Write a widget's live position and size. Returns false for unknown widgets.
    pub fn commit(&mut self, widget_id: &str, x: f64, y: f64, width: f64, height: f64) -> bool {
        match self.geometries.get_mut(widget_id) {
            Some(geometry) => {
                geometry.set_offset(x, y);
                geometry.set_size(width, height);
                true
            }
            None => false,
        }
    }

    /// Reset one widget (`Some(id)`) or every widget (`None`).
    ///
    /// Returns the number of records touched.
    pub fn reset(&mut self, scope: ResetScope, widget_id: Option<&str>) -> usize {
        let apply = |geometry: &mut WidgetGeometry| match scope {
            ResetScope::Offset => geometry.reset_offset(),
            ResetScope::Size => geometry.reset_size(),
            ResetScope::All => geometry.reset(),
        };
        match widget_id {
            Some(id) => match self.geometries.get_mut(id) {
                Some(geometry) => {
                    apply(geometry);
                    1
                }
                None => 0,
            },
            None => {
                self.geometries.values_mut().for_each(apply);
                self.geometries.len()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uses_defaults() {
        let mut host = GeometryHost::new(80.0, 20.0);
        let geometry = host.get_or_create_geometry("clock", 5.0, 7.0);

        assert_eq!(geometry.origin(), Point::new(5.0, 7.0));
        assert_eq!(geometry.size(), Size::new(80.0, 20.0));
    }

    #[test]
    fn test_pending_wins_over_defaults() {
        let mut host = GeometryHost::new(80.0, 20.0);
        host.load_pending_geometry("clock", 100.0, 200.0, 40.0, 30.0);
        assert!(host.has_pending("clock"));

        let first = host.get_or_create_geometry("clock", 5.0, 7.0).clone();
        assert_eq!(first.origin(), Point::new(100.0, 200.0));
        assert_eq!(first.size(), Size::new(40.0, 30.0));
        assert!(!host.has_pending("clock"));

        // Defaults stay the caller's, so a reset goes back to them
        assert_eq!(first.default_offset(), Point::new(5.0, 7.0));

        let second = host.get_or_create_geometry("clock", 0.0, 0.0);
        assert_eq!(*second, first);
    }

    #[test]
    fn test_partial_pending_keeps_missing_defaults() {
        let mut host = GeometryHost::new(80.0, 20.0);
        host.load_pending(
            "clock",
            PendingGeometry {
                offset_x: Some(50.0),
                ..Default::default()
            },
        );

        let geometry = host.get_or_create_geometry("clock", 5.0, 7.0);
        assert_eq!(geometry.rect(), Rect::new(50.0, 7.0, 130.0, 27.0));
    }

    #[test]
    fn test_load_after_creation_applies_directly() {
        let mut host = GeometryHost::new(80.0, 20.0);
        host.get_or_create_geometry("clock", 0.0, 0.0);
        host.load_pending_geometry("clock", 1.0, 2.0, 3.0, 4.0);

        assert!(!host.has_pending("clock"));
        assert_eq!(host.geometry("clock").unwrap().rect(), Rect::new(1.0, 2.0, 4.0, 6.0));
    }

    #[test]
    fn test_reset_scopes() {
        let mut host = GeometryHost::new(80.0, 20.0);
        host.get_or_create_geometry("a", 0.0, 0.0);
        host.get_or_create_geometry("b", 10.0, 10.0);
        host.commit("a", 30.0, 30.0, 50.0, 50.0);
        host.commit("b", 40.0, 40.0, 60.0, 60.0);

        assert_eq!(host.reset(ResetScope::Offset, Some("a")), 1);
        let a = host.geometry("a").unwrap();
        assert_eq!(a.origin(), Point::ZERO);
        assert_eq!(a.size(), Size::new(50.0, 50.0));

        assert_eq!(host.reset(ResetScope::Size, None), 2);
        assert_eq!(host.geometry("b").unwrap().size(), Size::new(80.0, 20.0));
        assert_eq!(host.geometry("b").unwrap().origin(), Point::new(40.0, 40.0));

        host.reset(ResetScope::All, None);
        assert!(host.geometries().all(|(_, g)| g.is_default()));
        assert_eq!(host.reset(ResetScope::All, Some("missing")), 0);
    }

    #[test]
    fn test_commit_unknown_widget() {
        let mut host = GeometryHost::new(80.0, 20.0);
        assert!(!host.commit("ghost", 0.0, 0.0, 1.0, 1.0));
    }
}
