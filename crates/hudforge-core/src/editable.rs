//! The editable widget capability: geometry accessors, hit-testing, edge
//! detection and commit-to-storage.

use crate::config::DEFAULT_HANDLE_SIZE;
use crate::registry::ModuleRegistry;
use kurbo::{Point, Rect, Size};

/// The edge or corner a resize acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    // Corner handles
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    // Edge handles
    Top,
    Bottom,
    Left,
    Right,
}

impl ResizeEdge {
    /// All edges, corners first, in hit-test priority order.
    pub const ALL: [ResizeEdge; 8] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
    ];

    /// Moves the left side.
    pub fn is_west(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    /// Moves the right side.
    pub fn is_east(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    /// Moves the top side.
    pub fn is_north(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    /// Moves the bottom side.
    pub fn is_south(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    pub fn is_corner(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight)
    }
}

/// A resize handle anchor for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: ResizeEdge,
    /// Position in screen coordinates.
    pub position: Point,
}

impl Handle {
    pub fn new(kind: ResizeEdge, position: Point) -> Self {
        Self { kind, position }
    }
}

/// The eight resize handles of a rectangle: corners, then edge midpoints.
pub fn handles_for(bounds: Rect) -> Vec<Handle> {
    let center = bounds.center();
    vec![
        Handle::new(ResizeEdge::TopLeft, Point::new(bounds.x0, bounds.y0)),
        Handle::new(ResizeEdge::TopRight, Point::new(bounds.x1, bounds.y0)),
        Handle::new(ResizeEdge::BottomLeft, Point::new(bounds.x0, bounds.y1)),
        Handle::new(ResizeEdge::BottomRight, Point::new(bounds.x1, bounds.y1)),
        Handle::new(ResizeEdge::Top, Point::new(center.x, bounds.y0)),
        Handle::new(ResizeEdge::Bottom, Point::new(center.x, bounds.y1)),
        Handle::new(ResizeEdge::Left, Point::new(bounds.x0, center.y)),
        Handle::new(ResizeEdge::Right, Point::new(bounds.x1, center.y)),
    ]
}

/// Classify a point against the resize bands of `bounds`.
///
/// Each band spans `handle` on both sides of its edge, half-open. Corners win
/// over single edges.
pub fn classify_edge(bounds: Rect, point: Point, handle: f64) -> Option<ResizeEdge> {
    let over = bounds.contains(point);
    let near = bounds.inflate(handle, handle).contains(point);
    if !over && !near {
        return None;
    }

    let in_band = |value: f64, edge: f64| value >= edge - handle && value < edge + handle;
    let left = in_band(point.x, bounds.x0);
    let right = in_band(point.x, bounds.x1);
    let top = in_band(point.y, bounds.y0);
    let bottom = in_band(point.y, bounds.y1);

    if top && left {
        Some(ResizeEdge::TopLeft)
    } else if top && right {
        Some(ResizeEdge::TopRight)
    } else if bottom && left {
        Some(ResizeEdge::BottomLeft)
    } else if bottom && right {
        Some(ResizeEdge::BottomRight)
    } else if top {
        Some(ResizeEdge::Top)
    } else if bottom {
        Some(ResizeEdge::Bottom)
    } else if left {
        Some(ResizeEdge::Left)
    } else if right {
        Some(ResizeEdge::Right)
    } else {
        None
    }
}

/// An on-screen widget that can take part in editor mode.
///
/// Implementors provide identity and live geometry; hit-testing and commit
/// have default implementations built on those.
pub trait EditableWidget {
    /// Id of the module whose geometry host stores this widget.
    fn module_id(&self) -> &str;

    /// Id of the widget inside its module.
    fn widget_id(&self) -> &str;

    /// Live top-left position.
    fn position(&self) -> Point;

    /// Live size.
    fn size(&self) -> Size;

    fn set_position(&mut self, position: Point);

    fn set_size(&mut self, size: Size);

    /// Thickness of the resize bands.
    fn handle_size(&self) -> f64 {
        DEFAULT_HANDLE_SIZE
    }

    fn is_resizable(&self) -> bool {
        true
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Point inside `[x, x+w) x [y, y+h)`.
    fn is_mouse_over(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Point inside the bounds grown by the handle size on every side.
    fn is_near_edge(&self, point: Point) -> bool {
        let handle = self.handle_size();
        self.bounds().inflate(handle, handle).contains(point)
    }

    /// Which resize band the point is in, if any.
    fn resize_edge_at(&self, point: Point) -> Option<ResizeEdge> {
        classify_edge(self.bounds(), point, self.handle_size())
    }

    /// Store the live geometry in the module's geometry host and persist it.
    fn commit(&self, registry: &mut ModuleRegistry) -> bool {
        let position = self.position();
        let size = self.size();
        registry.commit_geometry(
            self.module_id(),
            self.widget_id(),
            position.x,
            position.y,
            size.width,
            size.height,
        )
    }

    /// Pull stored geometry back into the live widget.
    fn refresh(&mut self, _registry: &ModuleRegistry) {}
}

/// A widget whose geometry lives in a module's geometry host.
#[derive(Debug, Clone, PartialEq)]
pub struct HudWidget {
    module_id: String,
    widget_id: String,
    position: Point,
    size: Size,
    handle_size: f64,
    resizable: bool,
}

impl HudWidget {
    /// Attach to a module's geometry, creating the record from the defaults.
    ///
    /// Any geometry loaded for this widget before it existed is applied here.
    /// Returns None if the module is unknown or has no geometry host.
    pub fn attach(
        registry: &mut ModuleRegistry,
        module_id: &str,
        widget_id: &str,
        default_offset: Point,
    ) -> Option<Self> {
        let Point { x, y } = default_offset;
        let geometry = registry.get_or_create_geometry(module_id, widget_id, x, y)?;
        Some(Self {
            module_id: module_id.to_string(),
            widget_id: widget_id.to_string(),
            position: geometry.origin(),
            size: geometry.size(),
            handle_size: DEFAULT_HANDLE_SIZE,
            resizable: true,
        })
    }

    pub fn with_handle_size(mut self, handle_size: f64) -> Self {
        self.handle_size = handle_size;
        self
    }

    /// Disallow resizing; the widget can still be dragged.
    pub fn fixed_size(mut self) -> Self {
        self.resizable = false;
        self
    }
}

impl EditableWidget for HudWidget {
    fn module_id(&self) -> &str {
        &self.module_id
    }

    fn widget_id(&self) -> &str {
        &self.widget_id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn size(&self) -> Size {
        self.size
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn handle_size(&self) -> f64 {
        self.handle_size
    }

    fn is_resizable(&self) -> bool {
        self.resizable
    }

    fn refresh(&mut self, registry: &ModuleRegistry) {
        if let Some(geometry) = registry.geometry(&self.module_id, &self.widget_id) {
            self.position = geometry.origin();
            self.size = geometry.size();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryHost;
    use crate::module::Module;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn bounds() -> Rect {
        Rect::new(100.0, 100.0, 140.0, 140.0)
    }

    fn edge_at(x: f64, y: f64) -> Option<ResizeEdge> {
        classify_edge(bounds(), Point::new(x, y), 6.0)
    }

    #[test]
    fn test_corner_beats_edges() {
        assert_eq!(edge_at(102.0, 103.0), Some(ResizeEdge::TopLeft));
        assert_eq!(edge_at(138.0, 97.0), Some(ResizeEdge::TopRight));
        assert_eq!(edge_at(95.0, 145.0), Some(ResizeEdge::BottomLeft));
        assert_eq!(edge_at(140.0, 140.0), Some(ResizeEdge::BottomRight));
    }

    #[test]
    fn test_single_edges() {
        assert_eq!(edge_at(120.0, 101.0), Some(ResizeEdge::Top));
        assert_eq!(edge_at(120.0, 139.0), Some(ResizeEdge::Bottom));
        assert_eq!(edge_at(97.0, 120.0), Some(ResizeEdge::Left));
        assert_eq!(edge_at(145.0, 120.0), Some(ResizeEdge::Right));
    }

    #[test]
    fn test_no_edge() {
        // Interior away from every band
        assert_eq!(edge_at(120.0, 120.0), None);
        // Outside the grown bounds
        assert_eq!(edge_at(90.0, 90.0), None);
        // Bands are half-open on the far side
        assert_eq!(edge_at(146.0, 120.0), None);
    }

    #[test]
    fn test_direction_flags() {
        for edge in ResizeEdge::ALL {
            assert!(!(edge.is_west() && edge.is_east()));
            assert!(!(edge.is_north() && edge.is_south()));
            let sides = [edge.is_west(), edge.is_east(), edge.is_north(), edge.is_south()];
            let count = sides.iter().filter(|&&s| s).count();
            assert_eq!(count, if edge.is_corner() { 2 } else { 1 });
        }
    }

    #[test]
    fn test_handles_for() {
        let handles = handles_for(bounds());
        assert_eq!(handles.len(), 8);
        assert_eq!(handles[0], Handle::new(ResizeEdge::TopLeft, Point::new(100.0, 100.0)));
        assert_eq!(handles[7], Handle::new(ResizeEdge::Right, Point::new(140.0, 120.0)));
    }

    fn registry() -> (Arc<MemoryStorage>, ModuleRegistry) {
        let storage = Arc::new(MemoryStorage::new());
        let mut registry = ModuleRegistry::new(storage.clone());
        let clock = Module::new("clock", "Clock", "").with_geometry(GeometryHost::new(40.0, 40.0));
        registry.register(clock).unwrap();
        registry.register(Module::new("plain", "Plain", "")).unwrap();
        registry.initialize();
        (storage, registry)
    }

    #[test]
    fn test_widget_hit_tests() {
        let (_, mut registry) = registry();
        let origin = Point::new(100.0, 100.0);
        let widget = HudWidget::attach(&mut registry, "clock", "main", origin).unwrap();

        assert!(widget.is_mouse_over(Point::new(100.0, 100.0)));
        assert!(!widget.is_mouse_over(Point::new(140.0, 120.0)));
        assert!(widget.is_near_edge(Point::new(145.0, 120.0)));
        assert!(!widget.is_near_edge(Point::new(146.0, 120.0)));
        assert_eq!(widget.resize_edge_at(Point::new(102.0, 102.0)), Some(ResizeEdge::TopLeft));
    }

    #[test]
    fn test_attach_requires_geometry_host() {
        let (_, mut registry) = registry();
        assert!(HudWidget::attach(&mut registry, "plain", "main", Point::ZERO).is_none());
        assert!(HudWidget::attach(&mut registry, "missing", "main", Point::ZERO).is_none());
    }

    #[test]
    fn test_commit_and_refresh() {
        let (storage, mut registry) = registry();
        let mut widget = HudWidget::attach(&mut registry, "clock", "main", Point::ZERO).unwrap();

        widget.set_position(Point::new(7.0, 8.0));
        assert!(widget.commit(&mut registry));
        assert_eq!(storage.save_count(), 1);
        assert_eq!(registry.geometry("clock", "main").unwrap().origin(), Point::new(7.0, 8.0));

        registry.reset_geometry("clock", crate::geometry::ResetScope::All, None);
        widget.refresh(&registry);
        assert_eq!(widget.position(), Point::ZERO);
    }
}
