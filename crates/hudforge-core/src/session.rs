//! Editor session: editor-mode state, widget registry, selection, drag and
//! resize.
//!
//! The session is created once by the host and driven synchronously from its
//! input dispatch. It owns every registered widget; the host reads them back
//! for rendering through [`EditorSession::widgets`].

use crate::config::EditorConfig;
use crate::editable::{EditableWidget, ResizeEdge};
use crate::geometry::ResetScope;
use crate::input::{MouseButton, PointerEvent};
use crate::registry::ModuleRegistry;
use kurbo::{Point, Size, Vec2};
use std::fmt;

/// Handle to a widget registered with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetKey(u64);

/// Observable state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Editor mode is off.
    Inactive,
    /// Editor mode is on, nothing selected.
    ActiveIdle,
    /// A widget is selected but not being manipulated.
    ActiveSelected,
    /// The selected widget follows the pointer.
    Dragging,
    /// The selected widget is being resized from one edge.
    Resizing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    widget: WidgetKey,
    /// Pointer position relative to the widget's top-left at drag start.
    offset: Vec2,
}

/// Geometry snapshot taken when a resize starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeState {
    widget: WidgetKey,
    edge: ResizeEdge,
    start_mouse: Point,
    start_position: Point,
    start_size: Size,
}

/// Drag and resize are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Interaction {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
}

struct RegisteredWidget {
    key: WidgetKey,
    widget: Box<dyn EditableWidget>,
}

/// Callback told about editor mode turning on or off.
pub type ActiveListener = Box<dyn FnMut(bool)>;

/// Coordinator of editor mode.
pub struct EditorSession {
    config: EditorConfig,
    active: bool,
    screen: Option<String>,
    widgets: Vec<RegisteredWidget>,
    next_key: u64,
    selected: Option<WidgetKey>,
    interaction: Interaction,
    listeners: Vec<ActiveListener>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("active", &self.active)
            .field("screen", &self.screen)
            .field("widgets", &self.widgets.len())
            .field("selected", &self.selected)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Create an inactive session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            active: false,
            screen: None,
            widgets: Vec::new(),
            next_key: 0,
            selected: None,
            interaction: Interaction::Idle,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> EditorState {
        match self.interaction {
            Interaction::Dragging(_) => EditorState::Dragging,
            Interaction::Resizing(_) => EditorState::Resizing,
            Interaction::Idle if !self.active => EditorState::Inactive,
            Interaction::Idle if self.selected.is_some() => EditorState::ActiveSelected,
            Interaction::Idle => EditorState::ActiveIdle,
        }
    }

    /// Register a callback for editor mode changes.
    pub fn add_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Turn editor mode on or off.
    ///
    /// Turning it off clears the selection and abandons any drag or resize
    /// without committing. Listeners only hear about actual changes.
    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.selected = None;
            self.interaction = Interaction::Idle;
        }
        if self.active == active {
            return;
        }
        self.active = active;
        log::debug!("Editor mode {}", if active { "on" } else { "off" });
        for listener in &mut self.listeners {
            listener(active);
        }
    }

    pub fn toggle(&mut self) {
        self.set_active(!self.active);
    }

    pub fn current_screen(&self) -> Option<&str> {
        self.screen.as_deref()
    }

    /// Tell the session a host screen was opened.
    ///
    /// Every call hard-resets the session, including a fresh instance of the
    /// screen that was already showing: its widgets register again.
    pub fn set_screen(&mut self, screen: impl Into<String>) {
        let screen = screen.into();
        log::debug!("Screen opened: {}", screen);
        self.reset();
        self.screen = Some(screen);
    }

    /// Drop every widget and the selection and leave editor mode, whatever
    /// the current state. Nothing is committed.
    pub fn reset(&mut self) {
        self.widgets.clear();
        self.set_active(false);
    }

    /// Add a widget. Later registrations sit on top of earlier ones.
    pub fn register_widget(&mut self, widget: impl EditableWidget + 'static) -> WidgetKey {
        self.register_boxed(Box::new(widget))
    }

    pub fn register_boxed(&mut self, widget: Box<dyn EditableWidget>) -> WidgetKey {
        let key = WidgetKey(self.next_key);
        self.next_key += 1;
        self.widgets.push(RegisteredWidget { key, widget });
        key
    }

    /// Registered widgets, bottom to top.
    pub fn widgets(&self) -> impl Iterator<Item = (WidgetKey, &dyn EditableWidget)> {
        self.widgets.iter().map(|entry| (entry.key, entry.widget.as_ref()))
    }

    pub fn widget(&self, key: WidgetKey) -> Option<&dyn EditableWidget> {
        self.widgets
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.widget.as_ref())
    }

    fn widget_mut(&mut self, key: WidgetKey) -> Option<&mut (dyn EditableWidget + 'static)> {
        self.widgets
            .iter_mut()
            .find(|entry| entry.key == key)
            .map(|entry| entry.widget.as_mut())
    }

    pub fn selected(&self) -> Option<WidgetKey> {
        self.selected
    }

    /// Select a widget without starting a drag or resize.
    pub fn select(&mut self, key: Option<WidgetKey>) {
        self.interaction = Interaction::Idle;
        self.selected = key.filter(|&key| self.widget(key).is_some());
    }

    /// Edge of the resize in progress.
    pub fn active_edge(&self) -> Option<ResizeEdge> {
        match self.interaction {
            Interaction::Resizing(state) => Some(state.edge),
            _ => None,
        }
    }

    /// The topmost widget containing the point: the most recently registered.
    pub fn widget_at(&self, point: Point) -> Option<WidgetKey> {
        self.widgets
            .iter()
            .rev()
            .find(|entry| entry.widget.is_mouse_over(point))
            .map(|entry| entry.key)
    }

    /// Start dragging a widget. Selects it and drops any resize.
    pub fn start_dragging(&mut self, key: WidgetKey, mouse: Point) -> bool {
        let Some(widget) = self.widget(key) else {
            return false;
        };
        let offset = mouse - widget.position();
        self.selected = Some(key);
        self.interaction = Interaction::Dragging(DragState { widget: key, offset });
        true
    }

    /// Move the dragged widget so the grab point stays under the pointer.
    pub fn update_dragging(&mut self, mouse: Point) {
        let Interaction::Dragging(state) = self.interaction else {
            return;
        };
        if let Some(widget) = self.widget_mut(state.widget) {
            widget.set_position(mouse - state.offset);
        }
    }

    /// Finish a drag, committing the widget's position.
    ///
    /// Returns false, doing nothing, when no drag is in progress.
    pub fn stop_dragging(&mut self, registry: &mut ModuleRegistry) -> bool {
        let Interaction::Dragging(state) = self.interaction else {
            return false;
        };
        self.interaction = Interaction::Idle;
        if let Some(widget) = self.widget(state.widget) {
            widget.commit(registry);
        }
        true
    }

    /// Start resizing a widget from `edge`. Selects it and drops any drag.
    pub fn start_resizing(&mut self, key: WidgetKey, mouse: Point, edge: ResizeEdge) -> bool {
        let Some(widget) = self.widget(key) else {
            return false;
        };
        let state = ResizeState {
            widget: key,
            edge,
            start_mouse: mouse,
            start_position: widget.position(),
            start_size: widget.size(),
        };
        self.selected = Some(key);
        self.interaction = Interaction::Resizing(state);
        true
    }

    /// Resize the widget for the current pointer position.
    pub fn update_resizing(&mut self, mouse: Point) {
        let Interaction::Resizing(state) = self.interaction else {
            return;
        };
        let (position, size) = resize_geometry(&state, mouse, self.config.min_widget_size);
        if let Some(widget) = self.widget_mut(state.widget) {
            widget.set_position(position);
            widget.set_size(size);
        }
    }

    /// Finish a resize, committing the widget's geometry.
    ///
    /// Returns false, doing nothing, when no resize is in progress.
    pub fn stop_resizing(&mut self, registry: &mut ModuleRegistry) -> bool {
        let Interaction::Resizing(state) = self.interaction else {
            return false;
        };
        self.interaction = Interaction::Idle;
        if let Some(widget) = self.widget(state.widget) {
            widget.commit(registry);
        }
        true
    }

    /// Translate a host pointer event into session calls.
    ///
    /// Returns whether the event was consumed. Ignored while inactive.
    pub fn handle_pointer(&mut self, event: PointerEvent, registry: &mut ModuleRegistry) -> bool {
        if !self.active {
            return false;
        }
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.pointer_down(position),
            PointerEvent::Move { position } => match self.interaction {
                Interaction::Dragging(_) => {
                    self.update_dragging(position);
                    true
                }
                Interaction::Resizing(_) => {
                    self.update_resizing(position);
                    true
                }
                Interaction::Idle => false,
            },
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.stop_dragging(registry) || self.stop_resizing(registry),
            _ => false,
        }
    }

    fn pointer_down(&mut self, position: Point) -> bool {
        // The selected widget's bands reach outside its bounds
        if let Some(key) = self.selected {
            if let Some(edge) = self.resize_edge_for(key, position) {
                return self.start_resizing(key, position, edge);
            }
        }
        match self.widget_at(position) {
            Some(key) => match self.resize_edge_for(key, position) {
                Some(edge) => self.start_resizing(key, position, edge),
                None => self.start_dragging(key, position),
            },
            None => {
                self.select(None);
                false
            }
        }
    }

    fn resize_edge_for(&self, key: WidgetKey, point: Point) -> Option<ResizeEdge> {
        self.widget(key)
            .filter(|widget| widget.is_resizable())
            .and_then(|widget| widget.resize_edge_at(point))
    }

    /// Reset the selected widget's stored geometry and refresh live widgets.
    pub fn reset_selected(&mut self, scope: ResetScope, registry: &mut ModuleRegistry) -> bool {
        if self.interaction != Interaction::Idle {
            return false;
        }
        let Some(widget) = self.selected.and_then(|key| self.widget(key)) else {
            return false;
        };
        let touched = registry.reset_geometry(widget.module_id(), scope, Some(widget.widget_id()));
        self.refresh_widgets(registry);
        touched > 0
    }

    /// Pull stored geometry into every live widget.
    pub fn refresh_widgets(&mut self, registry: &ModuleRegistry) {
        for entry in &mut self.widgets {
            entry.widget.refresh(registry);
        }
    }
}

/// New position and size for a resize in progress.
///
/// Dragged sides follow the pointer delta; size is clamped to `min_size`
/// with no upper bound, and the side opposite a dragged west or north edge
/// stays where it started.
fn resize_geometry(state: &ResizeState, mouse: Point, min_size: f64) -> (Point, Size) {
    let delta = mouse - state.start_mouse;
    let edge = state.edge;
    let start = state.start_position;
    let start_size = state.start_size;

    let mut width = start_size.width;
    let mut height = start_size.height;
    if edge.is_west() {
        width -= delta.x;
    } else if edge.is_east() {
        width += delta.x;
    }
    if edge.is_north() {
        height -= delta.y;
    } else if edge.is_south() {
        height += delta.y;
    }

    let width = width.max(min_size);
    let height = height.max(min_size);

    // Anchor the opposite side
    let x = if edge.is_west() {
        start.x + start_size.width - width
    } else {
        start.x
    };
    let y = if edge.is_north() {
        start.y + start_size.height - height
    } else {
        start.y
    };

    (Point::new(x, y), Size::new(width, height))
}
