//! Editor controller owning all shared editing state.
//!
//! # Responsibility
//! - Apply collaborator callbacks to the working copy of the active layout.
//! - Route drag, pointer and wheel input into the state machines.
//! - Drive persistence triggers and surface storage failures as alerts.
//!
//! # Invariants
//! - Every change to the working copy marks persistence dirty.
//! - Layout switches and creation save the outgoing state first.
//! - Selection and pending delete never outlive their node.

use crate::config::{ConfigError, EditorConfig};
use crate::dnd::{DragCoordinator, DragPayload, DragSource, DragState, DropAction};
use crate::editor::confirm::{DeleteConfirmation, DeleteRequest};
use crate::geometry::{GestureUpdate, PointerGesture, SnakeLayout, ViewMode, Viewport};
use crate::model::layout::{AppData, Layout, LayoutId};
use crate::model::node::{Node, NodeBody, NodeId, NodeKind};
use crate::persist::{
    LoadSource, LoadedState, PersistError, PersistenceAdapter, SaveStatus, SaveTrigger,
};
use crate::store::KeyValueStore;
use crate::timer::{Clock, SystemClock};
use crate::tree::{self, DropPosition, NodeFactory};
use kurbo::{Point, Size, Vec2};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fewest parallel children a branch can be set to.
pub const MIN_BRANCH_COUNT: usize = 2;
/// Most parallel children a branch can be set to.
pub const MAX_BRANCH_COUNT: usize = 3;

/// Errors from layout management operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Layout name is blank after trim.
    InvalidLayoutName,
    /// Target layout does not exist.
    LayoutNotFound(LayoutId),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLayoutName => write!(f, "layout name must not be blank"),
            Self::LayoutNotFound(id) => write!(f, "layout not found: {id}"),
        }
    }
}

impl Error for EditorError {}

/// Row for a layout picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSummary {
    pub id: LayoutId,
    pub name: String,
    pub node_count: usize,
    pub active: bool,
}

/// Timeline editor core.
pub struct Editor<S: KeyValueStore, C: Clock = SystemClock> {
    config: EditorConfig,
    clock: C,
    factory: NodeFactory,
    data: AppData,
    nodes: Vec<Node>,
    selected: Option<NodeId>,
    view_mode: ViewMode,
    viewport: Viewport,
    drag: DragCoordinator,
    gesture: PointerGesture,
    snake: SnakeLayout,
    delete_confirm: DeleteConfirmation,
    persistence: PersistenceAdapter<S>,
    alerts: VecDeque<String>,
}

impl<S: KeyValueStore> Editor<S> {
    /// Opens an editor on `store` using the system clock.
    pub fn open(store: S, config: EditorConfig) -> Result<Self, ConfigError> {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> Editor<S, C> {
    /// Opens an editor on `store`, reading time from `clock`.
    pub fn with_clock(store: S, config: EditorConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let persistence = PersistenceAdapter::new(store, config.save_debounce());
        let LoadedState {
            data,
            active_nodes,
            source,
        } = persistence.load();
        info!(
            "event=editor_open module=editor status=ok source={} layouts={} nodes={}",
            match source {
                LoadSource::Persisted => "persisted",
                LoadSource::Defaults => "defaults",
            },
            data.layouts.len(),
            active_nodes.len()
        );

        Ok(Self {
            viewport: Viewport::new(config.viewport),
            delete_confirm: DeleteConfirmation::new(config.delete_confirm_window()),
            config,
            clock,
            factory: NodeFactory::new(),
            data,
            nodes: active_nodes,
            selected: None,
            view_mode: ViewMode::default(),
            drag: DragCoordinator::new(),
            gesture: PointerGesture::default(),
            snake: SnakeLayout::new(),
            persistence,
            alerts: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Working copy of the active layout's nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn gesture(&self) -> &PointerGesture {
        &self.gesture
    }

    pub fn save_status(&self) -> SaveStatus {
        self.persistence.status()
    }

    pub fn last_saved_time(&self) -> Option<&str> {
        self.persistence.last_saved_time()
    }

    /// Node awaiting a second delete request, if any.
    pub fn pending_delete(&self) -> Option<&NodeId> {
        self.delete_confirm.pending()
    }

    pub fn active_layout_id(&self) -> &LayoutId {
        &self.data.active_layout_id
    }

    /// Snapshot of the full application data including unsaved edits.
    pub fn app_data(&self) -> AppData {
        self.data.merged(&self.nodes)
    }

    pub fn layouts(&self) -> Vec<LayoutSummary> {
        self.data
            .layouts
            .iter()
            .map(|layout| {
                let active = layout.id == self.data.active_layout_id;
                LayoutSummary {
                    id: layout.id.clone(),
                    name: layout.name.clone(),
                    node_count: if active {
                        self.nodes.len()
                    } else {
                        layout.nodes.len()
                    },
                    active,
                }
            })
            .collect()
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    /// Pops the oldest user-facing alert.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alerts.pop_front()
    }

    // Collaborator callbacks.

    /// Appends a default node of `kind` and returns its id.
    pub fn on_add_node(&mut self, kind: NodeKind) -> NodeId {
        let node = self.factory.create(kind);
        let id = node.id.clone();
        let next = tree::insert_node(&self.nodes, node, None, DropPosition::Append);
        self.commit(next, "add_node");
        id
    }

    pub fn on_update_node(&mut self, node: Node) {
        let next = tree::update_node(&self.nodes, &node);
        self.commit(next, "update_node");
    }

    pub fn on_delete_node(&mut self, id: &NodeId) {
        let next = tree::delete_node(&self.nodes, id);
        self.commit(next, "delete_node");
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.delete_confirm.forget(id);
    }

    /// Applies a resolved drop: palette drops insert, canvas drops move.
    pub fn on_drop_node(
        &mut self,
        payload: DragPayload,
        target: Option<NodeId>,
        position: DropPosition,
    ) {
        let next = match payload.source {
            DragSource::Sidebar => {
                let node = self.factory.create(payload.kind);
                tree::insert_node(&self.nodes, node, target.as_ref(), position)
            }
            DragSource::Canvas => {
                let (Some(id), Some(target)) = (payload.id.as_ref(), target.as_ref()) else {
                    debug!("event=drop_node module=editor status=noop reason=no_target");
                    return;
                };
                tree::move_node(&self.nodes, id, Some(target), position)
            }
        };
        self.commit(next, "drop_node");
    }

    /// Selects `id`, or clears the selection with `None`.
    pub fn on_select(&mut self, id: Option<NodeId>) {
        if self.delete_confirm.pending() != id.as_ref() {
            self.delete_confirm.clear();
        }
        self.selected = id;
    }

    /// Appends a default side event to a block; returns the new child id.
    pub fn on_add_side_event(&mut self, block_id: &NodeId) -> Option<NodeId> {
        let is_block = self
            .nodes
            .iter()
            .any(|node| &node.id == block_id && node.kind() == NodeKind::Block);
        if !is_block {
            warn!(
                "event=add_side_event module=editor status=skipped reason=not_a_block id={}",
                block_id
            );
            return None;
        }
        let event = self.factory.side_event(NodeId::generate());
        let id = event.id.clone();
        let next = tree::add_side_event(&self.nodes, block_id, event);
        self.commit(next, "add_side_event");
        Some(id)
    }

    /// Sets a branch's parallel child count, clamped to the editable range.
    pub fn on_set_branch_count(&mut self, branch_id: &NodeId, count: usize) {
        let count = count.clamp(MIN_BRANCH_COUNT, MAX_BRANCH_COUNT);
        let next = tree::set_branch_count(&self.nodes, branch_id, count, &self.factory);
        self.commit(next, "set_branch_count");
    }

    // Delete confirmation.

    /// First call arms confirmation for the selected node; a second call
    /// inside the window deletes it. Returns the deleted id.
    pub fn request_delete(&mut self) -> Option<NodeId> {
        let id = self.selected.clone()?;
        match self.delete_confirm.request(&id, self.clock.now()) {
            DeleteRequest::Armed => {
                debug!("event=request_delete module=editor status=armed id={}", id);
                None
            }
            DeleteRequest::Confirmed(id) => {
                self.on_delete_node(&id);
                Some(id)
            }
        }
    }

    // Drag and drop.

    /// Starts a drag and returns the data to place on the drag channel.
    pub fn drag_start(&mut self, payload: DragPayload) -> String {
        self.drag.begin(payload)
    }

    pub fn drag_over_node(
        &mut self,
        target: NodeId,
        pointer: f64,
        zone_start: f64,
        zone_extent: f64,
    ) {
        self.drag.hover_node(target, pointer, zone_start, zone_extent);
    }

    pub fn drag_over_canvas(&mut self) {
        self.drag.hover_canvas();
    }

    pub fn drag_enter_trash(&mut self) {
        self.drag.enter_trash();
    }

    pub fn drag_leave_trash(&mut self) {
        self.drag.leave_trash();
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    /// Resolves and applies a drop; returns the applied action.
    pub fn drop(&mut self, channel_data: &str) -> DropAction {
        let action = self.drag.drop(channel_data);
        match &action {
            DropAction::None => {}
            DropAction::Insert {
                payload,
                target,
                position,
            } => self.on_drop_node(payload.clone(), target.clone(), *position),
            DropAction::Delete(id) => self.on_delete_node(id),
        }
        action
    }

    // Viewport and pointer gestures.

    pub fn wheel(&mut self, screen: Point, delta: Vec2, zoom_modifier: bool) {
        self.viewport.wheel(screen, delta, zoom_modifier);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Switches rendering mode; the viewport always returns to identity.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.viewport.reset();
    }

    pub fn begin_pan(&mut self, screen: Point) {
        self.gesture = PointerGesture::Panning {
            origin: screen,
            start_pan: self.viewport.pan(),
        };
    }

    /// Starts resizing the block with `block_id`; `false` if it is not a block.
    pub fn begin_resize(&mut self, block_id: &NodeId, screen: Point) -> bool {
        let sizing = self.config.block;
        let start_size = self.nodes.iter().find_map(|node| match &node.body {
            NodeBody::Block {
                custom_width,
                custom_height,
                ..
            } if &node.id == block_id => Some(Size::new(
                custom_width.unwrap_or(sizing.default_width),
                custom_height.unwrap_or(sizing.default_height),
            )),
            _ => None,
        });
        let Some(start_size) = start_size else {
            return false;
        };
        self.gesture = PointerGesture::Resizing {
            node_id: block_id.clone(),
            origin: screen,
            start_size,
        };
        true
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match self
            .gesture
            .pointer_move(screen, self.viewport.zoom(), &self.config.block)
        {
            GestureUpdate::None => {}
            GestureUpdate::Pan(pan) => self.viewport.set_pan(pan),
            GestureUpdate::Resize { node_id, size } => {
                let next = tree::resize_block(&self.nodes, &node_id, size.width, size.height);
                self.commit(next, "resize_block");
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture.pointer_up();
    }

    /// Map-view geometry for the current node order.
    pub fn snake_layout(&mut self) -> &SnakeLayout {
        self.snake.update(&self.nodes, &self.config.snake);
        &self.snake
    }

    // Persistence.

    /// Advances timers: expires delete confirmation, runs the debounced save.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(id) = self.delete_confirm.expire(now) {
            debug!("event=request_delete module=editor status=expired id={}", id);
        }
        if let Err(err) = self.persistence.poll(now, &self.data, &self.nodes) {
            self.alert_save_failure(err);
        }
    }

    /// Saves immediately, bypassing the debounce.
    pub fn save_now(&mut self) {
        if let Err(err) = self
            .persistence
            .save_now(&self.data, &self.nodes, SaveTrigger::Manual)
        {
            self.alert_save_failure(err);
        }
    }

    /// Writes synchronously when the host is being hidden or closed.
    pub fn on_visibility_hidden(&mut self) {
        if let Err(err) = self.persistence.emergency_save(&self.data, &self.nodes) {
            self.alert_save_failure(err);
        }
    }

    /// Saves the outgoing layout, then makes `id` active.
    pub fn switch_layout(&mut self, id: &LayoutId) -> Result<(), EditorError> {
        if self.data.layout(id).is_none() {
            return Err(EditorError::LayoutNotFound(id.clone()));
        }
        if id == &self.data.active_layout_id {
            return Ok(());
        }
        self.save_outgoing();
        self.activate(id);
        Ok(())
    }

    /// Saves the outgoing layout, then creates and activates an empty one.
    pub fn create_layout(&mut self, name: impl Into<String>) -> Result<LayoutId, EditorError> {
        let name = normalize_layout_name(name.into())?;
        self.save_outgoing();
        let id = LayoutId::generate();
        self.data.layouts.push(Layout::empty(id.clone(), name));
        self.activate(&id);
        Ok(id)
    }

    pub fn rename_layout(
        &mut self,
        id: &LayoutId,
        name: impl Into<String>,
    ) -> Result<(), EditorError> {
        let name = normalize_layout_name(name.into())?;
        let layout = self
            .data
            .layout_mut(id)
            .ok_or_else(|| EditorError::LayoutNotFound(id.clone()))?;
        layout.name = name;
        self.persistence.mark_changed(self.clock.now());
        info!("event=rename_layout module=editor status=ok layout_id={}", id);
        Ok(())
    }

    /// Clears persisted state and restores the built-in layouts.
    pub fn reset_all(&mut self) {
        match self.persistence.reset() {
            Ok(loaded) => {
                self.data = loaded.data;
                self.nodes = loaded.active_nodes;
                self.clear_transient_state();
                self.viewport.reset();
                info!("event=reset_all module=editor status=ok");
            }
            Err(err) => self.alert_save_failure(err),
        }
    }

    fn commit(&mut self, next: Vec<Node>, event: &'static str) -> bool {
        if next == self.nodes {
            debug!("event={} module=editor status=noop", event);
            return false;
        }
        self.nodes = next;
        self.persistence.mark_changed(self.clock.now());
        debug!(
            "event={} module=editor status=ok nodes={}",
            event,
            self.nodes.len()
        );
        true
    }

    fn save_outgoing(&mut self) {
        self.data = self.data.merged(&self.nodes);
        if let Err(err) = self
            .persistence
            .save_now(&self.data, &self.nodes, SaveTrigger::LayoutChange)
        {
            self.alert_save_failure(err);
        }
    }

    fn activate(&mut self, id: &LayoutId) {
        self.data.active_layout_id = id.clone();
        self.nodes = self
            .data
            .active_layout()
            .map(|layout| layout.nodes.clone())
            .unwrap_or_default();
        self.clear_transient_state();
        // Persist the new active id through the normal debounce.
        self.persistence.mark_changed(self.clock.now());
        info!(
            "event=switch_layout module=editor status=ok layout_id={} nodes={}",
            id,
            self.nodes.len()
        );
    }

    fn clear_transient_state(&mut self) {
        self.selected = None;
        self.delete_confirm.clear();
        self.drag.cancel();
        self.gesture.pointer_up();
    }

    fn alert_save_failure(&mut self, err: PersistError) {
        warn!("event=alert module=editor status=error error={}", err);
        self.alerts.push_back(format!("保存失败: {err}"));
    }
}

fn normalize_layout_name(value: String) -> Result<String, EditorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EditorError::InvalidLayoutName);
    }
    Ok(trimmed.to_string())
}
