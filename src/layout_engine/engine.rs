//! The workspace engine: owns the canvas state and translates interaction
//! events into layout transitions.
//!
//! Everything here runs to completion on the caller's event thread. The only
//! side effect is the fire-and-forget mirror of committed geometry into the
//! layout store; a store failure is logged and never reaches the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, Size, clamp_pos};
use crate::layout_engine::focus::{FocusMemory, focused_rect};
use crate::layout_engine::placement::place_details_block;
use crate::layout_engine::stacking::{ZCounter, is_topmost};
use crate::model::task::{Task, TaskId, selection_valid};
use crate::model::workspace::{
    BlockId, BlockKind, BlockLayout, ProjectId, WorkspaceItem, WorkspaceItemPatch, WorkspaceState,
};
use crate::persistence::{self, LayoutStore, StoredBlock};

/// Interaction events, as the presentation layer reports them. Pointer-move
/// streams stay on the host side; the engine only sees committed end states.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    ProjectOpened { project: ProjectId, name: String },
    ProjectClosed(ProjectId),
    DragStop { block: BlockId, x: f64, y: f64 },
    ResizeStop { block: BlockId, rect: Rect },
    FocusToggled(BlockId),
    Raised(BlockId),
    TodoSelected { project: ProjectId, todo: Option<TaskId> },
    TasksChanged { project: ProjectId, tasks: Vec<Task> },
    ContainerResized(Size),
}

pub struct WorkspaceEngine {
    state: Arc<WorkspaceState>,
    focus: FocusMemory,
    z: ZCounter,
    settings: LayoutSettings,
    container: Option<Size>,
    store: Option<Box<dyn LayoutStore>>,
}

impl WorkspaceEngine {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            state: WorkspaceState::new(),
            focus: FocusMemory::new(),
            z: ZCounter::new(),
            settings,
            container: None,
            store: None,
        }
    }

    pub fn with_store(settings: LayoutSettings, store: Box<dyn LayoutStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(settings)
        }
    }

    pub fn state(&self) -> &Arc<WorkspaceState> { &self.state }

    pub fn settings(&self) -> &LayoutSettings { &self.settings }

    pub fn container(&self) -> Option<Size> { self.container }

    pub fn layout(&self, block: &BlockId) -> Option<BlockLayout> {
        self.state.get(&block.project).map(|item| item.layout(block.kind))
    }

    pub fn focused_block(&self, project: &ProjectId) -> Option<BlockKind> {
        self.state.get(project).and_then(|item| item.focused)
    }

    pub fn selected_todo(&self, project: &ProjectId) -> Option<&TaskId> {
        self.state.get(project).and_then(|item| item.selected_todo_id.as_ref())
    }

    pub fn handle_event(&mut self, event: WorkspaceEvent) {
        match event {
            WorkspaceEvent::ProjectOpened { project, name } => self.open_project(project, &name),
            WorkspaceEvent::ProjectClosed(project) => self.close_project(&project),
            WorkspaceEvent::DragStop { block, x, y } => self.drag_stop(&block, x, y),
            WorkspaceEvent::ResizeStop { block, rect } => self.resize_stop(&block, rect),
            WorkspaceEvent::FocusToggled(block) => self.toggle_focus(&block),
            WorkspaceEvent::Raised(block) => self.raise(&block),
            WorkspaceEvent::TodoSelected { project, todo } => self.select_todo(&project, todo),
            WorkspaceEvent::TasksChanged { project, tasks } => self.sync_tasks(&project, &tasks),
            WorkspaceEvent::ContainerResized(size) => self.container_resized(size),
        }
    }

    /// Put a project on the canvas. Re-opening an already open project never
    /// duplicates it: the existing instance is raised and pulled back into
    /// view instead.
    pub fn open_project(&mut self, project: ProjectId, name: &str) {
        if self.state.contains(&project) {
            debug!("project {project} already on canvas, revealing");
            self.reveal(&project);
            return;
        }

        let (list_layout, details_layout) = self.initial_layouts(&project);
        let item = WorkspaceItem {
            project_id: project.clone(),
            project_name: name.to_string(),
            list_layout,
            details_layout,
            selected_todo_id: None,
            focused: None,
        };
        self.state = self.state.add_item(item);
        debug!("opened project {project}");
        self.persist();
    }

    pub fn close_project(&mut self, project: &ProjectId) {
        let next = self.state.remove_item(project);
        if Arc::ptr_eq(&self.state, &next) {
            return;
        }
        self.state = next;
        self.focus.forget_project(project);
        self.persist();
    }

    /// Commit the final position of a drag.
    pub fn drag_stop(&mut self, block: &BlockId, x: f64, y: f64) {
        let Some(item) = self.state.get(&block.project) else {
            return;
        };
        let mut layout = item.layout(block.kind);
        layout.rect = layout.rect.at(x, y);
        layout.z = self.bump_z();
        self.update(&block.project, layout_patch(block.kind, layout));
        self.persist();
    }

    /// Commit the final geometry of a resize, floored at the block's minimum.
    pub fn resize_stop(&mut self, block: &BlockId, rect: Rect) {
        let Some(item) = self.state.get(&block.project) else {
            return;
        };
        let min = match block.kind {
            BlockKind::List => self.settings.list_min,
            BlockKind::Details => self.settings.details_min,
        };
        let mut layout = item.layout(block.kind);
        layout.rect = Rect::new(rect.x, rect.y, rect.width.max(min.width), rect.height.max(min.height));
        layout.z = self.bump_z();
        self.update(&block.project, layout_patch(block.kind, layout));
        self.persist();
    }

    /// Enter or leave focus mode for `block`. At most one block per item is
    /// focused; focusing the sibling of a focused block restores that block
    /// first.
    pub fn toggle_focus(&mut self, block: &BlockId) {
        let Some(item) = self.state.get(&block.project) else {
            return;
        };
        match item.focused {
            Some(kind) if kind == block.kind => self.exit_focus(block),
            Some(kind) => {
                self.exit_focus(&BlockId {
                    project: block.project.clone(),
                    kind,
                });
                self.enter_focus(block);
            }
            None => self.enter_focus(block),
        }
    }

    /// Bring `block` to the top of the stack. No-op (the state reference is
    /// untouched) when it is already strictly topmost.
    pub fn raise(&mut self, block: &BlockId) {
        let Some(item) = self.state.get(&block.project) else {
            return;
        };
        let mut layout = item.layout(block.kind);
        let others: Vec<BlockLayout> = self
            .state
            .layouts()
            .filter(|(id, _)| id != block)
            .map(|(_, layout)| layout)
            .collect();
        if is_topmost(&layout, others.iter()) {
            return;
        }
        layout.z = self.bump_z();
        self.update(&block.project, layout_patch(block.kind, layout));
        self.persist();
    }

    /// Change which task the details block shows. Selecting a task while the
    /// details block is hidden re-places it and brings it to the top;
    /// clearing the selection hides it (leaving focus first if needed).
    pub fn select_todo(&mut self, project: &ProjectId, todo: Option<TaskId>) {
        let Some(item) = self.state.get(project) else {
            return;
        };
        if item.selected_todo_id == todo {
            return;
        }
        if todo.is_none() && item.focused == Some(BlockKind::Details) {
            self.exit_focus(&BlockId::details(project.clone()));
        }

        // re-read: exit_focus above may have replaced the state
        let Some(item) = self.state.get(project) else {
            return;
        };
        let appearing = todo.is_some() && !item.details_visible();
        let mut patch = WorkspaceItemPatch {
            selected_todo_id: Some(todo),
            ..Default::default()
        };
        if appearing {
            let mut layout = item.details_layout;
            layout.rect = place_details_block(
                item.list_layout.rect,
                Some(layout.rect),
                self.container,
                &self.settings,
            );
            layout.z = self.bump_z();
            patch.details_layout = Some(layout);
        }
        self.update(project, patch);
        self.persist();
    }

    /// Reconcile with the host's task list: a selection pointing at a task
    /// that is gone or done is cleared, which also hides the details block.
    pub fn sync_tasks(&mut self, project: &ProjectId, tasks: &[Task]) {
        let Some(item) = self.state.get(project) else {
            return;
        };
        if let Some(selected) = &item.selected_todo_id {
            if !selection_valid(tasks, selected) {
                debug!("selected task {selected} is gone or done, clearing selection");
                self.select_todo(project, None);
            }
        }
    }

    /// The host measured (or re-measured) the canvas. Every visible details
    /// block is re-placed against the new bounds; idempotent for equal input.
    pub fn container_resized(&mut self, size: Size) {
        self.container = Some(size);
        let projects: Vec<ProjectId> =
            self.state.items_ordered().map(|item| item.project_id.clone()).collect();
        for project in projects {
            let Some(item) = self.state.get(&project) else {
                continue;
            };
            if !item.details_visible() || item.focused == Some(BlockKind::Details) {
                continue;
            }
            let placed = place_details_block(
                item.list_layout.rect,
                Some(item.details_layout.rect),
                Some(size),
                &self.settings,
            );
            if placed != item.details_layout.rect {
                let layout = BlockLayout::new(placed, item.details_layout.z);
                self.update(&project, layout_patch(BlockKind::Details, layout));
            }
        }
        self.persist();
    }

    fn enter_focus(&mut self, block: &BlockId) {
        let Some(item) = self.state.get(&block.project) else {
            return;
        };
        let current = item.layout(block.kind);
        self.focus.remember(block.clone(), current);

        let rect = focused_rect(current.rect, self.container, &self.settings);
        let layout = BlockLayout::new(rect, self.bump_z());
        let patch = WorkspaceItemPatch {
            focused: Some(Some(block.kind)),
            ..layout_patch(block.kind, layout)
        };
        self.update(&block.project, patch);
    }

    fn exit_focus(&mut self, block: &BlockId) {
        let Some(item) = self.state.get(&block.project) else {
            return;
        };
        let rect = match self.focus.take(block) {
            Some(previous) => previous.rect,
            None => {
                warn!("no remembered layout for {block}, keeping its current geometry");
                item.layout(block.kind).rect
            }
        };
        let layout = BlockLayout::new(rect, self.bump_z());
        let patch = WorkspaceItemPatch {
            focused: Some(None),
            ..layout_patch(block.kind, layout)
        };
        self.update(&block.project, patch);
        self.persist();
    }

    /// Raise both blocks of an existing instance and clamp its list block
    /// back inside the canvas.
    fn reveal(&mut self, project: &ProjectId) {
        let Some(item) = self.state.get(project) else {
            return;
        };
        let container = self.container.unwrap_or(self.settings.fallback_viewport);
        let pad = self.settings.padding;

        let details_visible = item.details_visible();
        let mut list = item.list_layout;
        list.rect.x = clamp_pos(list.rect.x, pad, container.width - pad - list.rect.width);
        list.rect.y = clamp_pos(list.rect.y, pad, container.height - pad - list.rect.height);
        list.z = self.bump_z();
        self.update(project, layout_patch(BlockKind::List, list));

        if details_visible {
            if let Some(item) = self.state.get(project) {
                let mut details = item.details_layout;
                details.z = self.bump_z();
                self.update(project, layout_patch(BlockKind::Details, details));
            }
        }
        self.persist();
    }

    /// Default geometry for a newly opened project: the list block cascades
    /// from the canvas corner, the details block is placed beside it, and
    /// stored geometry from an earlier session overrides both.
    fn initial_layouts(&mut self, project: &ProjectId) -> (BlockLayout, BlockLayout) {
        let container = self.container.unwrap_or(self.settings.fallback_viewport);
        let pad = self.settings.padding;
        let step = self.settings.cascade_step;
        let size = self.settings.list_default;
        let index = self.state.len() as f64;

        let span_x = (container.width - 2.0 * pad - size.width).max(1.0);
        let span_y = (container.height - 2.0 * pad - size.height).max(1.0);
        let list_rect = Rect::new(
            pad + (step * index) % span_x,
            pad + (step * index) % span_y,
            size.width,
            size.height,
        );
        let details_rect = place_details_block(list_rect, None, self.container, &self.settings);

        // two bumps: the details block starts directly above its list block
        let mut list = BlockLayout::new(list_rect, self.bump_z());
        let mut details = BlockLayout::new(details_rect, self.bump_z());

        if let Some(store) = self.store.as_deref() {
            let saved = persistence::load_layouts(store);
            if !saved.is_empty() {
                list = self.restored(
                    saved.block(&BlockId::list(project.clone()), StoredBlock::from(list)),
                    self.settings.list_min,
                );
                details = self.restored(
                    saved.block(&BlockId::details(project.clone()), StoredBlock::from(details)),
                    self.settings.details_min,
                );
            }
        }
        (list, details)
    }

    fn restored(&mut self, stored: StoredBlock, min: Size) -> BlockLayout {
        self.z.observe(stored.z);
        BlockLayout::new(
            Rect::new(
                stored.x,
                stored.y,
                stored.width.max(min.width),
                stored.height.max(min.height),
            ),
            stored.z,
        )
    }

    fn all_layouts(&self) -> Vec<BlockLayout> {
        self.state.layouts().map(|(_, layout)| layout).collect()
    }

    fn bump_z(&mut self) -> u64 {
        let all = self.all_layouts();
        self.z.bump(all.iter())
    }

    fn update(&mut self, project: &ProjectId, patch: WorkspaceItemPatch) -> bool {
        let next = self.state.update_item(project, patch);
        let changed = !Arc::ptr_eq(&self.state, &next);
        self.state = next;
        changed
    }

    /// Mirror committed geometry to the store. Skipped entirely while any
    /// block is focused so exaggerated focus geometry never becomes the
    /// saved baseline; the next non-focused mutation writes again.
    fn persist(&mut self) {
        if !self.settings.persist_layouts || self.store.is_none() {
            return;
        }
        if self.focus.any_focused() {
            debug!("not saving layouts while a block is focused");
            return;
        }
        let layouts: Vec<(BlockId, BlockLayout)> = self.state.layouts().collect();
        let Some(store) = self.store.as_deref_mut() else {
            return;
        };
        if let Err(err) = persistence::save_layouts(store, layouts) {
            warn!("layout save failed: {err}");
        }
    }
}

fn layout_patch(kind: BlockKind, layout: BlockLayout) -> WorkspaceItemPatch {
    match kind {
        BlockKind::List => WorkspaceItemPatch {
            list_layout: Some(layout),
            ..Default::default()
        },
        BlockKind::Details => WorkspaceItemPatch {
            details_layout: Some(layout),
            ..Default::default()
        },
    }
}
