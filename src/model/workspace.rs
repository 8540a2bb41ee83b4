//! Workspace state: which projects are on the canvas and where their blocks
//! sit.
//!
//! All transitions are pure: they take `&Arc<Self>` and hand back either a new
//! state or the identical `Arc` when nothing changed. Callers detect "nothing
//! happened" with `Arc::ptr_eq`, which keeps pointer-move-driven updates from
//! triggering re-renders.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::collections::HashMap;
use crate::geometry::Rect;
use crate::model::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self { Self(id.to_string()) }
}

/// Which of a project's two blocks is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    List,
    Details,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::List => "list",
            BlockKind::Details => "details",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub project: ProjectId,
    pub kind: BlockKind,
}

impl BlockId {
    pub fn list(project: ProjectId) -> Self {
        Self {
            project,
            kind: BlockKind::List,
        }
    }

    pub fn details(project: ProjectId) -> Self {
        Self {
            project,
            kind: BlockKind::Details,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.kind.as_str())
    }
}

/// Geometry plus stacking order for one block. Higher `z` draws on top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockLayout {
    pub rect: Rect,
    pub z: u64,
}

impl BlockLayout {
    pub fn new(rect: Rect, z: u64) -> Self { Self { rect, z } }
}

/// One project instance on the canvas: its pair of blocks plus selection and
/// focus state. `project_id` is immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceItem {
    pub project_id: ProjectId,
    pub project_name: String,
    pub list_layout: BlockLayout,
    pub details_layout: BlockLayout,
    /// Drives details-block visibility: hidden while `None`.
    pub selected_todo_id: Option<TaskId>,
    /// At most one of the pair is focused at a time.
    pub focused: Option<BlockKind>,
}

impl WorkspaceItem {
    pub fn layout(&self, kind: BlockKind) -> BlockLayout {
        match kind {
            BlockKind::List => self.list_layout,
            BlockKind::Details => self.details_layout,
        }
    }

    pub fn details_visible(&self) -> bool { self.selected_todo_id.is_some() }
}

/// Field-wise update for a [`WorkspaceItem`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceItemPatch {
    pub project_name: Option<String>,
    pub list_layout: Option<BlockLayout>,
    pub details_layout: Option<BlockLayout>,
    pub selected_todo_id: Option<Option<TaskId>>,
    pub focused: Option<Option<BlockKind>>,
}

impl WorkspaceItemPatch {
    fn apply(&self, item: &WorkspaceItem) -> WorkspaceItem {
        let mut next = item.clone();
        if let Some(name) = &self.project_name {
            next.project_name = name.clone();
        }
        if let Some(layout) = self.list_layout {
            next.list_layout = layout;
        }
        if let Some(layout) = self.details_layout {
            next.details_layout = layout;
        }
        if let Some(selected) = &self.selected_todo_id {
            next.selected_todo_id = selected.clone();
        }
        if let Some(focused) = self.focused {
            next.focused = focused;
        }
        next
    }
}

/// The full canvas state. `order` is insertion order (tab order), independent
/// of stacking: z lives on each layout.
///
/// Invariant: `order` and `items` key the same set of projects, with no
/// duplicates in `order`.
#[derive(Debug, Default, PartialEq)]
pub struct WorkspaceState {
    items: HashMap<ProjectId, WorkspaceItem>,
    order: Vec<ProjectId>,
}

impl WorkspaceState {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn contains(&self, id: &ProjectId) -> bool { self.items.contains_key(id) }

    pub fn get(&self, id: &ProjectId) -> Option<&WorkspaceItem> { self.items.get(id) }

    pub fn order(&self) -> &[ProjectId] { &self.order }

    /// Items in insertion order.
    pub fn items_ordered(&self) -> impl Iterator<Item = &WorkspaceItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Every block layout on the canvas, hidden details blocks included.
    pub fn layouts(&self) -> impl Iterator<Item = (BlockId, BlockLayout)> + '_ {
        self.items_ordered().flat_map(|item| {
            [
                (BlockId::list(item.project_id.clone()), item.list_layout),
                (BlockId::details(item.project_id.clone()), item.details_layout),
            ]
        })
    }

    /// Insert `item`, appending its id to the order only if absent. Re-adding
    /// an existing project replaces the item without disturbing order; the
    /// caller is expected to have applied its de-duplication policy first.
    pub fn add_item(self: &Arc<Self>, item: WorkspaceItem) -> Arc<Self> {
        if self.items.get(&item.project_id) == Some(&item) {
            return Arc::clone(self);
        }

        let mut items = self.items.clone();
        let mut order = self.order.clone();
        if !order.contains(&item.project_id) {
            order.push(item.project_id.clone());
        }
        debug!("adding workspace item for project {}", item.project_id);
        items.insert(item.project_id.clone(), item);
        Arc::new(Self { items, order })
    }

    /// Merge `patch` into the item for `id`. Unknown ids and no-op patches
    /// both return the identical `Arc`.
    pub fn update_item(self: &Arc<Self>, id: &ProjectId, patch: WorkspaceItemPatch) -> Arc<Self> {
        let Some(item) = self.items.get(id) else {
            return Arc::clone(self);
        };

        let next = patch.apply(item);
        if next == *item {
            return Arc::clone(self);
        }

        let mut items = self.items.clone();
        items.insert(id.clone(), next);
        Arc::new(Self {
            items,
            order: self.order.clone(),
        })
    }

    /// Remove the item for `id`. Unknown ids return the identical `Arc`.
    pub fn remove_item(self: &Arc<Self>, id: &ProjectId) -> Arc<Self> {
        if !self.items.contains_key(id) {
            return Arc::clone(self);
        }

        let mut items = self.items.clone();
        items.remove(id);
        let order = self.order.iter().filter(|p| *p != id).cloned().collect();
        debug!("removed workspace item for project {id}");
        Arc::new(Self { items, order })
    }
}
