//! Focus mode: a transient enlarged, centered state for one block.
//!
//! Entering focus remembers the block's exact layout (z included) so leaving
//! focus restores it verbatim; only z is re-assigned so the block stays on
//! top of its siblings.

use crate::common::collections::HashMap;
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, Size, clamp_dim, clamp_pos};
use crate::model::workspace::{BlockId, BlockLayout, ProjectId};

/// The enlarged rectangle for a block entering focus: grown to at least the
/// focus minimum, capped to the padded container, centered.
pub fn focused_rect(current: Rect, container: Option<Size>, settings: &LayoutSettings) -> Rect {
    let container = container.unwrap_or(settings.fallback_viewport);
    let pad = settings.padding;

    let width = clamp_dim(
        current.width.max(settings.focus_min.width),
        settings.details_floor.width,
        container.width - 2.0 * pad,
    );
    let height = clamp_dim(
        current.height.max(settings.focus_min.height),
        settings.details_floor.height,
        container.height - 2.0 * pad,
    );
    let x = clamp_pos((container.width - width) / 2.0, pad, container.width - pad - width);
    let y = clamp_pos((container.height - height) / 2.0, pad, container.height - pad - height);
    Rect::new(x, y, width, height)
}

/// Pre-focus layouts, keyed by block. Owned by the engine — deliberately not
/// module state, so engines stay independently instantiable and testable.
#[derive(Debug, Default)]
pub struct FocusMemory {
    remembered: HashMap<BlockId, BlockLayout>,
}

impl FocusMemory {
    pub fn new() -> Self { Self::default() }

    pub fn remember(&mut self, id: BlockId, layout: BlockLayout) {
        self.remembered.insert(id, layout);
    }

    pub fn take(&mut self, id: &BlockId) -> Option<BlockLayout> { self.remembered.remove(id) }

    pub fn contains(&self, id: &BlockId) -> bool { self.remembered.contains_key(id) }

    /// Whether any block anywhere is currently focused. Layout persistence
    /// checks this: focus geometry must never become the saved baseline.
    pub fn any_focused(&self) -> bool { !self.remembered.is_empty() }

    pub fn forget_project(&mut self, project: &ProjectId) {
        self.remembered.retain(|id, _| id.project != *project);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::workspace::BlockKind;

    fn settings() -> LayoutSettings { LayoutSettings::default() }

    #[test]
    fn test_focused_rect_grows_to_minimum() {
        let current = Rect::new(48.0, 48.0, 420.0, 520.0);
        let rect = focused_rect(current, Some(Size::new(1440.0, 900.0)), &settings());

        assert_eq!(rect.width, 520.0);
        assert_eq!(rect.height, 580.0);
        // centered
        assert_eq!(rect.x, (1440.0 - 520.0) / 2.0);
        assert_eq!(rect.y, (900.0 - 580.0) / 2.0);
    }

    #[test]
    fn test_focused_rect_keeps_larger_size() {
        let current = Rect::new(0.0, 0.0, 800.0, 700.0);
        let rect = focused_rect(current, Some(Size::new(1440.0, 900.0)), &settings());
        assert_eq!(rect.width, 800.0);
        assert_eq!(rect.height, 700.0);
    }

    #[test]
    fn test_focused_rect_caps_to_padded_container() {
        let current = Rect::new(0.0, 0.0, 420.0, 520.0);
        let rect = focused_rect(current, Some(Size::new(500.0, 600.0)), &settings());

        assert_eq!(rect.width, 500.0 - 64.0);
        assert_eq!(rect.height, 580.0_f64.min(600.0 - 64.0));
        assert_eq!(rect.x, 32.0);
        assert_eq!(rect.y, 32.0);
    }

    #[test]
    fn test_focused_rect_degenerate_container() {
        let rect = focused_rect(Rect::new(0.0, 0.0, 400.0, 400.0), Some(Size::new(0.0, 0.0)), &settings());
        assert_eq!(rect.width, 240.0);
        assert_eq!(rect.height, 320.0);
        assert_eq!(rect.x, 32.0);
        assert_eq!(rect.y, 32.0);
    }

    #[test]
    fn test_memory_remember_take() {
        let mut memory = FocusMemory::new();
        let id = BlockId::list(ProjectId::from("a"));
        let layout = BlockLayout::new(Rect::new(1.0, 2.0, 300.0, 400.0), 7);

        assert!(!memory.any_focused());
        memory.remember(id.clone(), layout);
        assert!(memory.contains(&id));
        assert!(memory.any_focused());

        assert_eq!(memory.take(&id), Some(layout));
        assert!(memory.take(&id).is_none());
        assert!(!memory.any_focused());
    }

    #[test]
    fn test_forget_project_drops_both_blocks() {
        let mut memory = FocusMemory::new();
        let layout = BlockLayout::new(Rect::new(0.0, 0.0, 100.0, 100.0), 1);
        memory.remember(BlockId::list(ProjectId::from("a")), layout);
        memory.remember(
            BlockId {
                project: ProjectId::from("a"),
                kind: BlockKind::Details,
            },
            layout,
        );
        memory.remember(BlockId::list(ProjectId::from("b")), layout);

        memory.forget_project(&ProjectId::from("a"));
        assert!(!memory.contains(&BlockId::list(ProjectId::from("a"))));
        assert!(memory.contains(&BlockId::list(ProjectId::from("b"))));
    }
}
