use crate::domain::entities::row::{Record, Row, RowControl};
use crate::usecase::grid::history::Reversible;
use crate::usecase::grid::tracker::ChangeTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrigin {
    Added,
    Duplicated,
}

/// One reversible grid action. Each variant carries both sides of the change
/// so that undo restores the exact prior dirty state.
#[derive(Debug, Clone, PartialEq)]
pub enum RowCommand<R> {
    EditCell {
        row_idx: usize,
        binding: String,
        previous: Option<String>,
        next: Option<String>,
        was_selected: bool,
    },
    InsertRow {
        row_idx: usize,
        row: Row<R>,
        origin: InsertOrigin,
    },
    ToggleDelete {
        row_idx: usize,
        before: RowControl,
        after: RowControl,
    },
    DiscardRow {
        row_idx: usize,
        row: Row<R>,
    },
}

impl<R> RowCommand<R> {
    pub fn label(&self) -> &'static str {
        match self {
            RowCommand::EditCell { .. } => "edit cell",
            RowCommand::InsertRow {
                origin: InsertOrigin::Added,
                ..
            } => "add row",
            RowCommand::InsertRow {
                origin: InsertOrigin::Duplicated,
                ..
            } => "duplicate row",
            RowCommand::ToggleDelete { .. } => "toggle delete",
            RowCommand::DiscardRow { .. } => "discard row",
        }
    }
}

impl<R: Record> Reversible<ChangeTracker<R>> for RowCommand<R> {
    fn apply(&self, tracker: &mut ChangeTracker<R>) {
        match self {
            RowCommand::EditCell {
                row_idx,
                binding,
                next,
                ..
            } => {
                tracker.write_cell(*row_idx, binding, next.clone());
                if let Err(err) = tracker.mark_dirty(*row_idx) {
                    log::warn!("edit of row {row_idx} not marked dirty: {err}");
                }
            }
            RowCommand::InsertRow { row_idx, row, .. } => tracker.insert_row(*row_idx, row.clone()),
            RowCommand::ToggleDelete { row_idx, after, .. } => tracker.set_control(*row_idx, *after),
            RowCommand::DiscardRow { row_idx, .. } => {
                if let Err(err) = tracker.discard(*row_idx) {
                    log::warn!("discard of row {row_idx} ignored: {err}");
                }
            }
        }
    }

    fn revert(&self, tracker: &mut ChangeTracker<R>) {
        match self {
            RowCommand::EditCell {
                row_idx,
                binding,
                previous,
                was_selected,
                ..
            } => {
                tracker.write_cell(*row_idx, binding, previous.clone());
                tracker.set_dirty(*row_idx, *was_selected);
            }
            RowCommand::InsertRow { row_idx, .. } => {
                tracker.remove_row(*row_idx);
            }
            RowCommand::ToggleDelete {
                row_idx, before, ..
            } => tracker.set_control(*row_idx, *before),
            RowCommand::DiscardRow { row_idx, row } => tracker.insert_row(*row_idx, row.clone()),
        }
    }
}
