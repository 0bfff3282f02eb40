use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::GridConfig;
use crate::domain::entities::column::ColumnDef;
use crate::domain::entities::edit::{CellEdit, CellKey, ChangeBatch, GridEvent};
use crate::domain::entities::filter::ColumnFilter;
use crate::domain::entities::row::{Record, Row, RowControl, Stored, UnknownBinding};
use crate::domain::validation::{FieldError, Validator};
use crate::infra::export::xlsx::write_table;
use crate::usecase::grid::command::{InsertOrigin, RowCommand};
use crate::usecase::grid::history::{CommandStack, Reversible};
use crate::usecase::grid::tracker::ChangeTracker;
use crate::usecase::grid::GridError;

type Observer = Box<dyn FnMut(&GridEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAction {
    Undo,
    Redo,
    ExportXlsx,
    AddRow,
    RemoveRow,
    ClearFilter,
    CopyRow,
}

impl GridAction {
    /// Ctrl+Z / Ctrl+Y / Ctrl+S / Ctrl+Insert / Ctrl+Delete / Ctrl+L / Ctrl+D.
    pub fn from_shortcut(key: &str, ctrl: bool) -> Option<Self> {
        if !ctrl {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "z" => Some(GridAction::Undo),
            "y" => Some(GridAction::Redo),
            "s" => Some(GridAction::ExportXlsx),
            "insert" => Some(GridAction::AddRow),
            "delete" => Some(GridAction::RemoveRow),
            "l" => Some(GridAction::ClearFilter),
            "d" => Some(GridAction::CopyRow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Nothing,
    /// The host has to pick a destination and call [`GridController::export_xlsx`].
    ExportRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    MarkedForDeletion,
    Restored,
    Discarded,
}

/// State of one editable grid: the tracked collection, its undo history and
/// the observers of the host surface. Built when the grid mounts and dropped
/// with it.
pub struct GridController<R: Record> {
    columns: Vec<ColumnDef<R>>,
    tracker: ChangeTracker<R>,
    history: CommandStack<RowCommand<R>>,
    current: Option<usize>,
    observers: Vec<Observer>,
    update_depth: usize,
    collection_touched: bool,
    export_file_name: String,
}

impl<R: Record> GridController<R> {
    pub fn new(columns: Vec<ColumnDef<R>>, config: &GridConfig) -> Self {
        Self {
            columns,
            tracker: ChangeTracker::new(),
            history: CommandStack::with_capacity(config.history_capacity),
            current: None,
            observers: Vec::new(),
            update_depth: 0,
            collection_touched: false,
            export_file_name: config.export_file_name.clone(),
        }
    }

    /// Observers live as long as the grid.
    pub fn subscribe(&mut self, observer: impl FnMut(&GridEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: GridEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }

    /// Holds back collection notifications until the matching `end_update`.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    pub fn end_update(&mut self) {
        self.update_depth = self.update_depth.saturating_sub(1);
        if self.update_depth == 0 && self.collection_touched {
            self.collection_touched = false;
            self.emit(GridEvent::CollectionChanged);
        }
    }

    pub fn deferred<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_update();
        let out = f(self);
        self.end_update();
        out
    }

    fn touch_collection(&mut self) {
        self.collection_touched = true;
    }

    /// Replaces the collection after a backend read. Dirty flags, history and
    /// focus all start over.
    pub fn load(&mut self, stored: Vec<Stored<R>>) {
        self.tracker.load(stored);
        self.history.clear();
        self.current = None;
        let rows = self.tracker.len();
        log::info!("grid loaded with {rows} rows");
        self.emit(GridEvent::Loaded { rows });
    }

    pub fn columns(&self) -> &[ColumnDef<R>] {
        &self.columns
    }

    pub fn tracker(&self) -> &ChangeTracker<R> {
        &self.tracker
    }

    pub fn rows(&self) -> &[Row<R>] {
        self.tracker.current_rows()
    }

    pub fn visible(&self) -> Vec<(usize, &Row<R>)> {
        self.tracker.visible()
    }

    pub fn change_set(&self) -> Vec<&Row<R>> {
        self.tracker.change_set()
    }

    pub fn has_changes(&self) -> bool {
        self.tracker.has_changes()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn set_current(&mut self, row_idx: usize) -> Result<(), GridError> {
        if self.tracker.row(row_idx).is_none() {
            return Err(GridError::RowOutOfRange(row_idx));
        }
        self.current = Some(row_idx);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn ensure_column(&self, binding: &str) -> Result<(), GridError> {
        if self.columns.iter().any(|column| column.binding == binding) {
            Ok(())
        } else {
            Err(UnknownBinding(binding.to_string()).into())
        }
    }

    fn record(&mut self, command: RowCommand<R>) {
        command.apply(&mut self.tracker);
        self.history.push(command);
    }

    /// Cell-edit-ended: writes the value and always marks the row dirty.
    pub fn edit_cell(
        &mut self,
        row_idx: usize,
        binding: &str,
        value: Option<String>,
    ) -> Result<(), GridError> {
        self.ensure_column(binding)?;
        let row = self
            .tracker
            .row(row_idx)
            .ok_or(GridError::RowOutOfRange(row_idx))?;
        let previous = row.domain.field(binding);
        let was_selected = row.control.is_selected;

        // Compare what the record would actually hold, e.g. `None` on a
        // required text field reads back as `Some("")`.
        let mut normalized = row.domain.clone();
        normalized.set_field(binding, value)?;
        let value = normalized.field(binding);

        if previous != value || !was_selected {
            self.record(RowCommand::EditCell {
                row_idx,
                binding: binding.to_string(),
                previous: previous.clone(),
                next: value,
                was_selected,
            });
        }
        self.current = Some(row_idx);

        let next = self
            .tracker
            .row(row_idx)
            .and_then(|row| row.domain.field(binding));
        self.emit(GridEvent::CellEditEnded(CellEdit {
            key: CellKey {
                row_idx,
                binding: binding.to_string(),
            },
            previous,
            next,
        }));
        Ok(())
    }

    /// Appends an empty unsaved row and focuses it.
    pub fn add_row(&mut self) -> usize {
        self.deferred(|grid| {
            let row_idx = grid.tracker.len();
            grid.record(RowCommand::InsertRow {
                row_idx,
                row: Row::pending(R::default()),
                origin: InsertOrigin::Added,
            });
            grid.current = Some(row_idx);
            grid.touch_collection();
            row_idx
        })
    }

    /// Persisted rows toggle their delete flag and the dirty flag follows it;
    /// unsaved rows are dropped.
    pub fn remove_row(&mut self, row_idx: usize) -> Result<RemoveOutcome, GridError> {
        let row = self
            .tracker
            .row(row_idx)
            .ok_or(GridError::RowOutOfRange(row_idx))?
            .clone();

        let (command, outcome) = match row.id() {
            Some(_) => {
                let before = row.control;
                let is_delete = !before.is_delete;
                let after = RowControl {
                    is_delete,
                    is_selected: is_delete,
                    ..before
                };
                let outcome = if is_delete {
                    RemoveOutcome::MarkedForDeletion
                } else {
                    RemoveOutcome::Restored
                };
                (
                    RowCommand::ToggleDelete {
                        row_idx,
                        before,
                        after,
                    },
                    outcome,
                )
            }
            None => (RowCommand::DiscardRow { row_idx, row }, RemoveOutcome::Discarded),
        };

        self.deferred(|grid| {
            grid.record(command);
            if outcome == RemoveOutcome::Discarded {
                grid.current = match grid.current {
                    Some(current) if current > row_idx => Some(current - 1),
                    Some(current) if current == row_idx => None,
                    other => other,
                };
            }
            grid.touch_collection();
        });
        Ok(outcome)
    }

    /// Copies the focused row's fields, without its id, into a new unsaved row
    /// at the end of the collection.
    pub fn copy_row(&mut self, row_idx: usize) -> Result<usize, GridError> {
        let source = self
            .tracker
            .row(row_idx)
            .ok_or(GridError::RowOutOfRange(row_idx))?
            .domain
            .clone();

        Ok(self.deferred(|grid| {
            let new_idx = grid.tracker.len();
            grid.record(RowCommand::InsertRow {
                row_idx: new_idx,
                row: Row::pending(source),
                origin: InsertOrigin::Duplicated,
            });
            grid.current = Some(new_idx);
            grid.touch_collection();
            new_idx
        }))
    }

    pub fn set_filter(&mut self, binding: &str, term: &str) -> Result<(), GridError> {
        self.ensure_column(binding)?;
        self.tracker.set_filter(ColumnFilter::new(binding, term));
        self.emit(GridEvent::FilterChanged);
        Ok(())
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        self.tracker.filters()
    }

    pub fn clear_filter(&mut self) {
        if self.tracker.clear_filters() {
            self.emit(GridEvent::FilterChanged);
        }
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.deferred(|grid| {
            let undone = grid.history.undo(&mut grid.tracker);
            if undone {
                grid.touch_collection();
            }
            undone
        });
        if undone {
            self.clamp_current();
            let label = self.history.next_redo().map(RowCommand::label).unwrap_or_default();
            log::debug!("undo {label} ({} left)", self.history.undo_len());
        }
        self.emit(GridEvent::FocusGrid);
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.deferred(|grid| {
            let redone = grid.history.redo(&mut grid.tracker);
            if redone {
                grid.touch_collection();
            }
            redone
        });
        if redone {
            self.clamp_current();
            let label = self.history.next_undo().map(RowCommand::label).unwrap_or_default();
            log::debug!("redo {label} ({} left)", self.history.redo_len());
        }
        self.emit(GridEvent::FocusGrid);
        redone
    }

    fn clamp_current(&mut self) {
        let len = self.tracker.len();
        self.current = match self.current {
            _ if len == 0 => None,
            Some(current) if current >= len => Some(len - 1),
            other => other,
        };
    }

    pub fn validator(&self) -> Validator<'_, R> {
        Validator::new(&self.columns)
    }

    /// True when every rule passes on every dirty row.
    pub fn validate(&self) -> bool {
        self.validator().validate(self.tracker.change_set())
    }

    /// Clean rows are out of scope and never report errors.
    pub fn error(&self, row_idx: usize, binding: Option<&str>) -> Option<String> {
        let row = self.tracker.row(row_idx).filter(|row| row.is_dirty())?;
        self.validator().error(&row.domain, binding)
    }

    pub fn validation_report(&self) -> Vec<FieldError> {
        self.validator().report(self.tracker.change_set_indexed())
    }

    pub fn change_batch(&self) -> ChangeBatch<R> {
        ChangeBatch::from_rows(self.tracker.change_set())
    }

    pub fn dispatch(&mut self, action: GridAction) -> Result<ActionOutcome, GridError> {
        let applied = |done: bool| {
            if done {
                ActionOutcome::Applied
            } else {
                ActionOutcome::Nothing
            }
        };
        match action {
            GridAction::Undo => Ok(applied(self.undo())),
            GridAction::Redo => Ok(applied(self.redo())),
            GridAction::ExportXlsx => Ok(ActionOutcome::ExportRequested),
            GridAction::AddRow => {
                self.add_row();
                Ok(ActionOutcome::Applied)
            }
            GridAction::RemoveRow => {
                let row_idx = self.current.ok_or(GridError::NoFocusedRow)?;
                self.remove_row(row_idx).map(|_| ActionOutcome::Applied)
            }
            GridAction::ClearFilter => {
                self.clear_filter();
                Ok(ActionOutcome::Applied)
            }
            GridAction::CopyRow => {
                let row_idx = self.current.ok_or(GridError::NoFocusedRow)?;
                self.copy_row(row_idx).map(|_| ActionOutcome::Applied)
            }
        }
    }

    pub fn export_file_name(&self) -> &str {
        &self.export_file_name
    }

    /// Header row plus the currently visible rows, as text.
    pub fn export_table(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let headers = self
            .columns
            .iter()
            .map(|column| column.header.clone())
            .collect();
        let rows = self
            .tracker
            .visible()
            .into_iter()
            .map(|(_, row)| {
                self.columns
                    .iter()
                    .map(|column| row.domain.field(&column.binding).unwrap_or_default())
                    .collect()
            })
            .collect();
        (headers, rows)
    }

    /// Writes the visible view to `<dir>/<export file name>`.
    pub fn export_xlsx(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.export_file_name);
        self.export_xlsx_to(&path)?;
        Ok(path)
    }

    pub fn export_xlsx_to(&self, path: &Path) -> Result<()> {
        let (headers, rows) = self.export_table();
        write_table(path, &headers, &rows)?;
        log::info!("exported {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::entities::customer::{customer_columns, Customer};
    use crate::domain::entities::row::{RecordId, RowKind};
    use crate::domain::validation::aggregate_message;

    fn customer(code: &str, name: &str) -> Customer {
        Customer {
            code: code.to_string(),
            name: name.to_string(),
            ..Customer::default()
        }
    }

    fn loaded_grid() -> GridController<Customer> {
        let mut grid = GridController::new(customer_columns(), &GridConfig::default());
        grid.load(vec![
            Stored::new(1, customer("C1", "Alpha")),
            Stored::new(2, customer("C2", "Beta")),
            Stored::new(3, customer("C3", "Gamma")),
        ]);
        grid
    }

    fn kinds(grid: &GridController<Customer>) -> Vec<(Option<RecordId>, RowKind)> {
        grid.change_set()
            .iter()
            .map(|row| (row.id(), row.kind()))
            .collect()
    }

    fn assert_change_set_is_dirty_subset(grid: &GridController<Customer>) {
        let dirty = grid.rows().iter().filter(|row| row.is_dirty()).count();
        assert_eq!(grid.change_set().len(), dirty);
        assert!(grid.change_set().iter().all(|row| row.is_dirty()));
        assert!(grid.change_set().len() <= grid.rows().len());
    }

    #[test]
    fn edit_delete_and_add_produce_expected_change_set() {
        let mut grid = loaded_grid();

        grid.edit_cell(1, "name", Some("Beta Corp".to_string()))
            .expect("edit should succeed");
        grid.remove_row(2).expect("toggle delete should succeed");
        grid.add_row();

        assert_eq!(
            kinds(&grid),
            vec![
                (Some(RecordId(2)), RowKind::Update),
                (Some(RecordId(3)), RowKind::Delete),
                (None, RowKind::Insert),
            ]
        );
        assert!(grid.change_set().iter().all(|row| row.id() != Some(RecordId(1))));
        assert_change_set_is_dirty_subset(&grid);
    }

    #[test]
    fn edit_marks_row_dirty_even_without_value_change() {
        let mut grid = loaded_grid();

        grid.edit_cell(0, "code", Some("C1".to_string()))
            .expect("edit should succeed");

        assert_eq!(kinds(&grid), vec![(Some(RecordId(1)), RowKind::Update)]);
    }

    #[test]
    fn repeated_empty_commit_on_required_field_records_one_command() {
        let mut grid = loaded_grid();

        grid.edit_cell(0, "code", None).expect("edit should succeed");
        grid.edit_cell(0, "code", None).expect("edit should succeed");
        grid.edit_cell(0, "code", Some(String::new()))
            .expect("edit should succeed");

        assert_eq!(grid.history.undo_len(), 1);
        assert_eq!(grid.rows()[0].domain.code, "");

        assert!(grid.undo());
        assert_eq!(grid.rows()[0].domain.code, "C1");
        assert!(grid.change_set().is_empty());
    }

    #[test]
    fn history_labels_follow_the_last_command() {
        let mut grid = loaded_grid();
        let label = |grid: &GridController<Customer>| grid.history.next_undo().map(RowCommand::label);

        grid.add_row();
        assert_eq!(label(&grid), Some("add row"));
        grid.copy_row(0).expect("copy should succeed");
        assert_eq!(label(&grid), Some("duplicate row"));
        grid.remove_row(1).expect("toggle should succeed");
        assert_eq!(label(&grid), Some("toggle delete"));

        grid.undo();
        assert_eq!(
            grid.history.next_redo().map(RowCommand::label),
            Some("toggle delete")
        );
    }

    #[test]
    fn redo_of_discard_drops_the_unsaved_row_again() {
        let mut grid = loaded_grid();
        let new_idx = grid.add_row();
        grid.edit_cell(new_idx, "code", Some("C9".to_string()))
            .expect("edit should succeed");
        assert_eq!(grid.remove_row(new_idx), Ok(RemoveOutcome::Discarded));
        assert_eq!(grid.rows().len(), 3);

        assert!(grid.undo());
        assert_eq!(grid.rows().len(), 4);
        assert_eq!(grid.rows()[new_idx].domain.code, "C9");
        assert!(grid.rows()[new_idx].is_dirty());

        assert!(grid.redo());
        assert_eq!(grid.rows().len(), 3);
        assert!(grid.change_set().is_empty());
    }

    #[test]
    fn edit_rejects_unknown_binding_and_row() {
        let mut grid = loaded_grid();

        assert_eq!(
            grid.edit_cell(0, "id", Some("9".to_string())),
            Err(GridError::UnknownBinding(UnknownBinding("id".to_string())))
        );
        assert_eq!(
            grid.edit_cell(7, "name", None),
            Err(GridError::RowOutOfRange(7))
        );
        assert!(grid.change_set().is_empty());
    }

    #[test]
    fn toggle_delete_mirrors_selection() {
        let mut grid = loaded_grid();

        assert_eq!(grid.remove_row(0), Ok(RemoveOutcome::MarkedForDeletion));
        let row = &grid.rows()[0];
        assert!(row.control.is_delete && row.control.is_selected);

        assert_eq!(grid.remove_row(0), Ok(RemoveOutcome::Restored));
        let row = &grid.rows()[0];
        assert!(!row.control.is_delete && !row.control.is_selected);
        assert!(grid.change_set().is_empty());
    }

    #[test]
    fn removing_unsaved_row_discards_it() {
        let mut grid = loaded_grid();
        let new_idx = grid.add_row();

        assert_eq!(grid.remove_row(new_idx), Ok(RemoveOutcome::Discarded));
        assert_eq!(grid.rows().len(), 3);
        assert!(grid.change_set().is_empty());
        assert!(grid.rows().iter().all(|row| !row.control.is_delete));
    }

    #[test]
    fn undo_add_removes_only_that_row_and_redo_restores_it() {
        let mut grid = loaded_grid();
        grid.edit_cell(0, "name", Some("Alpha 2".to_string()))
            .expect("edit should succeed");
        let new_idx = grid.add_row();
        grid.edit_cell(new_idx, "code", Some("N1".to_string()))
            .expect("edit should succeed");
        let before_undo = grid.rows().to_vec();

        assert!(grid.undo());
        assert!(grid.undo());
        assert_eq!(grid.rows().len(), 3);
        assert!(grid.rows()[0].is_dirty());
        assert!(!grid.rows()[1].is_dirty());

        assert!(grid.redo());
        assert!(grid.redo());
        assert_eq!(grid.rows(), before_undo.as_slice());
    }

    #[test]
    fn undo_edit_restores_clean_state() {
        let mut grid = loaded_grid();
        grid.edit_cell(2, "emailAddress", Some("x@y.zz".to_string()))
            .expect("edit should succeed");

        assert!(grid.undo());

        assert_eq!(grid.rows()[2].domain.email_address, None);
        assert!(grid.change_set().is_empty());
    }

    #[test]
    fn new_command_after_undo_discards_redo() {
        let mut grid = loaded_grid();
        grid.add_row();
        grid.undo();

        grid.remove_row(0).expect("toggle delete should succeed");

        assert!(!grid.can_redo());
        assert!(!grid.redo());
        assert_eq!(grid.rows().len(), 3);
    }

    #[test]
    fn undo_of_discard_and_toggle_restores_rows() {
        let mut grid = loaded_grid();
        let new_idx = grid.add_row();
        grid.edit_cell(new_idx, "code", Some("N".to_string()))
            .expect("edit should succeed");
        grid.remove_row(new_idx).expect("discard should succeed");
        grid.remove_row(1).expect("toggle should succeed");

        grid.undo();
        grid.undo();

        assert_eq!(grid.rows().len(), 4);
        assert_eq!(grid.rows()[new_idx].domain.code, "N");
        assert!(!grid.rows()[1].control.is_delete);
        assert!(!grid.rows()[1].is_dirty());
    }

    #[test]
    fn copy_row_clears_id_and_focuses_copy() {
        let mut grid = loaded_grid();

        let copy_idx = grid.copy_row(1).expect("copy should succeed");

        let copy = &grid.rows()[copy_idx];
        assert_eq!(copy_idx, 3);
        assert_eq!(copy.id(), None);
        assert_eq!(copy.domain, customer("C2", "Beta"));
        assert_eq!(copy.kind(), RowKind::Insert);
        assert!(copy.is_dirty());
        assert_eq!(grid.current(), Some(copy_idx));
        assert!(!grid.rows()[1].is_dirty());
    }

    #[test]
    fn each_row_operation_notifies_once() {
        let mut grid = loaded_grid();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        grid.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        grid.add_row();
        grid.remove_row(0).expect("toggle should succeed");
        grid.copy_row(1).expect("copy should succeed");
        grid.deferred(|grid| {
            grid.add_row();
            grid.add_row();
        });

        let changes = events
            .borrow()
            .iter()
            .filter(|event| **event == GridEvent::CollectionChanged)
            .count();
        assert_eq!(changes, 4);
    }

    #[test]
    fn undo_and_redo_ask_for_grid_focus() {
        let mut grid = loaded_grid();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        grid.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        grid.undo();
        grid.redo();

        assert_eq!(
            *events.borrow(),
            vec![GridEvent::FocusGrid, GridEvent::FocusGrid]
        );
    }

    #[test]
    fn cell_edit_event_carries_previous_and_next() {
        let mut grid = loaded_grid();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        grid.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        grid.edit_cell(0, "address", Some("Tokyo".to_string()))
            .expect("edit should succeed");

        assert_eq!(
            *events.borrow(),
            vec![GridEvent::CellEditEnded(CellEdit {
                key: CellKey {
                    row_idx: 0,
                    binding: "address".to_string(),
                },
                previous: None,
                next: Some("Tokyo".to_string()),
            })]
        );
    }

    #[test]
    fn validation_only_looks_at_dirty_rows() {
        let mut grid = GridController::new(customer_columns(), &GridConfig::default());
        grid.load(vec![Stored::new(1, customer("", ""))]);

        assert!(grid.validate());
        assert_eq!(grid.error(0, None), None);

        let new_idx = grid.add_row();
        grid.edit_cell(new_idx, "emailAddress", Some("bad".to_string()))
            .expect("edit should succeed");

        assert!(!grid.validate());
        assert_eq!(grid.error(new_idx, None), Some(aggregate_message(3)));
        assert_eq!(grid.validation_report().len(), 3);
    }

    #[test]
    fn clear_filter_keeps_dirty_flags() {
        let mut grid = loaded_grid();
        grid.edit_cell(0, "name", Some("Alpha 2".to_string()))
            .expect("edit should succeed");
        grid.set_filter("code", "C3").expect("filter should apply");

        assert_eq!(grid.visible().len(), 1);

        grid.clear_filter();

        assert_eq!(grid.visible().len(), 3);
        assert_eq!(grid.change_set().len(), 1);
    }

    #[test]
    fn export_table_follows_visible_view() {
        let mut grid = loaded_grid();
        grid.set_filter("name", "ET").expect("filter should apply");

        let (headers, rows) = grid.export_table();

        assert_eq!(headers, vec!["Code", "Name", "Address", "Phone", "Email"]);
        assert_eq!(rows, vec![vec!["C2", "Beta", "", "", ""]]);
    }

    #[test]
    fn shortcuts_map_to_actions() {
        assert_eq!(GridAction::from_shortcut("z", true), Some(GridAction::Undo));
        assert_eq!(GridAction::from_shortcut("Y", true), Some(GridAction::Redo));
        assert_eq!(GridAction::from_shortcut("Insert", true), Some(GridAction::AddRow));
        assert_eq!(GridAction::from_shortcut("Delete", true), Some(GridAction::RemoveRow));
        assert_eq!(GridAction::from_shortcut("d", true), Some(GridAction::CopyRow));
        assert_eq!(GridAction::from_shortcut("l", true), Some(GridAction::ClearFilter));
        assert_eq!(GridAction::from_shortcut("s", true), Some(GridAction::ExportXlsx));
        assert_eq!(GridAction::from_shortcut("z", false), None);
    }

    #[test]
    fn dispatch_uses_focused_row() {
        let mut grid = loaded_grid();

        assert_eq!(
            grid.dispatch(GridAction::RemoveRow),
            Err(GridError::NoFocusedRow)
        );

        grid.set_current(1).expect("row 1 exists");
        assert_eq!(grid.dispatch(GridAction::CopyRow), Ok(ActionOutcome::Applied));
        assert_eq!(grid.current(), Some(3));
        assert_eq!(grid.dispatch(GridAction::Undo), Ok(ActionOutcome::Applied));
        assert_eq!(grid.dispatch(GridAction::Undo), Ok(ActionOutcome::Nothing));
        assert_eq!(
            grid.dispatch(GridAction::ExportXlsx),
            Ok(ActionOutcome::ExportRequested)
        );
    }

    #[test]
    fn focusing_a_missing_row_keeps_the_previous_focus() {
        let mut grid = loaded_grid();
        grid.set_current(2).expect("row 2 exists");

        let err = grid.set_current(5).expect_err("row 5 does not exist");

        assert_eq!(err.to_string(), "row 5 is out of range");
        assert_eq!(grid.current(), Some(2));
    }

    #[test]
    fn load_resets_history_and_flags() {
        let mut grid = loaded_grid();
        grid.add_row();
        grid.remove_row(0).expect("toggle should succeed");

        grid.load(vec![Stored::new(5, customer("C5", "Epsilon"))]);

        assert!(!grid.can_undo());
        assert!(grid.change_set().is_empty());
        assert_eq!(grid.current(), None);
    }
}
