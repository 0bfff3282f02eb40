use crate::domain::entities::filter::ColumnFilter;
use crate::domain::entities::row::{Record, Row, RowControl, Stored};
use crate::usecase::grid::GridError;

/// In-memory collection behind one grid and the single source of truth for
/// what changed since the last successful load.
#[derive(Debug, Clone)]
pub struct ChangeTracker<R> {
    rows: Vec<Row<R>>,
    filters: Vec<ColumnFilter>,
}

impl<R> Default for ChangeTracker<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            filters: Vec::new(),
        }
    }
}

impl<R: Record> ChangeTracker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection with a fresh backend load; every row is clean.
    pub fn load(&mut self, stored: Vec<Stored<R>>) {
        self.rows = stored.into_iter().map(Row::persisted).collect();
    }

    pub fn current_rows(&self) -> &[Row<R>] {
        &self.rows
    }

    pub fn row(&self, row_idx: usize) -> Option<&Row<R>> {
        self.rows.get(row_idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn change_set(&self) -> Vec<&Row<R>> {
        self.rows.iter().filter(|row| row.is_dirty()).collect()
    }

    pub fn change_set_indexed(&self) -> impl Iterator<Item = (usize, &Row<R>)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_dirty())
    }

    pub fn has_changes(&self) -> bool {
        self.rows.iter().any(Row::is_dirty)
    }

    /// Returns the previous dirty flag.
    pub fn mark_dirty(&mut self, row_idx: usize) -> Result<bool, GridError> {
        let row = self.row_mut(row_idx)?;
        let was_selected = row.control.is_selected;
        row.control.is_selected = true;
        Ok(was_selected)
    }

    /// Drops an unsaved row. Persisted rows must go through the delete flag.
    pub fn discard(&mut self, row_idx: usize) -> Result<Row<R>, GridError> {
        let row = self.row(row_idx).ok_or(GridError::RowOutOfRange(row_idx))?;
        if row.id().is_some() {
            return Err(GridError::PersistedRow(row_idx));
        }
        Ok(self.rows.remove(row_idx))
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    /// One filter per binding; an empty term removes it.
    pub fn set_filter(&mut self, filter: ColumnFilter) {
        self.filters.retain(|existing| existing.binding != filter.binding);
        if !filter.term.trim().is_empty() {
            self.filters.push(filter);
        }
    }

    pub fn clear_filters(&mut self) -> bool {
        let had_filters = !self.filters.is_empty();
        self.filters.clear();
        had_filters
    }

    /// Rows shown by the grid. Unsaved rows stay visible whatever the filter.
    pub fn visible(&self) -> Vec<(usize, &Row<R>)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.id().is_none() || self.filters.iter().all(|f| f.matches(&row.domain))
            })
            .collect()
    }

    pub(crate) fn row_mut(&mut self, row_idx: usize) -> Result<&mut Row<R>, GridError> {
        self.rows
            .get_mut(row_idx)
            .ok_or(GridError::RowOutOfRange(row_idx))
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, row: Row<R>) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub(crate) fn insert_row(&mut self, row_idx: usize, row: Row<R>) {
        let row_idx = row_idx.min(self.rows.len());
        self.rows.insert(row_idx, row);
    }

    pub(crate) fn remove_row(&mut self, row_idx: usize) -> Option<Row<R>> {
        if row_idx < self.rows.len() {
            Some(self.rows.remove(row_idx))
        } else {
            log::warn!("remove of missing row {row_idx} ignored");
            None
        }
    }

    /// Writes the field only; dirtiness is tracked separately.
    pub(crate) fn write_cell(&mut self, row_idx: usize, binding: &str, value: Option<String>) {
        match self.rows.get_mut(row_idx) {
            Some(row) => {
                if let Err(err) = row.domain.set_field(binding, value) {
                    log::warn!("cell write on row {row_idx} ignored: {err}");
                }
            }
            None => log::warn!("cell write on missing row {row_idx} ignored"),
        }
    }

    pub(crate) fn set_dirty(&mut self, row_idx: usize, is_selected: bool) {
        match self.rows.get_mut(row_idx) {
            Some(row) => row.control.is_selected = is_selected,
            None => log::warn!("dirty flag on missing row {row_idx} ignored"),
        }
    }

    pub(crate) fn set_control(&mut self, row_idx: usize, control: RowControl) {
        match self.rows.get_mut(row_idx) {
            Some(row) => row.control = control,
            None => log::warn!("control update on missing row {row_idx} ignored"),
        }
    }
}
