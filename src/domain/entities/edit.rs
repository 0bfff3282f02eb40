use crate::domain::entities::row::{Record, RecordId, Row, RowKind, Stored};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row_idx: usize,
    pub binding: String,
}

/// Payload of a finished in-place edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub key: CellKey,
    pub previous: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    CellEditEnded(CellEdit),
    /// Fired once per logical row operation, after the mutation is complete.
    CollectionChanged,
    FilterChanged,
    Loaded { rows: usize },
    /// Input focus should go back to the grid surface.
    FocusGrid,
}

/// The change set partitioned by classification, ready for one bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch<R> {
    pub creates: Vec<R>,
    pub updates: Vec<Stored<R>>,
    pub deletes: Vec<RecordId>,
}

impl<R> Default for ChangeBatch<R> {
    fn default() -> Self {
        Self {
            creates: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
        }
    }
}

impl<R: Record> ChangeBatch<R> {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Row<R>>) -> Self
    where
        R: 'a,
    {
        let mut batch = ChangeBatch::default();
        for row in rows {
            match (row.kind(), row.id()) {
                (RowKind::Insert, _) => batch.creates.push(row.domain.clone()),
                (RowKind::Update, Some(id)) => batch.updates.push(Stored {
                    id,
                    record: row.domain.clone(),
                }),
                (RowKind::Delete, Some(id)) => batch.deletes.push(id),
                _ => {}
            }
        }
        batch
    }
}

impl<R> ChangeBatch<R> {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::control::ControlDetail;

    fn detail(code: &str) -> ControlDetail {
        ControlDetail {
            code: code.to_string(),
            name: format!("name-{code}"),
        }
    }

    #[test]
    fn batch_partitions_by_classification() {
        let mut updated = Row::persisted(Stored::new(2, detail("B")));
        updated.control.is_selected = true;
        let mut deleted = Row::persisted(Stored::new(3, detail("C")));
        deleted.control.is_delete = true;
        deleted.control.is_selected = true;
        let untouched = Row::persisted(Stored::new(1, detail("A")));
        let created = Row::pending(detail("N"));

        let batch = ChangeBatch::from_rows([&untouched, &updated, &deleted, &created]);

        assert_eq!(batch.creates, vec![detail("N")]);
        assert_eq!(batch.updates, vec![Stored::new(2, detail("B"))]);
        assert_eq!(batch.deletes, vec![RecordId(3)]);
        assert_eq!(batch.len(), 3);
    }
}
