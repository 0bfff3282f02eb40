use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column binding: {0}")]
pub struct UnknownBinding(pub String);

/// Domain fields of one editable row, addressed by column binding.
///
/// Control fields (`id`, delete and dirty flags) never live here; they are kept
/// in [`RowControl`] next to the record.
pub trait Record: Clone + Default + PartialEq + std::fmt::Debug {
    fn field(&self, binding: &str) -> Option<String>;

    fn set_field(&mut self, binding: &str, value: Option<String>) -> Result<(), UnknownBinding>;
}

/// A record as returned by the backend, paired with its persisted id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<R> {
    pub id: RecordId,
    pub record: R,
}

impl<R> Stored<R> {
    pub fn new(id: impl Into<RecordId>, record: R) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowControl {
    pub id: Option<RecordId>,
    pub is_delete: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Insert,
    Update,
    Delete,
    Unchanged,
}

impl RowKind {
    /// Letter shown in the row header of a dirty row.
    pub fn marker(self) -> &'static str {
        match self {
            RowKind::Insert => "I",
            RowKind::Update => "U",
            RowKind::Delete => "D",
            RowKind::Unchanged => "",
        }
    }
}

pub fn classify(control: &RowControl) -> RowKind {
    match (control.id, control.is_delete, control.is_selected) {
        (None, _, _) => RowKind::Insert,
        (Some(_), true, _) => RowKind::Delete,
        (Some(_), false, true) => RowKind::Update,
        (Some(_), false, false) => RowKind::Unchanged,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<R> {
    pub domain: R,
    pub control: RowControl,
}

impl<R: Record> Row<R> {
    /// Clean row straight from a backend load.
    pub fn persisted(stored: Stored<R>) -> Self {
        Self {
            domain: stored.record,
            control: RowControl {
                id: Some(stored.id),
                is_delete: false,
                is_selected: false,
            },
        }
    }

    /// Dirty row that has never been saved.
    pub fn pending(domain: R) -> Self {
        Self {
            domain,
            control: RowControl {
                id: None,
                is_delete: false,
                is_selected: true,
            },
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.control.id
    }

    pub fn is_dirty(&self) -> bool {
        self.control.is_selected
    }

    pub fn kind(&self) -> RowKind {
        classify(&self.control)
    }

    pub fn marker(&self) -> &'static str {
        if !self.control.is_selected {
            return "";
        }
        self.kind().marker()
    }
}
