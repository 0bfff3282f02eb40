use crate::domain::entities::row::Record;

/// Case-insensitive substring filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub binding: String,
    pub term: String,
}

impl ColumnFilter {
    pub fn new(binding: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            term: term.into(),
        }
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let term = self.term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        record
            .field(&self.binding)
            .map(|value| value.to_lowercase().contains(&term))
            .unwrap_or(false)
    }
}
