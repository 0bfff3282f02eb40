pub mod command;
pub mod controller;
pub mod history;
pub mod tracker;

use thiserror::Error;

use crate::domain::entities::row::UnknownBinding;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),
    #[error(transparent)]
    UnknownBinding(#[from] UnknownBinding),
    #[error("no row is focused")]
    NoFocusedRow,
    #[error("row {0} is persisted and can only be marked for deletion")]
    PersistedRow(usize),
}
