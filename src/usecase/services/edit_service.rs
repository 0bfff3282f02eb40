use std::sync::Arc;

use thiserror::Error;

use crate::domain::entities::control::{Control, NewControl};
use crate::usecase::ports::repo::{MasterRepository, RepoError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Code and name are both required.")]
    MissingFields,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct EditService {
    repo: Arc<dyn MasterRepository>,
}

impl EditService {
    pub fn new(repo: Arc<dyn MasterRepository>) -> Self {
        Self { repo }
    }

    /// Both fields are trimmed; a blank one never reaches the backend.
    pub fn create_control(&self, code: &str, name: &str) -> Result<Control, EditError> {
        let code = code.trim();
        let name = name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(EditError::MissingFields);
        }

        let control = self.repo.create_control(NewControl {
            code: code.to_string(),
            name: name.to_string(),
        })?;
        log::info!("created control {} ({})", control.code, control.id);
        Ok(control)
    }
}
