use thiserror::Error;

use crate::domain::entities::control::{Control, ControlDetail, ControlWithDetails, NewControl};
use crate::domain::entities::customer::{Customer, CustomerFilter};
use crate::domain::entities::edit::ChangeBatch;
use crate::domain::entities::row::{RecordId, Stored};

/// Backend failures as the UI sees them. Messages are short; the raw cause is
/// logged where it happens and never carried across this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("{0}")]
    NotFound(String),
    /// The bulk transaction was rolled back.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Internal(String),
}

pub trait MasterRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn find_customers(&self, filter: &CustomerFilter) -> Result<Vec<Stored<Customer>>, RepoError>;
    fn bulk_upsert_customers(
        &self,
        batch: &ChangeBatch<Customer>,
    ) -> Result<Vec<Stored<Customer>>, RepoError>;

    fn find_controls(&self) -> Result<Vec<ControlWithDetails>, RepoError>;
    fn find_details_by_control_code(&self, code: &str) -> Result<ControlWithDetails, RepoError>;
    fn create_control(&self, control: NewControl) -> Result<Control, RepoError>;
    fn bulk_upsert_details(
        &self,
        control_id: RecordId,
        batch: &ChangeBatch<ControlDetail>,
    ) -> Result<Vec<Stored<ControlDetail>>, RepoError>;
}

/// Where a grid's change batch is sent. Either every change lands or none.
pub trait BulkTarget<R> {
    fn bulk_upsert(&self, batch: &ChangeBatch<R>) -> Result<Vec<Stored<R>>, RepoError>;
}

pub struct CustomerTarget<'a> {
    pub repo: &'a dyn MasterRepository,
}

impl BulkTarget<Customer> for CustomerTarget<'_> {
    fn bulk_upsert(&self, batch: &ChangeBatch<Customer>) -> Result<Vec<Stored<Customer>>, RepoError> {
        self.repo.bulk_upsert_customers(batch)
    }
}

/// Details are always written under one parent control.
pub struct DetailTarget<'a> {
    pub repo: &'a dyn MasterRepository,
    pub control_id: RecordId,
}

impl BulkTarget<ControlDetail> for DetailTarget<'_> {
    fn bulk_upsert(
        &self,
        batch: &ChangeBatch<ControlDetail>,
    ) -> Result<Vec<Stored<ControlDetail>>, RepoError> {
        self.repo.bulk_upsert_details(self.control_id, batch)
    }
}
