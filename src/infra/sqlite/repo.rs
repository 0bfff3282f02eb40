use std::path::PathBuf;

use crate::domain::entities::control::{Control, ControlDetail, ControlWithDetails, NewControl};
use crate::domain::entities::customer::{Customer, CustomerFilter};
use crate::domain::entities::edit::ChangeBatch;
use crate::domain::entities::row::{RecordId, Stored};
use crate::infra::sqlite::queries::{
    bulk_upsert_customers, bulk_upsert_details, create_control, find_control_by_code,
    find_controls, find_customers,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{MasterRepository, RepoError};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

fn internal(operation: &str) -> impl FnOnce(anyhow::Error) -> RepoError + '_ {
    move |err| {
        log::error!("{operation} failed: {err:#}");
        RepoError::Internal(format!("{operation} failed."))
    }
}

fn rejected(operation: &str) -> impl FnOnce(anyhow::Error) -> RepoError + '_ {
    move |err| {
        log::error!("{operation} rolled back: {err:#}");
        RepoError::Rejected(format!("{operation} failed; no changes were saved."))
    }
}

impl MasterRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(internal("Database initialization"))
    }

    fn find_customers(&self, filter: &CustomerFilter) -> Result<Vec<Stored<Customer>>, RepoError> {
        find_customers(&self.db_path, filter).map_err(internal("Loading customers"))
    }

    fn bulk_upsert_customers(
        &self,
        batch: &ChangeBatch<Customer>,
    ) -> Result<Vec<Stored<Customer>>, RepoError> {
        bulk_upsert_customers(&self.db_path, batch).map_err(rejected("Saving customers"))
    }

    fn find_controls(&self) -> Result<Vec<ControlWithDetails>, RepoError> {
        find_controls(&self.db_path).map_err(internal("Loading controls"))
    }

    fn find_details_by_control_code(&self, code: &str) -> Result<ControlWithDetails, RepoError> {
        find_control_by_code(&self.db_path, code)
            .map_err(internal("Loading control details"))?
            .ok_or_else(|| RepoError::NotFound(format!("Control '{code}' was not found.")))
    }

    fn create_control(&self, control: NewControl) -> Result<Control, RepoError> {
        create_control(&self.db_path, &control).map_err(internal("Creating control"))
    }

    fn bulk_upsert_details(
        &self,
        control_id: RecordId,
        batch: &ChangeBatch<ControlDetail>,
    ) -> Result<Vec<Stored<ControlDetail>>, RepoError> {
        bulk_upsert_details(&self.db_path, control_id, batch)
            .map_err(rejected("Saving control details"))
    }
}
