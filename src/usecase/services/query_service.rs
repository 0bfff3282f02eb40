use std::sync::Arc;

use crate::domain::entities::control::ControlWithDetails;
use crate::domain::entities::customer::{Customer, CustomerFilter};
use crate::domain::entities::row::Stored;
use crate::usecase::ports::repo::{MasterRepository, RepoError};

pub struct QueryService {
    repo: Arc<dyn MasterRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn MasterRepository>) -> Self {
        Self { repo }
    }

    pub fn load_customers(&self, filter: &CustomerFilter) -> Result<Vec<Stored<Customer>>, RepoError> {
        let customers = self.repo.find_customers(filter)?;
        log::info!("loaded {} customer(s)", customers.len());
        Ok(customers)
    }

    pub fn load_controls(&self) -> Result<Vec<ControlWithDetails>, RepoError> {
        let controls = self.repo.find_controls()?;
        log::info!("loaded {} control(s)", controls.len());
        Ok(controls)
    }

    pub fn load_details(&self, control_code: &str) -> Result<ControlWithDetails, RepoError> {
        self.repo.find_details_by_control_code(control_code)
    }
}
