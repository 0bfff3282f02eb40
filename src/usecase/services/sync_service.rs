use std::cell::Cell;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::entities::control::ControlDetail;
use crate::domain::entities::customer::Customer;
use crate::domain::entities::row::{Record, RecordId, Stored};
use crate::usecase::grid::controller::GridController;
use crate::usecase::ports::repo::{
    BulkTarget, CustomerTarget, DetailTarget, MasterRepository, RepoError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Please fix {count} validation error(s) before saving.")]
    Validation { count: usize },
    #[error("A save is already in progress.")]
    InFlight,
    #[error(transparent)]
    Backend(#[from] RepoError),
}

/// Held for the duration of one submission; dropping it reopens the gate.
struct InFlightTicket<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> InFlightTicket<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Sends a grid's change set to the backend as one batch. One instance guards
/// one grid; a second submission while the first runs is rejected.
pub struct SyncService {
    repo: Arc<dyn MasterRepository>,
    in_flight: Cell<bool>,
}

impl SyncService {
    pub fn new(repo: Arc<dyn MasterRepository>) -> Self {
        Self {
            repo,
            in_flight: Cell::new(false),
        }
    }

    /// On success the caller reloads the grid; nothing local is touched here.
    pub fn synchronize<R: Record>(
        &self,
        grid: &GridController<R>,
        target: &dyn BulkTarget<R>,
    ) -> Result<Vec<Stored<R>>, SyncError> {
        let Some(_ticket) = InFlightTicket::acquire(&self.in_flight) else {
            log::warn!("synchronization rejected: another submission is in flight");
            return Err(SyncError::InFlight);
        };

        if !grid.validate() {
            let report = grid.validation_report();
            log::warn!(
                "synchronization blocked by {} validation error(s)",
                report.len()
            );
            return Err(SyncError::Validation {
                count: report.len(),
            });
        }

        let batch = grid.change_batch();
        if batch.is_empty() {
            log::debug!("nothing to synchronize");
            return Ok(Vec::new());
        }

        match target.bulk_upsert(&batch) {
            Ok(saved) => {
                log::info!(
                    "synchronized {} create(s), {} update(s), {} delete(s)",
                    batch.creates.len(),
                    batch.updates.len(),
                    batch.deletes.len()
                );
                Ok(saved)
            }
            Err(err) => {
                log::error!("synchronization failed: {err}");
                Err(SyncError::Backend(err))
            }
        }
    }

    pub fn sync_customers(
        &self,
        grid: &GridController<Customer>,
    ) -> Result<Vec<Stored<Customer>>, SyncError> {
        let target = CustomerTarget {
            repo: self.repo.as_ref(),
        };
        self.synchronize(grid, &target)
    }

    pub fn sync_details(
        &self,
        control_id: RecordId,
        grid: &GridController<ControlDetail>,
    ) -> Result<Vec<Stored<ControlDetail>>, SyncError> {
        let target = DetailTarget {
            repo: self.repo.as_ref(),
            control_id,
        };
        self.synchronize(grid, &target)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::GridConfig;
    use crate::domain::entities::customer::customer_columns;
    use crate::domain::entities::edit::ChangeBatch;
    use crate::infra::sqlite::repo::SqliteRepo;

    fn service() -> SyncService {
        SyncService::new(Arc::new(SqliteRepo::new("never-opened.sqlite")))
    }

    fn grid() -> GridController<Customer> {
        let mut grid = GridController::new(customer_columns(), &GridConfig::default());
        grid.load(vec![Stored::new(
            1,
            Customer {
                code: "C1".to_string(),
                name: "Alpha".to_string(),
                ..Customer::default()
            },
        )]);
        grid
    }

    struct RecordingTarget {
        calls: RefCell<Vec<usize>>,
        outcome: Result<(), RepoError>,
    }

    impl RecordingTarget {
        fn accepting() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                outcome: Ok(()),
            }
        }
    }

    impl BulkTarget<Customer> for RecordingTarget {
        fn bulk_upsert(
            &self,
            batch: &ChangeBatch<Customer>,
        ) -> Result<Vec<Stored<Customer>>, RepoError> {
            self.calls.borrow_mut().push(batch.len());
            self.outcome.clone()?;
            Ok(batch.updates.clone())
        }
    }

    #[test]
    fn empty_change_set_never_reaches_backend() {
        let service = service();
        let target = RecordingTarget::accepting();

        let saved = service
            .synchronize(&grid(), &target)
            .expect("empty sync should succeed");

        assert!(saved.is_empty());
        assert!(target.calls.borrow().is_empty());
    }

    #[test]
    fn invalid_change_set_is_blocked_locally() {
        let service = service();
        let target = RecordingTarget::accepting();
        let mut grid = grid();
        grid.edit_cell(0, "emailAddress", Some("not-an-email".to_string()))
            .expect("edit should succeed");
        grid.add_row();

        let err = service
            .synchronize(&grid, &target)
            .expect_err("invalid rows should block");

        // bad email on row 0, missing code and name on the new row
        assert_eq!(err, SyncError::Validation { count: 3 });
        assert!(target.calls.borrow().is_empty());
        assert!(!service.in_flight.get());
    }

    #[test]
    fn valid_change_set_is_sent_as_one_batch() {
        let service = service();
        let target = RecordingTarget::accepting();
        let mut grid = grid();
        grid.edit_cell(0, "name", Some("Alpha Ltd".to_string()))
            .expect("edit should succeed");

        let saved = service
            .synchronize(&grid, &target)
            .expect("sync should succeed");

        assert_eq!(*target.calls.borrow(), vec![1]);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].record.name, "Alpha Ltd");
    }

    #[test]
    fn backend_failure_leaves_grid_untouched() {
        let service = service();
        let target = RecordingTarget {
            calls: RefCell::new(Vec::new()),
            outcome: Err(RepoError::Rejected("duplicate code".to_string())),
        };
        let mut grid = grid();
        grid.remove_row(0).expect("remove should succeed");

        let err = service
            .synchronize(&grid, &target)
            .expect_err("backend should reject");

        assert_eq!(
            err,
            SyncError::Backend(RepoError::Rejected("duplicate code".to_string()))
        );
        assert_eq!(err.to_string(), "duplicate code");
        assert_eq!(grid.change_set().len(), 1);
        assert!(!service.in_flight.get());
    }

    struct ReentrantTarget<'a> {
        service: &'a SyncService,
        grid: &'a GridController<Customer>,
        nested: RefCell<Option<SyncError>>,
    }

    impl BulkTarget<Customer> for ReentrantTarget<'_> {
        fn bulk_upsert(
            &self,
            _batch: &ChangeBatch<Customer>,
        ) -> Result<Vec<Stored<Customer>>, RepoError> {
            let nested = self.service.synchronize(self.grid, self);
            *self.nested.borrow_mut() = nested.err();
            Ok(Vec::new())
        }
    }

    #[test]
    fn second_submission_while_in_flight_is_rejected() {
        let service = service();
        let mut grid = grid();
        grid.edit_cell(0, "name", Some("Alpha Ltd".to_string()))
            .expect("edit should succeed");
        let target = ReentrantTarget {
            service: &service,
            grid: &grid,
            nested: RefCell::new(None),
        };

        service
            .synchronize(&grid, &target)
            .expect("outer sync should succeed");

        assert_eq!(*target.nested.borrow(), Some(SyncError::InFlight));
        assert!(!service.in_flight.get());
    }
}
