use dioxus::prelude::*;

use crate::config::GridConfig;
use crate::domain::entities::control::{detail_columns, Control, ControlDetail};
use crate::domain::entities::customer::{customer_columns, Customer};
use crate::domain::entities::edit::{CellKey, GridEvent};
use crate::usecase::grid::controller::GridController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Customers,
    Controls,
}

/// Cell currently open for in-place editing on one grid surface.
#[derive(Clone, Copy)]
pub struct CellEditor {
    pub cell: Signal<Option<CellKey>>,
    pub value: Signal<String>,
}

pub struct AppState {
    pub page: Signal<Page>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    /// Bumped when a grid asks for input focus after undo/redo.
    pub focus_requests: Signal<u64>,
    pub customers: Signal<GridController<Customer>>,
    pub customer_editor: CellEditor,
    pub customer_filter_name: Signal<String>,
    pub customer_filter_code: Signal<String>,
    pub controls: Signal<Vec<Control>>,
    pub selected_control: Signal<Option<Control>>,
    pub details: Signal<GridController<ControlDetail>>,
    pub detail_editor: CellEditor,
    pub show_new_control: Signal<bool>,
    pub new_control_code: Signal<String>,
    pub new_control_name: Signal<String>,
}

fn status_observer(
    label: &'static str,
    mut status: Signal<String>,
    mut focus_requests: Signal<u64>,
) -> impl FnMut(&GridEvent) + 'static {
    move |event| match event {
        GridEvent::Loaded { rows } => status.set(format!("{label}: loaded {rows} row(s)")),
        GridEvent::CellEditEnded(edit) => status.set(format!(
            "{label}: row {} '{}' edited",
            edit.key.row_idx + 1,
            edit.key.binding
        )),
        GridEvent::FocusGrid => {
            let next = focus_requests.peek().wrapping_add(1);
            focus_requests.set(next);
        }
        GridEvent::CollectionChanged | GridEvent::FilterChanged => {}
    }
}

impl AppState {
    pub fn new(grid_config: GridConfig) -> Self {
        let status = use_signal(|| "Ready".to_string());
        let focus_requests = use_signal(|| 0_u64);
        let customer_config = grid_config.clone();

        Self {
            page: use_signal(|| Page::Customers),
            busy: use_signal(|| false),
            status,
            focus_requests,
            customers: use_signal(move || {
                let mut grid = GridController::new(customer_columns(), &customer_config);
                grid.subscribe(status_observer("Customers", status, focus_requests));
                grid
            }),
            customer_editor: CellEditor {
                cell: use_signal(|| None::<CellKey>),
                value: use_signal(String::new),
            },
            customer_filter_name: use_signal(String::new),
            customer_filter_code: use_signal(String::new),
            controls: use_signal(Vec::<Control>::new),
            selected_control: use_signal(|| None::<Control>),
            details: use_signal(move || {
                let mut grid = GridController::new(detail_columns(), &grid_config);
                grid.subscribe(status_observer("Details", status, focus_requests));
                grid
            }),
            detail_editor: CellEditor {
                cell: use_signal(|| None::<CellKey>),
                value: use_signal(String::new),
            },
            show_new_control: use_signal(|| false),
            new_control_code: use_signal(String::new),
            new_control_name: use_signal(String::new),
        }
    }
}
