use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::{Key, *};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::config::AppConfig;
use crate::domain::entities::control::{Control, ControlDetail};
use crate::domain::entities::customer::{Customer, CustomerFilter};
use crate::domain::entities::edit::CellKey;
use crate::domain::entities::row::Record;
use crate::infra::sqlite::repo::SqliteRepo;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::{AppState, CellEditor, Page};
use crate::usecase::grid::controller::{ActionOutcome, GridAction, GridController};
use crate::usecase::ports::repo::{MasterRepository, RepoError};
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::query_service::QueryService;
use crate::usecase::services::sync_service::SyncService;

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";
const CELL_STYLE: &str = "border: 1px solid #bbb; padding: 4px; min-width: 90px;";
const ERROR_CELL_STYLE: &str =
    "border: 2px solid #d9534f; padding: 3px; min-width: 90px; background: #fff5f5;";
const GRID_SURFACE_ID: &str = "grid-surface";

fn show_error(title: &str, message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn confirm_discard<R: Record + 'static>(grid: Signal<GridController<R>>) -> bool {
    if !grid.read().has_changes() {
        return true;
    }
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Unsaved changes")
        .set_description("Discard the unsaved changes?")
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

fn export_grid<R: Record + 'static>(grid: Signal<GridController<R>>, mut status: Signal<String>) {
    let file_name = grid.read().export_file_name().to_string();
    let Some(path) = FileDialog::new()
        .add_filter("Excel", &["xlsx"])
        .set_file_name(file_name)
        .save_file()
    else {
        return;
    };
    match grid.read().export_xlsx_to(&path) {
        Ok(()) => status.set(format!("Exported to {}", path.display())),
        Err(err) => {
            log::error!("export to {} failed: {err:#}", path.display());
            status.set(format!("Export failed: {err}"));
        }
    }
}

fn run_grid_action<R: Record + 'static>(
    mut grid: Signal<GridController<R>>,
    action: GridAction,
    mut status: Signal<String>,
) {
    let outcome = grid.write().dispatch(action);
    match outcome {
        Ok(ActionOutcome::ExportRequested) => export_grid(grid, status),
        Ok(ActionOutcome::Applied | ActionOutcome::Nothing) => {}
        Err(err) => status.set(err.to_string()),
    }
}

fn commit_cell<R: Record + 'static>(
    mut grid: Signal<GridController<R>>,
    editor: CellEditor,
    mut status: Signal<String>,
) {
    let CellEditor { mut cell, value } = editor;
    let Some(key) = cell.peek().clone() else {
        return;
    };
    let draft = value.peek().clone();
    cell.set(None);
    let next = (!draft.is_empty()).then_some(draft);
    let result = grid.write().edit_cell(key.row_idx, &key.binding, next);
    if let Err(err) = result {
        status.set(err.to_string());
    }
}

fn grid_toolbar<R: Record + 'static>(
    grid: Signal<GridController<R>>,
    status: Signal<String>,
    busy: Signal<bool>,
) -> Element {
    let (can_undo, can_redo, has_focus) = {
        let snapshot = grid.read();
        (
            snapshot.can_undo(),
            snapshot.can_redo(),
            snapshot.current().is_some(),
        )
    };
    let buttons = [
        ("Add", GridAction::AddRow, true),
        ("Remove", GridAction::RemoveRow, has_focus),
        ("Duplicate", GridAction::CopyRow, has_focus),
        ("Undo", GridAction::Undo, can_undo),
        ("Redo", GridAction::Redo, can_redo),
        ("Clear filter", GridAction::ClearFilter, true),
        ("Export", GridAction::ExportXlsx, true),
    ];

    rsx! {
        div {
            style: "display: flex; gap: 8px; align-items: center; margin: 8px 0;",
            for (label, action, enabled) in buttons {
                button {
                    style: BUTTON_STYLE,
                    disabled: busy() || !enabled,
                    onclick: move |_| run_grid_action(grid, action, status),
                    "{label}"
                }
            }
        }
    }
}

struct CellView {
    binding: String,
    value: String,
    error: Option<String>,
}

struct RowView {
    row_idx: usize,
    marker: &'static str,
    row_error: Option<String>,
    is_delete: bool,
    cells: Vec<CellView>,
}

fn grid_table<R: Record + 'static>(
    mut grid: Signal<GridController<R>>,
    editor: CellEditor,
    mut status: Signal<String>,
) -> Element {
    let CellEditor {
        cell: mut editing_cell,
        value: mut editing_value,
    } = editor;

    let (headers, filters, rows, current) = {
        let snapshot = grid.read();
        let columns = snapshot.columns();
        let terms: HashMap<&str, &str> = snapshot
            .filters()
            .iter()
            .map(|filter| (filter.binding.as_str(), filter.term.as_str()))
            .collect();
        let headers: Vec<(String, bool)> = columns
            .iter()
            .map(|column| (column.header.clone(), column.is_required))
            .collect();
        let filters: Vec<(String, String, String)> = columns
            .iter()
            .map(|column| {
                (
                    column.header.clone(),
                    column.binding.clone(),
                    terms
                        .get(column.binding.as_str())
                        .map(|term| term.to_string())
                        .unwrap_or_default(),
                )
            })
            .collect();
        let rows: Vec<RowView> = snapshot
            .visible()
            .into_iter()
            .map(|(row_idx, row)| RowView {
                row_idx,
                marker: row.marker(),
                row_error: snapshot.error(row_idx, None),
                is_delete: row.control.is_delete,
                cells: columns
                    .iter()
                    .map(|column| CellView {
                        binding: column.binding.clone(),
                        value: row.domain.field(&column.binding).unwrap_or_default(),
                        error: snapshot.error(row_idx, Some(&column.binding)),
                    })
                    .collect(),
            })
            .collect();
        (headers, filters, rows, snapshot.current())
    };
    let editing_snapshot = editing_cell.read().clone();

    rsx! {
        div {
            id: GRID_SURFACE_ID,
            tabindex: "0",
            style: "outline: none; overflow: auto; max-height: 70vh;",
            onkeydown: move |event: KeyboardEvent| {
                if editing_cell.peek().is_some() {
                    return;
                }
                let key = event.key().to_string();
                if let Some(action) = GridAction::from_shortcut(&key, event.modifiers().ctrl()) {
                    event.prevent_default();
                    run_grid_action(grid, action, status);
                }
            },
            table {
                style: "border-collapse: collapse;",
                thead {
                    tr {
                        th { style: CELL_STYLE, "" }
                        for (header, is_required) in headers {
                            th {
                                style: CELL_STYLE,
                                if is_required { "{header} *" } else { "{header}" }
                            }
                        }
                    }
                    tr {
                        th { style: CELL_STYLE, "" }
                        for (header, binding, term) in filters {
                            th {
                                style: CELL_STYLE,
                                input {
                                    placeholder: "Filter {header}",
                                    value: term,
                                    onkeydown: move |event| event.stop_propagation(),
                                    oninput: move |event| {
                                        let result = grid.write().set_filter(&binding, &event.value());
                                        if let Err(err) = result {
                                            status.set(err.to_string());
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                tbody {
                    for row in rows {
                        {
                            let row_idx = row.row_idx;
                            let background = if current == Some(row_idx) { "#e8f0fe" } else { "#fff" };
                            let decoration = if row.is_delete { "line-through" } else { "none" };
                            let row_title = row.row_error.clone().unwrap_or_default();
                            rsx! {
                                tr {
                                    key: "{row_idx}",
                                    style: "background: {background}; text-decoration: {decoration};",
                                    td {
                                        style: "{CELL_STYLE} cursor: pointer; text-align: center; font-weight: bold;",
                                        title: "{row_title}",
                                        onclick: move |_| {
                                            let result = grid.write().set_current(row_idx);
                                            if let Err(err) = result {
                                                status.set(err.to_string());
                                            }
                                        },
                                        if row.row_error.is_some() { "{row.marker} !" } else { "{row.marker}" }
                                    }
                                    for cell in row.cells {
                                        {
                                            let is_editing = editing_snapshot
                                                .as_ref()
                                                .map(|key| key.row_idx == row_idx && key.binding == cell.binding)
                                                .unwrap_or(false);
                                            let style = if cell.error.is_some() { ERROR_CELL_STYLE } else { CELL_STYLE };
                                            let title = cell.error.clone().unwrap_or_default();
                                            if is_editing {
                                                rsx! {
                                                    td {
                                                        style: style,
                                                        input {
                                                            value: editing_value(),
                                                            autofocus: true,
                                                            oninput: move |event| editing_value.set(event.value()),
                                                            onblur: move |_| commit_cell(grid, editor, status),
                                                            onkeydown: move |event| {
                                                                event.stop_propagation();
                                                                match event.key() {
                                                                    Key::Enter => commit_cell(grid, editor, status),
                                                                    Key::Escape => editing_cell.set(None),
                                                                    _ => {}
                                                                }
                                                            }
                                                        }
                                                    }
                                                }
                                            } else {
                                                let CellView { binding, value, .. } = cell;
                                                let display = value.clone();
                                                rsx! {
                                                    td {
                                                        style: style,
                                                        title: "{title}",
                                                        onclick: move |_| {
                                                            let result = grid.write().set_current(row_idx);
                                                            if let Err(err) = result {
                                                                status.set(err.to_string());
                                                            }
                                                        },
                                                        ondoubleclick: move |_| {
                                                            editing_value.set(value.clone());
                                                            editing_cell.set(Some(CellKey {
                                                                row_idx,
                                                                binding: binding.clone(),
                                                            }));
                                                        },
                                                        "{display}"
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn reload_customers(
    query: &QueryService,
    mut grid: Signal<GridController<Customer>>,
    filter: &CustomerFilter,
    mut status: Signal<String>,
) {
    match run_blocking("load customers", || query.load_customers(filter)) {
        Ok(customers) => grid.write().load(customers),
        Err(err) => status.set(format!("Loading customers failed: {err}")),
    }
}

fn reload_controls(
    query: &QueryService,
    mut controls: Signal<Vec<Control>>,
    mut status: Signal<String>,
) {
    match run_blocking("load controls", || query.load_controls()) {
        Ok(loaded) => controls.set(loaded.into_iter().map(|entry| entry.control).collect()),
        Err(err) => status.set(format!("Loading controls failed: {err}")),
    }
}

fn open_control(
    query: &QueryService,
    code: &str,
    mut selected_control: Signal<Option<Control>>,
    mut details: Signal<GridController<ControlDetail>>,
    mut status: Signal<String>,
) {
    match run_blocking("load control details", || query.load_details(code)) {
        Ok(entry) => {
            selected_control.set(Some(entry.control));
            details.write().load(entry.details);
        }
        Err(RepoError::NotFound(message)) => {
            selected_control.set(None);
            details.write().load(Vec::new());
            show_error("Control not found", &message);
            status.set(message);
        }
        Err(err) => status.set(format!("Loading control details failed: {err}")),
    }
}

fn customer_filter(name: Signal<String>, code: Signal<String>) -> CustomerFilter {
    let non_blank = |value: String| (!value.trim().is_empty()).then_some(value);
    CustomerFilter {
        name: non_blank(name()),
        code: non_blank(code()),
    }
}

#[component]
pub fn App() -> Element {
    let config = use_hook(|| AppConfig::from_env().map_err(|err| format!("{err:#}")));
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            return rsx! {
                div {
                    p { "Unable to resolve the database path: {err}" }
                }
            };
        }
    };

    let AppState {
        mut page,
        mut busy,
        mut status,
        focus_requests,
        customers,
        customer_editor,
        mut customer_filter_name,
        mut customer_filter_code,
        controls,
        selected_control,
        details,
        detail_editor,
        mut show_new_control,
        mut new_control_code,
        mut new_control_name,
    } = AppState::new(config.grid.clone());

    let repo = use_hook(|| Arc::new(SqliteRepo::new(config.db_path.clone())) as Arc<dyn MasterRepository>);
    let query_service = use_hook(|| Rc::new(QueryService::new(repo.clone())));
    let edit_service = use_hook(|| Rc::new(EditService::new(repo.clone())));
    let customer_sync = use_hook(|| Rc::new(SyncService::new(repo.clone())));
    let detail_sync = use_hook(|| Rc::new(SyncService::new(repo.clone())));

    use_effect({
        let repo = repo.clone();
        let query = query_service.clone();
        move || {
            *busy.write() = true;
            match run_blocking("init database", || repo.init()) {
                Ok(()) => {
                    reload_customers(&query, customers, &CustomerFilter::default(), status);
                    reload_controls(&query, controls, status);
                }
                Err(err) => status.set(format!("Database initialization failed: {err}")),
            }
            *busy.write() = false;
        }
    });

    use_effect(move || {
        if focus_requests() == 0 {
            return;
        }
        let _ = document::eval(&format!(
            "document.getElementById('{GRID_SURFACE_ID}')?.focus();"
        ));
    });

    let current_page = page();
    let selected = selected_control();

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px;",
            div {
                style: "display: flex; gap: 8px; margin-bottom: 12px;",
                button {
                    style: BUTTON_STYLE,
                    disabled: current_page == Page::Customers,
                    onclick: move |_| page.set(Page::Customers),
                    "Customers"
                }
                button {
                    style: BUTTON_STYLE,
                    disabled: current_page == Page::Controls,
                    onclick: move |_| page.set(Page::Controls),
                    "Controls"
                }
                span { style: "margin-left: auto; color: #555;", "{status}" }
            }

            if current_page == Page::Customers {
                div {
                    style: "display: flex; gap: 8px; align-items: center;",
                    input {
                        placeholder: "Name",
                        value: customer_filter_name(),
                        oninput: move |event| customer_filter_name.set(event.value()),
                    }
                    input {
                        placeholder: "Code",
                        value: customer_filter_code(),
                        oninput: move |event| customer_filter_code.set(event.value()),
                    }
                    button {
                        style: BUTTON_STYLE,
                        disabled: busy(),
                        onclick: {
                            let query = query_service.clone();
                            move |_| {
                                if !confirm_discard(customers) {
                                    return;
                                }
                                let filter = customer_filter(customer_filter_name, customer_filter_code);
                                *busy.write() = true;
                                reload_customers(&query, customers, &filter, status);
                                *busy.write() = false;
                            }
                        },
                        "Search"
                    }
                    button {
                        style: BUTTON_STYLE,
                        disabled: busy(),
                        onclick: {
                            let query = query_service.clone();
                            let sync = customer_sync.clone();
                            move |_| {
                                *busy.write() = true;
                                let result = run_blocking("sync customers", || sync.sync_customers(&customers.read()));
                                match result {
                                    Ok(saved) if saved.is_empty() => status.set("No changes to save".to_string()),
                                    Ok(saved) => {
                                        let filter = customer_filter(customer_filter_name, customer_filter_code);
                                        reload_customers(&query, customers, &filter, status);
                                        status.set(format!("Saved {} change(s)", saved.len()));
                                    }
                                    Err(err) => {
                                        status.set(err.to_string());
                                        show_error("Save failed", &err.to_string());
                                    }
                                }
                                *busy.write() = false;
                            }
                        },
                        "Save"
                    }
                    button {
                        style: BUTTON_STYLE,
                        disabled: busy(),
                        onclick: {
                            let query = query_service.clone();
                            move |_| {
                                if !confirm_discard(customers) {
                                    return;
                                }
                                let filter = customer_filter(customer_filter_name, customer_filter_code);
                                reload_customers(&query, customers, &filter, status);
                            }
                        },
                        "Reset"
                    }
                }
                {grid_toolbar(customers, status, busy)}
                {grid_table(customers, customer_editor, status)}
            } else {
                div {
                    style: "display: flex; gap: 16px;",
                    div {
                        style: "min-width: 220px; display: flex; flex-direction: column; gap: 6px;",
                        button {
                            style: BUTTON_STYLE,
                            disabled: busy(),
                            onclick: move |_| {
                                new_control_code.set(String::new());
                                new_control_name.set(String::new());
                                show_new_control.set(true);
                            },
                            "New control"
                        }
                        for control in controls() {
                            {
                                let is_selected = selected.as_ref().map(|c| c.id) == Some(control.id);
                                let weight = if is_selected { "bold" } else { "normal" };
                                let query = query_service.clone();
                                let code = control.code.clone();
                                rsx! {
                                    button {
                                        key: "{control.id}",
                                        style: "{BUTTON_STYLE} text-align: left; font-weight: {weight};",
                                        disabled: busy(),
                                        onclick: move |_| {
                                            if !confirm_discard(details) {
                                                return;
                                            }
                                            open_control(&query, &code, selected_control, details, status);
                                        },
                                        "{control.code} · {control.name}"
                                    }
                                }
                            }
                        }
                    }
                    div {
                        style: "flex: 1;",
                        if let Some(control) = selected.clone() {
                            div {
                                style: "display: flex; gap: 8px; align-items: center;",
                                h3 { style: "margin: 0;", "{control.code} · {control.name}" }
                                button {
                                    style: BUTTON_STYLE,
                                    disabled: busy(),
                                    onclick: {
                                        let query = query_service.clone();
                                        let sync = detail_sync.clone();
                                        let control = control.clone();
                                        move |_| {
                                            *busy.write() = true;
                                            let result = run_blocking("sync control details", || {
                                                sync.sync_details(control.id, &details.read())
                                            });
                                            match result {
                                                Ok(saved) if saved.is_empty() => status.set("No changes to save".to_string()),
                                                Ok(saved) => {
                                                    open_control(&query, &control.code, selected_control, details, status);
                                                    status.set(format!("Saved {} change(s)", saved.len()));
                                                }
                                                Err(err) => {
                                                    status.set(err.to_string());
                                                    show_error("Save failed", &err.to_string());
                                                }
                                            }
                                            *busy.write() = false;
                                        }
                                    },
                                    "Save"
                                }
                            }
                            {grid_toolbar(details, status, busy)}
                            {grid_table(details, detail_editor, status)}
                        } else {
                            p { "Select a control to edit its details." }
                        }
                    }
                }
            }

            if show_new_control() {
                div {
                    style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1000;",
                    div {
                        style: "background: #fff; padding: 16px; border-radius: 8px; display: flex; flex-direction: column; gap: 8px; min-width: 280px;",
                        h3 { style: "margin: 0;", "New control" }
                        input {
                            placeholder: "Code",
                            value: new_control_code(),
                            oninput: move |event| new_control_code.set(event.value()),
                        }
                        input {
                            placeholder: "Name",
                            value: new_control_name(),
                            oninput: move |event| new_control_name.set(event.value()),
                        }
                        div {
                            style: "display: flex; gap: 8px; justify-content: flex-end;",
                            button {
                                style: BUTTON_STYLE,
                                onclick: move |_| show_new_control.set(false),
                                "Cancel"
                            }
                            button {
                                style: BUTTON_STYLE,
                                disabled: busy(),
                                onclick: {
                                    let query = query_service.clone();
                                    let edit = edit_service.clone();
                                    move |_| {
                                        let code = new_control_code();
                                        let name = new_control_name();
                                        match run_blocking("create control", || edit.create_control(&code, &name)) {
                                            Ok(control) => {
                                                show_new_control.set(false);
                                                reload_controls(&query, controls, status);
                                                if confirm_discard(details) {
                                                    open_control(&query, &control.code, selected_control, details, status);
                                                }
                                                status.set(format!("Created control {}", control.code));
                                            }
                                            Err(err) => {
                                                status.set(err.to_string());
                                                show_error("Create control failed", &err.to_string());
                                            }
                                        }
                                    }
                                },
                                "Create"
                            }
                        }
                    }
                }
            }
        }
    }
}
