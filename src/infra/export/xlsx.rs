use std::path::Path;

use anyhow::{anyhow, Context, Result};

const SHEET_NAME: &str = "Sheet1";

/// Writes a header row followed by `rows` to a fresh workbook at `path`.
pub fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
        }
    }

    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut(SHEET_NAME)
        .ok_or_else(|| anyhow!("sheet '{SHEET_NAME}' not found in new workbook"))?;

    for (col_idx, header) in headers.iter().enumerate() {
        sheet
            .get_cell_mut((col_idx as u32 + 1, 1))
            .set_value_string(header.clone());
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet
                .get_cell_mut((col_idx as u32 + 1, row_idx as u32 + 2))
                .set_value_string(value.clone());
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .with_context(|| format!("failed to write xlsx: {}", path.display()))?;
    Ok(())
}
