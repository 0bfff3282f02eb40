use crate::domain::entities::column::ColumnDef;
use crate::domain::entities::row::{Record, RecordId, Stored, UnknownBinding};

/// Parent master record; its details are edited in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: RecordId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewControl {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlDetail {
    pub code: String,
    pub name: String,
}

impl Record for ControlDetail {
    fn field(&self, binding: &str) -> Option<String> {
        match binding {
            "code" => Some(self.code.clone()),
            "name" => Some(self.name.clone()),
            _ => None,
        }
    }

    fn set_field(&mut self, binding: &str, value: Option<String>) -> Result<(), UnknownBinding> {
        match binding {
            "code" => self.code = value.unwrap_or_default(),
            "name" => self.name = value.unwrap_or_default(),
            _ => return Err(UnknownBinding(binding.to_string())),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlWithDetails {
    pub control: Control,
    pub details: Vec<Stored<ControlDetail>>,
}

pub fn detail_columns() -> Vec<ColumnDef<ControlDetail>> {
    vec![
        ColumnDef::new("Code", "code").required(),
        ColumnDef::new("Name", "name").required(),
    ]
}
