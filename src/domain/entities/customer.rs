use crate::domain::entities::column::ColumnDef;
use crate::domain::entities::row::{Record, UnknownBinding};
use crate::domain::rules;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
}

impl Record for Customer {
    fn field(&self, binding: &str) -> Option<String> {
        match binding {
            "code" => Some(self.code.clone()),
            "name" => Some(self.name.clone()),
            "address" => self.address.clone(),
            "phoneNumber" => self.phone_number.clone(),
            "emailAddress" => self.email_address.clone(),
            _ => None,
        }
    }

    fn set_field(&mut self, binding: &str, value: Option<String>) -> Result<(), UnknownBinding> {
        match binding {
            "code" => self.code = value.unwrap_or_default(),
            "name" => self.name = value.unwrap_or_default(),
            "address" => self.address = non_empty(value),
            "phoneNumber" => self.phone_number = non_empty(value),
            "emailAddress" => self.email_address = non_empty(value),
            _ => return Err(UnknownBinding(binding.to_string())),
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Substring filters for the customer list; both are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub code: Option<String>,
}

pub fn customer_columns() -> Vec<ColumnDef<Customer>> {
    vec![
        ColumnDef::new("Code", "code").required(),
        ColumnDef::new("Name", "name").required(),
        ColumnDef::new("Address", "address"),
        ColumnDef::new("Phone", "phoneNumber"),
        ColumnDef::new("Email", "emailAddress").with_rule(rules::email),
    ]
}
