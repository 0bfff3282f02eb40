use crate::domain::entities::column::ColumnDef;
use crate::domain::entities::row::{Record, Row};
use crate::domain::rules::{is_blank, required_message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub row_idx: usize,
    pub binding: String,
    pub message: String,
}

pub fn aggregate_message(count: usize) -> String {
    format!("There are {count} errors on this item.")
}

/// Evaluates column rules against records. Which rows are in scope is the
/// caller's business: the grid hands over its change set only.
pub struct Validator<'a, R> {
    columns: &'a [ColumnDef<R>],
}

impl<'a, R: Record> Validator<'a, R> {
    pub fn new(columns: &'a [ColumnDef<R>]) -> Self {
        Self { columns }
    }

    /// `Some(binding)` checks one column; `None` summarizes the whole record.
    pub fn error(&self, record: &R, binding: Option<&str>) -> Option<String> {
        match binding {
            Some(binding) => self
                .columns
                .iter()
                .find(|column| column.binding == binding)
                .and_then(|column| column_error(column, record)),
            None => {
                let mut errors = self
                    .columns
                    .iter()
                    .filter_map(|column| column_error(column, record))
                    .collect::<Vec<_>>();
                match errors.len() {
                    0 => None,
                    1 => errors.pop(),
                    count => Some(aggregate_message(count)),
                }
            }
        }
    }

    /// Every rule runs on every row; no early exit.
    pub fn validate<'r>(&self, rows: impl IntoIterator<Item = &'r Row<R>>) -> bool
    where
        R: 'r,
    {
        let mut valid = true;
        for row in rows {
            for column in self.columns {
                if column_error(column, &row.domain).is_some() {
                    valid = false;
                }
            }
        }
        valid
    }

    pub fn report<'r>(&self, rows: impl IntoIterator<Item = (usize, &'r Row<R>)>) -> Vec<FieldError>
    where
        R: 'r,
    {
        let mut errors = Vec::new();
        for (row_idx, row) in rows {
            for column in self.columns {
                if let Some(message) = column_error(column, &row.domain) {
                    errors.push(FieldError {
                        row_idx,
                        binding: column.binding.clone(),
                        message,
                    });
                }
            }
        }
        errors
    }
}

fn column_error<R: Record>(column: &ColumnDef<R>, record: &R) -> Option<String> {
    let value = record.field(&column.binding);
    if column.is_required && is_blank(value.as_deref()) {
        return Some(required_message(&column.header));
    }
    column.rule.and_then(|rule| rule(record, value.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::customer::{customer_columns, Customer};
    use crate::domain::rules::EMAIL_FORMAT_MESSAGE;

    fn customer(code: &str, name: &str, email: Option<&str>) -> Customer {
        Customer {
            code: code.to_string(),
            name: name.to_string(),
            email_address: email.map(str::to_string),
            ..Customer::default()
        }
    }

    #[test]
    fn single_failure_surfaces_its_own_message() {
        let columns = customer_columns();
        let validator = Validator::new(&columns);
        let record = customer("C001", "Acme", Some("a@b"));

        assert_eq!(
            validator.error(&record, Some("emailAddress")),
            Some(EMAIL_FORMAT_MESSAGE.to_string())
        );
        assert_eq!(
            validator.error(&record, None),
            Some(EMAIL_FORMAT_MESSAGE.to_string())
        );
        assert_eq!(validator.error(&record, Some("code")), None);
    }

    #[test]
    fn two_failures_collapse_into_a_count() {
        let columns = customer_columns();
        let validator = Validator::new(&columns);
        let record = customer("", "Acme", Some("not-an-email"));

        let summary = validator.error(&record, None);

        assert_eq!(summary, Some(aggregate_message(2)));
        assert_ne!(summary, Some(EMAIL_FORMAT_MESSAGE.to_string()));
    }

    #[test]
    fn clean_record_has_no_errors() {
        let columns = customer_columns();
        let validator = Validator::new(&columns);
        let record = customer("C001", "Acme", Some("a@b.co"));

        assert_eq!(validator.error(&record, None), None);
    }

    #[test]
    fn validate_scans_every_row_and_reports_all_failures() {
        let columns = customer_columns();
        let validator = Validator::new(&columns);
        let rows = vec![
            Row::pending(customer("", "", None)),
            Row::pending(customer("C2", "Beta", Some("b@c.de"))),
            Row::pending(customer("C3", "Gamma", Some("bad"))),
        ];

        assert!(!validator.validate(&rows));

        let report = validator.report(rows.iter().enumerate());
        let bindings = report
            .iter()
            .map(|err| (err.row_idx, err.binding.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            bindings,
            vec![(0, "code"), (0, "name"), (2, "emailAddress")]
        );
    }

    #[test]
    fn validate_of_nothing_is_true() {
        let columns = customer_columns();
        let validator = Validator::new(&columns);
        let rows: Vec<Row<Customer>> = Vec::new();

        assert!(validator.validate(&rows));
    }
}
