/// Per-column check: receives the whole record and the raw cell value and
/// returns a message when the value is rejected.
pub type Rule<R> = fn(&R, Option<&str>) -> Option<String>;

pub struct ColumnDef<R> {
    pub header: String,
    pub binding: String,
    pub is_required: bool,
    pub rule: Option<Rule<R>>,
}

impl<R> ColumnDef<R> {
    pub fn new(header: impl Into<String>, binding: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            binding: binding.into(),
            is_required: false,
            rule: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_rule(mut self, rule: Rule<R>) -> Self {
        self.rule = Some(rule);
        self
    }
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            binding: self.binding.clone(),
            is_required: self.is_required,
            rule: self.rule,
        }
    }
}

impl<R> std::fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("header", &self.header)
            .field("binding", &self.binding)
            .field("is_required", &self.is_required)
            .field("has_rule", &self.rule.is_some())
            .finish()
    }
}
