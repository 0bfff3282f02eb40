pub mod entities;
pub mod rules;
pub mod validation;
