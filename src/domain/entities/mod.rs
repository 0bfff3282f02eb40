pub mod column;
pub mod control;
pub mod customer;
pub mod edit;
pub mod filter;
pub mod row;
