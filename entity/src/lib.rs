//! Relational entities. One module per table.

pub mod employees;
