//! Command implementations.

pub mod give;
pub mod help;
