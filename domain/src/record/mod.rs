//! Execution history records

pub mod entities;
