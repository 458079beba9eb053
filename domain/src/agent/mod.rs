//! Agent step entities and value objects

pub mod form;
pub mod profile;
pub mod retry;
pub mod state;
pub mod step;
