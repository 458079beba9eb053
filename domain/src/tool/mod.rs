//! Tool domain: definitions, capability tags, calls and results

pub mod context;
pub mod entities;
pub mod value_objects;
