//! Run result formatting

pub mod console;
pub mod formatter;
