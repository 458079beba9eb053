//! Terminal answers for forms the agent is waiting on

pub mod prompt;
