//! Conversation and LLM response types

pub mod entities;
pub mod response;
pub mod stream;
