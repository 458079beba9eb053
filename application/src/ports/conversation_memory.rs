//! Conversation memory port.

use taskpilot_domain::Message;

/// Per-plan conversation history.
///
/// Holds only persistable messages; system prompts and environment
/// snapshots are rebuilt for every think and never stored.
pub trait ConversationMemory: Send + Sync {
    fn append(&self, plan_id: &str, message: Message);

    fn clear(&self, plan_id: &str);

    fn get(&self, plan_id: &str) -> Vec<Message>;
}
