//! Process-local conversation memory keyed by plan id.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use taskpilot_application::ConversationMemory;
use taskpilot_domain::Message;
use tracing::{debug, warn};

/// Default number of messages kept per plan.
pub const DEFAULT_MAX_MESSAGES: usize = 1000;

/// In-memory [`ConversationMemory`] with a per-plan message cap.
///
/// When a plan exceeds the cap, its oldest messages are dropped.
pub struct InMemoryConversationMemory {
    plans: RwLock<HashMap<String, VecDeque<Message>>>,
    max_messages: usize,
}

impl Default for InMemoryConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl InMemoryConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
            max_messages: max_messages.max(1),
        }
    }

    /// Plan ids that currently hold messages.
    pub fn plan_ids(&self) -> Vec<String> {
        match self.plans.read() {
            Ok(plans) => {
                let mut ids: Vec<String> = plans.keys().cloned().collect();
                ids.sort();
                ids
            }
            Err(_) => Vec::new(),
        }
    }
}

impl ConversationMemory for InMemoryConversationMemory {
    fn append(&self, plan_id: &str, message: Message) {
        let Ok(mut plans) = self.plans.write() else {
            warn!("Conversation memory lock poisoned; dropping message for {}", plan_id);
            return;
        };
        let messages = plans.entry(plan_id.to_string()).or_default();
        messages.push_back(message);
        while messages.len() > self.max_messages {
            messages.pop_front();
            debug!("Memory of plan {} trimmed to {}", plan_id, self.max_messages);
        }
    }

    fn clear(&self, plan_id: &str) {
        if let Ok(mut plans) = self.plans.write() {
            plans.remove(plan_id);
        }
    }

    fn get(&self, plan_id: &str) -> Vec<Message> {
        self.plans
            .read()
            .ok()
            .and_then(|plans| plans.get(plan_id).map(|m| m.iter().cloned().collect()))
            .unwrap_or_default()
    }
}
