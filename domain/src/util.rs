//! Identifier generation.

use uuid::Uuid;

/// Correlation id shared by every tool call of one act phase.
pub fn new_tool_call_id() -> String {
    format!("toolcall-{}", Uuid::new_v4())
}

/// Id of one recorded think/act pair.
pub fn new_think_act_id() -> String {
    format!("think-act-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_tool_call_id();
        let b = new_tool_call_id();
        assert!(a.starts_with("toolcall-"));
        assert_ne!(a, b);
        assert!(new_think_act_id().starts_with("think-act-"));
    }
}
