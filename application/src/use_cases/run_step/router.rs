//! Single vs. parallel dispatch decision.

use taskpilot_domain::ToolCallRequest;

/// How an act phase dispatches the proposed calls.
#[derive(Debug, PartialEq, Eq)]
pub enum ToolRoute<'a> {
    Empty,
    Single(&'a ToolCallRequest),
    Multi(&'a [ToolCallRequest]),
}

pub fn route(calls: &[ToolCallRequest]) -> ToolRoute<'_> {
    match calls {
        [] => ToolRoute::Empty,
        [call] => ToolRoute::Single(call),
        calls => ToolRoute::Multi(calls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str) -> ToolCallRequest {
        ToolCallRequest::new(format!("id-{name}"), name, "{}")
    }

    #[test]
    fn test_route_empty() {
        assert_eq!(route(&[]), ToolRoute::Empty);
    }

    #[test]
    fn test_route_single() {
        let calls = vec![call("a")];
        assert_eq!(route(&calls), ToolRoute::Single(&calls[0]));
    }

    #[test]
    fn test_route_multi() {
        let calls = vec![call("a"), call("b"), call("c")];
        match route(&calls) {
            ToolRoute::Multi(batch) => assert_eq!(batch.len(), 3),
            other => panic!("expected Multi, got {other:?}"),
        }
    }
}
