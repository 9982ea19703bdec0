//! Capability inference and merging.
//!
//! Capabilities advertised at the handshake are derived from the set of
//! registered handlers, then merged with explicit overrides. The override
//! wins field by field where it is present; `experimental` is always taken
//! from the override, never inferred. Advertising a capability without a
//! matching handler is tolerated (useful in tests and for forward
//! compatibility) but logged.

use tracing::{debug, warn};

use embermcp_protocol::methods;
use embermcp_protocol::types::{
    ClientCapabilities, CompletionsCapabilities, ElicitationCapabilities, LoggingCapabilities,
    PromptsCapabilities, ResourcesCapabilities, RootsCapabilities, SamplingCapabilities,
    ServerCapabilities, TasksCapabilities, ToolsCapabilities,
};

use crate::registry::HandlerRegistry;

/// Derive server capabilities from the registered request handlers.
pub(crate) fn infer_server(registry: &HandlerRegistry) -> ServerCapabilities {
    ServerCapabilities {
        experimental: None,
        logging: registry
            .has_request(methods::SET_LOGGING_LEVEL)
            .then(LoggingCapabilities::default),
        completions: registry
            .has_request(methods::COMPLETE)
            .then(CompletionsCapabilities::default),
        prompts: registry
            .has_request(methods::LIST_PROMPTS)
            .then(PromptsCapabilities::default),
        resources: (registry.has_request(methods::LIST_RESOURCES)
            || registry.has_request(methods::READ_RESOURCE))
        .then(ResourcesCapabilities::default),
        tools: registry
            .has_request(methods::LIST_TOOLS)
            .then(ToolsCapabilities::default),
    }
}

/// Derive client capabilities from the registered request handlers.
pub(crate) fn infer_client(registry: &HandlerRegistry) -> ClientCapabilities {
    ClientCapabilities {
        experimental: None,
        roots: registry
            .has_request(methods::LIST_ROOTS)
            .then(RootsCapabilities::default),
        sampling: registry
            .has_request(methods::CREATE_MESSAGE)
            .then(SamplingCapabilities::default),
        elicitation: registry
            .has_request(methods::ELICIT)
            .then(ElicitationCapabilities::default),
        tasks: registry
            .has_request(methods::LIST_TASKS)
            .then(TasksCapabilities::default),
    }
}

/// Merge inferred server capabilities with explicit overrides.
pub(crate) fn merge_server(
    inferred: ServerCapabilities,
    explicit: Option<ServerCapabilities>,
) -> ServerCapabilities {
    let Some(explicit) = explicit else {
        return inferred;
    };
    ServerCapabilities {
        // Experimental flags cannot be inferred from handlers.
        experimental: explicit.experimental,
        logging: explicit.logging.or(inferred.logging),
        completions: explicit.completions.or(inferred.completions),
        prompts: explicit.prompts.or(inferred.prompts),
        resources: explicit.resources.or(inferred.resources),
        tools: explicit.tools.or(inferred.tools),
    }
}

/// Merge inferred client capabilities with explicit overrides.
pub(crate) fn merge_client(
    inferred: ClientCapabilities,
    explicit: Option<ClientCapabilities>,
) -> ClientCapabilities {
    let Some(explicit) = explicit else {
        return inferred;
    };
    ClientCapabilities {
        experimental: explicit.experimental,
        roots: explicit.roots.or(inferred.roots),
        sampling: explicit.sampling.or(inferred.sampling),
        elicitation: explicit.elicitation.or(inferred.elicitation),
        tasks: explicit.tasks.or(inferred.tasks),
    }
}

/// Log mismatches between advertised server capabilities and handlers.
pub(crate) fn audit_server(advertised: &ServerCapabilities, registry: &HandlerRegistry) {
    let checks: [(&str, bool, &str); 5] = [
        ("tools", advertised.tools.is_some(), methods::LIST_TOOLS),
        ("prompts", advertised.prompts.is_some(), methods::LIST_PROMPTS),
        (
            "resources",
            advertised.resources.is_some(),
            methods::LIST_RESOURCES,
        ),
        (
            "logging",
            advertised.logging.is_some(),
            methods::SET_LOGGING_LEVEL,
        ),
        (
            "completions",
            advertised.completions.is_some(),
            methods::COMPLETE,
        ),
    ];
    for (capability, advertised, method) in checks {
        audit_entry(capability, advertised, registry.has_request(method));
    }
}

/// Log mismatches between advertised client capabilities and handlers.
pub(crate) fn audit_client(advertised: &ClientCapabilities, registry: &HandlerRegistry) {
    let checks: [(&str, bool, &str); 4] = [
        ("roots", advertised.roots.is_some(), methods::LIST_ROOTS),
        (
            "sampling",
            advertised.sampling.is_some(),
            methods::CREATE_MESSAGE,
        ),
        (
            "elicitation",
            advertised.elicitation.is_some(),
            methods::ELICIT,
        ),
        ("tasks", advertised.tasks.is_some(), methods::LIST_TASKS),
    ];
    for (capability, advertised, method) in checks {
        audit_entry(capability, advertised, registry.has_request(method));
    }
}

fn audit_entry(capability: &str, advertised: bool, handled: bool) {
    if advertised && !handled {
        warn!(capability, "capability advertised without a registered handler");
    } else if handled && !advertised {
        debug!(capability, "handler registered for a capability that is not advertised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;

    fn registry_with(methods: &[&str]) -> HandlerRegistry {
        let mut registry = HandlerRegistry::default();
        for method in methods {
            registry.on_request(*method, |_params, _ctx| async { Ok(Value::Null) });
        }
        registry
    }

    #[test]
    fn test_server_inference() {
        let caps = infer_server(&registry_with(&[methods::LIST_TOOLS, methods::READ_RESOURCE]));
        assert!(caps.tools.is_some());
        assert!(caps.resources.is_some());
        assert!(caps.prompts.is_none());
        assert!(caps.logging.is_none());
    }

    #[test]
    fn test_client_inference() {
        let caps = infer_client(&registry_with(&[methods::CREATE_MESSAGE]));
        assert!(caps.sampling.is_some());
        assert!(caps.roots.is_none());
        assert!(caps.elicitation.is_none());
    }

    #[test]
    fn test_merge_explicit_wins_per_field() {
        let inferred = infer_server(&registry_with(&[methods::LIST_TOOLS]));
        let explicit = ServerCapabilities {
            prompts: Some(PromptsCapabilities {
                list_changed: Some(true),
            }),
            ..Default::default()
        };
        let merged = merge_server(inferred, Some(explicit));
        // Explicit prompts kept, inferred tools preserved.
        assert_eq!(merged.prompts.unwrap().list_changed, Some(true));
        assert!(merged.tools.is_some());
    }

    #[test]
    fn test_merge_experimental_always_explicit() {
        let explicit = ServerCapabilities {
            experimental: Some(HashMap::from([(
                "x-trace".to_string(),
                Value::Bool(true),
            )])),
            ..Default::default()
        };
        let merged = merge_server(ServerCapabilities::default(), Some(explicit));
        assert!(merged.experimental.unwrap().contains_key("x-trace"));

        // No override at all means no experimental flags either.
        let merged = merge_server(ServerCapabilities::default(), None);
        assert!(merged.experimental.is_none());
    }
}
