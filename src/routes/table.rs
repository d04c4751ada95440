//! Static route table.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Path parameters are substituted verbatim into upstream templates;
//!   validation is the upstream's job
//! - Unrecognized requests fall through to a catch-all that forwards the
//!   original path unchanged

use axum::extract::RawPathParams;
use axum::http::Method;

/// One inbound route and the upstream path it resolves to.
#[derive(Debug)]
pub struct RouteEntry {
    pub method: Method,
    /// Inbound path pattern in axum syntax.
    pub inbound: &'static str,
    /// Upstream path template; `{name}` placeholders are filled from the
    /// inbound path parameters.
    pub upstream: &'static str,
}

/// Every proxied route. The health endpoint and the landing page are
/// registered separately and never reach the core.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    RouteEntry {
        method: Method::POST,
        inbound: "/api/memories",
        upstream: "/memories",
    },
    RouteEntry {
        method: Method::DELETE,
        inbound: "/api/memories",
        upstream: "/memories",
    },
    RouteEntry {
        method: Method::POST,
        inbound: "/api/memories/search",
        upstream: "/memories/search",
    },
    RouteEntry {
        method: Method::POST,
        inbound: "/api/memories/episodic",
        upstream: "/memories/episodic",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/sessions",
        upstream: "/sessions",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/users/{userId}/sessions",
        upstream: "/users/{userId}/sessions",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/groups/{groupId}/sessions",
        upstream: "/groups/{groupId}/sessions",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/agents/{agentId}/sessions",
        upstream: "/agents/{agentId}/sessions",
    },
    RouteEntry {
        method: Method::POST,
        inbound: "/api/mcp/add_session_memory",
        upstream: "/mcp/add_session_memory",
    },
    RouteEntry {
        method: Method::POST,
        inbound: "/api/mcp/search_session_memory",
        upstream: "/mcp/search_session_memory",
    },
    RouteEntry {
        method: Method::POST,
        inbound: "/api/mcp/delete_session_data",
        upstream: "/mcp/delete_session_data",
    },
    RouteEntry {
        method: Method::POST,
        inbound: "/api/mcp/delete_data",
        upstream: "/mcp/delete_data",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/mcp/sessions",
        upstream: "/mcp/sessions",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/mcp/users/{userId}/sessions",
        upstream: "/mcp/users/{userId}/sessions",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/mcp/groups/{groupId}/sessions",
        upstream: "/mcp/groups/{groupId}/sessions",
    },
    RouteEntry {
        method: Method::GET,
        inbound: "/api/mcp/agents/{agentId}/sessions",
        upstream: "/mcp/agents/{agentId}/sessions",
    },
];

/// Fill a `{name}` template with the decoded inbound path parameters.
pub fn fill_template(template: &str, params: &RawPathParams) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(&format!("{{{name}}}"), value);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_all_documented_routes() {
        assert_eq!(ROUTE_TABLE.len(), 16);
        assert_eq!(
            ROUTE_TABLE
                .iter()
                .filter(|e| e.inbound.starts_with("/api/mcp/"))
                .count(),
            8
        );
    }

    #[test]
    fn memories_path_supports_post_and_delete() {
        let methods: Vec<_> = ROUTE_TABLE
            .iter()
            .filter(|e| e.inbound == "/api/memories")
            .map(|e| e.method.clone())
            .collect();
        assert!(methods.contains(&Method::POST));
        assert!(methods.contains(&Method::DELETE));
    }

    #[test]
    fn every_placeholder_appears_in_the_inbound_pattern() {
        for entry in ROUTE_TABLE {
            let mut rest = entry.upstream;
            while let Some(start) = rest.find('{') {
                let end = rest[start..].find('}').map(|i| start + i).unwrap();
                let placeholder = &rest[start..=end];
                assert!(
                    entry.inbound.contains(placeholder),
                    "{} missing {placeholder}",
                    entry.inbound
                );
                rest = &rest[end + 1..];
            }
        }
    }
}
