//! Client configuration read from the environment.

use tracing::warn;

use crate::transport::TransportKind;

/// Agent name sent when none is configured.
pub const DEFAULT_AGENT: &str = concat!("Restlet-Rust/", env!("CARGO_PKG_VERSION"));

/// Selects the default binding: `http` or `host`.
pub const TRANSPORT_ENV: &str = "RESTLET_TRANSPORT";

/// Overrides the `User-Agent` sent by clients.
pub const USER_AGENT_ENV: &str = "RESTLET_USER_AGENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Forced binding kind; `None` lets the target decide.
    pub transport: Option<TransportKind>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: None,
            user_agent: DEFAULT_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unknown transport names are ignored with a
    /// warning; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = value(TRANSPORT_ENV) {
            config.transport = TransportKind::from_name(&name);
            if config.transport.is_none() {
                warn!(value = %name, "unknown {TRANSPORT_ENV}, probing the default binding");
            }
        }
        if let Some(agent) = value(USER_AGENT_ENV) {
            config.user_agent = agent;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert!(config.user_agent.starts_with("Restlet-Rust/"));
    }

    #[test]
    fn reads_transport_and_agent() {
        let config = ClientConfig::from_lookup(lookup(&[
            (TRANSPORT_ENV, "host"),
            (USER_AGENT_ENV, "contacts-app/2.0"),
        ]));
        assert_eq!(config.transport, Some(TransportKind::Host));
        assert_eq!(config.user_agent, "contacts-app/2.0");
    }

    #[test]
    #[traced_test]
    fn unknown_transport_is_ignored() {
        let config =
            ClientConfig::from_lookup(lookup(&[(TRANSPORT_ENV, "xhr"), (USER_AGENT_ENV, " ")]));
        assert_eq!(config.transport, None);
        assert_eq!(config.user_agent, DEFAULT_AGENT);
        assert!(logs_contain("unknown RESTLET_TRANSPORT"));
    }
}
