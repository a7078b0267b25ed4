//! Database adapter capability set.
//!
//! The probe never talks to a database. It only asks an adapter two things:
//! what kind of storage it binds to, and whether its client session says it
//! is connected right now. Driver crates implement [`Adapter`] and
//! [`Session`] over their own client types.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

// ── AdapterKind ───────────────────────────────────────────────────────────────

/// The storage technology an adapter binds a service to.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum AdapterKind {
    Mongo,
    Postgres,
    Redis,
    Memory,
    Custom(String),
}

impl AdapterKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mongo     => "mongo",
            Self::Postgres  => "postgres",
            Self::Redis     => "redis",
            Self::Memory    => "memory",
            Self::Custom(s) => s.as_str(),
        }
    }
}

/// Case-insensitive. Unknown names become [`AdapterKind::Custom`].
impl FromStr for AdapterKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb"        => Self::Mongo,
            "postgres" | "postgresql"  => Self::Postgres,
            "redis"                    => Self::Redis,
            "memory"                   => Self::Memory,
            other                      => Self::Custom(other.to_owned()),
        })
    }
}

impl From<String> for AdapterKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Adapter / Session ─────────────────────────────────────────────────────────

/// Failure to reach an adapter's client session.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AdapterError {
    #[error("adapter has no client")]
    NoClient,
    #[error("session unavailable: {0}")]
    Session(String),
}

/// A service's binding to a storage backend.
///
/// Implementations must keep every method a cheap local read. The probe is
/// called on each `/live` poll and does not await anything.
pub trait Adapter: Send + Sync {
    /// The concrete storage technology.
    fn kind(&self) -> AdapterKind;

    /// Name of the service the adapter reports as its owner.
    ///
    /// Only consulted by [`AdapterMatch::ServiceName`].
    fn service_name(&self) -> Option<&str> {
        None
    }

    /// Resolves the underlying client session.
    fn session(&self) -> Result<&dyn Session, AdapterError>;
}

/// The client/session object behind an adapter.
pub trait Session: Send + Sync {
    /// Whether the session's connection to the backing store is up.
    fn is_connected(&self) -> bool;
}

// ── AdapterMatch ──────────────────────────────────────────────────────────────

/// Selects which adapters a checker is scoped to.
///
/// `Kind` compares the adapter's [`AdapterKind`]. `ServiceName` is the older
/// marker-based selection: it matches adapters whose
/// [`service_name`](Adapter::service_name) equals the identifier, whatever
/// their kind. Prefer `Kind`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AdapterMatch {
    Kind(AdapterKind),
    ServiceName(String),
}

impl AdapterMatch {
    pub fn matches(&self, adapter: &dyn Adapter) -> bool {
        match self {
            Self::Kind(kind) => adapter.kind() == *kind,
            Self::ServiceName(name) => adapter.service_name() == Some(name.as_str()),
        }
    }
}

impl Default for AdapterMatch {
    fn default() -> Self {
        Self::Kind(AdapterKind::Mongo)
    }
}

impl fmt::Display for AdapterMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => write!(f, "kind={kind}"),
            Self::ServiceName(name) => write!(f, "service_name={name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(AdapterKind, Option<&'static str>);

    impl Adapter for Named {
        fn kind(&self) -> AdapterKind { self.0.clone() }
        fn service_name(&self) -> Option<&str> { self.1 }
        fn session(&self) -> Result<&dyn Session, AdapterError> { Err(AdapterError::NoClient) }
    }

    #[test]
    fn kind_parses_aliases_and_custom_names() {
        assert_eq!("MongoDB".parse::<AdapterKind>().unwrap(), AdapterKind::Mongo);
        assert_eq!("postgresql".parse::<AdapterKind>().unwrap(), AdapterKind::Postgres);
        assert_eq!(
            "Cassandra".parse::<AdapterKind>().unwrap(),
            AdapterKind::Custom("cassandra".into())
        );
        assert_eq!(AdapterKind::Custom("cassandra".into()).to_string(), "cassandra");
    }

    #[test]
    fn kind_match_ignores_service_name() {
        let m = AdapterMatch::default();
        assert!(m.matches(&Named(AdapterKind::Mongo, None)));
        assert!(!m.matches(&Named(AdapterKind::Redis, Some("adapterMongo"))));
    }

    #[test]
    fn service_name_match_ignores_kind() {
        let m = AdapterMatch::ServiceName("adapterMongo".into());
        assert!(m.matches(&Named(AdapterKind::Custom("lookalike".into()), Some("adapterMongo"))));
        assert!(!m.matches(&Named(AdapterKind::Mongo, None)));
        assert!(!m.matches(&Named(AdapterKind::Mongo, Some("adapterFake"))));
    }
}
