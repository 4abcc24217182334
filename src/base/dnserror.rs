use std::{fmt, io, sync::Arc};
use thiserror::Error;

/// Failure of a single resolver attempt.
///
/// The cascade recovers from these locally; they only reach the caller
/// wrapped in [`AllResolversFailed`].
#[derive(Debug, Error, Clone)]
pub enum ResolveError {
    #[error("Resolution timed out")]
    TimedOut,
    #[error("Connection to resolver failed: {0}")]
    ConnectionFailed(String),
    #[error("Name not resolved: {hostname}")]
    NameNotResolved {
        hostname: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("No addresses returned for {hostname}")]
    NoAddresses { hostname: String },
    #[error("Lookup failed for {hostname}: {message}")]
    Lookup { hostname: String, message: String },
    #[error("Resolution task failed: {0}")]
    TaskFailed(String),
}

impl ResolveError {
    pub fn name_not_resolved(hostname: impl Into<String>, source: io::Error) -> Self {
        ResolveError::NameNotResolved {
            hostname: hostname.into(),
            source: Arc::new(source),
        }
    }

    pub fn no_addresses(hostname: impl Into<String>) -> Self {
        ResolveError::NoAddresses {
            hostname: hostname.into(),
        }
    }

    pub fn lookup(hostname: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::Lookup {
            hostname: hostname.into(),
            message: message.into(),
        }
    }

    /// True when the resolver answered but had nothing usable.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ResolveError::NoAddresses { .. })
    }
}

/// One failed attempt inside a cascade, in attempt order.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    pub resolver: String,
    pub error: ResolveError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.resolver, self.error)
    }
}

/// Terminal failure: every resolver in the cascade failed or came back empty.
#[derive(Debug, Clone)]
pub struct AllResolversFailed {
    pub hostname: String,
    pub failures: Vec<AttemptFailure>,
}

impl AllResolversFailed {
    pub fn new(hostname: impl Into<String>, failures: Vec<AttemptFailure>) -> Self {
        Self {
            hostname: hostname.into(),
            failures,
        }
    }

    /// Underlying errors in the order the resolvers were attempted.
    pub fn errors(&self) -> impl Iterator<Item = &ResolveError> {
        self.failures.iter().map(|f| &f.error)
    }

    /// Resolver names in attempt order.
    pub fn resolvers(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.resolver.as_str())
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AllResolversFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "No resolvers configured for {}", self.hostname);
        }
        write!(
            f,
            "All {} resolvers failed for {}",
            self.failures.len(),
            self.hostname
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { " [" } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for AllResolversFailed {}

/// Invalid resolver or provider configuration. Raised eagerly at build time.
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Resolver name/instance count mismatch: {names} names, {resolvers} resolvers")]
    LengthMismatch { names: usize, resolvers: usize },
    #[error("Duplicate resolver name: {0}")]
    DuplicateName(String),
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
    #[error("Invalid provider URL for {provider}: {reason}")]
    InvalidProviderUrl { provider: String, reason: String },
    #[error("Invalid provider settings for {provider}: {reason}")]
    InvalidProvider { provider: String, reason: String },
    #[error("Provider {0} has no bootstrap addresses")]
    MissingBootstrap(String),
    #[error("Config parse error: {0}")]
    Parse(String),
    #[error("Config IO error: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Errors surfaced to callers of the cascade and the resolver manager.
#[derive(Debug, Error, Clone)]
pub enum DnsError {
    #[error(transparent)]
    AllResolversFailed(#[from] AllResolversFailed),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DnsError {
    /// The aggregated attempt failures, if this is a resolution failure.
    pub fn attempt_failures(&self) -> Option<&AllResolversFailed> {
        match self {
            DnsError::AllResolversFailed(e) => Some(e),
            DnsError::Config(_) => None,
        }
    }
}
