//! Discrete resolution events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use time::OffsetDateTime;

/// Kind of a [`DnsEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DnsEventType {
    ResolveStart,
    ResolverAttemptStart,
    ResolverAttemptSuccess,
    /// The resolver answered with zero addresses.
    ResolverAttemptEmpty,
    ResolverAttemptFailure,
    ResolveSuccess,
    ResolveFailure,
}

impl DnsEventType {
    pub const ALL: [DnsEventType; 7] = [
        DnsEventType::ResolveStart,
        DnsEventType::ResolverAttemptStart,
        DnsEventType::ResolverAttemptSuccess,
        DnsEventType::ResolverAttemptEmpty,
        DnsEventType::ResolverAttemptFailure,
        DnsEventType::ResolveSuccess,
        DnsEventType::ResolveFailure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DnsEventType::ResolveStart => "RESOLVE_START",
            DnsEventType::ResolverAttemptStart => "RESOLVER_ATTEMPT_START",
            DnsEventType::ResolverAttemptSuccess => "RESOLVER_ATTEMPT_SUCCESS",
            DnsEventType::ResolverAttemptEmpty => "RESOLVER_ATTEMPT_EMPTY",
            DnsEventType::ResolverAttemptFailure => "RESOLVER_ATTEMPT_FAILURE",
            DnsEventType::ResolveSuccess => "RESOLVE_SUCCESS",
            DnsEventType::ResolveFailure => "RESOLVE_FAILURE",
        }
    }

    /// Events that end a resolution.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DnsEventType::ResolveSuccess | DnsEventType::ResolveFailure)
    }
}

impl fmt::Display for DnsEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event in a resolution's stream.
///
/// Optional fields are filled according to the event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsEvent {
    pub event_type: DnsEventType,
    pub hostname: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub resolver_name: Option<String>,
    pub resolver_index: Option<usize>,
    pub duration_ms: Option<u64>,
    pub addresses: Option<Vec<IpAddr>>,
    pub error: Option<String>,
    pub resolver_count: Option<usize>,
}

impl DnsEvent {
    fn new(event_type: DnsEventType, hostname: &str) -> Self {
        Self {
            event_type,
            hostname: hostname.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            resolver_name: None,
            resolver_index: None,
            duration_ms: None,
            addresses: None,
            error: None,
            resolver_count: None,
        }
    }

    fn with_resolver(mut self, name: &str, index: usize) -> Self {
        self.resolver_name = Some(name.to_string());
        self.resolver_index = Some(index);
        self
    }

    pub fn resolve_start(hostname: &str, resolver_count: usize) -> Self {
        let mut event = Self::new(DnsEventType::ResolveStart, hostname);
        event.resolver_count = Some(resolver_count);
        event
    }

    pub fn attempt_start(hostname: &str, resolver: &str, index: usize) -> Self {
        Self::new(DnsEventType::ResolverAttemptStart, hostname).with_resolver(resolver, index)
    }

    pub fn attempt_success(
        hostname: &str,
        resolver: &str,
        index: usize,
        duration_ms: u64,
        addresses: &[IpAddr],
    ) -> Self {
        let mut event = Self::new(DnsEventType::ResolverAttemptSuccess, hostname)
            .with_resolver(resolver, index);
        event.duration_ms = Some(duration_ms);
        event.addresses = Some(addresses.to_vec());
        event
    }

    pub fn attempt_empty(hostname: &str, resolver: &str, index: usize, duration_ms: u64) -> Self {
        let mut event =
            Self::new(DnsEventType::ResolverAttemptEmpty, hostname).with_resolver(resolver, index);
        event.duration_ms = Some(duration_ms);
        event.addresses = Some(Vec::new());
        event
    }

    pub fn attempt_failure(
        hostname: &str,
        resolver: &str,
        index: usize,
        duration_ms: u64,
        error: &str,
    ) -> Self {
        let mut event = Self::new(DnsEventType::ResolverAttemptFailure, hostname)
            .with_resolver(resolver, index);
        event.duration_ms = Some(duration_ms);
        event.error = Some(error.to_string());
        event
    }

    pub fn resolve_success(
        hostname: &str,
        resolver: &str,
        duration_ms: u64,
        addresses: &[IpAddr],
    ) -> Self {
        let mut event = Self::new(DnsEventType::ResolveSuccess, hostname);
        event.resolver_name = Some(resolver.to_string());
        event.duration_ms = Some(duration_ms);
        event.addresses = Some(addresses.to_vec());
        event
    }

    pub fn resolve_failure(
        hostname: &str,
        duration_ms: u64,
        error: &str,
        resolver_count: usize,
    ) -> Self {
        let mut event = Self::new(DnsEventType::ResolveFailure, hostname);
        event.duration_ms = Some(duration_ms);
        event.error = Some(error.to_string());
        event.resolver_count = Some(resolver_count);
        event
    }
}
