//! Per-resolution attempt records and summaries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use time::OffsetDateTime;

/// Outcome of one resolver attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success(Vec<IpAddr>),
    /// The resolver answered, but with zero addresses.
    Empty,
    Failure(String),
}

impl AttemptOutcome {
    /// Whether the resolver call itself succeeded (an empty answer counts).
    pub fn responded(&self) -> bool {
        !matches!(self, AttemptOutcome::Failure(_))
    }
}

/// One resolver attempt inside a cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub resolver_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    pub duration_ms: u64,
    pub outcome: AttemptOutcome,
}

/// Everything one cascade run produced. Built once, then read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub hostname: String,
    pub success: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    pub total_duration_ms: u64,
    pub used_resolver: Option<String>,
    pub addresses: Option<Vec<IpAddr>>,
    pub error: Option<String>,
    pub attempted_resolvers: Vec<String>,
    pub per_resolver_duration: HashMap<String, u64>,
    pub per_resolver_result: HashMap<String, bool>,
    pub attempts: Vec<AttemptRecord>,
}

impl ResolutionSummary {
    /// Folds attempt records into a summary.
    pub fn from_attempts(
        hostname: &str,
        started_at: OffsetDateTime,
        total_duration_ms: u64,
        attempts: Vec<AttemptRecord>,
        error: Option<String>,
    ) -> Self {
        let mut per_resolver_duration = HashMap::with_capacity(attempts.len());
        let mut per_resolver_result = HashMap::with_capacity(attempts.len());
        let mut attempted_resolvers = Vec::with_capacity(attempts.len());
        let mut used_resolver = None;
        let mut addresses = None;

        for attempt in &attempts {
            attempted_resolvers.push(attempt.resolver_name.clone());
            per_resolver_duration.insert(attempt.resolver_name.clone(), attempt.duration_ms);
            per_resolver_result.insert(attempt.resolver_name.clone(), attempt.outcome.responded());
            if let AttemptOutcome::Success(addrs) = &attempt.outcome {
                used_resolver = Some(attempt.resolver_name.clone());
                addresses = Some(addrs.clone());
            }
        }

        Self {
            hostname: hostname.to_string(),
            success: used_resolver.is_some(),
            started_at,
            total_duration_ms,
            used_resolver,
            addresses,
            error,
            attempted_resolvers,
            per_resolver_duration,
            per_resolver_result,
            attempts,
        }
    }
}
