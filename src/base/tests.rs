use crate::base::dnserror::{AllResolversFailed, AttemptFailure, ConfigError, DnsError, ResolveError};

fn failure(resolver: &str, error: ResolveError) -> AttemptFailure {
    AttemptFailure {
        resolver: resolver.to_string(),
        error,
    }
}

#[test]
fn test_all_failed_preserves_order() {
    let err = AllResolversFailed::new(
        "x.test",
        vec![
            failure("A", ResolveError::TimedOut),
            failure("B", ResolveError::ConnectionFailed("refused".into())),
        ],
    );

    assert_eq!(err.len(), 2);
    let resolvers: Vec<_> = err.resolvers().collect();
    assert_eq!(resolvers, vec!["A", "B"]);

    let errors: Vec<_> = err.errors().collect();
    assert!(matches!(errors[0], ResolveError::TimedOut));
    assert!(matches!(errors[1], ResolveError::ConnectionFailed(_)));
}

#[test]
fn test_all_failed_display_lists_attempts() {
    let err = AllResolversFailed::new(
        "x.test",
        vec![
            failure("A", ResolveError::TimedOut),
            failure("B", ResolveError::no_addresses("x.test")),
        ],
    );

    let msg = err.to_string();
    assert!(msg.starts_with("All 2 resolvers failed for x.test"));
    assert!(msg.contains("A: Resolution timed out"));
    assert!(msg.contains("B: No addresses returned for x.test"));
}

#[test]
fn test_all_failed_empty_display() {
    let err = AllResolversFailed::new("x.test", vec![]);
    assert!(err.is_empty());
    assert_eq!(err.to_string(), "No resolvers configured for x.test");
}

#[test]
fn test_dns_error_conversions() {
    let err: DnsError = ConfigError::UnknownProvider("nope".into()).into();
    assert!(err.attempt_failures().is_none());
    assert_eq!(err.to_string(), "Unknown provider: nope");

    let err: DnsError = AllResolversFailed::new("h", vec![]).into();
    assert!(err.attempt_failures().is_some());
}

#[test]
fn test_empty_result_classification() {
    assert!(ResolveError::no_addresses("h").is_empty_result());
    assert!(!ResolveError::TimedOut.is_empty_result());
}
