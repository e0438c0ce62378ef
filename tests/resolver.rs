use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use taxochem::domain::{CanonicalIdentifier, TaxonId};
use taxochem::error::TaxochemError;
use taxochem::rate_limit::{FixedIntervalLimiter, NoopLimiter, RateLimiter};
use taxochem::resolver::{IdentifierResolver, NameMatcher};

#[derive(Default)]
struct ScriptedMatcher {
    calls: Arc<Mutex<Vec<String>>>,
}

impl NameMatcher for ScriptedMatcher {
    fn match_name(&self, name: &str) -> Result<Option<TaxonId>, TaxochemError> {
        self.calls.lock().unwrap().push(name.to_string());
        match name {
            "Apis mellifera" => Ok(Some("Q30034".parse()?)),
            "Timeout" => Err(TaxochemError::ResolverHttp("operation timed out".to_string())),
            "Garbled" => Err(TaxochemError::ResolverResponse("missing results".to_string())),
            _ => Ok(None),
        }
    }
}

struct CountingLimiter(Arc<AtomicUsize>);

impl RateLimiter for CountingLimiter {
    fn wait(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn blank_name_makes_no_request() {
    let matcher = ScriptedMatcher::default();
    let calls = Arc::clone(&matcher.calls);
    let resolver = IdentifierResolver::new(matcher, Box::new(NoopLimiter));

    assert_eq!(resolver.resolve("   "), CanonicalIdentifier::Unresolved);
    assert_eq!(resolver.resolve(""), CanonicalIdentifier::Unresolved);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn failures_degrade_to_unresolved() {
    let resolver = IdentifierResolver::new(ScriptedMatcher::default(), Box::new(NoopLimiter));
    assert_eq!(
        resolver.resolve(" Apis mellifera "),
        CanonicalIdentifier::Resolved("Q30034".parse().unwrap())
    );
    for name in ["Timeout", "Garbled", "Nonexistent bee"] {
        assert_eq!(resolver.resolve(name), CanonicalIdentifier::Unresolved);
    }
}

#[test]
fn resolve_all_queries_distinct_names_once() {
    let matcher = ScriptedMatcher::default();
    let calls = Arc::clone(&matcher.calls);
    let waits = Arc::new(AtomicUsize::new(0));
    let resolver =
        IdentifierResolver::new(matcher, Box::new(CountingLimiter(Arc::clone(&waits))));

    let names = ["Apis mellifera", "Timeout", "", "Apis mellifera", "Nonexistent bee"];
    let resolutions = resolver.resolve_all(names);

    assert_eq!(
        *calls.lock().unwrap(),
        vec!["Apis mellifera", "Timeout", "Nonexistent bee"]
    );
    assert_eq!(waits.load(Ordering::SeqCst), 3);
    assert_eq!(resolutions.identifiers.len(), 3);
    assert_eq!(resolutions.resolved_count(), 1);
    assert_eq!(resolutions.unresolved, vec!["Timeout", "Nonexistent bee"]);
    assert_eq!(resolutions.get("Unlisted"), CanonicalIdentifier::Unresolved);
    assert_eq!(resolutions.get(" Apis mellifera").to_string(), "Q30034");
}

#[test]
fn fixed_interval_spaces_requests() {
    let limiter = FixedIntervalLimiter::new(Duration::from_millis(30));
    let started = Instant::now();
    for _ in 0..3 {
        limiter.wait();
    }
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[test]
fn zero_budget_is_rejected() {
    assert!(matches!(
        FixedIntervalLimiter::per_minute(0),
        Err(TaxochemError::InvalidRate(0))
    ));
    let limiter = FixedIntervalLimiter::per_minute(30).unwrap();
    assert_eq!(limiter.interval(), Duration::from_secs(2));
}
