use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::{info, warn};

use crate::domain::{CanonicalIdentifier, TaxonId};
use crate::error::TaxochemError;
use crate::rate_limit::RateLimiter;

pub trait NameMatcher: Send + Sync {
    /// Returns the first match for `name`, `Ok(None)` when the service knows
    /// no such taxon.
    fn match_name(&self, name: &str) -> Result<Option<TaxonId>, TaxochemError>;
}

impl<M: NameMatcher + ?Sized> NameMatcher for Box<M> {
    fn match_name(&self, name: &str) -> Result<Option<TaxonId>, TaxochemError> {
        (**self).match_name(name)
    }
}

/// Rate-limited lookups; every failure is logged and becomes
/// [`CanonicalIdentifier::Unresolved`].
pub struct IdentifierResolver<M: NameMatcher> {
    matcher: M,
    limiter: Box<dyn RateLimiter>,
}

/// Identifiers for every distinct name of a run.
#[derive(Debug, Clone, Default)]
pub struct Resolutions {
    pub identifiers: BTreeMap<String, CanonicalIdentifier>,
    pub unresolved: Vec<String>,
}

impl Resolutions {
    pub fn get(&self, name: &str) -> CanonicalIdentifier {
        self.identifiers
            .get(name.trim())
            .cloned()
            .unwrap_or(CanonicalIdentifier::Unresolved)
    }

    pub fn resolved_count(&self) -> usize {
        self.identifiers
            .values()
            .filter(|id| id.is_resolved())
            .count()
    }
}

impl<M: NameMatcher> IdentifierResolver<M> {
    pub fn new(matcher: M, limiter: Box<dyn RateLimiter>) -> Self {
        Self { matcher, limiter }
    }

    pub fn resolve(&self, name: &str) -> CanonicalIdentifier {
        let name = name.trim();
        if name.is_empty() {
            return CanonicalIdentifier::Unresolved;
        }

        self.limiter.wait();
        match self.matcher.match_name(name) {
            Ok(Some(id)) => {
                info!(taxon = name, id = %id, "resolved");
                CanonicalIdentifier::Resolved(id)
            }
            Ok(None) => {
                info!(taxon = name, "no registry match");
                CanonicalIdentifier::Unresolved
            }
            Err(err) => {
                warn!(taxon = name, error = %err, "lookup failed");
                CanonicalIdentifier::Unresolved
            }
        }
    }

    /// Resolves each distinct name once, in first-seen order.
    pub fn resolve_all<'a, I>(&self, names: I) -> Resolutions
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolutions = Resolutions::default();
        for name in names {
            let name = name.trim();
            if name.is_empty() || resolutions.identifiers.contains_key(name) {
                continue;
            }
            let id = self.resolve(name);
            if !id.is_resolved() {
                resolutions.unresolved.push(name.to_string());
            }
            resolutions.identifiers.insert(name.to_string(), id);
        }
        resolutions
    }
}

pub(crate) fn http_client() -> Result<Client, TaxochemError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(format!("taxochem/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| TaxochemError::ResolverHttp(err.to_string()))
}

pub(crate) fn handle_status(response: Response) -> Result<Response, TaxochemError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .unwrap_or_else(|_| "name resolver request failed".to_string());
    Err(TaxochemError::ResolverStatus { status, message })
}
