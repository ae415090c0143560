use haven_core::{
    Category, Coordinates, HavenError, LookupKey, LookupRequest, LookupResponse, Resource,
    SourceQuery, finalize, merge_all,
};

use crate::Haven;
use crate::core::validate_radius;

type Outcome = (&'static str, Result<Vec<Resource>, HavenError>);

/// Steps of a single lookup.
///
/// `CacheCheck → Fetching → Merging → CacheStore → Return`, with `Failed` as
/// the terminal error state and a direct `CacheCheck → Return` edge on a hit.
enum LookupState {
    CacheCheck,
    Fetching,
    Merging(Vec<Outcome>),
    CacheStore(Vec<Resource>),
    Return(Vec<Resource>),
    Failed(HavenError),
}

impl LookupState {
    #[cfg(feature = "tracing")]
    const fn label(&self) -> &'static str {
        match self {
            Self::CacheCheck => "cache_check",
            Self::Fetching => "fetching",
            Self::Merging(_) => "merging",
            Self::CacheStore(_) => "cache_store",
            Self::Return(_) => "return",
            Self::Failed(_) => "failed",
        }
    }
}

impl Haven {
    /// Find resources of `category` near a point, within the default radius.
    ///
    /// Identical queries (coordinates rounded to 3 decimals, same category)
    /// within the cache TTL are served without touching any source.
    ///
    /// # Errors
    /// Returns `InvalidArg` for out-of-range coordinates, or `AllSourcesFailed`
    /// when no source produced a result. Partial failures are not errors.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "haven::lookup", skip(self))
    )]
    pub async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        category: Category,
    ) -> Result<Vec<Resource>, HavenError> {
        let origin = Coordinates::new(latitude, longitude)?;
        let query = SourceQuery::new(origin, category, self.cfg.default_radius_meters);
        self.run(query, true).await
    }

    /// Like [`lookup`](Self::lookup) with an explicit radius.
    ///
    /// The cache key does not carry a radius, so these requests neither read
    /// nor write the cache.
    ///
    /// # Errors
    /// As [`lookup`](Self::lookup), plus `InvalidArg` for a non-positive radius.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "haven::lookup_within", skip(self))
    )]
    pub async fn lookup_within(
        &self,
        latitude: f64,
        longitude: f64,
        category: Category,
        radius_meters: f64,
    ) -> Result<Vec<Resource>, HavenError> {
        validate_radius(radius_meters)?;
        let origin = Coordinates::new(latitude, longitude)?;
        let query = SourceQuery::new(origin, category, radius_meters);
        self.run(query, false).await
    }

    /// Serve an inbound lookup request.
    ///
    /// Invalid input and total failure both become [`LookupResponse::Error`];
    /// the message is safe to show to the end user.
    pub async fn handle(&self, req: &LookupRequest) -> LookupResponse {
        let res = match req.radius_meters {
            Some(radius) => {
                self.lookup_within(req.latitude, req.longitude, req.category, radius)
                    .await
            }
            None => self.lookup(req.latitude, req.longitude, req.category).await,
        };
        LookupResponse::from(res)
    }

    async fn run(&self, query: SourceQuery, use_cache: bool) -> Result<Vec<Resource>, HavenError> {
        let key = LookupKey::new(query.origin, query.category);
        let mut state = if use_cache {
            LookupState::CacheCheck
        } else {
            LookupState::Fetching
        };

        loop {
            #[cfg(feature = "tracing")]
            tracing::trace!(key = %key, state = state.label(), "lookup state");

            state = match state {
                LookupState::CacheCheck => match self.cache.get(&key) {
                    Some(hit) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(key = %key, results = hit.len(), "cache hit");
                        LookupState::Return(Self::remeasure(hit, &query))
                    }
                    None => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(key = %key, "cache miss");
                        LookupState::Fetching
                    }
                },
                LookupState::Fetching => LookupState::Merging(self.fan_out(&query).await),
                LookupState::Merging(outcomes) => Self::merge_outcomes(outcomes),
                LookupState::CacheStore(resources) => {
                    if use_cache {
                        self.cache.set(key.clone(), resources.clone());
                    }
                    LookupState::Return(resources)
                }
                LookupState::Return(resources) => return Ok(resources),
                LookupState::Failed(err) => return Err(err),
            };
        }
    }

    /// Re-measure cached results from this query's origin.
    ///
    /// A cache entry covers a ~110 m cell, so the stored distances belong to
    /// whichever point filled it.
    fn remeasure(mut resources: Vec<Resource>, query: &SourceQuery) -> Vec<Resource> {
        for r in &mut resources {
            r.distance_meters = query.distance_to(r.latitude, r.longitude);
        }
        finalize(resources, query, false)
    }

    /// Invoke every source concurrently and wait for all of them to settle.
    async fn fan_out(&self, query: &SourceQuery) -> Vec<Outcome> {
        let calls = self
            .sources
            .iter()
            .map(|s| async move { (s.name(), s.fetch(query).await) });
        futures::future::join_all(calls).await
    }

    fn merge_outcomes(outcomes: Vec<Outcome>) -> LookupState {
        let mut lists: Vec<Vec<Resource>> = Vec::with_capacity(outcomes.len());
        let mut errors: Vec<HavenError> = Vec::new();
        for (_name, outcome) in outcomes {
            match outcome {
                Ok(list) => lists.push(list),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(source = _name, error = %e, retryable = e.is_retryable(), "source failed");
                    errors.push(e);
                }
            }
        }

        if lists.is_empty() {
            return LookupState::Failed(HavenError::all_sources_failed(errors));
        }
        LookupState::CacheStore(merge_all(lists))
    }
}
