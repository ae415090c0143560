use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use haven_core::{HavenConfig, HavenError, LookupKey, Resource, RetryPolicy, SourceAdapter, SourceKey};
use haven_middleware::{RetryingSource, TtlCache};

/// Orchestrator that fans a lookup out across registered sources.
pub struct Haven {
    pub(crate) sources: Vec<Arc<dyn SourceAdapter>>,
    pub(crate) cfg: HavenConfig,
    pub(crate) cache: TtlCache<LookupKey, Vec<Resource>>,
}

/// Builder for constructing a `Haven` orchestrator with custom configuration.
pub struct HavenBuilder {
    sources: Vec<Arc<dyn SourceAdapter>>,
    cfg: HavenConfig,
}

impl Default for HavenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HavenBuilder {
    /// Create a new builder with the default configuration.
    ///
    /// Starts with no sources; register at least one via [`with_source`](Self::with_source).
    /// Defaults: 5 minute cache TTL, 1024 cached results, 5 km radius, and
    /// [`RetryPolicy::resource_lookup`] for every source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: vec![],
            cfg: HavenConfig::default(),
        }
    }

    /// Register a source.
    ///
    /// Registration order is merge priority: when two sources report the same
    /// resource, the one registered first wins.
    #[must_use]
    pub fn with_source(mut self, s: Arc<dyn SourceAdapter>) -> Self {
        self.sources.push(s);
        self
    }

    /// Override the retry policy for one source.
    #[must_use]
    pub fn source_policy(mut self, key: SourceKey, policy: RetryPolicy) -> Self {
        self.cfg
            .per_source_retry
            .insert(key.as_str().to_string(), policy);
        self
    }

    /// Set the retry policy for sources without an override.
    #[must_use]
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.cfg.retry = policy;
        self
    }

    /// Set how long merged results stay cached. Zero disables caching.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cfg.cache_ttl = ttl;
        self
    }

    /// Bound the number of cached results; the least recently used is evicted first.
    #[must_use]
    pub const fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cfg.cache_capacity = capacity;
        self
    }

    /// Set the radius used by [`Haven::lookup`].
    #[must_use]
    pub const fn default_radius_meters(mut self, radius: f64) -> Self {
        self.cfg.default_radius_meters = radius;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: HavenConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the `Haven` orchestrator.
    ///
    /// Every source is wrapped in a [`RetryingSource`] carrying its effective policy.
    /// Retry overrides naming an unregistered source are dropped.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no sources have been registered or the default
    /// radius is not a positive finite number.
    pub fn build(mut self) -> Result<Haven, HavenError> {
        if self.sources.is_empty() {
            return Err(HavenError::InvalidArg(
                "no sources registered; add at least one via with_source(...)".to_string(),
            ));
        }
        validate_radius(self.cfg.default_radius_meters)?;

        let known: HashSet<&'static str> = self.sources.iter().map(|s| s.name()).collect();
        self.cfg
            .per_source_retry
            .retain(|name, _| known.contains(name.as_str()));

        let sources = self
            .sources
            .into_iter()
            .map(|s| {
                let policy = self.cfg.retry_for(s.name());
                Arc::new(RetryingSource::new(s, policy)) as Arc<dyn SourceAdapter>
            })
            .collect();

        Ok(Haven {
            sources,
            cache: TtlCache::new(self.cfg.cache_capacity, self.cfg.cache_ttl),
            cfg: self.cfg,
        })
    }
}

pub(crate) fn validate_radius(radius: f64) -> Result<(), HavenError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(HavenError::InvalidArg(format!(
            "radius must be a positive number of meters, got {radius}"
        )))
    }
}

impl Haven {
    /// Start building a new `Haven` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use haven_sources::{DirectorySource, FinderSource};
    ///
    /// let haven = haven::Haven::builder()
    ///     .with_source(Arc::new(DirectorySource::from_env()?))
    ///     .with_source(Arc::new(FinderSource::from_env()?))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> HavenBuilder {
        HavenBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &HavenConfig {
        &self.cfg
    }

    /// Names of the registered sources, in priority order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached results held, including expired ones not yet evicted.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
