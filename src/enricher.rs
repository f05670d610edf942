//! Catalog enrichment.

use crate::catalog::Catalog;
use crate::config::TransformSettings;
use crate::rule::{RuleError, TransformChain};
use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// Host-facing seam: something that turns a catalog into an enriched one.
#[async_trait]
pub trait CatalogHandler: Send + Sync {
    /// Enrich a catalog, returning a new snapshot.
    async fn enrich_catalog(&self, catalog: Catalog) -> Result<Catalog, EnricherError>;

    /// Get the handler name for debugging.
    fn name(&self) -> &'static str;
}

/// Applies the configured rule chain to every resource of a catalog.
pub struct CatalogEnricher {
    /// Configuration
    settings: TransformSettings,
    /// Compiled rule chain
    chain: TransformChain,
    /// Metrics: catalogs enriched.
    catalogs_total: AtomicU64,
    /// Metrics: resources run through the chain.
    resources_total: AtomicU64,
    /// Metrics: resources whose identifier changed.
    resources_renamed: AtomicU64,
    /// Metrics: rules that wrote their target.
    rules_applied: AtomicU64,
}

/// Snapshot of the enricher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnricherStats {
    pub catalogs_total: u64,
    pub resources_total: u64,
    pub resources_renamed: u64,
    pub rules_applied: u64,
}

impl CatalogEnricher {
    /// Create a new enricher, compiling the rule chain.
    pub fn new(settings: TransformSettings) -> Result<Self, RuleError> {
        let chain = TransformChain::new(&settings)?;

        info!(
            version = %settings.version,
            rules = chain.len(),
            "Catalog enricher initialized"
        );

        Ok(Self {
            settings,
            chain,
            catalogs_total: AtomicU64::new(0),
            resources_total: AtomicU64::new(0),
            resources_renamed: AtomicU64::new(0),
            rules_applied: AtomicU64::new(0),
        })
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, EnricherError> {
        let settings: TransformSettings = serde_yaml::from_str(yaml)?;
        Self::new(settings).map_err(EnricherError::from)
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, EnricherError> {
        let settings: TransformSettings = serde_json::from_str(json)?;
        Self::new(settings).map_err(EnricherError::from)
    }

    /// The configuration this enricher was built from.
    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// The compiled rule chain.
    pub fn chain(&self) -> &TransformChain {
        &self.chain
    }

    /// Current counter values.
    pub fn stats(&self) -> EnricherStats {
        EnricherStats {
            catalogs_total: self.catalogs_total.load(Ordering::Relaxed),
            resources_total: self.resources_total.load(Ordering::Relaxed),
            resources_renamed: self.resources_renamed.load(Ordering::Relaxed),
            rules_applied: self.rules_applied.load(Ordering::Relaxed),
        }
    }

    /// Enrich a catalog.
    ///
    /// The input is never modified. Resource count and order are preserved.
    pub fn enrich(&self, catalog: &Catalog) -> Catalog {
        let Ok(enriched) = self.run(catalog, |_| Ok::<(), Infallible>(()));
        enriched
    }

    /// Enrich a catalog, checking `cancel` between resources.
    ///
    /// Cancellation aborts the whole call; partial results are discarded.
    pub fn enrich_with_cancel(
        &self,
        catalog: &Catalog,
        cancel: &AtomicBool,
    ) -> Result<Catalog, EnricherError> {
        self.run(catalog, |processed| {
            if !cancel.load(Ordering::Relaxed) {
                return Ok(());
            }
            info!(catalog = %catalog.id, processed, "Catalog enrichment cancelled");
            Err(EnricherError::Cancelled { processed })
        })
    }

    /// Run the chain over every resource. `check` is called before each one
    /// with the number already processed and may abort the run.
    fn run<E>(
        &self,
        catalog: &Catalog,
        mut check: impl FnMut(usize) -> Result<(), E>,
    ) -> Result<Catalog, E> {
        self.catalogs_total.fetch_add(1, Ordering::Relaxed);

        let resources = catalog.resources();
        if resources.is_empty() || self.chain.is_empty() {
            debug!(catalog = %catalog.id, "Nothing to enrich");
            return Ok(catalog.clone());
        }

        let mut enriched = Vec::with_capacity(resources.len());
        let mut renamed = 0u64;
        let mut applied = 0u64;

        for resource in resources {
            check(enriched.len())?;

            let output = self.chain.apply(resource);
            if output.resource.id != resource.id {
                renamed += 1;
            }
            applied += output.applied as u64;
            enriched.push(output.resource);
        }

        self.resources_total
            .fetch_add(enriched.len() as u64, Ordering::Relaxed);
        self.resources_renamed.fetch_add(renamed, Ordering::Relaxed);
        self.rules_applied.fetch_add(applied, Ordering::Relaxed);

        info!(
            catalog = %catalog.id,
            resources = enriched.len(),
            renamed,
            rules_applied = applied,
            "Catalog enriched"
        );

        Ok(Catalog {
            id: catalog.id.clone(),
            properties: catalog.properties.clone(),
            resources: Some(enriched),
        })
    }
}

#[async_trait]
impl CatalogHandler for CatalogEnricher {
    async fn enrich_catalog(&self, catalog: Catalog) -> Result<Catalog, EnricherError> {
        Ok(self.enrich(&catalog))
    }

    fn name(&self) -> &'static str {
        "catalog_enricher"
    }
}

/// Errors that can occur while building or running the enricher.
#[derive(Debug, thiserror::Error)]
pub enum EnricherError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Enrichment cancelled after {processed} resources")]
    Cancelled { processed: usize },
}
