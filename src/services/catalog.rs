use crate::models::{PriceLevel, ResortForScoring};
use crate::services::supabase::SupabaseError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use validator::Validate;

/// Errors that can occur when loading a resort catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors surfaced by any resort source
#[derive(Debug, Error)]
pub enum ResortSourceError {
    #[error("Content store error: {0}")]
    Supabase(#[from] SupabaseError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Where published resorts come from
#[async_trait]
pub trait ResortSource: Send + Sync {
    /// Fetch every published resort, ready for scoring
    async fn published_resorts(&self) -> Result<Vec<ResortForScoring>, ResortSourceError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Catalog entry as written in a TOML file
///
/// `lodgingNightlyCost` fills in `priceLevel` when no tier is given.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    #[serde(flatten)]
    resort: ResortForScoring,
    #[serde(default)]
    lodging_nightly_cost: Option<f64>,
}

impl CatalogEntry {
    fn into_resort(self) -> ResortForScoring {
        let mut resort = self.resort;
        if resort.price_level.is_none() {
            resort.price_level = self.lodging_nightly_cost.and_then(PriceLevel::from_nightly_cost);
        }
        resort
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    resorts: Vec<CatalogEntry>,
}

/// Drop records that break the resort invariants
pub fn retain_valid(resorts: Vec<ResortForScoring>, source: &str) -> Vec<ResortForScoring> {
    let total = resorts.len();
    let valid: Vec<ResortForScoring> = resorts
        .into_iter()
        .filter(|resort| match resort.validate() {
            Ok(()) => true,
            Err(errors) => {
                tracing::warn!("Skipping invalid resort {:?} from {}: {}", resort.id, source, errors);
                false
            }
        })
        .collect();

    if valid.len() < total {
        tracing::debug!("Kept {} of {} resorts from {}", valid.len(), total, source);
    }

    valid
}

/// In-memory resort catalog
///
/// Backs local development (loaded from a TOML file) and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    resorts: Vec<ResortForScoring>,
}

impl StaticCatalog {
    pub fn new(resorts: Vec<ResortForScoring>) -> Self {
        Self {
            resorts: retain_valid(resorts, "static catalog"),
        }
    }

    /// Parse a catalog from TOML text with `[[resorts]]` tables
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        let resorts = file.resorts.into_iter().map(CatalogEntry::into_resort).collect();
        Ok(Self::new(resorts))
    }

    /// Load a catalog file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            "Loaded {} resorts from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.resorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resorts.is_empty()
    }
}

#[async_trait]
impl ResortSource for StaticCatalog {
    async fn published_resorts(&self) -> Result<Vec<ResortForScoring>, ResortSourceError> {
        Ok(self.resorts.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
