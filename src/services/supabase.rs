use crate::models::{PriceLevel, ResortForScoring};
use crate::services::catalog::{retain_valid, ResortSource, ResortSourceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Columns read from the resorts table
const RESORT_COLUMNS: &str = "id,name,slug,country,region,family_score,best_age_min,best_age_max,\
price_level,lodging_nightly_cost,beginner_terrain_pct,advanced_terrain_pct,has_ski_school,\
has_childcare,has_ski_in_out,nightlife_score,non_ski_activities,english_friendly,\
snow_reliability,village_charm";

/// Resort row as stored in the content store
#[derive(Debug, Clone, Deserialize)]
struct ResortRow {
    id: Value,
    name: String,
    slug: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    family_score: Option<f64>,
    #[serde(default)]
    best_age_min: Option<i64>,
    #[serde(default)]
    best_age_max: Option<i64>,
    #[serde(default)]
    price_level: Option<String>,
    #[serde(default)]
    lodging_nightly_cost: Option<f64>,
    #[serde(default)]
    beginner_terrain_pct: Option<f64>,
    #[serde(default)]
    advanced_terrain_pct: Option<f64>,
    #[serde(default)]
    has_ski_school: Option<bool>,
    #[serde(default)]
    has_childcare: Option<bool>,
    #[serde(default)]
    has_ski_in_out: Option<bool>,
    #[serde(default)]
    nightlife_score: Option<f64>,
    #[serde(default)]
    non_ski_activities: Option<i64>,
    #[serde(default)]
    english_friendly: Option<f64>,
    #[serde(default)]
    snow_reliability: Option<f64>,
    #[serde(default)]
    village_charm: Option<f64>,
}

impl ResortRow {
    fn into_resort(self) -> ResortForScoring {
        let id = match self.id {
            Value::String(s) => s,
            other => other.to_string(),
        };

        // Stored tier wins; otherwise derive it from the nightly lodging cost
        let price_level = self
            .price_level
            .as_deref()
            .and_then(PriceLevel::parse)
            .or_else(|| self.lodging_nightly_cost.and_then(PriceLevel::from_nightly_cost));

        ResortForScoring {
            id,
            name: self.name,
            slug: self.slug,
            country: self.country.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            family_score: self.family_score,
            best_age_min: self.best_age_min.and_then(|v| u8::try_from(v).ok()),
            best_age_max: self.best_age_max.and_then(|v| u8::try_from(v).ok()),
            price_level,
            beginner_terrain: self.beginner_terrain_pct,
            advanced_terrain: self.advanced_terrain_pct,
            has_ski_school: self.has_ski_school,
            has_childcare: self.has_childcare,
            has_ski_in_out: self.has_ski_in_out,
            nightlife_score: self.nightlife_score,
            non_ski_activities: self.non_ski_activities.and_then(|v| u32::try_from(v).ok()),
            english_friendly: self.english_friendly,
            snow_reliability: self.snow_reliability,
            village_charm: self.village_charm,
        }
    }
}

/// Supabase REST client
///
/// Reads published resorts from the content store's PostgREST endpoint.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        table: String,
        timeout_secs: u64,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            table,
            client,
        })
    }

    fn resorts_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select={}&status=eq.published&order=name.asc",
            self.base_url.trim_end_matches('/'),
            self.table,
            urlencoding::encode(RESORT_COLUMNS)
        )
    }

    /// Fetch all published resorts
    pub async fn fetch_published_resorts(&self) -> Result<Vec<ResortForScoring>, SupabaseError> {
        let url = self.resorts_url();

        tracing::debug!("Fetching published resorts from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch resorts: {} - {}", status, body);
            return Err(SupabaseError::ApiError(format!(
                "Failed to fetch resorts: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        let rows = json
            .as_array()
            .ok_or_else(|| SupabaseError::InvalidResponse("Expected an array of rows".into()))?;

        let resorts: Vec<ResortForScoring> = rows
            .iter()
            .filter_map(|row| match serde_json::from_value::<ResortRow>(row.clone()) {
                Ok(row) => Some(row.into_resort()),
                Err(e) => {
                    tracing::warn!("Skipping malformed resort row: {}", e);
                    None
                }
            })
            .collect();

        let resorts = retain_valid(resorts, "supabase");

        tracing::debug!("Fetched {} published resorts (rows: {})", resorts.len(), rows.len());

        Ok(resorts)
    }
}

#[async_trait]
impl ResortSource for SupabaseClient {
    async fn published_resorts(&self) -> Result<Vec<ResortForScoring>, ResortSourceError> {
        Ok(self.fetch_published_resorts().await?)
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
