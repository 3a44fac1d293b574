//! Forecast image catalog over the Supabase PostgREST API.
//!
//! The annual forecast is the one report whose imagery is not addressed
//! by storage path: year and month slides live in two catalog tables
//! (`forecast_gada_images`, `forecast_menesa_images`) and carry absolute
//! image URLs. Month rows come in variants like "2.1", "2.2" - one major
//! variant group is picked at random per month and drawn in order.

use async_trait::async_trait;
use postgrest::Postgrest;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("catalog query for {table} returned status {status}")]
    Http { table: String, status: u16 },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ForecastImage {
    pub image_url: String,
    #[serde(default)]
    pub variant: String,
}

#[async_trait]
pub trait ForecastCatalog: Send + Sync {
    /// Year-number slide for a `gada_cipars`, if the catalog has one.
    async fn gada_image(&self, gada_cipars: u32) -> Result<Option<String>, CatalogError>;

    /// All month-slide rows for a `menesa_cipars`.
    async fn menesa_images(&self, menesa_cipars: u32) -> Result<Vec<ForecastImage>, CatalogError>;
}

pub struct PostgrestCatalog {
    client: Postgrest,
}

impl PostgrestCatalog {
    /// `supabase_url` is the project root; PostgREST lives under /rest/v1.
    pub fn new(supabase_url: &str, api_key: Option<&str>) -> Self {
        let mut client = Postgrest::new(format!(
            "{}/rest/v1",
            supabase_url.trim_end_matches('/')
        ));
        if let Some(key) = api_key {
            client = client
                .insert_header("apikey", key)
                .insert_header("Authorization", format!("Bearer {}", key));
        }
        Self { client }
    }

    async fn rows(
        &self,
        table: &str,
        column: &str,
        value: u32,
    ) -> Result<Vec<ForecastImage>, CatalogError> {
        let response = self
            .client
            .from(table)
            .select("image_url,variant")
            .eq(column, value.to_string())
            .execute()
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(CatalogError::Http {
                table: table.to_string(),
                status,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ForecastCatalog for PostgrestCatalog {
    async fn gada_image(&self, gada_cipars: u32) -> Result<Option<String>, CatalogError> {
        let rows = self
            .rows("forecast_gada_images", "gada_cipars", gada_cipars)
            .await?;
        Ok(rows.into_iter().next().map(|r| r.image_url))
    }

    async fn menesa_images(&self, menesa_cipars: u32) -> Result<Vec<ForecastImage>, CatalogError> {
        self.rows("forecast_menesa_images", "menesa_cipars", menesa_cipars)
            .await
    }
}

/// Group rows by the major part of their variant ("2.1" -> "2"), pick one
/// group at random, and return it sorted by full variant string.
pub fn choose_variant_group<R: Rng>(rows: Vec<ForecastImage>, rng: &mut R) -> Vec<ForecastImage> {
    let mut majors: Vec<String> = Vec::new();
    for row in &rows {
        let major = variant_major(&row.variant);
        if !majors.contains(&major) {
            majors.push(major);
        }
    }
    let Some(chosen) = majors.choose(rng) else {
        return Vec::new();
    };
    let mut group: Vec<ForecastImage> = rows
        .into_iter()
        .filter(|r| variant_major(&r.variant) == *chosen)
        .collect();
    group.sort_by(|a, b| a.variant.cmp(&b.variant));
    group
}

fn variant_major(variant: &str) -> String {
    variant.split('.').next().unwrap_or("").to_string()
}
