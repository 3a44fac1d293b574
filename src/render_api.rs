//! Client for the star/triangle rendering API.
//!
//! The rendering API draws the star and triangle overlay PNGs and can
//! also return the derived numbers as JSON. Both sides implement the
//! same recurrences, so the JSON form is preferred when available (it is
//! guaranteed to match the pixels of the overlay it rendered) and the
//! local derivation is the fallback.

use crate::numerology::star::{star_sum, StarSumNumbers};
use crate::numerology::triangles::{
    relations_numbers, RemoteTriangleNumbers, TriangleNumbers,
};
use crate::numerology::BirthDate;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderApiError {
    #[error("GET {path} failed with status {status}")]
    Http { path: String, status: u16 },
    #[error("rendering api request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Triangle endpoints exposed by the rendering API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleKind {
    Personiba,
    Dzimta,
    Finanses,
    Attiecibas,
    Veseliba,
    Berns,
    Saderiba,
}

impl TriangleKind {
    pub fn segment(&self) -> &'static str {
        match self {
            TriangleKind::Personiba => "personiba",
            TriangleKind::Dzimta => "dzimta",
            TriangleKind::Finanses => "finanses",
            TriangleKind::Attiecibas => "attiecibas",
            TriangleKind::Veseliba => "veseliba",
            TriangleKind::Berns => "berns",
            TriangleKind::Saderiba => "saderiba",
        }
    }
}

/// A dynamically rendered overlay image, identified by endpoint + date(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Star(BirthDate),
    ChildStar(BirthDate),
    CompatStar(BirthDate),
    CompatSumStar(BirthDate, BirthDate),
    Triangle(TriangleKind, BirthDate),
    Mission(BirthDate),
}

impl Overlay {
    /// API path with query string, PNG format.
    pub fn path_and_query(&self) -> String {
        match self {
            Overlay::Star(d) => format!("/api/star?date={}&format=png", d),
            Overlay::ChildStar(d) => format!("/api/star/berns?date={}&format=png", d),
            Overlay::CompatStar(d) => format!("/api/star/saderiba?date={}&format=png", d),
            Overlay::CompatSumStar(a, b) => {
                format!("/api/star/saderibasum?dateA={}&dateB={}&format=png", a, b)
            }
            Overlay::Triangle(kind, d) => {
                format!("/api/triangle/{}?date={}&format=png", kind.segment(), d)
            }
            Overlay::Mission(d) => format!("/api/triangle/misija?date={}&format=png", d),
        }
    }
}

/// Fetches rendered overlay PNGs.
#[async_trait]
pub trait OverlaySource: Send + Sync {
    async fn fetch_overlay(&self, overlay: &Overlay) -> Result<Vec<u8>, RenderApiError>;
}

/// Provides the derived numbers that the slide plans need. Never fails:
/// implementations either compute locally or fall back to the local
/// computation when the remote JSON form is unavailable.
#[async_trait]
pub trait NumberSource: Send + Sync {
    /// Relations triangle numbers for the personality report's ac-slides.
    async fn relations(&self, date: BirthDate) -> TriangleNumbers;

    /// Compatibility triangle numbers (same recurrence as relations; the
    /// remote endpoint differs only in rendering).
    async fn compatibility(&self, date: BirthDate) -> TriangleNumbers;

    /// Raw pairwise outer-star sums for a couple.
    async fn star_sum(&self, you: BirthDate, partner: BirthDate) -> StarSumNumbers;
}

/// Pure local implementation of the number contract.
pub struct LocalNumbers;

#[async_trait]
impl NumberSource for LocalNumbers {
    async fn relations(&self, date: BirthDate) -> TriangleNumbers {
        relations_numbers(date)
    }

    async fn compatibility(&self, date: BirthDate) -> TriangleNumbers {
        relations_numbers(date)
    }

    async fn star_sum(&self, you: BirthDate, partner: BirthDate) -> StarSumNumbers {
        star_sum(you, partner)
    }
}

#[derive(Debug, Clone)]
pub struct RenderApiConfig {
    pub base_url: String,
}

impl RenderApiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("RENDER_API_BASE")
            .unwrap_or_else(|_| "http://localhost:3333".to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Remote client. Number lookups fall back to `LocalNumbers` with a
/// warning when the API is unreachable or returns an unexpected body.
pub struct RenderApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl RenderApiClient {
    pub fn new(config: RenderApiConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url,
            client,
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    async fn get_bytes(&self, path_and_query: &str) -> Result<Vec<u8>, RenderApiError> {
        let response = self.client.get(self.url(path_and_query)).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(RenderApiError::Http {
                path: path_and_query.to_string(),
                status,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn triangle_json(
        &self,
        kind: TriangleKind,
        date: BirthDate,
    ) -> Result<TriangleNumbers, RenderApiError> {
        let path = format!(
            "/api/triangle/{}?date={}&format=json",
            kind.segment(),
            date
        );
        let response = self.client.get(self.url(&path)).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(RenderApiError::Http { path, status });
        }
        let remote: RemoteTriangleNumbers = response.json().await?;
        Ok(remote.into())
    }

    async fn star_sum_json(
        &self,
        you: BirthDate,
        partner: BirthDate,
    ) -> Result<StarSumNumbers, RenderApiError> {
        let path = format!(
            "/api/star/saderibasum?dateA={}&dateB={}&format=json",
            you, partner
        );
        let response = self.client.get(self.url(&path)).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(RenderApiError::Http { path, status });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl OverlaySource for RenderApiClient {
    async fn fetch_overlay(&self, overlay: &Overlay) -> Result<Vec<u8>, RenderApiError> {
        self.get_bytes(&overlay.path_and_query()).await
    }
}

#[async_trait]
impl NumberSource for RenderApiClient {
    async fn relations(&self, date: BirthDate) -> TriangleNumbers {
        match self.triangle_json(TriangleKind::Attiecibas, date).await {
            Ok(numbers) => numbers,
            Err(e) => {
                log::warn!(
                    "relations numbers unavailable from rendering api ({}), using local derivation",
                    e
                );
                relations_numbers(date)
            }
        }
    }

    async fn compatibility(&self, date: BirthDate) -> TriangleNumbers {
        match self.triangle_json(TriangleKind::Saderiba, date).await {
            Ok(numbers) => numbers,
            Err(e) => {
                log::warn!(
                    "compatibility numbers unavailable from rendering api ({}), using local derivation",
                    e
                );
                relations_numbers(date)
            }
        }
    }

    async fn star_sum(&self, you: BirthDate, partner: BirthDate) -> StarSumNumbers {
        match self.star_sum_json(you, partner).await {
            Ok(numbers) => numbers,
            Err(e) => {
                log::warn!(
                    "star sum numbers unavailable from rendering api ({}), using local derivation",
                    e
                );
                star_sum(you, partner)
            }
        }
    }
}
