//! Shared application state behind the HTTP handlers.

use crate::config::AppConfig;
use crate::forecast_catalog::{ForecastCatalog, PostgrestCatalog};
use crate::mailer::{Mailer, SendGridMailer};
use crate::pdf::PageArtist;
use crate::render_api::{NumberSource, RenderApiClient};
use crate::reports::generator::ReportGenerator;
use crate::storage::{CachedStore, SupabaseStorage};
use std::sync::Arc;

pub struct AppState {
    pub generator: ReportGenerator,
    pub numbers: Arc<dyn NumberSource>,
    pub catalog: Arc<dyn ForecastCatalog>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new_with_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();

        let storage = Arc::new(CachedStore::new(Arc::new(SupabaseStorage::new(
            config.supabase.clone(),
            http.clone(),
        ))));

        let render_api = Arc::new(RenderApiClient::new(
            config.render_api.clone(),
            http.clone(),
        ));

        let font_bytes = std::fs::read(&config.font_path).map_err(|e| {
            anyhow::anyhow!("cannot read font at {}: {}", config.font_path, e)
        })?;
        let artist = Arc::new(PageArtist::from_font_bytes(font_bytes)?);

        let catalog = Arc::new(PostgrestCatalog::new(
            &config.supabase.url,
            config.supabase_anon_key.as_deref(),
        ));

        let mailer = Arc::new(SendGridMailer::new(config.sendgrid.clone(), http));

        Ok(Self {
            generator: ReportGenerator::new(storage, render_api.clone(), artist),
            numbers: render_api,
            catalog,
            mailer,
        })
    }
}
