//! Executes a slide plan into a finished PDF.

use crate::numerology::BirthDate;
use crate::pdf::{assemble_pdf, PageArtist};
use crate::render_api::OverlaySource;
use crate::reports::plan::{
    child_plan, compatibility_plan, finances_plan, forecast_plan, personality_plan, SlideSpec,
};
use crate::reports::{GeneratedReport, ReportError};
use crate::storage::{AssetStore, StorageError};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

pub struct ReportGenerator {
    storage: Arc<dyn AssetStore>,
    overlays: Arc<dyn OverlaySource>,
    artist: Arc<PageArtist>,
}

impl ReportGenerator {
    pub fn new(
        storage: Arc<dyn AssetStore>,
        overlays: Arc<dyn OverlaySource>,
        artist: Arc<PageArtist>,
    ) -> Self {
        Self {
            storage,
            overlays,
            artist,
        }
    }

    /// Renders every slide of a plan in order. Optional slides that the
    /// store does not have are skipped with a warning; every other miss
    /// aborts the report.
    pub async fn render_plan(&self, plan: &[SlideSpec]) -> Result<Vec<RgbImage>, ReportError> {
        let mut pages = Vec::with_capacity(plan.len());
        for spec in plan {
            match self.render_slide(spec).await {
                Ok(page) => pages.push(page),
                Err(ReportError::MissingAsset(path)) if spec_is_optional(spec) => {
                    log::debug!("optional slide missing, skipping: {}", path);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(pages)
    }

    async fn render_slide(&self, spec: &SlideSpec) -> Result<RgbImage, ReportError> {
        match spec {
            SlideSpec::Static { path, .. } => {
                let bytes = self.storage.fetch(path).await?;
                Ok(self.artist.full_bleed(&bytes, None)?)
            }
            SlideSpec::Remote { url, title } => {
                let bytes = match self.storage.fetch_url(url).await {
                    Ok(bytes) => bytes,
                    Err(StorageError::NotFound(_)) => {
                        return Err(ReportError::MissingAsset(url.clone()))
                    }
                    Err(e) => return Err(e.into()),
                };
                Ok(self.artist.full_bleed(&bytes, title.as_ref())?)
            }
            SlideSpec::Overlay {
                overlay,
                background,
                placement,
                title,
            } => {
                let bg = match background {
                    Some(path) => Some(self.storage.fetch(path).await?),
                    None => None,
                };
                let png = self.overlays.fetch_overlay(overlay).await?;
                Ok(self
                    .artist
                    .overlay(bg.as_deref(), &png, placement, title.as_ref())?)
            }
            SlideSpec::Watermarked { path, text } => {
                let bytes = self.storage.fetch(path).await?;
                Ok(self.artist.watermarked(&bytes, text)?)
            }
        }
    }

    async fn finish(
        &self,
        plan: &[SlideSpec],
        filename: String,
    ) -> Result<GeneratedReport, ReportError> {
        let pages = self.render_plan(plan).await?;
        let pdf = assemble_pdf(&pages)?;
        log::info!("{}: {} pages, {} bytes", filename, pages.len(), pdf.len());
        Ok(GeneratedReport {
            filename,
            pdf,
            pages: pages.len(),
        })
    }

    pub async fn personality(
        &self,
        date: BirthDate,
        numbers: &dyn crate::render_api::NumberSource,
    ) -> Result<GeneratedReport, ReportError> {
        let plan = personality_plan(date, numbers).await;
        self.finish(&plan, format!("PERSONIBAS_ANALIZE_{}.pdf", date.compact()))
            .await
    }

    pub async fn child(&self, date: BirthDate) -> Result<GeneratedReport, ReportError> {
        let plan = child_plan(date);
        self.finish(&plan, format!("BERNA_PERSONIBA_{}.pdf", date.compact()))
            .await
    }

    pub async fn finances(&self, date: BirthDate) -> Result<GeneratedReport, ReportError> {
        let plan = finances_plan(date);
        self.finish(&plan, format!("FINANSES_REALIZACIJA_{}.pdf", date.compact()))
            .await
    }

    pub async fn forecast(
        &self,
        date: BirthDate,
        target_year: u32,
        catalog: &dyn crate::forecast_catalog::ForecastCatalog,
    ) -> Result<GeneratedReport, ReportError> {
        let mut rng = StdRng::from_entropy();
        let plan = forecast_plan(date, target_year, catalog, &mut rng).await?;
        self.finish(
            &plan,
            format!("GADA_PROGNOZE_{}_{}.pdf", date.compact(), target_year),
        )
        .await
    }

    pub async fn compatibility(
        &self,
        you: BirthDate,
        partner: BirthDate,
        numbers: &dyn crate::render_api::NumberSource,
    ) -> Result<GeneratedReport, ReportError> {
        let plan = compatibility_plan(you, partner, numbers).await;
        self.finish(
            &plan,
            format!("SADERIBA_{}_{}.pdf", you.compact(), partner.compact()),
        )
        .await
    }
}

fn spec_is_optional(spec: &SlideSpec) -> bool {
    matches!(spec, SlideSpec::Static { optional: true, .. })
}
