//! Report generation - slide plans, execution, HTTP handlers.
//!
//! - `plan` - fixed slide scripts per report type
//! - `generator` - executes a plan into a finished PDF
//! - `handlers` - POST endpoints

pub mod generator;
pub mod handlers;
pub mod plan;

use crate::forecast_catalog::CatalogError;
use crate::mailer::MailError;
use crate::numerology::triangles::Family;
use crate::numerology::{digit_sum, reduce22, BirthDate, DateParseError};
use crate::pdf::PdfError;
use crate::render_api::RenderApiError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors surfaced by report generation. Derivation itself never fails;
/// everything here comes from the boundary (input parsing, fetches,
/// composition, dispatch).
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid date: {0}")]
    InvalidDate(#[from] DateParseError),
    #[error("no asset for slide: {0}")]
    MissingAsset(String),
    #[error(transparent)]
    Storage(StorageError),
    #[error(transparent)]
    RenderApi(#[from] RenderApiError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Compose(#[from] PdfError),
    #[error(transparent)]
    Email(#[from] MailError),
}

impl From<StorageError> for ReportError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(path) => ReportError::MissingAsset(path),
            other => ReportError::Storage(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Personality,
    Child,
    Finances,
    Forecast,
    Compatibility,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Personality => "personality",
            ReportKind::Child => "child",
            ReportKind::Finances => "finances",
            ReportKind::Forecast => "forecast",
            ReportKind::Compatibility => "compatibility",
        }
    }
}

/// A finished report ready for dispatch.
#[derive(Debug)]
pub struct GeneratedReport {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub pages: usize,
}

/// Reduced values with no corresponding slide asset, per family. These
/// are skipped before any fetch; an index missing for any other reason
/// is a `ReportError::MissingAsset`.
pub fn excluded_indices(family: Family) -> &'static [u32] {
    match family {
        Family::Finances => &[1],
        Family::Relations => &[1, 2],
        Family::Personality | Family::Family | Family::Health => &[],
    }
}

/// Mission slides only exist from this value up.
pub const MISSION_MIN_INDEX: u32 = 3;

/// Compatibility `ac*` backgrounds only exist for 3..=22.
pub fn clamp_relations_index(n: u32) -> u32 {
    n.clamp(3, 22)
}

/// Fixed year offsets for the annual forecast's year number. Years past
/// the table fall back to the digit sum of the target year.
const YEAR_OFFSETS: &[(u32, u32)] = &[
    (2025, 9),
    (2026, 10),
    (2027, 11),
    (2028, 12),
    (2029, 13),
    (2030, 14),
];

pub fn year_offset(target_year: u32) -> u32 {
    match YEAR_OFFSETS.iter().find(|(y, _)| *y == target_year) {
        Some((_, offset)) => *offset,
        None => {
            let fallback = digit_sum(target_year);
            log::warn!(
                "no year offset configured for {}, using digit sum {}",
                target_year,
                fallback
            );
            fallback
        }
    }
}

/// The forecast "year number": day + month + year offset, reduced.
pub fn gada_cipars(date: BirthDate, target_year: u32) -> u32 {
    reduce22(date.day + date.month + year_offset(target_year))
}
