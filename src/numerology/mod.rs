//! Numerology core - digit reduction and birthdate decomposition.
//!
//! This module is split into submodules:
//! - `triangles` - per-family triangle number derivation and ordering
//! - `star` - star outer numbers and compatibility sums
//! - `handlers` - JSON number endpoints

pub mod handlers;
pub mod star;
pub mod triangles;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sum of the decimal digits of `n`.
pub fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

/// Repeatedly replace `n` with its digit sum until `n <= cap`.
pub fn reduce_to_max(mut n: u32, cap: u32) -> u32 {
    while n > cap {
        n = digit_sum(n);
    }
    n
}

/// Reduce to the 1..=22 range used by the triangle formulas.
pub fn reduce22(n: u32) -> u32 {
    reduce_to_max(n, 22)
}

/// Reduce to 1..=9. Zero is floored to 1: the compatibility
/// recommendation slides have no index 0.
pub fn reduce9(n: u32) -> u32 {
    let r = reduce_to_max(n, 9);
    if r == 0 {
        1
    } else {
        r
    }
}

/// Reduce a 4-digit year: digit sum first, then the 22-cap reduction.
/// The rendering API computes years the same way, so `reduce22(year)`
/// directly would diverge from it.
pub fn year_reduced(year: u32) -> u32 {
    reduce22(digit_sum(year))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("expected DD.MM.YYYY, got {0:?}")]
    Format(String),
    #[error("day {0} out of range 1..=31")]
    Day(u32),
    #[error("month {0} out of range 1..=12")]
    Month(u32),
    #[error("year must be positive")]
    Year,
}

/// A birthdate as three raw integers. Calendar validity is deliberately
/// not checked (31.02.2020 is accepted): the formulas treat day, month
/// and year as plain numbers, exactly as the rendering API does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl BirthDate {
    pub fn new(day: u32, month: u32, year: u32) -> Self {
        Self { day, month, year }
    }

    /// Parse a `DD.MM.YYYY` string.
    pub fn parse(input: &str) -> Result<Self, DateParseError> {
        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(DateParseError::Format(input.to_string()));
        }
        let nums: Result<Vec<u32>, _> = parts.iter().map(|p| p.parse::<u32>()).collect();
        let nums = nums.map_err(|_| DateParseError::Format(input.to_string()))?;
        let (day, month, year) = (nums[0], nums[1], nums[2]);
        if day == 0 || day > 31 {
            return Err(DateParseError::Day(day));
        }
        if month == 0 || month > 12 {
            return Err(DateParseError::Month(month));
        }
        if year == 0 {
            return Err(DateParseError::Year);
        }
        Ok(Self { day, month, year })
    }

    /// `DDMMYYYY`, used for report filenames.
    pub fn compact(&self) -> String {
        format!("{:02}{:02}{}", self.day, self.month, self.year)
    }

    pub fn day_reduced(&self) -> u32 {
        reduce22(self.day)
    }

    pub fn year_reduced(&self) -> u32 {
        year_reduced(self.year)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{}", self.day, self.month, self.year)
    }
}
