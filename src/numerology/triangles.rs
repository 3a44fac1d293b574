//! Triangle number derivation - one pure function per formula family.
//!
//! Every family maps `(day, month, year)` onto six named positions of the
//! triangle diagram (`top`, `left`, `right` plus the three midpoints), or
//! three sequential numbers for the mission family. The recurrences must
//! match the star/triangle rendering API exactly, otherwise the numbers
//! printed on the overlay image disagree with the slides picked here.

use super::{digit_sum, reduce22, year_reduced, BirthDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Six named triangle positions. Short keys (`ml`, `mr`, `mb`) follow the
/// rendering API's JSON contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TriangleNumbers {
    pub top: u32,
    pub left: u32,
    pub right: u32,
    pub ml: u32,
    pub mr: u32,
    pub mb: u32,
}

impl TriangleNumbers {
    /// Slide order walk: top, mid-left, mid-right, left, mid-bottom,
    /// right, deduplicated keeping first occurrence. This order decides
    /// page order in the finished PDF.
    pub fn ordered(&self) -> Vec<u32> {
        let walk = [self.top, self.ml, self.mr, self.left, self.mb, self.right];
        let mut out = Vec::with_capacity(walk.len());
        for n in walk {
            if !out.contains(&n) {
                out.push(n);
            }
        }
        out
    }
}

/// The triangle JSON shape returned by the rendering API's compatibility
/// endpoint, which uses long position names.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RemoteTriangleNumbers {
    pub top: u32,
    #[serde(rename = "bottomLeft")]
    pub bottom_left: u32,
    #[serde(rename = "bottomRight")]
    pub bottom_right: u32,
    #[serde(rename = "midLeft")]
    pub mid_left: u32,
    #[serde(rename = "midRight")]
    pub mid_right: u32,
    #[serde(rename = "midBottom")]
    pub mid_bottom: u32,
}

impl From<RemoteTriangleNumbers> for TriangleNumbers {
    fn from(r: RemoteTriangleNumbers) -> Self {
        Self {
            top: r.top,
            left: r.bottom_left,
            right: r.bottom_right,
            ml: r.mid_left,
            mr: r.mid_right,
            mb: r.mid_bottom,
        }
    }
}

/// The three mission numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MissionNumbers {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

/// One of the six-position formula families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Personality,
    Family,
    Finances,
    Relations,
    Health,
}

impl Family {
    /// Endpoint segment, matching the rendering API naming.
    pub fn as_segment(&self) -> &'static str {
        match self {
            Family::Personality => "personiba",
            Family::Family => "dzimta",
            Family::Finances => "finanses",
            Family::Relations => "attiecibas",
            Family::Health => "veseliba",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "personiba" => Some(Family::Personality),
            "dzimta" => Some(Family::Family),
            "finanses" => Some(Family::Finances),
            "attiecibas" => Some(Family::Relations),
            "veseliba" => Some(Family::Health),
            _ => None,
        }
    }

    pub fn numbers(&self, date: BirthDate) -> TriangleNumbers {
        match self {
            Family::Personality => personality_numbers(date),
            Family::Family => family_numbers(date),
            Family::Finances => finances_numbers(date),
            Family::Relations => relations_numbers(date),
            Family::Health => health_numbers(date),
        }
    }
}

/// Personality triangle. `left` is the cascading sum: a4 and a5 extend
/// the day/month/year chain, and left closes it back onto the day.
pub fn personality_numbers(date: BirthDate) -> TriangleNumbers {
    let d1 = date.day_reduced();
    let y_r = date.year_reduced();
    let m = date.month;

    let right = reduce22(d1 + m);

    let a4 = reduce22(d1 + m + y_r);
    let a5 = reduce22(d1 + m + y_r + a4);
    let left = reduce22(d1 + a5);

    let mr = reduce22(d1 + right);
    let ml = reduce22(d1 + left);
    let mb = reduce22(right + left);

    TriangleNumbers { top: d1, left, right, ml, mr, mb }
}

/// Family (dzimta) triangle: month at the top, corners mix the month with
/// the reduced day and year.
pub fn family_numbers(date: BirthDate) -> TriangleNumbers {
    let d1 = date.day_reduced();
    let y_r = date.year_reduced();
    let m = date.month;

    let top = reduce22(m);
    let right = reduce22(m + y_r);
    let left = reduce22(d1 + m);
    let mr = reduce22(top + right);
    let ml = reduce22(top + left);
    let mb = reduce22(right + left);

    TriangleNumbers { top, left, right, ml, mr, mb }
}

/// Finances triangle. Canonical variant: every component is reduced
/// before entering the inner sum, as the rendering API computes it.
pub fn finances_numbers(date: BirthDate) -> TriangleNumbers {
    let d1 = date.day_reduced();
    let m1 = reduce22(date.month);
    let y_r = date.year_reduced();

    let inner = reduce22(d1 + m1 + y_r);

    let top = y_r;
    let right = reduce22(y_r + inner);
    let left = reduce22(y_r + m1);
    let mr = reduce22(top + right);
    let ml = reduce22(top + left);
    let mb = reduce22(right + left);

    TriangleNumbers { top, left, right, ml, mr, mb }
}

/// Relations triangle. The month stays unreduced in the top sum, and the
/// combo term mixes the raw date components with the already-derived top.
pub fn relations_numbers(date: BirthDate) -> TriangleNumbers {
    let d1 = date.day_reduced();
    let y_sum = digit_sum(date.year);
    let y_r = reduce22(y_sum);
    let m = date.month;

    let top = reduce22(d1 + m + y_r);
    let combo = reduce22(date.day + m + y_sum + top);

    let right = reduce22(top + combo);
    let left = reduce22(top + y_r);
    let mr = reduce22(top + right);
    let ml = reduce22(top + left);
    let mb = reduce22(right + left);

    TriangleNumbers { top, left, right, ml, mr, mb }
}

/// Health triangle: the base sum feeds both the top and the left corner.
pub fn health_numbers(date: BirthDate) -> TriangleNumbers {
    let d1 = date.day_reduced();
    let m1 = reduce22(date.month);
    let y_r = date.year_reduced();

    let base = reduce22(d1 + m1 + y_r);

    let top = reduce22(d1 + m1 + y_r + base);
    let right = reduce22(top + d1);
    let left = reduce22(top + base);
    let mr = reduce22(top + right);
    let ml = reduce22(top + left);
    let mb = reduce22(right + left);

    TriangleNumbers { top, left, right, ml, mr, mb }
}

/// Mission numbers: a chain of six sums over day/month/year, then five
/// pairwise sums of adjacent chain terms folded into the second number.
pub fn mission_numbers(date: BirthDate) -> MissionNumbers {
    let one = date.day_reduced();
    let two = date.month;
    let three = year_reduced(date.year);
    let four = reduce22(one + two + three);
    let five = reduce22(one + two + three + four);
    let six = reduce22(one + two + three + four + five);

    let seven = reduce22(one + two);
    let eight = reduce22(two + three);
    let nine = reduce22(three + four);
    let ten = reduce22(four + five);
    let eleven = reduce22(five + one);

    let first = six;
    let second = reduce22(seven + eight + nine + ten + eleven);
    let third = reduce22(first + second);

    MissionNumbers { first, second, third }
}
