//! Star outer numbers and the compatibility sum structure.
//!
//! Only the five outer points of the star figure are needed here: the
//! compatibility report combines two participants' outer numbers into a
//! "sum" structure that drives its last four slides. The full star
//! rendering stays on the rendering API side.

use super::{digit_sum, reduce22, BirthDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The five outer star points for one birthdate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarOuter {
    /// Left point: reduced day.
    pub n1: u32,
    /// Top point: raw month.
    pub n2: u32,
    /// Right point: reduced year digit sum.
    pub n3: u32,
    /// Bottom-right point.
    pub n4: u32,
    /// Bottom-left point.
    pub n5: u32,
}

pub fn star_outer(date: BirthDate) -> StarOuter {
    let n1 = reduce22(date.day);
    let n2 = date.month;
    let n3 = reduce22(digit_sum(date.year));
    let n4 = reduce22(n1 + n2 + n3);
    let n5 = reduce22(n1 + n2 + n3 + n4);
    StarOuter { n1, n2, n3, n4, n5 }
}

/// Pairwise sums of two participants' outer numbers, as served by the
/// rendering API's sum endpoint. Values are the RAW sums - the consumer
/// reduces them (`reduce22` for top/ml/mr, `reduce9` for `br`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StarSumNumbers {
    pub top: u32,
    pub ml: u32,
    pub mr: u32,
    pub br: u32,
    pub bl: u32,
}

pub fn star_sum(you: BirthDate, partner: BirthDate) -> StarSumNumbers {
    let a = star_outer(you);
    let b = star_outer(partner);
    StarSumNumbers {
        top: a.n2 + b.n2,
        ml: a.n1 + b.n1,
        mr: a.n3 + b.n3,
        br: a.n4 + b.n4,
        bl: a.n5 + b.n5,
    }
}
