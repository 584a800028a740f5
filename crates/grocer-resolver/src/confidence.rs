use grocer_core::{ParsedItem, Unit};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::candidates::Candidate;

/// A candidate scoring at least this is considered a confident match.
pub const HIGH_CONFIDENCE_THRESHOLD: u8 = 80;

/// Shortest parsed name (exclusive) for which a quick-add option is offered.
const QUICK_ADD_MIN_NAME_CHARS: usize = 2;

/// Adds the item as typed, without binding it to any catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickAddOption {
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub price: Option<Decimal>,
}

/// Overall trust in a candidate set: `best * 0.7 + mean * 0.3`, rounded to
/// the nearest integer. An empty set scores 0.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)] // handful of candidates; result clamped to 0..=100
pub fn overall_confidence(candidates: &[Candidate]) -> u8 {
    let Some(best) = candidates.iter().map(|c| c.match_score).max() else {
        return 0;
    };
    let total: u32 = candidates.iter().map(|c| u32::from(c.match_score)).sum();
    let mean = f64::from(total) / candidates.len() as f64;
    (f64::from(best) * 0.7 + mean * 0.3).round().clamp(0.0, 100.0) as u8
}

/// Offers the parsed item as-is when nothing matched confidently and the name
/// is long enough to be meaningful.
#[must_use]
pub fn quick_add_option(parsed: &ParsedItem, candidates: &[Candidate]) -> Option<QuickAddOption> {
    let confident = candidates
        .iter()
        .any(|c| c.match_score >= HIGH_CONFIDENCE_THRESHOLD);
    let name = parsed.name.trim();
    if confident || name.chars().count() <= QUICK_ADD_MIN_NAME_CHARS {
        return None;
    }
    Some(QuickAddOption {
        name: name.to_owned(),
        quantity: parsed.quantity,
        unit: parsed.unit,
        price: parsed.price,
    })
}
