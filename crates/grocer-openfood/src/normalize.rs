//! Normalization of raw Open Food Facts records into [`OffProduct`].

use serde::{Deserialize, Serialize};

use crate::types::RawProduct;

/// Nutri-Score values that carry no grade.
const UNGRADED: &[&str] = &["unknown", "not-applicable"];

/// A cleaned-up Open Food Facts product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffProduct {
    pub barcode: String,
    /// Best available display name; empty when the record has none.
    pub name: String,
    /// First brand of the comma-separated brand list.
    pub brand: Option<String>,
    pub image_url: Option<String>,
    /// Lowercase Nutri-Score letter.
    pub nutrition_grade: Option<String>,
    pub categories: Vec<String>,
}

/// Converts a raw record into an [`OffProduct`].
///
/// `fallback_barcode` is used when the record itself carries no `code`
/// (barcode lookups echo it at the envelope level instead). Returns `None`
/// when no barcode is available at all, since such a record cannot be
/// referenced later.
#[must_use]
pub fn normalize_product(raw: RawProduct, fallback_barcode: Option<&str>) -> Option<OffProduct> {
    let barcode = non_empty(raw.code)
        .or_else(|| fallback_barcode.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned))?;

    let name = non_empty(raw.product_name)
        .or_else(|| non_empty(raw.product_name_en))
        .or_else(|| non_empty(raw.generic_name))
        .unwrap_or_default();

    let brand = raw
        .brands
        .as_deref()
        .and_then(|b| b.split(',').map(str::trim).find(|s| !s.is_empty()))
        .map(str::to_owned);

    let nutrition_grade = non_empty(raw.nutriscore_grade)
        .or_else(|| non_empty(raw.nutrition_grades))
        .map(|g| g.to_lowercase())
        .filter(|g| !UNGRADED.contains(&g.as_str()));

    let categories = raw
        .categories
        .as_deref()
        .map(|c| {
            c.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Some(OffProduct {
        barcode,
        name,
        brand,
        image_url: non_empty(raw.image_url).or_else(|| non_empty(raw.image_front_url)),
        nutrition_grade,
        categories,
    })
}

/// Trims and treats empty strings as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
