//! Open Food Facts API response types.
//!
//! Only the fields the resolver reads are modelled. Open Food Facts is a
//! crowd-sourced database, so practically every field may be missing, `null`,
//! or an empty string; all of them are optional here and cleaned up in
//! [`crate::normalize`].

use serde::Deserialize;

/// Response from `GET /api/v2/product/{barcode}.json`.
///
/// `status` is `1` when the product exists and `0` otherwise (the API also
/// answers 404 for unknown barcodes, which the client handles first).
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub product: Option<RawProduct>,
}

/// Response from `GET /cgi/search.pl?...&json=1`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A product record as returned by either endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RawProduct {
    /// Barcode (EAN/UPC) as a digit string.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_name_en: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    /// Comma-separated brand list, e.g. `"Danone, Activia"`.
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_front_url: Option<String>,
    /// Nutri-Score letter `a`..`e`; may also be `"unknown"`.
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
    /// Older spelling of the Nutri-Score field.
    #[serde(default)]
    pub nutrition_grades: Option<String>,
    /// Comma-separated category list.
    #[serde(default)]
    pub categories: Option<String>,
}
