//! Item resolution for shopping lists: ranks canonical product candidates
//! for free-text items and binds items to the product the caller selects.

pub mod candidates;
pub mod confidence;
pub mod engine;
pub mod error;
pub mod pg;
pub mod sources;
pub mod store;

pub use candidates::{
    Candidate, CandidateAggregator, CandidateSet, CandidateSource, ExternalEnrichment,
    BARCODE_MATCH_SCORE, MAX_CANDIDATES,
};
pub use confidence::{
    overall_confidence, quick_add_option, QuickAddOption, HIGH_CONFIDENCE_THRESHOLD,
};
pub use engine::{
    ConversionChoice, ConversionEngine, ConversionResult, ConversionSuggestion, ResolverSettings,
};
pub use error::{ConversionError, SourceError, StoreError};
pub use pg::PgCatalog;
pub use sources::{
    BestPrice, ExternalCandidateSource, ExternalProduct, LocalCandidateSource, LocalProduct,
    PricePoint,
};
pub use store::{
    placeholder_barcode, CatalogProduct, ItemStore, NewProduct, PermissionChecker,
    PLACEHOLDER_BARCODE_PREFIX,
};
