//! Coverage recommendations for Spanish commercial property and liability insurance.
//!
//! A stored form submission is normalized into one `RiskProfile` per product line, run
//! through the fixed rule sets in `engine`, and assembled into an immutable
//! `Recommendation`. Renderers (HTTP JSON, text report, CSV export) only read the result.

pub mod domain;
pub mod engine;
pub mod form;
pub(crate) mod intake;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActivityFlags, CapitalesInfo, CapitalesSummary, CompanyInfo, CompanySummary, CompanyType,
    ConstructionInfo, CoverageItem, DeclaredValue, LeasedAsset, LiabilityProfile, Material,
    Ownership, PremisesOwner, ProductLine, ProductSelection, ProductType, PropertyExposures,
    PropertyProfile, ProtectionInfo, Recommendation, RefrigeratedGoods, Region, RiskProfile,
    SessionId, SpecialClause, TerritorialScope, UnknownProduct,
};
pub use engine::{AssemblyInvariantViolation, AssemblyMode, RecommendationEngine};
pub use form::{FormSubmission, LeasingEntry, LooseFlag, LooseNumber};
pub use intake::{InvalidProfileError, ProfileNormalizer};
pub use report::{text_report, write_csv, CoverageRow};
pub use repository::{ProfileRepository, RepositoryError, SessionRecord};
pub use router::recommendation_router;
pub use service::{RecommendationService, RecommendationServiceError};
