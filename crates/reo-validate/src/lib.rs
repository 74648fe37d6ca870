//! Schema-driven validation and normalization of nested scenario documents.
//!
//! A `Validator` runs seven passes over the document, in order: unknown keys
//! are removed, nulls stripped, values coerced to their declared types,
//! defaults inserted, bounds checked, required inputs resolved, and finally
//! the object-specific rules applied (identifier and text checks, wind siting,
//! generator fuel curves, load profiles, utility tariffs). Findings are
//! collected in a `ValidationReport`; the pipeline never stops early.

mod passes;
mod report;
mod services;
mod timeseries;
mod tree;
mod validator;
mod walker;

/// Individual passes and their fixed order.
pub use passes::{
    DefaultFiller, KeyFilter, NullStrip, RangeChecker, RequiredResolver, SpecialCaseRules,
    TypeCoercion, pipeline,
};
/// Report types.
pub use report::{
    INVALID_INPUTS_MESSAGE, InputWarning, ReportMessages, ValidationReport, WarningMessages,
};
/// Collaborators used by the object rules.
pub use services::{
    BoundedSiting, DieselFuelBurn, FuelBurnModel, LoadProfileRequest, LoadProfileSource,
    NoBuiltInProfiles, ServiceError, Services, SitingGeometry,
};
/// Time-series length checks and resampling.
pub use timeseries::{
    HOURS_PER_YEAR, InvalidSeriesLength, Resampled, TimeSeriesNormalizer, WHOLESALE_SERIES,
};
/// Path-addressed document.
pub use tree::ConfigTree;
/// Validator entry point.
pub use validator::{
    TOP_LEVEL_LABEL, ValidationOutcome, ValidationSummary, Validator, ValidatorBuilder,
};
/// Traversal engine.
pub use walker::{Pass, PassContext, TreeWalker};
