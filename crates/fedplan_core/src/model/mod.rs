//! Data model: value objects shared by every engine component

pub mod career;
pub mod market;
pub mod regulatory;
pub mod results;

pub use career::{CareerRecord, CreditableService};
pub use market::{HistoricalReturns, ReturnModel, ReturnProfile};
pub use regulatory::{
    AccrualTier, AnnuityRules, ContributionLimitEntry, ContributionLimitTable, LeaveRules, Mra,
    MraBracket, MraTable, RegulatoryTables,
};
pub use results::{
    AnnuityResult, DepletionStats, DistributionSummary, EligibilityKind, EligibilityResult,
    MonteCarloResult, PercentileBand, Phase, ProjectionResult, ProjectionYear, RothSnapshot,
    TraditionalSnapshot, YearlySnapshot,
};
