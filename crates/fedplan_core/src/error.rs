use std::fmt;

/// Errors raised when an input falls outside the domain of a component.
///
/// Every deterministic component fails fast with one of these; nothing is clamped silently.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Negative {
        field: &'static str,
        value: f64,
    },
    NotFinite {
        field: &'static str,
    },
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Career dates or service figures are inconsistent with each other
    InvalidCareer(&'static str),
    /// Monte Carlo was asked to run zero trials
    ZeroIterations,
    /// Monte Carlo needs a return model and none was configured
    MissingReturnModel,
    /// A regulatory lookup table has no entries
    EmptyTable(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            ValidationError::NotFinite { field } => write!(f, "{field} must be a finite number"),
            ValidationError::OutOfRange {
                field,
                value,
                reason,
            } => write!(f, "{field} out of range (got {value}): {reason}"),
            ValidationError::InvalidCareer(msg) => write!(f, "invalid career record: {msg}"),
            ValidationError::ZeroIterations => {
                write!(f, "Monte Carlo iterations must be at least 1")
            }
            ValidationError::MissingReturnModel => {
                write!(f, "no return model configured for Monte Carlo simulation")
            }
            ValidationError::EmptyTable(name) => write!(f, "{name} table has no entries"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check that a value is finite and non-negative, returning it unchanged.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// A growth rate below -100% would turn a balance negative.
pub(crate) fn growth_rate(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    let value = finite(field, value)?;
    if value < -1.0 {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            reason: "rate must be at least -1.0",
        });
    }
    Ok(value)
}

/// Errors from leave accrual and usage
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveError {
    Validation(ValidationError),
    InsufficientBalance { requested: f64, available: f64 },
}

impl fmt::Display for LeaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveError::Validation(e) => write!(f, "{e}"),
            LeaveError::InsufficientBalance {
                requested,
                available,
            } => write!(
                f,
                "insufficient leave balance: requested {requested} hours, {available} available"
            ),
        }
    }
}

impl std::error::Error for LeaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaveError::Validation(e) => Some(e),
            LeaveError::InsufficientBalance { .. } => None,
        }
    }
}

impl From<ValidationError> for LeaveError {
    fn from(e: ValidationError) -> Self {
        LeaveError::Validation(e)
    }
}

/// Errors related to return-distribution sampling
#[derive(Debug, Clone, PartialEq)]
pub enum MarketError {
    InvalidDistributionParameters {
        profile_type: &'static str,
        mean: f64,
        std_dev: f64,
        reason: &'static str,
    },
    /// Historical data is empty and cannot be sampled
    EmptyHistoricalData,
    /// A return model produced a sequence of the wrong length
    SequenceLength { expected: usize, actual: usize },
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::InvalidDistributionParameters {
                profile_type,
                mean,
                std_dev,
                reason,
            } => {
                write!(
                    f,
                    "invalid {profile_type} parameters (mean={mean}, std_dev={std_dev}): {reason}"
                )
            }
            MarketError::EmptyHistoricalData => write!(f, "historical data is empty"),
            MarketError::SequenceLength { expected, actual } => write!(
                f,
                "return model produced {actual} annual returns, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for MarketError {}

/// Errors surfaced by the full-horizon projection and the Monte Carlo simulator
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Validation(ValidationError),
    Market(MarketError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Validation(e) => write!(f, "{e}"),
            SimulationError::Market(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Validation(e) => Some(e),
            SimulationError::Market(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SimulationError {
    fn from(e: ValidationError) -> Self {
        SimulationError::Validation(e)
    }
}

impl From<MarketError> for SimulationError {
    fn from(e: MarketError) -> Self {
        SimulationError::Market(e)
    }
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
