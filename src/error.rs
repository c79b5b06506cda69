use crate::schema::CalendarMonth;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Cannot format non-finite amount: {0}")]
    FormatError(f64),

    #[error("Data integrity violation: {0}")]
    DataIntegrityError(String),

    #[error("Profit invariant violated for {month}: revenue ({revenue}) - cost ({cost}) != profit ({profit}), off by {difference}")]
    ProfitMismatch {
        month: CalendarMonth,
        revenue: f64,
        cost: f64,
        profit: f64,
        difference: f64,
    },

    #[error("Invalid period range: {start} comes after {end}")]
    InvalidRangeError {
        start: CalendarMonth,
        end: CalendarMonth,
    },

    #[error("Empty selection: {0}")]
    EmptySelectionError(String),

    #[error("Division by zero while computing {0}")]
    DivisionByZeroError(String),

    #[error("Non-finite value while computing {0}")]
    NonFiniteValue(String),

    #[error("Malformed period: {0}")]
    MalformedPeriod(String),

    #[error("Insufficient data: need at least {required} records, got {actual}")]
    InsufficientDataError { required: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl KpiError {
    /// Integrity failures mean the canonical tables cannot be trusted; the host
    /// should abort startup rather than retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KpiError::DataIntegrityError(_) | KpiError::ProfitMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KpiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_integrity_errors_are_fatal() {
        assert!(KpiError::DataIntegrityError("dup".to_string()).is_fatal());
        assert!(KpiError::ProfitMismatch {
            month: CalendarMonth::Mar,
            revenue: 10.0,
            cost: 4.0,
            profit: 5.0,
            difference: 1.0,
        }
        .is_fatal());

        assert!(!KpiError::FormatError(f64::NAN).is_fatal());
        assert!(!KpiError::EmptySelectionError("x".to_string()).is_fatal());
        assert!(!KpiError::NonFiniteValue("growth rate".to_string()).is_fatal());
        assert!(!KpiError::MalformedPeriod("Jan:Fév:Mar".to_string()).is_fatal());
        assert!(!KpiError::InsufficientDataError {
            required: 2,
            actual: 1
        }
        .is_fatal());
    }

    #[test]
    fn test_range_error_message_uses_labels() {
        let err = KpiError::InvalidRangeError {
            start: CalendarMonth::Dec,
            end: CalendarMonth::Jan,
        };
        assert_eq!(
            err.to_string(),
            "Invalid period range: Déc comes after Jan"
        );
    }
}
