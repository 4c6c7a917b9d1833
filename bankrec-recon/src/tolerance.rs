use serde::{Deserialize, Serialize};

/// Matching tolerances. Echoed verbatim into the report's `parameters`
/// section so runs are reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Maximum absolute amount difference, in currency units.
    pub amount: f64,
    /// Maximum date difference, in days.
    pub days: i64,
    /// Minimum description similarity for a fuzzy (vs. partial) match.
    pub similarity_threshold: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            amount: 1.0,
            days: 3,
            similarity_threshold: 0.5,
        }
    }
}

/// Configuration errors; rejected before any matching work begins.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ToleranceError {
    #[error("amount tolerance must be non-negative, got {0}")]
    NegativeAmount(f64),
    #[error("date tolerance must be non-negative, got {0}")]
    NegativeDays(i64),
    #[error("similarity threshold must be within 0.0..=1.0, got {0}")]
    ThresholdOutOfRange(f64),
}

impl Tolerance {
    pub fn validate(&self) -> Result<(), ToleranceError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ToleranceError::NegativeAmount(self.amount));
        }
        if self.days < 0 {
            return Err(ToleranceError::NegativeDays(self.days));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ToleranceError::ThresholdOutOfRange(self.similarity_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tolerance::default().validate().is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        let t = Tolerance { amount: -1.0, ..Tolerance::default() };
        assert_eq!(t.validate(), Err(ToleranceError::NegativeAmount(-1.0)));

        let t = Tolerance { days: -3, ..Tolerance::default() };
        assert_eq!(t.validate(), Err(ToleranceError::NegativeDays(-3)));

        let t = Tolerance { similarity_threshold: 1.5, ..Tolerance::default() };
        assert_eq!(t.validate(), Err(ToleranceError::ThresholdOutOfRange(1.5)));
    }
}
