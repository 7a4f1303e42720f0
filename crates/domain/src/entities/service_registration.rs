//! Registration of a processing strategy with service discovery

use serde::{Deserialize, Serialize};

use crate::{
    errors::DomainError,
    value_objects::{GeomorphicCoordinate, ServiceKey, StrategyId},
};

/// Everything needed to place a strategy in the discovery tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    /// `(service, operation)` identity
    pub key: ServiceKey,
    /// Position used for nearest-match selection
    pub coordinate: GeomorphicCoordinate,
    /// Strategy the node selects
    pub strategy: StrategyId,
    /// Initial dynamic cost, decays on every lookup
    pub dynamic_cost: f32,
    /// Static confidence in the strategy
    pub confidence_score: f32,
}

impl ServiceRegistration {
    /// Default initial cost of a newly registered strategy
    pub const DEFAULT_COST: f32 = 1.0;
    /// Default confidence of a newly registered strategy
    pub const DEFAULT_CONFIDENCE: f32 = 1.0;

    /// Create a registration with default cost and confidence
    pub const fn new(key: ServiceKey, coordinate: GeomorphicCoordinate, strategy: StrategyId) -> Self {
        Self {
            key,
            coordinate,
            strategy,
            dynamic_cost: Self::DEFAULT_COST,
            confidence_score: Self::DEFAULT_CONFIDENCE,
        }
    }

    /// Set the initial dynamic cost
    #[must_use]
    pub const fn with_cost(mut self, cost: f32) -> Self {
        self.dynamic_cost = cost;
        self
    }

    /// Set the confidence score
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence_score = confidence;
        self
    }

    /// Check cost and confidence are usable
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for a negative or non-finite cost,
    /// or a confidence outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.dynamic_cost.is_finite() || self.dynamic_cost < 0.0 {
            return Err(DomainError::invalid_input(format!(
                "dynamic cost of {} must be finite and non-negative",
                self.key
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(DomainError::invalid_input(format!(
                "confidence score of {} must be within [0, 1]",
                self.key
            )));
        }
        Ok(())
    }
}
