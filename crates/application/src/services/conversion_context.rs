//! Conversion context - the explicit per-session state of the core
//!
//! Holds drift, the current coordinate and the speaker profile, and shares
//! a service directory with other contexts. Nothing in the core lives in
//! process-wide state; every operation is handed a context.

use std::{fmt, sync::Arc};

use domain::{Coordinate, PhoneticProfile};
use parking_lot::Mutex;

use super::drift_service::DriftService;
use crate::config::ConversionConfig;
use crate::discovery::{DiscoveryTree, ServiceDirectory};
use crate::error::ApplicationError;

/// Mutable state threaded through conversion cycles
pub struct ConversionContext {
    drift: DriftService,
    coordinate: Mutex<Coordinate>,
    profile: Mutex<PhoneticProfile>,
    directory: Arc<ServiceDirectory>,
}

impl fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("drift", &self.drift.snapshot())
            .field("coordinate", &*self.coordinate.lock())
            .field("strategies", &self.directory.len())
            .finish_non_exhaustive()
    }
}

impl ConversionContext {
    /// Create a context sharing `directory`
    ///
    /// # Errors
    ///
    /// Returns a domain error if the configured drift policy or tolerance
    /// is out of range.
    pub fn new(
        config: &ConversionConfig,
        directory: Arc<ServiceDirectory>,
    ) -> Result<Self, ApplicationError> {
        Ok(Self {
            drift: DriftService::new(config.drift_policy())?,
            coordinate: Mutex::new(Coordinate::neutral()),
            profile: Mutex::new(config.initial_profile()?),
            directory,
        })
    }

    /// Create a context with a directory of its own
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidInput` for an out-of-range read
    /// bias, or see [`ConversionContext::new`].
    pub fn with_own_directory(config: &ConversionConfig) -> Result<Self, ApplicationError> {
        let tree = DiscoveryTree::new(config.initial_tree_mode)
            .with_read_bias(config.hybrid_read_bias)?;
        Self::new(config, Arc::new(ServiceDirectory::from_tree(tree)))
    }

    /// Replace the speaker profile
    ///
    /// # Errors
    ///
    /// Returns a domain error if the profile is invalid.
    pub fn with_profile(self, profile: PhoneticProfile) -> Result<Self, ApplicationError> {
        profile.validate()?;
        *self.profile.lock() = profile;
        Ok(self)
    }

    /// Drift state of this context
    #[must_use]
    pub const fn drift(&self) -> &DriftService {
        &self.drift
    }

    /// Shared service directory
    #[must_use]
    pub const fn directory(&self) -> &Arc<ServiceDirectory> {
        &self.directory
    }

    /// Current coordinate
    pub fn coordinate(&self) -> Coordinate {
        *self.coordinate.lock()
    }

    pub(crate) fn set_coordinate(&self, coordinate: Coordinate) {
        *self.coordinate.lock() = coordinate;
    }

    /// Move the coordinate after an accepted correction
    pub(crate) fn nudge_coordinate(&self) -> Coordinate {
        let mut coordinate = self.coordinate.lock();
        *coordinate = coordinate.nudged_by_correction();
        *coordinate
    }

    /// Copy of the speaker profile
    pub fn profile(&self) -> PhoneticProfile {
        self.profile.lock().clone()
    }

    /// Run `f` against the live profile
    pub(crate) fn update_profile<R>(&self, f: impl FnOnce(&mut PhoneticProfile) -> R) -> R {
        f(&mut self.profile.lock())
    }
}
