//! Domain entities - Objects with state and lifecycle

mod drift_state;
mod human_feedback;
mod phonetic_profile;
mod service_registration;

pub use drift_state::{DriftPolicy, DriftState, DriftTransition};
pub use human_feedback::HumanFeedback;
pub use phonetic_profile::PhoneticProfile;
pub use service_registration::ServiceRegistration;
