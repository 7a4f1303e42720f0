//! Application services - conversion cycles and their decision core

mod conversion_context;
mod conversion_service;
mod cycle;
mod drift_service;
mod escalation_gate;

pub use conversion_context::ConversionContext;
pub use conversion_service::ConversionService;
pub use cycle::{
    ConversionOutput, ConversionRequest, CycleOutcome, CycleReport, SuspendedCycle,
    SuspensionReason, SynthesisRequest, TranscriptionRequest,
};
pub use drift_service::DriftService;
pub use escalation_gate::EscalationGate;
