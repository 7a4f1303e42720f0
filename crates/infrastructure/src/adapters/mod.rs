//! Infrastructure adapters
//!
//! Adapters connect ports to concrete implementations.

mod channel_validation;
mod ffmpeg_decoder;

pub use channel_validation::{ChannelValidationAdapter, ReviewerHandle, ValidationRequest};
pub use ffmpeg_decoder::{FfmpegMediaDecoder, pcm_from_f32le};
