//! Parallel per-chunk analysis
//!
//! Chunks are independent, so detection and summarization run on blocking
//! worker threads with no ordering between them. Results come back in input
//! order.

use domain::PhoneticProfile;
use tokio::task::JoinSet;
use tracing::{debug, instrument};

use super::features::{AudioFeatures, FeatureSummarizer};
use super::variation::{VariationDetector, VariationReport};
use crate::error::SpeechError;
use crate::types::PcmAudio;

/// Analysis result for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkAnalysis {
    /// Position of the chunk in the input
    pub index: usize,
    /// Variation detected in the chunk
    pub report: VariationReport,
    /// Acoustic summary of the chunk
    pub features: AudioFeatures,
    /// Profile flags as updated by this chunk alone
    pub profile: PhoneticProfile,
}

/// Analyze every chunk against its own copy of `profile`
///
/// # Errors
///
/// Returns the error of the first failing chunk in input order, or
/// `SpeechError::AudioProcessing` if a worker panicked.
#[instrument(skip(chunks, profile), fields(chunks = chunks.len()))]
pub async fn analyze_chunks(
    chunks: Vec<PcmAudio>,
    profile: &PhoneticProfile,
) -> Result<Vec<ChunkAnalysis>, SpeechError> {
    let total = chunks.len();
    let mut workers = JoinSet::new();
    for (index, chunk) in chunks.into_iter().enumerate() {
        let mut profile = profile.clone();
        workers.spawn_blocking(move || {
            let result = VariationDetector::new()
                .detect(chunk.samples(), chunk.sample_rate(), &mut profile)
                .and_then(|report| {
                    let features = FeatureSummarizer::new().summarize(chunk.samples())?;
                    Ok(ChunkAnalysis {
                        index,
                        report,
                        features,
                        profile,
                    })
                });
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<ChunkAnalysis, SpeechError>>> =
        (0..total).map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        let (index, result) = joined
            .map_err(|e| SpeechError::AudioProcessing(format!("Task join error: {e}")))?;
        slots[index] = Some(result);
    }

    let analyses = slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(SpeechError::AudioProcessing(
                    "chunk worker produced no result".to_string(),
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(chunks = analyses.len(), "Analyzed audio chunks");
    Ok(analyses)
}
