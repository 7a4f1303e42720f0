//! FFmpeg-backed media decoder
//!
//! Pipes the container through FFmpeg and reads back mono 32-bit float PCM
//! (`f32le`) at the configured sample rate. FFmpeg must be installed on the
//! system.

use std::process::Stdio;

use ai_speech::{AudioFormat, MediaDecoder, PcmAudio, SpeechConfig, SpeechError};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Bytes per decoded sample
const SAMPLE_WIDTH: usize = std::mem::size_of::<f32>();

/// Media decoder shelling out to FFmpeg
#[derive(Debug, Clone)]
pub struct FfmpegMediaDecoder {
    ffmpeg_path: String,
    sample_rate: u32,
}

impl Default for FfmpegMediaDecoder {
    fn default() -> Self {
        Self::from_config(&SpeechConfig::default())
    }
}

impl FfmpegMediaDecoder {
    /// Create a decoder with the FFmpeg path and sample rate of `config`
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            sample_rate: config.sample_rate,
        }
    }

    /// FFmpeg binary path
    #[must_use]
    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    /// Output sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Check if FFmpeg is available on the system
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    /// FFmpeg arguments decoding `format` from stdin to mono `f32le` on stdout
    fn arguments(&self, format: AudioFormat) -> Vec<String> {
        [
            "-loglevel",
            "error",
            "-f",
            format.demuxer(),
            "-i",
            "pipe:0",
            "-vn",
            "-ac",
            "1",
            "-ar",
        ]
        .into_iter()
        .map(str::to_string)
        .chain([self.sample_rate.to_string()])
        .chain(["-f", "f32le", "pipe:1"].into_iter().map(str::to_string))
        .collect()
    }
}

/// Reassemble little-endian `f32` samples
///
/// # Errors
///
/// Returns `SpeechError::AudioProcessing` if the byte count is not a whole
/// number of samples, or a `PcmAudio` validation error.
pub fn pcm_from_f32le(bytes: &[u8], sample_rate: u32) -> Result<PcmAudio, SpeechError> {
    if bytes.len() % SAMPLE_WIDTH != 0 {
        return Err(SpeechError::AudioProcessing(format!(
            "decoder output of {} bytes is not a whole number of samples",
            bytes.len()
        )));
    }
    let samples = bytes
        .chunks_exact(SAMPLE_WIDTH)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    PcmAudio::new(samples, sample_rate)
}

#[async_trait]
impl MediaDecoder for FfmpegMediaDecoder {
    #[instrument(skip(self, bytes), fields(bytes = bytes.len(), format = %format))]
    async fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<PcmAudio, SpeechError> {
        if bytes.is_empty() {
            return Err(SpeechError::invalid_input("media buffer is empty"));
        }

        let mut child = Command::new(&self.ffmpeg_path)
            .args(self.arguments(format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to spawn FFmpeg: {e}")))?;

        let stdin = child.stdin.take();
        // stdout is drained while stdin is written, so large inputs cannot
        // stall on a full pipe
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(bytes).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output = output
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to wait for FFmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::AudioProcessing(format!(
                "FFmpeg decoding failed: {}",
                stderr.trim()
            )));
        }
        written.map_err(|e| {
            SpeechError::AudioProcessing(format!("Failed to write to FFmpeg stdin: {e}"))
        })?;

        let audio = pcm_from_f32le(&output.stdout, self.sample_rate)?;
        debug!(
            samples = audio.len(),
            duration_ms = audio.duration_ms(),
            "Decoding successful"
        );
        Ok(audio)
    }
}
