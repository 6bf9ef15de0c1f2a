// animal-talk-core/src/tools/audio.rs

//! One-shot audio conversion to MP3, delegated to ffmpeg.

use super::Tool;
use crate::config::ToolsConfig;
use crate::errors::ToolError;
use crate::models::tools::{
    ToolDefinition, ToolInput, ToolParameter, ToolParameterType, ToolParametersDefinition,
};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONVERT_AUDIO_TOOL: &str = "convert_audio";

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Size of the produced file on disk.
    pub bytes: u64,
}

impl fmt::Display for TranscodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "✓ Successfully converted: {} → {}",
            self.source.display(),
            self.destination.display()
        )?;
        write!(f, "✓ File size: {} bytes", format_thousands(self.bytes))
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Default MP3 destination for `source`: same path, `.mp3` extension.
pub fn default_destination(source: &Path) -> PathBuf {
    source.with_extension("mp3")
}

/// Makes sure an ffmpeg binary is available, optionally downloading a
/// static build next to the current executable.
pub fn ensure_ffmpeg(download: bool) -> Result<()> {
    if ffmpeg_is_installed() {
        return Ok(());
    }
    if !download {
        bail!("ffmpeg is not installed or not on PATH");
    }
    info!("ffmpeg not found, downloading a static build");
    ffmpeg_sidecar::download::auto_download().context("Failed to download ffmpeg")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Transcoder {
    bitrate_kbps: u32,
}

impl Transcoder {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self { bitrate_kbps }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.audio.bitrate_kbps)
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    /// Decodes `source` and writes it to `destination` as MP3.
    ///
    /// Any failure is reported as [`ToolError::Transcode`]. A destination
    /// that did not exist before the call is removed again on failure.
    pub fn transcode(&self, source: &Path, destination: &Path) -> Result<TranscodeReport, ToolError> {
        if source == destination {
            return Err(ToolError::Transcode(format!(
                "source and destination are the same file: {}",
                source.display()
            )));
        }

        let existed = destination.exists();
        info!(
            source = %source.display(),
            destination = %destination.display(),
            bitrate_kbps = self.bitrate_kbps,
            "Converting audio to MP3"
        );

        if let Err(e) = self.run_ffmpeg(source, destination) {
            warn!(source = %source.display(), error = %e, "Audio conversion failed");
            if !existed && destination.exists() {
                if let Err(remove_err) = fs::remove_file(destination) {
                    warn!(error = %remove_err, "Failed to remove partial output");
                }
            }
            return Err(ToolError::Transcode(format!("{:#}", e)));
        }

        let bytes = fs::metadata(destination)
            .map(|meta| meta.len())
            .map_err(|_| ToolError::Transcode("Conversion failed - file not created".to_string()))?;

        info!(destination = %destination.display(), bytes, "Audio conversion finished");
        Ok(TranscodeReport {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            bytes,
        })
    }

    fn run_ffmpeg(&self, source: &Path, destination: &Path) -> Result<()> {
        ensure_ffmpeg(false)?;

        let bitrate = format!("{}k", self.bitrate_kbps);
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .overwrite()
            .input(source)
            .args(["-vn", "-codec:a", "libmp3lame"])
            .args(["-b:a", bitrate.as_str()])
            .output(destination);
        debug!(bitrate = %bitrate, "Spawning ffmpeg");

        let mut child = command.spawn().context("Failed to spawn ffmpeg")?;
        let mut last_error: Option<String> = None;
        for event in child.iter().map_err(|e| anyhow!("Failed to read ffmpeg output: {}", e))? {
            match event {
                FfmpegEvent::Error(msg) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                    debug!("[ffmpeg error] {}", msg);
                    last_error = Some(msg);
                }
                FfmpegEvent::Log(level, msg) => {
                    debug!("[ffmpeg {:?}] {}", level, msg);
                }
                _ => {}
            }
        }

        let status = child.wait().context("Failed to wait for ffmpeg")?;
        if !status.success() {
            return Err(match last_error {
                Some(msg) => anyhow!(msg),
                None => anyhow!("ffmpeg exited with {}", status),
            });
        }
        Ok(())
    }
}

/// Tool wrapper resolving relative paths against the project root.
#[derive(Debug, Clone)]
pub struct ConvertAudioTool {
    transcoder: Transcoder,
    base_dir: PathBuf,
}

impl ConvertAudioTool {
    pub fn new(transcoder: Transcoder, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for ConvertAudioTool {
    fn definition(&self) -> ToolDefinition {
        let mut properties = BTreeMap::new();
        properties.insert(
            "source".to_string(),
            ToolParameter {
                param_type: ToolParameterType::String,
                description: "Audio file to convert, relative to the project directory.".to_string(),
                default: None,
            },
        );
        properties.insert(
            "destination".to_string(),
            ToolParameter {
                param_type: ToolParameterType::String,
                description: "Output MP3 path. Defaults to the source path with an .mp3 extension."
                    .to_string(),
                default: None,
            },
        );
        ToolDefinition {
            name: CONVERT_AUDIO_TOOL.to_string(),
            description: format!(
                "Converts an audio file to MP3 at {} kbps and reports the output size.",
                self.transcoder.bitrate_kbps()
            ),
            parameters: ToolParametersDefinition {
                properties,
                required: vec!["source".to_string()],
                ..Default::default()
            },
        }
    }

    async fn invoke(&self, input: ToolInput) -> Result<String, ToolError> {
        let source = self.base_dir.join(input.required_str("source")?);
        let destination = match input.optional_str("destination")? {
            Some(dst) => self.base_dir.join(dst),
            None => default_destination(&source),
        };
        let transcoder = self.transcoder.clone();
        let report = tokio::task::spawn_blocking(move || transcoder.transcode(&source, &destination))
            .await
            .map_err(|e| ToolError::Transcode(format!("conversion task failed: {}", e)))??;
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolErrorKind;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_default_destination_swaps_extension() {
        assert_eq!(
            default_destination(Path::new("attached_assets/GUINEAPIG.m4a")),
            PathBuf::from("attached_assets/GUINEAPIG.mp3")
        );
    }

    #[test]
    fn test_missing_source_fails_without_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("missing.m4a");
        let destination = dir.path().join("missing.mp3");
        let err = Transcoder::new(192).transcode(&source, &destination).unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::DecodeEncodeFailure);
        assert!(err.to_string().starts_with("✗ Error:"));
        assert!(!destination.exists(), "No destination should be left behind");
    }

    #[test]
    fn test_same_source_and_destination_rejected() {
        let path = Path::new("clip.mp3");
        let err = Transcoder::new(192).transcode(path, path).unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::DecodeEncodeFailure);
    }

    #[test]
    fn test_report_display() {
        let report = TranscodeReport {
            source: PathBuf::from("a.m4a"),
            destination: PathBuf::from("a.mp3"),
            bytes: 48213,
        };
        let text = report.to_string();
        assert!(text.contains("a.m4a → a.mp3"));
        assert!(text.contains("48,213 bytes"));
    }

    fn write_test_tone(path: &Path) -> Result<()> {
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .overwrite()
            .args(["-f", "lavfi", "-i", "sine=frequency=440:duration=1"])
            .output(path);
        let mut child = command.spawn()?;
        for _ in child.iter().map_err(|e| anyhow!("{}", e))? {}
        let status = child.wait()?;
        if !status.success() {
            bail!("ffmpeg could not generate a test tone");
        }
        Ok(())
    }

    #[test]
    fn test_transcode_produces_non_empty_mp3() {
        if !ffmpeg_is_installed() {
            println!("Skipping test_transcode_produces_non_empty_mp3: ffmpeg not found.");
            return;
        }
        let dir = tempdir().unwrap();
        let source = dir.path().join("tone.wav");
        let destination = dir.path().join("tone.mp3");
        write_test_tone(&source).unwrap();

        let report = Transcoder::new(192).transcode(&source, &destination).unwrap();
        assert!(destination.exists());
        assert!(report.bytes > 0);
        assert_eq!(report.bytes, fs::metadata(&destination).unwrap().len());
    }

    #[tokio::test]
    async fn test_tool_requires_source_argument() {
        let dir = tempdir().unwrap();
        let tool = ConvertAudioTool::new(Transcoder::new(192), dir.path());
        let err = tool.invoke(ToolInput::default()).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::InvalidArguments);

        let input = ToolInput::new(json!({ "source": "nope.m4a" }).as_object().cloned().unwrap_or_default());
        let err = tool.invoke(input).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::DecodeEncodeFailure);
        assert!(!dir.path().join("nope.mp3").exists());
    }
}
