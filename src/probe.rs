//! External metadata probing
//!
//! Invokes ffprobe once per file with JSON output and distills the
//! container- and stream-level fields into [`VideoDetails`]. ffprobe emits
//! most numbers as strings, so the deserializers accept either form and
//! fall back to zero.

use serde::{Deserialize, Deserializer};
use std::process::Command;

use crate::error::LibraryError;
use crate::format::{to_readable_size, to_timestamp};
use crate::models::VideoDetails;

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    #[serde(default, deserialize_with = "lenient_f64")]
    duration: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: String,
    #[serde(default)]
    codec_name: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::String(s) => s.trim().parse().unwrap_or(0.0),
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n as u64,
        NumberOrString::String(s) => s.trim().parse().unwrap_or(0),
    })
}

/// Probe one file with the external utility and derive its details
pub fn video_details(ffprobe_bin: &str, path: &str) -> Result<VideoDetails, LibraryError> {
    let probe_err = |reason: String| LibraryError::Probe {
        path: path.into(),
        reason,
    };

    let output = Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| probe_err(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(probe_err(stderr));
    }

    details_from_json(&output.stdout).map_err(|e| probe_err(e.to_string()))
}

/// Distill raw ffprobe JSON into details
fn details_from_json(raw: &[u8]) -> Result<VideoDetails, serde_json::Error> {
    let probe: ProbeOutput = serde_json::from_slice(raw)?;

    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let (codec, width, height) = video_stream
        .map(|s| (s.codec_name.clone(), s.width, s.height))
        .unwrap_or_default();

    Ok(VideoDetails {
        duration_in_secs: probe.format.duration,
        duration: to_timestamp(probe.format.duration),
        size_in_bytes: probe.format.size,
        size: to_readable_size(probe.format.size),
        codec,
        width,
        height,
        resolution: format!("{}x{}", width, height),
    })
}
