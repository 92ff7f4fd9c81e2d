use std::fmt;
use std::path::Path;

use crate::engines::MediaProber;
use crate::error::{EngineResultExt, EngineStage, ReelError, ReelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

impl StreamKind {
    /// ffprobe `codec_type` value for this kind
    pub fn codec_type(self) -> &'static str {
        match self {
            StreamKind::Audio => "audio",
            StreamKind::Video => "video",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_type())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamInfo {
    pub codec_type: String,
    pub duration: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl StreamInfo {
    pub fn is(&self, kind: StreamKind) -> bool {
        self.codec_type == kind.codec_type()
    }
}

/// Stream listing for one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub streams: Vec<StreamInfo>,
    pub format_duration: Option<f64>,
}

impl ProbeReport {
    pub fn first_stream(&self, kind: StreamKind) -> Option<&StreamInfo> {
        self.streams.iter().find(|stream| stream.is(kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoStreamInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

/// Duration in seconds of the first `kind` stream in `path`.
///
/// Falls back to the container duration when the stream itself does not
/// declare one (Matroska and WebM store it only at the format level).
pub fn probe_duration(prober: &dyn MediaProber, path: &Path, kind: StreamKind) -> ReelResult<f64> {
    let report = prober.probe(path).engine_stage(EngineStage::Probe)?;
    let stream = find_stream(&report, path, kind)?;
    stream_duration(&report, stream, path)
}

/// Duration and frame size of the first video stream in `path`.
pub fn probe_video(prober: &dyn MediaProber, path: &Path) -> ReelResult<VideoStreamInfo> {
    let report = prober.probe(path).engine_stage(EngineStage::Probe)?;
    let stream = find_stream(&report, path, StreamKind::Video)?;
    let duration = stream_duration(&report, stream, path)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok(VideoStreamInfo {
            duration,
            width,
            height,
        }),
        _ => Err(ReelError::ExternalEngineFailure {
            stage: EngineStage::Probe,
            message: format!("{} does not declare a frame size", path.display()),
        }),
    }
}

fn find_stream<'a>(
    report: &'a ProbeReport,
    path: &Path,
    kind: StreamKind,
) -> ReelResult<&'a StreamInfo> {
    report
        .first_stream(kind)
        .ok_or_else(|| ReelError::StreamNotFound {
            kind,
            path: path.to_path_buf(),
        })
}

fn stream_duration(report: &ProbeReport, stream: &StreamInfo, path: &Path) -> ReelResult<f64> {
    stream
        .duration
        .or(report.format_duration)
        .ok_or_else(|| ReelError::ExternalEngineFailure {
            stage: EngineStage::Probe,
            message: format!("{} does not declare a {} duration", path.display(), stream.codec_type),
        })
}
