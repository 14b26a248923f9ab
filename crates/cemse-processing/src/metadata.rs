//! Media metadata types

use serde::{Deserialize, Serialize};

/// Summary of a media file as reported by ffprobe.
///
/// Only used for diagnostics after a conversion; nothing depends on it for
/// correctness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub duration: Option<f64>,
    pub format_name: Option<String>,
    pub video_streams: usize,
    pub audio_streams: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

/// Raw `ffprobe -print_format json -show_format -show_streams` output.
#[derive(Debug, Deserialize)]
pub(crate) struct ProbeOutput {
    #[serde(default)]
    pub format: Option<ProbeFormat>,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProbeFormat {
    pub format_name: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<ProbeOutput> for MediaInfo {
    fn from(probe: ProbeOutput) -> Self {
        let mut info = MediaInfo::default();

        if let Some(format) = probe.format {
            info.duration = format.duration.and_then(|d| d.parse::<f64>().ok());
            info.format_name = format.format_name;
        }

        for stream in probe.streams {
            match stream.codec_type.as_deref() {
                Some("video") => {
                    info.video_streams += 1;
                    if info.video_codec.is_none() {
                        info.video_codec = stream.codec_name;
                        info.width = stream.width;
                        info.height = stream.height;
                    }
                }
                Some("audio") => {
                    info.audio_streams += 1;
                    if info.audio_codec.is_none() {
                        info.audio_codec = stream.codec_name;
                    }
                }
                _ => {}
            }
        }

        info
    }
}
