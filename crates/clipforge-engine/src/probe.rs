//! ffprobe output parsing.

use serde::Deserialize;

use clipforge_core::models::VideoProbe;

pub const PROBE_ARGS: &[&str] = &[
    "-v",
    "quiet",
    "-print_format",
    "json",
    "-show_format",
    "-show_streams",
];

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe reports duration as a decimal string.
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
}

/// Evaluate an ffprobe rate fraction like `30000/1001`.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Map a raw ffprobe JSON document onto the first video stream.
pub fn parse_probe_output(json: &[u8]) -> Result<VideoProbe, serde_json::Error> {
    let doc: ProbeDocument = serde_json::from_slice(json)?;

    let video_stream = doc
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    Ok(VideoProbe {
        duration: doc
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse().ok()),
        width: video_stream.and_then(|s| s.width),
        height: video_stream.and_then(|s| s.height),
        codec: video_stream.and_then(|s| s.codec_name.clone()),
        frame_rate: video_stream
            .and_then(|s| s.avg_frame_rate.as_deref())
            .and_then(parse_frame_rate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "codec_type": "audio",
                "codec_name": "aac"
            },
            {
                "codec_type": "video",
                "codec_name": "h264",
                "width": 1920,
                "height": 1080,
                "avg_frame_rate": "30000/1001"
            }
        ],
        "format": {
            "duration": "5.005000"
        }
    }"#;

    #[test]
    fn test_parse_probe_output() {
        let probe = parse_probe_output(SAMPLE.as_bytes()).unwrap();
        assert_eq!(probe.duration, Some(5.005));
        assert_eq!(probe.width, Some(1920));
        assert_eq!(probe.height, Some(1080));
        assert_eq!(probe.codec.as_deref(), Some("h264"));
        let rate = probe.frame_rate.unwrap();
        assert!((rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_probe_without_video_stream() {
        let json = r#"{"streams":[{"codec_type":"audio","codec_name":"mp3"}],"format":{"duration":"3.2"}}"#;
        let probe = parse_probe_output(json.as_bytes()).unwrap();
        assert_eq!(probe.duration, Some(3.2));
        assert_eq!(probe.width, None);
        assert_eq!(probe.codec, None);
    }

    #[test]
    fn test_frame_rate_fraction_edge_cases() {
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("25"), None);
        assert_eq!(parse_frame_rate("50/2"), Some(25.0));
    }
}
