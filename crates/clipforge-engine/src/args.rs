//! Pure ffmpeg argument builders, one per operation.
//!
//! Building the argument vectors separately from process spawning keeps
//! every filter expression unit-testable without invoking ffmpeg.

use std::path::Path;

use clipforge_core::models::{
    ExportFormat, FilterKind, FilterParams, ImageOverlayParams, Resolution, TextOverlayParams,
    TrimParams,
};

use crate::escape::escape_drawtext;

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Shared tail of every video-producing invocation: faststart so the
/// moov atom leads and partial downloads can begin playback.
fn finish(args: &mut Vec<String>, output: &Path) {
    args.extend_from_slice(&[
        "-movflags".to_string(),
        "faststart".to_string(),
        "-y".to_string(),
        path_arg(output),
    ]);
}

pub fn trim_args(input: &Path, output: &Path, params: &TrimParams) -> Vec<String> {
    let mut args = vec!["-i".to_string(), path_arg(input)];

    if params.start > 0.0 {
        args.extend_from_slice(&["-ss".to_string(), params.start.to_string()]);
    }
    // end <= start skips the duration clause: full remainder passes through.
    if let Some(end) = params.end {
        let duration = end - params.start;
        if duration > 0.0 {
            args.extend_from_slice(&["-t".to_string(), duration.to_string()]);
        }
    }

    finish(&mut args, output);
    args
}

/// The eq/hue expression for a color filter. Grayscale ignores the
/// numeric parameters; unrecognized kinds already collapsed to Custom.
pub fn filter_expression(params: &FilterParams) -> String {
    match params.kind {
        FilterKind::Grayscale => "hue=s=0".to_string(),
        FilterKind::Brightness => format!("eq=brightness={}", params.brightness),
        FilterKind::Contrast => format!("eq=contrast={}", params.contrast),
        FilterKind::Saturation => format!("eq=saturation={}", params.saturation),
        FilterKind::Custom => format!(
            "eq=brightness={}:contrast={}:saturation={}",
            params.brightness, params.contrast, params.saturation
        ),
    }
}

pub fn color_filter_args(input: &Path, output: &Path, params: &FilterParams) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(input),
        "-vf".to_string(),
        filter_expression(params),
    ];
    finish(&mut args, output);
    args
}

pub fn drawtext_filter(params: &TextOverlayParams) -> String {
    let mut drawtext = format!(
        "drawtext=text='{}':fontcolor={}:fontsize={}:x={}:y={}",
        escape_drawtext(&params.text),
        params.font_color,
        params.font_size,
        params.x,
        params.y
    );
    if params.box_enabled {
        drawtext.push_str(&format!(":box=1:boxcolor={}", params.box_color));
    }
    if let Some(end) = params.end {
        drawtext.push_str(&format!(":enable='between(t,{},{})'", params.start, end));
    } else if params.start > 0.0 {
        drawtext.push_str(&format!(":enable='gte(t,{})'", params.start));
    }
    drawtext
}

pub fn text_overlay_args(input: &Path, output: &Path, params: &TextOverlayParams) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(input),
        "-vf".to_string(),
        drawtext_filter(params),
    ];
    finish(&mut args, output);
    args
}

/// The filter_complex for an image overlay. When width, height or
/// opacity are present, the overlay input is pre-scaled and
/// alpha-adjusted into a `[logo]` label before compositing.
pub fn image_overlay_filter(params: &ImageOverlayParams) -> String {
    let mut filters = Vec::new();
    let mut overlay_input = "1:v";

    let prescale = params.width.is_some() || params.height.is_some() || params.opacity.is_some();
    if prescale {
        let scale_w = params
            .width
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-1".to_string());
        let scale_h = params
            .height
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-1".to_string());
        let mut parts = vec![format!("[1:v] scale={}:{}", scale_w, scale_h)];
        if let Some(opacity) = params.opacity {
            parts.push("format=rgba".to_string());
            parts.push(format!("colorchannelmixer=aa={:.2}", opacity));
        }
        filters.push(format!("{} [logo]", parts.join(",")));
        overlay_input = "logo";
    }

    let mut overlay = format!("[0:v][{}] overlay={}:{}", overlay_input, params.x, params.y);
    if params.start.is_some() || params.end.is_some() {
        let begin = params.start.unwrap_or(0.0).to_string();
        let end = params
            .end
            .map(|e| e.to_string())
            .unwrap_or_else(|| "N".to_string());
        overlay.push_str(&format!(":enable='between(t,{},{})'", begin, end));
    }
    overlay.push_str(" [outv]");
    filters.push(overlay);

    filters.join(";")
}

pub fn image_overlay_args(
    video: &Path,
    image: &Path,
    output: &Path,
    params: &ImageOverlayParams,
) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(video),
        "-i".to_string(),
        path_arg(image),
        "-filter_complex".to_string(),
        image_overlay_filter(params),
        "-map".to_string(),
        "[outv]".to_string(),
    ];
    finish(&mut args, output);
    args
}

pub fn mute_args(input: &Path, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(input),
        "-c:v".to_string(),
        "copy".to_string(),
        "-an".to_string(),
    ];
    finish(&mut args, output);
    args
}

pub fn replace_audio_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(video),
        "-i".to_string(),
        path_arg(audio),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-shortest".to_string(),
    ];
    finish(&mut args, output);
    args
}

/// Contents of the concat demuxer list file, one `file '...'` line per
/// clip in order. Backslashes are normalized for the demuxer.
pub fn concat_list_contents(clips: &[std::path::PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| format!("file '{}'", clip.to_string_lossy().replace('\\', "/")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn merge_args(list_file: &Path, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        path_arg(list_file),
        "-c".to_string(),
        "copy".to_string(),
    ];
    finish(&mut args, output);
    args
}

pub fn transcode_args(
    input: &Path,
    output: &Path,
    format: ExportFormat,
    resolution: Resolution,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), path_arg(input)];

    if let Some(filter) = resolution.scale_filter() {
        args.extend_from_slice(&["-vf".to_string(), filter.to_string()]);
    }

    match format {
        ExportFormat::Webm => {
            args.extend_from_slice(&[
                "-c:v".to_string(),
                "libvpx-vp9".to_string(),
                "-b:v".to_string(),
                "2M".to_string(),
                "-c:a".to_string(),
                "libopus".to_string(),
            ]);
        }
        ExportFormat::Mov => {
            args.extend_from_slice(&[
                "-c:v".to_string(),
                "prores_ks".to_string(),
                "-profile:v".to_string(),
                "3".to_string(),
            ]);
        }
        ExportFormat::Mp4 => {
            args.extend_from_slice(&[
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "medium".to_string(),
                "-crf".to_string(),
                "22".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
            ]);
        }
    }

    finish(&mut args, output);
    args
}

pub fn speed_args(input: &Path, output: &Path, factor: f64) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(input),
        "-vf".to_string(),
        format!("setpts={:.6}*PTS", 1.0 / factor),
        "-af".to_string(),
        format!("atempo={:.3}", factor),
    ];
    finish(&mut args, output);
    args
}
