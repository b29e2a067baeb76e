//! Filter-graph construction shared by all encoding tiers.
//!
//! All tiers use the same scale/fps chain; the two-pass tier additionally
//! builds `palettegen` / `paletteuse` expressions around it. Keeping these
//! as pure string builders makes the exact command lines unit-testable.

use gifforge_core::ConversionOptions;

/// `scale=W:H:flags=lanczos`; height `-1` preserves aspect ratio.
pub fn scale_filter(width: u32, height: Option<u32>) -> String {
    match height {
        Some(h) => format!("scale={width}:{h}:flags=lanczos"),
        None => format!("scale={width}:-1:flags=lanczos"),
    }
}

/// Plain `scale=W:H` without resampler flags, for reverse conversion.
pub fn plain_scale(width: u32, height: Option<u32>) -> String {
    match height {
        Some(h) => format!("scale={width}:{h}"),
        None => format!("scale={width}:-1"),
    }
}

/// The scale+fps chain shared by every tier.
pub fn video_filters(options: &ConversionOptions) -> Vec<String> {
    vec![
        scale_filter(options.width, options.height),
        format!("fps={}", options.fps),
    ]
}

/// Stage-1 filter chain: scale+fps then `palettegen`, reserving a
/// transparent palette slot when requested.
pub fn palette_filters(options: &ConversionOptions) -> String {
    let mut filters = video_filters(options);
    if options.transparency {
        filters.push("palettegen=reserve_transparent=1".to_string());
    } else {
        filters.push("palettegen".to_string());
    }
    filters.join(",")
}

/// Stage-2 filter graph: apply the scale+fps chain to the input stream and
/// map it through the stage-1 palette.
///
/// Ordered (Bayer) dithering with `diff_mode=rectangle` reduces flicker
/// versus naive per-pixel diffing.
pub fn paletteuse_graph(options: &ConversionOptions) -> String {
    let base = video_filters(options).join(",");
    if options.transparency {
        format!("[0:v]{base}[v];[v][1:v]paletteuse=dither=bayer:bayer_scale=5:diff_mode=rectangle")
    } else {
        format!("[0:v]{base}[v];[v][1:v]paletteuse")
    }
}

/// Trim arguments: `-ss` seek, then `-to` (absolute end, when a start is
/// present) or `-t` (duration, when it is not).
pub fn trim_args(options: &ConversionOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(ref start) = options.trim_start {
        args.push("-ss".to_string());
        args.push(start.clone());
    }
    if let Some(ref end) = options.trim_end {
        if options.trim_start.is_some() {
            args.push("-to".to_string());
        } else {
            args.push("-t".to_string());
        }
        args.push(end.clone());
    }
    args
}

/// Loop arguments: `-loop 0` loops forever, `-loop N` plays N extra times.
pub fn loop_args(loop_count: u16) -> [String; 2] {
    ["-loop".to_string(), loop_count.to_string()]
}
