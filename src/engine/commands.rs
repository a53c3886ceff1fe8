//! Engine command lines for the per-segment encode and the final stitch

/// Output frame width in pixels
pub const VIDEO_WIDTH: u32 = 1080;
/// Output frame height in pixels
pub const VIDEO_HEIGHT: u32 = 1920;
/// Output frame rate
pub const FPS: u32 = 30;

/// Fixed encode profile of the produced short
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProfile {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: &'static str,
    pub pixel_format: &'static str,
    /// Encoder thread count, engine default when `None`
    pub threads: Option<usize>,
}

impl VideoProfile {
    /// 1080x1920 @ 30fps, H.264 yuv420p, no audio
    pub fn vertical_short() -> Self {
        Self {
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
            fps: FPS,
            codec: "libx264",
            pixel_format: "yuv420p",
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Scale down to fit, then letterbox to the exact frame size, centered
    pub fn scale_pad_filter(&self) -> String {
        format!(
            "scale={w}:{h}:flags=lanczos:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
            w = self.width,
            h = self.height
        )
    }

    /// Loop one still image for `duration` seconds into a video-only clip
    pub fn segment_encode_args(&self, slide: &str, duration: &str, output: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-loop".into(),
            "1".into(),
            "-t".into(),
            duration.into(),
            "-i".into(),
            slide.into(),
            "-vf".into(),
            self.scale_pad_filter(),
            "-r".into(),
            self.fps.to_string(),
            "-an".into(),
            "-c:v".into(),
            self.codec.into(),
            "-pix_fmt".into(),
            self.pixel_format.into(),
        ];
        if let Some(threads) = self.threads {
            args.push("-threads".into());
            args.push(threads.to_string());
        }
        args.push(output.into());
        args
    }
}

impl Default for VideoProfile {
    fn default() -> Self {
        Self::vertical_short()
    }
}

/// Concatenate the clips listed in `manifest` by stream copy
pub fn concat_args(manifest: &str, output: &str) -> Vec<String> {
    [
        "-f", "concat", "-safe", "0", "-i", manifest, "-c", "copy", output,
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

/// Concat-demuxer list: one `file <name>` line per clip, in order
pub fn manifest_body(clips: &[String]) -> String {
    clips
        .iter()
        .map(|clip| format!("file {}", clip))
        .collect::<Vec<_>>()
        .join("\n")
}
