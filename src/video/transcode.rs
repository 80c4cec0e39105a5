//! Re-encodes an upload to H.264 with the external `ffmpeg` binary.
//!
//! Everything downstream — frame access and playback alike — operates on the
//! transcoded output, never the original upload.

use std::path::Path;
use std::process::Command;

use crate::error::SeekError;

pub fn to_h264(ffmpeg: &str, input: &Path, output: &Path) -> Result<(), SeekError> {
    tracing::info!("transcoding {} -> {}", input.display(), output.display());

    let result = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-c:v")
        .arg("libx264")
        .arg(output)
        .output();

    let output = result.map_err(|e| SeekError::Transcode(format!("failed to run {ffmpeg}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail = stderr.lines().rev().take(4).collect::<Vec<_>>();
        return Err(SeekError::Transcode(
            tail.into_iter().rev().collect::<Vec<_>>().join(" | "),
        ));
    }

    Ok(())
}
