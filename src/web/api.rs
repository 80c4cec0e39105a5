use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::align::align;
use crate::cli::Args;
use crate::error::SeekError;
use crate::eventlog::{row_time, EventLog};
use crate::video::transcode;
use crate::window::{extract_window, scan_clock, ScanEntry, VideoWindow, WindowCache};

/// Shared server state: configuration plus the per-process window cache.
/// Selection state itself lives in the client and comes back explicitly
/// with each alignment request.
pub struct AppState {
    pub args: Args,
    pub windows: Mutex<WindowCache>,
}

#[derive(Serialize)]
pub struct VideoInfo {
    pub name: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct WindowInfo {
    pub usable: bool,
    pub start: Option<String>,
    pub end: Option<String>,
    pub span_seconds: Option<f64>,
}

#[derive(Serialize)]
pub struct LogPayload {
    pub time_column: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UploadParams {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ScanParams {
    pub interval: Option<f64>,
}

#[derive(Deserialize)]
pub struct AlignRequest {
    pub video: String,
    /// Raw timestamp field of the selected log row, `<date> <time>`.
    pub timestamp_field: String,
    /// Optional forward jump, in the deployment's clock format.
    pub jump_time: Option<String>,
}

/// Wire shape of an alignment outcome. Every failure kind degrades to
/// `valid: false` with an offset of zero — the player starts from the
/// beginning instead of erroring.
#[derive(Serialize)]
pub struct AlignResponse {
    pub offset_seconds: f64,
    pub valid: bool,
    pub reason: Option<String>,
}

impl AlignResponse {
    fn fallback(reason: String) -> Self {
        Self {
            offset_seconds: 0.0,
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Strip any path components from a client-supplied file name.
fn sanitize_name(name: &str) -> Result<String, StatusCode> {
    FsPath::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.starts_with('.'))
        .map(|s| s.to_string())
        .ok_or(StatusCode::BAD_REQUEST)
}

fn playable_path(args: &Args, name: &str) -> Result<PathBuf, StatusCode> {
    Ok(args.playable_dir().join(sanitize_name(name)?))
}

pub async fn get_videos(State(state): State<Arc<AppState>>) -> Json<Vec<VideoInfo>> {
    let videos = WalkDir::new(state.args.playable_dir())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.to_lowercase() == "mp4")
                .unwrap_or(false)
        })
        .filter_map(|e| {
            let name = e.path().file_name()?.to_str()?.to_string();
            let url = format!("/media/{}", name);
            Some(VideoInfo { name, url })
        })
        .collect();

    Json(videos)
}

/// Raw-body video upload. The original is kept under the upload directory
/// and re-encoded to H.264; only the transcoded copy is ever decoded or
/// played.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<VideoInfo>, StatusCode> {
    let name = sanitize_name(&params.name)?;
    let stem = FsPath::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();

    let upload_path = state.args.upload_dir().join(&name);
    let playable_name = format!("{}.mp4", stem);
    let playable = state.args.playable_dir().join(&playable_name);

    tokio::fs::write(&upload_path, &body).await.map_err(|e| {
        tracing::error!("failed to store upload {}: {}", upload_path.display(), e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let ffmpeg = state.args.ffmpeg.clone();
    let playable_for_task = playable.clone();
    tokio::task::spawn_blocking(move || {
        transcode::to_h264(&ffmpeg, &upload_path, &playable_for_task)
    })
    .await
    .map_err(|e| {
        tracing::error!("transcode task failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        tracing::error!("{}", e);
        StatusCode::UNPROCESSABLE_ENTITY
    })?;

    Ok(Json(VideoInfo {
        url: format!("/media/{}", playable_name),
        name: playable_name,
    }))
}

/// Memoized window extraction for a prepared video. The cache holds
/// unusable results too, so repeated selections never re-run OCR.
async fn window_for(state: &Arc<AppState>, playable: &FsPath) -> Result<Option<VideoWindow>, SeekError> {
    let key = playable.to_string_lossy().to_string();
    let cfg = state.args.extractor_config();
    let state = Arc::clone(state);

    tokio::task::spawn_blocking(move || {
        let mut cache = state
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get_or_try_insert_with(&key, || extract_window(&key, &cfg))
    })
    .await
    .map_err(|e| SeekError::Task(e.to_string()))?
}

pub async fn get_window(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<WindowInfo>, StatusCode> {
    let playable = playable_path(&state.args, &name)?;
    if !playable.exists() {
        return Err(StatusCode::NOT_FOUND);
    }

    let format = state.args.time_format;
    match window_for(&state, &playable).await {
        Ok(Some(w)) => Ok(Json(WindowInfo {
            usable: true,
            start: Some(format.render(w.start)),
            end: Some(format.render(w.end)),
            span_seconds: Some(w.span_seconds()),
        })),
        Ok(None) => Ok(Json(WindowInfo {
            usable: false,
            start: None,
            end: None,
            span_seconds: None,
        })),
        Err(e) => {
            tracing::error!("window extraction failed for {}: {}", name, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn scan_video(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<ScanParams>,
) -> Result<Json<Vec<ScanEntry>>, StatusCode> {
    let playable = playable_path(&state.args, &name)?;
    if !playable.exists() {
        return Err(StatusCode::NOT_FOUND);
    }

    let mut cfg = state.args.extractor_config();
    if let Some(interval) = params.interval {
        cfg.sample_interval_secs = interval;
    }

    let key = playable.to_string_lossy().to_string();
    let entries = tokio::task::spawn_blocking(move || scan_clock(&key, &cfg))
        .await
        .map_err(|e| {
            tracing::error!("scan task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            tracing::error!("scan failed for {}: {}", name, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(entries))
}

pub async fn upload_log(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LogPayload>, StatusCode> {
    let log = EventLog::from_bytes(&body).map_err(|e| {
        tracing::warn!("rejected log upload: {}", e);
        StatusCode::UNPROCESSABLE_ENTITY
    })?;

    Ok(Json(LogPayload {
        time_column: state.args.time_column.clone(),
        headers: log.headers,
        rows: log.rows,
    }))
}

pub async fn post_align(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AlignRequest>,
) -> Result<Json<AlignResponse>, StatusCode> {
    let playable = playable_path(&state.args, &req.video)?;
    if !playable.exists() {
        return Ok(Json(AlignResponse::fallback(format!(
            "video {} has not been prepared",
            req.video
        ))));
    }

    let window = match window_for(&state, &playable).await {
        Ok(Some(w)) => w,
        Ok(None) => {
            return Ok(Json(AlignResponse::fallback(
                "the video's clock window could not be read".to_string(),
            )))
        }
        Err(e) => {
            tracing::error!("window extraction failed for {}: {}", req.video, e);
            return Ok(Json(AlignResponse::fallback(e.to_string())));
        }
    };

    let format = state.args.time_format;
    let row = match row_time(&req.timestamp_field, format) {
        Ok(t) => t,
        Err(e) => return Ok(Json(AlignResponse::fallback(e.to_string()))),
    };

    // An absent or unparsable jump contributes nothing.
    let jump = req
        .jump_time
        .as_deref()
        .and_then(|s| format.parse_exact(s));

    match align(&window, row, jump) {
        Ok(offset_seconds) => Ok(Json(AlignResponse {
            offset_seconds,
            valid: true,
            reason: None,
        })),
        Err(e) => Ok(Json(AlignResponse::fallback(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_keeps_plain_files() {
        assert_eq!(sanitize_name("cam1.mp4").unwrap(), "cam1.mp4");
    }

    #[test]
    fn test_sanitize_name_strips_path_components() {
        assert_eq!(sanitize_name("dir/cam1.mp4").unwrap(), "cam1.mp4");
        assert_eq!(sanitize_name("../../etc/passwd").unwrap(), "passwd");
    }

    #[test]
    fn test_sanitize_name_rejects_empty_and_hidden() {
        assert!(sanitize_name("").is_err());
        assert!(sanitize_name(".hidden").is_err());
        assert!(sanitize_name("..").is_err());
    }

    #[test]
    fn test_fallback_response_shape() {
        let v = serde_json::to_value(AlignResponse::fallback("no window".into())).unwrap();
        assert_eq!(v["offset_seconds"], 0.0);
        assert_eq!(v["valid"], false);
        assert_eq!(v["reason"], "no window");
    }
}
