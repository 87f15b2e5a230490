use anyhow::{Context, Result, bail};
use log::warn;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_name: Option<String>,
}

/// 取得影片時長（秒）。任何失敗都回傳 0.0，由呼叫端視為長度不明，不重試
#[must_use]
pub fn probe_duration(program: &Path, video: &Path) -> f64 {
    match query_duration(program, video) {
        Ok(duration) => duration,
        Err(e) => {
            warn!("無法取得影片時長 {}: {e:#}", video.display());
            0.0
        }
    }
}

/// 取得第一個視訊串流的編碼名稱（小寫）。任何失敗都回傳空字串
#[must_use]
pub fn probe_codec(program: &Path, video: &Path) -> String {
    match query_codec(program, video) {
        Ok(codec) => codec,
        Err(e) => {
            warn!("無法取得影片編碼 {}: {e:#}", video.display());
            String::new()
        }
    }
}

fn query_duration(program: &Path, video: &Path) -> Result<f64> {
    let probe = run_ffprobe(
        program,
        &["-v", "quiet", "-print_format", "json", "-show_format"],
        video,
    )?;

    probe
        .format
        .and_then(|format| format.duration)
        .and_then(|duration| duration.parse::<f64>().ok())
        .ok_or_else(|| anyhow::anyhow!("ffprobe 輸出缺少時長欄位"))
}

fn query_codec(program: &Path, video: &Path) -> Result<String> {
    let probe = run_ffprobe(
        program,
        &[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-select_streams",
            "v:0",
            "-show_streams",
        ],
        video,
    )?;

    probe
        .streams
        .and_then(|streams| streams.into_iter().next())
        .and_then(|stream| stream.codec_name)
        .map(|name| name.to_lowercase())
        .ok_or_else(|| anyhow::anyhow!("ffprobe 輸出缺少編碼欄位"))
}

fn run_ffprobe(program: &Path, args: &[&str], video: &Path) -> Result<FfprobeOutput> {
    let output = Command::new(program)
        .args(args)
        .arg(video)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", video.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).with_context(|| "無法解析 ffprobe 輸出")
}
