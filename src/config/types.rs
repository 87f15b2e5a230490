use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 媒體庫類型：電影或影集（動畫視同影集處理）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Movie,
    Show,
}

impl LibraryKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Movie => "電影",
            Self::Show => "影集",
        }
    }
}

/// 輸出解析度，固定兩種預設
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    R720,
    R1080,
}

impl Resolution {
    /// 目標輸出的寬與高（像素）
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::R720 => (1280, 720),
            Self::R1080 => (1920, 1080),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// 執行設定，由 CLI 參數轉換而來；傳入各元件後不再變動
#[derive(Debug, Clone)]
pub struct Config {
    pub movies_path: Option<PathBuf>,
    pub tv_path: Option<PathBuf>,
    pub anime_path: Option<PathBuf>,
    pub clip_length: u32,
    pub resolution: Resolution,
    pub crf: u32,
    pub preset: String,
    pub timeout: Duration,
    pub delay_seconds: f64,
    pub force: bool,
    pub include_audio: bool,
    pub ffmpeg_pre: String,
    pub ffmpeg_extra: String,
    pub ffmpeg_program: PathBuf,
    pub ffprobe_program: PathBuf,
    pub daemon: bool,
    pub interval: Duration,
    pub file_type_table: FileTypeTable,
}
