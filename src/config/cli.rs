use crate::config::types::{Config, FileTypeTable, Resolution};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

#[derive(Parser, Debug)]
#[command(name = "auto_backdrop_generate")]
#[command(about = "為 Emby/Jellyfin 媒體庫產生背景短片", long_about = None)]
pub struct CliArgs {
    /// 電影媒體庫根目錄
    #[arg(long)]
    pub movies: Option<PathBuf>,

    /// 影集媒體庫根目錄
    #[arg(long)]
    pub tv: Option<PathBuf>,

    /// 動畫媒體庫根目錄（視同影集）
    #[arg(long)]
    pub anime: Option<PathBuf>,

    /// 持續執行模式，定期重新掃描
    #[arg(long)]
    pub daemon: bool,

    /// 兩輪掃描之間的間隔秒數
    #[arg(long, default_value_t = 3600)]
    pub interval: u64,

    /// 短片長度（秒）
    #[arg(long, default_value_t = 5)]
    pub length: u32,

    /// 輸出解析度（720 或 1080）
    #[arg(long, default_value_t = 720)]
    pub resolution: u32,

    /// x264 CRF 值
    #[arg(long, default_value_t = 28)]
    pub crf: u32,

    /// x264 preset
    #[arg(long, default_value = "veryfast")]
    pub preset: String,

    /// 產生不含音訊的短片
    #[arg(long)]
    pub no_audio: bool,

    /// 插在輸出檔之後的額外 FFmpeg 參數
    #[arg(long, default_value = "")]
    pub ffmpeg_extra: String,

    /// 插在 -i 之前的額外 FFmpeg 參數（通常為硬體加速設定）
    #[arg(long, default_value = "")]
    pub ffmpeg_pre: String,

    /// 單次 FFmpeg 編碼的逾時秒數
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    /// 每個資料夾處理後的等待秒數
    #[arg(long, default_value_t = 0.0)]
    pub delay: f64,

    /// 無條件覆寫既有的背景短片與失敗標記
    #[arg(long)]
    pub force: bool,

    /// ffmpeg 執行檔路徑
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    /// ffprobe 執行檔路徑
    #[arg(long, default_value = "ffprobe")]
    pub ffprobe_path: PathBuf,
}

impl Config {
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let resolution = match args.resolution {
            720 => Resolution::R720,
            1080 => Resolution::R1080,
            other => bail!("不支援的解析度: {other}（只接受 720 或 1080）"),
        };

        Ok(Self {
            movies_path: args.movies.clone(),
            tv_path: args.tv.clone(),
            anime_path: args.anime.clone(),
            clip_length: args.length,
            resolution,
            crf: args.crf,
            preset: args.preset.clone(),
            timeout: Duration::from_secs(args.timeout),
            delay_seconds: args.delay,
            force: args.force,
            include_audio: !args.no_audio,
            ffmpeg_pre: args.ffmpeg_pre.clone(),
            ffmpeg_extra: args.ffmpeg_extra.clone(),
            ffmpeg_program: args.ffmpeg_path.clone(),
            ffprobe_program: args.ffprobe_path.clone(),
            daemon: args.daemon,
            interval: Duration::from_secs(args.interval),
            file_type_table: load_embedded_file_type_table()?,
        })
    }
}

/// 從編譯時嵌入的 JSON 載入檔案類型表
fn load_embedded_file_type_table() -> Result<FileTypeTable> {
    serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
}
