use crate::config::Config;
use crate::tools::split_shell_words;
use log::warn;
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};

/// 低於此時長（秒）的來源不做取樣
const MIN_SOURCE_DURATION: f64 = 60.0;
/// 可安全取樣的範圍：片長的 10% 到 50% 之間，避開片頭、片尾與劇情後段
const SAFE_WINDOW_BEGIN: f64 = 0.1;
const SAFE_WINDOW_END: f64 = 0.5;
/// 已知無法被硬體加速濾鏡可靠處理的編碼
const HWACCEL_INCOMPATIBLE_CODEC: &str = "av1";

/// 編碼管線：軟體縮放補邊，或硬體加速縮放
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Software,
    Hardware,
}

/// 來源不適合取樣的原因。不嘗試編碼，直接留下失敗標記
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRejection {
    TooShort,
    InsufficientSafeRange,
}

impl fmt::Display for PlanRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "影片太短"),
            Self::InsufficientSafeRange => write!(f, "安全取樣範圍不足"),
        }
    }
}

/// 一次編碼所需的全部參數。建構過程不碰檔案系統，也不啟動子程序
#[derive(Debug, Clone)]
pub struct ClipPlan {
    pub source: PathBuf,
    pub start_seconds: f64,
    pub length_seconds: u32,
    pub width: u32,
    pub height: u32,
    pub crf: u32,
    pub preset: String,
    pub include_audio: bool,
    pub pipeline: Pipeline,
    pub pre_input_args: Vec<String>,
    pub post_output_args: Vec<String>,
}

impl ClipPlan {
    /// 依管線產生 -vf 濾鏡鏈。
    /// 軟體路徑把來源縮進目標框後置中補邊，不會放大小於目標的來源
    #[must_use]
    pub fn video_filter(&self) -> String {
        match self.pipeline {
            Pipeline::Hardware => format!(
                "scale_cuda={}:{}:interp_algo=lanczos:format=nv12",
                self.width, self.height
            ),
            Pipeline::Software => format!(
                "format=yuv420p,scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
                w = self.width,
                h = self.height
            ),
        }
    }
}

/// 依來源時長計算取樣計畫。
/// 起始點在安全範圍內隨機抽取；亂數來源由呼叫端注入，測試時可用固定種子
pub fn plan_clip<R: Rng>(
    source: &Path,
    duration: f64,
    codec: &str,
    config: &Config,
    rng: &mut R,
) -> Result<ClipPlan, PlanRejection> {
    if duration < MIN_SOURCE_DURATION {
        return Err(PlanRejection::TooShort);
    }

    let safe_begin = duration * SAFE_WINDOW_BEGIN;
    let safe_end = duration * SAFE_WINDOW_END;
    let clip_length = f64::from(config.clip_length);

    // 最晚起始點低於範圍開頭，代表安全範圍塞不下一段短片
    let latest_start = safe_end - clip_length;
    if latest_start < safe_begin {
        return Err(PlanRejection::InsufficientSafeRange);
    }

    let start_seconds = rng.gen_range(safe_begin..=latest_start);

    let pre_input_args = tokenize_extra_args(&config.ffmpeg_pre, "ffmpeg-pre");
    let post_output_args = tokenize_extra_args(&config.ffmpeg_extra, "ffmpeg-extra");

    // 前置參數負責初始化加速器，沒有它（或編碼不相容）就走軟體管線
    let pipeline = if !pre_input_args.is_empty() && codec != HWACCEL_INCOMPATIBLE_CODEC {
        Pipeline::Hardware
    } else {
        Pipeline::Software
    };

    let (width, height) = config.resolution.dimensions();

    Ok(ClipPlan {
        source: source.to_path_buf(),
        start_seconds,
        length_seconds: config.clip_length,
        width,
        height,
        crf: config.crf,
        preset: config.preset.clone(),
        include_audio: config.include_audio,
        pipeline,
        pre_input_args,
        post_output_args,
    })
}

/// 切割額外參數字串；引號不成對時記錄警告並略過該組參數，不視為致命錯誤
fn tokenize_extra_args(raw: &str, label: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    match split_shell_words(raw) {
        Ok(args) => args,
        Err(e) => {
            warn!("無法解析 {label} 參數 '{raw}': {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileTypeTable, Resolution};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn config() -> Config {
        Config {
            movies_path: None,
            tv_path: None,
            anime_path: None,
            clip_length: 5,
            resolution: Resolution::R720,
            crf: 28,
            preset: "veryfast".to_string(),
            timeout: Duration::from_secs(300),
            delay_seconds: 0.0,
            force: false,
            include_audio: true,
            ffmpeg_pre: String::new(),
            ffmpeg_extra: String::new(),
            ffmpeg_program: "ffmpeg".into(),
            ffprobe_program: "ffprobe".into(),
            daemon: false,
            interval: Duration::from_secs(3600),
            file_type_table: FileTypeTable {
                video_file: vec![".mkv".to_string()],
            },
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_reject_too_short() {
        let result = plan_clip(Path::new("/a.mkv"), 59.9, "h264", &config(), &mut rng());
        assert_eq!(result.unwrap_err(), PlanRejection::TooShort);

        // 時長不明（探測失敗回傳 0.0）同樣視為太短
        let result = plan_clip(Path::new("/a.mkv"), 0.0, "", &config(), &mut rng());
        assert_eq!(result.unwrap_err(), PlanRejection::TooShort);
    }

    #[test]
    fn test_reject_insufficient_safe_range() {
        // D = 60 時安全範圍是 6 到 30 秒，共 24 秒
        let mut config = config();
        config.clip_length = 30;
        let result = plan_clip(Path::new("/a.mkv"), 60.0, "h264", &config, &mut rng());
        assert_eq!(result.unwrap_err(), PlanRejection::InsufficientSafeRange);
    }

    #[test]
    fn test_start_offset_within_safe_window() {
        let config = config();
        let duration = 7200.0;
        let mut rng = rng();

        for _ in 0..200 {
            let plan = plan_clip(Path::new("/a.mkv"), duration, "h264", &config, &mut rng).unwrap();
            assert!(plan.start_seconds >= duration * 0.1);
            assert!(plan.start_seconds <= duration * 0.5 - f64::from(config.clip_length));
        }
    }

    #[test]
    fn test_boundary_duration_exactly_fits() {
        // 0.4·D == L 的臨界情況：起始點只剩一個合法值
        let mut config = config();
        config.clip_length = 24;
        let plan = plan_clip(Path::new("/a.mkv"), 60.0, "h264", &config, &mut rng()).unwrap();
        assert!((plan.start_seconds - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_pipeline_defaults_to_software() {
        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "h264", &config(), &mut rng()).unwrap();
        assert_eq!(plan.pipeline, Pipeline::Software);
        assert!(plan.pre_input_args.is_empty());
    }

    #[test]
    fn test_pipeline_hardware_with_pre_args() {
        let mut config = config();
        config.ffmpeg_pre = "-hwaccel cuda -hwaccel_output_format cuda".to_string();

        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "h264", &config, &mut rng()).unwrap();
        assert_eq!(plan.pipeline, Pipeline::Hardware);
        assert_eq!(plan.pre_input_args.len(), 4);
    }

    #[test]
    fn test_pipeline_av1_forces_software() {
        let mut config = config();
        config.ffmpeg_pre = "-hwaccel cuda".to_string();

        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "av1", &config, &mut rng()).unwrap();
        assert_eq!(plan.pipeline, Pipeline::Software);
    }

    #[test]
    fn test_malformed_pre_args_fall_back_to_software() {
        let mut config = config();
        config.ffmpeg_pre = "-hwaccel 'cuda".to_string();

        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "h264", &config, &mut rng()).unwrap();
        assert_eq!(plan.pipeline, Pipeline::Software);
        assert!(plan.pre_input_args.is_empty());
    }

    #[test]
    fn test_malformed_extra_args_are_omitted() {
        let mut config = config();
        config.ffmpeg_extra = "-movflags \"faststart".to_string();

        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "h264", &config, &mut rng()).unwrap();
        assert!(plan.post_output_args.is_empty());
    }

    #[test]
    fn test_video_filter_software() {
        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "h264", &config(), &mut rng()).unwrap();
        assert_eq!(
            plan.video_filter(),
            "format=yuv420p,scale=1280:720:force_original_aspect_ratio=decrease,pad=1280:720:(ow-iw)/2:(oh-ih)/2"
        );
    }

    #[test]
    fn test_video_filter_hardware() {
        let mut config = config();
        config.ffmpeg_pre = "-hwaccel cuda".to_string();
        config.resolution = Resolution::R1080;

        let plan = plan_clip(Path::new("/a.mkv"), 7200.0, "hevc", &config, &mut rng()).unwrap();
        assert_eq!(
            plan.video_filter(),
            "scale_cuda=1920:1080:interp_algo=lanczos:format=nv12"
        );
    }
}
