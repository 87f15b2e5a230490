use super::artifact_state::{ArtifactPaths, ArtifactState};
use super::candidate_selector::{select_movie_source, select_show_source};
use super::clip_planner;
use super::encode_executor::{EncodeExecutor, EncodeOutcome};
use crate::config::{Config, LibraryKind};
use crate::tools::{probe_codec, probe_duration};
use anyhow::{Result, bail};
use console::style;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// 單一標題資料夾的處理結果，用於整輪統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FolderOutcome {
    Generated,
    Skipped,
    Failed,
}

#[derive(Debug, Default)]
struct PassSummary {
    generated: usize,
    skipped: usize,
    failed: usize,
}

pub struct BackdropGenerator {
    config: Config,
    executor: EncodeExecutor,
    shutdown_signal: Arc<AtomicBool>,
}

impl BackdropGenerator {
    #[must_use]
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let executor = EncodeExecutor::new(config.ffmpeg_program.clone(), config.timeout);
        Self {
            config,
            executor,
            shutdown_signal,
        }
    }

    /// 掃描全部媒體庫一輪。
    /// 個別資料夾的失敗只記錄並留下標記；唯一的致命條件是設定的根目錄都不存在
    pub fn run_once(&self) -> Result<()> {
        let mut summary = PassSummary::default();
        let mut any_root_found = false;

        for (root, kind) in self.library_roots() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                break;
            }
            if !root.exists() {
                warn!("媒體庫根目錄不存在，略過: {}", root.display());
                continue;
            }

            any_root_found = true;
            self.process_root(&root, kind, &mut summary);
        }

        if !any_root_found {
            bail!("找不到任何有效的媒體庫路徑，沒有可處理的內容");
        }

        self.print_summary(&summary);
        Ok(())
    }

    /// 依固定順序列出媒體庫根目錄：電影、影集、動畫
    fn library_roots(&self) -> Vec<(PathBuf, LibraryKind)> {
        let mut roots = Vec::new();
        if let Some(path) = &self.config.movies_path {
            roots.push((path.clone(), LibraryKind::Movie));
        }
        if let Some(path) = &self.config.tv_path {
            roots.push((path.clone(), LibraryKind::Show));
        }
        if let Some(path) = &self.config.anime_path {
            roots.push((path.clone(), LibraryKind::Show));
        }
        roots
    }

    fn process_root(&self, root: &Path, kind: LibraryKind, summary: &mut PassSummary) {
        for folder in title_folders(root) {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷信號，停止本輪掃描");
                return;
            }

            let outcome = self.process_folder(&folder, kind);
            match outcome {
                FolderOutcome::Generated => summary.generated += 1,
                FolderOutcome::Skipped => summary.skipped += 1,
                FolderOutcome::Failed => summary.failed += 1,
            }

            // 實際處理過的資料夾之間的固定等待，降低溫度與 IO 壓力
            if outcome != FolderOutcome::Skipped && self.config.delay_seconds > 0.0 {
                thread::sleep(Duration::from_secs_f64(self.config.delay_seconds));
            }
        }
    }

    /// 處理單一標題資料夾；任何失敗都只影響這個資料夾
    fn process_folder(&self, folder: &Path, kind: LibraryKind) -> FolderOutcome {
        let title = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| folder.display().to_string());
        info!("處理{}: {title}", kind.label());

        let artifact = ArtifactPaths::for_folder(folder);
        if !self.config.force && artifact.query() != ArtifactState::Absent {
            debug!("背景短片或失敗標記已存在，略過: {title}");
            return FolderOutcome::Skipped;
        }
        if self.config.force {
            artifact.clear_existing();
        }

        let source = match kind {
            LibraryKind::Movie => select_movie_source(folder, &self.config.file_type_table),
            LibraryKind::Show => select_show_source(folder, &self.config.file_type_table),
        };
        let Some(source) = source else {
            warn!("找不到影片檔案: {}", folder.display());
            self.leave_placeholder(&artifact);
            return FolderOutcome::Failed;
        };

        let duration = probe_duration(&self.config.ffprobe_program, &source);
        let codec = probe_codec(&self.config.ffprobe_program, &source);

        let plan = match clip_planner::plan_clip(
            &source,
            duration,
            &codec,
            &self.config,
            &mut rand::thread_rng(),
        ) {
            Ok(plan) => plan,
            Err(rejection) => {
                info!("來源不適合取樣（{rejection}）: {}", source.display());
                self.leave_placeholder(&artifact);
                return FolderOutcome::Failed;
            }
        };

        match self.executor.execute(&plan, artifact.destination()) {
            EncodeOutcome::Success => {
                info!("背景短片已建立: {}", artifact.destination().display());
                FolderOutcome::Generated
            }
            EncodeOutcome::Failed(failure) => {
                error!("編碼失敗（{failure}）: {}", source.display());
                self.leave_placeholder(&artifact);
                FolderOutcome::Failed
            }
        }
    }

    /// 留下失敗標記；標記本身寫入失敗只記錄，不會中斷整輪掃描
    fn leave_placeholder(&self, artifact: &ArtifactPaths) {
        if let Err(e) = artifact.touch_placeholder() {
            error!("無法建立失敗標記: {e:#}");
        }
    }

    fn print_summary(&self, summary: &PassSummary) {
        println!();
        println!("{}", style("=== 掃描摘要 ===").cyan().bold());
        println!("  新建: {}", style(summary.generated).green());
        println!("  略過: {}", summary.skipped);
        if summary.failed > 0 {
            println!("  失敗: {}", style(summary.failed).red());
        }

        info!(
            "掃描完成 - 新建: {}, 略過: {}, 失敗: {}",
            summary.generated, summary.skipped, summary.failed
        );
    }
}

/// 列出根目錄下的標題資料夾（排序後的直接子目錄）
fn title_folders(root: &Path) -> Vec<PathBuf> {
    let mut folders: Vec<PathBuf> = fs::read_dir(root)
        .into_iter()
        .flatten()
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    folders.sort();
    folders
}
