use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const BACKDROP_DIR_NAME: &str = "backdrops";
pub const BACKDROP_FILE_NAME: &str = "backdrop.mp4";
pub const PLACEHOLDER_SUFFIX: &str = ".failed";

/// 單一標題資料夾的輸出狀態。每次掃描重新從檔案系統推導，不做快取
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Absent,
    Present,
    Placeholder,
}

/// 單一標題資料夾的背景短片輸出位置與失敗標記位置
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    destination: PathBuf,
    placeholder: PathBuf,
}

impl ArtifactPaths {
    #[must_use]
    pub fn for_folder(folder: &Path) -> Self {
        let destination = folder.join(BACKDROP_DIR_NAME).join(BACKDROP_FILE_NAME);
        let placeholder =
            destination.with_file_name(format!("{BACKDROP_FILE_NAME}{PLACEHOLDER_SUFFIX}"));
        Self {
            destination,
            placeholder,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[must_use]
    pub fn placeholder(&self) -> &Path {
        &self.placeholder
    }

    /// 查詢目前狀態；輸出檔優先於失敗標記
    #[must_use]
    pub fn query(&self) -> ArtifactState {
        if self.destination.exists() {
            ArtifactState::Present
        } else if self.placeholder.exists() {
            ArtifactState::Placeholder
        } else {
            ArtifactState::Absent
        }
    }

    /// 強制模式：無條件移除既有輸出與失敗標記。
    /// 檔案不存在視為成功，移除失敗只記錄不中斷
    pub fn clear_existing(&self) {
        remove_if_exists(&self.destination);
        remove_if_exists(&self.placeholder);
    }

    /// 建立零位元組的失敗標記（必要時先建立 backdrops 資料夾）。
    /// 呼叫端只記錄錯誤，絕不往外傳遞
    pub fn touch_placeholder(&self) -> Result<()> {
        if let Some(parent) = self.placeholder.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立輸出資料夾: {}", parent.display()))?;
        }

        fs::File::create(&self.placeholder)
            .with_context(|| format!("無法建立失敗標記: {}", self.placeholder.display()))?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!("已移除既有檔案: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("無法移除 {}: {e}", path.display()),
    }
}
