use super::clip_planner::{ClipPlan, Pipeline};
use log::{info, warn};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// 子程序狀態的輪詢間隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 編碼嘗試的結果。成功代表輸出檔已寫入目的地
#[derive(Debug)]
pub enum EncodeOutcome {
    Success,
    Failed(EncodeFailure),
}

/// 編碼失敗的分類；任何一種都會由呼叫端留下失敗標記
#[derive(Debug)]
pub enum EncodeFailure {
    Timeout,
    ToolError(String),
    Unexpected(String),
}

impl fmt::Display for EncodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "逾時"),
            Self::ToolError(stderr) => write!(f, "ffmpeg 錯誤: {stderr}"),
            Self::Unexpected(detail) => write!(f, "非預期錯誤: {detail}"),
        }
    }
}

pub struct EncodeExecutor {
    program: PathBuf,
    timeout: Duration,
}

impl EncodeExecutor {
    #[must_use]
    pub const fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    /// 執行編碼並分類結果。逾時是唯一的取消機制，中途不做協作式取消
    pub fn execute(&self, plan: &ClipPlan, destination: &Path) -> EncodeOutcome {
        if let Some(parent) = destination.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return EncodeOutcome::Failed(EncodeFailure::Unexpected(format!(
                    "無法建立輸出資料夾 {}: {e}",
                    parent.display()
                )));
            }
        }

        let mut command = self.build_command(plan, destination);
        command.stdout(Stdio::null());
        command.stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return EncodeOutcome::Failed(EncodeFailure::Unexpected(format!(
                    "無法啟動 ffmpeg: {e}"
                )));
            }
        };

        let stderr_reader = spawn_stderr_reader(child.stderr.take());
        let outcome = self.wait_with_timeout(child, stderr_reader);
        if matches!(outcome, EncodeOutcome::Failed(_)) {
            remove_partial_output(destination);
        }
        outcome
    }

    /// 組出完整的 ffmpeg 呼叫；參數順序固定，額外參數插在約定位置
    #[must_use]
    pub fn build_command(&self, plan: &ClipPlan, destination: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y");

        // 硬體加速的前置參數必須出現在 -i 之前
        if plan.pipeline == Pipeline::Hardware {
            cmd.args(&plan.pre_input_args);
        }

        cmd.args(["-ss", &plan.start_seconds.to_string()]);
        cmd.arg("-i").arg(&plan.source);
        cmd.args(["-t", &plan.length_seconds.to_string()]);
        cmd.args(["-c:v", "libx264"]);
        cmd.args(["-vf", &plan.video_filter()]);
        cmd.args(["-preset", &plan.preset]);
        cmd.args(["-crf", &plan.crf.to_string()]);
        cmd.args(["-avoid_negative_ts", "make_zero"]);

        if plan.include_audio {
            cmd.args(["-c:a", "aac"]);
        } else {
            cmd.arg("-an");
        }

        cmd.args(&plan.post_output_args);
        cmd.arg(destination);

        cmd
    }

    /// 以 try_wait 輪詢子程序，超過時限就強制終止
    fn wait_with_timeout(
        &self,
        mut child: Child,
        stderr_reader: Option<thread::JoinHandle<String>>,
    ) -> EncodeOutcome {
        let deadline = Instant::now() + self.timeout;

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if status.success() {
                        return EncodeOutcome::Success;
                    }
                    let stderr = collect_stderr(stderr_reader);
                    return EncodeOutcome::Failed(EncodeFailure::ToolError(stderr));
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return EncodeOutcome::Failed(EncodeFailure::Timeout);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return EncodeOutcome::Failed(EncodeFailure::Unexpected(format!(
                        "無法檢查程序狀態: {e}"
                    )));
                }
            }
        }
    }
}

/// 在背景持續讀走 stderr。
/// 子程序寫滿管線緩衝區會停在 write 上，try_wait 便永遠等不到它結束
fn spawn_stderr_reader(stderr: Option<ChildStderr>) -> Option<thread::JoinHandle<String>> {
    stderr.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = String::new();
            let _ = pipe.read_to_string(&mut buffer);
            buffer
        })
    })
}

/// 子程序結束後取回累積的 stderr；管線已關閉，讀取執行緒必然收尾
fn collect_stderr(reader: Option<thread::JoinHandle<String>>) -> String {
    let buffer = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        "未知錯誤".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 移除失敗或中斷留下的不完整輸出，避免下一輪掃描誤判為已完成
fn remove_partial_output(destination: &Path) {
    if !destination.exists() {
        return;
    }

    if let Err(e) = fs::remove_file(destination) {
        warn!("無法刪除不完整的輸出檔案 {}: {e}", destination.display());
    } else {
        info!("已刪除不完整的輸出檔案: {}", destination.display());
    }
}
