use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 建立 Ctrl-C 中斷旗標；掃描迴圈只在邊界檢查旗標，確保安全停止
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，將在下一個掃描邊界停止...");
    })
    .expect("無法設定 Ctrl-C 處理器");

    shutdown_signal
}
