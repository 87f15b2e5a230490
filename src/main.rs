use anyhow::Result;
use auto_backdrop_generate::component::BackdropGenerator;
use auto_backdrop_generate::config::{CliArgs, Config};
use auto_backdrop_generate::init;
use auto_backdrop_generate::signal::setup_shutdown_signal;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    init::init();

    let args = CliArgs::parse();
    let config = Config::from_cli(&args)?;
    let shutdown_signal = setup_shutdown_signal();

    let audio_label = if config.include_audio {
        "含音訊"
    } else {
        "不含音訊"
    };

    let generator = BackdropGenerator::new(config.clone(), Arc::clone(&shutdown_signal));

    if config.daemon {
        info!(
            "持續執行模式，間隔 {} 秒，{audio_label}",
            config.interval.as_secs()
        );

        while !shutdown_signal.load(Ordering::SeqCst) {
            if let Err(e) = generator.run_once() {
                // 根目錄可能是暫時離線的掛載點，下一輪再試
                error!("本輪掃描失敗: {e:#}");
            }

            info!("休眠等待下一輪掃描...");
            sleep_interruptible(config.interval, &shutdown_signal);
        }

        info!("已停止持續執行模式");
        return Ok(());
    }

    info!("單次執行模式，{audio_label}");
    generator.run_once()
}

/// 以一秒為單位休眠，讓中斷信號能在休眠邊界生效
fn sleep_interruptible(duration: Duration, shutdown_signal: &Arc<AtomicBool>) {
    let mut remaining = duration;
    while !remaining.is_zero() && !shutdown_signal.load(Ordering::SeqCst) {
        let step = remaining.min(Duration::from_secs(1));
        thread::sleep(step);
        remaining -= step;
    }
}
