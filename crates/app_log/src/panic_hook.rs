//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::{DateTime, Local};
use std::panic::PanicHookInfo;
use std::path::PathBuf;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let now = Local::now();
        let thread = std::thread::current();
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".to_string());

        let report = crash_report(
            now,
            thread.name().unwrap_or("<unnamed>"),
            &location,
            payload_text(info),
            &format!("{:?}", Backtrace::new()),
        );

        // stderr first: the subscriber may be the thing that panicked
        eprintln!("{}", report);
        tracing::error!("{}", report);

        let dump_path = crash_dump_path(now);
        match std::fs::write(&dump_path, &report) {
            Ok(()) => eprintln!("Crash report written to {}", dump_path.display()),
            Err(e) => eprintln!("Failed to write crash dump: {}", e),
        }
    }));
    tracing::debug!("Panic hook initialized");
}

fn crash_report(
    now: DateTime<Local>,
    thread: &str,
    location: &str,
    payload: &str,
    backtrace: &str,
) -> String {
    format!(
        "=== BATCH LABELER PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{}",
        now.to_rfc3339(),
        thread,
        location,
        payload,
        backtrace
    )
}

fn crash_dump_path(now: DateTime<Local>) -> PathBuf {
    std::env::temp_dir().join(format!(
        "batch_labeler_crash_{}.txt",
        now.format("%Y%m%d_%H%M%S")
    ))
}

fn payload_text<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<unknown>")
}
