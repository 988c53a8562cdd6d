use std::fs::{create_dir_all, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::ENV_LOG_FILTER;

lazy_static::lazy_static! {
    static ref LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Plain-text fmt layer writing to `file`. Terminal output would corrupt the
/// map view, so nothing goes to stderr.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
}

pub fn init_logging(verbose: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("civic-cli")
        .join("logs");

    create_dir_all(&log_dir)?;

    let log_file = log_dir.join(format!("civic-{}.log", Local::now().format("%Y%m%d-%H%M%S")));
    let file = OpenOptions::new().create(true).append(true).open(&log_file)?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| default_level.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(file))
        .try_init()?;

    if let Ok(mut slot) = LOG_FILE.lock() {
        *slot = Some(log_file.clone());
    }

    tracing::info!("Logging initialized to: {}", log_file.display());

    Ok(log_file)
}

pub fn log_panic_info(info: &std::panic::PanicInfo) {
    let mut message = String::from("PANIC: ");

    if let Some(location) = info.location() {
        message.push_str(&format!(
            "at {}:{}:{} - ",
            location.file(),
            location.line(),
            location.column()
        ));
    }

    if let Some(s) = info.payload().downcast_ref::<&str>() {
        message.push_str(s);
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        message.push_str(s);
    } else {
        message.push_str("Unknown panic payload");
    }

    tracing::error!("{}", message);
    tracing::debug!("Backtrace:\n{}", std::backtrace::Backtrace::capture());
}

pub fn get_log_file_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|slot| slot.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_layer_writes_every_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civic.log");
        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();

        let subscriber = tracing_subscriber::registry().with(file_layer(file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("first line");
            tracing::warn!(issue = "42", "second line");
        });

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("first line"));
        assert!(written.contains("second line"));
        assert!(written.contains("issue=\"42\""));
        assert!(!written.contains('\u{1b}'));
    }
}
