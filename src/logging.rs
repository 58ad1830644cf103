use chrono::Local;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

const DEFAULT_LOG_DIR: &str = "logs";

pub fn init_logging(app_name: &str) -> Result<(), String> {
    let mut init_result: Result<(), String> = Ok(());
    INIT.call_once(|| {
        if let Err(err) = init_logging_inner(app_name) {
            init_result = Err(err);
        }
    });
    init_result
}

fn init_logging_inner(app_name: &str) -> Result<(), String> {
    let level_setting = std::env::var("SWIFT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let level = log_level(level_setting.as_deref());
    let log_file = log_dir(std::env::var("SWIFT_LOG_DIR").ok().as_deref())
        .map(|dir| log_file_path(&dir, app_name, &Local::now().format("%Y_%m_%d").to_string()));

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} | {:<5} | {} | {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    if let Some(path) = &log_file {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|err| err.to_string())?;
        }
        dispatch = dispatch.chain(fern::log_file(path).map_err(|err| err.to_string())?);
    }

    dispatch.apply().map_err(|err| err.to_string())?;

    match &log_file {
        Some(path) => log::info!("Logging at {} to stdout and {}", level, path.display()),
        None => log::info!("Logging at {} to stdout only", level),
    }
    let unrecognized = level_setting.filter(|setting| setting.trim().parse::<LevelFilter>().is_err());
    if let Some(setting) = unrecognized {
        log::warn!("Unrecognized log level '{}', using {}", setting, level);
    }
    Ok(())
}

/// Accepts plain level names only; anything else falls back to `info`.
fn log_level(setting: Option<&str>) -> LevelFilter {
    setting
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

fn log_dir(setting: Option<&str>) -> Option<PathBuf> {
    match setting {
        Some("off") | Some("none") | Some("") => None,
        Some(path) => Some(PathBuf::from(path)),
        None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
    }
}

fn log_file_path(dir: &Path, app_name: &str, date: &str) -> PathBuf {
    dir.join(format!("{app_name}-{date}.log"))
}
