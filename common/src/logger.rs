use std::{fmt, fs, path::Path, str::FromStr};

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub fn default_logs_datetime_format() -> String {
    String::from("[%Y-%m-%d] (%H:%M:%S%.3f)")
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid logs path '{0}': it must end with a /")]
    InvalidLogsPath(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "off" => Self::Off,
            "error" => Self::Error,
            "warn" => Self::Warn,
            "info" => Self::Info,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => return Err("Invalid log level"),
        })
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Per-module level override, written as `module=level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub module: String,
    pub level: LogLevel,
}

impl FromStr for ModuleConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, level) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid module config '{}', expected module=level", s))?;
        let module = module.trim();
        if module.is_empty() {
            return Err(format!("Empty module name in '{}'", s));
        }
        let level = LogLevel::from_str(level.trim()).map_err(|e| e.to_owned())?;
        Ok(Self {
            module: module.to_owned(),
            level,
        })
    }
}

/// Everything needed to install the global logger.
#[derive(Debug, Clone)]
pub struct LoggerSettings<'a> {
    pub level: LogLevel,
    pub file_level: Option<LogLevel>,
    pub disable_file_logging: bool,
    pub disable_file_log_date_based: bool,
    pub disable_colors: bool,
    pub filename: &'a str,
    pub logs_path: &'a str,
    pub modules: &'a [ModuleConfig],
    pub datetime_format: &'a str,
}

fn apply_modules(mut dispatch: fern::Dispatch, modules: &[ModuleConfig]) -> fern::Dispatch {
    for module in modules {
        dispatch = dispatch.level_for(module.module.clone(), module.level.into());
    }
    dispatch
}

/// Install a stdout logger and, unless disabled, a daily rotated file logger.
pub fn setup_logger(settings: LoggerSettings<'_>) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig::new()
        .debug(Color::Green)
        .info(Color::Cyan)
        .warn(Color::Yellow)
        .error(Color::Red)
        .trace(Color::Magenta);

    let disable_colors = settings.disable_colors;
    let datetime_format = settings.datetime_format.to_owned();
    let stdout_log = fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = record.target();
            let target = target.split("::").last().unwrap_or(target);
            let now = chrono::Local::now().format(&datetime_format);
            if disable_colors {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    now,
                    record.level(),
                    target,
                    message
                ))
            } else {
                out.finish(format_args!(
                    "\x1b[90m{}\x1b[0m {} \x1b[90m[{}]\x1b[0m {}",
                    now,
                    colors.color(record.level()),
                    target,
                    message
                ))
            }
        })
        .level(settings.level.into())
        .chain(std::io::stdout());
    let stdout_log = apply_modules(stdout_log, settings.modules);

    let mut base = fern::Dispatch::new().chain(stdout_log);

    if !settings.disable_file_logging {
        if !settings.logs_path.ends_with('/') {
            return Err(LoggerError::InvalidLogsPath(settings.logs_path.to_owned()));
        }
        let logs_path = Path::new(settings.logs_path);
        if !logs_path.exists() {
            fs::create_dir_all(logs_path)?;
        }

        let datetime_format = settings.datetime_format.to_owned();
        let file_log = fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    chrono::Local::now().format(&datetime_format),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(settings.file_level.unwrap_or(settings.level).into());
        let file_log = apply_modules(file_log, settings.modules);

        let file_log = if settings.disable_file_log_date_based {
            file_log.chain(fern::log_file(logs_path.join(settings.filename))?)
        } else {
            file_log.chain(fern::DateBased::new(
                logs_path,
                format!("%Y-%m-%d.{}", settings.filename),
            ))
        };
        base = base.chain(file_log);
    }

    base.apply()?;
    Ok(())
}
