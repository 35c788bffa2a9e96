use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

use crate::config::Config;

const DEFAULT_LOG_FORMAT: &str = "json";
// stderr shares the terminal with the alternate-screen UI, so logs go to a
// file unless explicitly redirected.
const DEFAULT_LOG_OUTPUT: &str = "file";
const DEFAULT_LOG_FILE_PATH: &str = "logs/quill.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw
        .unwrap_or(DEFAULT_LOG_FORMAT)
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "pretty" => LogFormat::Pretty,
        _ => LogFormat::Json,
    }
}

fn parse_log_output(raw: Option<&str>) -> LogOutput {
    match raw
        .unwrap_or(DEFAULT_LOG_OUTPUT)
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "stderr" => LogOutput::Stderr,
        "both" => LogOutput::Both,
        _ => LogOutput::File,
    }
}

fn parse_log_file_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH))
}

fn normalize_level(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn env_filter(cfg: &Config) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if cfg.debug {
        "debug"
    } else {
        normalize_level(&cfg.log_level)
    };
    EnvFilter::new(format!("warn,quill={level}"))
}

fn build_file_writer(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new("quill.log"));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn stderr_writer() -> BoxMakeWriter {
    BoxMakeWriter::new(std::io::stderr)
}

fn init_with_writer(format: LogFormat, filter: EnvFilter, writer: BoxMakeWriter) -> InitResult {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init(),
    }
}

fn init_file_output(
    cfg: &Config,
    format: LogFormat,
    file_path: &Path,
    include_stderr: bool,
) -> InitResult {
    match build_file_writer(file_path) {
        Ok((file_writer, guard)) => {
            let writer = if include_stderr {
                BoxMakeWriter::new(std::io::stderr.and(file_writer))
            } else {
                BoxMakeWriter::new(file_writer)
            };

            let init_result = init_with_writer(format, env_filter(cfg), writer);
            if init_result.is_ok() {
                let _ = LOG_GUARD.set(guard);
            }
            init_result
        }
        Err(err) => {
            let mode = if include_stderr { "both" } else { "file" };
            eprintln!(
                "quill: failed to initialize LOG_OUTPUT={} at '{}': {}; using stderr instead",
                mode,
                file_path.display(),
                err,
            );
            init_with_writer(format, env_filter(cfg), stderr_writer())
        }
    }
}

/// Installs the global tracing subscriber. Format and destination come from
/// `LOG_FORMAT`, `LOG_OUTPUT` and `LOG_FILE_PATH`; the filter comes from
/// `RUST_LOG` when set, otherwise from the configured log level. Debug mode
/// forces the pretty format and a debug-level filter.
pub fn init(cfg: &Config) {
    let format = if cfg.debug {
        LogFormat::Pretty
    } else {
        parse_log_format(env::var("LOG_FORMAT").ok().as_deref())
    };
    let output = parse_log_output(env::var("LOG_OUTPUT").ok().as_deref());
    let file_path = parse_log_file_path(env::var("LOG_FILE_PATH").ok().as_deref());

    let init_result = match output {
        LogOutput::Stderr => init_with_writer(format, env_filter(cfg), stderr_writer()),
        LogOutput::File => init_file_output(cfg, format, &file_path, false),
        LogOutput::Both => init_file_output(cfg, format, &file_path, true),
    };

    let _ = init_result;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{
        DEFAULT_LOG_FILE_PATH, LogFormat, LogOutput, normalize_level, parse_log_file_path,
        parse_log_format, parse_log_output,
    };

    #[test]
    fn parse_log_format_defaults_to_json() {
        assert_eq!(parse_log_format(None), LogFormat::Json);
    }

    #[test]
    fn parse_log_format_accepts_pretty() {
        assert_eq!(parse_log_format(Some("pretty")), LogFormat::Pretty);
        assert_eq!(parse_log_format(Some(" PRETTY ")), LogFormat::Pretty);
    }

    #[test]
    fn parse_log_format_falls_back_for_unknown_values() {
        assert_eq!(parse_log_format(Some("unknown")), LogFormat::Json);
    }

    #[test]
    fn parse_log_output_defaults_to_file() {
        assert_eq!(parse_log_output(None), LogOutput::File);
    }

    #[test]
    fn parse_log_output_accepts_stderr_and_both() {
        assert_eq!(parse_log_output(Some("stderr")), LogOutput::Stderr);
        assert_eq!(parse_log_output(Some(" BOTH ")), LogOutput::Both);
    }

    #[test]
    fn parse_log_output_falls_back_for_unknown_values() {
        assert_eq!(parse_log_output(Some("unknown")), LogOutput::File);
    }

    #[test]
    fn parse_log_file_path_uses_default_for_missing_or_empty_values() {
        assert_eq!(
            parse_log_file_path(None),
            PathBuf::from(DEFAULT_LOG_FILE_PATH)
        );
        assert_eq!(
            parse_log_file_path(Some("  ")),
            PathBuf::from(DEFAULT_LOG_FILE_PATH)
        );
    }

    #[test]
    fn parse_log_file_path_preserves_explicit_value() {
        assert_eq!(
            parse_log_file_path(Some("custom/quill.log")),
            PathBuf::from("custom/quill.log")
        );
    }

    #[test]
    fn normalize_level_maps_known_levels_and_falls_back_to_info() {
        assert_eq!(normalize_level("debug"), "debug");
        assert_eq!(normalize_level(" WARNING "), "warn");
        assert_eq!(normalize_level("error"), "error");
        assert_eq!(normalize_level("loud"), "info");
    }
}
