use std::path::{Path, PathBuf};

pub const LOG_FILE_BASENAME: &str = "dobee";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;

/// Log files live in a `logs/` folder next to data.json and settings.json.
pub fn log_directory(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// `DOBEE_LOG` wins over `RUST_LOG`; blank values count as unset.
pub fn log_spec_from(
    dobee_log: Option<String>,
    rust_log: Option<String>,
    default_spec: &str,
) -> String {
    dobee_log
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(data_dir: &Path) -> Result<(), flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    let directory = log_directory(data_dir);
    std::fs::create_dir_all(&directory)?;

    let default_spec = if cfg!(debug_assertions) {
        "warn,dobee_lib=debug,dobee=debug"
    } else {
        "warn,dobee_lib=info,dobee=info"
    };
    let spec = log_spec_from(
        std::env::var("DOBEE_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
        default_spec,
    );

    Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(&directory)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        // stdout belongs to the calendar output.
        .duplicate_to_stderr(if cfg!(debug_assertions) {
            Duplicate::Warn
        } else {
            Duplicate::None
        })
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        directory.display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(())
}

#[cfg(all(feature = "app", not(test)))]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|loc| format!("{loc}"))
            .unwrap_or_else(|| "<unknown>".to_string());

        log::error!("panic: payload={payload} location={location}");
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directory_sits_under_data_dir() {
        let dir = Path::new("/tmp/dobee");
        assert_eq!(log_directory(dir), Path::new("/tmp/dobee/logs"));
    }

    #[test]
    fn log_spec_prefers_dobee_log_then_rust_log() {
        let default_spec = "warn,dobee_lib=info";
        assert_eq!(
            log_spec_from(Some("debug".into()), Some("trace".into()), default_spec),
            "debug"
        );
        assert_eq!(
            log_spec_from(Some("  ".into()), Some("trace".into()), default_spec),
            "trace"
        );
        assert_eq!(log_spec_from(None, Some("".into()), default_spec), default_spec);
        assert_eq!(log_spec_from(None, None, default_spec), default_spec);
    }
}
