/// File logger behind the `log` facade.
///
/// The terminal is in raw alternate-screen mode while playing, so log
/// lines go to a file instead. One line per record:
///
///     <unix-ms> <LEVEL> <target>: <message>

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{} {:<5} {}: {}", ts_ms, record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Parse a level name; unknown names fall back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Install the file logger. Call once, before anything logs.
pub fn init(path: &Path, level: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("could not create {}: {e}", parent.display()))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("could not open {}: {e}", path.display()))?;

    let level = parse_level(level);
    let logger = FileLogger { file: Mutex::new(file), level };
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| format!("logger already installed: {e}"))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn records_below_level_are_skipped() {
        let path = std::env::temp_dir().join(format!("hopper-log-{}.log", std::process::id()));
        let file = File::create(&path).unwrap();
        let logger = FileLogger { file: Mutex::new(file), level: LevelFilter::Info };

        logger.log(&Record::builder()
            .level(log::Level::Info)
            .target("hopper::sim")
            .args(format_args!("landed on {}", 2))
            .build());
        logger.log(&Record::builder()
            .level(log::Level::Debug)
            .target("hopper::sim")
            .args(format_args!("noise"))
            .build());
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("INFO  hopper::sim: landed on 2"));
    }

    #[test]
    fn init_installs_global_file_logger_once() {
        let path = std::env::temp_dir()
            .join(format!("hopper-init-{}", std::process::id()))
            .join("hopper.log");
        init(&path, "debug").unwrap();
        assert!(init(&path, "debug").is_err());

        log::debug!(target: "hopper::test", "logger is live");
        log::logger().flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        assert!(text.contains("hopper::test: logger is live"));
    }
}
