use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// 追加写入日志文件的 logger
pub struct Logger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Logger {
    pub fn new(log_path: &Path, level: LevelFilter) -> Result<Self, std::io::Error> {
        if let Some(dir) = log_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Logger {
            file: Mutex::new(file),
            level,
        })
    }

    /// 安装文件 logger；文件打不开时退回到 stderr 上的 env_logger
    pub fn init(log_dir: &Path, level: LevelFilter) {
        let log_path = log_dir.join("console.log");
        match Self::new(&log_path, level) {
            Ok(logger) => {
                if log::set_boxed_logger(Box::new(logger)).is_ok() {
                    log::set_max_level(level);
                }
            }
            Err(e) => {
                eprintln!("无法打开日志文件 {}: {}", log_path.display(), e);
                let _ = env_logger::Builder::new().filter_level(level).try_init();
            }
        }
    }

    fn format(record: &Record) -> String {
        format!(
            "[{}] [{}] [{}:{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = Self::format(record);
            if let Ok(mut file) = self.file.lock() {
                let _ = file.write_all(entry.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn writes_records_at_or_above_level() {
        let dir = std::env::temp_dir().join(format!("storage-console-log-{}", std::process::id()));
        let path = dir.join("console.log");
        let logger = Logger::new(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("创建 queue: orders"))
                .file(Some("src/tree/controller.rs"))
                .line(Some(42))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("不应写入"))
                .build(),
        );
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] [src/tree/controller.rs:42] 创建 queue: orders"));
        assert!(!content.contains("不应写入"));
        let _ = fs::remove_dir_all(&dir);
    }
}
