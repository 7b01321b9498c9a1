use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use chrono::Local;
use crate::config::ports::{LoggingSection, LogPort};

pub const LOG_TARGET: &str = "doc_to_pdf";
pub const LOG_FILE_NAME: &str = "app.log";

pub fn parse_level_filter(log_level: &str) -> log::LevelFilter {
    match log_level {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

pub fn setup_logging(log_level: &str, logging: &LoggingSection) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(parse_level_filter(log_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                LOG_TARGET,
                record.args()
            )
        });

    if let Some(dir) = &logging.dir {
        let file = prepare_log_file(Path::new(dir), logging.max_size)?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
    }

    builder
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("日誌初始化失敗: {}", e)))
}

/// 開啟 app.log（附加模式），超過 max_size MB 時先輪替為 app.log.1
pub fn prepare_log_file(dir: &Path, max_size_mb: u64) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    let log_file = dir.join(LOG_FILE_NAME);
    if let Ok(metadata) = fs::metadata(&log_file) {
        if max_size_mb > 0 && metadata.len() > max_size_mb * 1024 * 1024 {
            fs::rename(&log_file, dir.join(format!("{}.1", LOG_FILE_NAME)))?;
        }
    }
    OpenOptions::new().create(true).append(true).open(&log_file)
}

// 同時寫入 stderr 與日誌檔
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// 轉發到 `log` 門面的 LogPort
pub struct FacadeLogPort;

impl FacadeLogPort {
    pub fn new() -> Self {
        FacadeLogPort
    }
}

impl LogPort for FacadeLogPort {
    fn log(&self, level: log::Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_info() {
        assert_eq!(parse_level_filter("debug"), log::LevelFilter::Debug);
        assert_eq!(parse_level_filter("error"), log::LevelFilter::Error);
        assert_eq!(parse_level_filter("verbose"), log::LevelFilter::Info);
    }

    #[test]
    fn log_file_is_created_in_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("logs");
        let mut file = prepare_log_file(&dir, 10).unwrap();
        file.write_all(b"line\n").unwrap();
        assert!(dir.join(LOG_FILE_NAME).is_file());
    }

    #[test]
    fn oversized_log_is_rolled_over() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join(LOG_FILE_NAME);
        fs::write(&log_file, vec![b'x'; 1024 * 1024 + 1]).unwrap();

        prepare_log_file(dir.path(), 1).unwrap();

        assert_eq!(fs::metadata(dir.path().join("app.log.1")).unwrap().len(), 1024 * 1024 + 1);
        assert_eq!(fs::metadata(&log_file).unwrap().len(), 0);
    }

    #[test]
    fn small_log_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOG_FILE_NAME), b"old\n").unwrap();
        let mut file = prepare_log_file(dir.path(), 1).unwrap();
        file.write_all(b"new\n").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap(), "old\nnew\n");
        assert!(!dir.path().join("app.log.1").exists());
    }
}
