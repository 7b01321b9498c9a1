use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rand::distr::Alphanumeric;

pub struct ProgressManager {
    pb: ProgressBar,
    no_progress: bool,
    start: Instant,
}

impl ProgressManager {
    pub fn new(message: &str, no_progress: bool) -> Self {
        let pb = if no_progress {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg} 已耗時: {elapsed}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(message.to_string());
            pb
        };
        ProgressManager {
            pb,
            no_progress,
            start: Instant::now(),
        }
    }

    pub fn tick(&self) {
        if self.no_progress {
            return;
        }
        self.pb.tick();
    }

    pub fn finish(&self, message: &str) {
        if self.no_progress {
            return;
        }
        self.pb.finish_with_message(format!(
            "{}（{:.1} 秒）",
            message,
            self.start.elapsed().as_secs_f64()
        ));
    }
}

pub fn generate_random_suffix(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 相對路徑以執行檔所在目錄為基準，找不到執行檔時退回目前工作目錄
pub fn resource_path(relative_path: &str) -> io::Result<PathBuf> {
    let path = Path::new(relative_path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let base = match std::env::current_exe() {
        Ok(exe) => exe.parent().map(Path::to_path_buf).unwrap_or(std::env::current_dir()?),
        Err(_) => std::env::current_dir()?,
    };
    Ok(base.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_suffix_has_requested_length() {
        let suffix = generate_random_suffix(32);
        assert_eq!(suffix.len(), 32);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(suffix, generate_random_suffix(32));
    }

    #[test]
    fn absolute_resource_paths_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("app.ico");
        assert_eq!(resource_path(icon.to_str().unwrap()).unwrap(), icon);
    }

    #[test]
    fn relative_resource_paths_are_anchored() {
        let resolved = resource_path("log_16x16.ico").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("log_16x16.ico"));
    }

    #[test]
    fn hidden_progress_is_silent() {
        let pm = ProgressManager::new("轉換中", true);
        pm.tick();
        pm.finish("完成");
    }
}
