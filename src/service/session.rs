use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::ports::LogPort;
use crate::models::office::OfficeSettings;
use crate::utils::file::{create_scratch_dir, create_scratch_dir_in, remove_scratch_dir};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STDOUT_LOG: &str = "stdout.log";
const STDERR_LOG: &str = "stderr.log";
const STDERR_TAIL_LINES: usize = 20;

/// 一次轉換專用的自動化工作階段：一個暫存目錄加上一個外部行程。
///
/// Drop 時無論成功與否都會結束仍在執行的行程（含其衍生的子行程）並刪除暫存目錄，
/// 清理失敗只記錄不回傳。
pub struct AutomationSession {
    scratch: PathBuf,
    child: Option<Child>,
    // 子行程以自己為群組長啟動，群組 ID 即其 PID
    #[cfg(unix)]
    process_group: Option<u32>,
    logger: Arc<dyn LogPort>,
}

impl AutomationSession {
    pub fn open(settings: &OfficeSettings, logger: Arc<dyn LogPort>) -> io::Result<Self> {
        let scratch = match &settings.scratch_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                create_scratch_dir_in(root)?
            }
            None => create_scratch_dir()?,
        };
        let scratch = std::path::absolute(scratch)?;
        logger.debug(&format!("建立自動化工作階段：{}", scratch.display()));
        Ok(AutomationSession {
            scratch,
            child: None,
            #[cfg(unix)]
            process_group: None,
            logger,
        })
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch
    }

    /// 執行外部程式直到結束；逾時會強制結束行程並回傳 TimedOut
    pub fn run(&mut self, mut command: Command, timeout: Option<Duration>) -> io::Result<()> {
        let program = command.get_program().to_string_lossy().to_string();
        command
            .stdin(Stdio::null())
            .stdout(File::create(self.scratch.join(STDOUT_LOG))?)
            .stderr(File::create(self.scratch.join(STDERR_LOG))?);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|e| io::Error::new(e.kind(), format!("無法啟動 {}: {}", program, e)))?;
        self.logger.debug(&format!("已啟動 {}，PID {}", program, child.id()));
        #[cfg(unix)]
        {
            self.process_group = Some(child.id());
        }
        self.child = Some(child);

        let status = self.wait(timeout)?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} 異常結束（{}）：{}", program, status, self.stderr_tail()),
            ));
        }
        Ok(())
    }

    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<ExitStatus> {
        let child = self.child.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "工作階段沒有執行中的行程")
        })?;

        let status = match timeout {
            None => child.wait()?,
            Some(limit) => {
                let start = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if start.elapsed() >= limit {
                        // 交給 Drop 結束行程
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("外部程式超過 {} 秒未完成", limit.as_secs_f64()),
                        ));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };
        self.child = None;
        Ok(status)
    }

    /// stderr 最後幾行，用於錯誤訊息
    pub fn stderr_tail(&self) -> String {
        let content = fs::read_to_string(self.scratch.join(STDERR_LOG)).unwrap_or_default();
        let lines: Vec<&str> = content.lines().filter(|line| !line.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

impl Drop for AutomationSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if !matches!(child.try_wait(), Ok(Some(_))) {
                self.logger.warn(&format!("強制結束外部行程 PID {}", child.id()));
                #[cfg(unix)]
                if let Some(group) = self.process_group.take() {
                    if let Err(e) = kill_process_group(group) {
                        self.logger.warn(&format!("結束行程群組 {} 失敗：{}", group, e));
                    }
                }
                #[cfg(windows)]
                if let Err(e) = kill_process_tree(child.id()) {
                    self.logger.warn(&format!("結束行程樹 PID {} 失敗：{}", child.id(), e));
                }
                if let Err(e) = child.kill() {
                    self.logger.warn(&format!("結束外部行程失敗：{}", e));
                }
                if let Err(e) = child.wait() {
                    self.logger.warn(&format!("回收外部行程失敗：{}", e));
                }
            }
        }
        // 直接子行程已結束時，背景殘留的孫行程仍在同一群組
        #[cfg(unix)]
        if let Some(group) = self.process_group.take() {
            if let Err(e) = kill_process_group(group) {
                self.logger.warn(&format!("結束殘留行程群組 {} 失敗：{}", group, e));
            }
        }
        if let Err(e) = remove_scratch_dir(&self.scratch) {
            self.logger.warn(&format!("清理暫存目錄失敗：{}，{}", self.scratch.display(), e));
        }
        self.logger.debug("文書處理程式資源已清理");
    }
}

/// 對整個行程群組送出 SIGKILL；群組已不存在時視為成功
#[cfg(unix)]
pub fn kill_process_group(group: u32) -> io::Result<()> {
    let group = libc::pid_t::try_from(group)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("無效的行程群組：{}", group)))?;
    // SAFETY: killpg 只接收整數參數，不涉及記憶體
    let rc = unsafe { libc::killpg(group, libc::SIGKILL) };
    if rc == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

/// taskkill /T 連同子行程一併結束
#[cfg(windows)]
pub fn kill_process_tree(pid: u32) -> io::Result<()> {
    let status = Command::new("taskkill")
        .args(["/T", "/F", "/PID"])
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::Other, format!("taskkill 異常結束（{}）", status)))
    }
}

/// 轉成絕對路徑並確認是既有檔案；不存在時回傳 NotFound
pub fn resolve_input(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let metadata = fs::metadata(&absolute).map_err(|e| {
        io::Error::new(e.kind(), format!("無法讀取輸入檔案 {}: {}", absolute.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("輸入路徑不是檔案：{}", absolute.display()),
        ));
    }
    Ok(absolute)
}

/// 先嘗試 rename，跨磁碟時改用複製
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::Engine;

    struct SilentLog;

    impl LogPort for SilentLog {
        fn log(&self, _level: log::Level, _message: &str) {}
    }

    fn settings_in(root: &Path) -> OfficeSettings {
        OfficeSettings {
            engine: Engine::LibreOffice,
            office_path: PathBuf::from("soffice"),
            timeout: None,
            scratch_root: Some(root.to_path_buf()),
        }
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let session = AutomationSession::open(&settings_in(root.path()), Arc::new(SilentLog)).unwrap();
        let scratch = session.scratch_path().to_path_buf();
        assert!(scratch.is_dir());
        assert!(scratch.is_absolute());
        fs::write(scratch.join("partial.pdf"), b"%PDF").unwrap();
        drop(session);
        assert!(!scratch.exists());
    }

    #[test]
    fn missing_program_is_an_error_and_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let mut session = AutomationSession::open(&settings_in(root.path()), Arc::new(SilentLog)).unwrap();
        let scratch = session.scratch_path().to_path_buf();
        let err = session
            .run(Command::new(root.path().join("no-such-office")), None)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        drop(session);
        assert!(!scratch.exists());
    }

    #[cfg(unix)]
    #[test]
    fn killing_a_finished_group_is_not_an_error() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        kill_process_group(pid).unwrap();
    }

    #[test]
    fn resolve_input_distinguishes_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(&dir.path().join("gone.docx")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        let err = resolve_input(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let file = dir.path().join("real.docx");
        fs::write(&file, b"doc").unwrap();
        assert_eq!(resolve_input(&file).unwrap(), file);
    }

    #[test]
    fn move_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();
        move_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"new");
        assert!(!from.exists());
    }
}
