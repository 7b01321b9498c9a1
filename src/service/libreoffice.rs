use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::ports::LogPort;
use crate::models::office::OfficeSettings;
use crate::service::session::{move_file, resolve_input, AutomationSession};
use crate::service::traits::i_service::ConversionServiceTrait;
use crate::utils::file::TARGET_EXTENSION;

const PDF_FILTER: &str = "pdf:writer_pdf_Export";

/// 以 headless 模式的 LibreOffice 匯出 PDF。
///
/// 每次轉換都使用獨立的使用者設定檔目錄，互不共用任何狀態。
pub struct LibreOfficeService {
    settings: OfficeSettings,
    logger: Arc<dyn LogPort>,
}

impl LibreOfficeService {
    pub fn new(settings: OfficeSettings, logger: Arc<dyn LogPort>) -> Self {
        LibreOfficeService { settings, logger }
    }

    fn export(&self, input: &Path, output: &Path) -> io::Result<()> {
        let mut session = AutomationSession::open(&self.settings, self.logger.clone())?;
        let profile = session.scratch_path().join("profile");
        let outdir = session.scratch_path().join("out");
        fs::create_dir_all(&outdir)?;

        self.logger.debug(&format!("開啟文件：{}", input.display()));
        let command = build_command(&self.settings.office_path, input, &profile, &outdir);
        session.run(command, self.settings.timeout)?;

        let stem = input.file_stem().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("無效的檔名：{}", input.display()))
        })?;
        let mut produced_name = stem.to_os_string();
        produced_name.push(format!(".{}", TARGET_EXTENSION));
        let produced = outdir.join(produced_name);
        if !produced.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("LibreOffice 未產生輸出檔案 {}：{}", produced.display(), session.stderr_tail()),
            ));
        }

        self.logger.debug(&format!("轉換到 PDF：{}", output.display()));
        move_file(&produced, output)
    }
}

impl ConversionServiceTrait for LibreOfficeService {
    fn convert(&self, input_path: &Path, output_path: &Path) -> io::Result<bool> {
        let input = resolve_input(input_path)?;
        let output = std::path::absolute(output_path)?;

        match self.export(&input, &output) {
            Ok(()) => {
                self.logger.info(&format!("LibreOffice 已輸出：{}", output.display()));
                Ok(true)
            }
            Err(e) => {
                self.logger.error(&format!("LibreOffice 轉換服務異常：{:?}", e));
                Ok(false)
            }
        }
    }

    fn name(&self) -> &'static str {
        "LibreOffice"
    }
}

pub fn build_command(office_path: &Path, input: &Path, profile: &Path, outdir: &Path) -> Command {
    let mut installation = OsString::from("-env:UserInstallation=");
    installation.push(file_url(profile));

    let mut command = Command::new(office_path);
    command
        .args([
            "--headless",
            "--invisible",
            "--nologo",
            "--norestore",
            "--nolockcheck",
            "--nodefault",
        ])
        .arg(installation)
        .args(["--convert-to", PDF_FILTER, "--outdir"])
        .arg(outdir)
        .arg(input);
    command
}

// RFC 3986 路徑中的非保留字元，加上分隔用的 / 與磁碟代號的 :
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

/// 絕對路徑轉成 file:// URL，LibreOffice 的 -env 參數只接受 URL
pub fn file_url(path: &Path) -> String {
    let encoded = percent_encode(&path_bytes(path), PATH_SEGMENT).to_string();
    if encoded.starts_with('/') {
        format!("file://{}", encoded)
    } else {
        format!("file:///{}", encoded)
    }
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().replace('\\', "/").into_bytes()
}
