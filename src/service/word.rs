use std::io;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use crate::config::ports::LogPort;
use crate::models::office::OfficeSettings;
use crate::service::session::{resolve_input, AutomationSession};
use crate::service::traits::i_service::ConversionServiceTrait;

/// Word 的 wdFormatPDF
pub const WD_FORMAT_PDF: u32 = 17;

/// 透過 PowerShell 驅動 Word.Application COM 物件匯出 PDF
pub struct WordService {
    settings: OfficeSettings,
    logger: Arc<dyn LogPort>,
}

impl WordService {
    pub fn new(settings: OfficeSettings, logger: Arc<dyn LogPort>) -> Self {
        WordService { settings, logger }
    }

    fn export(&self, input: &Path, output: &Path) -> io::Result<()> {
        let mut session = AutomationSession::open(&self.settings, self.logger.clone())?;

        self.logger.debug(&format!("開啟文件：{}", input.display()));
        let command = build_command(&self.settings.office_path, input, output);

        if let Err(e) = session.run(command, self.settings.timeout) {
            if e.kind() == io::ErrorKind::TimedOut {
                // WINWORD 由 COM 服務啟動，不在 PowerShell 的行程樹內
                self.logger.warn("PowerShell 已結束，但 Word 行程可能仍在背景執行");
            }
            return Err(e);
        }

        if !output.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Word 未產生輸出檔案 {}：{}", output.display(), session.stderr_tail()),
            ));
        }
        Ok(())
    }
}

impl ConversionServiceTrait for WordService {
    fn convert(&self, input_path: &Path, output_path: &Path) -> io::Result<bool> {
        let input = resolve_input(input_path)?;
        let output = std::path::absolute(output_path)?;

        match self.export(&input, &output) {
            Ok(()) => {
                self.logger.info(&format!("Word 已輸出：{}", output.display()));
                Ok(true)
            }
            Err(e) => {
                self.logger.error(&format!("Word 轉換服務異常：{:?}", e));
                Ok(false)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Word"
    }
}

/// 路徑經由環境變數傳給腳本，腳本本身不含任何使用者輸入
pub const INPUT_ENV: &str = "DOC_TO_PDF_INPUT";
pub const OUTPUT_ENV: &str = "DOC_TO_PDF_OUTPUT";

pub fn build_command(office_path: &Path, input: &Path, output: &Path) -> Command {
    let mut command = Command::new(office_path);
    command
        .args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-Command"])
        .arg(build_script())
        .env(INPUT_ENV, input)
        .env(OUTPUT_ENV, output);
    command
}

/// 產生 PowerShell 腳本：開啟文件、另存 PDF，finally 內分別關閉文件與結束 Word
pub fn build_script() -> String {
    format!(
        r#"$ErrorActionPreference = 'Stop'
$inputPath = $env:{input_env}
$outputPath = $env:{output_env}
$word = $null
$doc = $null
try {{
    $word = New-Object -ComObject Word.Application
    $word.Visible = $false
    $word.DisplayAlerts = 0
    $doc = $word.Documents.Open($inputPath, $false, $true)
    $doc.SaveAs([ref] $outputPath, [ref] {format})
}} catch {{
    [Console]::Error.WriteLine($_.Exception.Message)
    exit 1
}} finally {{
    if ($doc -ne $null) {{ try {{ $doc.Close([ref] 0) }} catch {{ }} }}
    if ($word -ne $null) {{ try {{ $word.Quit() }} catch {{ }} }}
}}
exit 0
"#,
        input_env = INPUT_ENV,
        output_env = OUTPUT_ENV,
        format = WD_FORMAT_PDF,
    )
}
