use dialoguer::{Input, Select};
use std::io;
use std::path::PathBuf;

use crate::action::cli::{build_worker, run_conversion};
use crate::config::config::validate_input_path;
use crate::config::ports::AppConfig;
use crate::facade::worker::ConversionWorker;
use crate::models::conversion::{ConversionRequest, ConversionResult, SYSTEM_ERROR_PREFIX};
use crate::service::config_service::{default_config_path, ConfigService, YamlConfigAdapter};
use crate::utils::file::file_name_of;
use crate::utils::logger::setup_logging;
use crate::utils::utils::resource_path;

const STATUS_READY: &str = "準備就緒";
const STATUS_RUNNING: &str = "轉換中...";
const STATUS_DONE: &str = "轉換完成";
const STATUS_FAILED: &str = "轉換失敗";

pub fn process_interactive_mode() -> io::Result<String> {
    let config_path = default_config_path();
    let config_port = Box::new(YamlConfigAdapter::new(config_path.clone()));
    let config = ConfigService::new(config_port).get_config()?;
    setup_logging(&config.logging.level, &config.logging)?;
    log::info!("系統初始化完成，配置路徑：{}", config_path.display());

    let mut shell = ConverterShell::new(&config);
    shell.run()
}

/// 終端機版的轉換介面：選擇檔案、按下轉換、顯示狀態
pub struct ConverterShell {
    title: String,
    worker: ConversionWorker,
    selected: Option<PathBuf>,
    status: String,
}

impl ConverterShell {
    pub fn new(config: &AppConfig) -> Self {
        load_icon(&config.app.icon);
        let shell = ConverterShell {
            title: config.app.title.clone(),
            worker: build_worker(config),
            selected: None,
            status: STATUS_READY.to_string(),
        };
        log::info!("應用程式初始化完成");
        shell
    }

    pub fn run(&mut self) -> io::Result<String> {
        log::info!("啟動互動介面");
        println!("=== {} ===", self.title);
        loop {
            println!("狀態：{}", self.status);
            let current = self
                .selected
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "未選擇".to_string());
            let items = [
                format!("選擇 Word 檔案（目前：{}）", current),
                "轉換為 PDF".to_string(),
                "離開".to_string(),
            ];
            let choice = Select::new()
                .with_prompt("請選擇操作（使用方向鍵選擇，按 Enter 確認）")
                .items(&items)
                .default(if self.selected.is_some() { 1 } else { 0 })
                .interact()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("操作選擇失敗: {}", e)))?;

            match choice {
                0 => self.browse_file()?,
                1 => self.start_conversion(),
                _ => break,
            }
        }
        Ok(format!("{} 已關閉", self.title))
    }

    fn browse_file(&mut self) -> io::Result<()> {
        let input: String = Input::new()
            .with_prompt("請輸入 Word 檔案路徑（.doc / .docx，留空取消）")
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), String> {
                if input.trim().is_empty() {
                    return Ok(());
                }
                validate_input_path(input.trim()).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        let input = input.trim();
        if !input.is_empty() {
            self.selected = Some(PathBuf::from(input));
        }
        Ok(())
    }

    fn start_conversion(&mut self) {
        let Some(input) = self.selected.clone() else {
            println!("輸入錯誤：請先選擇 Word 檔案");
            return;
        };

        self.status = STATUS_RUNNING.to_string();
        println!("狀態：{}", self.status);
        let (message, status) = match run_conversion(&self.worker, ConversionRequest::new(input, None), false) {
            Ok(result) => render_result(&result),
            Err(e) => {
                log::error!("無法開始轉換：{:?}", e);
                let status = format!("{}{}", SYSTEM_ERROR_PREFIX, e);
                (status.clone(), status)
            }
        };
        println!("{}", message);
        self.status = status;
    }
}

/// 轉換結果對應到 (提示訊息, 狀態列文字)
pub fn render_result(result: &ConversionResult) -> (String, String) {
    match result {
        ConversionResult::Success(path) => (
            format!("轉換成功：檔案已轉換為: {}", file_name_of(path)),
            STATUS_DONE.to_string(),
        ),
        ConversionResult::Failure(message) => (
            format!("轉換失敗：錯誤: {}", message),
            STATUS_FAILED.to_string(),
        ),
    }
}

// 終端機沒有視窗圖示，只確認資源存在
fn load_icon(icon: &str) {
    match resource_path(icon) {
        Ok(path) if path.exists() => log::debug!("設定應用圖示: {}", path.display()),
        Ok(path) => log::warn!("圖示載入失敗: 找不到 {}", path.display()),
        Err(e) => log::warn!("圖示載入失敗: {}", e),
    }
}
