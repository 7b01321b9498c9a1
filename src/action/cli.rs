use std::io;
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use crate::action::interactive::process_interactive_mode;
use crate::config::config::{Cli, validate_log_level};
use crate::config::ports::{AppConfig, ConfigPort, LogPort};
use crate::facade::conversion_facade::ConversionFacade;
use crate::facade::worker::ConversionWorker;
use crate::models::conversion::{ConversionRequest, ConversionResult, SYSTEM_ERROR_PREFIX};
use crate::models::office::OfficeSettings;
use crate::service::config_service::{default_config_path, ConfigService, YamlConfigAdapter};
use crate::utils::file::file_name_of;
use crate::utils::logger::{setup_logging, FacadeLogPort};
use crate::utils::utils::ProgressManager;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

pub fn process_args(args: Vec<String>) -> io::Result<String> {
    if args.len() == 1 {
        process_interactive_mode()
    } else {
        process_cli_mode()
    }
}

pub fn process_cli_mode() -> io::Result<String> {
    let cli = Cli::parse();
    let config_port: Box<dyn ConfigPort> = Box::new(CliConfigAdapter::new(cli.clone()));
    let config = ConfigService::new(config_port).get_config()?;
    setup_logging(&config.logging.level, &config.logging)?;
    log::debug!("配置路徑：{}", config_path_of(&cli).display());

    if cli.show_config {
        println!("實際使用的配置：{:#?}", config);
    }

    let worker = build_worker(&config);
    let request = ConversionRequest::new(&cli.input, cli.output.as_ref().map(PathBuf::from));
    match run_conversion(&worker, request, cli.no_progress)? {
        ConversionResult::Success(path) => Ok(format!("轉換完成！輸出檔案位於：{}", path.display())),
        ConversionResult::Failure(message) => Err(io::Error::new(io::ErrorKind::Other, message)),
    }
}

pub fn build_worker(config: &AppConfig) -> ConversionWorker {
    let logger: Arc<dyn LogPort> = Arc::new(FacadeLogPort::new());
    let settings = OfficeSettings::from_config(&config.conversion);
    let facade = Arc::new(ConversionFacade::with_settings(settings, logger.clone()));
    ConversionWorker::new(facade, logger)
}

/// 交給背景執行緒轉換，目前執行緒只負責轉動進度指示並等待結果
pub fn run_conversion(
    worker: &ConversionWorker,
    request: ConversionRequest,
    no_progress: bool,
) -> io::Result<ConversionResult> {
    let name = file_name_of(&request.input_path);
    let rx = worker.dispatch(request)?;
    let pm = ProgressManager::new(&format!("轉換中：{}", name), no_progress);
    loop {
        match rx.recv_timeout(TICK_INTERVAL) {
            Ok(result) => {
                pm.finish(if result.is_success() { "轉換完成" } else { "轉換失敗" });
                return Ok(result);
            }
            Err(RecvTimeoutError::Timeout) => pm.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                pm.finish("轉換中斷");
                log::error!("轉換執行緒未回傳結果即結束：{}", name);
                return Ok(ConversionResult::failure(format!("{}轉換執行緒意外結束", SYSTEM_ERROR_PREFIX)));
            }
        }
    }
}

fn config_path_of(cli: &Cli) -> PathBuf {
    cli.config.as_ref().map(PathBuf::from).unwrap_or_else(default_config_path)
}

// CLI 配置適配器：先讀設定檔，再以命令列參數覆寫
pub struct CliConfigAdapter {
    cli: Cli,
}

impl CliConfigAdapter {
    pub fn new(cli: Cli) -> Self {
        CliConfigAdapter { cli }
    }
}

impl ConfigPort for CliConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let mut config = YamlConfigAdapter::new(config_path_of(&self.cli)).get_config()?;

        if let Some(engine) = self.cli.engine {
            config.conversion.engine = engine;
        }
        if let Some(office_path) = &self.cli.office_path {
            config.conversion.office_path = Some(office_path.clone());
        }
        if let Some(timeout) = self.cli.timeout {
            config.conversion.timeout_secs = Some(timeout);
        }
        if let Some(level) = &self.cli.log_level {
            config.logging.level = level.clone();
        }
        validate_log_level(&config.logging.level)?;

        Ok(config)
    }
}
