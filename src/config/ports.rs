use std::io;
use serde::{Deserialize, Serialize};
use crate::config::config::Engine;

// 應用配置結構體，對應 config.yaml 的三個區段
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub logging: LoggingSection,
    pub conversion: ConversionSection,
}

// 介面設定，只有呈現層會讀取
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSection {
    pub title: String,
    pub icon: String,
}

impl Default for AppSection {
    fn default() -> Self {
        AppSection {
            title: "MagicTools".to_string(),
            icon: "log_16x16.ico".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    pub dir: Option<String>,
    /// 單位為 MB，超過時輪替為 app.log.1
    pub max_size: u64,
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            dir: None,
            max_size: 10,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionSection {
    pub engine: Engine,
    pub office_path: Option<String>,
    pub timeout_secs: Option<u64>,
    pub scratch_dir: Option<String>,
}

// 配置來源的 Port
pub trait ConfigPort {
    fn get_config(&self) -> io::Result<AppConfig>;
}

// 日誌的 Port，由建構子注入路由層與服務層
pub trait LogPort: Send + Sync {
    fn log(&self, level: log::Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(log::Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(log::Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(log::Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(log::Level::Error, message);
    }
}
