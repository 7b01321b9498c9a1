use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use crate::config::ports::{AppConfig, ConfigPort};

pub const APP_DATA_DIR: &str = "DocConverter";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

// 配置服務，負責選擇適當的配置適配器
pub struct ConfigService {
    config_port: Box<dyn ConfigPort>,
}

impl ConfigService {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConfigService { config_port }
    }

    pub fn get_config(&self) -> io::Result<AppConfig> {
        self.config_port.get_config()
    }
}

// YAML 檔案配置適配器，檔案不存在時以預設值建立
pub struct YamlConfigAdapter {
    path: PathBuf,
}

impl YamlConfigAdapter {
    pub fn new(path: PathBuf) -> Self {
        YamlConfigAdapter { path }
    }
}

impl ConfigPort for YamlConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        if !self.path.exists() {
            write_default_config(&self.path)?;
        }
        load_config(&self.path)
    }
}

/// 平台設定目錄下的 DocConverter/config.yaml，取不到時使用目前工作目錄
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DATA_DIR)
        .join(CONFIG_FILE_NAME)
}

pub fn load_config(path: &Path) -> io::Result<AppConfig> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("配置檔案載入失敗 {}: {}", path.display(), e)
        )
    })
}

/// 寫入預設配置，日誌目錄放在配置檔旁的 logs/
pub fn write_default_config(path: &Path) -> io::Result<AppConfig> {
    let mut config = AppConfig::default();
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
        config.logging.dir = Some(dir.join("logs").to_string_lossy().to_string());
    }
    let content = serde_yaml::to_string(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("配置序列化失敗: {}", e)))?;
    fs::write(path, content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::Engine;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_DATA_DIR).join(CONFIG_FILE_NAME);
        let service = ConfigService::new(Box::new(YamlConfigAdapter::new(path.clone())));

        let config = service.get_config().unwrap();

        assert!(path.is_file());
        assert_eq!(config.app.title, "MagicTools");
        assert_eq!(config.app.icon, "log_16x16.ico");
        assert_eq!(config.logging.max_size, 10);
        let logs = dir.path().join(APP_DATA_DIR).join("logs");
        assert_eq!(config.logging.dir.as_deref(), Some(logs.to_str().unwrap()));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "app:\n  title: 文件轉換\nconversion:\n  engine: word\n  timeout_secs: 120\n").unwrap();

        let config = YamlConfigAdapter::new(path).get_config().unwrap();

        assert_eq!(config.app.title, "文件轉換");
        assert_eq!(config.app.icon, "log_16x16.ico");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.conversion.engine, Engine::Word);
        assert_eq!(config.conversion.timeout_secs, Some(120));
        assert!(config.conversion.office_path.is_none());
    }

    #[test]
    fn empty_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_config(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "app: [unterminated").unwrap();
        let err = load_config(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        assert!(default_config_path().ends_with(Path::new(APP_DATA_DIR).join(CONFIG_FILE_NAME)));
    }
}
