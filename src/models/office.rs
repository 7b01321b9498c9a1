use std::path::PathBuf;
use std::time::Duration;

use crate::config::config::Engine;
use crate::config::ports::ConversionSection;

// 交給轉換服務的設定快照，服務本身不讀取設定檔
#[derive(Clone, Debug)]
pub struct OfficeSettings {
    pub engine: Engine,
    pub office_path: PathBuf,
    pub timeout: Option<Duration>,
    pub scratch_root: Option<PathBuf>,
}

impl OfficeSettings {
    pub fn from_config(section: &ConversionSection) -> Self {
        let office_path = section
            .office_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_office_path(section.engine)));
        OfficeSettings {
            engine: section.engine,
            office_path,
            timeout: section.timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            scratch_root: section.scratch_dir.as_ref().map(PathBuf::from),
        }
    }
}

pub fn default_office_path(engine: Engine) -> &'static str {
    match engine {
        Engine::LibreOffice if cfg!(windows) => "soffice.exe",
        Engine::LibreOffice => "soffice",
        Engine::Word => "powershell",
    }
}
