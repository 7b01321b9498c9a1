use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Parser, Clone)]
#[command(
    name = "doc_to_pdf",
    about = "透過本機文書處理程式將 Word 文件轉換為 PDF",
    long_about = "一個將 .doc / .docx 文件轉換為 PDF 的工具，實際轉換交由本機安裝的 LibreOffice 或 Microsoft Word 完成。\n不帶任何參數執行時進入互動模式。使用 --show-config 預覽實際配置。\n使用 `--help` 查看詳細用法。",
    arg_required_else_help = true
)]
pub struct Cli {
    pub input: String,
    #[arg(short, long)]
    pub output: Option<String>,
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long)]
    pub engine: Option<Engine>,
    #[arg(long)]
    pub office_path: Option<String>,
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long, value_parser = ["debug", "info", "warn", "error"])]
    pub log_level: Option<String>,
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
    #[arg(long, default_value_t = false)]
    pub show_config: bool,
}

#[derive(Clone, Copy, ValueEnum, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[value(name = "libreoffice")]
    LibreOffice,
    Word,
}

impl Default for Engine {
    fn default() -> Self {
        if cfg!(windows) {
            Engine::Word
        } else {
            Engine::LibreOffice
        }
    }
}

pub fn validate_input_path(input: &str) -> io::Result<&Path> {
    let path = Path::new(input);
    if !path.exists() {
        log::error!("輸入路徑不存在：{}", input);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入路徑 '{}' 不存在", input)
        ));
    }
    if !path.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("輸入路徑 '{}' 不是檔案", input)
        ));
    }
    Ok(path)
}

pub fn validate_log_level(level: &str) -> io::Result<()> {
    match level {
        "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("無效的日誌等級: {}", level)
        )),
    }
}
