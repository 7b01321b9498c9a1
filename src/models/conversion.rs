use std::path::PathBuf;

pub const UNSUPPORTED_INPUT_MESSAGE: &str = "僅支援 .doc 或 .docx 檔案";
pub const UNWRITABLE_OUTPUT_MESSAGE: &str = "輸出路徑不可寫入";
pub const CONVERSION_FAILED_MESSAGE: &str = "轉換失敗";
pub const FILE_NOT_FOUND_PREFIX: &str = "檔案不存在: ";
pub const SYSTEM_ERROR_PREFIX: &str = "系統錯誤: ";

#[derive(Clone, Debug)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
}

impl ConversionRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: Option<PathBuf>) -> Self {
        ConversionRequest {
            input_path: input_path.into(),
            output_path,
        }
    }
}

/// 一次轉換的最終結果，成功時帶輸出路徑，失敗時帶給使用者看的訊息
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionResult {
    Success(PathBuf),
    Failure(String),
}

impl ConversionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        ConversionResult::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    /// 攤平成 (是否成功, 輸出路徑或錯誤訊息)
    pub fn into_parts(self) -> (bool, String) {
        match self {
            ConversionResult::Success(path) => (true, path.display().to_string()),
            ConversionResult::Failure(message) => (false, message),
        }
    }
}
