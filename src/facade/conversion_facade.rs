use std::io;
use std::sync::Arc;
use crate::config::config::Engine;
use crate::config::ports::LogPort;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::{
    ConversionRequest, ConversionResult, CONVERSION_FAILED_MESSAGE, FILE_NOT_FOUND_PREFIX,
    SYSTEM_ERROR_PREFIX, UNSUPPORTED_INPUT_MESSAGE, UNWRITABLE_OUTPUT_MESSAGE,
};
use crate::models::office::OfficeSettings;
use crate::service::libreoffice::LibreOfficeService;
use crate::service::traits::i_service::ConversionServiceTrait;
use crate::service::word::WordService;
use crate::utils::file::{derive_output_path, file_name_of, is_supported_document, is_writable_destination};

/// 轉換路由：參數校驗 -> 呼叫服務層 -> 錯誤處理
pub struct ConversionFacade {
    service: Box<dyn ConversionServiceTrait>,
    logger: Arc<dyn LogPort>,
}

impl ConversionFacade {
    pub fn new(service: Box<dyn ConversionServiceTrait>, logger: Arc<dyn LogPort>) -> Self {
        ConversionFacade { service, logger }
    }

    /// 依設定中的引擎建立對應的轉換服務
    pub fn with_settings(settings: OfficeSettings, logger: Arc<dyn LogPort>) -> Self {
        let service: Box<dyn ConversionServiceTrait> = match settings.engine {
            Engine::LibreOffice => Box::new(LibreOfficeService::new(settings, logger.clone())),
            Engine::Word => Box::new(WordService::new(settings, logger.clone())),
        };
        ConversionFacade::new(service, logger)
    }

    fn try_convert(&self, request: &ConversionRequest) -> io::Result<ConversionResult> {
        let input = &request.input_path;
        if !is_supported_document(input) {
            self.logger.warn(&format!("無效 Word 檔案：{}", input.display()));
            return Ok(ConversionResult::failure(UNSUPPORTED_INPUT_MESSAGE));
        }

        let output = match &request.output_path {
            Some(path) => {
                if !is_writable_destination(path) {
                    self.logger.warn(&format!("路徑不可寫入：{}", path.display()));
                    return Ok(ConversionResult::failure(UNWRITABLE_OUTPUT_MESSAGE));
                }
                path.clone()
            }
            None => derive_output_path(input),
        };

        self.logger.info(&format!("開始轉換：{}（{}）", file_name_of(input), self.service.name()));
        if self.service.convert(input, &output)? {
            self.logger.info(&format!("轉換成功：{}", output.display()));
            Ok(ConversionResult::Success(output))
        } else {
            self.logger.warn(&format!("轉換失敗：{}", input.display()));
            Ok(ConversionResult::failure(CONVERSION_FAILED_MESSAGE))
        }
    }
}

impl ConversionFacadeTrait for ConversionFacade {
    fn convert_document(&self, request: &ConversionRequest) -> ConversionResult {
        match self.try_convert(request) {
            Ok(result) => result,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.logger.error(&format!("檔案不存在：{}，{:?}", request.input_path.display(), e));
                ConversionResult::failure(format!("{}{}", FILE_NOT_FOUND_PREFIX, file_name_of(&request.input_path)))
            }
            Err(e) => {
                self.logger.error(&format!("Word 路由層異常：{:?}", e));
                ConversionResult::failure(format!("{}{}", SYSTEM_ERROR_PREFIX, e))
            }
        }
    }
}
