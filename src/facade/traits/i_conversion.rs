use crate::models::conversion::{ConversionRequest, ConversionResult};

// Facade 接口，負責協調驗證、轉換服務與結果對應
pub trait ConversionFacadeTrait: Send + Sync {
    /// 執行一次 Word 轉 PDF
    /// # 參數
    /// - request: 輸入路徑與可選的輸出路徑
    /// # 回傳
    /// - 成功時帶輸出路徑，失敗時帶給使用者看的訊息；所有錯誤都已對應成失敗結果
    fn convert_document(&self, request: &ConversionRequest) -> ConversionResult;
}
