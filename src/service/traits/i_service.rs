use std::io;
use std::path::Path;

// 轉換服務接口，包裝對外部文書處理程式的一次呼叫
pub trait ConversionServiceTrait: Send + Sync {
    /// 將 Word 文件匯出為 PDF
    /// # 參數
    /// - input_path: 既有的 Word 文件
    /// - output_path: PDF 目標路徑，所在目錄須可寫入
    /// # 回傳
    /// - Ok(true) 匯出成功；Ok(false) 外部程式失敗，已在服務內記錄
    /// - Err 表示非預期錯誤（例如輸入檔案消失），交由路由層處理
    fn convert(&self, input_path: &Path, output_path: &Path) -> io::Result<bool>;

    /// 服務名稱，用於日誌
    fn name(&self) -> &'static str;
}
