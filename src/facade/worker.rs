use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use crate::config::ports::LogPort;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::{ConversionRequest, ConversionResult};

pub const BUSY_MESSAGE: &str = "已有轉換正在進行中";

/// 背景轉換執行者。每個請求使用一條新執行緒，同一時間只接受一個請求，
/// 結果透過 channel 交回呼叫端執行緒。
pub struct ConversionWorker {
    facade: Arc<dyn ConversionFacadeTrait>,
    in_flight: Arc<AtomicBool>,
    logger: Arc<dyn LogPort>,
}

// 執行緒結束或 panic 時釋放名額
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ConversionWorker {
    pub fn new(facade: Arc<dyn ConversionFacadeTrait>, logger: Arc<dyn LogPort>) -> Self {
        ConversionWorker {
            facade,
            in_flight: Arc::new(AtomicBool::new(false)),
            logger,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// 已有請求進行中時回傳 WouldBlock，不排隊
    pub fn dispatch(&self, request: ConversionRequest) -> io::Result<Receiver<ConversionResult>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.logger.warn(&format!("拒絕轉換請求：{}，{}", request.input_path.display(), BUSY_MESSAGE));
            return Err(io::Error::new(io::ErrorKind::WouldBlock, BUSY_MESSAGE));
        }

        let slot = SlotGuard(self.in_flight.clone());
        let (tx, rx) = mpsc::channel();
        let facade = self.facade.clone();
        let spawned = thread::Builder::new()
            .name("conversion-worker".to_string())
            .spawn(move || {
                let result = facade.convert_document(&request);
                drop(slot);
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => Ok(rx),
            Err(e) => {
                self.logger.error(&format!("無法建立轉換執行緒：{:?}", e));
                Err(e)
            }
        }
    }
}
