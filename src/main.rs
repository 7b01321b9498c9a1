use std::io;

use doc_to_pdf::action::cli::process_args;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match process_args(args) {
        Ok(summary) => {
            log::info!("程式執行完成：{}", summary);
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            log::error!("應用程式異常結束：{:?}", e);
            eprintln!("錯誤：{}", e);
            std::process::exit(1);
        }
    }
}
