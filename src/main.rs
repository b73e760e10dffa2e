#[actix_web::main]
async fn main() {
    if let Err(e) = sheet_cleaner_lib::run().await {
        eprintln!("sheet-cleaner: {}", e);
        std::process::exit(1);
    }
}
