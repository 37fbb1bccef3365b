#[tokio::main]
async fn main() {
    if let Err(e) = bounce_dashboard::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
