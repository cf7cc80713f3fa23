#[tokio::main]
async fn main() {
    if let Err(e) = yaseen_chat_lib::run().await {
        eprintln!("yaseen-chat: {}", e);
        std::process::exit(1);
    }
}
