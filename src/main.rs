#[tokio::main]
async fn main() {
    spa_backend::run().await;
}
