#[tokio::main]
async fn main() -> anyhow::Result<()> {
    thoughts_server::run().await
}
