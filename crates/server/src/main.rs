#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sqlrag_server::start().await
}
