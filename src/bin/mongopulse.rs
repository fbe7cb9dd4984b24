use mongopulse::cli::start;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start::start().await
}
