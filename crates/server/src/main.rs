#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coachvoice_server::start().await
}
