use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    rackguard_cli::main_entry().await
}
