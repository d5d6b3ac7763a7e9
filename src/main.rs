use anyhow::Result;
use meeting_scheduler::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
