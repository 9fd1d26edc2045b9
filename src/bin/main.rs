use econdata_agent::{AgentConfig, EconAgent, Question};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing (stderr, so stdout only carries the answer)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Fail on missing credentials before asking anything
    let config = AgentConfig::from_env()?;
    let agent = EconAgent::from_config(&config)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"\nInteractive mode\n\nAsk an economic question: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;

    let text = line.trim();
    if text.is_empty() {
        warn!("No question given; exiting");
        return Ok(());
    }

    let question = Question::new(text);
    let outcome = agent.answer(&question).await;

    info!(answered = outcome.is_answered(), "Done");
    stdout.write_all(format!("\n{}\n", outcome).as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}
