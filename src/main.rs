//! replay-learnings - surface relevant past learnings for a prompt

use replay_learnings::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (WARN level by default, use RUST_LOG=debug to see
    // why a prompt produced no advisory). Logs share stderr with the advisory.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run().await
}
