use anyhow::{Context, Result};
use refracta::app::RefractaApp;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("refracta=info".parse().context("invalid log directive")?),
        )
        .init();

    let app = RefractaApp::from_env()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let output = runtime.block_on(app.run())?;
    print!("{output}");
    Ok(())
}
