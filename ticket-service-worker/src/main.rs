mod application;
mod error;
mod service;

use application::ApplicationEnv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    {
        // Ignore error because .env file is not required
        // as long as env variables are set
        let _ = dotenvy::dotenv();
    }

    let env = ApplicationEnv::parse()?;

    application::setup_tracing(&env)?;

    let application_state = application::create_state(&env).await?;

    tracing::info!("worker started");
    application::shutdown_signal().await;

    application::close(application_state).await;

    Ok(())
}
