//! main.rs

use anyhow::Context;
use waitlist::configuration::get_configuration;
use waitlist::error::WaitlistResult;
use waitlist::startup::Application;
use waitlist::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> WaitlistResult<()> {
    let subscriber = get_subscriber("waitlist".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let application = Application::build(configuration).await?;
    tracing::info!("Waitlist is listening on port {}", application.port());
    if let Err(e) = application.run_until_stopped().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Web server failed"
        );
        return Err(anyhow::Error::from(e).into());
    }
    tracing::info!("Web server has exited");
    Ok(())
}
