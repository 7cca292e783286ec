use subscription_tracker::config::get_configuration;
use subscription_tracker::startup::{Application, StartupError};
use subscription_tracker::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let subscriber = get_subscriber(
        String::from("subscription_tracker"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber)?;

    let config = get_configuration()?;
    let application = Application::build(config).await.map_err(|err| {
        tracing::error!("Failed to start the application: {:?}", err);
        err
    })?;

    application.run_until_stop().await?;

    Ok(())
}
