use clinic_web::config::get_configuration;
use clinic_web::observability::init_tracing;
use clinic_web::startup::Application;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("info");

    let application = Application::build(configuration)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;

    info!("Starting clinic-web on port {}", application.port());

    application.run_until_stopped().await?;

    Ok(())
}
