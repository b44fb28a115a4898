use finance_tracker::{
    api::start_server,
    audit::AuditLog,
    contract::PromptContract,
    executor::SqlExecutor,
    pipeline::Pipeline,
    synthesizer::GroqSynthesizer,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let groq_api_key = std::env::var("GROQ_API_KEY").ok();
    if groq_api_key.is_none() {
        eprintln!("GROQ_API_KEY not set; /query will report the service as unavailable");
    }

    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "tracker.db".to_string());

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()?;

    // Instruction contract: built-in unless an override is configured.
    let contract = match std::env::var("CONTRACT_PATH") {
        Ok(path) => PromptContract::from_path(Path::new(&path))?,
        Err(_) => PromptContract::builtin(),
    };
    info!("Instruction contract version: {}", contract.version);

    // Create components
    let executor = SqlExecutor::new(&db_path);
    executor.initialize()?;

    let synthesizer = Box::new(GroqSynthesizer::from_api_key(groq_api_key, contract)?);
    let pipeline = Arc::new(Pipeline::new(synthesizer, executor.clone(), AuditLog::new()));

    info!("Finance Tracker API - db={} port={}", db_path, port);

    // Start API server
    start_server(pipeline, executor, port).await?;

    Ok(())
}
