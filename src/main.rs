use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod feedback;
mod session;
mod summarize;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs};
use crate::feedback::FeedbackStore;
use crate::session::controller::SessionController;
use crate::summarize::remote::RemoteSummarizer;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_tracing(args.log_json);

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Opening feedback store: {}", config.feedback.path);
    let feedback = Arc::new(FeedbackStore::open(&config.feedback.path).await?);

    let summarizer = RemoteSummarizer::new(&config.summarizer)?;
    info!("Forwarding questions to {}", summarizer.endpoint());

    let controller = SessionController::new(
        config.session.default_dialect,
        Arc::new(summarizer),
        Arc::clone(&feedback),
        config.feedback.user_name.clone(),
    );

    let template_env = web::templates::init_templates()?;
    let app_state = Arc::new(AppState::new(config.clone(), template_env, controller));

    // Start the web server
    info!("Starting NL-Chat on {}:{}", config.web.host, config.web.port);
    let served = web::run_server(config.web, app_state).await;

    // Flush feedback whether or not the server stopped cleanly
    if let Err(e) = feedback.close().await {
        error!("Failed to close feedback store: {}", e);
    }

    match served {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
