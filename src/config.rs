use clap::Parser;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::summarize::models::Dialect;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub path: String,
    // Bounds every call so a silent service cannot hold the session busy
    pub timeout_secs: u64,
}

impl SummarizerConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    pub path: String,
    pub user_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub default_dialect: Dialect,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub summarizer: SummarizerConfig,
    pub feedback: FeedbackConfig,
    pub session: SessionConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the summarization service
    #[arg(long, value_name = "URL")]
    pub summarizer_url: Option<String>,

    /// File that stores thumbs up/down feedback
    #[arg(long, value_name = "FILE")]
    pub feedback_path: Option<String>,

    /// Name recorded with every feedback entry
    #[arg(long)]
    pub user_name: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        // Start with the built-in defaults so a config file is optional
        let mut config_builder = Config::builder()
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", i64::from(defaults.web.port))?
            .set_default("summarizer.base_url", defaults.summarizer.base_url)?
            .set_default("summarizer.path", defaults.summarizer.path)?
            .set_default("summarizer.timeout_secs", defaults.summarizer.timeout_secs as i64)?
            .set_default("feedback.path", defaults.feedback.path)?
            .set_default("feedback.user_name", defaults.feedback.user_name)?
            .set_default(
                "session.default_dialect",
                defaults.session.default_dialect.as_str(),
            )?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/nl-chat/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // Build the config
        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(url) = &args.summarizer_url {
            config.summarizer.base_url = url.clone();
        }
        if let Some(path) = &args.feedback_path {
            config.feedback.path = path.clone();
        }
        if let Some(user_name) = &args.user_name {
            config.feedback.user_name = user_name.clone();
        }

        Ok(config)
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            summarizer: SummarizerConfig {
                base_url: "http://localhost:8000".to_string(),
                path: "/api/analysis/summarize".to_string(),
                timeout_secs: 60,
            },
            feedback: FeedbackConfig {
                path: "data/feedback.jsonl".to_string(),
                user_name: "RD".to_string(),
            },
            session: SessionConfig {
                default_dialect: Dialect::Sqlite,
            },
        }
    }
}
