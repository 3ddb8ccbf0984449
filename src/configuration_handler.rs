use crate::configuration::Configuration;
use clap::Parser;
use std::env;
use std::time::Duration;

const DEFAULT_PORT: &str = "5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Command line arguments. Every setting falls back to the environment
/// (loaded from a `.env` file when present).
#[derive(Debug, Clone, Parser)]
#[command(about = "Doctors Portal API")]
pub struct ConfigurationHandler {
    /// Port the HTTP server listens on
    #[arg(long)]
    port: Option<String>,
    /// PostgreSQL connection URL; runs with impersistent in-memory storage when absent
    #[arg(long)]
    database_url: Option<String>,
    /// Firebase project id used to verify bearer tokens
    #[arg(long)]
    firebase_project_id: Option<String>,
    /// Stripe secret key used to create payment intents
    #[arg(long)]
    stripe_secret_key: Option<String>,
    /// Upper bound in seconds for request handling and outbound calls
    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        let mut arguments = Self::parse();
        arguments.apply_environment();
        arguments
    }

    fn apply_environment(&mut self) {
        if self.port.is_none() {
            self.port = env::var("PORT").ok();
        }
        if self.database_url.is_none() {
            self.database_url = env::var("DATABASE_URL").ok();
        }
        if self.firebase_project_id.is_none() {
            self.firebase_project_id = env::var("FIREBASE_PROJECT_ID").ok();
        }
        if self.stripe_secret_key.is_none() {
            self.stripe_secret_key = env::var("STRIPE_SECRET_KEY").ok();
        }
        if self.request_timeout_secs.is_none() {
            self.request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok());
        }
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> String {
        self.port.clone().unwrap_or_else(|| DEFAULT_PORT.into())
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn firebase_project_id(&self) -> Option<String> {
        self.firebase_project_id.clone()
    }

    fn stripe_secret_key(&self) -> Option<String> {
        self.stripe_secret_key.clone()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
