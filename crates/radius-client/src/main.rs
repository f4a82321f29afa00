use clap::Parser;
use radius_client::{Authenticator, AuthenticatorConfig, ClientError};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_ACCEPTED: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_ERROR: i32 = 2;

/// Authenticate a user against a RADIUS server with PAP (RFC 2865)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius_auth")]
struct Cli {
    /// User to authenticate
    #[arg(value_name = "USERNAME", required_unless_present = "print_example_config")]
    username: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RADIUS server host name or address
    #[arg(short, long)]
    server: Option<String>,

    /// RADIUS server authentication port
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared secret
    #[arg(long, env = "RADIUS_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// User password
    #[arg(long, env = "RADIUS_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    /// Number of transmissions before giving up
    #[arg(short, long)]
    retries: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(short, long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// NAS-Identifier to include in the request
    #[arg(short, long)]
    nas_id: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_example_config: bool,
}

impl Cli {
    /// Start from the config file (if any) and apply command line overrides
    fn build_config(&self) -> Result<AuthenticatorConfig, ClientError> {
        let mut config = match &self.config {
            Some(path) => AuthenticatorConfig::from_file(path)?,
            None => AuthenticatorConfig::default(),
        };

        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(secret) = &self.secret {
            config.secret = secret.clone();
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(nas_id) = &self.nas_id {
            config.nas_identifier = Some(nas_id.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.print_example_config {
        match serde_json::to_string_pretty(&AuthenticatorConfig::example()) {
            Ok(json) => {
                println!("{}", json);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error rendering example config: {}", e);
                process::exit(EXIT_ERROR);
            }
        }
    }

    let config = match cli.build_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    init_tracing(config.log_level.as_deref().unwrap_or("info"));

    let username = cli.username.as_deref().unwrap_or_default();
    info!(
        server = %config.server,
        port = config.port,
        retries = config.retries,
        timeout = ?config.timeout(),
        "Authenticating {}",
        username
    );

    let authenticator = match Authenticator::new(config) {
        Ok(auth) => auth,
        Err(e) => {
            error!("Failed to create authenticator: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    match authenticator
        .authenticate(username, &cli.password, None)
        .await
    {
        Ok(true) => {
            println!("Access-Accept");
            process::exit(EXIT_ACCEPTED);
        }
        Ok(false) => {
            println!("Access-Reject");
            process::exit(EXIT_REJECTED);
        }
        Err(e) => {
            error!("Authentication error: {}", e);
            process::exit(EXIT_ERROR);
        }
    }
}
