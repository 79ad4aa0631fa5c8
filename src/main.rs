use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tenant_session::{
    AuthConfig, AuthError, AuthenticationService, Credentials, FileCredentialStore, HttpTransport, OperationResult,
    TracingNavigator,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{operation} failed: {message}")]
    Failed { operation: &'static str, message: String },
    #[error("no stored session; run `login` first")]
    NoSession,
}

#[derive(Parser, Debug)]
#[command(name = "session-cli", about = "Tenant session login/refresh client")]
struct Cli {
    #[arg(long, env = "SESSION_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SESSION_STORE_PATH", default_value = ".session.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token pair.
    Login {
        #[arg(long, env = "SESSION_TENANT", default_value = "root")]
        tenant: String,
        #[arg(long)]
        identifier: String,
        #[arg(long, env = "SESSION_SECRET")]
        secret: String,
    },
    /// Exchange the stored refresh token for a new pair.
    Refresh,
    /// Clear the stored session.
    Logout,
    /// Print the stored session.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AuthConfig::from_env()?;
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_base_url(url)?;
    }

    let transport = Arc::new(HttpTransport::new(&config)?);
    let store = Arc::new(FileCredentialStore::new(cli.store));
    let service = AuthenticationService::new(&config, transport, store, Arc::new(TracingNavigator));
    service.session().restore().await;

    match cli.command {
        Command::Login { tenant, identifier, secret } => {
            let credentials = Credentials::new(tenant, identifier, secret);
            check("login", service.login(&credentials).await)?;
            print_status(&service);
        }
        Command::Refresh => {
            if !service.session().current_state().is_authenticated {
                return Err(CliError::NoSession);
            }
            check("refresh", service.refresh_current().await)?;
            print_status(&service);
        }
        Command::Logout => {
            check("logout", service.logout().await)?;
            println!("logged out");
        }
        Command::Status => print_status(&service),
    }

    Ok(())
}

fn check<T>(operation: &'static str, result: OperationResult<T>) -> Result<(), CliError> {
    result
        .into_result()
        .map(|_| ())
        .map_err(|message| CliError::Failed { operation, message })
}

fn print_status(service: &AuthenticationService) {
    let state = service.session().current_state();
    if !state.is_authenticated {
        println!("not authenticated");
        return;
    }
    println!("tenant: {}", state.tenant);
    match state.expires_at() {
        Some(exp) => println!("access token expires at: {exp}"),
        None => println!("access token expiry: unknown"),
    }
    for (claim, value) in &state.claims {
        println!("  {claim}: {value}");
    }
}
