//! Gatekeeper API server binary.

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use gatekeeper_api::config::ApiConfig;
use gatekeeper_api::{AppState, services};

/// CLI arguments for the Gatekeeper server.
#[derive(Parser, Debug)]
#[command(name = "gatekeeper_server", about = "Gatekeeper RBAC API server")]
struct Args {
    /// Port to listen on (overrides `BIND_ADDR`).
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/gatekeeper"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a superadmin user and exit.
    CreateAdmin {
        /// Admin email.
        #[arg(long, env = "ADMIN_MAIL")]
        email: String,

        /// Admin password.
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,gatekeeper_api=debug,gatekeeper_core=debug"
                    .parse()
                    .unwrap()
            }),
        )
        .init();

    let args = Args::parse();

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    gatekeeper_api::migrate(&pool).await?;

    if let Some(Command::CreateAdmin { email, password }) = args.command {
        let user = services::auth::create_admin(&pool, &email, &password).await?;
        info!(email = %user.email, "created admin user");
        return Ok(());
    }

    let mut config = ApiConfig::from_env();
    config.database_url = args.database_url;
    if let Some(port) = args.port {
        config.bind_addr = format!("127.0.0.1:{port}");
    }
    let signing = config.signing();

    let state = AppState {
        pool,
        config: config.clone(),
        signing,
    };

    let app = gatekeeper_api::router(state)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "gatekeeper listening");

    axum::serve(listener, app).await?;

    Ok(())
}
