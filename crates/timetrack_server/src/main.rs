use log::{error, info};
use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;
use timetrack_core::db::{open_pool, PoolConfig};
use timetrack_core::init_logging;
use timetrack_server::{build_router, AppState, PeopleInfoClient, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            eprintln!("timetrack: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let settings = Settings::load()?;
    let _logging = init_logging(&settings.logging.level, &settings.logging.dir)?;

    let pool_config = PoolConfig {
        max_size: settings.database.pool_size.max(1),
        ..PoolConfig::default()
    };
    let pool = open_pool(&settings.database.path, &pool_config)?;

    let people_api = match &settings.people_api.url {
        Some(url) => Some(PeopleInfoClient::new(
            url.clone(),
            Duration::from_secs(settings.people_api.timeout_secs),
        )?),
        None => {
            info!("event=people_api module=server status=disabled");
            None
        }
    };

    let app = build_router(AppState::new(pool, people_api));
    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("event=server_start module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
