use actix_web::{web, App, HttpServer};
use docmerge_server::config::AppConfig;
use docmerge_server::job_controller::state::{start_job_updater, JobsState};
use docmerge_server::services;
use docmerge_server::state::AppState;
use env_logger::Env;
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };
    let bind_address = config.bind_address();
    let json_limit = config.json_limit;
    info!(
        "Templates in {}, Word documents in {}",
        config.database_path.display(),
        config.storage_dir.display()
    );

    let app_state = AppState::from_config(config);

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    info!("Server running at http://{}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(app_state.clone()))
            .configure(services::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
