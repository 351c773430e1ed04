use actix_web::{middleware::ErrorHandlers, web, App, HttpServer};
use murmur::config;
use tracing_actix_web::TracingLogger;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = match config::Server::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("failed to load configuration:\n{error:?}");
            std::process::exit(1);
        }
    };

    let addr = (config.ip, config.port);
    let app = match murmur::App::new(config).await {
        Ok(app) => app,
        Err(error) => {
            eprintln!("failed to initialize the app:\n{error:?}");
            std::process::exit(1);
        }
    };

    if let Err(error) = app.run_pending_migrations().await {
        eprintln!("failed to run pending migrations:\n{error:?}");
        std::process::exit(1);
    }

    tracing::info!("listening on {}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app.clone()))
            // a post id that is not a positive integer is a page
            // that does not exist, not a client error
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                actix_web::error::ErrorNotFound(err)
            }))
            .wrap(TracingLogger::<murmur::http::util::QuieterRootSpanBuilder>::new())
            .wrap(ErrorHandlers::new().default_handler(murmur::http::util::handle_actix_web_error))
            .configure(murmur::http::controllers::configure)
    })
    .bind(addr)?
    .run()
    .await
}
