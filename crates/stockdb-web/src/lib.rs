pub mod api;

use actix_web::{middleware::Logger, web, App, HttpServer};
use stockdb_warehouse::RecordStore;
use tracing::info;

/// Register every route; shared by [`serve`] and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api::stock::stocks)
        .service(api::docs::openapi_json);
}

/// Serve `store` until the server is stopped.
pub async fn serve(store: RecordStore, host: &str, port: u16) -> std::io::Result<()> {
    let store = web::Data::new(store);

    info!("serving quotes on http://{host}:{port}/stocks");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
