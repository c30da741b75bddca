use actix_web::{get, HttpResponse, Responder};
use stockdb_warehouse::QuoteRecord;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(crate::api::stock::stocks), components(schemas(QuoteRecord)))]
pub struct ApiDoc;

/// OpenAPI document for every route above.
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
