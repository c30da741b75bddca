use actix_web::{get, web, HttpResponse, Responder};
use stockdb_warehouse::{QuoteRecord, RecordStore};
use tracing::trace;

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Quotes scraped since the last successful insert
///
/// ```json
/// [
///     {
///         "Company": "Apple Inc.",
///         "Price": "150.00",
///         "Change": "+1.2%",
///         "ScrapingDate": "2024-11-20T16:31:22.512Z"
///     },
///     ...
/// ]
/// ```
#[utoipa::path(
    get,
    path = "/stocks",
    responses(
        (
            status = 200, description = "Every quote currently held in memory, in the order it was scraped",
            body = [QuoteRecord], content_type = "application/json",
            example = json!([
                {
                    "Company": "Apple Inc.",
                    "Price": "150.00",
                    "Change": "+1.2%",
                    "ScrapingDate": "2024-11-20T16:31:22.512Z"
                }
            ])
        )
    )
)]
#[get("/stocks")]
pub async fn stocks(store: web::Data<RecordStore>) -> impl Responder {
    let data = store.snapshot();
    trace!("serving {} quotes", data.len());
    HttpResponse::Ok().json(data)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::header, test, web, App};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use stockdb_warehouse::{QuoteSource, RecordStore, Result, ScrapeCycle, ScrapeError};

    struct Pages(HashMap<String, String>);

    impl QuoteSource for Pages {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn page(company: &str, price: &str, change: &str) -> String {
        format!(
            r#"<div id="quote-header-info"><h1>{company}</h1>
               <fin-streamer data-field="regularMarketPrice">{price}</fin-streamer>
               <fin-streamer data-field="regularMarketChangePercent">{change}</fin-streamer></div>"#
        )
    }

    async fn get_stocks(store: RecordStore) -> (u16, Option<String>, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .configure(crate::configure),
        )
        .await;
        let response = test::call_service(&app, test::TestRequest::get().uri("/stocks").to_request()).await;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body: Value = test::read_body_json(response).await;
        (status, content_type, body)
    }

    #[actix_web::test]
    async fn empty_store_serves_an_empty_array() {
        let (status, content_type, body) = get_stocks(RecordStore::new()).await;
        assert_eq!(status, 200);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn serves_what_the_cycle_scraped() {
        let pages = Pages(HashMap::from([
            (
                "https://finance.yahoo.com/quote/AAPL/".to_string(),
                page("Apple Inc.", "150.00", "+1.2%"),
            ),
            (
                "https://finance.yahoo.com/quote/MSFT/".to_string(),
                page("Microsoft Corp.", "300.00", "-0.5%"),
            ),
        ]));
        let store = RecordStore::new();
        ScrapeCycle::new(pages, store.clone(), vec!["AAPL".into(), "MSFT".into()])
            .run()
            .await;

        let (status, _, body) = get_stocks(store).await;
        assert_eq!(status, 200);

        let quotes = body.as_array().unwrap();
        assert_eq!(quotes.len(), 2);
        let fields: Vec<Value> = quotes
            .iter()
            .map(|q| json!({ "Company": q["Company"], "Price": q["Price"], "Change": q["Change"] }))
            .collect();
        assert_eq!(
            Value::from(fields),
            json!([
                {"Company": "Apple Inc.", "Price": "150.00", "Change": "+1.2%"},
                {"Company": "Microsoft Corp.", "Price": "300.00", "Change": "-0.5%"}
            ])
        );
        assert!(quotes.iter().all(|q| q["ScrapingDate"].is_string()));
    }

    #[actix_web::test]
    async fn reflects_a_cleared_store() {
        let store = RecordStore::new();
        store.append(stockdb_warehouse::QuoteRecord::new(
            "Apple Inc.".into(),
            "150.00".into(),
            "+1.2%".into(),
        ));
        store.drain_and_clear();

        let (_, _, body) = get_stocks(store).await;
        assert_eq!(body, json!([]));
    }
}
