use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One observed snapshot of a ticker's quote page.
///
/// Values are kept as the page printed them; nothing is parsed to a number.
/// ```json
/// {
///     "Company": "Apple Inc. (AAPL)",
///     "Price": "150.00",
///     "Change": "(+1.20%)",
///     "ScrapingDate": "2024-11-20T16:31:22.512Z"
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct QuoteRecord {
    pub company: String,
    pub price: String,
    pub change: String,
    #[serde(rename = "ScrapingDate")]
    pub scraped_at: DateTime<Utc>,
}

impl QuoteRecord {
    /// Stamp a new record with the current time.
    pub fn new(company: String, price: String, change: String) -> Self {
        Self {
            company,
            price,
            change,
            scraped_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn serializes_with_page_field_names() {
        let record = QuoteRecord {
            company: "Apple Inc.".to_string(),
            price: "150.00".to_string(),
            change: "+1.2%".to_string(),
            scraped_at: Utc.with_ymd_and_hms(2024, 11, 20, 16, 31, 22).unwrap(),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "Company": "Apple Inc.",
                "Price": "150.00",
                "Change": "+1.2%",
                "ScrapingDate": "2024-11-20T16:31:22Z"
            })
        );
    }

    #[test]
    fn new_stamps_the_creation_time() {
        let before = Utc::now();
        let record = QuoteRecord::new(String::new(), String::new(), String::new());
        assert!(record.scraped_at >= before && record.scraped_at <= Utc::now());
    }
}
