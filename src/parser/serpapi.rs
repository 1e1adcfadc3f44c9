// SerpApi (Naver Shopping engine) JSON parsing
use crate::model::{Listing, ParserError};
use crate::parser::Parser;
use crate::utils::{normalize_storefront_rating, now_iso, parse_float};
use serde::Deserialize;
use serde_json::Value;

pub const SOURCE: &str = "naver_serpapi";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    shopping_results: Vec<ShoppingResult>,
}

#[derive(Debug, Deserialize)]
struct ShoppingResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    price: Option<Value>,
    rating: Option<Value>,
    reviews: Option<Value>,
    thumbnail: Option<String>,
}

// SerpApi mixes numbers and formatted strings ("4,500원") for the same field.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float(s),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct SerpApiParser;

impl Parser for SerpApiParser {
    fn parse(&self, body: &str) -> Result<Vec<Listing>, ParserError> {
        let response: SerpApiResponse = serde_json::from_str(body)?;
        let fetched_at = now_iso();

        Ok(response
            .shopping_results
            .into_iter()
            .filter(|item| !item.title.trim().is_empty())
            .map(|item| {
                Listing::new(SOURCE, item.title.trim(), item.link, fetched_at.as_str())
                    .with_price(number(item.price.as_ref()).map(|p| p.trunc() as i64))
                    .with_rating(normalize_storefront_rating(number(item.rating.as_ref())))
                    .with_review_count(
                        number(item.reviews.as_ref())
                            .filter(|r| *r >= 0.0)
                            .map(|r| r as u64),
                    )
                    .with_image(item.thumbnail)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_field_types() {
        let body = serde_json::json!({
            "shopping_results": [
                {
                    "title": "농심 신라면 5팩",
                    "link": "https://shopping.naver.com/123",
                    "price": "4,500원",
                    "rating": 4.8,
                    "reviews": 2345,
                    "thumbnail": "https://shop-phinf.naver.net/image.jpg"
                },
                { "title": "", "link": "https://shopping.naver.com/empty" },
                { "title": "농심 신라면 컵", "price": 1200, "reviews": "1,024" }
            ]
        })
        .to_string();

        let offers = SerpApiParser.parse(&body).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].source, "naver_serpapi");
        assert_eq!(offers[0].price, Some(4500));
        assert_eq!(offers[0].rating, Some(4.8));
        assert_eq!(offers[0].review_count, Some(2345));
        assert!(offers[0].image_url.is_some());

        assert_eq!(offers[1].price, Some(1200));
        assert_eq!(offers[1].review_count, Some(1024));
        assert_eq!(offers[1].url, "");
    }

    #[test]
    fn missing_results_is_empty() {
        assert!(SerpApiParser.parse("{}").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            SerpApiParser.parse("<html>"),
            Err(ParserError::JsonParseError(_))
        ));
    }
}
