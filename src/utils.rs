// Utility functions
use chrono::Local;
use rand::Rng;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logger(verbose: bool) {
    let default = if verbose {
        "offer_scout=debug,info"
    } else {
        "offer_scout=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Current local time as an ISO-8601 string.
pub fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Random request identifier in the 8-4-4-4-12 hex layout.
pub fn generate_request_id() -> String {
    let v: u128 = rand::rng().random();
    let hex = format!("{:032x}", v);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Maps a rating from a `max_rating` scale onto 0-5, clamped and rounded to two decimals.
pub fn normalize_rating(rating: Option<f64>, max_rating: f64) -> Option<f64> {
    let rating = rating.filter(|r| r.is_finite())?;
    let scaled = if max_rating > 0.0 && (max_rating - 5.0).abs() > f64::EPSILON {
        rating / max_rating * 5.0
    } else {
        rating
    };
    let clamped = scaled.clamp(0.0, 5.0);
    Some((clamped * 100.0).round() / 100.0)
}

/// Storefront ratings above 5 are on a 0-100 scale.
pub fn normalize_storefront_rating(rating: Option<f64>) -> Option<f64> {
    match rating {
        Some(r) if r > 5.0 => normalize_rating(Some(r), 100.0),
        other => normalize_rating(other, 5.0),
    }
}

fn strip_number_noise(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Lenient integer parse: "4,500원" -> 4500, "12.9" -> 12. Anything else -> None.
pub fn parse_int(text: &str) -> Option<i64> {
    parse_float(text).map(|v| v.trunc() as i64)
}

/// Lenient float parse ignoring separators, currency and whitespace.
pub fn parse_float(text: &str) -> Option<f64> {
    let cleaned = strip_number_noise(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Keeps only the digits of `text`: "(1,234건)" -> 1234.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
