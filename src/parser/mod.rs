// Storefront payload parsers: raw HTML / XML / JSON into listings.

pub mod danawa;
pub mod elevenst;
pub mod serpapi;

use crate::model::{Listing, ParserError};
use regex::Regex;
use std::sync::LazyLock;

pub use danawa::{DanawaDetail, DanawaParser};
pub use elevenst::ElevenstParser;
pub use serpapi::SerpApiParser;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<Vec<Listing>, ParserError>;
}

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern"));

/// First decimal number in `text`: "4.8점 (5점 만점)" -> 4.8.
pub(crate) fn first_number(text: &str) -> Option<f64> {
    NUMBER.find(text).and_then(|m| m.as_str().parse().ok())
}
