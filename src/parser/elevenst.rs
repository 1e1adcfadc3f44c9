// 11st Open API XML parsing
use crate::model::{Listing, ParserError};
use crate::parser::Parser;
use crate::utils::{normalize_storefront_rating, now_iso, parse_count, parse_float, parse_int};
use quick_xml::Reader;
use quick_xml::events::Event;

pub const SOURCE: &str = "11st";

#[derive(Default)]
struct ProductFields {
    name: String,
    url: String,
    price: String,
    rating: String,
    reviews: String,
    image: String,
}

impl ProductFields {
    fn field_mut(&mut self, tag: &str) -> Option<&mut String> {
        match tag {
            "ProductName" => Some(&mut self.name),
            "DetailPageUrl" => Some(&mut self.url),
            "SalePrice" => Some(&mut self.price),
            "Rating" => Some(&mut self.rating),
            "ReviewCount" => Some(&mut self.reviews),
            "ProductImage" => Some(&mut self.image),
            _ => None,
        }
    }

    fn into_listing(self, fetched_at: &str) -> Option<Listing> {
        let title = self.name.trim();
        if title.is_empty() {
            return None;
        }
        let image = Some(self.image.trim().to_string());
        Some(
            Listing::new(SOURCE, title, self.url.trim(), fetched_at)
                .with_price(parse_int(&self.price))
                .with_rating(normalize_storefront_rating(parse_float(&self.rating)))
                .with_review_count(parse_count(&self.reviews))
                .with_image(image),
        )
    }
}

#[derive(Debug, Default)]
pub struct ElevenstParser;

impl Parser for ElevenstParser {
    fn parse(&self, xml: &str) -> Result<Vec<Listing>, ParserError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let fetched_at = now_iso();

        let mut offers = Vec::new();
        let mut current: Option<ProductFields> = None;
        let mut tag = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if tag == "Product" {
                        current = Some(ProductFields::default());
                    }
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ParserError::XmlParseError(e.to_string()))?;
                    if let Some(field) = current.as_mut().and_then(|p| p.field_mut(&tag)) {
                        field.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).to_string();
                    if let Some(field) = current.as_mut().and_then(|p| p.field_mut(&tag)) {
                        field.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => {
                    if e.name().as_ref() == b"Product" {
                        if let Some(listing) = current.take().and_then(|p| p.into_listing(&fetched_at)) {
                            offers.push(listing);
                        }
                    }
                    tag.clear();
                }
                Ok(_) => {}
                Err(e) => return Err(ParserError::XmlParseError(e.to_string())),
            }
        }

        Ok(offers)
    }
}
