// Danawa search and product-detail HTML parsing
use crate::model::{Listing, ParserError};
use crate::parser::{Parser, first_number};
use crate::utils::{normalize_storefront_rating, now_iso, parse_count};
use scraper::{ElementRef, Html, Selector};

pub const SOURCE: &str = "danawa";
const PRODUCT_HOST: &str = "https://prod.danawa.com";

// Danawa has shipped several layouts; each list is tried in order.
const ITEM_SELECTORS: &[&str] = &[
    ".product_list .prod_item",
    ".main_prodlist .prod_item",
    "li.prod_item",
    ".prod_main_info",
];
const TITLE_SELECTORS: &[&str] = &[".prod_name a", ".prod_tit a", "a.prod_name", "p.prod_name a"];
const PRICE_SELECTORS: &[&str] = &[
    ".price_sect strong",
    ".prod_pricelist .price_sect em",
    ".lowest_price em",
    "p.price_sect strong",
    ".price em",
];
const RATING_SELECTORS: &[&str] = &[".star_graph .graph_value", ".point_num", ".star_score em"];
const REVIEW_SELECTORS: &[&str] = &[
    ".cnt_opinion a",
    ".danawa_review_num",
    ".cmt_num",
    "a[name=\"productOpinion\"]",
    ".txt_cnt",
];
const IMAGE_SELECTORS: &[&str] = &[".thumb_image img", ".prod_img img", "img.thumb", ".thumb img"];

const DETAIL_RATING_SELECTORS: &[&str] = &[
    ".star_graph .graph_value",
    ".point_num",
    ".star_score em",
    ".satisfaction_grade .grade_val",
    ".danawa_score .score_val",
    "[class*=\"rating\"] [class*=\"value\"]",
    "[class*=\"score\"] em",
];
const DETAIL_REVIEW_SELECTORS: &[&str] = &[
    ".cnt_opinion a",
    ".danawa_review_num",
    ".cmt_num",
    ".review_cnt",
    "[class*=\"review\"] [class*=\"count\"]",
    "[class*=\"opinion\"] [class*=\"cnt\"]",
    ".user_review_wrap .num",
    "a[href*=\"opinion\"] span",
    "[data-tab-name=\"opinion\"] .cnt",
    ".tab_item[data-tab=\"opinion\"] .num",
];

fn compile(list: &[&str]) -> Result<Vec<Selector>, ParserError> {
    list.iter()
        .map(|css| Selector::parse(css).map_err(|e| ParserError::HtmlParseError(e.to_string())))
        .collect()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tries each selector in order and returns the first value `extract` accepts.
fn first_value<T>(
    scope: ElementRef<'_>,
    selectors: &[Selector],
    extract: impl Fn(ElementRef<'_>) -> Option<T>,
) -> Option<T> {
    selectors
        .iter()
        .flat_map(|s| scope.select(s).next())
        .find_map(extract)
}

fn absolutize(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else if url.is_empty() || url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}", PRODUCT_HOST, url)
    }
}

pub struct DanawaParser {
    items: Vec<Selector>,
    title: Vec<Selector>,
    price: Vec<Selector>,
    rating: Vec<Selector>,
    reviews: Vec<Selector>,
    image: Vec<Selector>,
}

impl DanawaParser {
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self {
            items: compile(ITEM_SELECTORS)?,
            title: compile(TITLE_SELECTORS)?,
            price: compile(PRICE_SELECTORS)?,
            rating: compile(RATING_SELECTORS)?,
            reviews: compile(REVIEW_SELECTORS)?,
            image: compile(IMAGE_SELECTORS)?,
        })
    }

    fn parse_item(&self, item: ElementRef<'_>, fetched_at: &str) -> Option<Listing> {
        let title_el = self.title.iter().find_map(|s| item.select(s).next())?;
        let title = text_of(title_el);
        if title.is_empty() {
            return None;
        }
        let url = absolutize(title_el.value().attr("href").unwrap_or(""));

        let price = first_value(item, &self.price, |el| {
            parse_count(&text_of(el)).filter(|p| *p > 0).map(|p| p as i64)
        });
        let rating = first_value(item, &self.rating, |el| {
            normalize_storefront_rating(first_number(&text_of(el))).filter(|r| *r > 0.0)
        });
        let reviews = first_value(item, &self.reviews, |el| {
            parse_count(&text_of(el)).filter(|c| *c > 0)
        });
        let image = first_value(item, &self.image, |el| {
            let v = el.value();
            v.attr("data-original")
                .or_else(|| v.attr("data-src"))
                .or_else(|| v.attr("src"))
                .filter(|s| !s.is_empty())
                .map(absolutize)
        });

        Some(
            Listing::new(SOURCE, title, url, fetched_at)
                .with_price(price)
                .with_rating(rating)
                .with_review_count(reviews)
                .with_image(image),
        )
    }
}

impl Parser for DanawaParser {
    fn parse(&self, html: &str) -> Result<Vec<Listing>, ParserError> {
        let document = Html::parse_document(html);
        let root = document.root_element();
        let fetched_at = now_iso();

        let items: Vec<ElementRef<'_>> = self
            .items
            .iter()
            .map(|sel| root.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        Ok(items
            .into_iter()
            .filter_map(|item| self.parse_item(item, &fetched_at))
            .collect())
    }
}

/// Rating and review count scraped from a product detail page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DanawaDetail {
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
}

impl DanawaDetail {
    pub fn parse(html: &str) -> Result<Self, ParserError> {
        let rating_sel = compile(DETAIL_RATING_SELECTORS)?;
        let review_sel = compile(DETAIL_REVIEW_SELECTORS)?;
        let document = Html::parse_document(html);
        let root = document.root_element();

        let rating = first_value(root, &rating_sel, |el| {
            first_number(&text_of(el)).and_then(|v| normalize_storefront_rating(Some(v)))
        });
        let review_count = first_value(root, &review_sel, |el| {
            parse_count(&text_of(el)).filter(|c| *c > 0)
        });
        Ok(Self {
            rating,
            review_count,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.review_count.is_none()
    }
}
