use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::formats::BookRecord;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector("p.price_color"));
static STAR_RATING: LazyLock<Selector> = LazyLock::new(|| selector("p.star-rating"));
static IN_STOCK: LazyLock<Selector> = LazyLock::new(|| selector("p.instock.availability"));
static DESCRIPTION_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| selector("div#product_description"));
static PRODUCT_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("table.table.table-striped"));
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static LISTING_ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("article.product_pod"));
static ENTRY_LINK: LazyLock<Selector> = LazyLock::new(|| selector("h3 a"));

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

const RATING_TOKENS: [(&str, u8); 5] = [
    ("One", 1),
    ("Two", 2),
    ("Three", 3),
    ("Four", 4),
    ("Five", 5),
];

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css:?}: {err}"))
}

/// One `article.product_pod` entry of a catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    Link(String),
    /// The entry has no `h3 a[href]`.
    MissingLink,
}

/// Parses a catalog page. An empty result means the listing has no books.
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    document
        .select(&LISTING_ENTRY)
        .map(|entry| {
            entry
                .select(&ENTRY_LINK)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(|href| ListingEntry::Link(href.to_owned()))
                .unwrap_or(ListingEntry::MissingLink)
        })
        .collect()
}

pub fn parse_book(html: &str) -> Result<BookRecord, ParseError> {
    let document = Html::parse_document(html);

    let title = required_text(&document, &TITLE, "h1")?;
    let price = required_text(&document, &PRICE, "p.price_color")?;

    let rating_element = document
        .select(&STAR_RATING)
        .next()
        .ok_or(ParseError::MissingElement("p.star-rating"))?;
    let rating = parse_rating(rating_element.value().classes());

    let stock = parse_stock(&required_text(&document, &IN_STOCK, "p.instock.availability")?);
    let description = parse_description(&document);

    let mut info = parse_product_info(&document)?;
    let mut take = |header: &str| info.remove(header).unwrap_or_default();

    let upc = take("UPC");
    let product_type = take("Product Type");
    let price_excl_tax = take("Price (excl. tax)");
    let price_incl_tax = take("Price (incl. tax)");
    let tax = take("Tax");
    let availability = take("Availability");
    let num_reviews = match info.remove("Number of reviews") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidReviewCount(raw))?,
        None => 0,
    };

    Ok(BookRecord {
        title,
        price,
        rating,
        stock,
        description,
        upc,
        product_type,
        price_excl_tax,
        price_incl_tax,
        tax,
        availability,
        num_reviews,
    })
}

/// Maps the first rating word among `classes` to 1..=5; 0 when none matches.
pub fn parse_rating<'a>(classes: impl IntoIterator<Item = &'a str>) -> u8 {
    classes
        .into_iter()
        .find_map(|class| {
            RATING_TOKENS
                .iter()
                .find(|(token, _)| *token == class)
                .map(|(_, value)| *value)
        })
        .unwrap_or(0)
}

/// First run of ASCII digits in the availability text; 0 when there is none.
/// Counts too large for `u64` saturate.
pub fn parse_stock(text: &str) -> u64 {
    DIGITS
        .find(text)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Text of the first `p` sibling after the description anchor, or empty.
pub fn parse_description(document: &Html) -> String {
    let Some(anchor) = document.select(&DESCRIPTION_ANCHOR).next() else {
        return String::new();
    };

    anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "p")
        .map(|paragraph| element_text(&paragraph))
        .unwrap_or_default()
}

/// Header → value pairs from the product information table.
pub fn parse_product_info(document: &Html) -> Result<HashMap<String, String>, ParseError> {
    let mut info = HashMap::new();
    let Some(table) = document.select(&PRODUCT_TABLE).next() else {
        return Ok(info);
    };

    for row in table.select(&TABLE_ROW) {
        let header = row
            .select(&HEADER_CELL)
            .next()
            .ok_or(ParseError::IncompleteRow("th"))?;
        let value = row
            .select(&DATA_CELL)
            .next()
            .ok_or(ParseError::IncompleteRow("td"))?;
        info.insert(element_text(&header), element_text(&value));
    }

    Ok(info)
}

fn required_text(
    document: &Html,
    selector: &Selector,
    name: &'static str,
) -> Result<String, ParseError> {
    document
        .select(selector)
        .next()
        .map(|element| element_text(&element))
        .ok_or(ParseError::MissingElement(name))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}
