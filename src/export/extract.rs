use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::error::ExportError;
use crate::model::{RawItem, line_total};
use crate::util::collapse_whitespace;

pub const CART_ROOT_SELECTOR: &str = "div.table-cart";
pub const ROW_SELECTOR: &str = "div.table-cart-row";
const TITLE_SELECTOR: &str = "h3.checkout-product--title";
const LINK_SELECTOR: &str = "h3.checkout-product--title a";
const SUBTITLE_SELECTOR: &str = "p.checkout-product--subtitle";
const DESCRIPTION_SELECTOR: &str = "p.checkout-product--description";
const QUANTITY_SELECTOR: &str = "input.checkout-product--qty";
const PRICE_SELECTOR: &str = "p.checkout-product--price.new";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowDefect {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("non-numeric {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("line total out of range for {quantity} x {unit_price}")]
    TotalOutOfRange { quantity: u32, unit_price: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub position: usize,
    pub defect: RowDefect,
}

#[derive(Debug)]
struct CartSelectors {
    cart_root: Selector,
    row: Selector,
    title: Selector,
    link: Selector,
    subtitle: Selector,
    description: Selector,
    quantity: Selector,
    price: Selector,
}

impl CartSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            cart_root: parse_selector(CART_ROOT_SELECTOR)?,
            row: parse_selector(ROW_SELECTOR)?,
            title: parse_selector(TITLE_SELECTOR)?,
            link: parse_selector(LINK_SELECTOR)?,
            subtitle: parse_selector(SUBTITLE_SELECTOR)?,
            description: parse_selector(DESCRIPTION_SELECTOR)?,
            quantity: parse_selector(QUANTITY_SELECTOR)?,
            price: parse_selector(PRICE_SELECTOR)?,
        })
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|error| anyhow!("invalid CSS selector '{raw}': {error}"))
}

pub struct CartDocument {
    html: Html,
    selectors: CartSelectors,
}

pub enum Extraction<'a> {
    Rows(CartRows<'a>),
    EmptyCart,
}

impl CartDocument {
    pub fn parse(markup: &str) -> Result<Self> {
        Ok(Self {
            html: Html::parse_document(markup),
            selectors: CartSelectors::new()?,
        })
    }

    pub fn container_count(&self) -> usize {
        self.html.select(&self.selectors.row).count()
    }

    /// Distinguishes a cart with no rows from a document that is not a cart page.
    pub fn rows(&self) -> Result<Extraction<'_>, ExportError> {
        if self.html.select(&self.selectors.row).next().is_some() {
            return Ok(Extraction::Rows(CartRows {
                containers: self.html.select(&self.selectors.row),
                selectors: &self.selectors,
                position: 0,
            }));
        }

        if self.html.select(&self.selectors.cart_root).next().is_some() {
            return Ok(Extraction::EmptyCart);
        }

        Err(ExportError::FormatMismatch {
            container: ROW_SELECTOR.to_string(),
            cart_root: CART_ROOT_SELECTOR.to_string(),
        })
    }
}

pub struct CartRows<'a> {
    containers: scraper::html::Select<'a, 'a>,
    selectors: &'a CartSelectors,
    position: usize,
}

impl Iterator for CartRows<'_> {
    type Item = Result<RawItem, MalformedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let container = self.containers.next()?;
        self.position += 1;
        let position = self.position;

        Some(
            read_row(container, self.selectors, position)
                .map_err(|defect| MalformedRow { position, defect }),
        )
    }
}

fn read_row(
    container: ElementRef<'_>,
    selectors: &CartSelectors,
    position: usize,
) -> Result<RawItem, RowDefect> {
    let title = first_text(container, &selectors.title)
        .filter(|title| !title.is_empty())
        .ok_or(RowDefect::MissingField("title"))?;

    let link = container
        .select(&selectors.link)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default();

    let subtitle = first_text(container, &selectors.subtitle).unwrap_or_default();

    let descriptions = container
        .select(&selectors.description)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    let raw_quantity = container
        .select(&selectors.quantity)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(RowDefect::MissingField("quantity"))?;
    let quantity = parse_quantity(raw_quantity).ok_or_else(|| RowDefect::InvalidNumber {
        field: "quantity",
        value: raw_quantity.to_string(),
    })?;

    let raw_price = first_text(container, &selectors.price)
        .filter(|price| !price.is_empty())
        .ok_or(RowDefect::MissingField("price"))?;
    let unit_price = parse_price(&raw_price).ok_or_else(|| RowDefect::InvalidNumber {
        field: "price",
        value: raw_price.clone(),
    })?;
    if line_total(quantity, unit_price).is_none() {
        return Err(RowDefect::TotalOutOfRange {
            quantity,
            unit_price,
        });
    }

    Ok(RawItem {
        position,
        title,
        subtitle,
        link,
        descriptions,
        quantity,
        unit_price,
    })
}

fn first_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    container.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|quantity| *quantity >= 1)
}

/// Parses marketplace prices such as `R$ 1.250,50` or `12.50` into an exact decimal.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let digits: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == ',' || *ch == '.')
        .collect();
    if !digits.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) => digits.replace(',', "."),
        (None, Some(dot)) => {
            // A lone dot followed by three digits is a thousands separator.
            let fraction_len = digits.len() - dot - 1;
            if digits.matches('.').count() > 1 || fraction_len == 3 {
                digits.replace('.', "")
            } else {
                digits
            }
        }
        (None, None) => digits,
    };

    normalized.parse::<Decimal>().ok()
}
