pub use super::value_objects::{Price, Symbol, Timestamp};
use crate::domain::errors::{GraphError, GraphResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Best price on one side of the book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub price: Price,
    #[serde(default)]
    pub size: u64,
}

impl TopOfBook {
    pub fn new(price: f64, size: u64) -> Self {
        Self {
            price: Price::from(price),
            size,
        }
    }
}

/// One streamed observation of a stock's best ask/bid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub stock: Symbol,
    #[serde(default, deserialize_with = "optional_side")]
    pub top_ask: Option<TopOfBook>,
    #[serde(default, deserialize_with = "optional_side")]
    pub top_bid: Option<TopOfBook>,
    pub timestamp: Timestamp,
}

impl QuoteRecord {
    pub fn new(
        stock: impl Into<Symbol>,
        top_ask: Option<TopOfBook>,
        top_bid: Option<TopOfBook>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            stock: stock.into(),
            top_ask,
            top_bid,
            timestamp,
        }
    }

    pub fn ask_price(&self) -> Option<Price> {
        self.top_ask.map(|side| side.price)
    }

    pub fn bid_price(&self) -> Option<Price> {
        self.top_bid.map(|side| side.price)
    }

    /// Decode one server response (a JSON array of quotes)
    pub fn batch_from_json(raw: &str) -> GraphResult<Vec<QuoteRecord>> {
        serde_json::from_str(raw).map_err(|e| GraphError::InvalidRecord(e.to_string()))
    }
}

#[derive(Deserialize)]
struct WireSide {
    price: Option<f64>,
    size: Option<u64>,
}

/// `null`, `{}` and price-less objects all mean "no quote on this side"
fn optional_side<'de, D>(deserializer: D) -> Result<Option<TopOfBook>, D::Error>
where
    D: Deserializer<'de>,
{
    let side = Option::<WireSide>::deserialize(deserializer)?;
    Ok(side.and_then(|side| {
        side.price.map(|price| TopOfBook::new(price, side.size.unwrap_or_default()))
    }))
}
