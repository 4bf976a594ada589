use super::value_objects::{Aggregate, ColumnType, ViewMode};
use crate::domain::errors::{GraphError, GraphResult};
use crate::domain::market_data::Timestamp;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const STOCK: &str = "stock";
pub const TOP_ASK_PRICE: &str = "top_ask_price";
pub const TOP_BID_PRICE: &str = "top_bid_price";
pub const TIMESTAMP: &str = "timestamp";

/// Ordered column layout of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut schema = Self {
            columns: Vec::new(),
        };
        for (name, ty) in columns {
            let name = name.into();
            if schema.column_type(&name).is_some() {
                return Err(GraphError::Engine(format!("duplicate column `{}`", name)));
            }
            schema.columns.push((name, ty));
        }
        Ok(schema)
    }

    /// The four-column layout every display table is created with
    pub fn display() -> Self {
        Self {
            columns: vec![
                (STOCK.to_string(), ColumnType::String),
                (TOP_ASK_PRICE.to_string(), ColumnType::Float),
                (TOP_BID_PRICE.to_string(), ColumnType::Float),
                (TIMESTAMP.to_string(), ColumnType::Date),
            ],
        }
    }

    pub fn columns(&self) -> &[(String, ColumnType)] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.iter().find(|(column, _)| column == name).map(|(_, ty)| *ty)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, ty) in &self.columns {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}

/// Flattened quote as stored in the display table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub stock: String,
    pub top_ask_price: f64,
    pub top_bid_price: f64,
    pub timestamp: Timestamp,
}

/// Identity used to recognise a row submitted earlier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub stock: String,
    pub timestamp: Timestamp,
}

impl DisplayRow {
    pub fn key(&self) -> RowKey {
        RowKey {
            stock: self.stock.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn cell(&self, column: &str) -> Option<CellValue> {
        match column {
            STOCK => Some(CellValue::Text(self.stock.clone())),
            TOP_ASK_PRICE => Some(CellValue::Float(self.top_ask_price)),
            TOP_BID_PRICE => Some(CellValue::Float(self.top_bid_price)),
            TIMESTAMP => Some(CellValue::Date(self.timestamp)),
            _ => None,
        }
    }
}

/// A single typed value read out of a table row
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Float(f64),
    Date(Timestamp),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(_) => None,
            Self::Float(v) => Some(*v),
            Self::Date(ts) => Some(ts.as_f64()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Text(_) => 0,
            Self::Float(_) => 1,
            Self::Date(_) => 2,
        }
    }
}

// Floats compare by total order so cells can key maps and sets.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Text(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Date(v) => v.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.write_str(v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v),
        }
    }
}

/// Per-column aggregate rules, kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregates(Vec<(String, Aggregate)>);

impl Aggregates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, aggregate: Aggregate) {
        let column = column.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = aggregate,
            None => self.0.push((column, aggregate)),
        }
    }

    pub fn get(&self, column: &str) -> Option<Aggregate> {
        self.0.iter().find(|(name, _)| name == column).map(|(_, agg)| *agg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Aggregate)> {
        self.0.iter().map(|(name, agg)| (name.as_str(), *agg))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Aggregate)> for Aggregates {
    fn from_iter<I: IntoIterator<Item = (S, Aggregate)>>(iter: I) -> Self {
        let mut aggregates = Self::new();
        for (column, aggregate) in iter {
            aggregates.set(column, aggregate);
        }
        aggregates
    }
}

impl Serialize for Aggregates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, aggregate) in &self.0 {
            map.serialize_entry(name, aggregate)?;
        }
        map.end()
    }
}

struct AggregatesVisitor;

impl<'de> Visitor<'de> for AggregatesVisitor {
    type Value = Aggregates;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of column name to aggregate")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Aggregates, A::Error> {
        let mut aggregates = Aggregates::new();
        while let Some((column, aggregate)) = access.next_entry::<String, Aggregate>()? {
            aggregates.set(column, aggregate);
        }
        Ok(aggregates)
    }
}

impl<'de> Deserialize<'de> for Aggregates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AggregatesVisitor)
    }
}

pub const VIEW_ATTR: &str = "view";
pub const COLUMN_PIVOTS_ATTR: &str = "column-pivots";
pub const ROW_PIVOTS_ATTR: &str = "row-pivots";
pub const COLUMNS_ATTR: &str = "columns";
pub const AGGREGATES_ATTR: &str = "aggregates";

/// Display options pushed onto the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub view: ViewMode,
    pub column_pivots: Vec<String>,
    pub row_pivots: Vec<String>,
    pub columns: Vec<String>,
    pub aggregates: Aggregates,
}

impl Default for ViewConfig {
    /// Ask price over time, one line per stock. Repeated (stock, timestamp)
    /// pairs collapse into one point through the aggregates.
    fn default() -> Self {
        Self {
            view: ViewMode::YLine,
            column_pivots: vec![STOCK.to_string()],
            row_pivots: vec![TIMESTAMP.to_string()],
            columns: vec![TOP_ASK_PRICE.to_string()],
            aggregates: [
                (STOCK, Aggregate::DistinctCount),
                (TOP_ASK_PRICE, Aggregate::Avg),
                (TOP_BID_PRICE, Aggregate::Avg),
                (TIMESTAMP, Aggregate::DistinctCount),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl ViewConfig {
    /// Attribute name/value pairs in the order they are applied.
    /// `view` is a bare plugin name; the rest are JSON.
    pub fn attributes(&self) -> GraphResult<Vec<(&'static str, String)>> {
        Ok(vec![
            (VIEW_ATTR, self.view.as_ref().to_string()),
            (COLUMN_PIVOTS_ATTR, serde_json::to_string(&self.column_pivots)?),
            (ROW_PIVOTS_ATTR, serde_json::to_string(&self.row_pivots)?),
            (COLUMNS_ATTR, serde_json::to_string(&self.columns)?),
            (AGGREGATES_ATTR, serde_json::to_string(&self.aggregates)?),
        ])
    }

    /// Rebuild a config from surface attributes; unknown names are ignored
    /// and missing ones keep their empty value.
    pub fn from_attributes<'a, I>(attributes: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self {
            view: ViewMode::default(),
            column_pivots: Vec::new(),
            row_pivots: Vec::new(),
            columns: Vec::new(),
            aggregates: Aggregates::new(),
        };
        for (name, value) in attributes {
            match name {
                VIEW_ATTR => {
                    config.view = value
                        .parse()
                        .map_err(|_| GraphError::Surface(format!("unknown view `{}`", value)))?;
                }
                COLUMN_PIVOTS_ATTR => config.column_pivots = serde_json::from_str(value)?,
                ROW_PIVOTS_ATTR => config.row_pivots = serde_json::from_str(value)?,
                COLUMNS_ATTR => config.columns = serde_json::from_str(value)?,
                AGGREGATES_ATTR => config.aggregates = serde_json::from_str(value)?,
                _ => {}
            }
        }
        Ok(config)
    }
}
