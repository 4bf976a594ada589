use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Primitive column types understood by the table engine
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Float,
    Integer,
    Boolean,
    Date,
    Datetime,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float | Self::Integer)
    }
}

/// Value Object - chart plugin used by the viewer
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum ViewMode {
    #[default]
    #[strum(serialize = "y_line")]
    #[serde(rename = "y_line")]
    YLine,
    #[strum(serialize = "x_bar")]
    #[serde(rename = "x_bar")]
    XBar,
    #[strum(serialize = "y_bar")]
    #[serde(rename = "y_bar")]
    YBar,
    #[strum(serialize = "y_area")]
    #[serde(rename = "y_area")]
    YArea,
    #[strum(serialize = "y_scatter")]
    #[serde(rename = "y_scatter")]
    YScatter,
    #[strum(serialize = "heatmap")]
    #[serde(rename = "heatmap")]
    Heatmap,
    #[strum(serialize = "datagrid")]
    #[serde(rename = "datagrid")]
    Datagrid,
}

/// Value Object - how pivoted cells collapse many rows into one value
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Aggregate {
    #[strum(serialize = "distinct count")]
    #[serde(rename = "distinct count")]
    DistinctCount,
    #[strum(serialize = "avg")]
    #[serde(rename = "avg")]
    Avg,
    #[strum(serialize = "sum")]
    #[serde(rename = "sum")]
    Sum,
    #[strum(serialize = "count")]
    #[serde(rename = "count")]
    Count,
    #[strum(serialize = "last")]
    #[serde(rename = "last")]
    Last,
    #[strum(serialize = "high")]
    #[serde(rename = "high")]
    High,
    #[strum(serialize = "low")]
    #[serde(rename = "low")]
    Low,
}

impl Aggregate {
    /// Engine default when a visible column has no explicit rule
    pub fn default_for(column_type: ColumnType) -> Self {
        if column_type.is_numeric() {
            Self::Sum
        } else {
            Self::Count
        }
    }
}

/// What the adapter does with rows it has already submitted
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Submit the whole input every cycle; the view's aggregates absorb repeats.
    #[default]
    Resubmit,
    /// Drop rows whose `(stock, timestamp)` was submitted before.
    SkipSubmitted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn engine_names_round_trip() {
        assert_eq!(ColumnType::Float.as_ref(), "float");
        assert_eq!(ViewMode::default().as_ref(), "y_line");
        assert_eq!(Aggregate::from_str("distinct count").unwrap(), Aggregate::DistinctCount);
        assert_eq!(UpdatePolicy::SkipSubmitted.to_string(), "skip_submitted");
        assert_eq!(Aggregate::default_for(ColumnType::Date), Aggregate::Count);
    }
}
