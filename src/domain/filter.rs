use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// A caller-supplied column reference to sort by, e.g. `journalEntry.amount`.
///
/// Only identifier characters and dots are accepted since the value is
/// rendered into the query text rather than bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderBy(String);

impl OrderBy {
    pub fn new(column: &str) -> Option<Self> {
        let column = column.trim();
        let valid = !column.is_empty()
            && !column.starts_with('.')
            && !column.ends_with('.')
            && column
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        valid.then(|| Self(column.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderBy {
    type Error = String;

    fn try_from(column: String) -> Result<Self, Self::Error> {
        OrderBy::new(&column).ok_or_else(|| format!("invalid order by column: {}", column))
    }
}

impl From<OrderBy> for String {
    fn from(order_by: OrderBy) -> Self {
        order_by.0
    }
}

/// Search parameters for listing journal entries. Every field is optional;
/// absent fields add no predicate to the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryFilter {
    pub transaction_id: Option<String>,
    pub entity_type: Option<i64>,
    pub office_id: Option<i64>,
    pub gl_account_id: Option<i64>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Tri-state: when set at all, the entity type filter is dropped.
    pub only_manual_entries: Option<bool>,
    pub only_unidentified_entries: Option<bool>,
    pub order_by: Option<OrderBy>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of results together with the number of rows matching overall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_filtered_records: i64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(page_items: Vec<T>, total_filtered_records: i64) -> Self {
        Self {
            total_filtered_records,
            page_items,
        }
    }

    pub fn len(&self) -> usize {
        self.page_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_items.is_empty()
    }
}
