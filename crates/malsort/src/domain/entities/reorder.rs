use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::history::format_iso;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRow {
    pub id: i64,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub score: i64,
    pub title: String,
}

impl ReorderRow {
    pub fn update(&self) -> ListStatusUpdate {
        ListStatusUpdate {
            score: self.score,
            start_date: self.start_date,
            finish_date: self.finish_date,
        }
    }
}

/// Form body of the list status PATCH. Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListStatusUpdate {
    pub score: i64,
    #[serde(serialize_with = "serialize_iso")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "serialize_iso")]
    pub finish_date: NaiveDate,
}

fn serialize_iso<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_iso(*date))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub status: u16,
    pub body: String,
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What to do when the API rejects a list status update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateErrorPolicy {
    /// Log the response and carry on with the next row.
    #[default]
    Ignore,
    /// Stop at the first rejected update.
    Abort,
}
