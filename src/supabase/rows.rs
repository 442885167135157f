//! Entry Rows API
//!
//! PostgREST bindings for the shared check_entries table: select by team,
//! insert, update by id. Delete is an admin-console affair and never
//! called from here.

use chrono::NaiveDate;
use serde::Serialize;

use super::{expect_json, http, ApiError, Supabase};
use crate::models::{AttachmentMeta, Entry, ItemType};

const TABLE: &str = "check_entries";

// ========================
// Payloads
// ========================

#[derive(Debug, Clone, Serialize)]
pub struct NewEntry {
    pub team_id: String,
    pub category: String,
    pub item_type: ItemType,
    pub review_text: String,
    pub shared_at: Option<NaiveDate>,
    pub author_name: Option<String>,
    pub note: Option<String>,
    pub link_url: Option<String>,
    pub attachments: Vec<AttachmentMeta>,
    pub created_by: String,
}

/// Update payload; every field is written, attachments included.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPatch {
    pub team_id: String,
    pub category: String,
    pub item_type: ItemType,
    pub review_text: String,
    pub shared_at: Option<NaiveDate>,
    pub author_name: Option<String>,
    pub note: Option<String>,
    pub link_url: Option<String>,
    pub attachments: Vec<AttachmentMeta>,
}

// ========================
// Row Operations
// ========================

impl Supabase {
    fn table_url(&self) -> String {
        format!("{}/{}", self.config.rest_url(), TABLE)
    }

    /// All of the team's entries, newest first.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, ApiError> {
        let team_filter = format!("eq.{}", self.config.team_id);
        let response = self
            .authed(http().get(self.table_url()))
            .query(&[
                ("select", "*"),
                ("team_id", team_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        expect_json(response).await
    }

    /// Insert and return the canonical stored row.
    pub async fn insert_entry(&self, entry: &NewEntry) -> Result<Entry, ApiError> {
        let response = self
            .authed(http().post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(entry)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let mut rows: Vec<Entry> = expect_json(response).await?;
        rows.pop()
            .ok_or_else(|| ApiError::Decode("insert returned no row".to_string()))
    }

    /// Update by id and return the canonical stored row.
    pub async fn update_entry(&self, id: i64, patch: &EntryPatch) -> Result<Entry, ApiError> {
        let response = self
            .authed(http().patch(self.table_url()))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let mut rows: Vec<Entry> = expect_json(response).await?;
        rows.pop()
            .ok_or_else(|| ApiError::Decode(format!("update matched no row for id {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_serializes_nulls_for_empty_optionals() {
        let payload = NewEntry {
            team_id: "demo-team".to_string(),
            category: "철골공사".to_string(),
            item_type: ItemType::QuotationTerms,
            review_text: "구조도면 누락".to_string(),
            shared_at: None,
            author_name: Some("이길재".to_string()),
            note: None,
            link_url: None,
            attachments: Vec::new(),
            created_by: "gilee05@gsenc.com".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["item_type"], "견적조건");
        assert!(json["shared_at"].is_null());
        assert!(json["note"].is_null());
        assert_eq!(json["attachments"], serde_json::json!([]));
    }
}
