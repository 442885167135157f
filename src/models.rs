//! Data Model
//!
//! Typed shapes for rows coming back from the backend. Everything crossing
//! the wire is deserialized into these; a shape mismatch surfaces as a
//! decode error instead of being trusted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 구분 (entry kind). Closed set; the wire values are the Korean labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// 외주계약
    #[serde(rename = "외주계약")]
    Contract,
    /// 외주입찰
    #[serde(rename = "외주입찰")]
    Tender,
    /// 견적조건
    #[serde(rename = "견적조건")]
    QuotationTerms,
    /// 내역검토
    #[serde(rename = "내역검토")]
    LineItemReview,
    /// 품의/보고
    #[serde(rename = "품의/보고")]
    Approval,
    /// 기타공지
    #[serde(rename = "기타공지")]
    OtherNotice,
}

impl ItemType {
    pub const ALL: [ItemType; 6] = [
        ItemType::Contract,
        ItemType::Tender,
        ItemType::QuotationTerms,
        ItemType::LineItemReview,
        ItemType::Approval,
        ItemType::OtherNotice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Contract => "외주계약",
            ItemType::Tender => "외주입찰",
            ItemType::QuotationTerms => "견적조건",
            ItemType::LineItemReview => "내역검토",
            ItemType::Approval => "품의/보고",
            ItemType::OtherNotice => "기타공지",
        }
    }

    pub fn from_label(label: &str) -> Option<ItemType> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ItemType::Contract => "📋",
            ItemType::Tender => "🏗️",
            ItemType::QuotationTerms => "💰",
            ItemType::LineItemReview => "🔍",
            ItemType::Approval => "📄",
            ItemType::OtherNotice => "📢",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ItemType::Contract => "type-contract",
            ItemType::Tender => "type-tender",
            ItemType::QuotationTerms => "type-quote",
            ItemType::LineItemReview => "type-review",
            ItemType::Approval => "type-report",
            ItemType::OtherNotice => "type-notice",
        }
    }
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Contract
    }
}

/// Attachment metadata stored on an entry. The storage object itself is
/// reachable only through `key`. Immutable once attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub name: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// One procurement-review log record (matches the check_entries table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub team_id: String,
    pub category: String,
    pub item_type: ItemType,
    pub review_text: String,
    pub shared_at: Option<NaiveDate>,
    pub author_name: Option<String>,
    pub note: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentMeta>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_labels_round_trip() {
        for t in ItemType::ALL {
            assert_eq!(ItemType::from_label(t.label()), Some(t));
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.label()));
            assert_eq!(serde_json::from_str::<ItemType>(&json).unwrap(), t);
        }
    }

    #[test]
    fn entry_deserializes_from_backend_row() {
        let row = serde_json::json!({
            "id": 7,
            "team_id": "demo-team",
            "category": "철골공사",
            "item_type": "견적조건",
            "review_text": "구조도면 누락",
            "shared_at": "2024-05-01",
            "author_name": "이길재",
            "note": null,
            "link_url": null,
            "attachments": [{"name": "도면.png", "key": "demo-team/1-aa-_.png", "size": 1024}],
            "created_by": "gilee05@gsenc.com",
            "created_at": "2024-05-01T09:00:00+00:00",
            "updated_at": "2024-05-01T09:00:00+00:00"
        });
        let entry: Entry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.id, 7);
        assert_eq!(entry.item_type, ItemType::QuotationTerms);
        assert_eq!(entry.shared_at, Some(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert_eq!(entry.attachments[0].size, Some(1024));
    }

    #[test]
    fn attachments_default_to_empty() {
        let row = serde_json::json!({
            "id": 1,
            "team_id": "demo-team",
            "category": "공통사항",
            "item_type": "외주계약",
            "review_text": "검토",
            "shared_at": null,
            "author_name": null,
            "note": null,
            "link_url": null,
            "created_by": "a@b.c",
            "created_at": "2024-05-01T09:00:00+00:00",
            "updated_at": "2024-05-01T09:00:00+00:00"
        });
        let entry: Entry = serde_json::from_value(row).unwrap();
        assert!(entry.attachments.is_empty());
    }

    #[test]
    fn unknown_item_type_is_a_decode_error() {
        let row = serde_json::json!({
            "id": 1,
            "team_id": "demo-team",
            "category": "공통사항",
            "item_type": "없는구분",
            "review_text": "검토",
            "created_by": "a@b.c",
            "created_at": "2024-05-01T09:00:00+00:00",
            "updated_at": "2024-05-01T09:00:00+00:00"
        });
        assert!(serde_json::from_value::<Entry>(row).is_err());
    }
}
