//! Shared List State
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The entry form,
//! the realtime subscription, and the table all work against this one store.

use std::collections::HashMap;

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::Entry;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Team entries, newest first
    pub entries: Vec<Entry>,
    /// Storage key -> temporary signed URL. Rebuilt on load, refreshed on
    /// demand; never persisted.
    pub signed_urls: HashMap<String, String>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Id-keyed merge logic
// ========================

/// Prepend a new entry. A row whose id is already present (the realtime echo
/// of a submit we already merged) replaces in place instead of duplicating.
pub fn prepend_entry(entries: &mut Vec<Entry>, entry: Entry) {
    match entries.iter_mut().find(|e| e.id == entry.id) {
        Some(existing) => *existing = entry,
        None => entries.insert(0, entry),
    }
}

/// Replace the entry with the same id; unknown ids are ignored.
pub fn replace_entry(entries: &mut Vec<Entry>, updated: Entry) {
    if let Some(existing) = entries.iter_mut().find(|e| e.id == updated.id) {
        *existing = updated;
    }
}

/// Remove the entry with the given id; unknown ids are ignored.
pub fn remove_entry(entries: &mut Vec<Entry>, id: i64) {
    entries.retain(|e| e.id != id);
}

/// All attachment storage keys across the given entries.
pub fn attachment_keys(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.attachments.iter().map(|a| a.key.clone()))
        .collect()
}

// ========================
// Store Helper Functions
// ========================

pub fn store_set_entries(store: &AppStore, entries: Vec<Entry>) {
    store.entries().set(entries);
}

pub fn store_prepend_entry(store: &AppStore, entry: Entry) {
    let binding = store.entries();
    let mut entries = binding.write();
    prepend_entry(&mut entries, entry);
}

pub fn store_replace_entry(store: &AppStore, updated: Entry) {
    let binding = store.entries();
    let mut entries = binding.write();
    replace_entry(&mut entries, updated);
}

pub fn store_remove_entry(store: &AppStore, id: i64) {
    let binding = store.entries();
    let mut entries = binding.write();
    remove_entry(&mut entries, id);
}

pub fn store_merge_signed_urls(store: &AppStore, map: HashMap<String, String>) {
    if map.is_empty() {
        return;
    }
    store.signed_urls().write().extend(map);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentMeta, ItemType};
    use chrono::Utc;

    fn sample_entry(id: i64) -> Entry {
        Entry {
            id,
            team_id: "demo-team".to_string(),
            category: "철골공사".to_string(),
            item_type: ItemType::QuotationTerms,
            review_text: "구조도면 누락".to_string(),
            shared_at: None,
            author_name: Some("이길재".to_string()),
            note: None,
            link_url: None,
            attachments: vec![AttachmentMeta {
                name: format!("file-{id}.png"),
                key: format!("demo-team/{id}-key"),
                size: Some(10),
            }],
            created_by: "gilee05@gsenc.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn prepend_puts_new_entry_first() {
        let mut entries = vec![sample_entry(1), sample_entry(2)];
        prepend_entry(&mut entries, sample_entry(3));
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, 3);
    }

    #[test]
    fn prepend_deduplicates_realtime_echo() {
        let mut entries = vec![sample_entry(3), sample_entry(1)];
        let mut echo = sample_entry(3);
        echo.note = Some("echo".to_string());
        prepend_entry(&mut entries, echo);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].note.as_deref(), Some("echo"));
    }

    #[test]
    fn replace_swaps_only_the_matching_id() {
        let mut entries = vec![sample_entry(1), sample_entry(2)];
        let mut updated = sample_entry(2);
        updated.review_text = "수정됨".to_string();
        replace_entry(&mut entries, updated);
        assert_eq!(entries[0].review_text, "구조도면 누락");
        assert_eq!(entries[1].review_text, "수정됨");
    }

    #[test]
    fn remove_deletes_exactly_the_matching_id() {
        let mut entries = vec![sample_entry(41), sample_entry(42), sample_entry(43)];
        remove_entry(&mut entries, 42);
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![41, 43]);
    }

    #[test]
    fn attachment_keys_flattens_all_entries() {
        let entries = vec![sample_entry(1), sample_entry(2)];
        assert_eq!(
            attachment_keys(&entries),
            vec!["demo-team/1-key".to_string(), "demo-team/2-key".to_string()]
        );
    }
}
