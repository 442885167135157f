//! Entry Table Component
//!
//! Filtered projection of the entry list. Row click enters edit mode;
//! attachment links come from the signed-URL cache, with a manual refresh
//! for stale keys and a hover preview for images.

use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::MouseEvent;

use crate::context::AppContext;
use crate::models::{AttachmentMeta, Entry, ItemType};
use crate::store::{store_merge_signed_urls, use_app_store, AppStateStoreFields};
use crate::supabase::storage::SIGNED_URL_TTL_REFRESH;
use crate::supabase::Supabase;

/// Type filter passes on 전체 (None) or exact match; a non-empty query must
/// appear (case-insensitively) in one of the searchable fields.
pub fn matches_filters(entry: &Entry, type_filter: Option<ItemType>, query: &str) -> bool {
    if let Some(wanted) = type_filter {
        if entry.item_type != wanted {
            return false;
        }
    }
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        entry.category.as_str(),
        entry.item_type.label(),
        entry.review_text.as_str(),
        entry.author_name.as_deref().unwrap_or(""),
        entry.note.as_deref().unwrap_or(""),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

pub fn is_image_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

pub fn format_size(size: Option<u64>) -> String {
    let Some(size) = size else {
        return String::new();
    };
    let units = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, units[unit])
}

#[component]
pub fn EntryTable(
    query: ReadSignal<String>,
    type_filter: ReadSignal<Option<ItemType>>,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();
    let (hovered_image, set_hovered_image) = signal::<Option<String>>(None);

    let filtered = move || {
        store
            .entries()
            .get()
            .into_iter()
            .filter(|entry| matches_filters(entry, type_filter.get(), &query.get()))
            .collect::<Vec<_>>()
    };

    view! {
        <section class="entry-table-card">
            <table class="entry-table">
                <thead>
                    <tr>
                        <th>"구분"</th>
                        <th>"공종"</th>
                        <th>"검토사항"</th>
                        <th>"공유일자"</th>
                        <th>"작성/공유자"</th>
                        <th>"비고"</th>
                        <th>"Link"</th>
                        <th>"첨부"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=filtered
                        key=|entry| entry.id
                        children=move |entry| {
                            let row_entry = entry.clone();
                            let attachments = entry.attachments.clone();
                            view! {
                                <tr class="entry-row" on:click=move |_| ctx.start_edit(row_entry.clone())>
                                    <td>
                                        <span class=format!("type-icon {}", entry.item_type.css_class())>
                                            {entry.item_type.icon()}
                                        </span>
                                        <span class="type-label">{entry.item_type.label()}</span>
                                    </td>
                                    <td>{entry.category.clone()}</td>
                                    <td class="review-cell">{entry.review_text.clone()}</td>
                                    <td>{entry.shared_at.map(|d| d.to_string()).unwrap_or_default()}</td>
                                    <td>{entry.author_name.clone().unwrap_or_default()}</td>
                                    <td>{entry.note.clone().unwrap_or_default()}</td>
                                    <td>
                                        {entry.link_url.clone().map(|url| view! {
                                            <a
                                                class="link-open"
                                                href=url
                                                target="_blank"
                                                rel="noreferrer"
                                                on:click=move |ev: MouseEvent| ev.stop_propagation()
                                            >
                                                "열기"
                                            </a>
                                        })}
                                    </td>
                                    <td>
                                        {if attachments.is_empty() {
                                            view! { <span class="no-attachments">"-"</span> }.into_any()
                                        } else {
                                            view! {
                                                <ul class="attachment-list">
                                                    {attachments.into_iter().map(|attachment| view! {
                                                        <AttachmentItem
                                                            attachment=attachment
                                                            hovered_image=hovered_image
                                                            set_hovered_image=set_hovered_image
                                                        />
                                                    }).collect_view()}
                                                </ul>
                                            }.into_any()
                                        }}
                                    </td>
                                </tr>
                            }
                        }
                    />
                    <Show when=move || filtered().is_empty()>
                        <tr>
                            <td class="empty-row" colspan="8">
                                "데이터가 없어요. 하나 추가해볼까요? 😎"
                            </td>
                        </tr>
                    </Show>
                </tbody>
            </table>
        </section>
    }
}

/// One attachment link. A key without a cached signed URL renders the
/// refresh affordance instead of an error.
#[component]
fn AttachmentItem(
    attachment: AttachmentMeta,
    hovered_image: ReadSignal<Option<String>>,
    set_hovered_image: WriteSignal<Option<String>>,
) -> impl IntoView {
    let client = expect_context::<Supabase>();
    let store = use_app_store();
    let is_image = is_image_file(&attachment.name);
    let name = attachment.name.clone();
    let size_text = format_size(attachment.size);

    let key = attachment.key.clone();
    let signed_url = move || store.signed_urls().with(|map| map.get(&key).cloned());

    let refresh = {
        let key = attachment.key.clone();
        move |ev: MouseEvent| {
            ev.stop_propagation();
            let client = client.clone();
            let key = key.clone();
            spawn_local(async move {
                let map = client
                    .create_signed_urls(&[key], SIGNED_URL_TTL_REFRESH)
                    .await;
                store_merge_signed_urls(&store, map);
            });
        }
    };

    view! {
        <li class="attachment">
            {move || match signed_url() {
                Some(url) => {
                    let show_preview =
                        is_image && hovered_image.get().as_deref() == Some(url.as_str());
                    let enter_url = url.clone();
                    let preview = show_preview.then(|| {
                        let preview_url = url.clone();
                        let preview_name = name.clone();
                        view! {
                            <div class="image-preview">
                                <img src=preview_url alt=preview_name.clone() />
                                <p class="preview-name">{preview_name}</p>
                            </div>
                        }
                    });
                    view! {
                        <span class="attachment-link">
                            <a
                                href=url.clone()
                                target="_blank"
                                rel="noreferrer"
                                on:click=move |ev: MouseEvent| ev.stop_propagation()
                                on:mouseenter=move |_| {
                                    if is_image {
                                        set_hovered_image.set(Some(enter_url.clone()));
                                    }
                                }
                                on:mouseleave=move |_| set_hovered_image.set(None)
                            >
                                {is_image.then_some("🖼 ")}
                                {name.clone()}
                            </a>
                            {preview}
                        </span>
                    }.into_any()
                }
                None => view! {
                    <button type="button" class="refresh-link" on:click=refresh.clone()>
                        "링크 갱신"
                    </button>
                }.into_any(),
            }}
            <span class="attach-size">{size_text}</span>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: i64, item_type: ItemType, category: &str, review: &str) -> Entry {
        Entry {
            id,
            team_id: "demo-team".to_string(),
            category: category.to_string(),
            item_type,
            review_text: review.to_string(),
            shared_at: None,
            author_name: Some("이길재".to_string()),
            note: Some("비고란".to_string()),
            link_url: None,
            attachments: Vec::new(),
            created_by: "gilee05@gsenc.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn type_filter_and_query_must_both_match() {
        let rows = vec![
            entry(1, ItemType::QuotationTerms, "철골공사", "구조도면 누락"),
            entry(2, ItemType::QuotationTerms, "방수공사", "시방서 확인"),
            entry(3, ItemType::Contract, "철골공사", "계약서 검토"),
        ];
        let hits: Vec<i64> = rows
            .iter()
            .filter(|e| matches_filters(e, Some(ItemType::QuotationTerms), "철골"))
            .map(|e| e.id)
            .collect();
        assert_eq!(hits, vec![1]);
        for row in rows.iter().filter(|e| matches_filters(e, Some(ItemType::QuotationTerms), "")) {
            assert_eq!(row.item_type, ItemType::QuotationTerms);
        }
    }

    #[test]
    fn none_type_filter_means_all() {
        let row = entry(1, ItemType::OtherNotice, "공통사항", "공지");
        assert!(matches_filters(&row, None, ""));
    }

    #[test]
    fn query_searches_every_text_field() {
        let row = entry(1, ItemType::Approval, "석공사", "줄눈 간격 검토");
        assert!(matches_filters(&row, None, "석공사")); // category
        assert!(matches_filters(&row, None, "품의")); // item type label
        assert!(matches_filters(&row, None, "줄눈")); // review text
        assert!(matches_filters(&row, None, "이길재")); // author
        assert!(matches_filters(&row, None, "비고란")); // note
        assert!(!matches_filters(&row, None, "없는말"));
    }

    #[test]
    fn query_is_case_insensitive_and_trimmed() {
        let mut row = entry(1, ItemType::Tender, "AL창호공사", "검토");
        row.note = None;
        assert!(matches_filters(&row, None, " al창호 "));
    }

    #[test]
    fn missing_optional_fields_do_not_match() {
        let mut row = entry(1, ItemType::Tender, "유리공사", "검토");
        row.author_name = None;
        row.note = None;
        assert!(!matches_filters(&row, None, "이길재"));
    }

    #[test]
    fn image_detection_is_extension_based() {
        assert!(is_image_file("도면.PNG"));
        assert!(is_image_file("clipboard-image-1714552800000.png"));
        assert!(!is_image_file("계약서.pdf"));
        assert!(!is_image_file("png")); // not an extension
    }

    #[test]
    fn sizes_format_with_one_decimal() {
        assert_eq!(format_size(None), "");
        assert_eq!(format_size(Some(512)), "512.0 B");
        assert_eq!(format_size(Some(2048)), "2.0 KB");
        assert_eq!(format_size(Some(5 * 1024 * 1024)), "5.0 MB");
    }
}
