//! Entry Form Component
//!
//! Create/edit form for procurement-review entries. Row click loads an
//! entry into the form; cancel or the header reset returns to create mode.
//! Files arrive via the picker, drag-and-drop, or a pasted screenshot.

use leptos::prelude::*;
use leptos::task::spawn_local;
use url::Url;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, File, FileList, SubmitEvent};

use crate::components::entry_table::format_size;
use crate::components::{DropdownOption, SearchableDropdown};
use crate::context::AppContext;
use crate::data;
use crate::dom::alert;
use crate::models::{AttachmentMeta, Entry, ItemType};
use crate::store::{
    store_merge_signed_urls, store_prepend_entry, store_replace_entry, use_app_store, AppStore,
};
use crate::supabase::rows::{EntryPatch, NewEntry};
use crate::supabase::storage::SIGNED_URL_TTL_BULK;
use crate::supabase::{ApiError, Supabase};

/// Raw form state, exactly as typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub category: String,
    pub item_type: ItemType,
    pub review_text: String,
    pub shared_at: String,
    pub author_name: String,
    pub note: String,
    pub link_url: String,
}

/// Field-level validation messages
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldErrors {
    pub category: Option<&'static str>,
    pub review_text: Option<&'static str>,
    pub link_url: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.review_text.is_none() && self.link_url.is_none()
    }
}

/// Checked before any backend call; failure blocks submission.
pub fn validate(draft: &EntryDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if draft.category.trim().is_empty() {
        errors.category = Some("공종은 필수");
    }
    if draft.review_text.trim().is_empty() {
        errors.review_text = Some("검토사항은 필수");
    }
    let link = draft.link_url.trim();
    if !link.is_empty() && Url::parse(link).is_err() {
        errors.link_url = Some("URL 형식 확인!");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl EntryDraft {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            category: entry.category.clone(),
            item_type: entry.item_type,
            review_text: entry.review_text.clone(),
            shared_at: entry.shared_at.map(|d| d.to_string()).unwrap_or_default(),
            author_name: entry.author_name.clone().unwrap_or_default(),
            note: entry.note.clone().unwrap_or_default(),
            link_url: entry.link_url.clone().unwrap_or_default(),
        }
    }

    pub fn to_new_entry(
        &self,
        team_id: &str,
        created_by: &str,
        attachments: Vec<AttachmentMeta>,
    ) -> NewEntry {
        NewEntry {
            team_id: team_id.to_string(),
            category: self.category.trim().to_string(),
            item_type: self.item_type,
            review_text: self.review_text.trim().to_string(),
            shared_at: self.shared_at.trim().parse().ok(),
            author_name: optional(&self.author_name),
            note: optional(&self.note),
            link_url: optional(&self.link_url),
            attachments,
            created_by: created_by.to_string(),
        }
    }

    pub fn to_patch(&self, team_id: &str, attachments: Vec<AttachmentMeta>) -> EntryPatch {
        EntryPatch {
            team_id: team_id.to_string(),
            category: self.category.trim().to_string(),
            item_type: self.item_type,
            review_text: self.review_text.trim().to_string(),
            shared_at: self.shared_at.trim().parse().ok(),
            author_name: optional(&self.author_name),
            note: optional(&self.note),
            link_url: optional(&self.link_url),
            attachments,
        }
    }
}

/// Upload staged files, write the row, merge the canonical result into the
/// store, and sign any new attachment keys.
async fn submit_entry(
    client: &Supabase,
    store: &AppStore,
    draft: EntryDraft,
    editing: Option<Entry>,
    files: Vec<File>,
    created_by: String,
) -> Result<(), ApiError> {
    let attachments = if files.is_empty() {
        Vec::new()
    } else {
        client.upload_files(&files).await?
    };
    let new_keys: Vec<String> = attachments.iter().map(|a| a.key.clone()).collect();

    let saved = match &editing {
        Some(entry) => {
            let patch = draft.to_patch(&client.config.team_id, attachments);
            client.update_entry(entry.id, &patch).await?
        }
        None => {
            let new_entry = draft.to_new_entry(&client.config.team_id, &created_by, attachments);
            client.insert_entry(&new_entry).await?
        }
    };

    if editing.is_some() {
        store_replace_entry(store, saved);
    } else {
        store_prepend_entry(store, saved);
    }

    if !new_keys.is_empty() {
        let map = client.create_signed_urls(&new_keys, SIGNED_URL_TTL_BULK).await;
        store_merge_signed_urls(store, map);
    }
    Ok(())
}

fn files_from_list(list: &FileList) -> Vec<File> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

#[component]
pub fn EntryForm() -> impl IntoView {
    let client = expect_context::<Supabase>();
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let (category, set_category) = signal(String::new());
    let (item_type, set_item_type) = signal(ItemType::default());
    let (review_text, set_review_text) = signal(String::new());
    let (shared_at, set_shared_at) = signal(String::new());
    let (author_name, set_author_name) = signal(String::new());
    let (note, set_note) = signal(String::new());
    let (link_url, set_link_url) = signal(String::new());
    let (errors, set_errors) = signal(FieldErrors::default());
    let (submitting, set_submitting) = signal(false);
    let (drag_active, set_drag_active) = signal(false);

    let clear_fields = move || {
        set_category.set(String::new());
        set_item_type.set(ItemType::default());
        set_review_text.set(String::new());
        set_shared_at.set(String::new());
        set_author_name.set(String::new());
        set_note.set(String::new());
        set_link_url.set(String::new());
        set_errors.set(FieldErrors::default());
    };

    // Row click populates the fields; leaving edit mode clears them.
    Effect::new(move |_| match ctx.editing.get() {
        Some(entry) => {
            let draft = EntryDraft::from_entry(&entry);
            set_category.set(draft.category);
            set_item_type.set(draft.item_type);
            set_review_text.set(draft.review_text);
            set_shared_at.set(draft.shared_at);
            set_author_name.set(draft.author_name);
            set_note.set(draft.note);
            set_link_url.set(draft.link_url);
            set_errors.set(FieldErrors::default());
        }
        None => clear_fields(),
    });

    // Header reset button and post-submit reset both land here.
    Effect::new(move |_| {
        let _ = ctx.reset_trigger.get();
        clear_fields();
    });

    let category_options: Vec<DropdownOption> =
        data::CATEGORIES.iter().map(|name| DropdownOption::plain(name)).collect();
    let member_options: Vec<DropdownOption> =
        data::TEAM_MEMBERS.iter().map(DropdownOption::from_member).collect();

    let on_submit = {
        let client = client.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            if submitting.get_untracked() {
                return;
            }
            let draft = EntryDraft {
                category: category.get_untracked(),
                item_type: item_type.get_untracked(),
                review_text: review_text.get_untracked(),
                shared_at: shared_at.get_untracked(),
                author_name: author_name.get_untracked(),
                note: note.get_untracked(),
                link_url: link_url.get_untracked(),
            };
            if let Err(field_errors) = validate(&draft) {
                set_errors.set(field_errors);
                return;
            }
            set_errors.set(FieldErrors::default());

            let editing = ctx.editing.get_untracked();
            let files = ctx.staged_files.get_untracked();
            let created_by = ctx
                .user_email
                .get_untracked()
                .unwrap_or_else(|| "anonymous@user.com".to_string());

            set_submitting.set(true);
            let client = client.clone();
            spawn_local(async move {
                let result =
                    submit_entry(&client, &store, draft, editing, files, created_by).await;
                set_submitting.set(false);
                match result {
                    // Back to create mode with a clean form.
                    Ok(()) => ctx.reset_form(),
                    // Form state stays as typed so the user can retry.
                    Err(err) => alert(&err.to_string()),
                }
            });
        }
    };

    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drag_active.set(true);
    };
    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drag_active.set(false);
    };
    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        set_drag_active.set(false);
        if let Some(transfer) = ev.data_transfer() {
            if let Some(list) = transfer.files() {
                ctx.stage_files(files_from_list(&list));
            }
        }
    };

    let is_editing = move || ctx.editing.get().is_some();

    view! {
        <section class="entry-form-card">
            <form class="entry-form" on:submit=on_submit>
                <div class="form-grid">
                    <select
                        class="form-input"
                        prop:value=move || item_type.get().label()
                        on:change=move |ev| {
                            let target = ev.target().unwrap();
                            let select = target.dyn_ref::<web_sys::HtmlSelectElement>().unwrap();
                            if let Some(t) = ItemType::from_label(&select.value()) {
                                set_item_type.set(t);
                            }
                        }
                    >
                        {ItemType::ALL.iter().map(|t| view! {
                            <option value=t.label()>{t.label()}</option>
                        }).collect_view()}
                    </select>

                    <div class="form-field">
                        <SearchableDropdown
                            options=category_options
                            value=category
                            on_change=move |name: String| set_category.set(name)
                            placeholder="공종 *"
                            has_error=Signal::derive(move || errors.get().category.is_some())
                        />
                        {move || errors.get().category.map(|msg| view! { <p class="field-error">{msg}</p> })}
                    </div>

                    <input
                        type="date"
                        class="form-input"
                        prop:value=move || shared_at.get()
                        on:input=move |ev| {
                            let target = ev.target().unwrap();
                            let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                            set_shared_at.set(input.value());
                        }
                    />

                    <SearchableDropdown
                        options=member_options
                        value=author_name
                        on_change=move |name: String| set_author_name.set(name)
                        placeholder="작성/공유자"
                        show_department=false
                    />
                </div>

                <div class="form-field">
                    <textarea
                        class=move || {
                            if errors.get().review_text.is_some() { "form-input review-text error" } else { "form-input review-text" }
                        }
                        placeholder="검토사항 *"
                        prop:value=move || review_text.get()
                        on:input=move |ev| {
                            let target = ev.target().unwrap();
                            let input = target.dyn_ref::<web_sys::HtmlTextAreaElement>().unwrap();
                            set_review_text.set(input.value());
                        }
                    ></textarea>
                    {move || errors.get().review_text.map(|msg| view! { <p class="field-error">{msg}</p> })}
                </div>

                <div class="form-grid two-col">
                    <input
                        type="text"
                        class="form-input"
                        placeholder="비고"
                        prop:value=move || note.get()
                        on:input=move |ev| {
                            let target = ev.target().unwrap();
                            let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                            set_note.set(input.value());
                        }
                    />
                    <div class="form-field">
                        <input
                            type="text"
                            class=move || {
                                if errors.get().link_url.is_some() { "form-input error" } else { "form-input" }
                            }
                            placeholder="Link (Teams/SharePoint/WorkChat URL)"
                            prop:value=move || link_url.get()
                            on:input=move |ev| {
                                let target = ev.target().unwrap();
                                let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                                set_link_url.set(input.value());
                            }
                        />
                        {move || errors.get().link_url.map(|msg| view! { <p class="field-error">{msg}</p> })}
                    </div>
                </div>

                <div
                    class=move || if drag_active.get() { "drop-zone active" } else { "drop-zone" }
                    on:dragenter=on_drag_over
                    on:dragover=on_drag_over
                    on:dragleave=on_drag_leave
                    on:drop=on_drop
                >
                    <p class="drop-hint">"파일을 드래그하여 놓거나 클릭하여 선택하세요"</p>
                    <p class="drop-hint small">"또는 화면 캡처 후 Ctrl+V로 바로 붙여넣기"</p>
                    <input
                        type="file"
                        id="file-input"
                        class="file-input-hidden"
                        multiple
                        on:change=move |ev| {
                            let target = ev.target().unwrap();
                            let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                            if let Some(list) = input.files() {
                                ctx.stage_files(files_from_list(&list));
                            }
                            input.set_value("");
                        }
                    />
                    <label for="file-input" class="file-input-label">"파일 선택"</label>
                </div>

                <Show when=move || !ctx.staged_files.get().is_empty()>
                    <div class="staged-files">
                        <h4>"선택된 파일:"</h4>
                        <For
                            each=move || {
                                ctx.staged_files
                                    .get()
                                    .iter()
                                    .enumerate()
                                    .map(|(index, file)| (index, file.name(), file.size() as u64))
                                    .collect::<Vec<_>>()
                            }
                            key=|(index, name, _)| (*index, name.clone())
                            children=move |(index, name, size)| {
                                let size = format_size(Some(size));
                                view! {
                                    <div class="staged-file">
                                        <span class="staged-name">{name}</span>
                                        <span class="staged-size">{size}</span>
                                        <button
                                            type="button"
                                            class="staged-remove"
                                            on:click=move |_| ctx.remove_staged(index)
                                        >
                                            "✕"
                                        </button>
                                    </div>
                                }
                            }
                        />
                    </div>
                </Show>

                <div class="form-actions">
                    <Show
                        when=is_editing
                        fallback=move || view! {
                            <button type="submit" class="submit-btn" disabled=move || submitting.get()>
                                {move || if submitting.get() { "처리 중..." } else { "추가" }}
                            </button>
                        }
                    >
                        <button type="submit" class="submit-btn edit" disabled=move || submitting.get()>
                            {move || if submitting.get() { "처리 중..." } else { "수정" }}
                        </button>
                        <button type="button" class="cancel-btn" on:click=move |_| ctx.reset_form()>
                            "취소"
                        </button>
                    </Show>
                </div>
            </form>
            <p class="form-hint">"* 파일은 개당 20MB 이하 · 민감자료는 업로드 전 권한 확인 🙏"</p>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn valid_draft() -> EntryDraft {
        EntryDraft {
            category: "철골공사".to_string(),
            item_type: ItemType::QuotationTerms,
            review_text: "구조도면 누락".to_string(),
            shared_at: "2024-05-01".to_string(),
            author_name: "이길재".to_string(),
            note: String::new(),
            link_url: String::new(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate(&valid_draft()).is_ok());
    }

    #[test]
    fn empty_category_blocks_submission() {
        let mut draft = valid_draft();
        draft.category = "  ".to_string();
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors.category, Some("공종은 필수"));
        assert!(errors.review_text.is_none());
    }

    #[test]
    fn empty_review_text_blocks_submission() {
        let mut draft = valid_draft();
        draft.review_text = String::new();
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors.review_text, Some("검토사항은 필수"));
    }

    #[test]
    fn malformed_link_blocks_submission() {
        let mut draft = valid_draft();
        draft.link_url = "teams 채널".to_string();
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors.link_url, Some("URL 형식 확인!"));
    }

    #[test]
    fn well_formed_or_empty_link_is_accepted() {
        let mut draft = valid_draft();
        draft.link_url = "https://teams.microsoft.com/l/channel/x".to_string();
        assert!(validate(&draft).is_ok());
        draft.link_url = String::new();
        assert!(validate(&draft).is_ok());
    }

    #[test]
    fn new_entry_payload_turns_blanks_into_nulls() {
        let mut draft = valid_draft();
        draft.author_name = " ".to_string();
        draft.shared_at = String::new();
        let payload = draft.to_new_entry("demo-team", "gilee05@gsenc.com", Vec::new());
        assert_eq!(payload.team_id, "demo-team");
        assert_eq!(payload.author_name, None);
        assert_eq!(payload.shared_at, None);
        assert_eq!(payload.created_by, "gilee05@gsenc.com");
    }

    #[test]
    fn new_entry_payload_parses_the_shared_date() {
        let payload = valid_draft().to_new_entry("demo-team", "a@b.c", Vec::new());
        assert_eq!(payload.shared_at, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn editing_populates_every_field_and_cancel_returns_to_defaults() {
        let entry = Entry {
            id: 9,
            team_id: "demo-team".to_string(),
            category: "방수공사".to_string(),
            item_type: ItemType::Approval,
            review_text: "시방서 확인".to_string(),
            shared_at: NaiveDate::from_ymd_opt(2024, 5, 2),
            author_name: Some("강성현".to_string()),
            note: Some("긴급".to_string()),
            link_url: Some("https://example.com/doc".to_string()),
            attachments: Vec::new(),
            created_by: "shkang5@gsenc.com".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let draft = EntryDraft::from_entry(&entry);
        assert_eq!(draft.category, "방수공사");
        assert_eq!(draft.item_type, ItemType::Approval);
        assert_eq!(draft.shared_at, "2024-05-02");
        assert_eq!(draft.link_url, "https://example.com/doc");

        // Cancel clears back to the create-mode defaults.
        let reset = EntryDraft::default();
        assert_eq!(reset.item_type, ItemType::Contract);
        assert!(reset.category.is_empty());
        assert!(reset.review_text.is_empty());
    }

    #[test]
    fn patch_carries_fresh_attachments() {
        let attachments = vec![AttachmentMeta {
            name: "도면.png".to_string(),
            key: "demo-team/1-aa-_.png".to_string(),
            size: Some(10),
        }];
        let patch = valid_draft().to_patch("demo-team", attachments.clone());
        assert_eq!(patch.attachments, attachments);
    }
}
