//! Checkboard App
//!
//! Root component: owns the backend client and shared state, runs the
//! session/load/realtime effects, and installs the global paste listener.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::components::{AuthBar, EntryForm, EntryTable, FilterBar};
use crate::config::Config;
use crate::context::AppContext;
use crate::dom::document;
use crate::models::{Entry, ItemType};
use crate::session;
use crate::store::{
    attachment_keys, store_merge_signed_urls, store_prepend_entry, store_remove_entry,
    store_replace_entry, store_set_entries, AppState, AppStore,
};
use crate::supabase::realtime::{EntryChange, RealtimeSubscription};
use crate::supabase::storage::SIGNED_URL_TTL_BULK;
use crate::supabase::Supabase;

#[component]
pub fn App() -> impl IntoView {
    // One client for the whole app, injected via context.
    let client = Supabase::new(Config::from_build_env());
    provide_context(client.clone());

    let store = Store::new(AppState::default());
    provide_context(store);

    // State
    let (user_email, set_user_email) = signal::<Option<String>>(None);
    let editing = signal::<Option<Entry>>(None);
    let staged_files = signal_local(Vec::<web_sys::File>::new());
    let reset_trigger = signal(0u32);
    let (query, set_query) = signal(String::new());
    let (type_filter, set_type_filter) = signal::<Option<ItemType>>(None);

    let ctx = AppContext::new(
        (user_email, set_user_email),
        editing,
        staged_files,
        reset_trigger,
    );
    provide_context(ctx);

    // Mirror the client's session signal into the current-user value; this
    // is the push half of the reconciliation.
    let session_signal = client.session();
    Effect::new(move |_| match session_signal.get() {
        Some(session) => set_user_email.set(session.user.email),
        None => set_user_email.set(None),
    });

    // Resolve the session once on load (magic-link callback handling
    // included), then fall back to the bounded poll while signed out.
    {
        let client = client.clone();
        Effect::new(move |_| {
            let client = client.clone();
            spawn_local(async move {
                if let Some(email) = session::resolve_session(&client).await {
                    set_user_email.set(Some(email));
                } else {
                    session::poll_session(client, user_email, set_user_email).await;
                }
            });
        });
    }

    // Load the team's entries (and sign their attachment keys) whenever a
    // session appears; sign-out empties the list.
    {
        let client = client.clone();
        Effect::new(move |_| {
            if user_email.get().is_none() {
                store_set_entries(&store, Vec::new());
                return;
            }
            let client = client.clone();
            spawn_local(async move {
                match client.list_entries().await {
                    Ok(entries) => {
                        web_sys::console::log_1(
                            &format!("[APP] loaded {} entries", entries.len()).into(),
                        );
                        let keys = attachment_keys(&entries);
                        store_set_entries(&store, entries);
                        if !keys.is_empty() {
                            let map = client.create_signed_urls(&keys, SIGNED_URL_TTL_BULK).await;
                            store_merge_signed_urls(&store, map);
                        }
                    }
                    Err(err) => {
                        web_sys::console::error_1(&format!("[APP] load failed: {err}").into());
                    }
                }
            });
        });
    }

    // Realtime subscription follows the session.
    let subscription = StoredValue::new_local(None::<RealtimeSubscription>);
    {
        let client = client.clone();
        Effect::new(move |_| {
            let signed_in = user_email.get().is_some();
            subscription.update_value(|slot| {
                if let Some(active) = slot.take() {
                    active.close();
                }
            });
            if !signed_in {
                return;
            }
            let change_client = client.clone();
            match client
                .subscribe_entries(move |change| apply_change(&change_client, &store, change))
            {
                Ok(active) => subscription.set_value(Some(active)),
                Err(err) => {
                    web_sys::console::warn_1(
                        &format!("[APP] realtime subscribe failed: {err}").into(),
                    );
                }
            }
        });
    }
    on_cleanup(move || {
        subscription.update_value(|slot| {
            if let Some(active) = slot.take() {
                active.close();
            }
        });
    });

    // Global paste listener: a screenshot pasted anywhere on the page
    // becomes a staged attachment, same as a picked file.
    {
        let on_paste = leptos::__reexports::send_wrapper::SendWrapper::new(
            Closure::<dyn FnMut(web_sys::ClipboardEvent)>::new(
                move |ev: web_sys::ClipboardEvent| {
                    if let Some(file) = pasted_image(&ev) {
                        ctx.stage_file(file);
                    }
                },
            ),
        );
        let _ = document()
            .add_event_listener_with_callback("paste", on_paste.as_ref().unchecked_ref());
        on_cleanup(move || {
            let _ = document()
                .remove_event_listener_with_callback("paste", on_paste.as_ref().unchecked_ref());
        });
    }

    view! {
        <main class="page">
            <header class="page-header">
                <h1>"외주팀 족보 V0"</h1>
                <div class="header-actions">
                    <button type="button" class="reset-btn" on:click=move |_| ctx.reset_form()>
                        "데이터 새로고침"
                    </button>
                    <AuthBar />
                </div>
            </header>

            <EntryForm />

            <Show
                when=move || user_email.get().is_some()
                fallback=|| view! {
                    <section class="signed-out-note">
                        "로그인 후 목록을 볼 수 있어요. 이메일로 로그인 링크를 받아주세요."
                    </section>
                }
            >
                <FilterBar
                    query=query
                    set_query=set_query
                    type_filter=type_filter
                    set_type_filter=set_type_filter
                />
                <EntryTable query=query type_filter=type_filter />
            </Show>

            <footer class="page-footer">
                "실시간 · 파일 업로드 · 팀 RLS 적용(멤버십은 콘솔에서 추가) · 작성/관리자만 수정/삭제"
            </footer>
        </main>
    }
}

/// Mirror one realtime notification into the store. Inserts also mint
/// signed URLs for the new row's attachments.
fn apply_change(client: &Supabase, store: &AppStore, change: EntryChange) {
    match change {
        EntryChange::Insert(entry) => {
            let keys: Vec<String> = entry.attachments.iter().map(|a| a.key.clone()).collect();
            store_prepend_entry(store, entry);
            if !keys.is_empty() {
                let client = client.clone();
                let store = *store;
                spawn_local(async move {
                    let map = client.create_signed_urls(&keys, SIGNED_URL_TTL_BULK).await;
                    store_merge_signed_urls(&store, map);
                });
            }
        }
        EntryChange::Update(entry) => store_replace_entry(store, entry),
        EntryChange::Delete { id } => store_remove_entry(store, id),
    }
}

/// First image item in a paste event, renamed the way a picked screenshot
/// file would be.
fn pasted_image(ev: &web_sys::ClipboardEvent) -> Option<web_sys::File> {
    let items = ev.clipboard_data()?.items();
    for i in 0..items.length() {
        let item = items.get(i)?;
        if !item.type_().contains("image") {
            continue;
        }
        let file = item.get_as_file().ok()??;
        let name = format!("clipboard-image-{}.png", js_sys::Date::now() as u64);
        let bag = web_sys::FilePropertyBag::new();
        bag.set_type("image/png");
        let parts: JsValue = js_sys::Array::of1(&file).into();
        return web_sys::File::new_with_blob_sequence_and_options(&parts, &name, &bag).ok();
    }
    None
}
