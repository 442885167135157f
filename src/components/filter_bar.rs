//! Filter Bar Component
//!
//! Free-text search box plus the 구분 chip row (전체 + the six types).

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::models::ItemType;

#[component]
pub fn FilterBar(
    query: ReadSignal<String>,
    set_query: WriteSignal<String>,
    type_filter: ReadSignal<Option<ItemType>>,
    set_type_filter: WriteSignal<Option<ItemType>>,
) -> impl IntoView {
    view! {
        <section class="filter-bar">
            <input
                type="text"
                class="search-input"
                placeholder="검색(공종/구분/검토사항/작성자/비고)"
                prop:value=move || query.get()
                on:input=move |ev| {
                    let target = ev.target().unwrap();
                    let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                    set_query.set(input.value());
                }
            />
            <div class="type-chips">
                <button
                    type="button"
                    class=move || if type_filter.get().is_none() { "type-chip active" } else { "type-chip" }
                    on:click=move |_| set_type_filter.set(None)
                >
                    "전체"
                </button>
                {ItemType::ALL.iter().map(|item_type| {
                    let item_type = *item_type;
                    view! {
                        <button
                            type="button"
                            class=move || {
                                if type_filter.get() == Some(item_type) { "type-chip active" } else { "type-chip" }
                            }
                            on:click=move |_| set_type_filter.set(Some(item_type))
                        >
                            <span class=format!("type-icon {}", item_type.css_class())>{item_type.icon()}</span>
                            {item_type.label()}
                        </button>
                    }
                }).collect_view()}
            </div>
        </section>
    }
}
