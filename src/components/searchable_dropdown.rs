//! Searchable Dropdown Component
//!
//! Reusable selector over a fixed option list with substring search.
//! Used twice in the entry form: 공종 (category) and 작성/공유자 (author).

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::data::TeamMember;

/// One selectable option (name plus optional directory fields)
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownOption {
    pub name: String,
    pub department: Option<String>,
}

impl DropdownOption {
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            department: None,
        }
    }

    pub fn from_member(member: &TeamMember) -> Self {
        Self {
            name: member.name.to_string(),
            department: Some(member.department.to_string()),
        }
    }
}

/// Case-insensitive substring filter on name or department. An empty
/// search term returns the full list.
pub fn filter_options(options: &[DropdownOption], term: &str) -> Vec<DropdownOption> {
    if term.is_empty() {
        return options.to_vec();
    }
    let needle = term.to_lowercase();
    options
        .iter()
        .filter(|option| {
            option.name.to_lowercase().contains(&needle)
                || option
                    .department
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Dropdown with a search box and an explicit empty state
///
/// Props:
/// - options: fixed list to pick from
/// - value: currently selected name (blank shows the placeholder)
/// - on_change: called with the chosen option's name
#[component]
pub fn SearchableDropdown(
    options: Vec<DropdownOption>,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_change: Callback<String>,
    placeholder: &'static str,
    #[prop(default = true)] show_department: bool,
    #[prop(optional, into)] has_error: Signal<bool>,
) -> impl IntoView {
    let (is_open, set_is_open) = signal(false);
    let (search_term, set_search_term) = signal(String::new());
    let options = StoredValue::new(options);

    let filtered = move || options.with_value(|opts| filter_options(opts, &search_term.get()));
    // A value not present in the options just leaves the display blank.
    let has_selection = move || {
        let current = value.get();
        !current.is_empty() && options.with_value(|opts| opts.iter().any(|o| o.name == current))
    };

    view! {
        <div class="dropdown">
            <div
                class=move || {
                    let mut c = "dropdown-display".to_string();
                    if has_error.get() { c.push_str(" error"); }
                    c
                }
                on:click=move |_| set_is_open.update(|open| *open = !*open)
            >
                <span class=move || if has_selection() { "dropdown-value" } else { "dropdown-placeholder" }>
                    {move || if has_selection() { value.get() } else { placeholder.to_string() }}
                </span>
                <span class="dropdown-caret">"▾"</span>
            </div>

            <Show when=move || is_open.get()>
                <div class="dropdown-panel">
                    <input
                        type="text"
                        class="dropdown-search"
                        placeholder="검색..."
                        autocomplete="off"
                        prop:value=move || search_term.get()
                        on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                        on:input=move |ev| {
                            let target = ev.target().unwrap();
                            let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                            set_search_term.set(input.value());
                        }
                    />
                    <div class="dropdown-options">
                        {move || {
                            let matches = filtered();
                            if matches.is_empty() {
                                view! { <div class="dropdown-empty">"검색 결과가 없습니다"</div> }.into_any()
                            } else {
                                matches.into_iter().map(|option| {
                                    let name = option.name.clone();
                                    let chosen = option.name.clone();
                                    let department = show_department
                                        .then(|| option.department.clone())
                                        .flatten();
                                    view! {
                                        <button
                                            type="button"
                                            class="dropdown-option"
                                            on:click=move |_| {
                                                on_change.run(chosen.clone());
                                                set_is_open.set(false);
                                                set_search_term.set(String::new());
                                            }
                                        >
                                            <div class="option-name">{name}</div>
                                            {department.map(|d| view! { <div class="option-department">{d}</div> })}
                                        </button>
                                    }
                                }).collect_view().into_any()
                            }
                        }}
                    </div>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<DropdownOption> {
        vec![
            DropdownOption::plain("철골공사"),
            DropdownOption::plain("철근콘크리트공사"),
            DropdownOption::from_member(&TeamMember {
                name: "이길재",
                department: "건축외주팀",
                email: "gilee05@gsenc.com",
            }),
        ]
    }

    #[test]
    fn empty_search_returns_the_full_list() {
        let opts = options();
        assert_eq!(filter_options(&opts, ""), opts);
    }

    #[test]
    fn filter_matches_name_substring() {
        let matches = filter_options(&options(), "철골");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "철골공사");
    }

    #[test]
    fn filter_matches_department_too() {
        let matches = filter_options(&options(), "외주팀");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "이길재");
    }

    #[test]
    fn filter_is_case_insensitive() {
        let opts = vec![DropdownOption::plain("AL창호공사")];
        assert_eq!(filter_options(&opts, "al창호").len(), 1);
    }

    #[test]
    fn filter_is_idempotent() {
        let opts = options();
        let once = filter_options(&opts, "공사");
        let twice = filter_options(&once, "공사");
        assert_eq!(once, twice);
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(filter_options(&options(), "없는공종").is_empty());
    }
}
