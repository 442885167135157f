//! Auth Bar Component
//!
//! Magic-link sign-in box / signed-in indicator for the page header.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use crate::context::AppContext;
use crate::dom::alert;
use crate::supabase::Supabase;

#[component]
pub fn AuthBar() -> impl IntoView {
    let client = expect_context::<Supabase>();
    let ctx = expect_context::<AppContext>();
    let (email_input, set_email_input) = signal(String::new());

    let send_link = {
        let client = client.clone();
        move |_| {
            let email = email_input.get().trim().to_string();
            if email.is_empty() {
                return;
            }
            let client = client.clone();
            spawn_local(async move {
                match client.sign_in_with_otp(&email).await {
                    Ok(()) => alert("메일함에서 로그인 링크를 눌러주세요!"),
                    Err(err) => alert(&err.to_string()),
                }
            });
        }
    };

    let sign_out = {
        let client = client.clone();
        move |_| {
            let client = client.clone();
            spawn_local(async move {
                if let Err(err) = client.sign_out().await {
                    web_sys::console::warn_1(&format!("[AUTH] sign-out failed: {err}").into());
                }
                ctx.set_user(None);
            });
        }
    };

    view! {
        <div class="auth-bar">
            {move || match ctx.user_email.get() {
                Some(email) => view! {
                    <div class="auth-signed-in">
                        <span class="auth-email">{email}</span>
                        <button type="button" class="auth-btn" on:click=sign_out.clone()>
                            "로그아웃"
                        </button>
                    </div>
                }.into_any(),
                None => view! {
                    <div class="auth-signed-out">
                        <input
                            type="email"
                            class="auth-input"
                            placeholder="사내 이메일"
                            prop:value=move || email_input.get()
                            on:input=move |ev| {
                                let target = ev.target().unwrap();
                                let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                                set_email_input.set(input.value());
                            }
                        />
                        <button type="button" class="auth-btn" on:click=send_link.clone()>
                            "로그인 링크 발송"
                        </button>
                    </div>
                }.into_any(),
            }}
        </div>
    }
}
