//! Checkboard Frontend Entry Point

mod app;
mod components;
mod config;
mod context;
mod data;
mod dom;
mod models;
mod session;
mod store;
mod supabase;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
