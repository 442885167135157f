//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use web_sys::File;

use crate::models::Entry;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Current signed-in user's email - read
    pub user_email: ReadSignal<Option<String>>,
    set_user_email: WriteSignal<Option<String>>,
    /// Entry loaded into the form for editing (None = create mode) - read
    pub editing: ReadSignal<Option<Entry>>,
    set_editing: WriteSignal<Option<Entry>>,
    /// Files staged for the next submit - read
    pub staged_files: ReadSignal<Vec<File>, LocalStorage>,
    set_staged_files: WriteSignal<Vec<File>, LocalStorage>,
    /// Trigger to clear the form fields - read
    pub reset_trigger: ReadSignal<u32>,
    set_reset_trigger: WriteSignal<u32>,
}

impl AppContext {
    pub fn new(
        user_email: (ReadSignal<Option<String>>, WriteSignal<Option<String>>),
        editing: (ReadSignal<Option<Entry>>, WriteSignal<Option<Entry>>),
        staged_files: (ReadSignal<Vec<File>, LocalStorage>, WriteSignal<Vec<File>, LocalStorage>),
        reset_trigger: (ReadSignal<u32>, WriteSignal<u32>),
    ) -> Self {
        Self {
            user_email: user_email.0,
            set_user_email: user_email.1,
            editing: editing.0,
            set_editing: editing.1,
            staged_files: staged_files.0,
            set_staged_files: staged_files.1,
            reset_trigger: reset_trigger.0,
            set_reset_trigger: reset_trigger.1,
        }
    }

    pub fn set_user(&self, email: Option<String>) {
        self.set_user_email.set(email);
    }

    /// Load an existing entry into the form
    pub fn start_edit(&self, entry: Entry) {
        self.set_editing.set(Some(entry));
    }

    /// Back to create mode: clears fields, edit state, and staged files
    pub fn reset_form(&self) {
        self.set_editing.set(None);
        self.set_staged_files.set(Vec::new());
        self.set_reset_trigger.update(|v| *v += 1);
    }

    pub fn stage_file(&self, file: File) {
        self.set_staged_files.update(|files| files.push(file));
    }

    pub fn stage_files(&self, new_files: Vec<File>) {
        if new_files.is_empty() {
            return;
        }
        self.set_staged_files.update(|files| files.extend(new_files));
    }

    pub fn remove_staged(&self, index: usize) {
        self.set_staged_files.update(|files| {
            if index < files.len() {
                files.remove(index);
            }
        });
    }
}
