//! UI Components
//!
//! One module per component, re-exported flat.

mod auth_bar;
mod entry_form;
mod entry_table;
mod filter_bar;
mod searchable_dropdown;

pub use auth_bar::AuthBar;
pub use entry_form::EntryForm;
pub use entry_table::EntryTable;
pub use filter_bar::FilterBar;
pub use searchable_dropdown::{DropdownOption, SearchableDropdown};
