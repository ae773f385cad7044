pub mod form_preview;
pub mod property_editor;
pub mod schema_editor;
pub mod schema_list;
pub mod toasts;
