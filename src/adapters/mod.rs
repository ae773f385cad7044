pub mod api_handler;
pub mod health_handler;
pub mod notifications;
pub mod registry;
pub mod ui_handler;
