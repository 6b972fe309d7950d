pub mod app;
pub mod field_view;
pub mod score_badge;
