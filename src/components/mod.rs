pub mod app;
pub mod banner;
pub mod globe_view;
