pub mod api;
pub mod config;
pub mod crawler;
pub mod frequency;
