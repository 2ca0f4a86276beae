pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod media;
pub mod render;
