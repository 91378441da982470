// src/lib.rs
pub mod banner;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod input;
pub mod models;
pub mod preferences;
pub mod summary;
