// src/lib.rs
pub mod api;
pub mod artifact;
pub mod banner;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod process;
pub mod response;
pub mod status;
