// src/api/handlers/mod.rs
mod artifacts;
mod generate;
mod health;
mod run;
mod visual;

pub use artifacts::download;
pub use generate::generate;
pub use health::{index, ping};
pub use run::run;
pub use visual::visual;
