pub mod cli;
pub mod commands;
pub mod core;
pub mod settings;
pub mod state;
pub mod types;

pub use crate::core::catalog::{Template, CATALOG};
pub use crate::core::generator::{generate_titles, TitleGenerator};
pub use crate::core::normalize::normalize_topic;
