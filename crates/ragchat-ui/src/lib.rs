//! ragchat UI crate - the chat page and its server-side renderer.
//!
//! The page shell is a single self-contained HTML file embedded at compile
//! time via `include_str!`. Everything that depends on chat state is rendered
//! from a [`ragchat_chat::TranscriptView`] by [`render`].
//!
//! # Modules
//!
//! - [`page`]: the embedded shell
//! - [`render`]: transcript, results, pagination, and welcome screen markup

pub mod page;
pub mod render;

pub use render::{render_main, render_page};
