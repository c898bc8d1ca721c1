// Adapters layer: concrete implementations for external systems (http, markup).

pub mod html;
pub mod http;

pub use html::html_to_text;
pub use http::{HttpPageFetcher, USER_AGENT};
