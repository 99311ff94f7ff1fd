//! Shared HTML plumbing for the page routers: cookies, flash messages, the
//! page shell, and response helpers.

pub mod cookies;
pub mod flash;
pub mod layout;
pub mod respond;

pub use flash::{Flash, FlashLevel};
pub use layout::{escape_html, PageContext};
