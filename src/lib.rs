pub mod config;
pub mod error;
pub mod import;
pub mod logger;
pub mod menu;
pub mod post;
pub mod prompt;
pub mod slug;
pub mod store;
pub mod text_utils;
pub mod util;
mod test_data;
