pub mod config;
pub mod cursor;

pub use config::PaginationConfig;
pub use cursor::{decode_cursor, encode_cursor, PageCursor};
