pub mod format;
pub mod string_ext;

pub use format::{humanize_blocks, humanize_buffers, signed_ms, signed_percent};
pub use string_ext::StringExt;
