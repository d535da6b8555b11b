pub mod base64url;
pub mod time;

pub use base64url::{decode, decode_bytes, encode, encode_bytes, invalid_chars, is_base64url};
pub use time::now_ts;
