pub mod decode;
pub mod error;
