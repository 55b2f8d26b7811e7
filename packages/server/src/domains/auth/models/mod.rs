pub mod pending_code;

pub use pending_code::{generate_code, PendingCode, CODE_LENGTH};
