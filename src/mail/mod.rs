pub mod types;

pub use types::{ItemFlags, MailItem};
