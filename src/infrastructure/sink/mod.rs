//! Output sinks for rendered authorized_keys content

mod file;

pub use file::{lookup_user, FileOwner, FileSink};
