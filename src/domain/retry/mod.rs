//! Retry domain - backoff policy, the retrying remote call and page draining

mod executor;
mod pagination;
mod policy;

pub use executor::{retry_remote, Lookup};
pub use pagination::drain_pages;
pub use policy::RetryPolicy;
