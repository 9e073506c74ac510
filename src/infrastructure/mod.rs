//! Infrastructure layer - GitHub adapter, file sink and logging

pub mod github;
pub mod logging;
pub mod sink;
