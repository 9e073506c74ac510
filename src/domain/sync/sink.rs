use async_trait::async_trait;

use crate::domain::DomainError;

/// Destination of the rendered authorized_keys bytes.
///
/// A write replaces the previous contents entirely.
#[async_trait]
pub trait KeySink: Send + Sync {
    async fn write(&self, contents: &[u8]) -> Result<(), DomainError>;

    /// Human-readable target, used in logs
    fn target(&self) -> String;
}
