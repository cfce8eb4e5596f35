//! The simulated network step behind catalog operations

use crate::config::LatencyConfig;
use crate::error::BackendError;
use async_trait::async_trait;

/// Catalog operations that make a backend round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Publish,
    List,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// User-facing message stored in the error slot when this operation fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Publish => "Error al publicar el libro",
            Self::List => "Error al cargar los libros",
            Self::Update => "Error al actualizar el libro",
            Self::Delete => "Error al eliminar el libro",
        }
    }
}

/// Remote side of the catalog
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Perform the network step for `operation`
    async fn round_trip(&self, operation: Operation) -> Result<(), BackendError>;
}

/// Stand-in backend: waits a fixed latency, then succeeds
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    latency: LatencyConfig,
}

impl SimulatedBackend {
    pub fn new(latency: LatencyConfig) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl CatalogBackend for SimulatedBackend {
    async fn round_trip(&self, operation: Operation) -> Result<(), BackendError> {
        let delay = self.latency.for_operation(operation);
        tracing::debug!(operation = operation.as_str(), ?delay, "Simulated round trip");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
