use futures::future::BoxFuture;

use super::{ProviderError, ProviderResult, WordProvider, WordRequest};

/// Provider installed when no remote service is configured; every call fails,
/// so word pools serve their fallback list.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineWordProvider;

impl WordProvider for OfflineWordProvider {
    fn fetch_words(&self, _request: WordRequest) -> BoxFuture<'static, ProviderResult<Vec<String>>> {
        Box::pin(async { Err(ProviderError::NotConfigured) })
    }

    fn name(&self) -> &str {
        "offline"
    }
}
