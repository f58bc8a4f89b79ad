//! Remote word generation treated as a fallible black box.

mod error;
mod offline;
mod openai;
#[cfg(test)]
pub(crate) mod scripted;

use futures::future::BoxFuture;

pub use error::{ProviderError, ProviderResult};
pub use offline::OfflineWordProvider;
pub use openai::{OpenAiConfig, OpenAiWordProvider};

/// Parameters of a single word-generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRequest {
    /// Language code such as `en` or `de`.
    pub language: String,
    /// Category the nouns should belong to.
    pub category: String,
    /// Number of words asked for; providers may return fewer.
    pub count: usize,
}

/// Source of candidate words for the guessing game.
pub trait WordProvider: Send + Sync {
    /// Ask the provider for a batch of words. Output may contain duplicates.
    fn fetch_words(&self, request: WordRequest) -> BoxFuture<'static, ProviderResult<Vec<String>>>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
