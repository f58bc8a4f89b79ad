use serde::Deserialize;
use utoipa::IntoParams;

use crate::dto::lobby::default_word_count;

/// Query string of the word draw endpoint.
///
/// Missing key components deserialize as empty strings so they are reported as invalid keys
/// rather than as malformed query strings.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WordsQuery {
    /// Game session the words are drawn for.
    #[serde(default)]
    pub session: String,
    /// Language code such as `en`, `de` or `ch`.
    #[serde(default)]
    pub lang: String,
    /// Word category.
    #[serde(default, rename = "type")]
    pub category: String,
    /// Number of words; negative values yield an empty list.
    #[serde(default = "default_word_count")]
    pub count: i64,
}
