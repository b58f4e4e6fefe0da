//! Display-name generation for new members.
//!
//! The ledger only needs "some human-readable name"; where it comes from is
//! behind [`NameGenerator`]. The default source is the randomuser.me API.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Default endpoint for [`RandomUserClient`].
pub const DEFAULT_NAME_API_URL: &str = "https://randomuser.me/api/";

/// Name generator errors.
#[derive(Debug, Error)]
pub enum NameError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("name service returned no users")]
    Empty,
}

/// Source of display names for newly added members.
#[async_trait]
pub trait NameGenerator: Send + Sync {
    async fn generate_display_name(&self) -> Result<String, NameError>;
}

#[derive(Debug, Deserialize)]
struct RandomUserResponse {
    results: Vec<RandomUser>,
}

#[derive(Debug, Deserialize)]
struct RandomUser {
    name: RandomUserName,
}

#[derive(Debug, Deserialize)]
struct RandomUserName {
    first: String,
    last: String,
}

impl RandomUserResponse {
    fn display_name(self) -> Result<String, NameError> {
        let user = self.results.into_iter().next().ok_or(NameError::Empty)?;
        Ok(format!("{} {}", user.name.first, user.name.last))
    }
}

/// Fetches names from a randomuser.me compatible API.
#[derive(Debug, Clone)]
pub struct RandomUserClient {
    url: String,
    client: Client,
}

impl RandomUserClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

impl Default for RandomUserClient {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_API_URL)
    }
}

#[async_trait]
impl NameGenerator for RandomUserClient {
    async fn generate_display_name(&self) -> Result<String, NameError> {
        let response: RandomUserResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let name = response.display_name()?;
        tracing::debug!("Fetched display name {:?} from {}", name, self.url);
        Ok(name)
    }
}

/// Hands out names from a fixed list, wrapping around when exhausted.
///
/// Used for offline runs and tests.
#[derive(Debug)]
pub struct FixedNames {
    names: Vec<String>,
    next: AtomicUsize,
}

impl FixedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NameGenerator for FixedNames {
    async fn generate_display_name(&self) -> Result<String, NameError> {
        if self.names.is_empty() {
            return Err(NameError::Empty);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.names.len();
        Ok(self.names[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_first_and_last_name() {
        let response: RandomUserResponse = serde_json::from_str(
            r#"{"results":[{"gender":"female","name":{"title":"Ms","first":"Ada","last":"Lovelace"}}],"info":{"seed":"x"}}"#,
        )
        .unwrap();

        assert_eq!(response.display_name().unwrap(), "Ada Lovelace");
    }

    #[test]
    fn empty_results_is_an_error() {
        let response: RandomUserResponse = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(matches!(response.display_name(), Err(NameError::Empty)));
    }

    #[tokio::test]
    async fn fixed_names_cycle() {
        let names = FixedNames::new(["Alice", "Bob"]);
        assert_eq!(names.generate_display_name().await.unwrap(), "Alice");
        assert_eq!(names.generate_display_name().await.unwrap(), "Bob");
        assert_eq!(names.generate_display_name().await.unwrap(), "Alice");
    }

    #[tokio::test]
    async fn empty_fixed_names_fail() {
        let names = FixedNames::new(Vec::<String>::new());
        assert!(names.generate_display_name().await.is_err());
    }
}
