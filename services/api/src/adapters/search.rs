//! services/api/src/adapters/search.rs
//!
//! This module contains the adapter for the external book catalog. It
//! implements the `BookSearchService` port from the `core` crate against
//! the Open Library search API.

use async_trait::async_trait;
use serde::Deserialize;

use wordshelf_core::domain::CandidateBook;
use wordshelf_core::ports::{BookSearchService, PortError, PortResult};

/// Maximum number of candidates requested from the provider.
const RESULT_LIMIT: usize = 10;

/// An adapter that implements `BookSearchService` using the Open Library
/// HTTP API.
#[derive(Clone)]
pub struct OpenLibrarySearchAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibrarySearchAdapter {
    /// Creates a new `OpenLibrarySearchAdapter`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

//=========================================================================================
// Wire Format
//=========================================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Deserialize)]
struct SearchDoc {
    key: Option<String>,
    title: Option<String>,
    author_name: Option<Vec<String>>,
    cover_i: Option<i64>,
    isbn: Option<Vec<String>>,
    first_publish_year: Option<i32>,
}

impl SearchDoc {
    /// Map one search document to a candidate. Documents without a work
    /// key cannot be added to a library and are dropped.
    fn into_candidate(self) -> Option<CandidateBook> {
        let catalog_key = self.key?;
        Some(CandidateBook {
            catalog_key,
            title: self.title.unwrap_or_else(|| "Unknown Title".to_string()),
            author: self
                .author_name
                .and_then(|authors| authors.into_iter().next())
                .unwrap_or_else(|| "Unknown Author".to_string()),
            cover_url: self
                .cover_i
                .map(|id| format!("https://covers.openlibrary.org/b/id/{id}-M.jpg")),
            isbn: self.isbn.and_then(|isbns| isbns.into_iter().next()),
            first_publish_year: self.first_publish_year,
        })
    }
}

//=========================================================================================
// `BookSearchService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BookSearchService for OpenLibrarySearchAdapter {
    async fn search(&self, query: &str) -> PortResult<Vec<CandidateBook>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", &RESULT_LIMIT.to_string())])
            .send()
            .await
            .map_err(|e| PortError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Provider(format!(
                "Open Library returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PortError::Provider(e.to_string()))?;

        Ok(body
            .docs
            .into_iter()
            .filter_map(SearchDoc::into_candidate)
            .take(RESULT_LIMIT)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_documents_to_candidates() {
        let raw = r#"{
            "docs": [
                {
                    "key": "/works/OL45883W",
                    "title": "Fahrenheit 451",
                    "author_name": ["Ray Bradbury", "Someone Else"],
                    "cover_i": 12345,
                    "isbn": ["9780743247221"],
                    "first_publish_year": 1953
                },
                {
                    "title": "No key, dropped"
                },
                {
                    "key": "/works/OL1W"
                }
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        let candidates: Vec<CandidateBook> = response
            .docs
            .into_iter()
            .filter_map(SearchDoc::into_candidate)
            .collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].catalog_key, "/works/OL45883W");
        assert_eq!(candidates[0].author, "Ray Bradbury");
        assert_eq!(
            candidates[0].cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/12345-M.jpg")
        );
        assert_eq!(candidates[0].isbn.as_deref(), Some("9780743247221"));
        assert_eq!(candidates[0].first_publish_year, Some(1953));

        // bare documents fall back to the unknown placeholders
        assert_eq!(candidates[1].title, "Unknown Title");
        assert_eq!(candidates[1].author, "Unknown Author");
        assert!(candidates[1].cover_url.is_none());
    }

    #[test]
    fn empty_docs_deserialize_to_empty_list() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.docs.is_empty());
    }
}
