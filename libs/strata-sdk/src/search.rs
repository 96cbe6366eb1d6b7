//! Server-side metadata search.
//!
//! A search is started with a POST and its results are read back in
//! offset/limit chunks with the returned search id.

use crate::connection::Connection;
use crate::error::SdkError;
use crate::objects::ObjectType;
use crate::pager::{Chunk, OffsetPager};
use crate::transport::ApiRequest;
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::Value;

/// Results requested per page when reading a search.
pub const SEARCH_CHUNK_SIZE: usize = 1000;

const RESULTS_PATH: &str = "/api/metadataSearches/results";

/// How the `name` of a search is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPattern {
    ContainsAnyWord,
    BeginWith,
    #[default]
    Exactly,
    BeginWithPhrase,
    Contains,
    EndWith,
}

impl SearchPattern {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::ContainsAnyWord => 0,
            Self::BeginWith => 1,
            Self::Exactly => 2,
            Self::BeginWithPhrase => 3,
            Self::Contains => 4,
            Self::EndWith => 5,
        }
    }
}

/// Search definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSearch {
    pub object_types: Vec<ObjectType>,
    pub name: Option<String>,
    pub pattern: SearchPattern,
    /// Restrict to one folder subtree.
    pub root: Option<String>,
    pub get_ancestors: bool,
    /// Extra raw query parameters (server-side filters).
    pub extra: Vec<(String, String)>,
}

impl MetadataSearch {
    #[must_use]
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_types: vec![object_type],
            name: None,
            pattern: SearchPattern::default(),
            root: None,
            get_ancestors: false,
            extra: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>, pattern: SearchPattern) -> Self {
        self.name = Some(name.into());
        self.pattern = pattern;
        self
    }

    #[must_use]
    pub fn root(mut self, folder_id: impl Into<String>) -> Self {
        self.root = Some(folder_id.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    fn start_request(&self) -> ApiRequest {
        let mut request = ApiRequest::post(RESULTS_PATH)
            .query_opt("name", self.name.as_deref())
            .query("pattern", self.pattern.code())
            .query("getAncestors", self.get_ancestors)
            .query_opt("root", self.root.as_deref());
        for object_type in &self.object_types {
            request = request.query("type", object_type.code());
        }
        for (name, value) in &self.extra {
            request = request.query(name, value);
        }
        request
    }

    /// Start the search and return its id.
    ///
    /// # Errors
    /// Returns `SdkError::Api` for server errors.
    pub async fn start(&self, conn: &Connection) -> Result<String, SdkError> {
        #[derive(Deserialize)]
        struct Started {
            id: String,
        }
        let started: Started = conn.send_json(self.start_request()).await?;
        tracing::debug!(search_id = %started.id, "metadata search started");
        Ok(started.id)
    }

    /// Run the search and read every result, up to `limit`.
    ///
    /// # Errors
    /// Returns `SdkError::Api` for server errors.
    pub async fn run(&self, conn: &Connection, limit: Option<usize>) -> Result<Vec<Value>, SdkError> {
        let search_id = self.start(conn).await?;
        search_results(conn, &search_id, limit).await
    }
}

/// Read the results of a started search.
///
/// # Errors
/// Returns `SdkError::Api` for server errors and `SdkError::Json` if a page
/// is not a JSON array.
pub async fn search_results(
    conn: &Connection,
    search_id: &str,
    limit: Option<usize>,
) -> Result<Vec<Value>, SdkError> {
    OffsetPager::new(SEARCH_CHUNK_SIZE, limit, |chunk: Chunk| async move {
        let request = ApiRequest::get(RESULTS_PATH)
            .query("searchId", search_id)
            .query("offset", chunk.offset)
            .query("limit", chunk.limit);
        conn.send_json::<Vec<Value>>(request).await
    })
    .try_collect()
    .await
}
