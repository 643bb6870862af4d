//! REST API client for the Notion databases, pages, and blocks endpoints.
//!
//! The client relays upstream responses verbatim: any HTTP status the Notion
//! API returns, success or not, is captured together with its JSON body and
//! handed back to the caller. Only transport failures and local validation
//! surface as [`ProxyError`].

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::ProxyError;
use crate::models::{database_schema, is_managed_block, page_properties, ContentBlock, PageFields};

/// Notion API version sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

const NOTION_API_URL: &str = "https://api.notion.com";

/// An upstream response: status code plus decoded JSON body.
///
/// Bodies that fail to decode as JSON are replaced with `null` rather than
/// failing the whole call, since error bodies from the upstream are sometimes
/// empty.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// HTTP status code as returned by the upstream service.
    pub status: u16,
    /// Decoded response body, or `Value::Null` when the body was not JSON.
    pub body: Value,
}

impl Upstream {
    /// Whether the upstream reported a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of a single stale block deletion during a page update.
#[derive(Debug)]
pub struct BlockDeletion {
    /// Identifier of the block that was deleted.
    pub block_id: String,
    /// Upstream response, or the transport error that prevented the call.
    pub result: Result<Upstream, ProxyError>,
}

/// Structured result of the page update pipeline.
///
/// The property patch is the authoritative outcome; block deletions and the
/// content append are best-effort steps whose failures are recorded here but
/// do not fail the update.
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Response to the property patch.
    pub patch: Upstream,
    /// One entry per managed block that was deleted.
    pub deletions: Vec<BlockDeletion>,
    /// Response to the content append, when new blocks were written.
    pub append: Option<Upstream>,
}

/// Client for the Notion REST API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    /// Create a new client authenticated with the given integration token.
    pub fn new(api_token: &str) -> Result<Self, ProxyError> {
        Self::with_url(api_token, NOTION_API_URL)
    }

    /// Create a client pointed at a custom base URL.
    ///
    /// Used by tests to target a local mock server.
    pub fn with_url(api_token: &str, base_url: &str) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {api_token}"))
            .map_err(|_| ProxyError::Configuration("API token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a database under the given parent page.
    ///
    /// The database gets the fixed property schema regardless of its name.
    #[instrument(skip(self))]
    pub async fn create_database(
        &self,
        parent_page_id: &str,
        name: &str,
    ) -> Result<Upstream, ProxyError> {
        require_id("parent page ID", parent_page_id)?;
        require_id("database name", name)?;

        let payload = json!({
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "title": [{ "type": "text", "text": { "content": name } }],
            "properties": database_schema()
        });

        self.relay(
            self.client
                .post(format!("{}/v1/databases", self.base_url))
                .json(&payload),
        )
        .await
    }

    /// Retrieve a database object.
    #[instrument(skip(self))]
    pub async fn get_database(&self, database_id: &str) -> Result<Upstream, ProxyError> {
        require_id("database ID", database_id)?;

        self.relay(
            self.client
                .get(format!("{}/v1/databases/{database_id}", self.base_url)),
        )
        .await
    }

    /// Query a database for its pages, sorted by due date ascending.
    #[instrument(skip(self))]
    pub async fn query_pages(&self, database_id: &str) -> Result<Upstream, ProxyError> {
        require_id("database ID", database_id)?;

        let payload = json!({
            "sorts": [{ "property": "Due Date", "direction": "ascending" }]
        });

        self.relay(
            self.client
                .post(format!("{}/v1/databases/{database_id}/query", self.base_url))
                .json(&payload),
        )
        .await
    }

    /// Create a page in a database with the given fields.
    ///
    /// A missing title is replaced with "Untitled". Content blocks are only
    /// included when at least one is present.
    #[instrument(skip(self, fields))]
    pub async fn create_page(
        &self,
        database_id: &str,
        mut fields: PageFields,
    ) -> Result<Upstream, ProxyError> {
        require_id("database ID", database_id)?;

        fields.title.get_or_insert_with(|| "Untitled".to_string());

        let mut payload = json!({
            "parent": { "database_id": database_id },
            "properties": page_properties(&fields)
        });

        let blocks: Vec<Value> = ContentBlock::from_fields(&fields)
            .iter()
            .map(ContentBlock::to_json)
            .collect();
        if !blocks.is_empty() {
            payload["children"] = Value::Array(blocks);
        }

        self.relay(
            self.client
                .post(format!("{}/v1/pages", self.base_url))
                .json(&payload),
        )
        .await
    }

    /// Retrieve a page's property object.
    #[instrument(skip(self))]
    pub async fn get_page_meta(&self, page_id: &str) -> Result<Upstream, ProxyError> {
        require_id("page ID", page_id)?;

        self.relay(
            self.client
                .get(format!("{}/v1/pages/{page_id}", self.base_url)),
        )
        .await
    }

    /// List a page's direct child blocks.
    #[instrument(skip(self))]
    pub async fn list_children(&self, page_id: &str) -> Result<Upstream, ProxyError> {
        require_id("page ID", page_id)?;

        self.relay(
            self.client
                .get(format!("{}/v1/blocks/{page_id}/children", self.base_url)),
        )
        .await
    }

    /// Retrieve a page as a combined envelope of properties and content.
    ///
    /// Both upstream responses are embedded as-is; an upstream error on
    /// either call shows up inside the envelope rather than replacing it.
    #[instrument(skip(self))]
    pub async fn get_page(&self, page_id: &str) -> Result<Value, ProxyError> {
        require_id("page ID", page_id)?;

        let content = self.list_children(page_id).await?;
        let meta = self.get_page_meta(page_id).await?;

        Ok(json!({
            "meta": meta.body,
            "content": content.body
        }))
    }

    /// Archive a page.
    ///
    /// Archiving an already archived page is a no-op upstream, so the call is
    /// idempotent.
    #[instrument(skip(self))]
    pub async fn archive_page(&self, page_id: &str) -> Result<Upstream, ProxyError> {
        require_id("page ID", page_id)?;

        self.relay(
            self.client
                .patch(format!("{}/v1/pages/{page_id}", self.base_url))
                .json(&json!({ "archived": true })),
        )
        .await
    }

    /// Delete a single block.
    #[instrument(skip(self))]
    pub async fn delete_block(&self, block_id: &str) -> Result<Upstream, ProxyError> {
        require_id("block ID", block_id)?;

        self.relay(
            self.client
                .delete(format!("{}/v1/blocks/{block_id}", self.base_url)),
        )
        .await
    }

    /// Append child blocks to a page.
    #[instrument(skip(self, blocks))]
    pub async fn append_children(
        &self,
        page_id: &str,
        blocks: Vec<Value>,
    ) -> Result<Upstream, ProxyError> {
        require_id("page ID", page_id)?;

        self.relay(
            self.client
                .patch(format!("{}/v1/blocks/{page_id}/children", self.base_url))
                .json(&json!({ "children": blocks })),
        )
        .await
    }

    /// Update a page's properties and replace its managed content blocks.
    ///
    /// Runs four steps in order: patch properties, list children, delete
    /// stale managed blocks, append rebuilt blocks. The steps are not
    /// transactional; failures after the patch are logged and recorded in
    /// the outcome but do not abort the update.
    #[instrument(skip(self, fields))]
    pub async fn update_page(
        &self,
        page_id: &str,
        fields: &PageFields,
    ) -> Result<UpdateOutcome, ProxyError> {
        require_id("page ID", page_id)?;

        let patch = self
            .relay(
                self.client
                    .patch(format!("{}/v1/pages/{page_id}", self.base_url))
                    .json(&json!({ "properties": page_properties(fields) })),
            )
            .await?;

        let mut deletions = Vec::new();
        match self.list_children(page_id).await {
            Ok(listing) if listing.is_success() => {
                let children = listing.body["results"].as_array().cloned().unwrap_or_default();
                for block in &children {
                    if !is_managed_block(block) {
                        continue;
                    }
                    let Some(block_id) = block.get("id").and_then(Value::as_str) else {
                        continue;
                    };
                    let result = self.delete_block(block_id).await;
                    match &result {
                        Ok(response) if !response.is_success() => {
                            warn!(page_id, block_id, status = response.status, "block deletion rejected upstream");
                        }
                        Err(error) => {
                            warn!(page_id, block_id, %error, "block deletion failed");
                        }
                        Ok(_) => debug!(page_id, block_id, "deleted stale block"),
                    }
                    deletions.push(BlockDeletion {
                        block_id: block_id.to_string(),
                        result,
                    });
                }
            }
            Ok(listing) => {
                warn!(page_id, status = listing.status, "child listing rejected upstream, skipping block cleanup");
            }
            Err(error) => {
                warn!(page_id, %error, "child listing failed, skipping block cleanup");
            }
        }

        let blocks: Vec<Value> = ContentBlock::from_fields(fields)
            .iter()
            .map(ContentBlock::to_json)
            .collect();
        let append = if blocks.is_empty() {
            None
        } else {
            match self.append_children(page_id, blocks).await {
                Ok(response) => {
                    if !response.is_success() {
                        warn!(page_id, status = response.status, "content append rejected upstream");
                    }
                    Some(response)
                }
                Err(error) => {
                    warn!(page_id, %error, "content append failed");
                    None
                }
            }
        };

        Ok(UpdateOutcome {
            patch,
            deletions,
            append,
        })
    }

    async fn relay(&self, request: reqwest::RequestBuilder) -> Result<Upstream, ProxyError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(Upstream { status, body })
    }
}

/// Reject empty or whitespace-only identifiers before any remote call.
pub fn require_id(name: &str, value: &str) -> Result<(), ProxyError> {
    if value.trim().is_empty() {
        return Err(ProxyError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}
