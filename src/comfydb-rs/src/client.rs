use crate::{ClientError, Result};
use comfydb_core::{AllDocs, Config, DatabaseInfo, Document, Envelope};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// ComfyDb REST API Client
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    base_url: Url,
    client: HttpClient,
}

const MUTATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED, StatusCode::ACCEPTED];

impl Client {
    /// Create a new client for the server described by `config`
    ///
    /// No request is made until the first operation is called.
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if config.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url =
            Url::parse(&config.base_url()).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Create a client from a full server URI such as `http://admin:pw@127.0.0.1:5984`
    pub fn from_url(url: &str) -> Result<Self> {
        let config = Config::from_url(url).map_err(|e| ClientError::Config(format!("{:#}", e)))?;
        Self::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // Database operations

    /// List all database names on the server
    #[tracing::instrument(skip(self))]
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        let url = self.url(&["_all_dbs"])?;
        self.fetch(Method::GET, url, None, &[StatusCode::OK]).await
    }

    /// Create a database; an existing database yields `RevisionConflict`
    #[tracing::instrument(skip(self))]
    pub async fn create_database(&self, db: &str) -> Result<()> {
        let url = self.url(&[segment("database name", db)?, ""])?;
        self.expect(
            Method::PUT,
            url,
            None,
            &[StatusCode::CREATED, StatusCode::ACCEPTED],
        )
        .await
    }

    /// Delete a database; a missing database yields `NotFound`
    #[tracing::instrument(skip(self))]
    pub async fn delete_database(&self, db: &str) -> Result<()> {
        let url = self.url(&[segment("database name", db)?, ""])?;
        self.expect(
            Method::DELETE,
            url,
            None,
            &[StatusCode::OK, StatusCode::ACCEPTED],
        )
        .await
    }

    /// Get information about a database
    #[tracing::instrument(skip(self))]
    pub async fn database_info(&self, db: &str) -> Result<DatabaseInfo> {
        let url = self.url(&[segment("database name", db)?, ""])?;
        self.fetch(Method::GET, url, None, &[StatusCode::OK]).await
    }

    // Document operations

    /// List the documents within a database
    #[tracing::instrument(skip(self))]
    pub async fn list_documents(&self, db: &str) -> Result<AllDocs> {
        let url = self.url(&[segment("database name", db)?, "_all_docs"])?;
        self.fetch(Method::GET, url, None, &[StatusCode::OK]).await
    }

    /// Open a document, at `rev` if given or the current revision otherwise
    pub async fn open_document(&self, db: &str, id: &str, rev: Option<&str>) -> Result<Document> {
        self.open_document_as(db, id, rev).await
    }

    /// Open a document and decode it into `T`
    #[tracing::instrument(skip(self))]
    pub async fn open_document_as<T: DeserializeOwned>(
        &self,
        db: &str,
        id: &str,
        rev: Option<&str>,
    ) -> Result<T> {
        let mut url = self.url(&[segment("database name", db)?, segment("document id", id)?])?;
        if let Some(rev) = rev {
            url.query_pairs_mut().append_pair("rev", rev);
        }
        self.fetch(Method::GET, url, None, &[StatusCode::OK]).await
    }

    /// Save a document under a known id
    ///
    /// Updating an existing document requires its current `_rev` in `body`;
    /// a stale or missing revision yields `RevisionConflict`.
    #[tracing::instrument(skip(self, body))]
    pub async fn save_document<T: Serialize + ?Sized>(
        &self,
        db: &str,
        body: &T,
        id: &str,
    ) -> Result<Envelope> {
        let url = self.url(&[segment("database name", db)?, segment("document id", id)?])?;
        let body = encode(body)?;
        self.fetch(Method::PUT, url, Some(body), MUTATED).await
    }

    /// Create a document, letting the server assign an id when `id` is `None`
    #[tracing::instrument(skip(self, body))]
    pub async fn create_document<T: Serialize + ?Sized>(
        &self,
        db: &str,
        body: &T,
        id: Option<&str>,
    ) -> Result<Envelope> {
        let db = segment("database name", db)?;
        let body = encode(body)?;
        match id {
            Some(id) => {
                let url = self.url(&[db, segment("document id", id)?])?;
                self.fetch(Method::PUT, url, Some(body), MUTATED).await
            }
            None => {
                let url = self.url(&[db, ""])?;
                self.fetch(Method::POST, url, Some(body), MUTATED).await
            }
        }
    }

    /// Delete the revision `rev` of a document
    #[tracing::instrument(skip(self))]
    pub async fn delete_document(&self, db: &str, id: &str, rev: &str) -> Result<()> {
        let mut url = self.url(&[segment("database name", db)?, segment("document id", id)?])?;
        url.query_pairs_mut().append_pair("rev", rev);
        self.expect(
            Method::DELETE,
            url,
            None,
            &[StatusCode::OK, StatusCode::ACCEPTED],
        )
        .await
    }

    // Request plumbing

    /// Build a URL from percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// Issue one request and return the status and raw body
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, Vec<u8>)> {
        tracing::debug!(%method, path = %url.path(), "Sending request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        if let Some((username, password)) = self.config.credentials() {
            request = request.basic_auth(username, Some(password));
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(%method, path = %url.path(), status = status.as_u16(), "Received response");
        Ok((status, bytes.to_vec()))
    }

    /// Send a request and decode the JSON body of an expected response
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        expected: &[StatusCode],
    ) -> Result<T> {
        let (status, bytes) = self.send(method, url, body).await?;
        if !expected.contains(&status) {
            return Err(ClientError::from_response(status, &bytes));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request whose success carries no payload worth decoding
    async fn expect(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        expected: &[StatusCode],
    ) -> Result<()> {
        let (status, bytes) = self.send(method, url, body).await?;
        if !expected.contains(&status) {
            return Err(ClientError::from_response(status, &bytes));
        }
        Ok(())
    }
}

/// Validate a caller-supplied identifier before it becomes a path segment
///
/// `.` and `..` are dropped by URL normalisation and would retarget the
/// request at the enclosing resource.
fn segment<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    match value {
        "" => Err(ClientError::InvalidUrl(format!("{} must not be empty", what))),
        "." | ".." => Err(ClientError::InvalidUrl(format!(
            "{} must not be a dot segment: {:?}",
            what, value
        ))),
        _ => Ok(value),
    }
}

fn encode<T: Serialize + ?Sized>(body: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(ClientError::Encode)
}
