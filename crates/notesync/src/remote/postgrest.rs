//! [`RemoteTable`] over a PostgREST endpoint (e.g. a Supabase project).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::trace;

use super::RemoteTable;
use crate::codec::{RemotePatch, RemoteRow, RowWrite};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};

const PREFER: &str = "Prefer";
const RETURN_ROWS: &str = "return=representation";
const UPSERT: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

/// HTTP client bound to one table under `<url>/rest/v1/`.
#[derive(Debug)]
pub struct PostgrestTable {
    client: Client,
    endpoint: Url,
    table: String,
}

impl PostgrestTable {
    /// Build a client from remote settings. No request is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteConnect`] if URL or key are missing or
    /// malformed, or the HTTP client cannot be built.
    pub fn connect(settings: &RemoteConfig) -> Result<Self> {
        Self::with_builder(settings, Client::builder())
    }

    fn with_builder(settings: &RemoteConfig, builder: ClientBuilder) -> Result<Self> {
        let (url, key) = settings
            .credentials()
            .ok_or_else(|| Error::remote_connect("endpoint URL and access key are required"))?;

        let base = Url::parse(&format!("{}/", url.trim_end_matches('/')))
            .map_err(|e| Error::remote_connect(format!("invalid endpoint {url}: {e}")))?;
        let endpoint = base
            .join(&format!("rest/v1/{}", settings.table))
            .map_err(|e| Error::remote_connect(format!("invalid table {}: {e}", settings.table)))?;

        let mut apikey = HeaderValue::from_str(key)
            .map_err(|_| Error::remote_connect("access key is not a valid header value"))?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| Error::remote_connect("access key is not a valid header value"))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = builder
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| Error::remote_connect(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            table: settings.table.clone(),
        })
    }

    /// The table URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    async fn check(operation: &'static str, response: Response) -> Result<Response> {
        let status = response.status();
        trace!(operation, %status, "PostgREST response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::RemoteStatus {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    async fn read<R: DeserializeOwned>(operation: &'static str, response: Response) -> Result<R> {
        let body = Self::check(operation, response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::remote_decode(operation, e.to_string()))
    }
}

/// Render ids as a PostgREST `in` filter value: `in.("a","b")`.
fn in_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

fn eq_filter(id: &str) -> String {
    format!("eq.{id}")
}

#[async_trait]
impl RemoteTable for PostgrestTable {
    async fn select_all(&self) -> Result<Vec<RemoteRow>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("select", "*"), ("order", "updated_at.desc")])
            .send()
            .await?;
        Self::read("list", response).await
    }

    async fn insert(&self, row: &RowWrite) -> Result<RemoteRow> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(PREFER, RETURN_ROWS)
            .json(row)
            .send()
            .await?;
        let rows: Vec<RemoteRow> = Self::read("create", response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::remote_decode("create", "insert returned no rows"))
    }

    async fn update(&self, id: &str, patch: &RemotePatch) -> Result<Option<RemoteRow>> {
        let response = self
            .client
            .patch(self.endpoint.clone())
            .query(&[("id", eq_filter(id))])
            .header(PREFER, RETURN_ROWS)
            .json(patch)
            .send()
            .await?;
        let rows: Vec<RemoteRow> = Self::read("update", response).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint.clone())
            .query(&[("id", eq_filter(id))])
            .send()
            .await?;
        Self::check("remove", response).await?;
        Ok(())
    }

    async fn upsert(&self, rows: &[RowWrite]) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("on_conflict", "id")])
            .header(PREFER, UPSERT)
            .json(rows)
            .send()
            .await?;
        Self::check("upsert", response).await?;
        Ok(())
    }

    async fn select_ids(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("select", "id")])
            .send()
            .await?;
        let rows: Vec<IdRow> = Self::read("select ids", response).await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint.clone())
            .query(&[("id", in_filter(ids))])
            .send()
            .await?;
        Self::check("delete stale", response).await?;
        Ok(())
    }
}
