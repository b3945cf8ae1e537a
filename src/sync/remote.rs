use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Minimal client for a PostgREST-style table store. Rows live in per-user
/// tables addressed as `{base}/rest/v1/{table}`; every request carries the
/// project api key plus the session's bearer token.
#[derive(Clone)]
pub struct TableClient {
    base_url: String,
    api_key: String,
    access_token: String,
    http: Client,
}

impl TableClient {
    pub fn new(base_url: &str, api_key: &str, access_token: &str) -> Result<Self, String> {
        let http = Client::builder()
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: access_token.to_string(),
            http,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
    }

    /// All rows the user owns in a table.
    pub async fn select_owned<T: DeserializeOwned>(
        &self,
        table: &str,
        user_id: Uuid,
    ) -> Result<Vec<T>, String> {
        let url = format!("{}?user_id=eq.{}&select=*", self.table_url(table), user_id);
        let resp = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| format!("SELECT {} failed: {}", table, e))?;

        if !resp.status().is_success() {
            return Err(format!("SELECT {} returned {}", table, resp.status()));
        }

        resp.json::<Vec<T>>()
            .await
            .map_err(|e| format!("Failed to decode {} rows: {}", table, e))
    }

    /// Rows whose `column` equals one of `ids`. An empty id list short-circuits
    /// to an empty result without a request.
    pub async fn select_where_in<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        ids: &[Uuid],
    ) -> Result<Vec<T>, String> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let list = ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}?{}=in.({})&select=*",
            self.table_url(table),
            column,
            list
        );
        let resp = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| format!("SELECT {} failed: {}", table, e))?;

        if !resp.status().is_success() {
            return Err(format!("SELECT {} returned {}", table, resp.status()));
        }

        resp.json::<Vec<T>>()
            .await
            .map_err(|e| format!("Failed to decode {} rows: {}", table, e))
    }

    pub async fn insert(&self, table: &str, row: &Value) -> Result<(), String> {
        let resp = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| format!("INSERT into {} failed: {}", table, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("INSERT into {} returned {}: {}", table, status, text));
        }
        Ok(())
    }

    /// Insert that overwrites an existing row with the same primary key.
    pub async fn upsert(&self, table: &str, row: &Value) -> Result<(), String> {
        let resp = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| format!("UPSERT into {} failed: {}", table, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("UPSERT into {} returned {}: {}", table, status, text));
        }
        Ok(())
    }

    pub async fn update(&self, table: &str, id: Uuid, row: &Value) -> Result<(), String> {
        let url = format!("{}?id=eq.{}", self.table_url(table), id);
        let resp = self
            .authed(self.http.patch(&url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| format!("UPDATE {} failed: {}", table, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("UPDATE {} returned {}: {}", table, status, text));
        }
        Ok(())
    }

    pub async fn delete(&self, table: &str, id: Uuid) -> Result<(), String> {
        let url = format!("{}?id=eq.{}", self.table_url(table), id);
        self.delete_url(table, &url).await
    }

    /// Delete every row whose `column` equals `id` (child-row cleanup).
    pub async fn delete_where(&self, table: &str, column: &str, id: Uuid) -> Result<(), String> {
        let url = format!("{}?{}=eq.{}", self.table_url(table), column, id);
        self.delete_url(table, &url).await
    }

    async fn delete_url(&self, table: &str, url: &str) -> Result<(), String> {
        let resp = self
            .authed(self.http.delete(url))
            .send()
            .await
            .map_err(|e| format!("DELETE from {} failed: {}", table, e))?;

        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
            s => Err(format!("DELETE from {} returned {}", table, s)),
        }
    }
}
