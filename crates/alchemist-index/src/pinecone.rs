use alchemist_config::{IndexConfig, RetryConfig};
use alchemist_core::error::ApiError;
use alchemist_core::http::{self, read_json, transport_error};
use alchemist_core::models::{IndexStats, ScoredMatch, VectorRecord};
use alchemist_core::retry::RetryPolicy;
use alchemist_core::traits::VectorStore;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const SERVICE: &str = "Pinecone";
const API_VERSION: &str = "2025-01";
pub const API_KEY_VAR: &str = "PINECONE_API_KEY";

const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const READY_POLL_ATTEMPTS: u32 = 60;

/// Control-plane view of one index
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    pub host: String,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<String>,
}

/// Pinecone serverless index over the REST API
///
/// The data-plane host is looked up once and cached.
pub struct PineconeStore {
    name: String,
    cloud: String,
    region: String,
    control_plane: String,
    api_key: String,
    upsert_batch_size: usize,
    client: reqwest::Client,
    retry: RetryPolicy,
    host: OnceCell<String>,
}

impl PineconeStore {
    pub fn new(config: &IndexConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            name: config.name.clone(),
            cloud: config.cloud.clone(),
            region: config.region.clone(),
            control_plane: config.control_plane.trim_end_matches('/').to_string(),
            api_key,
            upsert_batch_size: config.upsert_batch_size.max(1),
            client: http::client(config.timeout_secs)?,
            retry: RetryPolicy::none(),
            host: OnceCell::new(),
        })
    }

    /// Build from configuration, reading the key from `PINECONE_API_KEY`
    pub fn from_config(config: &IndexConfig, retry: &RetryConfig) -> Result<Self> {
        Ok(Self::new(config, http::api_key(API_KEY_VAR)?)?.with_retry(RetryPolicy::from(retry)))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let res = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        read_json(SERVICE, res).await
    }

    /// Describe this index, `None` when it does not exist
    pub async fn describe(&self) -> Result<Option<IndexDescription>> {
        let url = format!("{}/indexes/{}", self.control_plane, self.name);
        let result = self
            .retry
            .run("describe index", || self.send(self.client.get(&url)))
            .await;
        match result {
            Ok(json) => Ok(Some(parse_description(json)?)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create(&self, dimension: usize) -> Result<()> {
        let url = format!("{}/indexes", self.control_plane);
        let body = create_index_body(&self.name, dimension, &self.cloud, &self.region);
        info!(index = %self.name, dimension, cloud = %self.cloud, region = %self.region, "creating index");
        self.retry
            .run("create index", || self.send(self.client.post(&url).json(&body)))
            .await?;
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<IndexDescription> {
        for attempt in 1..=READY_POLL_ATTEMPTS {
            if let Some(description) = self.describe().await? {
                if description.status.ready && !description.host.is_empty() {
                    return Ok(description);
                }
            }
            debug!(index = %self.name, attempt, "waiting for index to become ready");
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        bail!(
            "index '{}' was not ready after {}s",
            self.name,
            READY_POLL_INTERVAL.as_secs() * READY_POLL_ATTEMPTS as u64
        )
    }

    async fn host(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                match self.describe().await? {
                    Some(description) => Ok(description.host),
                    None => Err(anyhow!(
                        "index '{}' does not exist; index a document first",
                        self.name
                    )),
                }
            })
            .await?;
        Ok(host.as_str())
    }

    async fn data_url(&self, path: &str) -> Result<String> {
        Ok(data_plane_url(self.host().await?, path))
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn ensure_index(&self, dimension: usize) -> Result<()> {
        let description = match self.describe().await? {
            Some(existing) => {
                if existing.dimension != dimension {
                    bail!(
                        "index '{}' has dimension {}, expected {}",
                        self.name,
                        existing.dimension,
                        dimension
                    );
                }
                info!(index = %self.name, "index already exists");
                existing
            }
            None => {
                self.create(dimension).await?;
                self.wait_until_ready().await?
            }
        };
        // A concurrent caller may have filled the cell first; the host is the same.
        let _ = self.host.set(description.host);
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let url = self.data_url("/vectors/upsert").await?;
        let total_batches = records.len().div_ceil(self.upsert_batch_size);
        let mut upserted = 0;

        for (i, batch) in records.chunks(self.upsert_batch_size).enumerate() {
            info!(
                batch = i + 1,
                total_batches,
                vectors = batch.len(),
                "uploading batch"
            );
            let body = upsert_body(batch)?;
            let json = self
                .retry
                .run("upsert", || self.send(self.client.post(&url).json(&body)))
                .await?;
            upserted += json["upsertedCount"].as_u64().unwrap_or(batch.len() as u64) as usize;
        }

        info!(index = %self.name, upserted, "upsert complete");
        Ok(upserted)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredMatch>> {
        let url = self.data_url("/query").await?;
        let body = query_body(vector, top_k);
        let json = self
            .retry
            .run("query", || self.send(self.client.post(&url).json(&body)))
            .await?;
        parse_matches(json)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let url = self.data_url("/describe_index_stats").await?;
        let body = json!({});
        let json = self
            .retry
            .run("describe index stats", || {
                self.send(self.client.post(&url).json(&body))
            })
            .await?;
        parse_stats(json)
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Status { status: 404, .. })
    )
}

pub fn data_plane_url(host: &str, path: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}{path}")
    } else {
        format!("https://{host}{path}")
    }
}

pub fn create_index_body(name: &str, dimension: usize, cloud: &str, region: &str) -> Value {
    json!({
        "name": name,
        "dimension": dimension,
        "metric": "cosine",
        "spec": { "serverless": { "cloud": cloud, "region": region } },
    })
}

pub fn upsert_body(records: &[VectorRecord]) -> Result<Value> {
    Ok(json!({ "vectors": serde_json::to_value(records)? }))
}

pub fn query_body(vector: &[f32], top_k: usize) -> Value {
    json!({
        "vector": vector,
        "topK": top_k,
        "includeMetadata": true,
        "includeValues": false,
    })
}

pub fn parse_description(json: Value) -> Result<IndexDescription> {
    serde_json::from_value(json).map_err(|e| ApiError::malformed(SERVICE, e.to_string()).into())
}

pub fn parse_matches(json: Value) -> Result<Vec<ScoredMatch>> {
    #[derive(Deserialize)]
    struct QueryResponse {
        #[serde(default)]
        matches: Vec<ScoredMatch>,
    }
    let parsed: QueryResponse =
        serde_json::from_value(json).map_err(|e| ApiError::malformed(SERVICE, e.to_string()))?;
    Ok(parsed.matches)
}

pub fn parse_stats(json: Value) -> Result<IndexStats> {
    let namespaces: BTreeMap<String, u64> = json["namespaces"]
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(name, ns)| (name.clone(), ns["vectorCount"].as_u64().unwrap_or(0)))
                .collect()
        })
        .unwrap_or_default();

    let total_vector_count = json["totalVectorCount"]
        .as_u64()
        .ok_or_else(|| ApiError::malformed(SERVICE, "missing totalVectorCount"))?;

    Ok(IndexStats {
        dimension: json["dimension"].as_u64().unwrap_or(0) as usize,
        total_vector_count,
        namespaces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemist_core::models::ChunkMetadata;
    use pretty_assertions::assert_eq;

    fn record(id: &str, source: Option<&str>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values: vec![0.25, 0.5],
            metadata: ChunkMetadata {
                chunk_index: 2,
                text: "The stone turns lead to gold.".to_string(),
                token_count: 7,
                overlap_token_count: 0,
                start_byte: 10,
                end_byte: 39,
                model: "text-embedding-3-large".to_string(),
                source: source.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_create_body() {
        assert_eq!(
            create_index_body("rag-alchemist", 3072, "aws", "us-east-1"),
            json!({
                "name": "rag-alchemist",
                "dimension": 3072,
                "metric": "cosine",
                "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } },
            })
        );
    }

    #[test]
    fn test_upsert_body_metadata() {
        let body = upsert_body(&[record("a-00002", Some("book.txt")), record("b", None)]).unwrap();
        let first = &body["vectors"][0];
        assert_eq!(first["id"], "a-00002");
        assert_eq!(first["values"], json!([0.25, 0.5]));
        assert_eq!(first["metadata"]["chunk_index"], 2);
        assert_eq!(first["metadata"]["source"], "book.txt");
        // Pinecone rejects null metadata values
        assert!(body["vectors"][1]["metadata"].get("source").is_none());
    }

    #[test]
    fn test_query_body() {
        let body = query_body(&[1.0, 0.0], 10);
        assert_eq!(body["topK"], 10);
        assert_eq!(body["includeMetadata"], true);
    }

    #[test]
    fn test_parse_matches() {
        let json = json!({
            "matches": [
                { "id": "x-00001", "score": 0.91, "metadata": { "text": "alpha", "chunk_index": 1 } },
                { "id": "x-00002", "score": 0.42 },
            ],
            "namespace": "",
        });
        let matches = parse_matches(json).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].metadata["text"], "alpha");
        assert!(matches[1].metadata.is_empty());
    }

    #[test]
    fn test_parse_stats() {
        let json = json!({
            "dimension": 3072,
            "indexFullness": 0.0,
            "totalVectorCount": 42,
            "namespaces": { "": { "vectorCount": 42 } },
        });
        let stats = parse_stats(json).unwrap();
        assert_eq!(stats.dimension, 3072);
        assert_eq!(stats.total_vector_count, 42);
        assert_eq!(stats.namespaces.get(""), Some(&42));
    }

    #[test]
    fn test_parse_description() {
        let json = json!({
            "name": "rag-alchemist",
            "dimension": 3072,
            "metric": "cosine",
            "host": "rag-alchemist-abc123.svc.aped-4627-b74a.pinecone.io",
            "status": { "ready": true, "state": "Ready" },
        });
        let description = parse_description(json).unwrap();
        assert!(description.status.ready);
        assert_eq!(
            data_plane_url(&description.host, "/query"),
            "https://rag-alchemist-abc123.svc.aped-4627-b74a.pinecone.io/query"
        );
        assert_eq!(data_plane_url("http://localhost:5080/", "/query"), "http://localhost:5080/query");
    }

    #[test]
    fn test_not_found_detection() {
        let err: anyhow::Error =
            ApiError::from_status(SERVICE, 404, "not found".into(), None).into();
        assert!(is_not_found(&err));
        assert!(!is_not_found(&anyhow!("other")));
    }
}
