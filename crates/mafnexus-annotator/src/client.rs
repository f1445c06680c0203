//! Annotation service client.
//!
//! Endpoints used (relative to the configured base URL):
//!   GET  /annotation/genomic/{chr,start,end,ref,alt}
//!   POST /annotation/genomic            (JSON array of genomic locations)
//!
//! Both take `isoformOverrideSource` and `fields` query parameters. Every
//! failure mode (transport, status, decode, empty payload, count mismatch)
//! surfaces as `AnnotationCallFailed` so the driver can classify it per record.

use std::time::Duration;

use async_trait::async_trait;
use mafnexus_common::{MafNexusError, Result};
use mafnexus_config::AnnotationConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::location::GenomicLocation;
use crate::models::AnnotationResponse;

const GENOMIC_PATH: &str = "annotation/genomic";

/// Common interface for variant annotation back ends.
#[async_trait]
pub trait AnnotationService: Send + Sync {
    async fn annotate(&self, location: &GenomicLocation) -> Result<AnnotationResponse>;

    /// Annotate several locations, one result per location in request order.
    /// The outer error fails the whole batch; an inner error fails only its
    /// own location.
    async fn annotate_batch(
        &self,
        locations: &[GenomicLocation],
    ) -> Result<Vec<Result<AnnotationResponse>>> {
        let mut out = Vec::with_capacity(locations.len());
        for location in locations {
            out.push(self.annotate(location).await);
        }
        Ok(out)
    }

    /// The URL reported for a location in the failure report.
    fn request_url(&self, location: &GenomicLocation) -> String;
}

fn call_failed(context: impl std::fmt::Display, err: impl std::fmt::Display) -> MafNexusError {
    MafNexusError::AnnotationCallFailed(format!("{}: {}", context, err))
}

/// A null, empty-object or empty-array payload carries no annotation.
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn decode(value: Value, context: &str) -> Result<AnnotationResponse> {
    if is_empty_payload(&value) {
        return Err(call_failed(context, "empty response"));
    }
    serde_json::from_value(value).map_err(|e| call_failed(context, e))
}

/// Pair a batch payload with its request. A count mismatch fails the batch;
/// an empty or undecodable element fails only its own location.
fn decode_batch(
    values: Vec<Value>,
    locations: &[GenomicLocation],
) -> Result<Vec<Result<AnnotationResponse>>> {
    if values.len() != locations.len() {
        return Err(call_failed(
            format!("batch of {}", locations.len()),
            format!("expected {} responses, got {}", locations.len(), values.len()),
        ));
    }
    Ok(values
        .into_iter()
        .zip(locations)
        .map(|(value, location)| decode(value, &location.encode()))
        .collect())
}

pub struct GenomeNexusClient {
    client: Client,
    base_url: Url,
    isoform_override_source: String,
    enrichment_fields: Vec<String>,
}

impl GenomeNexusClient {
    pub fn new(
        base_url: &str,
        isoform_override_source: impl Into<String>,
        enrichment_fields: Vec<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| {
            MafNexusError::Config(format!("invalid annotation base URL '{}': {}", base_url, e))
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            isoform_override_source: isoform_override_source.into(),
            enrichment_fields,
        })
    }

    pub fn from_config(config: &AnnotationConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.isoform_override_source.clone(),
            config.enrichment_fields.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("isoformOverrideSource", self.isoform_override_source.clone())];
        if !self.enrichment_fields.is_empty() {
            params.push(("fields", self.enrichment_fields.join(",")));
        }
        params
    }

    fn endpoint(&self, suffix: Option<&str>) -> Result<Url> {
        let path = match suffix {
            Some(key) => format!("{}/{}", GENOMIC_PATH, key),
            None => GENOMIC_PATH.to_string(),
        };
        self.base_url.join(&path).map_err(|e| call_failed(&path, e))
    }
}

#[async_trait]
impl AnnotationService for GenomeNexusClient {
    #[instrument(skip(self), fields(key = %location))]
    async fn annotate(&self, location: &GenomicLocation) -> Result<AnnotationResponse> {
        let key = location.encode();
        let url = self.endpoint(Some(&key))?;

        let value: Value = self
            .client
            .get(url)
            .query(&self.query_params())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| call_failed(&key, e))?
            .json()
            .await
            .map_err(|e| call_failed(&key, e))?;

        debug!("Annotation GET returned");
        decode(value, &key)
    }

    #[instrument(skip(self, locations), fields(n = locations.len()))]
    async fn annotate_batch(
        &self,
        locations: &[GenomicLocation],
    ) -> Result<Vec<Result<AnnotationResponse>>> {
        if locations.is_empty() {
            return Ok(vec![]);
        }
        let url = self.endpoint(None)?;
        let context = format!("batch of {}", locations.len());

        let values: Vec<Value> = self
            .client
            .post(url)
            .query(&self.query_params())
            .json(locations)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| call_failed(&context, e))?
            .json()
            .await
            .map_err(|e| call_failed(&context, e))?;

        debug!(n = values.len(), "Annotation POST returned");
        decode_batch(values, locations)
    }

    fn request_url(&self, location: &GenomicLocation) -> String {
        match self.endpoint(Some(&location.encode())) {
            Ok(mut url) => {
                url.query_pairs_mut().extend_pairs(self.query_params());
                url.to_string()
            }
            Err(_) => format!("{}{}/{}", self.base_url, GENOMIC_PATH, location.encode()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
