//! Loading the candidate hosts: a JSON list of universities and their domains.
use crate::network::ipv4_client_builder;
use anyhow::{Context, Result};
use log::debug;
use serde_derive::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Public list of world universities with their domains and country codes.
pub const UNIVERSITY_DATASET_URL: &str = "https://raw.githubusercontent.com/Hipo/university-domains-list/master/world_universities_and_domains.json";

/// Upper bound on downloading the dataset.
pub const DATASET_TIMEOUT: Duration = Duration::from_secs(60);

/// An organization and its domains. Only the first domain is ever probed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    /// Organization name.
    pub name: String,
    /// Domains in dataset order.
    #[serde(default)]
    pub domains: Vec<String>,
}

impl Candidate {
    /// The domain a scan targets, if the candidate has any.
    pub fn primary_domain(&self) -> Option<&str> {
        self.domains.first().map(String::as_str)
    }
}

/// One row of the dataset. Fields we do not use are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    /// Name and domains.
    #[serde(flatten)]
    pub candidate: Candidate,
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub alpha_two_code: Option<String>,
}

/// Where the dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    /// Downloaded over HTTP(S).
    Remote(String),
    /// Read from disk.
    File(PathBuf),
}

impl DatasetLocation {
    /// Anything with an http(s) scheme is downloaded, everything else is a path.
    pub fn parse(input: &str) -> Self {
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(input.to_owned())
        } else {
            Self::File(PathBuf::from(input))
        }
    }
}

/// Fetches the dataset and keeps the candidates belonging to `region`.
///
/// Any failure here is fatal for the run: without a candidate list there is
/// nothing to scan.
pub async fn load_candidates(location: &DatasetLocation, region: &str) -> Result<Vec<Candidate>> {
    let raw = match location {
        DatasetLocation::Remote(url) => download(url).await?,
        DatasetLocation::File(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read dataset file {}", path.display()))?,
    };

    let entries = parse_dataset(&raw)?;
    debug!("Dataset holds {} entries", entries.len());
    Ok(filter_by_region(entries, region))
}

async fn download(url: &str) -> Result<Vec<u8>> {
    let client = ipv4_client_builder()
        .timeout(DATASET_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download candidate list from {url}"))?
        .error_for_status()
        .with_context(|| format!("Candidate list request to {url} was refused"))?;

    let body = response
        .bytes()
        .await
        .context("Failed to read candidate list body")?;
    Ok(body.to_vec())
}

/// Decodes the dataset JSON array.
pub fn parse_dataset(raw: &[u8]) -> Result<Vec<DatasetEntry>> {
    serde_json::from_slice(raw).context("Failed to parse candidate list JSON")
}

/// Keeps entries whose country code equals `region`, in dataset order.
pub fn filter_by_region(entries: Vec<DatasetEntry>, region: &str) -> Vec<Candidate> {
    entries
        .into_iter()
        .filter(|entry| entry.alpha_two_code.as_deref() == Some(region))
        .map(|entry| entry.candidate)
        .collect()
}
