use async_trait::async_trait;
use gradinsight_protocol::{
    AnalyticsKind, DispersionData, DispersionRequest, EmploymentData, EmploymentRequest, Envelope,
    MetadataRow, SalaryComparisonData, SalaryComparisonRequest, YearsRange,
};
use gradinsight_selection::AnalyticsRequest;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} failed: HTTP {status}{}", body_suffix(.body))]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The service answered `{"error": ...}`; the message is shown verbatim.
    #[error("{0}")]
    Domain(String),
}

fn body_suffix(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", body.trim())
    }
}

/// Reply to one analytics request, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsReply {
    Employment(EmploymentData),
    SalaryComparison(SalaryComparisonData),
    SalaryDispersion(DispersionData),
}

/// The remote metadata and analytics service.
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn metadata_full(&self) -> Result<Vec<MetadataRow>>;

    async fn metadata_years(&self) -> Result<YearsRange>;

    async fn legacy_universities(&self) -> Result<Vec<String>>;

    async fn legacy_degrees(&self) -> Result<Vec<String>>;

    async fn employment(&self, request: &EmploymentRequest) -> Result<EmploymentData>;

    async fn salary_comparison(
        &self,
        request: &SalaryComparisonRequest,
    ) -> Result<SalaryComparisonData>;

    /// Non-2xx replies count as "no data" and yield an empty series list.
    async fn salary_dispersion(&self, request: &DispersionRequest) -> Result<DispersionData>;

    async fn execute(&self, request: &AnalyticsRequest) -> Result<AnalyticsReply> {
        match request {
            AnalyticsRequest::Employment(r) => {
                self.employment(r).await.map(AnalyticsReply::Employment)
            }
            AnalyticsRequest::SalaryComparison(r) => self
                .salary_comparison(r)
                .await
                .map(AnalyticsReply::SalaryComparison),
            AnalyticsRequest::SalaryDispersion(r) => self
                .salary_dispersion(r)
                .await
                .map(AnalyticsReply::SalaryDispersion),
        }
    }
}

/// `AnalyticsService` over JSON/HTTP.
pub struct HttpService {
    client: Client,
    base_url: String,
}

impl HttpService {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().build().map_err(ClientError::Build)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|source| network(path, source))?;
        decode(path, response).await
    }
}

fn network(endpoint: &str, source: reqwest::Error) -> ClientError {
    ClientError::Network {
        endpoint: endpoint.to_string(),
        source,
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| network(endpoint, source))?;
    if !status.is_success() {
        return Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|err| ClientError::Decode {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    })
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T> {
    envelope.into_result().map_err(ClientError::Domain)
}

#[async_trait]
impl AnalyticsService for HttpService {
    async fn metadata_full(&self) -> Result<Vec<MetadataRow>> {
        let rows: Vec<MetadataRow> = self.get_json("/metadata/full").await?;
        log::debug!("Fetched {} metadata rows", rows.len());
        Ok(rows)
    }

    async fn metadata_years(&self) -> Result<YearsRange> {
        self.get_json("/metadata/years").await
    }

    async fn legacy_universities(&self) -> Result<Vec<String>> {
        self.get_json("/metadata/universities").await
    }

    async fn legacy_degrees(&self) -> Result<Vec<String>> {
        self.get_json("/metadata/degrees").await
    }

    async fn employment(&self, request: &EmploymentRequest) -> Result<EmploymentData> {
        let endpoint = AnalyticsKind::Employment.endpoint();
        let response = self
            .client
            .post(self.url(endpoint))
            .json(request)
            .send()
            .await
            .map_err(|source| network(endpoint, source))?;
        unwrap_envelope(decode(endpoint, response).await?)
    }

    async fn salary_comparison(
        &self,
        request: &SalaryComparisonRequest,
    ) -> Result<SalaryComparisonData> {
        let endpoint = AnalyticsKind::SalaryComparison.endpoint();
        let response = self
            .client
            .get(self.url(endpoint))
            .query(&request.query_pairs())
            .send()
            .await
            .map_err(|source| network(endpoint, source))?;
        unwrap_envelope(decode(endpoint, response).await?)
    }

    async fn salary_dispersion(&self, request: &DispersionRequest) -> Result<DispersionData> {
        let endpoint = AnalyticsKind::SalaryDispersion.endpoint();
        let response = self
            .client
            .post(self.url(endpoint))
            .json(request)
            .send()
            .await
            .map_err(|source| network(endpoint, source))?;
        if !response.status().is_success() {
            log::warn!(
                "{endpoint} answered HTTP {}; treating as no data",
                response.status().as_u16()
            );
            return Ok(DispersionData {
                year: Some(request.year),
                series: Vec::new(),
            });
        }
        unwrap_envelope(decode(endpoint, response).await?)
    }
}
