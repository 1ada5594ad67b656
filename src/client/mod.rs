//! HTTP client for the smart-home REST backend.
//!
//! Every call waits (bounded) for an auth token, holds an in-flight guard on
//! the shared [`RequestContext`] while the request is outstanding, and tags
//! the request with a fresh `X-Request-Id`.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::models::{DateRange, Device, DevicePatch, DeviceUsage, EnergyRecord, Tag, TimePeriod};

mod context;
mod error;

pub use context::{InFlight, RequestContext};
pub use error::ClientError;

// ---

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    context: RequestContext,
    auth_wait: Duration,
}

impl BackendClient {
    /// Build a client for `base_url` with a per-request `timeout`.
    pub fn new(
        base_url: &str,
        context: RequestContext,
        auth_wait: Duration,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        // ---
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(BackendClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            context,
            auth_wait,
        })
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// `GET /devices/usage/` for every device over `range`.
    #[tracing::instrument(skip(self))]
    pub async fn device_usage(
        &self,
        range: DateRange,
        period: TimePeriod,
    ) -> Result<Vec<DeviceUsage>, ClientError> {
        // ---
        let req = self.http.get(self.url("/devices/usage/")).query(&[
            ("rangeStart", range.start.to_string()),
            ("rangeEnd", range.end.to_string()),
            ("timePeriod", period.as_str().to_string()),
        ]);
        self.send(req).await
    }

    /// `GET /devices/`
    #[tracing::instrument(skip(self))]
    pub async fn devices(&self) -> Result<Vec<Device>, ClientError> {
        self.send(self.http.get(self.url("/devices/"))).await
    }

    /// `PATCH /devices/{id}/`, returning the updated device.
    #[tracing::instrument(skip(self))]
    pub async fn update_device(
        &self,
        device_id: i64,
        patch: &DevicePatch,
    ) -> Result<Device, ClientError> {
        // ---
        let url = self.url(&format!("/devices/{}/", device_id));
        self.send(self.http.patch(url).json(patch)).await
    }

    /// `GET /tags/`
    #[tracing::instrument(skip(self))]
    pub async fn tags(&self) -> Result<Vec<Tag>, ClientError> {
        self.send(self.http.get(self.url("/tags/"))).await
    }

    /// `GET /energy/` over `range`.
    #[tracing::instrument(skip(self))]
    pub async fn energy(
        &self,
        range: DateRange,
        period: TimePeriod,
    ) -> Result<Vec<EnergyRecord>, ClientError> {
        // ---
        let req = self.http.get(self.url("/energy/")).query(&[
            ("startDate", range.start.to_string()),
            ("endDate", range.end.to_string()),
            ("timePeriod", period.as_str().to_string()),
        ]);
        self.send(req).await
    }

    // ---

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        // ---
        // Waiting for a token counts as loading
        let _in_flight = self.context.begin();
        let token = self.context.wait_for_auth(self.auth_wait).await?;

        let request_id = Uuid::new_v4();
        let response = req
            .bearer_auth(token)
            .header("X-Request-Id", request_id.to_string())
            .send()
            .await?;

        let status = response.status();
        let url = response.url().to_string();
        tracing::debug!(%request_id, %status, "Backend responded for {}", url);

        if !status.is_success() {
            tracing::error!(%request_id, "Backend returned {} for {}", status, url);
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
