//! Ingestion queries through the Cloud Monitoring API

pub mod models;

use crate::client::RestClient;
use async_trait::async_trait;
use logbudget_common::{QueryWindow, SourceError, UsageSample, INGESTION_METRIC_TYPE};
use logbudget_core::MetricSource;
use models::{ListTimeSeriesResponse, TimeSeries};
use tracing::{debug, instrument, warn};
use url::Url;

/// Resource label naming the project a series belongs to
const PROJECT_LABEL: &str = "project_id";

/// Metric label naming the monitored resource type that produced the logs
const RESOURCE_TYPE_LABEL: &str = "resource_type";

/// Used when a series carries no resource type label
pub const UNKNOWN_RESOURCE_TYPE: &str = "unknown";

#[derive(Clone)]
pub struct MonitoringClient {
    rest: RestClient,
    base_url: String,
}

impl MonitoringClient {
    pub fn new(rest: RestClient, base_url: &str) -> Self {
        Self {
            rest,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(
        &self,
        project_id: &str,
        window: &QueryWindow,
        page_token: Option<&str>,
    ) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}/v3/projects/{}/timeSeries", self.base_url, project_id))
            .map_err(|e| SourceError::Config(format!("invalid monitoring URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("filter", &format!("metric.type=\"{}\"", INGESTION_METRIC_TYPE))
                .append_pair("interval.startTime", &window.start_rfc3339())
                .append_pair("interval.endTime", &window.end_rfc3339());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }
}

/// Turn one series into a sample, or `None` if it is unusable.
pub fn series_to_sample(series: TimeSeries) -> Option<UsageSample> {
    let TimeSeries {
        mut metric,
        mut resource,
        points,
    } = series;

    let Some(project_id) = resource.labels.remove(PROJECT_LABEL) else {
        warn!(metric = %metric.metric_type, "Dropping series without a project_id label");
        return None;
    };

    let resource_type = metric
        .labels
        .remove(RESOURCE_TYPE_LABEL)
        .unwrap_or_else(|| UNKNOWN_RESOURCE_TYPE.to_string());

    let Some(point) = points.into_iter().next() else {
        warn!(project_id = %project_id, resource_type = %resource_type, "Dropping series without points");
        return None;
    };

    let bytes = match point.value.int64_value.as_ref().and_then(|v| v.as_i64()) {
        Some(value) => match u64::try_from(value) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!(project_id = %project_id, resource_type = %resource_type, value, "Dropping series with a negative value");
                return None;
            }
        },
        None => {
            warn!(project_id = %project_id, resource_type = %resource_type, "Dropping series without an int64 value");
            return None;
        }
    };

    Some(UsageSample::new(project_id, resource_type, bytes))
}

#[async_trait]
impl MetricSource for MonitoringClient {
    #[instrument(skip(self, window))]
    async fn fetch_ingestion_samples(
        &self,
        project_id: &str,
        window: &QueryWindow,
    ) -> Result<Vec<UsageSample>, SourceError> {
        let mut samples = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.page_url(project_id, window, page_token.as_deref())?;
            let page: ListTimeSeriesResponse = self.rest.get_json(url).await?;

            debug!(
                project_id,
                series = page.time_series.len(),
                "Received time series page"
            );
            samples.extend(page.time_series.into_iter().filter_map(series_to_sample));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(samples)
    }
}
