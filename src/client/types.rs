use crate::error::{AnalyticsError, AnalyticsResult};
use crate::period::Period;
use serde::{Deserialize, Serialize};

/// What to ask the reporting API for, independent of view and period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub order_by: Vec<OrderBy>,
    pub page_size: Option<u32>,
    pub filters_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field_name: String,
    pub descending: bool,
}

impl ReportQuery {
    pub fn metrics<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn dimensions<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = dimensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by_descending(mut self, field: impl Into<String>) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.into(),
            descending: true,
        });
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn filters(mut self, expression: impl Into<String>) -> Self {
        self.filters_expression = Some(expression.into());
        self
    }

    /// Serialize as a `reports:batchGet` body for a single report.
    pub fn to_request_body(&self, view_id: &str, period: &Period) -> AnalyticsResult<String> {
        let request = BatchGetRequest {
            report_requests: vec![ReportRequest {
                view_id,
                date_ranges: vec![DateRange {
                    start_date: period.start_date().format("%Y-%m-%d").to_string(),
                    end_date: period.end_date().format("%Y-%m-%d").to_string(),
                }],
                metrics: self
                    .metrics
                    .iter()
                    .map(|m| Metric { expression: m })
                    .collect(),
                dimensions: self
                    .dimensions
                    .iter()
                    .map(|d| Dimension { name: d })
                    .collect(),
                order_bys: self
                    .order_by
                    .iter()
                    .map(|o| WireOrderBy {
                        field_name: &o.field_name,
                        sort_order: if o.descending { "DESCENDING" } else { "ASCENDING" },
                    })
                    .collect(),
                page_size: self.page_size,
                filters_expression: self.filters_expression.as_deref(),
            }],
        };
        Ok(serde_json::to_string(&request)?)
    }
}

// ── Wire format: request ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetRequest<'a> {
    report_requests: Vec<ReportRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest<'a> {
    view_id: &'a str,
    date_ranges: Vec<DateRange>,
    metrics: Vec<Metric<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dimensions: Vec<Dimension<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_bys: Vec<WireOrderBy<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters_expression: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DateRange {
    start_date: String,
    end_date: String,
}

#[derive(Serialize)]
struct Metric<'a> {
    expression: &'a str,
}

#[derive(Serialize)]
struct Dimension<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireOrderBy<'a> {
    field_name: &'a str,
    sort_order: &'static str,
}

// ── Wire format: response ──

#[derive(Debug, Deserialize)]
pub(crate) struct BatchGetResponse {
    #[serde(default)]
    pub(crate) reports: Vec<WireReport>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireReport {
    column_header: ColumnHeader,
    #[serde(default)]
    data: ReportData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnHeader {
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    metric_header: MetricHeader,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricHeader {
    #[serde(default)]
    metric_header_entries: Vec<MetricHeaderEntry>,
}

#[derive(Debug, Deserialize)]
struct MetricHeaderEntry {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReportData {
    #[serde(default)]
    rows: Vec<WireRow>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    metrics: Vec<DateRangeValues>,
}

#[derive(Debug, Deserialize)]
struct DateRangeValues {
    #[serde(default)]
    values: Vec<String>,
}

// ── Public report ──

/// A single report, flattened to one date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub dimension_headers: Vec<String>,
    pub metric_headers: Vec<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
}

impl From<WireReport> for Report {
    fn from(wire: WireReport) -> Self {
        Self {
            dimension_headers: wire.column_header.dimensions,
            metric_headers: wire
                .column_header
                .metric_header
                .metric_header_entries
                .into_iter()
                .map(|e| e.name)
                .collect(),
            rows: wire
                .data
                .rows
                .into_iter()
                .map(|row| ReportRow {
                    dimensions: row.dimensions,
                    metrics: row
                        .metrics
                        .into_iter()
                        .next()
                        .map(|m| m.values)
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl ReportRow {
    pub fn dimension(&self, index: usize) -> AnalyticsResult<&str> {
        self.dimensions
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| AnalyticsError::MalformedResponse(format!("row has no dimension {index}")))
    }

    pub fn metric(&self, index: usize) -> AnalyticsResult<i64> {
        let raw = self
            .metrics
            .get(index)
            .ok_or_else(|| AnalyticsError::MalformedResponse(format!("row has no metric {index}")))?;
        raw.parse::<i64>().map_err(|_| {
            AnalyticsError::MalformedResponse(format!("metric value `{raw}` is not an integer"))
        })
    }
}
