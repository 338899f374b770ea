pub mod types;

use crate::client::types::{Report, ReportQuery};
use crate::client::AnalyticsClient;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::period::Period;
use chrono::NaiveDate;
use std::sync::Arc;
use types::{Browser, PageViews, Referrer, TotalVisitorsAndPageViews, VisitorsAndPageViews};

/// Analytics queries against a single view.
pub struct Analytics {
    client: Arc<AnalyticsClient>,
    view_id: String,
}

impl Analytics {
    pub fn new(client: Arc<AnalyticsClient>, view_id: impl Into<String>) -> Self {
        Self {
            client,
            view_id: view_id.into(),
        }
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn client(&self) -> &Arc<AnalyticsClient> {
        &self.client
    }

    pub async fn fetch_visitors_and_page_views(
        &self,
        period: &Period,
    ) -> AnalyticsResult<Vec<VisitorsAndPageViews>> {
        let query = ReportQuery::metrics(["ga:users", "ga:pageviews"])
            .dimensions(["ga:date", "ga:pageTitle"]);
        let report = self.perform_query(period, &query).await?;

        report
            .rows
            .iter()
            .map(|row| {
                Ok(VisitorsAndPageViews {
                    date: parse_ga_date(row.dimension(0)?)?,
                    page_title: row.dimension(1)?.to_string(),
                    visitors: row.metric(0)?,
                    page_views: row.metric(1)?,
                })
            })
            .collect()
    }

    pub async fn fetch_total_visitors_and_page_views(
        &self,
        period: &Period,
    ) -> AnalyticsResult<Vec<TotalVisitorsAndPageViews>> {
        let query = ReportQuery::metrics(["ga:users", "ga:pageviews"]).dimensions(["ga:date"]);
        let report = self.perform_query(period, &query).await?;

        report
            .rows
            .iter()
            .map(|row| {
                Ok(TotalVisitorsAndPageViews {
                    date: parse_ga_date(row.dimension(0)?)?,
                    visitors: row.metric(0)?,
                    page_views: row.metric(1)?,
                })
            })
            .collect()
    }

    pub async fn fetch_most_visited_pages(
        &self,
        period: &Period,
        max_results: u32,
    ) -> AnalyticsResult<Vec<PageViews>> {
        let query = ReportQuery::metrics(["ga:pageviews"])
            .dimensions(["ga:pagePath", "ga:pageTitle"])
            .order_by_descending("ga:pageviews")
            .page_size(max_results);
        let report = self.perform_query(period, &query).await?;

        report
            .rows
            .iter()
            .map(|row| {
                Ok(PageViews {
                    url: row.dimension(0)?.to_string(),
                    page_title: row.dimension(1)?.to_string(),
                    page_views: row.metric(0)?,
                })
            })
            .collect()
    }

    pub async fn fetch_top_referrers(
        &self,
        period: &Period,
        max_results: u32,
    ) -> AnalyticsResult<Vec<Referrer>> {
        let query = ReportQuery::metrics(["ga:pageviews"])
            .dimensions(["ga:fullReferrer"])
            .order_by_descending("ga:pageviews")
            .page_size(max_results);
        let report = self.perform_query(period, &query).await?;

        report
            .rows
            .iter()
            .map(|row| {
                Ok(Referrer {
                    url: row.dimension(0)?.to_string(),
                    page_views: row.metric(0)?,
                })
            })
            .collect()
    }

    /// Top browsers by sessions. Past `max_results - 1` entries the rest are folded into "Others".
    pub async fn fetch_top_browsers(
        &self,
        period: &Period,
        max_results: u32,
    ) -> AnalyticsResult<Vec<Browser>> {
        let query = ReportQuery::metrics(["ga:sessions"])
            .dimensions(["ga:browser"])
            .order_by_descending("ga:sessions");
        let report = self.perform_query(period, &query).await?;

        let browsers = report
            .rows
            .iter()
            .map(|row| {
                Ok(Browser {
                    browser: row.dimension(0)?.to_string(),
                    sessions: row.metric(0)?,
                })
            })
            .collect::<AnalyticsResult<Vec<_>>>()?;

        Ok(summarize_top_browsers(browsers, max_results as usize))
    }

    /// Run an arbitrary query against this view.
    pub async fn perform_query(&self, period: &Period, query: &ReportQuery) -> AnalyticsResult<Report> {
        self.client.perform_query(&self.view_id, period, query).await
    }
}

fn parse_ga_date(raw: &str) -> AnalyticsResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map_err(|_| AnalyticsError::MalformedResponse(format!("invalid ga:date `{raw}`")))
}

fn summarize_top_browsers(browsers: Vec<Browser>, max_results: usize) -> Vec<Browser> {
    if browsers.len() <= max_results {
        return browsers;
    }

    let keep = max_results.saturating_sub(1);
    let mut iter = browsers.into_iter();
    let mut top: Vec<Browser> = iter.by_ref().take(keep).collect();
    let others: i64 = iter.map(|b| b.sessions).sum();
    top.push(Browser {
        browser: "Others".to_string(),
        sessions: others,
    });
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser(name: &str, sessions: i64) -> Browser {
        Browser {
            browser: name.to_string(),
            sessions,
        }
    }

    #[test]
    fn test_parse_ga_date() {
        assert_eq!(
            parse_ga_date("20240229").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            parse_ga_date("2024-02-29"),
            Err(AnalyticsError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_summarize_keeps_short_list() {
        let browsers = vec![browser("Chrome", 10), browser("Firefox", 5)];
        assert_eq!(summarize_top_browsers(browsers.clone(), 3), browsers);
    }

    #[test]
    fn test_summarize_folds_tail_into_others() {
        let browsers = vec![
            browser("Chrome", 10),
            browser("Firefox", 5),
            browser("Safari", 3),
            browser("Edge", 2),
        ];
        let summary = summarize_top_browsers(browsers, 3);
        assert_eq!(
            summary,
            vec![browser("Chrome", 10), browser("Firefox", 5), browser("Others", 5)]
        );
    }

    #[test]
    fn test_summarize_with_zero_max() {
        let summary = summarize_top_browsers(vec![browser("Chrome", 10), browser("Edge", 1)], 0);
        assert_eq!(summary, vec![browser("Others", 11)]);
    }
}
