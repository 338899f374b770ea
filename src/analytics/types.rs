use chrono::NaiveDate;
use serde::Serialize;

// ── Visitors and page views ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorsAndPageViews {
    pub date: NaiveDate,
    pub page_title: String,
    pub visitors: i64,
    pub page_views: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalVisitorsAndPageViews {
    pub date: NaiveDate,
    pub visitors: i64,
    pub page_views: i64,
}

// ── Pages ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageViews {
    pub url: String,
    pub page_title: String,
    pub page_views: i64,
}

// ── Referrers ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Referrer {
    pub url: String,
    pub page_views: i64,
}

// ── Browsers ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Browser {
    pub browser: String,
    pub sessions: i64,
}
