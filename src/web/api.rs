//! JSON API handlers for the web dashboard.
//!
//! State-changing handlers replace the dashboard session and answer with the
//! freshly rendered view, so the page redraws from a single response.

use anyhow::Result;

use crate::activity::ActivityKind;
use crate::datetime;
use crate::filter::FilterCriteria;
use crate::records::{export_file_name, export_snapshot};

use super::{Dashboard, Reply};

const DEFAULT_ACTIVITY_LIMIT: usize = 20;

/// Parse the `?limit=N` query parameter from a URL.
fn parse_limit_param(url: &str) -> Option<usize> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "limit" { v.parse().ok() } else { None }
    })
}

fn view_reply(dashboard: &Dashboard) -> Result<Reply> {
    Reply::json(&dashboard.session.render())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// `GET /api/counter`: start, now and elapsed days.
pub fn get_counter(dashboard: &Dashboard) -> Result<Reply> {
    Reply::json(&dashboard.counter.tick(dashboard.clock.as_ref()))
}

/// `GET /api/view`: current page, controls, summary and criteria.
pub fn get_view(dashboard: &Dashboard) -> Result<Reply> {
    view_reply(dashboard)
}

/// `GET /api/activity?limit=N`: most recent activity log entries.
pub fn get_activity(dashboard: &Dashboard, url: &str) -> Result<Reply> {
    let limit = parse_limit_param(url).unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    Reply::json(&dashboard.activity.recent(limit))
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// `POST /api/filters`: body is a JSON object of optional criteria.
pub fn post_filters(dashboard: &mut Dashboard, body: &str) -> Result<Reply> {
    let criteria: FilterCriteria = match serde_json::from_str(body) {
        Ok(criteria) => criteria,
        Err(e) => return Ok(Reply::error(400, &format!("invalid filter criteria: {e}"))),
    };

    dashboard.session = dashboard.session.with_filters(criteria);
    let session = &dashboard.session;
    dashboard.activity.record(
        ActivityKind::Filter,
        session.criteria().describe(),
        Some(session.view().len()),
    );

    view_reply(dashboard)
}

/// `POST /api/filters/reset`: clear criteria, show every record.
pub fn post_reset(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.session = dashboard.session.with_reset();
    dashboard.activity.record(
        ActivityKind::Reset,
        "",
        Some(dashboard.session.view().len()),
    );

    view_reply(dashboard)
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// `POST /api/page/next`
pub fn post_next_page(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.session = dashboard.session.with_next_page();
    view_reply(dashboard)
}

/// `POST /api/page/prev`
pub fn post_previous_page(dashboard: &mut Dashboard) -> Result<Reply> {
    dashboard.session = dashboard.session.with_previous_page();
    view_reply(dashboard)
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// `POST /api/refresh`: reload from the data source.
///
/// A failed load answers 502 and keeps the records already shown.
pub fn post_refresh(dashboard: &mut Dashboard) -> Result<Reply> {
    match dashboard.refresh() {
        Ok(_) => view_reply(dashboard),
        Err(e) => Ok(Reply::error(502, &e.to_string())),
    }
}

/// `GET /api/export`: the active view as a downloadable JSON file.
pub fn get_export(dashboard: &Dashboard) -> Result<Reply> {
    let view = dashboard.session.view();
    let body = match export_snapshot(view) {
        Ok(body) => body,
        Err(e) => {
            dashboard
                .activity
                .record(ActivityKind::ExportFailed, e.to_string(), None);
            return Ok(Reply::error(500, &e.to_string()));
        }
    };

    let name = export_file_name(&dashboard.config.export.prefix, datetime::local_now().date());
    dashboard
        .activity
        .record(ActivityKind::Export, name.as_str(), Some(view.len()));

    Ok(Reply::attachment(name, body.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_param_parsing() {
        assert_eq!(parse_limit_param("/api/activity?limit=5"), Some(5));
        assert_eq!(parse_limit_param("/api/activity?x=1&limit=7"), Some(7));
        assert_eq!(parse_limit_param("/api/activity"), None);
        assert_eq!(parse_limit_param("/api/activity?limit=abc"), None);
    }
}
