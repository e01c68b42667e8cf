//! End-to-end pipeline tests: load → filter → sort → page → summarize →
//! export, driven through the public session API.

use tally::filter::{FilterCriteria, apply_filters};
use tally::pagination::{NO_RECORDS, Pagination};
use tally::records::store::parse_records;
use tally::records::{Record, export_snapshot};
use tally::session::Session;
use tally::table::progress_percent;

fn two_records() -> Vec<Record> {
    parse_records(
        r#"[
            {"date": "01/01/2025", "daysGoneBy": "3 days"},
            {"date": "15/06/2025", "daysGoneBy": "10 days"}
        ]"#,
        "inline",
    )
    .unwrap()
}

fn numbered(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| Record::new(&format!("{:02}/03/2025", i), Some("12:00"), &format!("{i} days")))
        .collect()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn two_record_dashboard() {
    let view = Session::new(10).with_loaded(two_records()).render();

    assert_eq!(view.rows[0].date, "15/06/2025");
    assert_eq!(view.rows[0].time, "-");
    assert_eq!(view.rows[0].progress, 100);
    assert_eq!(view.rows[1].progress, 30);
    assert_eq!(view.summary.average_duration, "6.5 days");
    assert_eq!(view.summary.last_record, "15/06/2025");
    assert_eq!(view.controls.info, "Page 1 of 1 (2 records)");
}

#[test]
fn twenty_three_records_three_pages() {
    let session = Session::new(10).with_loaded(numbered(23));
    let view = session.render();
    assert_eq!(view.controls.total_pages, 3);
    assert_eq!(view.rows.len(), 10);
    assert_eq!(view.rows[0].date, "23/03/2025");
    assert!(view.controls.previous_disabled);
    assert!(!view.controls.next_disabled);

    let last = session.with_next_page().with_next_page();
    let view = last.render();
    assert_eq!(view.rows.len(), 3);
    assert_eq!(view.rows[2].date, "01/03/2025");
    assert_eq!(view.controls.info, "Page 3 of 3 (23 records)");
    assert!(view.controls.next_disabled);

    assert_eq!(last.with_next_page().pagination(), last.pagination());
    assert_eq!(
        session.with_previous_page().pagination(),
        session.pagination()
    );
}

#[test]
fn empty_view_has_no_pages() {
    let session = Session::new(10)
        .with_loaded(numbered(5))
        .with_filters(FilterCriteria {
            year: Some("1999".to_string()),
            ..Default::default()
        });
    let view = session.render();

    assert_eq!(view.controls.total_pages, 0);
    assert_eq!(view.controls.info, NO_RECORDS);
    assert_eq!(view.summary.average_duration, "-");
    assert_eq!(view.summary.last_record, "-");
    assert_eq!(session.with_next_page().pagination().page(), 1);
    assert_eq!(session.with_previous_page().pagination().page(), 1);
}

#[test]
fn progress_indicator_values() {
    assert_eq!(progress_percent(&Record::new("01/01/2025", None, "7 days")), 70);
    assert_eq!(progress_percent(&Record::new("01/01/2025", None, "15 days")), 100);
    assert_eq!(progress_percent(&Record::new("01/01/2025", None, "abc")), 0);
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn filtering_is_idempotent() {
    let records = numbered(23);
    let criteria = FilterCriteria {
        duration: Some("1".to_string()),
        ..Default::default()
    };

    let once = apply_filters(&records, &criteria);
    let twice = apply_filters(&once, &criteria);
    assert_eq!(once, twice);
    assert!(once.iter().all(|r| records.contains(r)));
}

#[test]
fn reset_restores_everything_after_filtering() {
    let loaded = Session::new(10).with_loaded(numbered(23));
    let filtered = loaded
        .with_filters(FilterCriteria {
            date: Some("05/03/2025".to_string()),
            ..Default::default()
        })
        .with_next_page();
    assert_eq!(filtered.view().len(), 1);

    let reset = filtered.with_reset();
    assert_eq!(reset.view(), loaded.view());
    assert_eq!(reset.pagination(), Pagination::new(10));
    assert!(reset.criteria().is_empty());
}

#[test]
fn equal_instants_keep_load_order() {
    let mut records = vec![
        Record::new("01/02/2025", Some("10:00"), "first"),
        Record::new("01/02/2025", Some("10:00"), "second"),
        Record::new("bad date", None, "unparseable"),
        Record::new("02/02/2025", None, "newest"),
    ];
    records.push(Record::new("01/02/2025", Some("10:00"), "third"));

    let session = Session::new(10).with_loaded(records);
    let order: Vec<&str> = session
        .view()
        .iter()
        .map(|r| r.days_gone_by.as_str())
        .collect();
    assert_eq!(order, ["newest", "first", "second", "third", "unparseable"]);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_serializes_the_active_view() {
    let session = Session::new(10)
        .with_loaded(two_records())
        .with_filters(FilterCriteria {
            month: Some("1".to_string()),
            ..Default::default()
        });

    let json = export_snapshot(session.view()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["date"], "01/01/2025");
    assert_eq!(parsed[0]["daysGoneBy"], "3 days");
    assert!(json.contains("\n  "));
}

#[test]
fn export_reproduces_source_objects() {
    let source = r#"[
  {
    "daysGoneBy": 10,
    "date": "15/06/2025",
    "time": null,
    "note": {"by": "me"}
  },
  {
    "daysGoneBy": "2 days"
  }
]"#;
    let records = parse_records(source, "inline").unwrap();
    assert_eq!(records[0].days_gone_by, "10");
    assert_eq!(records[0].day_count(), 10);
    assert_eq!(records[1].date, "");

    let session = Session::new(10).with_loaded(records);
    let json = export_snapshot(session.view()).unwrap();
    let exported: serde_json::Value = serde_json::from_str(&json).unwrap();
    let original: serde_json::Value = serde_json::from_str(source).unwrap();

    assert_eq!(exported, original);
    assert_eq!(exported[0]["daysGoneBy"], 10);
    assert!(exported[0]["time"].is_null());
    assert!(exported[1].get("date").is_none());
    assert!(json.find("\"daysGoneBy\"").unwrap() < json.find("\"date\"").unwrap());
}
