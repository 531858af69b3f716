//! Season calendar containment and loading.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use lotus_sandbox_core::season::{Season, SeasonCalendar, SEASONS_FILE};

// ── Test helpers ────────────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(y: i32, m: u32, day: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, day, h, 0, 0).unwrap()
}

fn ramadan() -> SeasonCalendar {
    SeasonCalendar::new(vec![Season::new(
        "s1",
        "Ramadan",
        d("2024-03-10"),
        d("2024-04-09"),
        &["zakat", "travel", "quran_daily"],
    )])
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn containment_is_inclusive_at_date_granularity() {
    let calendar = ramadan();
    assert_eq!(calendar.active_seasons(at(2024, 3, 15, 12)).len(), 1);
    assert_eq!(calendar.active_seasons(at(2024, 3, 10, 0)).len(), 1);
    // Late on the last day still counts: containment is by date.
    assert_eq!(calendar.active_seasons(at(2024, 4, 9, 23)).len(), 1);
    assert!(calendar.active_seasons(at(2024, 4, 10, 0)).is_empty());
    assert!(calendar.active_seasons(at(2024, 3, 9, 23)).is_empty());
}

#[test]
fn overlapping_seasons_are_all_returned() {
    let calendar = SeasonCalendar::new(vec![
        Season::new("s1", "Ramadan", d("2024-03-10"), d("2024-04-09"), &["zakat"]),
        Season::new("s9", "Zakat Drive", d("2024-04-01"), d("2024-04-30"), &["zakat"]),
    ]);
    let active = calendar.active_seasons(at(2024, 4, 5, 9));
    let ids: Vec<&str> = active.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s9"]);
}

#[test]
fn empty_calendar_has_no_active_seasons() {
    let calendar = SeasonCalendar::empty();
    assert!(calendar.active_seasons(at(2024, 3, 15, 0)).is_empty());
}

#[test]
fn missing_file_yields_empty_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let calendar = SeasonCalendar::load_or_empty(&dir.path().join(SEASONS_FILE));
    assert!(calendar.is_empty());
}

#[test]
fn malformed_file_yields_empty_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SEASONS_FILE);
    std::fs::write(&path, "{ this is not json").unwrap();
    assert!(SeasonCalendar::load_or_empty(&path).is_empty());
}

#[test]
fn malformed_records_are_skipped_individually() {
    let text = r##"[
        {"id":"s1","name":"Ramadan","startDate":"2024-03-10","endDate":"2024-04-09",
         "boosts":["zakat"],"description":"Holy month","color":"#FFD54F"},
        {"id":"s2","name":"Broken","startDate":"not-a-date","endDate":"2024-04-12"},
        {"id":"s3","name":"Backwards","startDate":"2024-07-01","endDate":"2024-06-01"}
    ]"##;
    let calendar = SeasonCalendar::from_json(text);
    assert_eq!(calendar.len(), 1);
    let s = &calendar.seasons()[0];
    assert_eq!(s.name, "Ramadan");
    assert_eq!(s.color.as_deref(), Some("#FFD54F"));
}

#[test]
fn file_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SEASONS_FILE);
    let original = ramadan();
    std::fs::write(&path, serde_json::to_string(original.seasons()).unwrap()).unwrap();
    assert_eq!(SeasonCalendar::load_or_empty(&path), original);
}

#[test]
fn bundled_sandbox_calendar_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../sandbox-data")
        .join(SEASONS_FILE);
    let calendar = SeasonCalendar::load_or_empty(&path);
    assert_eq!(calendar.len(), 5);
    let active = calendar.active_seasons(at(2025, 3, 15, 12));
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Ramadan");
    assert!(calendar.active_seasons(at(2025, 6, 15, 12)).is_empty());
}
