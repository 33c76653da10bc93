use std::fs;

use pretty_assertions::assert_eq;
use serde_json::Value;
use timeline_core::{render_static, RenderMode, TimelineConfig};
use timeline_rows::{items_from_str, rows_from_str};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

#[test]
fn company_rows_match_golden_items() {
    let items = items_from_str(&read_fixture("company_rows.json")).expect("rows should parse");

    let actual = serde_json::to_value(&items).expect("items should serialize");
    let expected: Value =
        serde_json::from_str(&read_fixture("company_items.json")).expect("golden is valid JSON");

    assert_eq!(actual, expected);
}

#[test]
fn published_markup_alternates_sides_and_marks_first_active() {
    let rows = rows_from_str(&read_fixture("company_rows.json")).expect("rows should parse");
    let html = render_static(&rows, RenderMode::Published, &TimelineConfig::default())
        .expect("default config is valid");

    assert_eq!(html.matches(r#"<section class="t-item"#).count(), 4);
    assert_eq!(html.matches("is-active").count(), 1);
    assert!(html.starts_with(
        r#"<section class="t-item is-active" role="group" data-index="0" data-side="left">"#
    ));
    assert!(html.contains(r#"data-index="1" data-side="right""#));
    assert!(html.contains(r#"data-index="2" data-side="left""#));
    assert!(html.contains(r#"data-index="3" data-side="right""#));
    assert_eq!(html.matches(r#"<div class="t-scrim"></div>"#).count(), 4);
    assert_eq!(html.matches(r#"fetchpriority="high""#).count(), 1);
    assert_eq!(html.matches(r#"loading="lazy""#).count(), 2);
    // "Present day" has no year, body or image.
    assert_eq!(html.matches(r#"<span class="t-year">"#).count(), 3);
    assert_eq!(html.matches(r#"<div class="t-body">"#).count(), 2);
    assert_eq!(html.matches("<img").count(), 3);
}

#[test]
fn preview_markup_is_static() {
    let rows = rows_from_str(&read_fixture("company_rows.json")).expect("rows should parse");
    let html = render_static(&rows, RenderMode::Preview, &TimelineConfig::default())
        .expect("default config is valid");

    assert_eq!(html.matches(r#"<section class="t-item""#).count(), 4);
    assert!(!html.contains("t-scrim"));
    assert!(!html.contains("is-active"));
    assert!(!html.contains("loading="));
    assert!(!html.contains("fetchpriority"));
}

#[test]
fn empty_rows_render_nothing() {
    let rows = rows_from_str(r#"[[], ["", "", "", ""]]"#).expect("rows should parse");
    assert!(rows.iter().all(|row| row.iter().all(|cell| cell.text.is_empty())));

    let html = render_static(&rows, RenderMode::Published, &TimelineConfig::default())
        .expect("default config is valid");
    assert_eq!(html, "");
}
