//! Authored timeline rows expressed as JSON, converted to the core row model.
//!
//! Accepted shapes, either at the top level or under a `"rows"` key:
//!
//! ```json
//! [
//!   ["1990", "Founded", "<p>Start</p>", "img.png", "high"],
//!   ["2001", {"text": "Growth", "html": "<em>Growth</em>"}, null,
//!    {"media": {"kind": "picture", "src": "/hero.webp", "alt": "Hero"}}]
//! ]
//! ```
//!
//! A string cell is used as both text and markup. An object cell may carry
//! `text`, `html` and `media`; a missing `text` is derived from `html` by
//! dropping tags and decoding entities, the way a browser's `textContent`
//! reads the same cell. `null` is an empty cell.

use html_escape::decode_html_entities;
use serde_json::Value;
use timeline_core::{
    read_rows, EmbeddedMedia, MediaKind, RawCell, RawRow, TimelineError, TimelineItem,
};

/// Parse rows from a JSON string.
pub fn rows_from_str(rows_json: &str) -> Result<Vec<RawRow>, TimelineError> {
    let value: Value =
        serde_json::from_str(rows_json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    rows_from_value(&value)
}

/// Parse rows from a `serde_json::Value`.
pub fn rows_from_value(value: &Value) -> Result<Vec<RawRow>, TimelineError> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(map) => map
            .get("rows")
            .and_then(Value::as_array)
            .ok_or(TimelineError::MissingData)?,
        other => {
            return Err(TimelineError::Parse(format!(
                "Expected an array of rows, received {}",
                type_name(other)
            )))
        }
    };

    rows.iter()
        .enumerate()
        .map(|(row_idx, row)| match row {
            Value::Array(cells) => cells
                .iter()
                .enumerate()
                .map(|(cell_idx, cell)| {
                    parse_cell(cell).map_err(|reason| {
                        TimelineError::Parse(format!("row {row_idx}, cell {cell_idx}: {reason}"))
                    })
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(TimelineError::Parse(format!(
                "row {row_idx}: expected an array of cells, received {}",
                type_name(other)
            ))),
        })
        .collect()
}

/// Parse rows and read them into timeline items in one step.
pub fn items_from_str(rows_json: &str) -> Result<Vec<TimelineItem>, TimelineError> {
    Ok(read_rows(&rows_from_str(rows_json)?))
}

fn parse_cell(cell: &Value) -> Result<RawCell, String> {
    match cell {
        Value::Null => Ok(RawCell::default()),
        Value::String(text) => Ok(RawCell::text(text.as_str())),
        Value::Number(number) => Ok(RawCell::text(number.to_string())),
        Value::Bool(flag) => Ok(RawCell::text(flag.to_string())),
        Value::Object(map) => {
            let html = map.get("html").and_then(Value::as_str).map(str::to_string);
            let text = map
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| html.as_deref().map(text_content))
                .unwrap_or_default();
            let media = map.get("media").map(parse_media).transpose()?;

            Ok(RawCell {
                html: html.unwrap_or_else(|| text.clone()),
                text,
                media,
            })
        }
        Value::Array(_) => Err("nested arrays are not valid cells".to_string()),
    }
}

fn parse_media(value: &Value) -> Result<EmbeddedMedia, String> {
    let kind = match value.get("kind").and_then(Value::as_str).unwrap_or("image") {
        "image" | "img" => MediaKind::Image,
        "picture" => MediaKind::Picture,
        "video" => MediaKind::Video,
        other => return Err(format!("unknown media kind {other:?}")),
    };
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(EmbeddedMedia {
        kind,
        src: field("src"),
        current_src: field("current_src"),
        alt: field("alt"),
    })
}

/// Plain text of a markup fragment: tags dropped, entities decoded.
fn text_content(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            other if !in_tag => stripped.push(other),
            _ => {}
        }
    }
    decode_html_entities(&stripped).into_owned()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
