//! Bridge WASM <-> JavaScript cho khối timeline cuộn.

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
pub use dom::{decorate, dispose, Timeline};

use serde::Deserialize;
use serde_wasm_bindgen::from_value;
use timeline_core::{render_static, RenderMode, TimelineConfig, TimelineError};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsTimelineConfig {
    #[serde(default)]
    active_threshold: Option<f64>,
    #[serde(default)]
    keyboard_navigation: Option<bool>,
    #[serde(default)]
    scroll_handoff: Option<bool>,
    #[serde(default)]
    inject_styles: Option<bool>,
    #[serde(default)]
    preview_markers: Option<Vec<String>>,
}

impl From<JsTimelineConfig> for TimelineConfig {
    fn from(cfg: JsTimelineConfig) -> Self {
        let mut base = TimelineConfig::default();
        if let Some(threshold) = cfg.active_threshold {
            base.active_threshold = threshold;
        }
        if let Some(enabled) = cfg.keyboard_navigation {
            base.keyboard_navigation = enabled;
        }
        if let Some(enabled) = cfg.scroll_handoff {
            base.scroll_handoff = enabled;
        }
        if let Some(enabled) = cfg.inject_styles {
            base.inject_styles = enabled;
        }
        if let Some(markers) = cfg.preview_markers {
            base.preview_markers = markers;
        }
        base
    }
}

/// Đọc config từ JS; `undefined`/`null` dùng giá trị mặc định.
pub(crate) fn parse_config(config: Option<JsValue>) -> Result<TimelineConfig, JsValue> {
    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsTimelineConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            TimelineConfig::from(cfg)
        }
        _ => TimelineConfig::default(),
    };
    cfg.validate()
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;
    Ok(cfg)
}

/// Dựng markup tĩnh từ các hàng JSON, không cần DOM.
#[wasm_bindgen]
pub fn render_rows_html(
    rows: JsValue,
    preview: bool,
    config: Option<JsValue>,
) -> Result<String, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let rows_value = from_value::<serde_json::Value>(rows)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON rows: {err}")))?;
    let cfg = parse_config(config)?;

    let rows = timeline_rows::rows_from_value(&rows_value)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;

    render_static(&rows, RenderMode::detect(preview), &cfg)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))
}

pub(crate) fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}
