#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use web_sys::Document;

const STYLE_TAG_SELECTOR: &str = "style[data-timeline-block]";

/// Stylesheet mặc định cho các class `t-*`, dễ ghi đè qua biến CSS.
pub const DEFAULT_STYLES: &str = r#"
.timeline {
  --timeline-text: #ffffff;
  --timeline-scrim: linear-gradient(180deg, rgba(0, 0, 0, 0) 30%, rgba(0, 0, 0, 0.72) 100%);
  --timeline-year-bg: rgba(255, 255, 255, 0.16);
  --timeline-content-width: min(560px, 86vw);
  --timeline-gutter: clamp(24px, 6vw, 96px);
}

.timeline .t-item {
  position: relative;
  display: flex;
  align-items: flex-end;
  min-height: 100vh;
  overflow: hidden;
  scroll-snap-align: start;
  color: var(--timeline-text);
}

.timeline .t-item[data-side="right"] {
  justify-content: flex-end;
}

.timeline .t-media,
.timeline .t-scrim {
  position: absolute;
  inset: 0;
}

.timeline .t-media img {
  width: 100%;
  height: 100%;
  object-fit: cover;
  transform: scale(1.04);
  transition: transform 1.2s ease;
}

.timeline .t-item.is-active .t-media img {
  transform: scale(1);
}

.timeline .t-scrim {
  background: var(--timeline-scrim);
  pointer-events: none;
}

.timeline .t-content {
  position: relative;
  max-width: var(--timeline-content-width);
  margin: var(--timeline-gutter);
  opacity: 0.35;
  transform: translateY(24px);
  transition: opacity 0.6s ease, transform 0.6s ease;
}

.timeline .t-item.is-active .t-content {
  opacity: 1;
  transform: none;
}

.timeline .t-year {
  display: inline-block;
  padding: 4px 12px;
  border-radius: 999px;
  background: var(--timeline-year-bg);
  font-weight: 700;
  font-variant-numeric: tabular-nums;
}

.timeline .t-title {
  margin: 12px 0 8px;
  font-size: clamp(1.6rem, 3.4vw, 2.6rem);
}

.timeline .t-exit {
  height: 1px;
}

@media (prefers-reduced-motion: reduce) {
  .timeline .t-media img,
  .timeline .t-content {
    transition: none;
    transform: none;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-timeline-block", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el)?;

    Ok(())
}
