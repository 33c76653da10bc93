//! Logic lõi của khối timeline cuộn toàn màn hình.

mod decorator;
mod item;
mod panel;
mod tracker;

use serde::{Deserialize, Serialize};

pub use decorator::{render_static, Decoration, Decorator, Layout};
pub use item::{read_rows, EmbeddedMedia, MediaKind, MediaRef, RawCell, RawRow, TimelineItem};
pub use panel::{
    build_panel, escape_html, LoadHints, Loading, PanelImage, PanelSpec, Side, ACTIVE_CLASS,
    BODY_CLASS, CONTENT_CLASS, EXIT_CLASS, ITEM_CLASS, MEDIA_CLASS, SCRIM_CLASS, TITLE_CLASS,
    YEAR_CLASS,
};
pub use tracker::{handoff, ActiveTracker, Intersection, NavKey, ScrollMetrics, TouchHandoff};

/// Thuộc tính đánh dấu môi trường soạn thảo (Universal Editor).
pub const PREVIEW_MARKERS: [&str; 3] = ["data-aue-present", "data-aue-edit-mode", "data-aue-canvas"];

/// Cấu hình hành vi của khối timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineConfig {
    /// Tỉ lệ hiển thị tối thiểu để panel trở thành active.
    pub active_threshold: f64,
    /// Cho phép điều hướng bằng phím mũi tên lên/xuống.
    pub keyboard_navigation: bool,
    /// Chuyển cuộn cho trang khi vượt biên container.
    pub scroll_handoff: bool,
    /// Chèn stylesheet mặc định vào document.
    pub inject_styles: bool,
    pub preview_markers: Vec<String>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            active_threshold: 0.6,
            keyboard_navigation: true,
            scroll_handoff: false,
            inject_styles: false,
            preview_markers: PREVIEW_MARKERS.iter().map(|marker| marker.to_string()).collect(),
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> Result<(), TimelineError> {
        let threshold = self.active_threshold;
        if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
            Ok(())
        } else {
            Err(TimelineError::InvalidThreshold(threshold))
        }
    }

    /// Selector CSS tìm bất kỳ phần tử đánh dấu nào, ví dụ `[data-aue-present],[data-aue-canvas]`.
    pub fn preview_selector(&self) -> Option<String> {
        let parts: Vec<String> = self
            .preview_markers
            .iter()
            .map(|marker| marker.trim())
            .filter(|marker| !marker.is_empty())
            .map(|marker| format!("[{marker}]"))
            .collect();
        (!parts.is_empty()).then(|| parts.join(","))
    }
}

/// Chế độ dựng: trang xuất bản hoặc bản xem trước khi soạn thảo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Published,
    /// Không có observer, không lớp phủ, không can thiệp cuộn.
    Preview,
}

impl RenderMode {
    pub fn detect(marker_present: bool) -> Self {
        if marker_present {
            RenderMode::Preview
        } else {
            RenderMode::Published
        }
    }
}

/// Lỗi chung của khối timeline.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Ngưỡng active phải nằm trong (0, 1], nhận {0}")]
    InvalidThreshold(f64),
    #[error("Lỗi DOM: {0}")]
    Dom(String),
}
