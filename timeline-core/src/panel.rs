//! Dựng mô tả panel cho từng mục timeline.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{RenderMode, TimelineItem};

pub const ITEM_CLASS: &str = "t-item";
pub const MEDIA_CLASS: &str = "t-media";
pub const SCRIM_CLASS: &str = "t-scrim";
pub const CONTENT_CLASS: &str = "t-content";
pub const YEAR_CLASS: &str = "t-year";
pub const TITLE_CLASS: &str = "t-title";
pub const BODY_CLASS: &str = "t-body";
pub const ACTIVE_CLASS: &str = "is-active";
pub const EXIT_CLASS: &str = "t-exit";

/// Vị trí của panel, xen kẽ theo chỉ số.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Thuộc tính `loading` của ảnh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Loading {
    Eager,
    Lazy,
}

impl Loading {
    pub fn as_str(self) -> &'static str {
        match self {
            Loading::Eager => "eager",
            Loading::Lazy => "lazy",
        }
    }
}

/// Gợi ý tải ảnh; chỉ có ở chế độ xuất bản.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadHints {
    pub loading: Loading,
    pub fetch_priority_high: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelImage {
    pub src: String,
    pub alt: String,
    pub hints: Option<LoadHints>,
}

/// Cấu trúc một panel đã sẵn sàng để gắn vào container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelSpec {
    pub index: usize,
    pub side: Side,
    pub image: Option<PanelImage>,
    pub scrim: bool,
    pub year: Option<String>,
    pub title: Option<String>,
    pub body_html: Option<String>,
}

/// Dựng panel cho `item` ở vị trí `index`.
///
/// Panel đầu tiên và mục có ưu tiên `"high"` được tải ngay với độ ưu tiên cao;
/// các panel còn lại tải trễ. Chế độ xem trước bỏ lớp phủ và gợi ý tải.
pub fn build_panel(item: &TimelineItem, index: usize, mode: RenderMode) -> PanelSpec {
    let published = mode == RenderMode::Published;

    let image = non_empty(item.img_src()).map(|src| {
        let hints = published.then(|| {
            let eager = index == 0 || item.is_high_priority();
            LoadHints {
                loading: if eager { Loading::Eager } else { Loading::Lazy },
                fetch_priority_high: eager,
            }
        });
        PanelImage {
            src,
            alt: item.img_alt().to_string(),
            hints,
        }
    });

    PanelSpec {
        index,
        side: Side::for_index(index),
        image,
        scrim: published,
        year: non_empty(&item.year),
        title: non_empty(&item.title),
        body_html: non_empty(&item.body_html),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl PanelSpec {
    /// Markup tĩnh của panel. Năm và tiêu đề được escape, nội dung giữ nguyên markup.
    pub fn to_html(&self, active: bool) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<section class="{ITEM_CLASS}{}" role="group" data-index="{}" data-side="{}">"#,
            if active { " is-active" } else { "" },
            self.index,
            self.side.as_str(),
        );

        let _ = write!(out, r#"<div class="{MEDIA_CLASS}">"#);
        if let Some(image) = &self.image {
            out.push_str(r#"<img src=""#);
            escape_html_into(&mut out, &image.src);
            out.push_str(r#"" alt=""#);
            escape_html_into(&mut out, &image.alt);
            out.push('"');
            if let Some(hints) = image.hints {
                let _ = write!(out, r#" loading="{}""#, hints.loading.as_str());
                if hints.fetch_priority_high {
                    out.push_str(r#" fetchpriority="high""#);
                }
            }
            out.push('>');
        }
        out.push_str("</div>");

        if self.scrim {
            let _ = write!(out, r#"<div class="{SCRIM_CLASS}"></div>"#);
        }

        let _ = write!(out, r#"<div class="{CONTENT_CLASS}">"#);
        if let Some(year) = &self.year {
            let _ = write!(out, r#"<span class="{YEAR_CLASS}">"#);
            escape_html_into(&mut out, year);
            out.push_str("</span>");
        }
        if let Some(title) = &self.title {
            let _ = write!(out, r#"<h3 class="{TITLE_CLASS}">"#);
            escape_html_into(&mut out, title);
            out.push_str("</h3>");
        }
        if let Some(body) = &self.body_html {
            let _ = write!(out, r#"<div class="{BODY_CLASS}">{body}</div>"#);
        }
        out.push_str("</div></section>");
        out
    }
}

/// Escape ký tự đặc biệt cho văn bản và giá trị thuộc tính.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    escape_html_into(&mut out, input);
    out
}

/// Ghi bản đã escape của `s` vào cuối `out`.
fn escape_html_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MediaRef;
    use pretty_assertions::assert_eq;

    fn item(year: &str, title: &str, body: &str, img: &str, priority: &str) -> TimelineItem {
        TimelineItem {
            year: year.into(),
            title: title.into(),
            body_html: body.into(),
            media: if img.is_empty() {
                MediaRef::None
            } else {
                MediaRef::Url { src: img.into() }
            },
            priority: priority.into(),
        }
    }

    #[test]
    fn first_panel_loads_eagerly_on_the_left() {
        let panel = build_panel(
            &item("1990", "Founded", "<p>Start</p>", "img.png", "high"),
            0,
            RenderMode::Published,
        );

        assert_eq!(panel.side, Side::Left);
        assert!(panel.scrim);
        assert_eq!(
            panel.image,
            Some(PanelImage {
                src: "img.png".into(),
                alt: String::new(),
                hints: Some(LoadHints {
                    loading: Loading::Eager,
                    fetch_priority_high: true,
                }),
            })
        );
    }

    #[test]
    fn later_panels_load_lazily_unless_high_priority() {
        let normal = build_panel(&item("", "B", "", "b.png", ""), 1, RenderMode::Published);
        let urgent = build_panel(&item("", "C", "", "c.png", "high"), 2, RenderMode::Published);

        assert_eq!(normal.side, Side::Right);
        assert_eq!(
            normal.image.and_then(|image| image.hints),
            Some(LoadHints {
                loading: Loading::Lazy,
                fetch_priority_high: false,
            })
        );
        assert_eq!(urgent.side, Side::Left);
        assert_eq!(
            urgent.image.and_then(|image| image.hints),
            Some(LoadHints {
                loading: Loading::Eager,
                fetch_priority_high: true,
            })
        );
    }

    #[test]
    fn empty_fields_are_omitted() {
        let panel = build_panel(&item("2020", "", "", "", ""), 3, RenderMode::Published);
        assert_eq!(panel.title, None);
        assert_eq!(panel.body_html, None);
        assert_eq!(panel.image, None);

        let html = panel.to_html(false);
        assert!(!html.contains("<h3"));
        assert!(!html.contains(BODY_CLASS));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"<span class="t-year">2020</span>"#));
    }

    #[test]
    fn preview_panel_has_no_scrim_or_hints() {
        let panel = build_panel(&item("1990", "T", "", "a.png", "high"), 0, RenderMode::Preview);
        assert!(!panel.scrim);
        assert_eq!(panel.image.as_ref().and_then(|image| image.hints), None);

        let html = panel.to_html(false);
        assert!(!html.contains(SCRIM_CLASS));
        assert!(!html.contains("loading="));
    }

    #[test]
    fn html_escapes_text_but_keeps_body_markup() {
        let panel = build_panel(
            &item("<1990>", "Fish & Chips", "<p>Start</p>", "a.png?x=1&y=2", ""),
            1,
            RenderMode::Published,
        );
        let html = panel.to_html(true);

        assert_eq!(
            html,
            concat!(
                r#"<section class="t-item is-active" role="group" data-index="1" data-side="right">"#,
                r#"<div class="t-media"><img src="a.png?x=1&amp;y=2" alt="" loading="lazy"></div>"#,
                r#"<div class="t-scrim"></div>"#,
                r#"<div class="t-content"><span class="t-year">&lt;1990&gt;</span>"#,
                r#"<h3 class="t-title">Fish &amp; Chips</h3>"#,
                r#"<div class="t-body"><p>Start</p></div></div></section>"#,
            )
        );
        assert_eq!(html.matches("<img").count(), 1);
    }

    #[test]
    fn quotes_in_alt_text_stay_inside_the_attribute() {
        let mut panel = build_panel(&item("", "", "", "a.png", ""), 0, RenderMode::Preview);
        if let Some(image) = panel.image.as_mut() {
            image.alt = r#"Say "hi" & 'bye'"#.to_string();
        }
        let html = panel.to_html(false);

        assert!(html.contains(r#"alt="Say &quot;hi&quot; &amp; &#39;bye&#39;""#));
        assert_eq!(escape_html("<a href='x'>"), "&lt;a href=&#39;x&#39;&gt;");
    }
}
