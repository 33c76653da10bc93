//! Đọc các hàng nội dung do tác giả soạn thành danh sách `TimelineItem`.

use serde::{Deserialize, Serialize};

/// Loại phần tử media nhúng trong ô thứ tư.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    /// `<img>` nằm trong `<picture>`.
    Picture,
    Video,
}

/// Phần tử media đầu tiên tìm thấy trong một ô, chưa qua xử lý.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddedMedia {
    pub kind: MediaKind,
    /// Giá trị thuộc tính `src` (có thể rỗng khi trình duyệt chọn qua `srcset`).
    #[serde(default)]
    pub src: String,
    /// Nguồn đã được trình duyệt phân giải (`currentSrc`).
    #[serde(default)]
    pub current_src: String,
    #[serde(default)]
    pub alt: String,
}

/// Một ô của hàng nguồn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawCell {
    /// `textContent` của ô.
    #[serde(default)]
    pub text: String,
    /// `innerHTML` của ô.
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub media: Option<EmbeddedMedia>,
}

impl RawCell {
    /// Ô chỉ chứa văn bản thuần (text và markup trùng nhau).
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            html: value.clone(),
            text: value,
            media: None,
        }
    }
}

/// Một hàng nguồn: danh sách ô theo thứ tự.
pub type RawRow = Vec<RawCell>;

/// Nguồn ảnh của một mục, được xác định một lần khi đọc hàng.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaRef {
    Image {
        src: String,
        alt: String,
    },
    Picture {
        src: String,
        alt: String,
    },
    Video {
        src: String,
        alt: String,
    },
    /// Nội dung văn bản của ô, dùng trực tiếp làm URL.
    Url {
        src: String,
    },
    #[default]
    None,
}

impl MediaRef {
    /// Phân giải ô media: ưu tiên phần tử nhúng, sau đó tới văn bản của ô.
    pub fn resolve(cell: Option<&RawCell>) -> Self {
        let Some(cell) = cell else {
            return MediaRef::None;
        };

        if let Some(media) = &cell.media {
            let src = if media.src.is_empty() {
                media.current_src.clone()
            } else {
                media.src.clone()
            };
            let alt = media.alt.clone();
            return match media.kind {
                MediaKind::Image => MediaRef::Image { src, alt },
                MediaKind::Picture => MediaRef::Picture { src, alt },
                MediaKind::Video => MediaRef::Video { src, alt },
            };
        }

        let text = cell.text.trim();
        if text.is_empty() {
            MediaRef::None
        } else {
            MediaRef::Url {
                src: text.to_string(),
            }
        }
    }

    pub fn img_src(&self) -> &str {
        match self {
            MediaRef::Image { src, .. }
            | MediaRef::Picture { src, .. }
            | MediaRef::Video { src, .. }
            | MediaRef::Url { src } => src,
            MediaRef::None => "",
        }
    }

    pub fn img_alt(&self) -> &str {
        match self {
            MediaRef::Image { alt, .. }
            | MediaRef::Picture { alt, .. }
            | MediaRef::Video { alt, .. } => alt,
            MediaRef::Url { .. } | MediaRef::None => "",
        }
    }
}

/// Một mục trên timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineItem {
    pub year: String,
    pub title: String,
    pub body_html: String,
    pub media: MediaRef,
    /// Cờ tự do; chỉ giá trị `"high"` được nhận diện.
    pub priority: String,
}

impl TimelineItem {
    pub fn img_src(&self) -> &str {
        self.media.img_src()
    }

    pub fn img_alt(&self) -> &str {
        self.media.img_alt()
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == "high"
    }

    /// Mục có ít nhất một trong năm, tiêu đề, nội dung hoặc ảnh.
    pub fn has_content(&self) -> bool {
        !(self.year.is_empty()
            && self.title.is_empty()
            && self.body_html.is_empty()
            && self.img_src().is_empty())
    }
}

/// Đọc các hàng nguồn theo thứ tự ô: năm, tiêu đề, nội dung, ảnh, ưu tiên.
///
/// Hàng không có ô hoặc không có nội dung bị bỏ qua. Ô thiếu được coi là rỗng.
pub fn read_rows(rows: &[RawRow]) -> Vec<TimelineItem> {
    rows.iter()
        .filter(|cells| !cells.is_empty())
        .map(|cells| read_row(cells))
        .filter(TimelineItem::has_content)
        .collect()
}

fn read_row(cells: &[RawCell]) -> TimelineItem {
    let text_at = |idx: usize| {
        cells
            .get(idx)
            .map(|cell| cell.text.trim().to_string())
            .unwrap_or_default()
    };

    TimelineItem {
        year: text_at(0),
        title: text_at(1),
        body_html: cells
            .get(2)
            .map(|cell| cell.html.trim().to_string())
            .unwrap_or_default(),
        media: MediaRef::resolve(cells.get(3)),
        priority: text_at(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|value| RawCell::text(*value)).collect()
    }

    #[test]
    fn reads_all_five_cells() {
        let rows = vec![row(&[" 1990 ", "Founded", " <p>Start</p> ", "img.png", "high"])];
        let items = read_rows(&rows);

        assert_eq!(
            items,
            vec![TimelineItem {
                year: "1990".into(),
                title: "Founded".into(),
                body_html: "<p>Start</p>".into(),
                media: MediaRef::Url {
                    src: "img.png".into()
                },
                priority: "high".into(),
            }]
        );
        assert!(items[0].is_high_priority());
    }

    #[test]
    fn skips_rows_without_cells_or_content() {
        let rows = vec![Vec::new(), row(&["", "", "", ""]), row(&["  ", "\n", "", "", "high"])];
        assert!(read_rows(&rows).is_empty());
    }

    #[test]
    fn keeps_source_order_and_missing_cells_are_empty() {
        let rows = vec![row(&["2001"]), row(&[]), row(&["", "Second"]), row(&["2010", "Third"])];
        let items = read_rows(&rows);

        let years: Vec<_> = items.iter().map(|item| item.year.as_str()).collect();
        let titles: Vec<_> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(years, vec!["2001", "", "2010"]);
        assert_eq!(titles, vec!["", "Second", "Third"]);
        assert_eq!(items[0].body_html, "");
        assert_eq!(items[0].media, MediaRef::None);
        assert_eq!(items[0].priority, "");
    }

    #[test]
    fn body_keeps_inner_markup() {
        let mut cells = row(&["", ""]);
        cells.push(RawCell {
            text: "Bold move".into(),
            html: "\n  <p><strong>Bold</strong> move</p>\n".into(),
            media: None,
        });
        let items = read_rows(&[cells]);
        assert_eq!(items[0].body_html, "<p><strong>Bold</strong> move</p>");
    }

    #[test]
    fn embedded_media_wins_over_cell_text() {
        let cell = RawCell {
            text: "caption text".into(),
            html: String::new(),
            media: Some(EmbeddedMedia {
                kind: MediaKind::Picture,
                src: "/media/hero.webp".into(),
                current_src: "https://cdn.example.com/media/hero.webp".into(),
                alt: "Hero".into(),
            }),
        };
        let media = MediaRef::resolve(Some(&cell));
        assert_eq!(
            media,
            MediaRef::Picture {
                src: "/media/hero.webp".into(),
                alt: "Hero".into()
            }
        );
    }

    #[test]
    fn embedded_media_falls_back_to_current_src() {
        let cell = RawCell {
            media: Some(EmbeddedMedia {
                kind: MediaKind::Video,
                src: String::new(),
                current_src: "https://cdn.example.com/clip.mp4".into(),
                alt: String::new(),
            }),
            ..RawCell::default()
        };
        let media = MediaRef::resolve(Some(&cell));
        assert_eq!(media.img_src(), "https://cdn.example.com/clip.mp4");
        assert_eq!(media.img_alt(), "");
    }

    #[test]
    fn image_only_row_is_kept() {
        let items = read_rows(&[row(&["", "", "", " /a.jpg "])]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].img_src(), "/a.jpg");
    }
}
