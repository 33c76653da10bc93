//! Trình tự trang trí: đọc hàng, dựng panel, khởi tạo bộ theo dõi.

use crate::{
    build_panel, read_rows, ActiveTracker, PanelSpec, RawRow, RenderMode, TimelineConfig,
    TimelineError, TimelineItem,
};

/// Kết quả dựng cho một container.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub mode: RenderMode,
    pub items: Vec<TimelineItem>,
    pub panels: Vec<PanelSpec>,
    /// Chỉ có ở chế độ xuất bản.
    pub tracker: Option<ActiveTracker>,
}

impl Layout {
    /// Markup tĩnh của toàn bộ panel, theo thứ tự nguồn.
    pub fn to_html(&self) -> String {
        self.panels
            .iter()
            .map(|panel| {
                let active = self
                    .tracker
                    .as_ref()
                    .is_some_and(|tracker| tracker.is_active(panel.index));
                panel.to_html(active)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    /// Container đã được trang trí trước đó; không làm gì.
    AlreadyDecorated,
    /// Không có hàng hợp lệ; container giữ nguyên.
    Empty,
    Rendered(Layout),
}

/// Cờ khởi tạo theo từng container, chặn trang trí lặp lại.
#[derive(Debug, Clone)]
pub struct Decorator {
    config: TimelineConfig,
    decorated: bool,
}

impl Decorator {
    pub fn new(config: TimelineConfig) -> Result<Self, TimelineError> {
        config.validate()?;
        Ok(Self {
            config,
            decorated: false,
        })
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn is_decorated(&self) -> bool {
        self.decorated
    }

    /// Chạy một lượt trang trí. Cờ được bật ngay cả khi không có mục nào.
    pub fn decorate(&mut self, rows: &[RawRow], mode: RenderMode) -> Decoration {
        if self.decorated {
            return Decoration::AlreadyDecorated;
        }
        self.decorated = true;

        let items = read_rows(rows);
        if items.is_empty() {
            return Decoration::Empty;
        }

        let panels: Vec<PanelSpec> = items
            .iter()
            .enumerate()
            .map(|(index, item)| build_panel(item, index, mode))
            .collect();

        let tracker = (mode == RenderMode::Published)
            .then(|| ActiveTracker::new(panels.len(), self.config.active_threshold));

        Decoration::Rendered(Layout {
            mode,
            items,
            panels,
            tracker,
        })
    }
}

/// Dựng markup tĩnh cho các hàng; chuỗi rỗng khi không có mục hợp lệ.
pub fn render_static(
    rows: &[RawRow],
    mode: RenderMode,
    config: &TimelineConfig,
) -> Result<String, TimelineError> {
    let mut decorator = Decorator::new(config.clone())?;
    Ok(match decorator.decorate(rows, mode) {
        Decoration::Rendered(layout) => layout.to_html(),
        Decoration::Empty | Decoration::AlreadyDecorated => String::new(),
    })
}
