//! Theo dõi panel đang hoạt động và các quyết định cuộn.

use serde::{Deserialize, Serialize};

/// Một quan sát giao cắt giữa panel và viewport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Intersection {
    pub index: usize,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Giữ đúng một chỉ số panel đang hoạt động.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTracker {
    len: usize,
    active: usize,
    threshold: f64,
}

impl ActiveTracker {
    /// Panel 0 hoạt động ngay từ đầu, trước mọi quan sát.
    pub fn new(len: usize, threshold: f64) -> Self {
        Self {
            len,
            active: 0,
            threshold,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == index
    }

    /// Xử lý một lô quan sát. Mục hợp lệ cuối cùng trong lô được chọn.
    ///
    /// Trả về chỉ số mới khi có mục hợp lệ, kể cả khi không đổi.
    pub fn observe(&mut self, batch: &[Intersection]) -> Option<usize> {
        let winner = batch.iter().rev().find(|entry| {
            entry.is_intersecting && entry.ratio >= self.threshold && entry.index < self.len
        })?;
        self.active = winner.index;
        Some(self.active)
    }

    /// Di chuyển lựa chọn theo phím, giới hạn trong phạm vi các panel.
    pub fn step(&mut self, key: NavKey) -> usize {
        let last = self.len.saturating_sub(1);
        self.active = match key {
            NavKey::Down => (self.active + 1).min(last),
            NavKey::Up => self.active.saturating_sub(1),
        };
        self.active
    }
}

/// Phím điều hướng được hỗ trợ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
}

impl NavKey {
    /// Nhận giá trị `KeyboardEvent.key`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(NavKey::Down),
            "ArrowUp" => Some(NavKey::Up),
            _ => None,
        }
    }
}

/// Kích thước cuộn của container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn at_top(&self) -> bool {
        self.scroll_top <= 0.0
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - 1.0
    }
}

/// Khoảng đẩy (±1px) chuyển cho trang khi người dùng cuộn vượt biên container.
///
/// `delta` dương nghĩa là cuộn xuống.
pub fn handoff(delta: f64, metrics: ScrollMetrics) -> Option<f64> {
    if delta > 0.0 && metrics.at_bottom() {
        Some(1.0)
    } else if delta < 0.0 && metrics.at_top() {
        Some(-1.0)
    } else {
        None
    }
}

/// Trạng thái kéo cảm ứng giữa `touchstart` và `touchmove`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchHandoff {
    start_y: f64,
}

impl TouchHandoff {
    pub fn start(&mut self, client_y: f64) {
        self.start_y = client_y;
    }

    pub fn moved(&self, client_y: f64, metrics: ScrollMetrics) -> Option<f64> {
        handoff(self.start_y - client_y, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(index: usize, ratio: f64) -> Intersection {
        Intersection {
            index,
            is_intersecting: true,
            ratio,
        }
    }

    #[test]
    fn first_panel_is_active_before_any_event() {
        let tracker = ActiveTracker::new(4, 0.6);
        assert_eq!(tracker.active(), 0);
        assert!(tracker.is_active(0));
        assert!(!tracker.is_active(1));
    }

    #[test]
    fn last_qualifying_entry_in_batch_wins() {
        let mut tracker = ActiveTracker::new(4, 0.6);
        let batch = [hit(1, 0.9), hit(2, 0.61), hit(3, 0.3)];
        assert_eq!(tracker.observe(&batch), Some(2));
        assert_eq!(tracker.active(), 2);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut tracker = ActiveTracker::new(2, 0.6);
        assert_eq!(tracker.observe(&[hit(1, 0.6)]), Some(1));
    }

    #[test]
    fn non_qualifying_batch_keeps_state() {
        let mut tracker = ActiveTracker::new(3, 0.6);
        tracker.observe(&[hit(2, 1.0)]);

        let leaving = Intersection {
            index: 1,
            is_intersecting: false,
            ratio: 0.8,
        };
        assert_eq!(tracker.observe(&[leaving, hit(0, 0.2)]), None);
        assert_eq!(tracker.active(), 2);
        assert_eq!(tracker.observe(&[hit(7, 1.0)]), None);
    }

    #[test]
    fn keyboard_steps_are_clamped() {
        let mut tracker = ActiveTracker::new(3, 0.6);
        assert_eq!(tracker.step(NavKey::Up), 0);
        assert_eq!(tracker.step(NavKey::Down), 1);
        assert_eq!(tracker.step(NavKey::Down), 2);
        assert_eq!(tracker.step(NavKey::Down), 2);
        assert_eq!(tracker.step(NavKey::Up), 1);
    }

    #[test]
    fn only_vertical_arrows_navigate() {
        assert_eq!(NavKey::from_key("ArrowDown"), Some(NavKey::Down));
        assert_eq!(NavKey::from_key("ArrowUp"), Some(NavKey::Up));
        assert_eq!(NavKey::from_key("ArrowLeft"), None);
        assert_eq!(NavKey::from_key("PageDown"), None);
    }

    #[test]
    fn wheel_past_bottom_nudges_page_down() {
        let bottom = ScrollMetrics {
            scroll_top: 1200.0,
            client_height: 800.0,
            scroll_height: 2000.0,
        };
        assert_eq!(handoff(40.0, bottom), Some(1.0));
        assert_eq!(handoff(-40.0, bottom), None);

        let middle = ScrollMetrics {
            scroll_top: 400.0,
            ..bottom
        };
        assert_eq!(handoff(40.0, middle), None);
        assert_eq!(handoff(-40.0, middle), None);
    }

    #[test]
    fn touch_drag_past_top_nudges_page_up() {
        let top = ScrollMetrics {
            scroll_top: 0.0,
            client_height: 800.0,
            scroll_height: 2000.0,
        };
        let mut touch = TouchHandoff::default();
        touch.start(100.0);
        // Kéo ngón tay xuống = cuộn lên.
        assert_eq!(touch.moved(160.0, top), Some(-1.0));
        assert_eq!(touch.moved(40.0, top), None);
        assert_eq!(touch.moved(100.0, top), None);
    }
}
