//! Trang trí container DOM: đọc hàng, dựng panel, gắn observer và listener.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Object, WeakSet};
use timeline_core::{
    handoff, ActiveTracker, Decoration, Decorator, EmbeddedMedia, Intersection, MediaKind,
    NavKey, PanelSpec, RawCell, RawRow, RenderMode, ScrollMetrics, TimelineConfig,
    TimelineError, TouchHandoff, ACTIVE_CLASS, BODY_CLASS, CONTENT_CLASS, EXIT_CLASS,
    ITEM_CLASS, MEDIA_CLASS, SCRIM_CLASS, TITLE_CLASS, YEAR_CLASS,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    console, AddEventListenerOptions, Document, Element, Event, HtmlElement, HtmlImageElement,
    HtmlMediaElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions,
    TouchEvent, WheelEvent,
};

use crate::{format_timeline_error, parse_config, styles};

const MEDIA_SELECTOR: &str = "img, picture img, video";

thread_local! {
    static MOUNTED: RefCell<Vec<Timeline>> = RefCell::new(Vec::new());
    // Container đã mang panel; giữ nguyên qua dispose.
    static DECORATED: WeakSet = WeakSet::new();
}

struct Listener {
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Một khối timeline gắn với container.
#[wasm_bindgen]
pub struct Timeline {
    block: Element,
    decorator: Decorator,
    mode: Option<RenderMode>,
    panels: Rc<Vec<Element>>,
    tracker: Option<Rc<RefCell<ActiveTracker>>>,
    observer: Option<IntersectionObserver>,
    observer_callback: Option<Closure<dyn FnMut(Array, IntersectionObserver)>>,
    listeners: Vec<Listener>,
    handoff_enabled: bool,
    handoff_requested: bool,
}

#[wasm_bindgen]
impl Timeline {
    #[wasm_bindgen(constructor)]
    pub fn new(block: Element, config: Option<JsValue>) -> Result<Timeline, JsValue> {
        console_error_panic_hook::set_once();

        let config = parse_config(config)?;
        let decorator =
            Decorator::new(config).map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;
        Ok(Self {
            block,
            decorator,
            mode: None,
            panels: Rc::new(Vec::new()),
            tracker: None,
            observer: None,
            observer_callback: None,
            listeners: Vec::new(),
            handoff_enabled: false,
            handoff_requested: false,
        })
    }

    /// Trang trí container. Lần gọi thứ hai trở đi không làm gì.
    pub fn decorate(&mut self) -> Result<(), JsValue> {
        if self.decorator.is_decorated() {
            console::debug_1(&JsValue::from_str("timeline: container đã được trang trí, bỏ qua"));
            return Ok(());
        }
        if is_marked(&self.block) {
            console::debug_1(&JsValue::from_str(
                "timeline: container đã chứa panel từ lần trang trí trước, bỏ qua",
            ));
            return Ok(());
        }

        let document = document()?;
        let mode = detect_mode(&document, self.decorator.config());
        let rows = read_dom_rows(&self.block);

        let layout = match self.decorator.decorate(&rows, mode) {
            Decoration::Rendered(layout) => layout,
            Decoration::Empty => {
                console::debug_1(&JsValue::from_str("timeline: không có hàng hợp lệ"));
                mark(&self.block);
                return Ok(());
            }
            Decoration::AlreadyDecorated => return Ok(()),
        };

        if self.decorator.config().inject_styles {
            if let Err(err) = styles::ensure_styles(&document) {
                console::error_1(&err);
            }
        }

        // Container chỉ bị xoá khi mọi panel đã dựng xong.
        let fragment = document.create_document_fragment();
        let mut panels = Vec::with_capacity(layout.panels.len());
        for panel in &layout.panels {
            let element = build_panel_element(&document, panel)?;
            fragment.append_child(&element)?;
            panels.push(element);
        }
        self.block.set_inner_html("");
        self.block.append_child(&fragment)?;
        mark(&self.block);
        self.panels = Rc::new(panels);
        self.mode = Some(layout.mode);

        let Some(tracker) = layout.tracker else {
            return Ok(());
        };
        let tracker = Rc::new(RefCell::new(tracker));
        apply_active(&self.panels, tracker.borrow().active());
        self.observe_panels(&tracker)?;
        self.tracker = Some(tracker);

        if self.decorator.config().keyboard_navigation {
            self.enable_keyboard()?;
        }
        if self.decorator.config().scroll_handoff || self.handoff_requested {
            self.enable_scroll_handoff()?;
        }
        Ok(())
    }

    /// Chuyển cuộn cho trang khi người dùng cuộn vượt panel đầu/cuối.
    ///
    /// Gọi trước `decorate` thì yêu cầu được ghi nhận và bật ngay sau khi trang trí.
    #[wasm_bindgen(js_name = enableScrollHandoff)]
    pub fn enable_scroll_handoff(&mut self) -> Result<(), JsValue> {
        if !self.decorator.is_decorated() {
            self.handoff_requested = true;
            console::debug_1(&JsValue::from_str(
                "timeline: chưa trang trí, sẽ bật chuyển cuộn sau decorate",
            ));
            return Ok(());
        }
        if self.handoff_enabled {
            return Ok(());
        }
        if self.mode != Some(RenderMode::Published) {
            console::debug_1(&JsValue::from_str(
                "timeline: chế độ xem trước hoặc không có panel, bỏ qua chuyển cuộn",
            ));
            return Ok(());
        }

        ensure_exit_sentinel(&document()?, &self.block)?;

        let block = self.block.clone();
        self.listen(
            "wheel",
            true,
            Closure::new(move |event: Event| {
                let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                if let Some(nudge) = handoff(wheel.delta_y(), scroll_metrics(&block)) {
                    if let Some(element) = block.dyn_ref::<HtmlElement>() {
                        if let Err(err) = element.blur() {
                            console::error_1(&err);
                        }
                    }
                    nudge_page(nudge);
                }
            }),
        )?;

        let touch = Rc::new(RefCell::new(TouchHandoff::default()));
        let start = Rc::clone(&touch);
        self.listen(
            "touchstart",
            true,
            Closure::new(move |event: Event| {
                if let Some(y) = first_touch_y(&event) {
                    start.borrow_mut().start(y);
                }
            }),
        )?;

        let block = self.block.clone();
        self.listen(
            "touchmove",
            true,
            Closure::new(move |event: Event| {
                let Some(y) = first_touch_y(&event) else {
                    return;
                };
                if let Some(nudge) = touch.borrow().moved(y, scroll_metrics(&block)) {
                    nudge_page(nudge);
                }
            }),
        )?;

        self.handoff_enabled = true;
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = activeIndex)]
    pub fn active_index(&self) -> Option<u32> {
        let tracker = self.tracker.as_ref()?;
        u32::try_from(tracker.borrow().active()).ok()
    }

    #[wasm_bindgen(getter, js_name = isDecorated)]
    pub fn is_decorated(&self) -> bool {
        self.decorator.is_decorated()
    }

    /// Ngắt observer và gỡ mọi listener. Panel vẫn nằm trong container.
    pub fn dispose(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.observer_callback = None;

        for listener in self.listeners.drain(..) {
            if let Err(err) = self
                .block
                .remove_event_listener_with_callback(
                    listener.event,
                    listener.callback.as_ref().unchecked_ref(),
                )
            {
                console::error_1(&err);
            }
        }
        self.tracker = None;
        self.handoff_enabled = false;
        self.handoff_requested = false;
    }
}

impl Timeline {
    fn observe_panels(&mut self, tracker: &Rc<RefCell<ActiveTracker>>) -> Result<(), JsValue> {
        let panels = Rc::clone(&self.panels);
        let shared = Rc::clone(tracker);
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch: Vec<Intersection> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        Some(Intersection {
                            index: panel_index(&entry.target())?,
                            is_intersecting: entry.is_intersecting(),
                            ratio: entry.intersection_ratio(),
                        })
                    })
                    .collect();

                let next = shared.borrow_mut().observe(&batch);
                if let Some(active) = next {
                    apply_active(&panels, active);
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(tracker.borrow().threshold()));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for panel in self.panels.iter() {
            observer.observe(panel);
        }

        self.observer = Some(observer);
        self.observer_callback = Some(callback);
        Ok(())
    }

    fn enable_keyboard(&mut self) -> Result<(), JsValue> {
        let Some(tracker) = self.tracker.as_ref() else {
            return Ok(());
        };
        if !self.block.has_attribute("tabindex") {
            self.block.set_attribute("tabindex", "0")?;
        }

        let panels = Rc::clone(&self.panels);
        let shared = Rc::clone(tracker);
        self.listen(
            "keydown",
            false,
            Closure::new(move |event: Event| {
                let Some(key) = event
                    .dyn_ref::<KeyboardEvent>()
                    .and_then(|keyboard| NavKey::from_key(&keyboard.key()))
                else {
                    return;
                };

                let next = shared.borrow_mut().step(key);
                apply_active(&panels, next);
                if let Some(panel) = panels.get(next) {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    options.set_block(ScrollLogicalPosition::Start);
                    panel.scroll_into_view_with_scroll_into_view_options(&options);
                }
                event.prevent_default();
            }),
        )
    }

    fn listen(
        &mut self,
        event: &'static str,
        passive: bool,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<(), JsValue> {
        if passive {
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            self.block
                .add_event_listener_with_callback_and_add_event_listener_options(
                    event,
                    callback.as_ref().unchecked_ref(),
                    &options,
                )?;
        } else {
            self.block
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        }
        self.listeners.push(Listener { event, callback });
        Ok(())
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Điểm vào mặc định: trang trí `block` một lần duy nhất.
#[wasm_bindgen]
pub fn decorate(block: Element, config: Option<JsValue>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if is_marked(&block) {
        console::debug_1(&JsValue::from_str("timeline: container đã được trang trí, bỏ qua"));
        return Ok(());
    }

    let mut timeline = Timeline::new(block, config)?;
    timeline.decorate()?;
    if timeline.is_decorated() {
        MOUNTED.with(|mounted| mounted.borrow_mut().push(timeline));
    }
    Ok(())
}

/// Gỡ listener của khối đã trang trí qua `decorate`. Trả về `false` nếu không tìm thấy.
///
/// Panel vẫn ở lại và container vẫn bị đánh dấu, nên `decorate` lần sau là no-op.
#[wasm_bindgen]
pub fn dispose(block: Element) -> bool {
    MOUNTED.with(|mounted| {
        let mut mounted = mounted.borrow_mut();
        let before = mounted.len();
        mounted.retain(|t| !same_block(t, &block));
        mounted.len() != before
    })
}

fn same_block(timeline: &Timeline, block: &Element) -> bool {
    Object::is(timeline.block.as_ref(), block.as_ref())
}

fn is_marked(block: &Element) -> bool {
    DECORATED.with(|decorated| decorated.has(block.unchecked_ref::<Object>()))
}

fn mark(block: &Element) {
    DECORATED.with(|decorated| {
        decorated.add(block.unchecked_ref::<Object>());
    });
}

fn document() -> Result<Document, JsValue> {
    let window = web_sys::window().ok_or_else(|| dom_error("Không có window"))?;
    window
        .document()
        .ok_or_else(|| dom_error("Không truy cập được document"))
}

fn dom_error(message: &str) -> JsValue {
    JsValue::from_str(&format_timeline_error(TimelineError::Dom(message.to_string())))
}

fn detect_mode(document: &Document, config: &TimelineConfig) -> RenderMode {
    let Some(selector) = config.preview_selector() else {
        return RenderMode::Published;
    };
    match document.query_selector(&selector) {
        Ok(found) => RenderMode::detect(found.is_some()),
        Err(err) => {
            console::error_1(&err);
            RenderMode::Published
        }
    }
}

fn children(element: &Element) -> impl Iterator<Item = Element> {
    let collection = element.children();
    (0..collection.length()).filter_map(move |idx| collection.item(idx))
}

fn read_dom_rows(block: &Element) -> Vec<RawRow> {
    children(block)
        .map(|row| children(&row).map(|cell| read_cell(&cell)).collect())
        .collect()
}

fn read_cell(cell: &Element) -> RawCell {
    RawCell {
        text: cell.text_content().unwrap_or_default(),
        html: cell.inner_html(),
        media: find_media(cell),
    }
}

fn find_media(cell: &Element) -> Option<EmbeddedMedia> {
    let found = cell.query_selector(MEDIA_SELECTOR).ok().flatten()?;

    let kind = if found.tag_name().eq_ignore_ascii_case("video") {
        MediaKind::Video
    } else if found
        .parent_element()
        .is_some_and(|parent| parent.tag_name().eq_ignore_ascii_case("picture"))
    {
        MediaKind::Picture
    } else {
        MediaKind::Image
    };

    let current_src = if let Some(img) = found.dyn_ref::<HtmlImageElement>() {
        img.current_src()
    } else if let Some(media) = found.dyn_ref::<HtmlMediaElement>() {
        media.current_src()
    } else {
        String::new()
    };

    Some(EmbeddedMedia {
        kind,
        src: found.get_attribute("src").unwrap_or_default(),
        current_src,
        alt: found.get_attribute("alt").unwrap_or_default(),
    })
}

fn create_with_class(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    Ok(element)
}

fn build_panel_element(document: &Document, panel: &PanelSpec) -> Result<Element, JsValue> {
    let section = create_with_class(document, "section", ITEM_CLASS)?;
    section.set_attribute("role", "group")?;
    section.set_attribute("data-index", &panel.index.to_string())?;
    section.set_attribute("data-side", panel.side.as_str())?;

    let media = create_with_class(document, "div", MEDIA_CLASS)?;
    if let Some(image) = &panel.image {
        let img: HtmlImageElement = document.create_element("img")?.dyn_into()?;
        img.set_src(&image.src);
        img.set_alt(&image.alt);
        if let Some(hints) = image.hints {
            img.set_attribute("loading", hints.loading.as_str())?;
            if hints.fetch_priority_high {
                img.set_attribute("fetchpriority", "high")?;
            }
        }
        media.append_child(&img)?;
    }
    section.append_child(&media)?;

    if panel.scrim {
        section.append_child(&create_with_class(document, "div", SCRIM_CLASS)?)?;
    }

    let content = create_with_class(document, "div", CONTENT_CLASS)?;
    if let Some(year) = &panel.year {
        let badge = create_with_class(document, "span", YEAR_CLASS)?;
        badge.set_text_content(Some(year));
        content.append_child(&badge)?;
    }
    if let Some(title) = &panel.title {
        let heading = create_with_class(document, "h3", TITLE_CLASS)?;
        heading.set_text_content(Some(title));
        content.append_child(&heading)?;
    }
    if let Some(body) = &panel.body_html {
        let body_el = create_with_class(document, "div", BODY_CLASS)?;
        body_el.set_inner_html(body);
        content.append_child(&body_el)?;
    }
    section.append_child(&content)?;

    Ok(section)
}

fn panel_index(target: &Element) -> Option<usize> {
    target.get_attribute("data-index")?.parse().ok()
}

fn apply_active(panels: &[Element], active: usize) {
    for (idx, panel) in panels.iter().enumerate() {
        if let Err(err) = panel
            .class_list()
            .toggle_with_force(ACTIVE_CLASS, idx == active)
        {
            console::error_1(&err);
        }
    }
}

fn ensure_exit_sentinel(document: &Document, block: &Element) -> Result<(), JsValue> {
    let selector = format!(".{EXIT_CLASS}");
    if block.query_selector(&selector)?.is_none() {
        block.append_child(&create_with_class(document, "div", EXIT_CLASS)?)?;
    }
    Ok(())
}

fn scroll_metrics(block: &Element) -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: f64::from(block.scroll_top()),
        client_height: f64::from(block.client_height()),
        scroll_height: f64::from(block.scroll_height()),
    }
}

fn first_touch_y(event: &Event) -> Option<f64> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(f64::from(touch.client_y()))
}

fn nudge_page(top: f64) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_left(0.0);
    options.set_behavior(ScrollBehavior::Instant);
    window.scroll_by_with_scroll_to_options(&options);
}
