// Lightbox viewer for refracta galleries
// Features:
// - Two slot subtrees reused for every slide; the incoming slide is filled
//   into the idle slot and the roles swap
// - Discrete zoom with pan, swipe navigation and swipe-to-dismiss
// - Keyboard control with a Tab focus trap
// - Thumbnail strip, counter and a metadata panel filled in the background
// - Neighbor preloading, the second neighbor after a short delay

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config;
use crate::dom::{Document, FrameGate, NodeId};
use crate::models::{ExifMetadata, ManifestEntry, MediaItem, MediaKind};
use crate::probe::MetadataParser;
use crate::ui::event::InputEvent;
use crate::ui::focus::{focusable_controls, next_focus, HIDDEN_CLASS};
use crate::ui::gesture::{classify_swipe, lock_axis, Axis, DragTracker, Swipe};
use crate::ui::icons;
use crate::ui::info::info_markup;
use crate::ui::keybindings::{action_for_key, Key, ViewerAction};
use crate::ui::options::{ViewerOptions, ViewerOptionsUpdate};
use crate::ui::zoom::ZoomState;

const ANIMATION_PREFIXES: [&str; 4] = [
    "animation-in-prev",
    "animation-out-next",
    "animation-in-next",
    "animation-out-prev",
];

const TYPE_CLASSES: [&str; 3] = [
    "obsidium-type-image",
    "obsidium-type-video",
    "obsidium-type-content",
];

/// Direction of a slide change; drives the enter/exit animation classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotId {
    A,
    B,
}

/// Where the viewer reads its entries from.
#[derive(Debug, Clone)]
pub enum ViewerSource {
    Items(Vec<ManifestEntry>),
    /// Elements with tag `tag` under the element with id `container_id`.
    /// Clicking one of them opens the viewer at its position.
    Selector { container_id: String, tag: String },
}

impl ViewerSource {
    pub fn selector(container_id: &str) -> Self {
        Self::Selector {
            container_id: container_id.to_string(),
            tag: "img".to_string(),
        }
    }
}

/// Snapshot of the viewer state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub is_open: bool,
    pub current_index: usize,
    pub zoom_level: usize,
    pub drag_offset_x: f64,
    pub drag_offset_y: f64,
    pub interface_hidden: bool,
    pub active_slot: SlotId,
}

enum ViewerMessage {
    Metadata { generation: u64, exif: ExifMetadata },
    Preload { generation: u64, src: String },
}

/// One of the two render targets.
#[derive(Debug, Clone, Copy)]
struct Slot {
    wrapper: NodeId,
    image: NodeId,
    video: NodeId,
    body: NodeId,
    title: NodeId,
    background: NodeId,
}

#[derive(Debug, Clone, Copy)]
struct Chrome {
    root: NodeId,
    counter: NodeId,
    info_panel: NodeId,
    zoom_ratio: NodeId,
    thumbnails_wrapper: NodeId,
    thumbnails: NodeId,
    close: NodeId,
    prev: NodeId,
    next: NodeId,
    zoom_in: NodeId,
    zoom_out: NodeId,
    interface: NodeId,
    info: NodeId,
    preload: [NodeId; 2],
}

pub struct Viewer {
    source: ViewerSource,
    gallery: Option<NodeId>,
    options: ViewerOptions,
    metadata: Option<Arc<dyn MetadataParser>>,
    items: Vec<MediaItem>,
    chrome: Chrome,
    slots: [Slot; 2],
    /// Which slot is current; toggled on every slide change.
    second_active: bool,
    slot_swaps: u64,
    thumbnail_nodes: Vec<NodeId>,
    is_open: bool,
    current_index: usize,
    content: Option<MediaKind>,
    zoom: ZoomState,
    drag: DragTracker,
    frame: FrameGate,
    interface_hidden: bool,
    keyboard_interaction: bool,
    return_focus: Option<NodeId>,
    /// Bumped on every slide change; background results carry the value
    /// they were started under.
    generation: u64,
    tx: flume::Sender<ViewerMessage>,
    rx: flume::Receiver<ViewerMessage>,
    destroyed: bool,
}

impl Viewer {
    /// Reads the entries and builds the overlay under `body`. Returns `None`
    /// when the selector container is missing or there is nothing to show.
    pub fn init(
        doc: &mut Document,
        source: ViewerSource,
        update: ViewerOptionsUpdate,
        metadata: Option<Arc<dyn MetadataParser>>,
    ) -> Option<Self> {
        let gallery = match &source {
            ViewerSource::Selector { container_id, .. } => {
                let Some(node) = doc.get_element_by_id(container_id) else {
                    trace!("viewer source #{} not found", container_id);
                    return None;
                };
                Some(node)
            }
            ViewerSource::Items(_) => None,
        };

        let items = read_items(doc, &source, gallery);
        if items.is_empty() {
            trace!("viewer has no entries");
            return None;
        }

        let (chrome, slots) = build_overlay(doc);
        let (tx, rx) = flume::unbounded();
        let mut viewer = Self {
            source,
            gallery,
            options: ViewerOptions::default().merged(update),
            metadata,
            items,
            chrome,
            slots,
            second_active: false,
            slot_swaps: 0,
            thumbnail_nodes: Vec::new(),
            is_open: false,
            current_index: 0,
            content: None,
            zoom: ZoomState::default(),
            drag: DragTracker::default(),
            frame: FrameGate::default(),
            interface_hidden: false,
            keyboard_interaction: false,
            return_focus: None,
            generation: 0,
            tx,
            rx,
            destroyed: false,
        };
        viewer.apply_options(doc, None);

        debug!("viewer ready with {} entries", viewer.items.len());
        Some(viewer)
    }

    // --- Public operations ---

    /// Shows the overlay at `index`, wrapped into range.
    pub fn open(&mut self, doc: &mut Document, index: usize, direction: Direction) {
        if self.destroyed || self.items.is_empty() {
            return;
        }
        let index = index % self.items.len();
        if !self.is_open {
            self.return_focus = doc.active_element();
        }
        doc.remove_attribute(self.chrome.root, "inert");
        doc.add_class(self.chrome.root, "active");
        doc.set_style(doc.body(), "overflow", "hidden");
        self.is_open = true;
        self.show_slide(doc, index, direction);
    }

    pub fn close(&mut self, doc: &mut Document) {
        if self.destroyed {
            return;
        }
        let root = self.chrome.root;
        doc.remove_class(root, "active");
        doc.set_attribute(root, "inert", "");
        doc.set_style(doc.body(), "overflow", "");

        for slot in self.slots {
            doc.remove_class(slot.wrapper, "active");
        }
        let animation = self.options.animation.clone();
        self.remove_animation_classes(doc, &animation);
        self.reset_zoom(doc);
        self.stop_video(doc);

        self.is_open = false;
        self.drag.end();
        self.frame.cancel();
        self.generation = self.generation.wrapping_add(1);

        if let Some(node) = self.return_focus.take() {
            doc.focus(node);
        }
        trace!("viewer closed at {}", self.current_index);
    }

    pub fn next(&mut self, doc: &mut Document) {
        let len = self.items.len();
        if len <= 1 {
            return;
        }
        self.show_slide(doc, (self.current_index + 1) % len, Direction::Right);
    }

    pub fn prev(&mut self, doc: &mut Document) {
        let len = self.items.len();
        if len <= 1 {
            return;
        }
        self.show_slide(doc, (self.current_index + len - 1) % len, Direction::Left);
    }

    /// Hides the chrome; only for unzoomed images and videos.
    pub fn hide_interface(&mut self, doc: &mut Document) {
        let media = matches!(self.content, Some(MediaKind::Image | MediaKind::Video));
        if !self.zoom.is_zoomed() && media && self.options.hide {
            doc.add_class(self.chrome.root, "interface-hidden");
            self.interface_hidden = true;
            self.update_visibility(doc);
        }
    }

    pub fn show_interface(&mut self, doc: &mut Document) {
        if !self.zoom.is_zoomed() {
            doc.remove_class(self.chrome.root, "interface-hidden");
            self.interface_hidden = false;
            self.update_visibility(doc);
        }
    }

    pub fn zoom_in(&mut self, doc: &mut Document) {
        if self.options.zoom
            && self.content == Some(MediaKind::Image)
            && self.zoom.zoom_in(&self.options.zoom_levels)
        {
            self.set_zoom(doc);
        }
    }

    pub fn zoom_out(&mut self, doc: &mut Document) {
        if self.options.zoom && self.content == Some(MediaKind::Image) && self.zoom.zoom_out() {
            self.set_zoom(doc);
        }
    }

    pub fn toggle_info(&mut self, doc: &mut Document) {
        if self.options.info {
            doc.toggle_class(self.chrome.root, "info");
        }
    }

    /// Re-reads the entries from the source and rebuilds the thumbnails.
    pub fn refresh_elements(&mut self, doc: &mut Document) {
        if self.destroyed {
            return;
        }
        if let ViewerSource::Selector { container_id, .. } = &self.source {
            self.gallery = doc.get_element_by_id(container_id);
        }
        self.items = read_items(doc, &self.source, self.gallery);
        if self.current_index >= self.items.len() {
            self.current_index = 0;
        }
        self.apply_options(doc, None);
        debug!("viewer refreshed: {} entries", self.items.len());
    }

    pub fn update_options(&mut self, doc: &mut Document, update: ViewerOptionsUpdate) {
        if self.destroyed {
            return;
        }
        let old = self.options.clone();
        self.options.apply(update);
        self.apply_options(doc, Some(&old));
    }

    /// Removes the overlay. The viewer ignores all later calls.
    pub fn destroy(&mut self, doc: &mut Document) {
        if self.destroyed {
            return;
        }
        if self.is_open {
            doc.set_style(doc.body(), "overflow", "");
        }
        doc.remove(self.chrome.root);
        self.items.clear();
        self.thumbnail_nodes.clear();
        self.is_open = false;
        self.frame.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.destroyed = true;
    }

    pub fn state(&self) -> ViewerState {
        ViewerState {
            is_open: self.is_open,
            current_index: self.current_index,
            zoom_level: self.zoom.level(),
            drag_offset_x: self.zoom.translate_x,
            drag_offset_y: self.zoom.translate_y,
            interface_hidden: self.interface_hidden,
            active_slot: if self.second_active {
                SlotId::B
            } else {
                SlotId::A
            },
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Overlay root element.
    pub fn root(&self) -> NodeId {
        self.chrome.root
    }

    /// Number of slot swaps since creation.
    pub fn slot_swaps(&self) -> u64 {
        self.slot_swaps
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Applies finished background work (metadata, delayed preloads).
    /// Results from an earlier slide are dropped.
    pub fn poll(&mut self, doc: &mut Document) -> bool {
        let mut changed = false;
        while let Ok(message) = self.rx.try_recv() {
            match message {
                ViewerMessage::Metadata { generation, exif } => {
                    if self.destroyed || generation != self.generation || !self.is_open {
                        trace!("dropping metadata from slide generation {}", generation);
                        continue;
                    }
                    let index = self.current_index;
                    let Some(item) = self.items.get_mut(index) else {
                        continue;
                    };
                    item.exif = Some(exif);
                    if self.options.info {
                        let markup = info_markup(item.title.as_deref(), item.exif.as_ref());
                        doc.set_markup(self.chrome.info_panel, markup);
                        changed = true;
                    }
                }
                ViewerMessage::Preload { generation, src } => {
                    if self.destroyed || generation != self.generation {
                        continue;
                    }
                    doc.set_attribute(self.chrome.preload[1], "src", src);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Applies a coalesced pan update.
    pub fn on_animation_frame(&mut self, doc: &mut Document) -> bool {
        if self.destroyed || !self.frame.take() {
            return false;
        }
        self.update_image_position(doc);
        true
    }

    /// Dispatches host input. Returns whether the viewer consumed it.
    pub fn handle_event(&mut self, doc: &mut Document, event: InputEvent) -> bool {
        if self.destroyed {
            return false;
        }
        match event {
            InputEvent::MouseDown => {
                self.keyboard_interaction = false;
                false
            }
            InputEvent::KeyDown { key, shift } => self.on_key_down(doc, &key, shift),
            InputEvent::PointerDown { target, x, y } => {
                if !self.is_open || !self.slots.iter().any(|s| s.image == target) {
                    return false;
                }
                self.drag
                    .begin(x, y, self.zoom.translate_x, self.zoom.translate_y);
                true
            }
            InputEvent::PointerMove { x, y } => self.on_pointer_move(doc, x, y),
            InputEvent::PointerUp | InputEvent::PointerCancel => self.on_pointer_up(doc),
            InputEvent::Click { target } => self.on_click(doc, target),
        }
    }

    // --- Input ---

    fn on_key_down(&mut self, doc: &mut Document, key: &Key, shift: bool) -> bool {
        if !self.is_open {
            return false;
        }
        if key.is_navigation() {
            self.keyboard_interaction = true;
        }
        match action_for_key(key, shift) {
            Some(action) => {
                self.run(doc, action);
                true
            }
            None => false,
        }
    }

    fn run(&mut self, doc: &mut Document, action: ViewerAction) {
        match action {
            ViewerAction::Close => self.close(doc),
            ViewerAction::Prev => self.prev(doc),
            ViewerAction::Next => self.next(doc),
            ViewerAction::ToggleInfo => self.toggle_info(doc),
            ViewerAction::ZoomIn => self.zoom_in(doc),
            ViewerAction::ZoomOut => self.zoom_out(doc),
            ViewerAction::HideInterface => self.hide_interface(doc),
            ViewerAction::ShowInterface => self.show_interface(doc),
            ViewerAction::FocusNext => self.cycle_focus(doc, false),
            ViewerAction::FocusPrev => self.cycle_focus(doc, true),
        }
    }

    fn cycle_focus(&mut self, doc: &mut Document, backward: bool) {
        let controls = focusable_controls(doc, self.chrome.root);
        if let Some(node) = next_focus(&controls, doc.active_element(), backward) {
            doc.focus(node);
        }
    }

    fn on_pointer_move(&mut self, doc: &mut Document, x: f64, y: f64) -> bool {
        if !self.is_open || !self.drag.is_dragging() {
            return false;
        }
        let (dx, dy) = self.drag.offset_at(x, y);

        if self.zoom.is_zoomed() {
            self.zoom.translate_x = dx;
            self.zoom.translate_y = dy;
            self.frame.request();
            return true;
        }

        let (dx, dy, axis) = lock_axis(dx, dy);
        self.zoom.translate_x = dx;
        self.zoom.translate_y = dy;
        let follow = match axis {
            Axis::Horizontal => self.options.translate_on_horizontal_swipe,
            Axis::Vertical => self.options.translate_on_vertical_swipe,
        };
        if follow {
            self.frame.request();
        }

        if let Some(swipe) = classify_swipe(dx, dy) {
            trace!(?swipe, "swipe");
            self.drag.end();
            match swipe {
                Swipe::Prev => self.prev(doc),
                Swipe::Next => self.next(doc),
                Swipe::Dismiss => self.close(doc),
            }
        }
        true
    }

    fn on_pointer_up(&mut self, doc: &mut Document) -> bool {
        let was_dragging = self.drag.is_dragging();
        if self.is_open && !self.zoom.is_zoomed() {
            self.zoom.translate_x = 0.0;
            self.zoom.translate_y = 0.0;
            self.update_image_position(doc);
        }
        self.drag.end();
        was_dragging
    }

    fn on_click(&mut self, doc: &mut Document, target: NodeId) -> bool {
        if self.is_open && self.on_overlay_click(doc, target) {
            return true;
        }

        let (Some(gallery), ViewerSource::Selector { tag, .. }) = (self.gallery, &self.source)
        else {
            return false;
        };
        if !doc.is_inclusive_ancestor(gallery, target) {
            return false;
        }
        let Some(clicked) = doc.closest(target, tag) else {
            return false;
        };
        let position = doc
            .descendants_by_tag(gallery, tag)
            .iter()
            .position(|node| *node == clicked);
        match position {
            Some(index) => {
                self.open(doc, index, Direction::None);
                true
            }
            None => false,
        }
    }

    fn on_overlay_click(&mut self, doc: &mut Document, target: NodeId) -> bool {
        let c = self.chrome;
        let buttons = [
            (c.close, Some(ViewerAction::Close)),
            (c.prev, Some(ViewerAction::Prev)),
            (c.next, Some(ViewerAction::Next)),
            (c.zoom_in, Some(ViewerAction::ZoomIn)),
            (c.zoom_out, Some(ViewerAction::ZoomOut)),
            (c.info, Some(ViewerAction::ToggleInfo)),
            (c.interface, None),
        ];
        if let Some((button, action)) = buttons
            .into_iter()
            .find(|(button, _)| doc.is_inclusive_ancestor(*button, target))
        {
            if doc.has_attribute(button, "inert") {
                return true;
            }
            match action {
                Some(action) => self.run(doc, action),
                None if self.interface_hidden => self.show_interface(doc),
                None => self.hide_interface(doc),
            }
            if !self.keyboard_interaction {
                doc.blur(button);
            }
            return true;
        }

        if self
            .slots
            .iter()
            .any(|slot| doc.is_inclusive_ancestor(slot.background, target))
        {
            if self.options.click_outside_to_close {
                self.close(doc);
            }
            return true;
        }

        let thumbnail = self
            .thumbnail_nodes
            .iter()
            .position(|node| doc.is_inclusive_ancestor(*node, target));
        if let Some(index) = thumbnail {
            if self.current_index > index {
                self.open(doc, index, Direction::Left);
            } else if self.current_index < index {
                self.open(doc, index, Direction::Right);
            }
            return true;
        }
        false
    }

    // --- Rendering ---

    fn current_slot(&self) -> Slot {
        self.slots[usize::from(self.second_active)]
    }

    fn previous_slot(&self) -> Slot {
        self.slots[usize::from(!self.second_active)]
    }

    fn show_slide(&mut self, doc: &mut Document, index: usize, direction: Direction) {
        let Some(item) = self.items.get(index).cloned() else {
            return;
        };
        self.current_index = index;
        self.stop_video(doc);

        if self.options.thumbnails {
            self.highlight_thumbnail(doc, index);
        }

        self.second_active = !self.second_active;
        self.slot_swaps += 1;
        self.generation = self.generation.wrapping_add(1);
        let slot = self.current_slot();
        let previous = self.previous_slot();
        let root = self.chrome.root;

        doc.set_attribute(slot.image, "src", "");
        doc.set_attribute(slot.video, "src", "");
        doc.set_style(slot.image, "background-image", "");
        doc.clear_children(slot.body);
        doc.clear_content(slot.body);
        doc.set_text(
            self.chrome.counter,
            format!("{} / {}", index + 1, self.items.len()),
        );
        doc.set_data(slot.wrapper, "index", index.to_string());

        let type_class = match item.kind {
            MediaKind::Image => {
                doc.remove_class(root, "force-hide-thumbnails");
                doc.set_attribute(slot.image, "src", item.src().unwrap_or_default());
                if let Some(preview) = item.preview() {
                    doc.set_style(slot.image, "background-image", format!("url({preview})"));
                }
                "obsidium-type-image"
            }
            MediaKind::Video => {
                doc.remove_class(root, "force-hide-thumbnails");
                doc.set_attribute(slot.video, "src", item.src().unwrap_or_default());
                "obsidium-type-video"
            }
            MediaKind::Text => {
                doc.add_class(root, "force-hide-thumbnails");
                if let Some(text) = &item.text {
                    doc.set_markup(slot.body, text.as_str());
                }
                if let Some(id) = &item.element {
                    self.clone_element_children(doc, id, slot.body);
                }
                "obsidium-type-content"
            }
        };
        self.content = Some(item.kind);
        for class in TYPE_CLASSES {
            if class != type_class {
                doc.remove_class(slot.wrapper, class);
            }
        }
        doc.add_class(slot.wrapper, type_class);

        if self.options.title {
            doc.set_text(slot.title, item.title.clone().unwrap_or_default());
        }

        let animation = self.options.animation.clone();
        self.remove_animation_classes(doc, &animation);
        match direction {
            Direction::Left => {
                doc.add_class(slot.wrapper, &format!("animation-in-prev-{animation}"));
                doc.add_class(previous.wrapper, &format!("animation-out-next-{animation}"));
            }
            Direction::Right => {
                doc.add_class(slot.wrapper, &format!("animation-in-next-{animation}"));
                doc.add_class(previous.wrapper, &format!("animation-out-prev-{animation}"));
            }
            Direction::None => {}
        }
        doc.remove_class(previous.wrapper, "active");
        doc.add_class(slot.wrapper, "active");

        self.reset_zoom(doc);
        if self.options.info {
            self.set_info(doc, &item);
        }
        if self.options.preload {
            self.preload_neighbors(doc, index, direction);
        }
        self.update_visibility(doc);
        trace!(index, ?direction, "slide shown");
    }

    fn clone_element_children(&self, doc: &mut Document, id: &str, dest: NodeId) {
        let Some(source) = doc.get_element_by_id(id) else {
            warn!("text source element #{} not found", id);
            return;
        };
        let children = doc.children(source).to_vec();
        for child in children {
            if let Some(copy) = doc.deep_clone(child) {
                doc.append_child(dest, copy);
            }
        }
    }

    fn stop_video(&self, doc: &mut Document) {
        let video = self.current_slot().video;
        if self.content == Some(MediaKind::Video)
            && doc.attribute(video, "src").is_some_and(|s| !s.is_empty())
        {
            doc.pause(video);
        }
    }

    fn highlight_thumbnail(&self, doc: &mut Document, index: usize) {
        for node in &self.thumbnail_nodes {
            doc.remove_class(*node, "active");
        }
        let Some(active) = self.thumbnail_nodes.get(index) else {
            return;
        };
        doc.add_class(*active, "active");

        let size = self.options.thumbnails_size;
        let step = size + self.options.thumbnails_gap;
        let wrapper = self.chrome.thumbnails_wrapper;
        let offset = index as f64 * step + size / 2.0 - doc.client_width(wrapper) / 2.0;
        doc.scroll_to(wrapper, offset, true);
    }

    fn remove_animation_classes(&self, doc: &mut Document, animation: &str) {
        for slot in self.slots {
            for prefix in ANIMATION_PREFIXES {
                doc.remove_class(slot.wrapper, &format!("{prefix}-{animation}"));
            }
        }
    }

    fn reset_zoom(&mut self, doc: &mut Document) {
        self.zoom.reset();
        self.set_zoom(doc);
    }

    fn set_zoom(&mut self, doc: &mut Document) {
        if self.content != Some(MediaKind::Image) {
            return;
        }
        let image = self.current_slot().image;
        self.zoom.settle(&self.options.zoom_levels);
        doc.set_text(self.chrome.zoom_ratio, self.zoom.label(&self.options.zoom_levels));
        if self.zoom.is_zoomed() {
            self.update_image_position(doc);
            doc.add_class(image, "zoomed");
        } else {
            doc.set_style(image, "transform", "");
            doc.remove_class(image, "zoomed");
        }
        self.update_visibility(doc);
    }

    fn update_image_position(&mut self, doc: &mut Document) {
        let image = self.current_slot().image;
        doc.set_style(
            image,
            "transform",
            self.zoom.transform(&self.options.zoom_levels),
        );
        self.frame.cancel();
    }

    /// Renders the panel now, from embedded metadata when present; otherwise
    /// renders a placeholder and parses metadata in the background.
    fn set_info(&self, doc: &mut Document, item: &MediaItem) {
        let panel = self.chrome.info_panel;
        let title = item.title.as_deref();
        if let Some(exif) = &item.exif {
            doc.set_markup(panel, info_markup(title, Some(exif)));
            return;
        }
        doc.set_markup(panel, info_markup(title, None));

        if !self.options.load_exif || item.kind != MediaKind::Image {
            return;
        }
        let (Some(parser), Some(src)) = (self.metadata.clone(), item.src().map(str::to_string))
        else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            trace!("no runtime, skipping metadata for {}", src);
            return;
        };
        let generation = self.generation;
        let tx = self.tx.clone();
        handle.spawn(async move {
            match parser.parse(&src).await {
                Ok(exif) => {
                    let _ = tx.send(ViewerMessage::Metadata { generation, exif });
                }
                Err(e) => debug!("no metadata for {}: {:#}", src, e),
            }
        });
    }

    fn preload_source(&self, index: usize) -> Option<String> {
        self.items
            .get(index)
            .filter(|item| item.kind == MediaKind::Image)
            .and_then(|item| item.src())
            .map(str::to_string)
    }

    fn preload_neighbors(&self, doc: &mut Document, index: usize, direction: Direction) {
        let len = self.items.len();
        if len > 1 {
            let near = match direction {
                Direction::Left => (index + len - 1) % len,
                Direction::Right | Direction::None => (index + 1) % len,
            };
            if let Some(src) = self.preload_source(near) {
                doc.set_attribute(self.chrome.preload[0], "src", src);
            }
        }
        if len <= 2 {
            return;
        }
        let Some(src) = self.preload_source(far_neighbor(index, len, direction)) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let generation = self.generation;
                let tx = self.tx.clone();
                let delay = config::preload_delay();
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(ViewerMessage::Preload { generation, src });
                });
            }
            Err(_) => doc.set_attribute(self.chrome.preload[1], "src", src),
        }
    }

    fn update_visibility(&self, doc: &mut Document) {
        let hidden = self.interface_hidden;
        let zoomed = self.zoom.is_zoomed();
        let image = self.content == Some(MediaKind::Image);
        let media = image || self.content == Some(MediaKind::Video);
        let chrome_shown = !hidden && !zoomed;
        let c = self.chrome;

        set_visible(doc, c.zoom_out, zoomed && image);
        set_visible(doc, c.zoom_in, (!hidden && image) || zoomed);
        set_visible(doc, c.zoom_ratio, zoomed);
        set_visible(doc, c.counter, chrome_shown);
        set_visible(doc, self.current_slot().title, chrome_shown && media);
        set_visible(doc, c.thumbnails, chrome_shown && media);
        set_visible(doc, c.interface, !zoomed);
        set_visible(doc, c.prev, chrome_shown && self.items.len() > 1);
        set_visible(doc, c.next, chrome_shown && self.items.len() > 1);
        set_visible(doc, c.info_panel, chrome_shown);
        set_visible(doc, c.info, chrome_shown);
        set_visible(doc, c.close, chrome_shown);
    }

    fn fill_thumbnails(&mut self, doc: &mut Document) {
        doc.clear_children(self.chrome.thumbnails);
        self.thumbnail_nodes.clear();
        if !self.options.thumbnails {
            return;
        }
        for (index, item) in self.items.iter().enumerate() {
            let thumb = element(doc, self.chrome.thumbnails, "div", "obsidium-thumbnail");
            if let Some(preview) = item.preview() {
                doc.set_style(thumb, "background-image", format!("url({preview})"));
            }
            doc.set_data(thumb, "index", index.to_string());
            if self.is_open && index == self.current_index {
                doc.add_class(thumb, "active");
            }
            self.thumbnail_nodes.push(thumb);
        }
    }

    fn apply_options(&mut self, doc: &mut Document, old: Option<&ViewerOptions>) {
        let c = self.chrome;
        let len = self.items.len();
        let display = |on: bool| if on { "block" } else { "none" };
        let o = &self.options;

        doc.set_style(c.zoom_in, "display", display(o.zoom));
        doc.set_style(c.zoom_out, "display", display(o.zoom));
        doc.set_style(c.zoom_ratio, "display", display(o.zoom));
        doc.set_style(c.counter, "display", display(o.counter && len > 1));
        doc.set_style(c.info, "display", display(o.info));
        doc.set_style(c.info_panel, "display", display(o.info));
        doc.set_style(c.interface, "display", display(o.hide));
        for slot in self.slots {
            doc.set_style(slot.title, "display", display(o.title));
            doc.set_style(slot.background, "display", display(o.click_outside_to_close));
        }
        doc.add_class(c.root, &format!("obsidium-theme-{}", o.theme));

        if !o.thumbnails || len == 1 {
            doc.set_style(c.thumbnails_wrapper, "display", "none");
            doc.remove_class(c.root, "has-thumbnails");
        } else {
            doc.set_style(c.thumbnails_wrapper, "display", "block");
            doc.add_class(c.root, "has-thumbnails");
            doc.set_style(c.root, "--thumbnail-size", format!("{}px", o.thumbnails_size));
            doc.set_style(c.root, "--thumbnail-gap", format!("{}px", o.thumbnails_gap));
            self.fill_thumbnails(doc);
        }

        if let Some(old) = old {
            if old.animation != self.options.animation {
                self.remove_animation_classes(doc, &old.animation);
            }
            if old.theme != self.options.theme {
                doc.remove_class(c.root, &format!("obsidium-theme-{}", old.theme));
            }
        }

        if !self.is_open {
            return;
        }
        if self.zoom.is_zoomed() && !self.options.zoom {
            self.reset_zoom(doc);
        }
        if self.interface_hidden && !self.options.hide {
            self.show_interface(doc);
        }
        let levels_changed = old.is_some_and(|old| old.zoom_levels != self.options.zoom_levels);
        if levels_changed && self.zoom.is_zoomed() {
            let level = usize::from(!self.options.zoom_levels.is_empty());
            self.zoom.set_level(level);
            self.set_zoom(doc);
        }
    }
}

/// Index preloaded after the delay, two steps ahead in the direction of
/// travel. Without a direction it is the previous slide.
fn far_neighbor(index: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Right => {
            if index + 2 < len {
                index + 2
            } else if index + 1 < len {
                0
            } else {
                1
            }
        }
        Direction::Left => {
            if index >= 2 {
                index - 2
            } else if index == 1 {
                len - 1
            } else {
                len - 2
            }
        }
        Direction::None => (index + len - 1) % len,
    }
}

fn set_visible(doc: &mut Document, node: NodeId, visible: bool) {
    if visible {
        doc.remove_class(node, HIDDEN_CLASS);
        doc.remove_attribute(node, "inert");
    } else {
        doc.add_class(node, HIDDEN_CLASS);
        doc.set_attribute(node, "inert", "");
    }
}

fn element(doc: &mut Document, parent: NodeId, tag: &str, class: &str) -> NodeId {
    let node = doc.create_element(tag);
    doc.add_class(node, class);
    doc.append_child(parent, node);
    node
}

fn read_items(doc: &Document, source: &ViewerSource, gallery: Option<NodeId>) -> Vec<MediaItem> {
    match (source, gallery) {
        (ViewerSource::Items(entries), _) => {
            entries.iter().cloned().map(MediaItem::from_entry).collect()
        }
        (ViewerSource::Selector { tag, .. }, Some(gallery)) => doc
            .descendants_by_tag(gallery, tag)
            .into_iter()
            .map(|node| MediaItem::from_entry(entry_from_element(doc, node)))
            .collect(),
        (ViewerSource::Selector { .. }, None) => Vec::new(),
    }
}

/// Reads `data-src`, `src`/`data-preview`, `title`/`data-title` and the
/// `data-exif` JSON of a gallery element.
fn entry_from_element(doc: &Document, node: NodeId) -> ManifestEntry {
    let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
    let exif = doc.data(node, "exif").and_then(|raw| {
        serde_json::from_str::<ExifMetadata>(raw)
            .map_err(|e| warn!("ignoring malformed data-exif: {}", e))
            .ok()
    });
    ManifestEntry {
        src: non_empty(doc.data(node, "src")),
        preview: non_empty(doc.attribute(node, "src"))
            .or_else(|| non_empty(doc.data(node, "preview"))),
        title: non_empty(doc.attribute(node, "title"))
            .or_else(|| non_empty(doc.data(node, "title"))),
        exif,
        ..ManifestEntry::default()
    }
}

fn build_slot(doc: &mut Document, container: NodeId, n: usize) -> Slot {
    let n = n.to_string();
    let wrapper = element(doc, container, "div", "obsidium-wrapper");
    doc.set_data(wrapper, "wrapper", n.as_str());

    let image = element(doc, wrapper, "img", "obsidium-image");
    doc.set_attribute(image, "src", "");
    doc.set_attribute(image, "alt", "");
    doc.set_data(image, "img", n.as_str());

    let video = element(doc, wrapper, "video", "obsidium-video");
    doc.set_attribute(video, "src", "");
    doc.set_attribute(video, "controls", "");
    doc.set_data(video, "video", n.as_str());

    let content = element(doc, wrapper, "div", "obsidium-content-wrapper");
    doc.set_data(content, "content", n.as_str());
    let content_box = element(doc, content, "div", "obsidium-content-box");
    let body = element(doc, content_box, "div", "obsidium-content-body");

    let title_box = element(doc, wrapper, "div", "obsidium-title");
    let title = doc.create_element("div");
    doc.set_data(title, "title", n.as_str());
    doc.append_child(title_box, title);

    let background = element(doc, wrapper, "div", "obsidium-wrapper-background");
    doc.set_data(background, "bg", n.as_str());

    Slot {
        wrapper,
        image,
        video,
        body,
        title,
        background,
    }
}

fn build_overlay(doc: &mut Document) -> (Chrome, [Slot; 2]) {
    let root = doc.create_element("div");
    doc.add_class(root, "obsidium");
    doc.set_attribute(root, "role", "dialog");
    doc.set_attribute(root, "aria-modal", "true");
    doc.set_attribute(root, "inert", "");

    let container = element(doc, root, "div", "obsidium-container");
    let slots = [build_slot(doc, container, 1), build_slot(doc, container, 2)];

    let counter = element(doc, root, "div", "obsidium-counter");
    doc.set_text(counter, "0 / 0");
    let info_panel = element(doc, root, "div", "obsidium-info-wrapper");
    let zoom_ratio = element(doc, root, "div", "obsidium-zoom-ratio");
    let thumbnails_wrapper = element(doc, root, "div", "obsidium-thumbnails-wrapper");
    let thumbnails = element(doc, thumbnails_wrapper, "div", "obsidium-thumbnails");

    let mut button = |class: &str, tabindex: u8, label: &str, icon: &str| {
        let node = element(doc, root, "button", "obsidium-btn");
        doc.add_class(node, class);
        doc.set_attribute(node, "tabindex", tabindex.to_string());
        doc.set_attribute(node, "aria-label", label);
        doc.set_markup(node, icon);
        node
    };
    let close = button("obsidium-close", 1, "Close", icons::CLOSE_BUTTON);
    let prev = button("obsidium-prev", 5, "Prev", icons::PREV_BUTTON);
    let next = button("obsidium-next", 2, "Next", icons::NEXT_BUTTON);
    let zoom_in = button("obsidium-zoom-in", 6, "Zoom in", icons::ZOOM_IN_BUTTON);
    let zoom_out = button("obsidium-zoom-out", 7, "Zoom out", icons::ZOOM_OUT_BUTTON);
    let interface = button("obsidium-interface", 4, "Hide interface", icons::INTERFACE_BUTTON);
    let info = button("obsidium-info", 3, "Info", icons::INFO_BUTTON);

    let near = element(doc, root, "img", "obsidium-preload");
    doc.set_data(near, "preload", "1");
    doc.set_attribute(near, "fetchpriority", "high");
    doc.set_attribute(near, "src", "");
    let far = element(doc, root, "img", "obsidium-preload");
    doc.set_data(far, "preload", "2");
    doc.set_attribute(far, "src", "");

    doc.append_child(doc.body(), root);

    let chrome = Chrome {
        root,
        counter,
        info_panel,
        zoom_ratio,
        thumbnails_wrapper,
        thumbnails,
        close,
        prev,
        next,
        zoom_in,
        zoom_out,
        interface,
        info,
        preload: [near, far],
    };
    (chrome, slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::to_html;
    use async_trait::async_trait;
    use std::time::Duration;

    fn images(n: usize) -> Vec<ManifestEntry> {
        (0..n)
            .map(|i| ManifestEntry {
                preview: Some(format!("thumb{i}.jpg")),
                title: Some(format!("Photo {i}")),
                ..ManifestEntry::image(&format!("img{i}.jpg"))
            })
            .collect()
    }

    fn viewer(doc: &mut Document, entries: Vec<ManifestEntry>) -> Viewer {
        Viewer::init(doc, ViewerSource::Items(entries), ViewerOptionsUpdate::default(), None)
            .expect("viewer")
    }

    fn find(doc: &Document, root: NodeId, class: &str) -> NodeId {
        doc.descendants_by_class(root, class)[0]
    }

    fn active_wrappers(doc: &Document, root: NodeId) -> Vec<String> {
        doc.descendants_by_class(root, "obsidium-wrapper")
            .into_iter()
            .filter(|w| doc.has_class(*w, "active"))
            .map(|w| doc.data(w, "index").unwrap_or_default().to_string())
            .collect()
    }

    fn current_image(doc: &Document, v: &Viewer) -> NodeId {
        let wrapper = doc
            .descendants_by_class(v.root(), "obsidium-wrapper")
            .into_iter()
            .find(|w| doc.has_class(*w, "active"))
            .expect("active wrapper");
        doc.descendants_by_tag(wrapper, "img")[0]
    }

    struct ModelParser;

    #[async_trait]
    impl MetadataParser for ModelParser {
        async fn parse(&self, url: &str) -> anyhow::Result<ExifMetadata> {
            Ok(ExifMetadata {
                make: Some("Cam".into()),
                model: Some(url.to_string()),
                ..ExifMetadata::default()
            })
        }
    }

    #[test]
    fn test_init_requires_entries_and_container() {
        let mut doc = Document::new(1024.0);
        assert!(Viewer::init(
            &mut doc,
            ViewerSource::Items(Vec::new()),
            ViewerOptionsUpdate::default(),
            None
        )
        .is_none());
        assert!(Viewer::init(
            &mut doc,
            ViewerSource::selector("missing"),
            ViewerOptionsUpdate::default(),
            None
        )
        .is_none());
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn test_overlay_structure() {
        let mut doc = Document::new(1024.0);
        let v = viewer(&mut doc, images(5));
        let root = v.root();

        assert_eq!(doc.attribute(root, "role"), Some("dialog"));
        assert_eq!(doc.attribute(root, "aria-modal"), Some("true"));
        assert!(doc.has_attribute(root, "inert"));
        assert!(doc.has_class(root, "obsidium-theme-dark"));
        assert!(doc.has_class(root, "has-thumbnails"));
        assert_eq!(doc.descendants_by_class(root, "obsidium-wrapper").len(), 2);
        assert_eq!(doc.descendants_by_tag(root, "button").len(), 7);
        assert_eq!(doc.descendants_by_class(root, "obsidium-thumbnail").len(), 5);
        assert!(to_html(&doc, root).contains("aria-label=\"Zoom in\""));
    }

    #[test]
    fn test_open_at_two_then_prev_twice() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(5));

        v.open(&mut doc, 2, Direction::None);
        assert_eq!(v.slot_swaps(), 1);
        assert_eq!(active_wrappers(&doc, v.root()), vec!["2"]);
        let first_slot = v.state().active_slot;

        v.prev(&mut doc);
        assert_eq!(active_wrappers(&doc, v.root()), vec!["1"]);
        assert_ne!(v.state().active_slot, first_slot);

        v.prev(&mut doc);
        assert_eq!(active_wrappers(&doc, v.root()), vec!["0"]);
        assert_eq!(v.state().active_slot, first_slot);

        assert_eq!(v.state().current_index, 0);
        assert_eq!(v.slot_swaps() - 1, 2);
    }

    #[test]
    fn test_wrap_navigation() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(4));
        v.open(&mut doc, 0, Direction::None);
        for _ in 0..4 {
            v.next(&mut doc);
        }
        assert_eq!(v.state().current_index, 0);
        v.prev(&mut doc);
        assert_eq!(v.state().current_index, 3);

        v.open(&mut doc, 9, Direction::None);
        assert_eq!(v.state().current_index, 1);
    }

    #[test]
    fn test_single_entry_does_not_navigate() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(1));
        v.open(&mut doc, 0, Direction::None);
        v.next(&mut doc);
        v.prev(&mut doc);
        assert_eq!(v.slot_swaps(), 1);

        let root = v.root();
        assert_eq!(
            doc.style(find(&doc, root, "obsidium-thumbnails-wrapper"), "display"),
            Some("none")
        );
        assert_eq!(
            doc.style(find(&doc, root, "obsidium-counter"), "display"),
            Some("none")
        );
        assert!(doc.has_class(find(&doc, root, "obsidium-next"), HIDDEN_CLASS));
    }

    #[test]
    fn test_slide_fill_counter_and_animation() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(5));
        let root = v.root();
        v.open(&mut doc, 0, Direction::None);
        v.next(&mut doc);

        assert_eq!(doc.text(find(&doc, root, "obsidium-counter")), "2 / 5");
        let image = current_image(&doc, &v);
        assert_eq!(doc.attribute(image, "src"), Some("img1.jpg"));
        assert_eq!(doc.style(image, "background-image"), Some("url(thumb1.jpg)"));

        let wrappers = doc.descendants_by_class(root, "obsidium-wrapper");
        let (current, previous) = if doc.has_class(wrappers[0], "active") {
            (wrappers[0], wrappers[1])
        } else {
            (wrappers[1], wrappers[0])
        };
        assert!(doc.has_class(current, "animation-in-next-short-slide"));
        assert!(doc.has_class(current, "obsidium-type-image"));
        assert!(doc.has_class(previous, "animation-out-prev-short-slide"));
        let title = doc.descendants_by_class(current, "obsidium-title")[0];
        assert_eq!(doc.text(doc.children(title)[0]), "Photo 1");

        let thumbs = doc.descendants_by_class(root, "obsidium-thumbnail");
        assert!(doc.has_class(thumbs[1], "active"));
        assert!(!doc.has_class(thumbs[0], "active"));
    }

    #[test]
    fn test_close_restores_focus_and_pauses_video() {
        let mut doc = Document::new(1024.0);
        let link = doc.create_element("a");
        doc.append_child(doc.body(), link);
        doc.focus(link);

        let mut entries = images(2);
        entries.push(ManifestEntry::image("clip.mp4"));
        let mut v = viewer(&mut doc, entries);
        v.open(&mut doc, 2, Direction::None);
        assert_eq!(doc.style(doc.body(), "overflow"), Some("hidden"));
        let video = doc
            .descendants_by_class(v.root(), "obsidium-video")
            .into_iter()
            .find(|n| doc.attribute(*n, "src") == Some("clip.mp4"))
            .expect("video slot");

        v.close(&mut doc);
        assert!(doc.is_paused(video));
        assert!(!v.state().is_open);
        assert!(doc.has_attribute(v.root(), "inert"));
        assert_eq!(doc.style(doc.body(), "overflow"), None);
        assert_eq!(doc.active_element(), Some(link));
        assert!(active_wrappers(&doc, v.root()).is_empty());
    }

    #[test]
    fn test_zoom_bounds_and_image_only() {
        let mut doc = Document::new(1024.0);
        let mut entries = images(1);
        entries.push(ManifestEntry::image("clip.webm"));
        let mut v = viewer(&mut doc, entries);
        let root = v.root();
        v.open(&mut doc, 0, Direction::None);

        v.zoom_out(&mut doc);
        assert_eq!(v.state().zoom_level, 0);
        for _ in 0..10 {
            v.zoom_in(&mut doc);
        }
        assert_eq!(v.state().zoom_level, 4);
        let image = current_image(&doc, &v);
        assert!(doc.has_class(image, "zoomed"));
        assert_eq!(doc.text(find(&doc, root, "obsidium-zoom-ratio")), "3x");
        assert!(!doc.has_class(find(&doc, root, "obsidium-zoom-out"), HIDDEN_CLASS));
        assert!(doc.has_class(find(&doc, root, "obsidium-close"), HIDDEN_CLASS));

        v.next(&mut doc);
        assert_eq!(v.state().zoom_level, 0);
        v.zoom_in(&mut doc);
        assert_eq!(v.state().zoom_level, 0);
    }

    #[test]
    fn test_keyboard_only_while_open() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(3));
        assert!(!v.handle_event(&mut doc, InputEvent::key("ArrowRight")));

        v.open(&mut doc, 0, Direction::None);
        assert!(v.handle_event(&mut doc, InputEvent::key("ArrowRight")));
        assert_eq!(v.state().current_index, 1);
        v.handle_event(&mut doc, InputEvent::key("Backspace"));
        assert_eq!(v.state().current_index, 0);
        v.handle_event(&mut doc, InputEvent::key("="));
        assert_eq!(v.state().zoom_level, 1);
        v.handle_event(&mut doc, InputEvent::key("-"));
        v.handle_event(&mut doc, InputEvent::key("ArrowDown"));
        assert!(v.state().interface_hidden);
        v.handle_event(&mut doc, InputEvent::key("ArrowUp"));
        assert!(!v.state().interface_hidden);
        v.handle_event(&mut doc, InputEvent::key("i"));
        assert!(doc.has_class(v.root(), "info"));
        assert!(!v.handle_event(&mut doc, InputEvent::key("q")));
        v.handle_event(&mut doc, InputEvent::key("Escape"));
        assert!(!v.state().is_open);
    }

    #[test]
    fn test_tab_cycles_visible_controls() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(3));
        let root = v.root();
        v.open(&mut doc, 0, Direction::None);

        let close = find(&doc, root, "obsidium-close");
        let next = find(&doc, root, "obsidium-next");
        let zoom_in = find(&doc, root, "obsidium-zoom-in");

        v.handle_event(&mut doc, InputEvent::key("Tab"));
        assert_eq!(doc.active_element(), Some(close));
        v.handle_event(&mut doc, InputEvent::key("Tab"));
        assert_eq!(doc.active_element(), Some(next));
        v.handle_event(&mut doc, InputEvent::shift_key("Tab"));
        v.handle_event(&mut doc, InputEvent::shift_key("Tab"));
        assert_eq!(doc.active_element(), Some(zoom_in));
    }

    #[test]
    fn test_horizontal_swipe_navigates() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(3));
        v.open(&mut doc, 1, Direction::None);
        let target = current_image(&doc, &v);

        v.handle_event(&mut doc, InputEvent::PointerDown { target, x: 100.0, y: 100.0 });
        v.handle_event(&mut doc, InputEvent::PointerMove { x: 120.0, y: 104.0 });
        assert_eq!(v.state().current_index, 1);
        assert_eq!(v.state().drag_offset_y, 0.0);
        v.handle_event(&mut doc, InputEvent::PointerMove { x: 150.0, y: 104.0 });
        assert_eq!(v.state().current_index, 0);

        // The drag ended with the swipe; further moves do nothing.
        assert!(!v.handle_event(&mut doc, InputEvent::PointerMove { x: 300.0, y: 104.0 }));
        v.handle_event(&mut doc, InputEvent::PointerUp);
        assert_eq!(
            doc.style(current_image(&doc, &v), "transform"),
            Some("translate(0px, 0px) scale(1)")
        );
    }

    #[test]
    fn test_vertical_swipe_closes() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(3));
        v.open(&mut doc, 0, Direction::None);
        let target = current_image(&doc, &v);

        v.handle_event(&mut doc, InputEvent::PointerDown { target, x: 50.0, y: 50.0 });
        v.handle_event(&mut doc, InputEvent::PointerMove { x: 55.0, y: 90.0 });
        assert!(!v.state().is_open);
    }

    #[test]
    fn test_swipe_dismiss_on_video_clears_offset() {
        let mut doc = Document::new(1024.0);
        let clip = ManifestEntry {
            entry_type: Some("video".into()),
            src: Some("clip.mp4".into()),
            ..ManifestEntry::default()
        };
        let mut v = viewer(&mut doc, vec![clip, ManifestEntry::image("a.jpg")]);
        v.open(&mut doc, 0, Direction::None);
        let target = current_image(&doc, &v);

        v.handle_event(&mut doc, InputEvent::PointerDown { target, x: 50.0, y: 50.0 });
        v.handle_event(&mut doc, InputEvent::PointerMove { x: 52.0, y: 120.0 });
        assert!(!v.state().is_open);
        v.handle_event(&mut doc, InputEvent::PointerUp);

        let state = v.state();
        assert_eq!(state.zoom_level, 0);
        assert_eq!((state.drag_offset_x, state.drag_offset_y), (0.0, 0.0));

        v.open(&mut doc, 0, Direction::None);
        assert_eq!(v.state().drag_offset_y, 0.0);
    }

    #[test]
    fn test_pan_is_coalesced_per_frame() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(2));
        v.open(&mut doc, 0, Direction::None);
        v.zoom_in(&mut doc);
        let target = current_image(&doc, &v);

        v.handle_event(&mut doc, InputEvent::PointerDown { target, x: 0.0, y: 0.0 });
        v.handle_event(&mut doc, InputEvent::PointerMove { x: 10.0, y: 5.0 });
        v.handle_event(&mut doc, InputEvent::PointerMove { x: 20.0, y: 10.0 });
        assert_eq!(
            doc.style(target, "transform"),
            Some("translate(0px, 0px) scale(1.5)")
        );

        assert!(v.on_animation_frame(&mut doc));
        assert!(!v.on_animation_frame(&mut doc));
        assert_eq!(
            doc.style(target, "transform"),
            Some("translate(20px, 10px) scale(1.5)")
        );

        v.handle_event(&mut doc, InputEvent::PointerUp);
        assert_eq!(v.state().drag_offset_x, 20.0);
        assert_eq!(v.state().current_index, 0);
    }

    #[test]
    fn test_hide_interface_rules() {
        let mut doc = Document::new(1024.0);
        let mut entries = images(1);
        entries.push(ManifestEntry {
            text: Some("<p>About this album</p>".into()),
            ..ManifestEntry::default()
        });
        let mut v = viewer(&mut doc, entries);
        let root = v.root();
        v.open(&mut doc, 0, Direction::None);

        v.zoom_in(&mut doc);
        v.hide_interface(&mut doc);
        assert!(!v.state().interface_hidden);
        v.zoom_out(&mut doc);
        v.hide_interface(&mut doc);
        assert!(v.state().interface_hidden);
        assert!(doc.has_class(root, "interface-hidden"));
        assert!(doc.has_class(find(&doc, root, "obsidium-counter"), HIDDEN_CLASS));
        v.show_interface(&mut doc);

        v.next(&mut doc);
        v.hide_interface(&mut doc);
        assert!(!v.state().interface_hidden);
        assert!(doc.has_class(root, "force-hide-thumbnails"));
    }

    #[test]
    fn test_text_entry_clones_element_children() {
        let mut doc = Document::new(1024.0);
        let about = doc.create_element("div");
        doc.set_attribute(about, "id", "about");
        let para = doc.create_element("p");
        doc.set_text(para, "Shot on film");
        doc.append_child(about, para);
        doc.append_child(doc.body(), about);

        let mut entries = images(1);
        entries.push(ManifestEntry {
            element: Some("about".into()),
            ..ManifestEntry::default()
        });
        let mut v = viewer(&mut doc, entries);
        v.open(&mut doc, 1, Direction::None);

        let bodies = doc.descendants_by_class(v.root(), "obsidium-content-body");
        let filled: Vec<_> = bodies
            .into_iter()
            .filter(|b| !doc.children(*b).is_empty())
            .collect();
        assert_eq!(filled.len(), 1);
        let copy = doc.children(filled[0])[0];
        assert_ne!(copy, para);
        assert_eq!(doc.text(copy), "Shot on film");
        assert_eq!(doc.children(about), &[para]);
    }

    #[test]
    fn test_selector_source_and_gallery_click() {
        let mut doc = Document::new(1024.0);
        let gallery = doc.create_element("div");
        doc.set_attribute(gallery, "id", "gallery");
        doc.append_child(doc.body(), gallery);
        let mut imgs = Vec::new();
        for i in 0..3 {
            let item = doc.create_element("div");
            let img = doc.create_element("img");
            doc.set_attribute(img, "src", format!("small{i}.jpg"));
            doc.set_data(img, "src", format!("large{i}.jpg"));
            doc.set_attribute(img, "title", format!("T{i}"));
            doc.append_child(item, img);
            doc.append_child(gallery, item);
            imgs.push(img);
        }
        doc.set_data(imgs[0], "exif", r#"{"FNumber": "28/10", "Make": "Cam"}"#);

        let mut v = Viewer::init(
            &mut doc,
            ViewerSource::selector("gallery"),
            ViewerOptionsUpdate::default(),
            None,
        )
        .expect("viewer");
        assert_eq!(v.items().len(), 3);
        assert_eq!(v.items()[1].src(), Some("large1.jpg"));
        assert_eq!(v.items()[1].preview(), Some("small1.jpg"));
        assert_eq!(v.items()[0].exif.as_ref().and_then(|e| e.f_number), Some(2.8));

        assert!(v.handle_event(&mut doc, InputEvent::Click { target: imgs[2] }));
        assert!(v.state().is_open);
        assert_eq!(v.state().current_index, 2);
    }

    #[test]
    fn test_thumbnail_click_infers_direction() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(5));
        let root = v.root();
        v.open(&mut doc, 3, Direction::None);
        let thumbs = doc.descendants_by_class(root, "obsidium-thumbnail");

        v.handle_event(&mut doc, InputEvent::Click { target: thumbs[1] });
        assert_eq!(v.state().current_index, 1);
        let wrapper = doc
            .descendants_by_class(root, "obsidium-wrapper")
            .into_iter()
            .find(|w| doc.has_class(*w, "active"))
            .expect("active");
        assert!(doc.has_class(wrapper, "animation-in-prev-short-slide"));

        let strip = find(&doc, root, "obsidium-thumbnails-wrapper");
        assert!(doc.is_smooth_scrolling(strip));
    }

    #[test]
    fn test_button_click_blurs_unless_keyboard() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(3));
        let next = find(&doc, v.root(), "obsidium-next");
        v.open(&mut doc, 0, Direction::None);

        doc.focus(next);
        v.handle_event(&mut doc, InputEvent::MouseDown);
        v.handle_event(&mut doc, InputEvent::Click { target: next });
        assert_eq!(v.state().current_index, 1);
        assert_eq!(doc.active_element(), None);

        v.handle_event(&mut doc, InputEvent::key("Tab"));
        doc.focus(next);
        v.handle_event(&mut doc, InputEvent::Click { target: next });
        assert_eq!(v.state().current_index, 2);
        assert_eq!(doc.active_element(), Some(next));
    }

    #[test]
    fn test_background_click_closes() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(2));
        v.open(&mut doc, 0, Direction::None);
        let bg = find(&doc, v.root(), "obsidium-wrapper-background");
        v.handle_event(&mut doc, InputEvent::Click { target: bg });
        assert!(!v.state().is_open);
    }

    #[test]
    fn test_preload_neighbors_without_runtime() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(5));
        let preloads = doc.descendants_by_class(v.root(), "obsidium-preload");

        v.open(&mut doc, 0, Direction::Right);
        assert_eq!(doc.attribute(preloads[0], "src"), Some("img1.jpg"));
        assert_eq!(doc.attribute(preloads[1], "src"), Some("img2.jpg"));

        v.open(&mut doc, 0, Direction::Left);
        assert_eq!(doc.attribute(preloads[0], "src"), Some("img4.jpg"));
        assert_eq!(doc.attribute(preloads[1], "src"), Some("img3.jpg"));
    }

    #[test]
    fn test_far_neighbor_rules() {
        assert_eq!(far_neighbor(1, 5, Direction::Right), 3);
        assert_eq!(far_neighbor(3, 5, Direction::Right), 0);
        assert_eq!(far_neighbor(4, 5, Direction::Right), 1);
        assert_eq!(far_neighbor(1, 5, Direction::Left), 4);
        assert_eq!(far_neighbor(0, 5, Direction::Left), 3);
        assert_eq!(far_neighbor(0, 5, Direction::None), 4);
    }

    #[test]
    fn test_embedded_exif_renders_immediately() {
        let mut doc = Document::new(1024.0);
        let mut entries = images(2);
        entries[0].exif = Some(ExifMetadata {
            iso: Some(200.0),
            ..ExifMetadata::default()
        });
        let mut v = viewer(&mut doc, entries);
        v.open(&mut doc, 0, Direction::None);
        let panel = find(&doc, v.root(), "obsidium-info-wrapper");
        assert!(doc.text(panel).contains("<span>200</span>"));
        assert!(doc.text(panel).contains("Photo 0"));
    }

    #[tokio::test]
    async fn test_metadata_applies_to_current_slide_only() {
        let mut doc = Document::new(1024.0);
        let parser: Arc<dyn MetadataParser> = Arc::new(ModelParser);
        let mut v = Viewer::init(
            &mut doc,
            ViewerSource::Items(images(3)),
            ViewerOptionsUpdate::default(),
            Some(parser),
        )
        .expect("viewer");
        let panel = find(&doc, v.root(), "obsidium-info-wrapper");

        v.open(&mut doc, 0, Direction::None);
        assert!(!doc.text(panel).contains("Cam"));
        v.next(&mut doc);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(v.poll(&mut doc));
        assert!(doc.text(panel).contains("Cam img1.jpg"));
        assert!(!doc.text(panel).contains("img0.jpg"));
        assert!(v.items()[1].exif.is_some());
        assert!(v.items()[0].exif.is_none());
    }

    #[tokio::test]
    async fn test_delayed_preload_dropped_after_close() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(5));
        let far = doc.descendants_by_class(v.root(), "obsidium-preload")[1];

        v.open(&mut doc, 0, Direction::Right);
        v.close(&mut doc);
        tokio::time::sleep(config::preload_delay() + Duration::from_millis(50)).await;
        v.poll(&mut doc);
        assert_eq!(doc.attribute(far, "src"), Some(""));

        v.open(&mut doc, 0, Direction::Right);
        tokio::time::sleep(config::preload_delay() + Duration::from_millis(50)).await;
        assert!(v.poll(&mut doc));
        assert_eq!(doc.attribute(far, "src"), Some("img2.jpg"));
    }

    #[test]
    fn test_update_options_reconciles_open_viewer() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(3));
        let root = v.root();
        v.open(&mut doc, 0, Direction::Right);
        v.zoom_in(&mut doc);
        v.zoom_in(&mut doc);

        v.update_options(
            &mut doc,
            ViewerOptionsUpdate {
                zoom_levels: Some(vec![4.0, 8.0]),
                theme: Some("light".into()),
                animation: Some("fade".into()),
                ..Default::default()
            },
        );
        assert_eq!(v.state().zoom_level, 1);
        assert_eq!(doc.text(find(&doc, root, "obsidium-zoom-ratio")), "4x");
        assert!(doc.has_class(root, "obsidium-theme-light"));
        assert!(!doc.has_class(root, "obsidium-theme-dark"));
        let wrappers = doc.descendants_by_class(root, "obsidium-wrapper");
        assert!(wrappers
            .iter()
            .all(|w| !doc.has_class(*w, "animation-in-next-short-slide")));

        v.update_options(
            &mut doc,
            ViewerOptionsUpdate {
                zoom: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(v.state().zoom_level, 0);

        v.hide_interface(&mut doc);
        assert!(v.state().interface_hidden);
        v.update_options(
            &mut doc,
            ViewerOptionsUpdate {
                hide: Some(false),
                ..Default::default()
            },
        );
        assert!(!v.state().interface_hidden);
    }

    #[test]
    fn test_destroy_removes_overlay() {
        let mut doc = Document::new(1024.0);
        let mut v = viewer(&mut doc, images(2));
        let root = v.root();
        v.open(&mut doc, 0, Direction::None);
        v.destroy(&mut doc);

        assert!(!doc.exists(root));
        assert!(v.is_destroyed());
        assert_eq!(doc.style(doc.body(), "overflow"), None);
        v.open(&mut doc, 0, Direction::None);
        assert!(!v.state().is_open);
        assert!(!v.handle_event(&mut doc, InputEvent::key("Escape")));
    }

    #[test]
    fn test_refresh_elements_rereads_gallery() {
        let mut doc = Document::new(1024.0);
        let gallery = doc.create_element("div");
        doc.set_attribute(gallery, "id", "g");
        doc.append_child(doc.body(), gallery);
        let add = |doc: &mut Document, i: usize| {
            let img = doc.create_element("img");
            doc.set_data(img, "src", format!("p{i}.jpg"));
            doc.append_child(gallery, img);
        };
        add(&mut doc, 0);
        add(&mut doc, 1);

        let mut v = Viewer::init(
            &mut doc,
            ViewerSource::selector("g"),
            ViewerOptionsUpdate::default(),
            None,
        )
        .expect("viewer");
        add(&mut doc, 2);
        v.refresh_elements(&mut doc);
        assert_eq!(v.items().len(), 3);
        assert_eq!(
            doc.descendants_by_class(v.root(), "obsidium-thumbnail").len(),
            3
        );
    }
}
