//! In-memory reference document.
//!
//! Containers hold text (plus optional classed spans) and a fixed box. Text
//! is laid out with the static metric tables and greedy wrap, which makes the
//! document a complete, deterministic host for FitBox: it measures probes,
//! mutates container font sizes and ellipsizes overflow.
//!
//! `Document` is a cheap handle; clones share the same element tree.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::fit::measurer::{
    BoxSize, ContainerId, ContainerSnapshot, Host, Measurer, StyleMutator, Truncator,
};
use crate::layout::ellipsis::{ellipsize, Ellipsized};
use crate::layout::font_metrics::{get_metrics, FontFamily};
use crate::layout::wrap::{wrap_text, TextLayout};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Box and font style of a container.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font_size: f64,
    pub font: FontFamily,
    /// Multiplier of the font size.
    pub line_height: f64,
    pub width: f64,
    pub height: f64,
}

impl Style {
    pub fn new(width: f64, height: f64, font_size: f64) -> Self {
        Style {
            font_size,
            font: FontFamily::Sans,
            line_height: 1.2,
            width,
            height,
        }
    }

    pub fn with_font(mut self, font: FontFamily) -> Self {
        self.font = font;
        self
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    fn layout(&self, text: &str) -> TextLayout {
        wrap_text(text, get_metrics(self.font), self.font_size, self.width)
    }

    fn line_height_px(&self) -> f64 {
        self.font_size * self.line_height
    }
}

#[derive(Debug, Clone)]
struct Element {
    text: String,
    class_name: Option<String>,
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    /// Only containers carry a box; spans inherit from their container.
    style: Option<Style>,
    data: Map<String, Value>,
}

#[derive(Debug, Default)]
struct DocumentInner {
    elements: HashMap<ContainerId, Element>,
    live_probes: usize,
    probes_created: usize,
}

/// Off-screen clone of a container: fixed width, automatic height.
#[derive(Debug, Clone)]
pub struct DocumentProbe {
    content: String,
    style: Style,
}

#[derive(Debug, Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
    truncation: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document API
// ────────────────────────────────────────────────────────────────────────────

impl Document {
    pub fn new() -> Self {
        Document {
            inner: Rc::new(RefCell::new(DocumentInner::default())),
            truncation: true,
        }
    }

    /// A document with no ellipsis capability installed.
    pub fn without_truncation() -> Self {
        Document {
            truncation: false,
            ..Self::new()
        }
    }

    pub fn create_container(&self, text: impl Into<String>, style: Style) -> ContainerId {
        let id = ContainerId::new();
        self.inner.borrow_mut().elements.insert(
            id,
            Element {
                text: text.into(),
                class_name: None,
                parent: None,
                children: Vec::new(),
                style: Some(style),
                data: Map::new(),
            },
        );
        id
    }

    /// Appends a classed span to `parent`. `None` if the parent is unknown.
    pub fn append_span(
        &self,
        parent: ContainerId,
        class_name: &str,
        text: impl Into<String>,
    ) -> Option<ContainerId> {
        let mut inner = self.inner.borrow_mut();
        let id = ContainerId::new();
        inner.elements.get_mut(&parent)?.children.push(id);
        inner.elements.insert(
            id,
            Element {
                text: text.into(),
                class_name: Some(class_name.to_string()),
                parent: Some(parent),
                children: Vec::new(),
                style: None,
                data: Map::new(),
            },
        );
        Some(id)
    }

    pub fn set_data_attribute(&self, id: ContainerId, key: &str, value: Value) -> bool {
        match self.inner.borrow_mut().elements.get_mut(&id) {
            Some(element) => {
                element.data.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn resize_container(&self, id: ContainerId, width: f64, height: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.elements.get_mut(&id).and_then(|e| e.style.as_mut()) {
            Some(style) => {
                style.width = width;
                style.height = height;
                true
            }
            None => false,
        }
    }

    /// Removes an element and its descendants.
    pub fn remove(&self, id: ContainerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(element) = inner.elements.remove(&id) else {
            return false;
        };
        if let Some(parent) = element.parent {
            if let Some(parent) = inner.elements.get_mut(&parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        let mut pending = element.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = inner.elements.remove(&child) {
                pending.extend(removed.children);
            }
        }
        true
    }

    pub fn font_size(&self, id: ContainerId) -> Option<f64> {
        self.inner.borrow().style(id).map(|s| s.font_size)
    }

    /// Own text of an element (not including spans).
    pub fn text(&self, id: ContainerId) -> Option<String> {
        self.inner.borrow().elements.get(&id).map(|e| e.text.clone())
    }

    /// Full text of an element including its spans.
    pub fn text_content(&self, id: ContainerId) -> Option<String> {
        let inner = self.inner.borrow();
        inner.elements.contains_key(&id).then(|| inner.content(id, None))
    }

    /// Laid-out size of a container's content at its current font size.
    pub fn rendered_size(&self, id: ContainerId) -> Option<BoxSize> {
        let inner = self.inner.borrow();
        let style = inner.style(id)?;
        let layout = style.layout(&inner.content(id, None));
        Some(BoxSize::new(
            layout.widest_line(),
            layout.height(style.line_height_px()),
        ))
    }

    pub fn live_probes(&self) -> usize {
        self.inner.borrow().live_probes
    }

    pub fn probes_created(&self) -> usize {
        self.inner.borrow().probes_created
    }
}

impl DocumentInner {
    fn style(&self, id: ContainerId) -> Option<&Style> {
        self.elements.get(&id)?.style.as_ref()
    }

    /// Text of `id` and its descendants, with `replace` substituting one
    /// element's own text.
    fn content(&self, id: ContainerId, replace: Option<(ContainerId, &str)>) -> String {
        let Some(element) = self.elements.get(&id) else {
            return String::new();
        };
        let own = match replace {
            Some((target, text)) if target == id => text,
            _ => element.text.as_str(),
        };
        let mut parts = vec![own.to_string()];
        parts.extend(element.children.iter().map(|c| self.content(*c, replace)));
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ")
    }

    fn fits_with(&self, container: ContainerId, target: ContainerId, text: &str) -> bool {
        let Some(style) = self.style(container) else {
            return true;
        };
        let layout = style.layout(&self.content(container, Some((target, text))));
        layout.height(style.line_height_px()) <= style.height
    }

    /// Elements to ellipsize, in document order.
    fn truncation_targets(&self, container: ContainerId, selector: Option<&str>) -> Vec<ContainerId> {
        let Some(selector) = selector else {
            return vec![container];
        };
        let class_name = selector.trim().trim_start_matches('.');
        let mut targets = Vec::new();
        let mut pending = vec![container];
        while let Some(id) = pending.pop() {
            let Some(element) = self.elements.get(&id) else {
                continue;
            };
            if id != container && element.class_name.as_deref() == Some(class_name) {
                targets.push(id);
            }
            pending.extend(element.children.iter().rev());
        }
        targets
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capabilities
// ────────────────────────────────────────────────────────────────────────────

impl Measurer for Document {
    type Probe = DocumentProbe;

    fn create_probe(&mut self, snapshot: &ContainerSnapshot) -> DocumentProbe {
        let mut inner = self.inner.borrow_mut();
        inner.live_probes += 1;
        inner.probes_created += 1;

        let base = inner.style(snapshot.container).cloned();
        let style = Style {
            font_size: snapshot.font_size,
            width: snapshot.width,
            ..base.unwrap_or_else(|| Style::new(snapshot.width, snapshot.height, snapshot.font_size))
        };
        DocumentProbe {
            content: snapshot.content.clone(),
            style,
        }
    }

    fn set_probe_font_size(&mut self, probe: &mut DocumentProbe, font_size: f64) {
        probe.style.font_size = font_size;
    }

    fn measure(&self, probe: &DocumentProbe) -> BoxSize {
        let layout = probe.style.layout(&probe.content);
        BoxSize::new(
            layout.widest_line().max(probe.style.width),
            layout.height(probe.style.line_height_px()),
        )
    }

    fn remove_probe(&mut self, _probe: DocumentProbe) {
        let mut inner = self.inner.borrow_mut();
        inner.live_probes = inner.live_probes.saturating_sub(1);
    }
}

impl StyleMutator for Document {
    fn snapshot(&self, container: ContainerId) -> Option<ContainerSnapshot> {
        let inner = self.inner.borrow();
        let style = inner.style(container)?;
        Some(ContainerSnapshot {
            container,
            content: inner.content(container, None),
            font_size: style.font_size,
            width: style.width,
            height: style.height,
        })
    }

    fn set_font_size(&mut self, container: ContainerId, font_size: f64) {
        let mut inner = self.inner.borrow_mut();
        if let Some(style) = inner.elements.get_mut(&container).and_then(|e| e.style.as_mut()) {
            style.font_size = font_size;
        }
    }

    fn data_attributes(&self, container: ContainerId) -> Map<String, Value> {
        self.inner
            .borrow()
            .elements
            .get(&container)
            .map(|e| e.data.clone())
            .unwrap_or_default()
    }
}

impl Truncator for Document {
    fn truncate(&mut self, container: ContainerId, selector: Option<&str>) {
        let mut inner = self.inner.borrow_mut();
        let targets = inner.truncation_targets(container, selector);
        if targets.is_empty() {
            debug!(%container, ?selector, "Nothing matches the ellipsis selector");
            return;
        }

        // Shorten from the last target backwards until the container fits.
        for target in targets.into_iter().rev() {
            let original = match inner.elements.get(&target) {
                Some(element) => element.text.clone(),
                None => continue,
            };
            let outcome = ellipsize(&original, |candidate| {
                inner.fits_with(container, target, candidate)
            });
            let replacement = match outcome {
                Ellipsized::Unchanged => return,
                Ellipsized::Truncated(text) => Some(text),
                Ellipsized::Exhausted => None,
            };
            let done = replacement.is_some();
            if let Some(element) = inner.elements.get_mut(&target) {
                element.text = replacement.unwrap_or_default();
            }
            if done {
                return;
            }
        }
    }
}

impl Host for Document {
    fn truncator(&mut self) -> Option<&mut dyn Truncator> {
        if self.truncation {
            Some(self)
        } else {
            None
        }
    }
}
