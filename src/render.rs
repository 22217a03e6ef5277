use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

/// Where a widget draws. Mirrors the handful of DOM operations the widgets need.
pub trait RenderTarget: Send {
    /// Replace the target's content with a list of markup items.
    fn render_list(&mut self, items: Vec<String>);
    /// Mark item `index` (and its paired indicator) active or inactive.
    fn toggle_active(&mut self, index: usize, active: bool);
    /// Replace the target's content with a single message.
    fn set_text(&mut self, text: &str);
}

/// A target shared between a widget, its timer task and whoever inspects it.
pub type SharedTarget = Arc<Mutex<MemoryTarget>>;

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: RenderTarget> RenderTarget for Arc<Mutex<T>> {
    fn render_list(&mut self, items: Vec<String>) { lock(self).render_list(items) }
    fn toggle_active(&mut self, index: usize, active: bool) { lock(self).toggle_active(index, active) }
    fn set_text(&mut self, text: &str) { lock(self).set_text(text) }
}

/// In-memory element: keeps what was rendered so pages and tests can read it back.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    items: Vec<String>,
    active: Vec<bool>,
    text: Option<String>,
    mutations: usize,
}

impl MemoryTarget {
    pub fn new() -> Self { Self::default() }
    pub fn shared() -> SharedTarget { Arc::new(Mutex::new(Self::new())) }

    pub fn items(&self) -> &[String] { &self.items }
    pub fn text(&self) -> Option<&str> { self.text.as_deref() }
    pub fn is_active(&self, index: usize) -> bool { self.active.get(index).copied().unwrap_or(false) }
    pub fn active_indices(&self) -> Vec<usize> {
        self.active.iter().enumerate().filter(|(_, a)| **a).map(|(i, _)| i).collect()
    }
    /// Number of render calls that changed something.
    pub fn mutations(&self) -> usize { self.mutations }

    /// Markup equivalent of the current content.
    pub fn to_html(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.items.join("\n"),
        }
    }
}

impl RenderTarget for MemoryTarget {
    fn render_list(&mut self, items: Vec<String>) {
        self.active = vec![false; items.len()];
        self.items = items;
        self.text = None;
        self.mutations += 1;
    }

    fn toggle_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.active.get_mut(index) {
            if *slot != active {
                *slot = active;
                self.mutations += 1;
            }
        }
    }

    fn set_text(&mut self, text: &str) {
        if self.text.as_deref() == Some(text) && self.items.is_empty() { return; }
        self.items.clear();
        self.active.clear();
        self.text = Some(text.to_string());
        self.mutations += 1;
    }
}

/// Terminal rendering for the CLI. With `inline` set, text overwrites the current line.
pub struct StdoutTarget {
    inline: bool,
    items: usize,
}

impl StdoutTarget {
    pub fn new() -> Self { Self { inline: false, items: 0 } }
    pub fn inline() -> Self { Self { inline: true, items: 0 } }
}

impl Default for StdoutTarget {
    fn default() -> Self { Self::new() }
}

impl RenderTarget for StdoutTarget {
    fn render_list(&mut self, items: Vec<String>) {
        self.items = items.len();
        let mut out = std::io::stdout().lock();
        for (i, item) in items.iter().enumerate() {
            let _ = writeln!(out, "{:>2}. {}", i + 1, strip_tags(item));
        }
    }

    fn toggle_active(&mut self, index: usize, active: bool) {
        if active && index < self.items {
            println!("-> showing {}/{}", index + 1, self.items);
        }
    }

    fn set_text(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        if self.inline {
            let _ = write!(out, "\r\x1b[2K{}", text);
            let _ = out.flush();
        } else {
            let _ = writeln!(out, "{}", text);
        }
    }
}

/// Collapse markup into readable single-line text.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => { in_tag = false; out.push(' '); }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
