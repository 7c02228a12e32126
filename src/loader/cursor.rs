/// Count of items from an already-fetched collection that the view may show.
///
/// The cursor never exceeds the length it was last reset or advanced against,
/// and only moves forward until the next `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealCursor {
    visible: usize,
    page_size: usize,
}

impl RevealCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            visible: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Start a new fetch epoch over a collection of `len` items.
    pub fn reset(&mut self, len: usize) {
        self.visible = self.page_size.min(len);
    }

    pub fn clear(&mut self) {
        self.visible = 0;
    }

    pub fn has_more(&self, len: usize) -> bool {
        self.visible < len
    }

    /// Reveal the next page. Returns false when nothing was left to reveal.
    pub fn advance(&mut self, len: usize) -> bool {
        if !self.has_more(len) {
            return false;
        }
        self.visible = (self.visible + self.page_size).min(len);
        true
    }
}
