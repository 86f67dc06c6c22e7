/// Vertical scroll position of the conversation region.
///
/// Offsets follow the scroll-layer convention: 0 shows the top of the
/// content, and scrolling down makes the offset more negative, bottoming out
/// at `-(content_height - viewport_height)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollController {
    offset: i32,
    content_height: i32,
    viewport_height: i32,
    step: i32,
}

impl ScrollController {
    pub fn new(viewport_height: i32, step: i32) -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: viewport_height.max(0),
            step,
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn content_height(&self) -> i32 {
        self.content_height
    }

    pub fn viewport_height(&self) -> i32 {
        self.viewport_height
    }

    /// How far the content can scroll, never negative.
    pub fn max_scroll(&self) -> i32 {
        (self.content_height - self.viewport_height).max(0)
    }

    pub fn set_viewport_height(&mut self, viewport_height: i32) {
        self.viewport_height = viewport_height.max(0);
        self.offset = self.clamp(self.offset);
    }

    /// Take on a freshly rebuilt content extent while keeping the offset the
    /// view had before the rebuild.
    pub fn restore(&mut self, content_height: i32, saved_offset: i32) {
        self.content_height = content_height.max(0);
        self.offset = self.clamp(saved_offset);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = -self.max_scroll();
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    /// One step towards the top.
    pub fn scroll_up(&mut self) {
        self.offset = self.clamp(self.offset + self.step);
    }

    /// One step towards the bottom.
    pub fn scroll_down(&mut self) {
        self.offset = self.clamp(self.offset - self.step);
    }

    fn clamp(&self, offset: i32) -> i32 {
        offset.clamp(-self.max_scroll(), 0)
    }
}
