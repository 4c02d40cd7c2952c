//! Notebook pages and decode bookkeeping.
//!
//! A notebook is an ordered list of pages that only grows at the tail.
//! Image decodes are tracked with tickets so that a result arriving after
//! the user navigated away, or after a newer request replaced it, can be
//! recognised and dropped.

use crate::image::{ImageStore, Placement};
use crate::raster::Raster;
use crate::stroke::StrokeStore;
use crate::viewport::DEFAULT_PAGE_SIZE;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable page identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

/// One notebook page: background, ink and placed images.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    background: Option<Raster>,
    size: Size,
    pub strokes: StrokeStore,
    pub images: ImageStore,
}

impl Page {
    /// A blank page at the given internal resolution.
    pub fn new(size: Size) -> Self {
        Self {
            id: PageId::new(),
            background: None,
            size,
            strokes: StrokeStore::new(),
            images: ImageStore::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn background(&self) -> Option<&Raster> {
        self.background.as_ref()
    }

    /// Internal resolution.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Install a background. The page adopts its natural resolution.
    pub fn set_background(&mut self, raster: Raster) {
        self.size = raster.size();
        self.background = Some(raster);
    }

    /// True if the page has no background, ink or images.
    pub fn is_blank(&self) -> bool {
        self.background.is_none() && self.strokes.is_empty() && self.images.is_empty()
    }
}

/// What a decoded raster is for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeTarget {
    /// Replace the page background.
    Background,
    /// Place a new image object.
    Insert(Placement),
}

/// Identifies one in-flight decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeTicket {
    id: Uuid,
    page: PageId,
    target: DecodeTarget,
}

impl DecodeTicket {
    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn target(&self) -> DecodeTarget {
        self.target
    }
}

/// Why a decode result was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// Replaced by a newer request, or already resolved.
    Superseded,
    /// The page it was requested for is no longer current.
    PageChanged,
}

/// Ordered pages with exactly one current.
#[derive(Debug, Clone)]
pub struct Notebook {
    pages: Vec<Page>,
    current: usize,
    default_size: Size,
    pending: Vec<DecodeTicket>,
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Notebook {
    /// A notebook with one blank page.
    pub fn new(default_size: Size) -> Self {
        Self {
            pages: vec![Page::new(default_size)],
            current: 0,
            default_size,
            pending: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Page {
        &self.pages[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current]
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Resolution given to newly created pages.
    pub fn default_size(&self) -> Size {
        self.default_size
    }

    pub fn set_default_size(&mut self, size: Size) {
        self.default_size = size;
    }

    /// Advance, appending a blank page first when on the last one.
    /// Returns the new current index.
    pub fn next_page(&mut self) -> usize {
        if self.current + 1 == self.pages.len() {
            self.pages.push(Page::new(self.default_size));
            log::info!("Appended page {}", self.pages.len() - 1);
        }
        self.current += 1;
        self.current
    }

    /// Go back one page. Returns false on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Make `index` current. Returns false if it doesn't exist.
    pub fn load_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.current = index;
        true
    }

    /// Register a decode for the current page.
    ///
    /// A background request supersedes any background request still
    /// pending for the same page.
    pub fn request_decode(&mut self, target: DecodeTarget) -> DecodeTicket {
        let page = self.current().id();
        if target == DecodeTarget::Background {
            self.pending
                .retain(|t| !(t.page == page && t.target == DecodeTarget::Background));
        }
        let ticket = DecodeTicket {
            id: Uuid::new_v4(),
            page,
            target,
        };
        self.pending.push(ticket);
        ticket
    }

    /// Retire a ticket. Returns its target if the result should be applied
    /// to the current page.
    pub fn resolve_decode(&mut self, ticket: &DecodeTicket) -> Result<DecodeTarget, StaleReason> {
        let Some(pos) = self.pending.iter().position(|t| t.id == ticket.id) else {
            return Err(StaleReason::Superseded);
        };
        let ticket = self.pending.remove(pos);
        if ticket.page != self.current().id() {
            return Err(StaleReason::PageChanged);
        }
        Ok(ticket.target)
    }

    /// Number of decodes still outstanding.
    pub fn pending_decodes(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page_appends_at_tail() {
        let mut notebook = Notebook::default();
        assert_eq!(notebook.page_count(), 1);
        assert_eq!(notebook.next_page(), 1);
        assert_eq!(notebook.page_count(), 2);
        assert!(notebook.current().is_blank());
        assert!(notebook.current().background().is_none());
        assert_eq!(notebook.current().size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_next_page_reuses_existing() {
        let mut notebook = Notebook::default();
        notebook.next_page();
        notebook.next_page();
        assert!(notebook.load_page(0));
        notebook.next_page();
        assert_eq!(notebook.page_count(), 3);
        assert_eq!(notebook.current_index(), 1);
    }

    #[test]
    fn test_prev_page_noop_at_start() {
        let mut notebook = Notebook::default();
        assert!(!notebook.prev_page());
        assert_eq!(notebook.current_index(), 0);
        notebook.next_page();
        assert!(notebook.prev_page());
        assert_eq!(notebook.current_index(), 0);
    }

    #[test]
    fn test_load_page_out_of_range() {
        let mut notebook = Notebook::default();
        assert!(!notebook.load_page(3));
        assert_eq!(notebook.current_index(), 0);
    }

    #[test]
    fn test_background_sets_size() {
        let mut page = Page::new(DEFAULT_PAGE_SIZE);
        page.set_background(Raster::solid(640, 480, [0, 0, 0]).unwrap());
        assert_eq!(page.size(), Size::new(640.0, 480.0));
        assert!(!page.is_blank());
    }

    #[test]
    fn test_decode_ticket_current_page() {
        let mut notebook = Notebook::default();
        let ticket = notebook.request_decode(DecodeTarget::Insert(Placement::default()));
        assert_eq!(
            notebook.resolve_decode(&ticket),
            Ok(DecodeTarget::Insert(Placement::default()))
        );
        assert_eq!(notebook.pending_decodes(), 0);
        assert_eq!(notebook.resolve_decode(&ticket), Err(StaleReason::Superseded));
    }

    #[test]
    fn test_decode_ticket_page_changed() {
        let mut notebook = Notebook::default();
        let ticket = notebook.request_decode(DecodeTarget::Background);
        notebook.next_page();
        assert_eq!(notebook.resolve_decode(&ticket), Err(StaleReason::PageChanged));
    }

    #[test]
    fn test_newer_background_supersedes() {
        let mut notebook = Notebook::default();
        let first = notebook.request_decode(DecodeTarget::Background);
        let second = notebook.request_decode(DecodeTarget::Background);
        assert_eq!(notebook.resolve_decode(&first), Err(StaleReason::Superseded));
        assert_eq!(notebook.resolve_decode(&second), Ok(DecodeTarget::Background));
    }

    #[test]
    fn test_insert_requests_are_independent() {
        let mut notebook = Notebook::default();
        let a = notebook.request_decode(DecodeTarget::Insert(Placement::default()));
        let b = notebook.request_decode(DecodeTarget::Insert(Placement::default()));
        assert!(notebook.resolve_decode(&b).is_ok());
        assert!(notebook.resolve_decode(&a).is_ok());
    }
}
