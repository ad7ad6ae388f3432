use std::collections::VecDeque;

/// Rows per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Classification outcome; also names the bucket an item lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Keep,
    Trash,
}

impl Decision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "keep" => Some(Decision::Keep),
            "trash" => Some(Decision::Trash),
            _ => None,
        }
    }
}

/// A classified file. Items are never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub file: String,
    pub source_path: String,
    pub decision: Decision,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPage {
    pub page: usize,
    pub total_pages: usize,
    pub items: Vec<Item>,
}

/// Append-only item collection with a newest-first paginated view.
///
/// Besides the stored items the bucket tracks the page being viewed and the
/// set of items currently rendered for it. The rendered set is what
/// [`Bucket::render_newest`] edits in place while page 1 is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    items: Vec<Item>,
    page_size: usize,
    current_page: usize,
    rendered: VecDeque<Item>,
}

impl Default for Bucket {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Bucket {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            current_page: 1,
            rendered: VecDeque::new(),
        }
    }

    pub fn append(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stored items in arrival order.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        self.items.len().div_ceil(page_size.max(1)).max(1)
    }

    /// Items of `page` (1-based), newest first.
    pub fn page(&self, page: usize, page_size: usize) -> BucketPage {
        let page_size = page_size.max(1);
        let skip = page.saturating_sub(1).saturating_mul(page_size);
        let items = if page == 0 {
            Vec::new()
        } else {
            self.items
                .iter()
                .rev()
                .skip(skip)
                .take(page_size)
                .cloned()
                .collect()
        };
        BucketPage {
            page,
            total_pages: self.total_pages(page_size),
            items,
        }
    }

    /// Puts a freshly appended item on screen without recomputing the page.
    ///
    /// Only page 1 shows the newest items, so on any other page this does nothing.
    pub fn render_newest(&mut self, item: Item) {
        if self.current_page != 1 {
            return;
        }
        self.rendered.push_front(item);
        while self.rendered.len() > self.page_size {
            self.rendered.pop_back();
        }
    }

    pub fn rendered(&self) -> Vec<Item> {
        self.rendered.iter().cloned().collect()
    }

    /// Moves to `page` and re-renders it. Out-of-range pages are rejected.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages(self.page_size) {
            return false;
        }
        self.current_page = page;
        self.rendered = self.page(page, self.page_size).items.into();
        true
    }

    pub fn step(&mut self, delta: isize) -> bool {
        match self.current_page.checked_add_signed(delta) {
            Some(page) => self.go_to(page),
            None => false,
        }
    }
}

/// The keep/trash pair of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buckets {
    pub keep: Bucket,
    pub trash: Bucket,
}

impl Buckets {
    pub fn new(page_size: usize) -> Self {
        Self {
            keep: Bucket::new(page_size),
            trash: Bucket::new(page_size),
        }
    }

    pub fn get(&self, decision: Decision) -> &Bucket {
        match decision {
            Decision::Keep => &self.keep,
            Decision::Trash => &self.trash,
        }
    }

    pub fn get_mut(&mut self, decision: Decision) -> &mut Bucket {
        match decision {
            Decision::Keep => &mut self.keep,
            Decision::Trash => &mut self.trash,
        }
    }
}
