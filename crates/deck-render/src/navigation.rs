//! Page stack driving navigation between and within pages.

#![allow(missing_docs)]

use smol_str::SmolStr;
use tracing::debug;

use crate::action::NavigationContext;
use crate::element::RenderRequest;

/// A page id and the page number shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub page_id: SmolStr,
    pub page_number: usize,
}

/// Navigation history rooted at a home page.
#[derive(Debug, Clone)]
pub struct PageStack {
    stack: Vec<PageCursor>,
    page_count: usize,
}

impl PageStack {
    #[must_use]
    pub fn new(home: impl Into<SmolStr>) -> Self {
        Self {
            stack: vec![PageCursor {
                page_id: home.into(),
                page_number: 1,
            }],
            page_count: 1,
        }
    }

    #[must_use]
    pub fn current(&self) -> &PageCursor {
        // The root is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn current_mut(&mut self) -> &mut PageCursor {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_sub_page(&self) -> bool {
        self.stack.len() > 1
    }

    /// Records the page count of the last render, bounding `go_next`.
    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count.max(1);
        let bound = self.page_count;
        let cursor = self.current_mut();
        cursor.page_number = cursor.page_number.min(bound);
    }

    #[must_use]
    pub fn request(&self) -> RenderRequest {
        RenderRequest {
            page_number: self.current().page_number,
            is_sub_page: self.is_sub_page(),
        }
    }
}

impl NavigationContext for PageStack {
    fn go_back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
            self.page_count = 1;
        }
        debug!(page = %self.current().page_id, "navigated back");
    }

    fn go_previous(&mut self) {
        let cursor = self.current_mut();
        cursor.page_number = cursor.page_number.saturating_sub(1).max(1);
    }

    fn go_next(&mut self) {
        let bound = self.page_count;
        let cursor = self.current_mut();
        cursor.page_number = (cursor.page_number + 1).min(bound);
    }

    fn go_to(&mut self, page_id: &str) {
        if self.current().page_id == page_id {
            return;
        }
        self.stack.push(PageCursor {
            page_id: SmolStr::new(page_id),
            page_number: 1,
        });
        self.page_count = 1;
        debug!(page = page_id, depth = self.stack.len(), "navigated to page");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_to_pushes_and_back_pops_to_root() {
        let mut stack = PageStack::new("home");
        stack.go_to("lights");
        assert!(stack.is_sub_page());
        assert_eq!(stack.current().page_id, "lights");
        stack.go_to("lights");
        assert_eq!(stack.depth(), 2);

        stack.go_back();
        stack.go_back();
        assert_eq!(stack.current().page_id, "home");
        assert!(!stack.is_sub_page());
    }

    #[test]
    fn next_and_previous_stay_in_bounds() {
        let mut stack = PageStack::new("home");
        stack.go_next();
        assert_eq!(stack.current().page_number, 1);

        stack.set_page_count(3);
        stack.go_next();
        stack.go_next();
        stack.go_next();
        assert_eq!(stack.request().page_number, 3);

        stack.go_previous();
        stack.go_previous();
        stack.go_previous();
        assert_eq!(stack.request().page_number, 1);
    }

    #[test]
    fn shrinking_page_count_clamps_cursor() {
        let mut stack = PageStack::new("home");
        stack.set_page_count(4);
        stack.go_next();
        stack.go_next();
        stack.set_page_count(2);
        assert_eq!(stack.current().page_number, 2);
    }
}
