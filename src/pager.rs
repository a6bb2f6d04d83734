pub const DEFAULT_PAGE_SHIFT: usize = 5;

/// Scroll position over the rendered response body.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    offset: usize,
    shift: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Pager::new(DEFAULT_PAGE_SHIFT)
    }
}

impl Pager {
    pub fn new(shift: usize) -> Self {
        Pager {
            offset: 0,
            shift: shift.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    #[allow(dead_code)]
    pub fn shift(&self) -> usize {
        self.shift
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Scrolls forward by one shift, or lands on the last full page.
    pub fn page_down(&mut self, len: usize, height: usize) {
        if self.offset + self.shift + height <= len {
            self.offset += self.shift;
        } else {
            self.offset = len.saturating_sub(height);
        }
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.shift);
    }

    pub fn page<'a, T>(&self, lines: &'a [T], height: usize) -> &'a [T] {
        page(lines, self.offset, height)
    }
}

/// The lines visible from `offset` in a viewport `height` lines tall.
pub fn page<T>(lines: &[T], offset: usize, height: usize) -> &[T] {
    let start = offset.min(lines.len());
    let end = start.saturating_add(height).min(lines.len());
    &lines[start..end]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn page_down_steps_then_clamps_to_last_full_page() {
        let mut pager = Pager::new(5);
        let mut seen = Vec::new();
        for _ in 0..6 {
            pager.page_down(100, 20);
            seen.push(pager.offset());
        }
        assert_eq!(seen, vec![5, 10, 15, 20, 25, 30]);

        for _ in 0..20 {
            pager.page_down(100, 20);
            assert!(pager.offset() <= 80);
        }
        assert_eq!(pager.offset(), 80);
    }

    #[test]
    fn page_down_on_short_body_stays_at_zero() {
        let mut pager = Pager::new(5);
        pager.page_down(10, 20);
        assert_eq!(pager.offset(), 0);
        pager.page_down(0, 0);
        assert_eq!(pager.offset(), 0);
    }

    #[test]
    fn page_up_clamps_at_zero() {
        let mut pager = Pager::new(5);
        pager.page_down(100, 20);
        pager.page_down(100, 20);
        pager.page_up();
        assert_eq!(pager.offset(), 5);
        pager.page_up();
        pager.page_up();
        assert_eq!(pager.offset(), 0);
    }

    #[test]
    fn page_returns_full_last_page() {
        let lines: Vec<usize> = (0..100).collect();
        let mut pager = Pager::new(5);
        for _ in 0..30 {
            pager.page_down(lines.len(), 20);
        }
        let visible = pager.page(&lines, 20);
        assert_eq!(visible.len(), 20);
        assert_eq!(visible[0], 80);
        assert_eq!(visible[19], 99);
    }

    #[test]
    fn page_handles_out_of_range_offset() {
        let lines = vec!["a", "b"];
        assert!(page(&lines, 5, 10).is_empty());
        assert_eq!(page(&lines, 0, 10), &["a", "b"]);
        assert!(page(&lines, 0, 0).is_empty());
    }

    #[test]
    fn zero_shift_is_raised_to_one() {
        assert_eq!(Pager::new(0).shift(), 1);
    }
}
