//! Abstractions for page-number pagination.

/// Number of a [`Page`], 1-based.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PageNumber(usize);

impl PageNumber {
    /// First [`PageNumber`].
    pub const FIRST: Self = Self(1);

    /// Creates a new [`PageNumber`], clamping the provided `number` to `1` at
    /// least.
    #[must_use]
    pub fn new(number: usize) -> Self {
        Self(number.max(1))
    }

    /// Returns this [`PageNumber`] as a plain number.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// A page of items produced by [`paginate()`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<I> {
    /// Items on this [`Page`], at most `per_page` of them.
    pub items: Vec<I>,

    /// Number of this [`Page`], clamped to the existing range.
    pub number: PageNumber,

    /// Number of items per [`Page`] used to slice the collection.
    pub per_page: usize,

    /// Total number of [`Page`]s in the collection.
    pub total_pages: usize,

    /// Total number of items in the collection.
    pub total_items: usize,
}

impl<I> Page<I> {
    /// Indicates whether this [`Page`] has a following one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number.get() < self.total_pages
    }

    /// Indicates whether this [`Page`] has a preceding one.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number.get() > 1
    }

    /// Maps the items of this [`Page`] preserving its numbering.
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        let Self {
            items,
            number,
            per_page,
            total_pages,
            total_items,
        } = self;
        Page {
            items: items.into_iter().map(f).collect(),
            number,
            per_page,
            total_pages,
            total_items,
        }
    }
}

/// Returns the requested [`Page`] of the provided `items`.
///
/// The page `number` is clamped to `[1, total_pages]` and a zero `per_page`
/// is treated as `1`, so this never panics and is deterministic for
/// identical inputs. An empty collection yields a single empty [`Page`].
#[must_use]
pub fn paginate<I: Clone>(
    items: &[I],
    per_page: usize,
    number: PageNumber,
) -> Page<I> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let number = PageNumber::new(number.get().min(total_pages));

    let start = (number.get() - 1) * per_page;
    let page_items = items
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect::<Vec<_>>();

    Page {
        items: page_items,
        number,
        per_page,
        total_pages,
        total_items,
    }
}

#[cfg(test)]
mod spec {
    use super::{paginate, PageNumber};

    fn items(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn slices_deterministically() {
        let all = items(24);

        let first = paginate(&all, 12, PageNumber::new(1));
        assert_eq!(first.items, items(12));
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.total_items, 24);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let second = paginate(&all, 12, PageNumber::new(2));
        assert_eq!(second.items, (12..24).collect::<Vec<_>>());
        assert!(!second.has_next());
        assert!(second.has_previous());
    }

    #[test]
    fn is_idempotent() {
        let all = items(30);
        let a = paginate(&all, 12, PageNumber::new(2));
        let b = paginate(&all, 12, PageNumber::new(2));
        assert_eq!(a, b);
    }

    #[test]
    fn never_exceeds_per_page() {
        let all = items(25);
        for n in 0..5 {
            assert!(paginate(&all, 12, PageNumber::new(n)).items.len() <= 12);
        }
    }

    #[test]
    fn clamps_out_of_range_numbers() {
        let all = items(25);

        let below = paginate(&all, 12, PageNumber::new(0));
        assert_eq!(below.number, PageNumber::FIRST);
        assert_eq!(below.items, items(12));

        let above = paginate(&all, 12, PageNumber::new(99));
        assert_eq!(above.number.get(), 3);
        assert_eq!(above.items, (24..25).collect::<Vec<_>>());
    }

    #[test]
    fn empty_collection_yields_single_empty_page() {
        let page = paginate(&items(0), 12, PageNumber::new(7));
        assert!(page.items.is_empty());
        assert_eq!(page.number, PageNumber::FIRST);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
    }

    #[test]
    fn zero_per_page_does_not_panic() {
        let page = paginate(&items(3), 0, PageNumber::new(2));
        assert_eq!(page.per_page, 1);
        assert_eq!(page.items, vec![1]);
    }
}
