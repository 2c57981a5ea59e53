use crate::error::TypeError;
use crate::record::Record;

/// One fetched slice of a resource collection plus pagination metadata.
///
/// The page is a possibly-stale cache of backend state: it is fully
/// replaced on refresh and mutated locally only by the optimistic delete
/// path (which snapshots and restores it on failure).
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Record>,
    pub total_count: u64,
    pub page_index: u32,
    pub page_size: u32,
}

impl Page {
    /// Builds a page, enforcing `items.len() <= page_size` and
    /// `page_index >= 1`.
    pub fn new(
        items: Vec<Record>,
        total_count: u64,
        page_index: u32,
        page_size: u32,
    ) -> Result<Self, TypeError> {
        if page_index < 1 {
            return Err(TypeError::PageIndexZero);
        }
        if items.len() as u64 > u64::from(page_size) {
            return Err(TypeError::PageOverfull {
                items: items.len(),
                page_size,
            });
        }
        Ok(Self {
            items,
            total_count,
            page_index,
            page_size,
        })
    }

    /// `ceil(total_count / page_size)`; zero when the collection is empty.
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        let pages = self.total_count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_last(&self) -> bool {
        self.page_index >= self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64) -> Record {
        Record::from_value(json!({ "id": id })).unwrap()
    }

    #[test]
    fn test_page_invariants() {
        assert!(matches!(
            Page::new(vec![], 0, 0, 10),
            Err(TypeError::PageIndexZero)
        ));
        assert!(matches!(
            Page::new(vec![record(1), record(2)], 2, 1, 1),
            Err(TypeError::PageOverfull { items: 2, page_size: 1 })
        ));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![record(1)], 25, 1, 10).unwrap();
        assert_eq!(page.total_pages(), 3);

        let page = Page::new(vec![record(1)], 20, 2, 10).unwrap();
        assert_eq!(page.total_pages(), 2);
        assert!(page.is_last());

        let empty = Page::new(vec![], 0, 1, 10).unwrap();
        assert_eq!(empty.total_pages(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_backup_scenario_twelve_records_two_pages() {
        // 12 backup records at page size 10: page 1 holds 10, page 2 the rest.
        let first: Vec<Record> = (1..=10).map(record).collect();
        let page1 = Page::new(first, 12, 1, 10).unwrap();
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.total_count, 12);
        assert_eq!(page1.total_pages(), 2);
        assert!(!page1.is_last());

        let second: Vec<Record> = (11..=12).map(record).collect();
        let page2 = Page::new(second, 12, 2, 10).unwrap();
        assert_eq!(page2.items.len(), 2);
        assert!(page2.is_last());

        // Pages of one snapshot are disjoint by id.
        let ids1: Vec<_> = page1.items.iter().map(|r| r.id().clone()).collect();
        assert!(page2.items.iter().all(|r| !ids1.contains(r.id())));
    }
}
