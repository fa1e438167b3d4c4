//! OFFSET — correctness under concurrent writes"). Each query module builds
//! its own `WHERE (sort_key, tiebreaker) > (?, ?)` predicate since the sort
//! columns differ per entity; this module only carries the shared
//! page-size clamp and the "did we fill the page" → next-cursor rule.

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 500;

pub fn clamp_limit(limit: u32) -> u32 {
    if limit == 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        limit.min(MAX_PAGE_LIMIT)
    }
}

/// Given a page fetched with `LIMIT limit + 1` (one extra row requested to
/// detect "more pages exist"), split it into the page to return and the
/// cursor for the next page.
pub fn split_page<T, K>(mut rows: Vec<T>, limit: u32, key_of: impl Fn(&T) -> K) -> (Vec<T>, Option<K>) {
    let limit = limit as usize;
    if rows.len() > limit {
        rows.truncate(limit);
        let cursor = rows.last().map(&key_of);
        (rows, cursor)
    } else {
        (rows, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_page_reports_no_cursor_when_page_is_not_full() {
        let (page, cursor) = split_page(vec![1, 2, 3], 10, |n| *n);
        assert_eq!(page, vec![1, 2, 3]);
        assert_eq!(cursor, None);
    }

    #[test]
    fn split_page_reports_cursor_when_more_rows_exist() {
        let (page, cursor) = split_page(vec![1, 2, 3], 2, |n| *n);
        assert_eq!(page, vec![1, 2]);
        assert_eq!(cursor, Some(2));
    }
}
