pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Rows of 1-based `page`. Out-of-range pages are empty.
pub fn page_slice<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// Number of pages needed for `count` rows.
pub fn page_count(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Falls back to page 1 when `page` is past the last page of a non-empty list.
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    if count > 0 && page > page_count(count, page_size) {
        1
    } else {
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_by_page() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(page_slice(&rows, 1, 10), &rows[0..10]);
        assert_eq!(page_slice(&rows, 3, 10), &[21, 22, 23, 24, 25]);
        assert!(page_slice(&rows, 4, 10).is_empty());
        assert!(page_slice(&rows, 0, 10).is_empty());
    }

    #[test]
    fn clamps_past_the_end() {
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(clamp_page(3, 25, 10), 3);
        assert_eq!(clamp_page(4, 25, 10), 1);
        assert_eq!(clamp_page(3, 20, 10), 1);
        assert_eq!(clamp_page(5, 0, 10), 5);
    }
}
