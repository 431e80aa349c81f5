/// Number of pages needed to show `total` items, `page_size` at a time
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// Keeps a requested page number inside `1..=total_pages` (page 1 when empty)
pub fn clamp_page(page_num: u32, total: u64, page_size: u32) -> u32 {
    let last = total_pages(total, page_size).max(1);
    let last = u32::try_from(last).unwrap_or(u32::MAX);
    page_num.clamp(1, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(45, 10), 5);
        assert_eq!(total_pages(40, 10), 4);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn test_total_pages_empty() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 45, 10), 1);
        assert_eq!(clamp_page(3, 45, 10), 3);
        assert_eq!(clamp_page(9, 45, 10), 5);
        assert_eq!(clamp_page(4, 0, 10), 1);
    }
}
