//! Pagination envelope and request parameters.

use serde::{Deserialize, Serialize};

/// Default page size used across paginated endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Spring-style page envelope returned by paginated endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    /// Zero-based index of this page.
    pub number: u32,
}

impl<T> Page<T> {
    /// An empty first page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            size: DEFAULT_PAGE_SIZE,
            number: 0,
        }
    }
}

/// Zero-based page/size query parameters.
///
/// Serializes as `page=<n>&size=<n>` query pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// First page with the default size.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    /// A specific page with the default size.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self {
            page,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_envelope_wire_shape() {
        let json = r#"{
            "content": ["a", "b", "c"],
            "totalElements": 3,
            "totalPages": 1,
            "size": 20,
            "number": 0
        }"#;
        let page: Page<String> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(page.content.len(), 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.number, 0);
    }

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::page(3).page, 3);
    }

    #[test]
    fn test_empty_page() {
        let page = Page::<i32>::empty();
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
