//! Success envelope and pagination helpers.
//!
//! Every successful response is `{success:true, message, data?, meta?}`; list
//! endpoints add `meta` with `currentPage/perPage/totalData/totalPages` and
//! HATEOAS page links.

use serde::Serialize;

/// Success envelope: `{success:true, message, data?, meta?}`
#[derive(Debug, Serialize)]
pub struct ApiBody<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<T: Serialize> ApiBody<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub fn message_only(message: impl Into<String>) -> ApiBody<()> {
        ApiBody {
            success: true,
            message: message.into(),
            data: None,
            meta: None,
        }
    }

    pub fn paginated(message: impl Into<String>, data: T, meta: ListMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: Some(meta),
        }
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub current_page: u64,
    pub per_page: u64,
    pub total_data: u64,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl ListMeta {
    pub fn new(page: u64, limit: u64, total_data: u64) -> Self {
        Self {
            current_page: page,
            per_page: limit,
            total_data,
            total_pages: total_pages(total_data, limit),
            links: None,
        }
    }

    pub fn with_links(mut self, base_path: &str) -> Self {
        self.links = Some(PageLinks::build(
            base_path,
            self.current_page,
            self.per_page,
            self.total_pages,
        ));
        self
    }
}

/// HATEOAS-style page links for list responses
#[derive(Debug, Clone, Serialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub current: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    pub fn build(base_path: &str, page: u64, limit: u64, total_pages: u64) -> Self {
        let link = |p: u64| format!("{}?page={}&limit={}", base_path, p, limit);

        Self {
            current: link(page),
            prev: (page > 1).then(|| link(page - 1)),
            next: (page < total_pages).then(|| link(page + 1)),
        }
    }
}

/// Number of pages needed for `total_data` rows at `limit` per page
pub fn total_pages(total_data: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total_data.div_ceil(limit)
}

/// Page/limit query parameters with the shared validation rules
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        Self {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(default_limit),
        }
    }

    /// Validate page/limit bounds; the message matches the wire contract.
    pub fn ensure_valid(&self, max_limit: u64) -> Result<(), String> {
        if self.page < 1 {
            return Err("Invalid pagination parameter: 'page' must be greater than 0".to_string());
        }
        if self.limit < 1 {
            return Err("Invalid pagination parameter: 'limit' must be greater than 0".to_string());
        }
        if self.limit > max_limit {
            return Err(format!(
                "Invalid pagination parameter: 'limit' cannot exceed {}",
                max_limit
            ));
        }
        Ok(())
    }

    /// Reject pages beyond the last one while data exists
    pub fn ensure_in_range(&self, total_data: u64) -> Result<(), String> {
        let pages = total_pages(total_data, self.limit);
        if self.page > pages && pages > 0 {
            return Err("Page is out of range".to_string());
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_pagination_limits() {
        let p = Pagination::new(None, None, 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert!(p.ensure_valid(100).is_ok());

        let p = Pagination::new(Some(1), Some(101), 10);
        let err = p.ensure_valid(100).unwrap_err();
        assert!(err.contains("cannot exceed 100"));
    }

    #[test]
    fn test_pagination_out_of_range() {
        let p = Pagination::new(Some(3), Some(10), 10);
        // 15 rows at 10 per page = 2 pages
        assert_eq!(p.ensure_in_range(15).unwrap_err(), "Page is out of range");
        // no data at all is never out of range
        assert!(p.ensure_in_range(0).is_ok());
    }

    #[test]
    fn test_page_links() {
        let links = PageLinks::build("/api/products", 2, 10, 3);
        assert_eq!(links.current, "/api/products?page=2&limit=10");
        assert_eq!(links.prev.as_deref(), Some("/api/products?page=1&limit=10"));
        assert_eq!(links.next.as_deref(), Some("/api/products?page=3&limit=10"));

        let links = PageLinks::build("/api/products", 1, 10, 1);
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiBody::paginated(
            "ok",
            vec![1, 2, 3],
            ListMeta::new(1, 10, 3),
        ))
        .unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["meta"]["currentPage"], 1);
        assert_eq!(body["meta"]["totalPages"], 1);
    }
}
