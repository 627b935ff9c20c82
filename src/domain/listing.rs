//! Query parameters and response envelope shared by the list operations.

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::storage::{ListFilter, Page, PageRequest, Sort, SortDirection, SortField};

/// Listing query string: `page`, `limit`, `sort`, `sortby` plus field filters.
///
/// Soft-deleted rows never appear in a listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<SortDirection>,
    pub sortby: Option<SortField>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl ListQuery {
    pub fn filter(&self) -> ListFilter {
        ListFilter {
            name: self.name.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
            is_deleted: Some(false),
        }
    }

    /// `sortby` picks the column; `sort` alone has nothing to order by.
    pub fn sort(&self) -> Option<Sort> {
        self.sortby.map(|field| Sort {
            field,
            direction: self.sort.unwrap_or_default(),
        })
    }

    /// Resolve the page window, clamping to `1..=max_page_size`.
    pub fn page_request(&self, config: &PaginationConfig) -> PageRequest {
        let max = config.max_page_size.max(1);
        let limit = self
            .limit
            .unwrap_or(config.default_page_size)
            .clamp(1, max);
        PageRequest {
            page: self.page.unwrap_or(1).max(1),
            limit,
        }
    }
}

/// Pagination block of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub page_size: u32,
    pub total_count: u64,
}

impl PaginationInfo {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let size = request.limit.max(1) as u64;
        Self {
            current_page: request.page,
            total_pages: total.div_ceil(size),
            page_size: request.limit,
            total_count: total,
        }
    }
}

/// A page of items together with its pagination block.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> Listing<T> {
    pub fn from_page(page: Page<T>, request: PageRequest) -> Self {
        Self {
            pagination: PaginationInfo::new(request, page.total),
            items: page.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination() -> PaginationConfig {
        PaginationConfig {
            default_page_size: 3,
            max_page_size: 10,
        }
    }

    #[test]
    fn test_page_request_defaults() {
        let req = ListQuery::default().page_request(&pagination());
        assert_eq!(req, PageRequest { page: 1, limit: 3 });
    }

    #[test]
    fn test_page_request_clamps() {
        let query = ListQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(
            query.page_request(&pagination()),
            PageRequest { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_sort_requires_sortby() {
        let query = ListQuery {
            sort: Some(SortDirection::Desc),
            ..Default::default()
        };
        assert!(query.sort().is_none());

        let query = ListQuery {
            sortby: Some(SortField::Name),
            ..Default::default()
        };
        assert_eq!(query.sort().unwrap().direction, SortDirection::Asc);
    }

    #[test]
    fn test_filter_hides_deleted() {
        assert_eq!(ListQuery::default().filter().is_deleted, Some(false));
    }

    #[test]
    fn test_pagination_info_shape() {
        let info = PaginationInfo::new(PageRequest { page: 2, limit: 3 }, 7);
        assert_eq!(info.total_pages, 3);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"currentPage": 2, "totalPages": 3, "pageSize": 3, "totalCount": 7})
        );
    }

    #[test]
    fn test_query_string_parsing() {
        let query: ListQuery =
            serde_json::from_str(r#"{"sort": "desc", "sortby": "updated_at", "page": 2}"#).unwrap();
        assert_eq!(query.sort, Some(SortDirection::Desc));
        assert_eq!(query.sortby, Some(SortField::UpdatedAt));
    }
}
