use axum::Json;
use sea_orm::Order;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Success envelope: `{code: 200, message, data}`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 200)]
    pub code: i32,
    #[schema(example = "request success")]
    pub message: String,
    pub data: Option<T>,
}

/// Placeholder for responses whose `data` is always `null`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Empty {}

/// Wrap `data` in the success envelope.
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 200,
        message: "request success".into(),
        data: Some(data),
    })
}

/// Success envelope with a message and `data: null`.
pub fn ok_message(message: impl Into<String>) -> Json<ApiResponse<Empty>> {
    Json(ApiResponse {
        code: 200,
        message: message.into(),
        data: None,
    })
}

/// One page of a listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PageInfo<T> {
    pub list: Vec<T>,
    /// Number of matches across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Number of items on this page.
    #[schema(example = 10)]
    pub size: u64,
}

impl<T> PageInfo<T> {
    pub fn new(list: Vec<T>, total: u64) -> Self {
        Self {
            size: list.len() as u64,
            list,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageInfo<U> {
        PageInfo {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
            size: self.size,
        }
    }
}

/// `{id, name}` projection used by dropdown listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct SimpleItem {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "入门")]
    pub name: String,
}

impl From<(i32, String)> for SimpleItem {
    fn from((id, name): (i32, String)) -> Self {
        Self { id, name }
    }
}

/// Paging and sorting query parameters shared by all listings.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number. Default 1.
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page, 1-100. Default 10.
    #[param(example = 10)]
    pub page_size: Option<u64>,
    /// Column to sort by; each listing accepts its own set.
    #[param(example = "createdAt")]
    pub sort_property: Option<String>,
    /// `asc` or `desc`. Default `asc`.
    #[param(example = "desc")]
    pub sort_rule: Option<String>,
}

/// Highest page number a listing accepts.
pub const MAX_PAGE: u64 = 1_000_000;

/// A validated page request with a typed sort column.
#[derive(Debug, Clone)]
pub struct PageRequest<C> {
    pub page: u64,
    pub page_size: u64,
    pub sort: Option<(C, Order)>,
}

impl<C> PageRequest<C> {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl PageQuery {
    /// Clamp paging values and resolve `sortProperty` against the listing's
    /// whitelist of `(name, column)` pairs.
    pub fn resolve<C: Copy>(&self, columns: &[(&str, C)]) -> Result<PageRequest<C>, AppError> {
        let page = Ord::max(self.page.unwrap_or(1), 1);
        if page > MAX_PAGE {
            return Err(AppError::Validation(format!(
                "page must be at most {MAX_PAGE}"
            )));
        }
        let page_size = self.page_size.unwrap_or(10).clamp(1, 100);

        let order = match self.sort_rule.as_deref().map(str::trim) {
            None | Some("") | Some("asc") => Order::Asc,
            Some("desc") => Order::Desc,
            Some(_) => {
                return Err(AppError::Validation(
                    "sortRule must be one of: asc, desc".into(),
                ));
            }
        };

        let sort = match self.sort_property.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(property) => {
                let column = columns
                    .iter()
                    .find(|(name, _)| *name == property)
                    .map(|(_, column)| *column)
                    .ok_or_else(|| {
                        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
                        AppError::Validation(format!(
                            "sortProperty must be one of: {}",
                            names.join(", ")
                        ))
                    })?;
                Some((column, order))
            }
        };

        Ok(PageRequest {
            page,
            page_size,
            sort,
        })
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `%term%` for a non-blank filter, `None` otherwise.
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", escape_like(t)))
}

/// Collapse duplicate ids, keeping first-seen order.
pub fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Id,
        Name,
    }

    const COLUMNS: &[(&str, Col)] = &[("id", Col::Id), ("name", Col::Name)];

    #[test]
    fn defaults_and_clamping() {
        let req = PageQuery::default().resolve(COLUMNS).unwrap();
        assert_eq!((req.page, req.page_size), (1, 10));
        assert!(req.sort.is_none());

        let req = PageQuery {
            page: Some(0),
            page_size: Some(1000),
            ..Default::default()
        }
        .resolve(COLUMNS)
        .unwrap();
        assert_eq!((req.page, req.page_size), (1, 100));
        assert_eq!(req.offset(), 0);

        let req = PageQuery {
            page: Some(3),
            page_size: Some(0),
            ..Default::default()
        }
        .resolve(COLUMNS)
        .unwrap();
        assert_eq!(req.page_size, 1);
        assert_eq!(req.offset(), 2);
    }

    #[test]
    fn huge_page_numbers_are_rejected() {
        let err = PageQuery {
            page: Some(u64::MAX),
            ..Default::default()
        }
        .resolve(COLUMNS)
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let req = PageQuery {
            page: Some(MAX_PAGE),
            page_size: Some(100),
            ..Default::default()
        }
        .resolve(COLUMNS)
        .unwrap();
        assert_eq!(req.offset(), (MAX_PAGE - 1) * 100);
    }

    #[test]
    fn sort_is_whitelisted() {
        let req = PageQuery {
            sort_property: Some("name".into()),
            sort_rule: Some("desc".into()),
            ..Default::default()
        }
        .resolve(COLUMNS)
        .unwrap();
        assert!(matches!(req.sort, Some((Col::Name, Order::Desc))));

        let err = PageQuery {
            sort_property: Some("password".into()),
            ..Default::default()
        }
        .resolve(COLUMNS)
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("id, name")));

        assert!(
            PageQuery {
                sort_rule: Some("sideways".into()),
                ..Default::default()
            }
            .resolve(COLUMNS)
            .is_err()
        );
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(like_pattern(Some(" a_b ")).as_deref(), Some("%a\\_b%"));
        assert_eq!(like_pattern(Some("100%")).as_deref(), Some("%100\\%%"));
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(None), None);
    }

    #[test]
    fn page_info_counts_items() {
        let page = PageInfo::new(vec![1, 2, 3], 10).map(|n| n * 2);
        assert_eq!(page.list, vec![2, 4, 6]);
        assert_eq!((page.total, page.size), (10, 3));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
