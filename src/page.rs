//! Page requests, ordering and page results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::schema::Schema;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// One ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub field: &'static str,
    pub direction: Direction,
}

impl Order {
    #[must_use]
    pub const fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    #[must_use]
    pub const fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// Parses a `sort` parameter such as `name,desc` or `id`.
    ///
    /// Only column fields can be sorted on.
    ///
    /// # Errors
    /// Returns [`FilterError`] for unknown or relationship fields and for
    /// directions other than `asc`/`desc`.
    pub fn parse(schema: Schema, raw: &str) -> Result<Self, FilterError> {
        let mut parts = raw.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        let field = schema
            .field(name)
            .filter(|f| !f.is_relation())
            .ok_or_else(|| FilterError::UnknownField {
                entity: schema.entity.name(),
                field: name.to_string(),
            })?;

        let direction = match parts.next() {
            None => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(_) => {
                return Err(FilterError::MalformedParameter {
                    parameter: format!("sort={raw}"),
                    reason: "direction must be asc or desc".to_string(),
                })
            }
        };
        if parts.next().is_some() {
            return Err(FilterError::MalformedParameter {
                parameter: format!("sort={raw}"),
                reason: "expected <field>[,asc|desc]".to_string(),
            });
        }
        Ok(Self {
            field: field.name,
            direction,
        })
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{dir}", self.field)
    }
}

/// A zero-based page index, a page size and an optional ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
    sort: Vec<Order>,
}

impl PageRequest {
    /// # Errors
    /// Returns [`FilterError::InvalidPage`] if `size` is zero.
    pub fn new(page: usize, size: usize) -> Result<Self, FilterError> {
        if size == 0 {
            return Err(FilterError::InvalidPage {
                reason: "size must be at least 1".to_string(),
            });
        }
        Ok(Self {
            page,
            size,
            sort: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl IntoIterator<Item = Order>) -> Self {
        self.sort.extend(sort);
        self
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn sort(&self) -> &[Order] {
        &self.sort
    }

    /// Index of the first row on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.size() as u64;
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// Applies `f` to every element, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        (self.page as u64) + 1 < self.total_pages
    }

    /// RFC 5988 `Link` header value with `next`, `prev`, `last` and `first`.
    ///
    /// `query` holds the remaining request parameters (without `page` and
    /// `size`), already URL-encoded, and may be empty.
    #[must_use]
    pub fn link_header(&self, base: &str, query: &str) -> String {
        let link = |page: u64, rel: &str| {
            let extra = if query.is_empty() {
                String::new()
            } else {
                format!("&{query}")
            };
            format!("<{base}?page={page}&size={}{extra}>; rel=\"{rel}\"", self.size)
        };

        let page = self.page as u64;
        let last = self.total_pages.saturating_sub(1);
        let mut links = Vec::new();
        if self.has_next() {
            links.push(link(page + 1, "next"));
        }
        if page > 0 && page <= last {
            links.push(link(page - 1, "prev"));
        }
        links.push(link(last, "last"));
        links.push(link(0, "first"));
        links.join(",")
    }
}
