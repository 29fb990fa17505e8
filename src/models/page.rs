//! Offset/limit pagination

use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A validated `from`/`size` window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub from: i64,
    pub size: i64,
}

impl Page {
    pub fn new(from: i64, size: i64) -> AppResult<Self> {
        if size <= 0 || from < 0 {
            return Err(AppError::Validation(
                "size and from have to be positive".to_string(),
            ));
        }
        Ok(Self { from, size })
    }

    /// Skip `from` elements, keep at most `size`
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter()
            .skip(self.from as usize)
            .take(self.size as usize)
            .collect()
    }
}

/// Raw `from`/`size` query parameters
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl PageQuery {
    /// `None` when neither parameter was given
    pub fn optional(self) -> AppResult<Option<Page>> {
        match (self.from, self.size) {
            (None, None) => Ok(None),
            _ => self.or_default().map(Some),
        }
    }

    pub fn or_default(self) -> AppResult<Page> {
        Page::new(
            self.from.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}
