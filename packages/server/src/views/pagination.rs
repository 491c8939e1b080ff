use sea_orm::*;

use crate::config::PaginationConfig;
use crate::entity::video;
use crate::error::AppError;
use crate::models::shared::PageMeta;

/// Parsed `page`/`limit` input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    /// Lenient parse: anything that is not a positive integer falls back to
    /// the default, and `limit` is clamped to the configured maximum.
    pub fn parse(page: Option<&str>, limit: Option<&str>, config: &PaginationConfig) -> Self {
        fn positive(raw: Option<&str>) -> Option<u64> {
            raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|&n| n >= 1)
        }

        let max_limit = std::cmp::Ord::max(config.max_limit, 1);
        Self {
            page: positive(page).unwrap_or(1),
            limit: positive(limit)
                .unwrap_or(config.default_limit)
                .clamp(1, max_limit),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total_pages: total.div_ceil(self.limit),
        }
    }
}

/// Sortable video fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Views,
    Duration,
}

impl SortField {
    pub fn video_column(self) -> video::Column {
        match self {
            SortField::CreatedAt => video::Column::CreatedAt,
            SortField::UpdatedAt => video::Column::UpdatedAt,
            SortField::Title => video::Column::Title,
            SortField::Views => video::Column::Views,
            SortField::Duration => video::Column::Duration,
        }
    }
}

/// A single-field sort order.
#[derive(Clone, Debug, PartialEq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: Order,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: Order::Desc,
        }
    }
}

impl SortSpec {
    /// Parse `sortBy`/`sortType` against their allow-lists. Missing values
    /// take the default (`createdAt`, `desc`); unknown values are rejected.
    pub fn parse(sort_by: Option<&str>, sort_type: Option<&str>) -> Result<Self, AppError> {
        let default = Self::default();

        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            None => default.field,
            Some("createdAt") => SortField::CreatedAt,
            Some("updatedAt") => SortField::UpdatedAt,
            Some("title") => SortField::Title,
            Some("views") => SortField::Views,
            Some("duration") => SortField::Duration,
            Some(_) => {
                return Err(AppError::Validation(
                    "sortBy must be one of: createdAt, updatedAt, title, views, duration".into(),
                ));
            }
        };

        let order = match sort_type.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") => default.order,
            Some("asc") => Order::Asc,
            Some("desc") => Order::Desc,
            Some(_) => {
                return Err(AppError::Validation(
                    "sortType must be one of: asc, desc".into(),
                ));
            }
        };

        Ok(Self { field, order })
    }
}

/// Run one page of `select` together with the total count of the same
/// filter. The count ignores `params`, so it is stable across pages.
///
/// `select` must already carry its filter and ordering.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    params: PageParams,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(db).await?;
    if total == 0 || params.offset() >= total {
        return Ok((Vec::new(), total));
    }

    let rows = select
        .offset(params.offset())
        .limit(params.limit)
        .all(db)
        .await?;

    Ok((rows, total))
}
