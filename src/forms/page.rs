use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw pagination query. Values are kept as text so bad input falls back
/// to defaults instead of failing the request.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageQuery {
    /// `(page, size)` with page >= 0 and size in 1..=100.
    pub fn normalize(&self) -> (u32, u32) {
        let page = match self.page.as_deref().map(|p| p.trim().parse::<i64>()) {
            None => 0,
            Some(Ok(page)) if page >= 0 => page.min(u32::MAX as i64) as u32,
            Some(_) => {
                tracing::warn!("Invalid page number, defaulting to 0");
                0
            }
        };

        let size = match self.size.as_deref().map(|s| s.trim().parse::<i64>()) {
            None => DEFAULT_PAGE_SIZE,
            Some(Ok(size)) if size > MAX_PAGE_SIZE as i64 => {
                tracing::warn!("Requested page size exceeds maximum ({MAX_PAGE_SIZE}), capping");
                MAX_PAGE_SIZE
            }
            Some(Ok(size)) if size >= 1 => size as u32,
            Some(_) => {
                tracing::warn!("Invalid page size, defaulting to {DEFAULT_PAGE_SIZE}");
                DEFAULT_PAGE_SIZE
            }
        };

        (page, size)
    }
}
