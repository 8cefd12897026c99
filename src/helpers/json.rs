use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// Body of every failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: &str, message: String, path: String) -> Self {
        Self {
            status: status.as_u16(),
            error: error.to_string(),
            message,
            timestamp: Utc::now(),
            path,
            stack_trace: None,
        }
    }

    pub fn with_stack_trace(mut self, trace: Option<String>) -> Self {
        self.stack_trace = trace;
        self
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = match size {
            0 => 0,
            size => total_elements.div_ceil(size as u64),
        };

        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], 0, 2, 5);
        assert_eq!(3, page.total_pages);
        assert_eq!(0, Page::<i32>::new(vec![], 0, 20, 0).total_pages);
    }

    #[test]
    fn stack_trace_is_omitted_when_absent() {
        let body = ErrorResponse::new(
            StatusCode::NOT_FOUND,
            "NotFound",
            "missing".to_string(),
            "/customers/9".to_string(),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(404, json["status"]);
        assert_eq!("/customers/9", json["path"]);
        assert!(json.get("stackTrace").is_none());
    }
}
