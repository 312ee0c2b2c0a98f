use corrida_shared::HttpMethod;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 传输层请求，由 API 层填充
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解码响应体；空响应体按 JSON `null` 处理，以便无内容的响应也能解码。
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// 客户端与网络之间唯一的注入点
///
/// 使用 `?Send`，因为浏览器中的 future 持有 JS 值。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 测试替身 (Mock Client)
// =========================================================

#[cfg(test)]
pub use mock::MockHttpClient;

#[cfg(test)]
mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// 按 URL 预设的响应；未知 URL 返回 404。
    ///
    /// 克隆共享状态，测试把一个句柄移入 API 后仍可保留另一个。
    #[derive(Clone, Default)]
    pub struct MockHttpClient {
        responses: Rc<RefCell<HashMap<String, (u16, String)>>>,
        failures: Rc<RefCell<Vec<String>>>,
        pub requests: Rc<RefCell<Vec<HttpRequest>>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
            self.responses
                .borrow_mut()
                .insert(url.to_string(), (status, body.to_string()));
        }

        pub fn mock_raw(&self, url: &str, status: u16, body: &str) {
            self.responses
                .borrow_mut()
                .insert(url.to_string(), (status, body.to_string()));
        }

        /// 让发往 `url` 的请求在产生响应前失败
        pub fn mock_network_failure(&self, url: &str) {
            self.failures.borrow_mut().push(url.to_string());
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
            self.requests.borrow_mut().push(req.clone());

            if self.failures.borrow().contains(&req.url) {
                return Err(ApiError::Network(format!("connection refused: {}", req.url)));
            }

            let responses = self.responses.borrow();
            match responses.get(&req.url) {
                Some((status, body)) => Ok(HttpResponse {
                    status: *status,
                    body: body.clone(),
                }),
                None => Ok(HttpResponse {
                    status: 404,
                    body: "Not Found".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn empty_body_decodes_as_null() {
        let resp = HttpResponse {
            status: 204,
            body: String::new(),
        };
        assert!(resp.is_success());
        let decoded: Option<u32> = resp.json().unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn malformed_body_is_decode_error() {
        #[derive(Debug, Deserialize)]
        struct Thing {
            #[allow(dead_code)]
            id: String,
        }
        let resp = HttpResponse {
            status: 200,
            body: "{\"nope\":1}".to_string(),
        };
        assert!(matches!(resp.json::<Thing>(), Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn mock_records_and_defaults_to_404() {
        let client = MockHttpClient::new();
        client.mock_response("http://api/a", 200, serde_json::json!({"ok": true}));

        let hit = client
            .send(HttpRequest::new("http://api/a", HttpMethod::Get).with_header("X", "1"))
            .await
            .unwrap();
        let miss = client
            .send(HttpRequest::new("http://api/b", HttpMethod::Get))
            .await
            .unwrap();

        assert_eq!(hit.status, 200);
        assert_eq!(miss.status, 404);
        assert_eq!(client.request_count(), 2);
        assert_eq!(client.requests.borrow()[0].headers.get("X").map(String::as_str), Some("1"));
    }
}
