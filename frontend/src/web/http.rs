//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现 [`HttpClient`]，不依赖 `gloo-net`。

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::error::{ApiError, ApiResult};
use crate::request::{HttpClient, HttpRequest, HttpResponse};

/// 基于 `window.fetch` 的浏览器传输层
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

fn js_err(context: &str, e: JsValue) -> ApiError {
    ApiError::Network(format!("{}: {:?}", context, e))
}

impl FetchClient {
    fn build(req: &HttpRequest) -> ApiResult<Request> {
        let headers = Headers::new().map_err(|e| js_err("创建 Headers 失败", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| js_err("设置 Header 失败", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts).map_err(|e| js_err("请求构建失败", e))
    }

    async fn text(response: &Response) -> ApiResult<String> {
        let promise = response
            .text()
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;

        text.as_string()
            .ok_or_else(|| ApiError::Decode("响应体无法转换为字符串".to_string()))
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let request = Self::build(&req)?;

        let window =
            web_sys::window().ok_or_else(|| ApiError::Network("无法获取 window 对象".into()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_err("网络错误", e))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ApiError::Decode(format!("Response 类型转换失败: {:?}", e)))?;

        Ok(HttpResponse {
            status: response.status(),
            body: Self::text(&response).await?,
        })
    }
}
