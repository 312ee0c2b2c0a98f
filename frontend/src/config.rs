//! 构建期配置
//!
//! 取值来自编译期环境变量（`build.rs` 也会加载 `.env`），缺失时使用下方默认值。

use corrida_shared::Endpoint;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 后端基础 URL，不带末尾斜杠
    pub api_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::with_base_url(option_env!("CORRIDA_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    pub fn with_base_url(url: &str) -> Self {
        let url = url.trim();
        let url = if url.is_empty() { DEFAULT_API_URL } else { url };
        Self {
            api_base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// 浏览器发起 Google 登录流程的地址
    pub fn google_login_url(&self) -> String {
        Endpoint::GoogleLogin.url(&self.api_base_url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let cfg = AppConfig::with_base_url(" https://api.corrida.app/api/ ");
        assert_eq!(cfg.api_base_url, "https://api.corrida.app/api");
        assert_eq!(cfg.google_login_url(), "https://api.corrida.app/api/auth/google");
    }

    #[test]
    fn empty_value_uses_default() {
        assert_eq!(AppConfig::with_base_url("").api_base_url, DEFAULT_API_URL);
    }
}
