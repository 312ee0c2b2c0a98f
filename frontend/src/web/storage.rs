//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 替代 `gloo-storage`。

use corrida_shared::TOKEN_STORAGE_KEY;

use crate::session::TokenStorage;

/// 浏览器 `localStorage` 的静态访问入口
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 键不存在或存储不可用时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 以 `token` 键持久化会话令牌
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenStorage;

impl TokenStorage for LocalTokenStorage {
    fn load(&self) -> Option<String> {
        LocalStorage::get(TOKEN_STORAGE_KEY).filter(|t| !t.is_empty())
    }

    fn save(&self, token: &str) {
        if !LocalStorage::set(TOKEN_STORAGE_KEY, token) {
            log::warn!("could not persist session token");
        }
    }

    fn clear(&self) {
        LocalStorage::delete(TOKEN_STORAGE_KEY);
    }
}
