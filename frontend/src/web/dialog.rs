//! 浏览器原生对话框

/// `window.confirm` 封装；任何失败都视为取消
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
