use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::error::ApiError;

const DISMISS_AFTER_MS: u32 = 3_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    id: u64,
    pub message: String,
    pub is_error: bool,
}

/// 全局通知，3 秒后自动消失
#[derive(Clone, Copy)]
pub struct Toaster {
    current: RwSignal<Option<Toast>>,
    next_id: RwSignal<u64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            next_id: RwSignal::new(0),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), false);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message.into(), true);
    }

    /// `context` 作为后端消息的前缀，例如 "Erro ao criar grupo"
    pub fn api_error(&self, context: &str, err: &ApiError) {
        log::warn!("{}: {}", context, err);
        self.error(format!("{}: {}", context, err.user_message()));
    }

    fn show(&self, message: String, is_error: bool) {
        let id = self.push(message, is_error);
        let toaster = *self;
        Timeout::new(DISMISS_AFTER_MS, move || toaster.dismiss(id)).forget();
    }

    fn push(&self, message: String, is_error: bool) -> u64 {
        let id = self.next_id.get_untracked() + 1;
        self.next_id.set(id);
        self.current.set(Some(Toast {
            id,
            message,
            is_error,
        }));
        id
    }

    /// 旧计时器不会清除更新的提示
    fn dismiss(&self, id: u64) {
        if self.current.with_untracked(|t| t.as_ref().map(|t| t.id)) == Some(id) {
            self.current.set(None);
        }
    }

    pub fn current(&self) -> Option<Toast> {
        self.current.get()
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_toaster() -> Toaster {
    use_context::<Toaster>().expect("Toaster should be provided")
}

/// 通知提示框
#[component]
pub fn ToastHost() -> impl IntoView {
    let toaster = use_toaster();

    move || {
        toaster.current().map(|toast| {
            let class = if toast.is_error {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=class>
                        <span>{toast.message}</span>
                    </div>
                </div>
            }
        })
    }
}
