//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 处理 -> 加载"的导航流程。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GuardDecision};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History 状态；`use_push` 为 false 时替换当前记录
fn write_history_state(path: &str, use_push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if use_push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if result.is_err() {
        log::warn!("[Router] could not update history for {}", path);
    }
}

/// 令牌存在性变化后，当前路由需要跳转到的目标；无需跳转时为 `None`
fn redirect_on_token_change(current: AppRoute, has_token: bool) -> Option<AppRoute> {
    match current.guard(has_token) {
        GuardDecision::Redirect(to) => Some(to),
        GuardDecision::Render(_) => None,
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 只依赖注入的令牌存在信号，不依赖会话实现。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 会话中是否存在令牌（注入的信号）
    has_token: Signal<bool>,
}

impl RouterService {
    fn new(has_token: Signal<bool>) -> Self {
        let initial = AppRoute::from_path(&current_path());
        let decision = initial.guard(has_token.get_untracked());
        if decision.is_redirect() {
            log::info!("[Router] initial route redirected to {}", decision.route());
            write_history_state(&decision.route().to_path(), false);
        }
        let (current_route, set_route) = signal(decision.into_route());

        Self {
            current_route,
            set_route,
            has_token,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate_route(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    /// 导航到指定路由
    ///
    /// `use_push` 为 true 使用 pushState，否则 replaceState。
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let decision = target_route.guard(self.has_token.get_untracked());
        if let GuardDecision::Redirect(to) = &decision {
            log::info!("[Router] access redirected to {}", to);
        }

        let route = decision.into_route();
        write_history_state(&route.to_path(), use_push);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let has_token = self.has_token;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target_route = AppRoute::from_path(&current_path());

            // popstate 时也执行守卫逻辑
            match target_route.guard(has_token.get_untracked()) {
                GuardDecision::Render(route) => set_route.set(route),
                GuardDecision::Redirect(redirect) => {
                    log::info!("[Router] back/forward redirected to {}", redirect);
                    write_history_state(&redirect.to_path(), false);
                    set_route.set(redirect);
                }
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 令牌出现或消失时重新评估当前路由
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let has_token = self.has_token;

        Effect::new(move |_| {
            let has_token = has_token.get();
            let route = current_route.get_untracked();

            if let Some(redirect) = redirect_on_token_change(route, has_token) {
                log::info!(
                    "[Router] token presence changed ({}), redirecting to {}",
                    has_token,
                    redirect
                );
                write_history_state(&redirect.to_path(), true);
                set_route.set(redirect);
            }
        });
    }
}

fn provide_router(has_token: Signal<bool>) -> RouterService {
    let router = RouterService::new(has_token);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 会话中是否存在令牌
    has_token: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(has_token);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，拦截点击后走路由服务
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate_route(to.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn losing_the_token_on_a_protected_view_goes_to_login() {
        assert_eq!(
            redirect_on_token_change(AppRoute::Groups, false),
            Some(AppRoute::Login)
        );
        assert_eq!(
            redirect_on_token_change(AppRoute::GroupDetail("g1".into()), false),
            Some(AppRoute::Login)
        );
    }

    #[test]
    fn gaining_a_token_on_login_goes_to_profile() {
        assert_eq!(
            redirect_on_token_change(AppRoute::Login, true),
            Some(AppRoute::MyProfile)
        );
    }

    #[test]
    fn open_views_stay_put() {
        assert_eq!(redirect_on_token_change(AppRoute::Calendar, false), None);
        assert_eq!(redirect_on_token_change(AppRoute::Groups, true), None);
        assert_eq!(redirect_on_token_change(AppRoute::RouteView("r1".into()), false), None);
    }
}
