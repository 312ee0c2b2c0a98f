//! Corrida 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与守卫（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `session`: 会话状态（令牌与用户资料）
//! - `api`: 端点注册表之上的类型化客户端
//! - `components`: UI 组件层

pub mod api;
pub mod config;
pub mod error;
pub mod request;
pub mod session;

pub mod components {
    pub mod calendar;
    pub mod group_calendar;
    pub mod group_detail;
    pub mod groups;
    pub mod login;
    pub mod login_callback;
    pub mod navbar;
    pub mod new_activity;
    pub mod new_route;
    pub mod profile;
    pub mod profile_form;
    pub mod register;
    pub mod route_view;
    pub mod toast;
}

// 原生 Web API 封装模块
// 对浏览器原生 API 的轻量级封装：fetch、localStorage、history、confirm。
pub mod web {
    mod dialog;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use dialog::confirm;
    pub use http::FetchClient;
    pub use storage::{LocalStorage, LocalTokenStorage};
}

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::calendar::CalendarPage;
use crate::components::group_detail::GroupDetailPage;
use crate::components::groups::GroupsPage;
use crate::components::login::LoginPage;
use crate::components::login_callback::LoginCallbackPage;
use crate::components::navbar::Navbar;
use crate::components::new_activity::NewActivityPage;
use crate::components::new_route::NewRoutePage;
use crate::components::profile::ProfilePage;
use crate::components::profile_form::{CompleteProfilePage, EditProfilePage};
use crate::components::register::RegisterPage;
use crate::components::route_view::RouteViewPage;
use crate::components::toast::{ToastHost, Toaster};
use crate::config::AppConfig;
use crate::session::SessionStore;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。守卫已在路由服务中完成。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::LoginCallback => view! { <LoginCallbackPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::CompleteProfile => view! { <CompleteProfilePage /> }.into_any(),
        AppRoute::EditProfile => view! { <EditProfilePage /> }.into_any(),
        AppRoute::MyProfile => view! { <ProfilePage user_id=None /> }.into_any(),
        AppRoute::UserProfile(id) => view! { <ProfilePage user_id=Some(id) /> }.into_any(),
        AppRoute::NewActivity => view! { <NewActivityPage /> }.into_any(),
        AppRoute::Calendar => view! { <CalendarPage /> }.into_any(),
        AppRoute::Groups => view! { <GroupsPage /> }.into_any(),
        AppRoute::GroupDetail(id) => view! { <GroupDetailPage group_id=id /> }.into_any(),
        AppRoute::NewRoute(id) => view! { <NewRoutePage group_id=id /> }.into_any(),
        AppRoute::RouteView(id) => view! { <RouteViewPage route_id=id /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Página não encontrada"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 通知与会话上下文
    provide_context(Toaster::new());
    let session = SessionStore::browser(AppConfig::from_env());
    provide_context(session);

    // 2. 从 localStorage 恢复令牌，后台解析用户资料
    if let Some(pending) = session.initialize() {
        spawn_local(pending);
    }

    // 3. 令牌信号注入路由服务（解耦！）
    let has_token = session.has_token_signal();

    view! {
        <Router has_token=has_token>
            <Show when=move || has_token.get()>
                <Navbar />
            </Show>
            <ToastHost />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
