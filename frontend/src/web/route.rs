//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路径参数以及访问守卫。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    /// OAuth 回调，查询串携带 `token`
    LoginCallback,
    Register,
    CompleteProfile,
    EditProfile,
    /// 当前用户主页 (需要认证)
    MyProfile,
    UserProfile(String),
    /// 需要认证
    NewActivity,
    Calendar,
    /// 需要认证
    Groups,
    /// 需要认证
    GroupDetail(String),
    /// 需要认证
    NewRoute(String),
    RouteView(String),
    /// 页面未找到
    NotFound,
}

/// 守卫结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(AppRoute),
    Redirect(AppRoute),
}

impl GuardDecision {
    /// 最终要显示的路由
    pub fn route(&self) -> &AppRoute {
        match self {
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => route,
        }
    }

    pub fn into_route(self) -> AppRoute {
        match self {
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => route,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardDecision::Redirect(_))
    }
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 查询串与末尾斜杠被忽略。
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Self::Login,
            ["login", "callback"] => Self::LoginCallback,
            ["cadastro"] => Self::Register,
            ["completar-perfil"] => Self::CompleteProfile,
            ["editar-perfil"] => Self::EditProfile,
            ["perfil"] => Self::MyProfile,
            ["perfil", id] => Self::UserProfile(id.to_string()),
            ["nova-atividade"] => Self::NewActivity,
            ["calendario"] => Self::Calendar,
            ["grupos"] => Self::Groups,
            ["grupos", id] => Self::GroupDetail(id.to_string()),
            ["grupos", id, "nova-rota"] => Self::NewRoute(id.to_string()),
            ["rotas", id] => Self::RouteView(id.to_string()),
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/".to_string(),
            Self::LoginCallback => "/login/callback".to_string(),
            Self::Register => "/cadastro".to_string(),
            Self::CompleteProfile => "/completar-perfil".to_string(),
            Self::EditProfile => "/editar-perfil".to_string(),
            Self::MyProfile => "/perfil".to_string(),
            Self::UserProfile(id) => format!("/perfil/{}", id),
            Self::NewActivity => "/nova-atividade".to_string(),
            Self::Calendar => "/calendario".to_string(),
            Self::Groups => "/grupos".to_string(),
            Self::GroupDetail(id) => format!("/grupos/{}", id),
            Self::NewRoute(group_id) => format!("/grupos/{}/nova-rota", group_id),
            Self::RouteView(id) => format!("/rotas/{}", id),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::MyProfile
                | Self::NewActivity
                | Self::Groups
                | Self::GroupDetail(_)
                | Self::NewRoute(_)
        )
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::MyProfile
    }

    /// 只看令牌是否存在，不看用户资料是否已加载。
    pub fn guard(self, has_token: bool) -> GuardDecision {
        if self.requires_auth() && !has_token {
            GuardDecision::Redirect(Self::auth_failure_redirect())
        } else if self.should_redirect_when_authenticated() && has_token {
            GuardDecision::Redirect(Self::auth_success_redirect())
        } else {
            GuardDecision::Render(self)
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parameterized_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path(""), AppRoute::Login);
        assert_eq!(
            AppRoute::from_path("/perfil/64ab"),
            AppRoute::UserProfile("64ab".into())
        );
        assert_eq!(
            AppRoute::from_path("/grupos/g1/nova-rota"),
            AppRoute::NewRoute("g1".into())
        );
        assert_eq!(AppRoute::from_path("/rotas/r9"), AppRoute::RouteView("r9".into()));
        assert_eq!(
            AppRoute::from_path("/login/callback?token=abc"),
            AppRoute::LoginCallback
        );
        assert_eq!(AppRoute::from_path("/grupos/g1/membros"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/admin"), AppRoute::NotFound);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(AppRoute::from_path("/perfil/"), AppRoute::MyProfile);
        assert_eq!(AppRoute::from_path("/grupos/g1/"), AppRoute::GroupDetail("g1".into()));
    }

    #[test]
    fn paths_parse_back() {
        let routes = [
            AppRoute::Login,
            AppRoute::LoginCallback,
            AppRoute::Register,
            AppRoute::CompleteProfile,
            AppRoute::EditProfile,
            AppRoute::MyProfile,
            AppRoute::UserProfile("u1".into()),
            AppRoute::NewActivity,
            AppRoute::Calendar,
            AppRoute::Groups,
            AppRoute::GroupDetail("g1".into()),
            AppRoute::NewRoute("g1".into()),
            AppRoute::RouteView("r1".into()),
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn protected_routes_need_a_token() {
        for route in [
            AppRoute::MyProfile,
            AppRoute::NewActivity,
            AppRoute::Groups,
            AppRoute::GroupDetail("g1".into()),
            AppRoute::NewRoute("g1".into()),
        ] {
            assert_eq!(
                route.clone().guard(false),
                GuardDecision::Redirect(AppRoute::Login)
            );
            assert_eq!(route.clone().guard(true), GuardDecision::Render(route));
        }
    }

    #[test]
    fn open_routes_render_either_way() {
        for route in [
            AppRoute::Register,
            AppRoute::Calendar,
            AppRoute::UserProfile("u1".into()),
            AppRoute::RouteView("r1".into()),
            AppRoute::LoginCallback,
            AppRoute::NotFound,
        ] {
            assert_eq!(route.clone().guard(false), GuardDecision::Render(route.clone()));
            assert_eq!(route.clone().guard(true), GuardDecision::Render(route));
        }
    }

    #[test]
    fn login_with_token_goes_to_profile() {
        let decision = AppRoute::Login.guard(true);
        assert!(decision.is_redirect());
        assert_eq!(decision.route(), &AppRoute::MyProfile);
        assert_eq!(AppRoute::Login.guard(false), GuardDecision::Render(AppRoute::Login));
    }
}
