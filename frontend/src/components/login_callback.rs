use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 从 JWT 载荷中读取 `profileIncomplete`
///
/// 不校验签名：该声明只决定落地页，令牌本身仍由后端裁决。
pub fn profile_incomplete(token: &str) -> bool {
    let Some(payload) = token.split('.').nth(1) else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return false;
    };
    serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|claims| claims.get("profileIncomplete")?.as_bool())
        .unwrap_or(false)
}

fn query_token() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get("token").filter(|t| !t.is_empty())
}

/// Google 登录重定向的落地页
#[component]
pub fn LoginCallbackPage() -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let toaster = use_toaster();

    Effect::new(move |_| match query_token() {
        Some(token) => {
            let next = if profile_incomplete(&token) {
                AppRoute::CompleteProfile
            } else {
                AppRoute::MyProfile
            };
            spawn_local(session.login(token));
            router.navigate_route(next);
        }
        None => {
            toaster.error("Login com Google falhou.");
            router.navigate_route(AppRoute::Login);
        }
    });

    view! {
        <div class="flex items-center justify-center min-h-screen gap-3">
            <span class="loading loading-spinner loading-lg text-primary"></span>
            <p>"Autenticando via Google..."</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn reads_the_incomplete_flag() {
        assert!(profile_incomplete(&jwt(r#"{"sub":"1","profileIncomplete":true}"#)));
        assert!(!profile_incomplete(&jwt(r#"{"sub":"1","profileIncomplete":false}"#)));
        assert!(!profile_incomplete(&jwt(r#"{"sub":"1"}"#)));
    }

    #[test]
    fn malformed_tokens_count_as_complete() {
        assert!(!profile_incomplete("not-a-jwt"));
        assert!(!profile_incomplete("a.%%%.c"));
        assert!(!profile_incomplete(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("plain"))));
    }
}
