//! 会话模块
//!
//! 保存 Bearer 令牌与已解析的当前用户资料。
//! 路由器只通过 [`SessionStore::has_token_signal`] 感知令牌是否存在。

use std::rc::Rc;

use corrida_shared::Profile;
use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage as LocalArena;

use crate::api::CorridaApi;
use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::web::{FetchClient, LocalTokenStorage};

/// 交还给调用方的资料解析任务，由调用方决定如何驱动
pub type PendingProfile = LocalBoxFuture<'static, ()>;

// =========================================================
// 注入点 (Seams)
// =========================================================

/// 令牌的持久化槽位；浏览器构建使用 `localStorage`
pub trait TokenStorage {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// 用令牌换取其所属用户的资料
#[async_trait::async_trait(?Send)]
pub trait ProfileSource {
    async fn current_profile(&self, token: &str) -> ApiResult<Profile>;
}

// =========================================================
// 会话状态 (Session State)
// =========================================================

/// 仅当 `token` 存在时 `user` 才可能有值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<Profile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    /// 令牌已知，资料仍在解析
    TokenOnly,
    Authenticated,
}

impl Session {
    pub fn state(&self) -> SessionState {
        match (&self.token, &self.user) {
            (None, _) => SessionState::Anonymous,
            (Some(_), None) => SessionState::TokenOnly,
            (Some(_), Some(_)) => SessionState::Authenticated,
        }
    }
}

/// 通过 Context 共享的会话存储
///
/// 所有字段都是 arena 句柄，因此本结构是 `Copy` 的，可以移入任意闭包或异步任务。
#[derive(Clone, Copy)]
pub struct SessionStore {
    session: RwSignal<Session>,
    storage: StoredValue<Rc<dyn TokenStorage>, LocalArena>,
    profiles: StoredValue<Rc<dyn ProfileSource>, LocalArena>,
    config: StoredValue<AppConfig>,
}

impl SessionStore {
    pub fn new(
        storage: Rc<dyn TokenStorage>,
        profiles: Rc<dyn ProfileSource>,
        config: AppConfig,
    ) -> Self {
        Self {
            session: RwSignal::new(Session::default()),
            storage: StoredValue::new_local(storage),
            profiles: StoredValue::new_local(profiles),
            config: StoredValue::new(config),
        }
    }

    /// 连接 `localStorage` 与真实后端的存储
    pub fn browser(config: AppConfig) -> Self {
        let profiles = CorridaApi::new(&config.api_base_url, FetchClient);
        Self::new(Rc::new(LocalTokenStorage), Rc::new(profiles), config)
    }

    /// 恢复已保存的令牌
    ///
    /// 未保存令牌时直接返回 `None`，不发起网络请求。
    #[must_use = "the profile is only fetched when the returned future is driven"]
    pub fn initialize(&self) -> Option<PendingProfile> {
        let token = self.storage.with_value(|s| s.load())?;
        log::debug!("session: restored token from storage");
        self.session.set(Session {
            token: Some(token.clone()),
            user: None,
        });
        Some(self.resolve_profile(token))
    }

    /// 以 `token` 开启会话。令牌存在性立即可见，资料在返回的 future 完成后到达。
    #[must_use = "the profile is only fetched when the returned future is driven"]
    pub fn login(&self, token: String) -> PendingProfile {
        self.storage.with_value(|s| s.save(&token));
        self.session.set(Session {
            token: Some(token.clone()),
            user: None,
        });
        log::debug!("session: logged in, profile pending");
        self.resolve_profile(token)
    }

    pub fn logout(&self) {
        self.session.set(Session::default());
        self.storage.with_value(|s| s.clear());
        log::debug!("session: cleared");
    }

    /// 为当前令牌重新获取资料，例如编辑资料之后
    #[must_use = "the profile is only fetched when the returned future is driven"]
    pub fn refresh(&self) -> Option<PendingProfile> {
        self.token().map(|token| self.resolve_profile(token))
    }

    /// 获取 `token` 对应的资料
    ///
    /// 仅当 `token` 仍是当前令牌时才应用结果；当前令牌解析失败会结束会话。
    #[must_use = "the profile is only fetched when the returned future is driven"]
    pub fn resolve_profile(&self, token: String) -> PendingProfile {
        let store = *self;
        Box::pin(async move {
            let profiles = store.profiles.get_value();
            let result = profiles.current_profile(&token).await;

            if !store.is_current(&token) {
                log::debug!("session: discarding profile for a replaced token");
                return;
            }

            match result {
                Ok(profile) => {
                    log::debug!("session: profile resolved for {}", profile.id);
                    store.session.update(|s| s.user = Some(profile));
                }
                Err(err) => {
                    log::warn!("session: profile resolution failed: {}", err);
                    store.logout();
                }
            }
        })
    }

    fn is_current(&self, token: &str) -> bool {
        self.session
            .with_untracked(|s| s.token.as_deref() == Some(token))
    }

    // =========================================================
    // 读取 (Readers)
    // =========================================================

    pub fn snapshot(&self) -> Session {
        self.session.get_untracked()
    }

    pub fn state(&self) -> SessionState {
        self.session.with_untracked(Session::state)
    }

    pub fn token(&self) -> Option<String> {
        self.session.with_untracked(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<Profile> {
        self.session.with_untracked(|s| s.user.clone())
    }

    /// 供视图使用的响应式会话
    pub fn session(&self) -> ReadSignal<Session> {
        self.session.read_only()
    }

    /// 响应式的令牌存在性，注入路由器
    pub fn has_token_signal(&self) -> Signal<bool> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.token.is_some()))
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// 绑定当前令牌的 API 客户端
    pub fn api(&self) -> CorridaApi {
        CorridaApi::new(&self.config.with_value(|c| c.api_base_url.clone()), FetchClient)
            .with_token(self.token())
    }
}

/// 从 Context 获取会话
pub fn use_session() -> SessionStore {
    use_context::<SessionStore>().expect("SessionStore should be provided")
}

#[cfg(test)]
pub use memory::MemoryTokenStorage;

#[cfg(test)]
mod memory {
    use super::TokenStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// 内存中的令牌槽位；克隆共享同一槽位
    #[derive(Clone, Default)]
    pub struct MemoryTokenStorage {
        slot: Rc<RefCell<Option<String>>>,
    }

    impl MemoryTokenStorage {
        pub fn with_token(token: &str) -> Self {
            let storage = Self::default();
            storage.save(token);
            storage
        }

        pub fn stored(&self) -> Option<String> {
            self.slot.borrow().clone()
        }
    }

    impl TokenStorage for MemoryTokenStorage {
        fn load(&self) -> Option<String> {
            self.slot.borrow().clone()
        }

        fn save(&self, token: &str) {
            *self.slot.borrow_mut() = Some(token.to_string());
        }

        fn clear(&self) {
            *self.slot.borrow_mut() = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use crate::web::route::{AppRoute, GuardDecision};
    use serde_json::json;

    const BASE: &str = "http://api.test";
    const ME: &str = "http://api.test/users/me";

    fn store(storage: &MemoryTokenStorage, mock: &MockHttpClient) -> SessionStore {
        SessionStore::new(
            Rc::new(storage.clone()),
            Rc::new(CorridaApi::new(BASE, mock.clone())),
            AppConfig::with_base_url(BASE),
        )
    }

    fn ana() -> Profile {
        Profile {
            id: "1".into(),
            name: "Ana".into(),
            avatar: "/imgs/corredor1.png".into(),
        }
    }

    fn mock_me(mock: &MockHttpClient, id: &str, name: &str) {
        mock.mock_response(
            ME,
            200,
            json!({"id": id, "nome": name, "foto": "/imgs/corredor1.png"}),
        );
    }

    #[tokio::test]
    async fn initialize_without_token_stays_anonymous() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        let session = store(&storage, &mock);

        assert!(session.initialize().is_none());
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn profile_with_both_id_keys_authenticates() {
        let storage = MemoryTokenStorage::with_token("abc");
        let mock = MockHttpClient::new();
        mock.mock_response(
            ME,
            200,
            json!({"_id": "1", "id": "1", "nome": "Ana", "foto": "/imgs/corredor1.png"}),
        );
        let session = store(&storage, &mock);

        session.initialize().expect("stored token should resolve").await;

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.user(), Some(ana()));
        assert_eq!(storage.stored().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn initialize_with_token_resolves_profile() {
        let storage = MemoryTokenStorage::with_token("abc");
        let mock = MockHttpClient::new();
        mock_me(&mock, "1", "Ana");
        let session = store(&storage, &mock);

        let pending = session.initialize().expect("stored token should resolve");
        assert_eq!(session.state(), SessionState::TokenOnly);
        assert_eq!(session.token().as_deref(), Some("abc"));

        pending.await;

        assert_eq!(
            session.snapshot(),
            Session {
                token: Some("abc".into()),
                user: Some(ana()),
            }
        );
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(
            mock.last_request().unwrap().headers.get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[tokio::test]
    async fn rejected_token_clears_session_and_storage() {
        let storage = MemoryTokenStorage::with_token("expired");
        let mock = MockHttpClient::new();
        mock.mock_response(ME, 401, json!({"message": "Unauthorized", "statusCode": 401}));
        let session = store(&storage, &mock);

        session.initialize().expect("stored token should resolve").await;

        assert_eq!(session.snapshot(), Session::default());
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(storage.stored(), None);
    }

    #[tokio::test]
    async fn network_failure_also_ends_the_session() {
        let storage = MemoryTokenStorage::with_token("abc");
        let mock = MockHttpClient::new();
        mock.mock_network_failure(ME);
        let session = store(&storage, &mock);

        session.initialize().expect("stored token should resolve").await;

        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(storage.stored(), None);
    }

    #[tokio::test]
    async fn login_is_visible_before_the_profile_arrives() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        mock_me(&mock, "1", "Ana");
        let session = store(&storage, &mock);

        let pending = session.login("xyz".into());

        assert_eq!(session.token().as_deref(), Some("xyz"));
        assert_eq!(session.user(), None);
        assert_eq!(storage.stored().as_deref(), Some("xyz"));
        let has_token = session.has_token_signal().get_untracked();
        assert_eq!(
            AppRoute::MyProfile.guard(has_token),
            GuardDecision::Render(AppRoute::MyProfile)
        );

        pending.await;
        assert_eq!(session.user(), Some(ana()));
    }

    #[tokio::test]
    async fn logout_wins_over_an_in_flight_resolution() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        mock_me(&mock, "1", "Ana");
        let session = store(&storage, &mock);

        let pending = session.login("t".into());
        session.logout();
        pending.await;

        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(session.snapshot(), Session::default());
        assert_eq!(storage.stored(), None);
    }

    #[tokio::test]
    async fn stale_success_does_not_overwrite_current_profile() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        let session = store(&storage, &mock);

        let first = session.login("a".into());
        let second = session.login("b".into());

        mock_me(&mock, "2", "Bia");
        second.await;
        mock_me(&mock, "1", "Ana");
        first.await;

        assert_eq!(session.token().as_deref(), Some("b"));
        assert_eq!(session.user().map(|u| u.name), Some("Bia".to_string()));
    }

    #[tokio::test]
    async fn stale_failure_does_not_log_out() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        let session = store(&storage, &mock);

        let first = session.login("a".into());
        let second = session.login("b".into());

        mock_me(&mock, "2", "Bia");
        second.await;
        mock.mock_response(ME, 401, json!({"message": "Unauthorized"}));
        first.await;

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(storage.stored().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn second_login_returns_to_token_only() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        mock_me(&mock, "1", "Ana");
        let session = store(&storage, &mock);

        session.login("a".into()).await;
        assert_eq!(session.state(), SessionState::Authenticated);

        let pending = session.login("b".into());
        assert_eq!(session.state(), SessionState::TokenOnly);
        pending.await;
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn refresh_needs_a_token() {
        let storage = MemoryTokenStorage::default();
        let mock = MockHttpClient::new();
        let session = store(&storage, &mock);

        assert!(session.refresh().is_none());
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn state_is_derived_from_fields() {
        assert_eq!(Session::default().state(), SessionState::Anonymous);
        let token_only = Session {
            token: Some("t".into()),
            user: None,
        };
        assert_eq!(token_only.state(), SessionState::TokenOnly);
        let full = Session {
            token: Some("t".into()),
            user: Some(ana()),
        };
        assert_eq!(full.state(), SessionState::Authenticated);
    }
}
