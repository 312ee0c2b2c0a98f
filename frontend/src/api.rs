use corrida_shared::protocol::*;
use corrida_shared::{
    Accomplishment, Activity, AttendanceStatus, EventDetail, Group, GroupEvent, GroupRankings,
    HEADER_AUTHORIZATION, LatLng, Profile, PublicRun, RouteEstimate, RunningRoute, UserProfile,
};

use crate::error::{ApiError, ApiResult};
use crate::request::{HttpClient, HttpRequest};
use crate::session::ProfileSource;
use crate::web::FetchClient;

/// Corrida 后端的类型化客户端
///
/// 对传输层泛型，测试可替换为 mock；浏览器构建使用 [`FetchClient`]。
#[derive(Clone, Debug, PartialEq)]
pub struct CorridaApi<C = FetchClient> {
    base_url: String,
    token: Option<String>,
    client: C,
}

impl<C: HttpClient> CorridaApi<C> {
    pub fn new(base_url: &str, client: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// 绑定需认证请求使用的 Bearer 凭据
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // 这里接受任何实现了 ApiRequest 的请求，路径、方法和响应类型都由请求类型决定
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let url = req.endpoint().url(&self.base_url);
        let mut http = HttpRequest::new(&url, R::METHOD).with_header("Accept", "application/json");

        if R::AUTHENTICATED {
            if let Some(token) = &self.token {
                http = http.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
            }
        }

        if R::METHOD.carries_body() {
            let body = serde_json::to_string(req).map_err(|e| ApiError::Encode(e.to_string()))?;
            http = http
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        let resp = self.client.send(http).await?;

        if !resp.is_success() {
            log::debug!("{} {} -> {}", R::METHOD.as_str(), url, resp.status);
            return Err(ApiError::from_status(resp.status, &resp.body));
        }

        resp.json()
    }

    // =========================================================
    // 认证与用户 (Auth & Users)
    // =========================================================

    /// 用账号密码换取令牌；2xx 响应缺少 `access_token` 时报告为解码失败。
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let resp = self
            .send(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        resp.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response without access_token".into()))
    }

    pub async fn current_user(&self) -> ApiResult<UserProfile> {
        self.send(&CurrentUserRequest).await
    }

    pub async fn register(&self, req: RegisterUserRequest) -> ApiResult<()> {
        self.send(&req).await.map(|_| ())
    }

    pub async fn update_user(&self, req: UpdateUserRequest) -> ApiResult<()> {
        self.send(&req).await.map(|_| ())
    }

    pub async fn get_user(&self, user_id: &str) -> ApiResult<UserProfile> {
        self.send(&GetUserRequest {
            user_id: user_id.to_string(),
        })
        .await
    }

    pub async fn users_by_ids(&self, ids: Vec<String>) -> ApiResult<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.send(&UsersByIdsRequest { ids }).await
    }

    pub async fn users_by_group(&self, group_id: &str) -> ApiResult<Vec<UserProfile>> {
        self.send(&UsersByGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
    }

    // =========================================================
    // 活动 (Activities)
    // =========================================================

    pub async fn create_activity(&self, req: CreateActivityRequest) -> ApiResult<()> {
        self.send(&req).await.map(|_| ())
    }

    pub async fn delete_activity(&self, activity_id: &str) -> ApiResult<()> {
        self.send(&DeleteActivityRequest {
            activity_id: activity_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn activities_by_user(&self, user_id: &str) -> ApiResult<Vec<Activity>> {
        self.send(&ActivitiesByUserRequest {
            user_id: user_id.to_string(),
        })
        .await
    }

    pub async fn calculate_route(&self, start: LatLng, end: LatLng) -> ApiResult<RouteEstimate> {
        self.send(&CalculateRouteRequest { start, end }).await
    }

    pub async fn public_runs(&self) -> ApiResult<Vec<PublicRun>> {
        self.send(&ListPublicRunsRequest).await
    }

    // =========================================================
    // 群组 (Groups)
    // =========================================================

    pub async fn list_groups(&self) -> ApiResult<Vec<Group>> {
        self.send(&ListGroupsRequest).await
    }

    pub async fn create_group(&self, name: &str, description: &str) -> ApiResult<()> {
        self.send(&CreateGroupRequest {
            name: name.to_string(),
            description: description.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn get_group(&self, group_id: &str) -> ApiResult<Group> {
        self.send(&GetGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
    }

    pub async fn delete_group(&self, group_id: &str) -> ApiResult<()> {
        self.send(&DeleteGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn join_group(&self, group_id: &str) -> ApiResult<()> {
        self.send(&JoinGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn approve_member(&self, group_id: &str, user_id: &str) -> ApiResult<()> {
        self.send(&ApproveMemberRequest {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn promote_admin(&self, group_id: &str, user_id: &str) -> ApiResult<()> {
        self.send(&PromoteAdminRequest {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn leave_group(&self, group_id: &str) -> ApiResult<()> {
        self.send(&LeaveGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn group_rankings(&self, group_id: &str) -> ApiResult<GroupRankings> {
        self.send(&GroupRankingsRequest {
            group_id: group_id.to_string(),
        })
        .await
    }

    // =========================================================
    // 路线与成绩 (Routes & Accomplishments)
    // =========================================================

    pub async fn create_route(&self, req: CreateRouteRequest) -> ApiResult<()> {
        self.send(&req).await.map(|_| ())
    }

    pub async fn routes_by_group(&self, group_id: &str) -> ApiResult<Vec<RunningRoute>> {
        self.send(&RoutesByGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
    }

    pub async fn delete_route(&self, route_id: &str) -> ApiResult<()> {
        self.send(&DeleteRouteRequest {
            route_id: route_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn get_route(&self, route_id: &str) -> ApiResult<RunningRoute> {
        self.send(&GetRouteRequest {
            route_id: route_id.to_string(),
        })
        .await
    }

    pub async fn create_accomplishment(&self, req: CreateAccomplishmentRequest) -> ApiResult<()> {
        self.send(&req).await.map(|_| ())
    }

    pub async fn accomplishments_by_route(&self, route_id: &str) -> ApiResult<Vec<Accomplishment>> {
        self.send(&AccomplishmentsByRouteRequest {
            route_id: route_id.to_string(),
        })
        .await
    }

    // =========================================================
    // 活动日程 (Events)
    // =========================================================

    pub async fn events_by_group(&self, group_id: &str) -> ApiResult<Vec<GroupEvent>> {
        self.send(&EventsByGroupRequest {
            group_id: group_id.to_string(),
        })
        .await
    }

    pub async fn upcoming_events(&self, group_id: &str) -> ApiResult<Vec<GroupEvent>> {
        self.send(&UpcomingEventsRequest {
            group_id: group_id.to_string(),
        })
        .await
    }

    pub async fn create_event(&self, req: CreateEventRequest) -> ApiResult<()> {
        self.send(&req).await.map(|_| ())
    }

    pub async fn get_event(&self, event_id: &str) -> ApiResult<EventDetail> {
        self.send(&GetEventRequest {
            event_id: event_id.to_string(),
        })
        .await
    }

    pub async fn delete_event(&self, event_id: &str) -> ApiResult<()> {
        self.send(&DeleteEventRequest {
            event_id: event_id.to_string(),
        })
        .await
        .map(|_| ())
    }

    pub async fn set_attendance(&self, event_id: &str, status: AttendanceStatus) -> ApiResult<()> {
        self.send(&AttendanceRequest {
            event_id: event_id.to_string(),
            status,
        })
        .await
        .map(|_| ())
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient + Clone> ProfileSource for CorridaApi<C> {
    async fn current_profile(&self, token: &str) -> ApiResult<Profile> {
        let api = self.clone().with_token(Some(token.to_string()));
        api.current_user().await.map(Profile::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use serde_json::json;

    const BASE: &str = "http://api.test";

    fn api(mock: &MockHttpClient) -> CorridaApi<MockHttpClient> {
        CorridaApi::new("http://api.test/", mock.clone()).with_token(Some("tok".into()))
    }

    #[tokio::test]
    async fn authenticated_get_carries_bearer_and_no_body() {
        let mock = MockHttpClient::new();
        mock.mock_response(
            &format!("{}/users/me", BASE),
            200,
            json!({"_id": "1", "nome": "Ana", "foto": "/imgs/corredor1.png"}),
        );

        let user = api(&mock).current_user().await.unwrap();
        assert_eq!(user.name, "Ana");

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.body, None);
        assert_eq!(
            req.headers.get(HEADER_AUTHORIZATION).map(String::as_str),
            Some("Bearer tok")
        );
    }

    #[tokio::test]
    async fn public_requests_skip_the_bearer() {
        let mock = MockHttpClient::new();
        mock.mock_response(&format!("{}/runs", BASE), 200, json!([]));
        mock.mock_response(
            &format!("{}/auth/login", BASE),
            201,
            json!({"access_token": "jwt"}),
        );

        let runs = api(&mock).public_runs().await.unwrap();
        assert!(runs.is_empty());
        let token = api(&mock).login("ana@example.com", "segredo").await.unwrap();
        assert_eq!(token, "jwt");

        for req in mock.requests.borrow().iter() {
            assert!(!req.headers.contains_key(HEADER_AUTHORIZATION));
        }
        let login = mock.last_request().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(login.body.as_deref().unwrap()).unwrap(),
            json!({"email": "ana@example.com", "senha": "segredo"})
        );
    }

    #[tokio::test]
    async fn login_without_token_is_an_error() {
        let mock = MockHttpClient::new();
        mock.mock_response(&format!("{}/auth/login", BASE), 200, json!({}));

        let err = api(&mock).login("a@b.c", "x").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn patch_membership_sends_empty_object() {
        let mock = MockHttpClient::new();
        mock.mock_raw(&format!("{}/groups/g1/approve/u2", BASE), 200, "");

        api(&mock).approve_member("g1", "u2").await.unwrap();

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn delete_has_no_body() {
        let mock = MockHttpClient::new();
        mock.mock_response(&format!("{}/activities/a1", BASE), 200, json!({"deleted": true}));

        api(&mock).delete_activity("a1").await.unwrap();

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.body, None);
    }

    #[tokio::test]
    async fn error_statuses_are_mapped() {
        let mock = MockHttpClient::new();
        mock.mock_response(
            &format!("{}/groups", BASE),
            400,
            json!({"message": ["nome should not be empty"], "statusCode": 400}),
        );
        mock.mock_response(&format!("{}/activities/users/1", BASE), 401, json!({"message": "Unauthorized"}));

        let err = api(&mock).create_group("", "desc").await.unwrap_err();
        assert_eq!(err.user_message(), "nome should not be empty");

        let err = api(&mock).activities_by_user("1").await.unwrap_err();
        assert!(err.is_unauthorized());

        let err = api(&mock).get_group("missing").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                message: "Não encontrado.".into()
            }
        );
    }

    #[tokio::test]
    async fn network_failure_surfaces_as_network_error() {
        let mock = MockHttpClient::new();
        mock.mock_network_failure(&format!("{}/groups", BASE));

        let err = api(&mock).list_groups().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn profile_source_uses_the_given_token() {
        let mock = MockHttpClient::new();
        mock.mock_response(
            &format!("{}/users/me", BASE),
            200,
            json!({"id": "1", "nome": "Ana", "foto": "/imgs/corredor1.png"}),
        );

        let unbound = CorridaApi::new(BASE, mock.clone());
        let profile = unbound.current_profile("abc").await.unwrap();

        assert_eq!(
            profile,
            Profile {
                id: "1".into(),
                name: "Ana".into(),
                avatar: "/imgs/corredor1.png".into(),
            }
        );
        assert_eq!(
            mock.last_request()
                .unwrap()
                .headers
                .get(HEADER_AUTHORIZATION)
                .map(String::as_str),
            Some("Bearer abc")
        );
        assert_eq!(unbound.token(), None);
    }

    #[tokio::test]
    async fn empty_id_list_skips_the_request() {
        let mock = MockHttpClient::new();
        let users = api(&mock).users_by_ids(Vec::new()).await.unwrap();
        assert!(users.is_empty());
        assert_eq!(mock.request_count(), 0);
    }
}
