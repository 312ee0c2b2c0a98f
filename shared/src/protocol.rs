use crate::{
    Accomplishment, Activity, AttendanceStatus, EventDetail, EventKind, Group, GroupEvent,
    GroupRankings, LatLng, PublicRun, RouteEstimate, RunningRoute, UserProfile,
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{DeserializeOwned, IgnoredAny},
};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// GET 与 DELETE 请求不携带请求体
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

// =========================================================
// 端点注册表 (Endpoint Registry)
// =========================================================

/// 客户端访问的全部后端位置，按实体 ID 参数化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    /// OAuth 流程的浏览器跳转目标，不会被 fetch
    GoogleLogin,
    CurrentUser,
    Users,
    UpdateUser,
    UserById(String),
    UsersByIds,
    UsersByGroup(String),
    Activities,
    ActivityById(String),
    ActivitiesByUser(String),
    CalculateRoute,
    PublicRuns,
    Groups,
    GroupById(String),
    JoinGroup(String),
    ApproveMember { group_id: String, user_id: String },
    PromoteAdmin { group_id: String, user_id: String },
    RemoveMember { group_id: String, user_id: String },
    LeaveGroup(String),
    GroupRankings(String),
    Routes,
    RoutesByGroup(String),
    RouteById(String),
    SpecificRoute(String),
    Accomplishments,
    AccomplishmentsByRoute(String),
    Events,
    EventsByGroup(String),
    UpcomingEventsByGroup(String),
    EventById(String),
    EventAttendance(String),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Login => "/auth/login".to_string(),
            Endpoint::GoogleLogin => "/auth/google".to_string(),
            Endpoint::CurrentUser => "/users/me".to_string(),
            Endpoint::Users => "/users".to_string(),
            Endpoint::UpdateUser => "/users/update".to_string(),
            Endpoint::UserById(id) => format!("/users/{}", id),
            Endpoint::UsersByIds => "/users/multiple".to_string(),
            Endpoint::UsersByGroup(group_id) => format!("/users/grupo/{}", group_id),
            Endpoint::Activities => "/activities".to_string(),
            Endpoint::ActivityById(id) => format!("/activities/{}", id),
            Endpoint::ActivitiesByUser(user_id) => format!("/activities/users/{}", user_id),
            Endpoint::CalculateRoute => "/activities/calculate-route".to_string(),
            Endpoint::PublicRuns => "/runs".to_string(),
            Endpoint::Groups => "/groups".to_string(),
            Endpoint::GroupById(id) => format!("/groups/{}", id),
            Endpoint::JoinGroup(id) => format!("/groups/{}/join", id),
            Endpoint::ApproveMember { group_id, user_id } => {
                format!("/groups/{}/approve/{}", group_id, user_id)
            }
            Endpoint::PromoteAdmin { group_id, user_id } => {
                format!("/groups/{}/promote/{}", group_id, user_id)
            }
            Endpoint::RemoveMember { group_id, user_id } => {
                format!("/groups/{}/remove-member/{}", group_id, user_id)
            }
            Endpoint::LeaveGroup(id) => format!("/groups/{}/leave", id),
            Endpoint::GroupRankings(id) => format!("/groups/{}/rankings", id),
            Endpoint::Routes => "/routes".to_string(),
            Endpoint::RoutesByGroup(group_id) => format!("/routes/groups/{}", group_id),
            Endpoint::RouteById(route_id) => format!("/routes/{}", route_id),
            Endpoint::SpecificRoute(route_id) => format!("/routes/specific/{}", route_id),
            Endpoint::Accomplishments => "/accomplishments".to_string(),
            Endpoint::AccomplishmentsByRoute(route_id) => {
                format!("/accomplishments/routes/{}", route_id)
            }
            Endpoint::Events => "/events".to_string(),
            Endpoint::EventsByGroup(group_id) => format!("/events/group/{}", group_id),
            Endpoint::UpcomingEventsByGroup(group_id) => {
                format!("/events/group/{}/futuros", group_id)
            }
            Endpoint::EventById(id) => format!("/events/{}", id),
            Endpoint::EventAttendance(id) => format!("/events/{}/attendance", id),
        }
    }

    /// `base_url` 下的绝对 URL；忽略基础地址末尾的斜杠
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// 是否附带 Bearer 凭据
    const AUTHENTICATED: bool = true;

    fn endpoint(&self) -> Endpoint;
}

/// 客户端不读取响应体的调用所用的响应标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ack;

impl<'de> Deserialize<'de> for Ack {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| Ack)
    }
}

macro_rules! api_request {
    (public $req:ty => $resp:ty, $method:ident, |$this:ident| $endpoint:expr) => {
        impl ApiRequest for $req {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            const AUTHENTICATED: bool = false;

            fn endpoint(&self) -> Endpoint {
                let $this = self;
                $endpoint
            }
        }
    };
    ($req:ty => $resp:ty, $method:ident, |$this:ident| $endpoint:expr) => {
        impl ApiRequest for $req {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;

            fn endpoint(&self) -> Endpoint {
                let $this = self;
                $endpoint
            }
        }
    };
}

// =========================================================
// 认证与用户 (Auth & Users)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

api_request!(public LoginRequest => LoginResponse, Post, |_r| Endpoint::Login);

#[derive(Debug, Serialize)]
pub struct CurrentUserRequest;

api_request!(CurrentUserRequest => UserProfile, Get, |_r| Endpoint::CurrentUser);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "idade")]
    pub age: u32,
    #[serde(rename = "foto")]
    pub avatar: String,
    #[serde(rename = "nivelExperiencia")]
    pub experience_level: String,
    #[serde(rename = "estiloCorrida")]
    pub running_style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

api_request!(public RegisterUserRequest => Ack, Post, |_r| Endpoint::Users);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: u32,
    #[serde(rename = "foto")]
    pub avatar: String,
    #[serde(rename = "nivelExperiencia")]
    pub experience_level: String,
    #[serde(rename = "estiloCorrida")]
    pub running_style: String,
}

api_request!(UpdateUserRequest => Ack, Put, |_r| Endpoint::UpdateUser);

#[derive(Debug, Serialize)]
pub struct GetUserRequest {
    #[serde(skip)]
    pub user_id: String,
}

api_request!(GetUserRequest => UserProfile, Get, |r| Endpoint::UserById(r.user_id.clone()));

#[derive(Debug, Serialize)]
pub struct UsersByIdsRequest {
    pub ids: Vec<String>,
}

api_request!(UsersByIdsRequest => Vec<UserProfile>, Post, |_r| Endpoint::UsersByIds);

#[derive(Debug, Serialize)]
pub struct UsersByGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(UsersByGroupRequest => Vec<UserProfile>, Get, |r| {
    Endpoint::UsersByGroup(r.group_id.clone())
});

// =========================================================
// 活动记录 (Activities)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(rename = "distanciaKm")]
    pub distance_km: f64,
    #[serde(rename = "tempoMinutos")]
    pub duration_minutes: f64,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "pontoInicio", skip_serializing_if = "Option::is_none")]
    pub start_label: Option<String>,
    #[serde(rename = "pontoFim", skip_serializing_if = "Option::is_none")]
    pub end_label: Option<String>,
    #[serde(rename = "coordenadas", skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<LatLng>>,
}

api_request!(CreateActivityRequest => Ack, Post, |_r| Endpoint::Activities);

#[derive(Debug, Serialize)]
pub struct DeleteActivityRequest {
    #[serde(skip)]
    pub activity_id: String,
}

api_request!(DeleteActivityRequest => Ack, Delete, |r| {
    Endpoint::ActivityById(r.activity_id.clone())
});

#[derive(Debug, Serialize)]
pub struct ActivitiesByUserRequest {
    #[serde(skip)]
    pub user_id: String,
}

api_request!(ActivitiesByUserRequest => Vec<Activity>, Get, |r| {
    Endpoint::ActivitiesByUser(r.user_id.clone())
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRouteRequest {
    #[serde(rename = "inicio")]
    pub start: LatLng,
    #[serde(rename = "fim")]
    pub end: LatLng,
}

api_request!(CalculateRouteRequest => RouteEstimate, Post, |_r| Endpoint::CalculateRoute);

// =========================================================
// 公开赛事 (Public runs)
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListPublicRunsRequest;

api_request!(public ListPublicRunsRequest => Vec<PublicRun>, Get, |_r| Endpoint::PublicRuns);

// =========================================================
// 群组 (Groups)
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListGroupsRequest;

api_request!(ListGroupsRequest => Vec<Group>, Get, |_r| Endpoint::Groups);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
}

api_request!(CreateGroupRequest => Ack, Post, |_r| Endpoint::Groups);

#[derive(Debug, Serialize)]
pub struct GetGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(GetGroupRequest => Group, Get, |r| Endpoint::GroupById(r.group_id.clone()));

#[derive(Debug, Serialize)]
pub struct DeleteGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(DeleteGroupRequest => Ack, Delete, |r| Endpoint::GroupById(r.group_id.clone()));

#[derive(Debug, Serialize)]
pub struct JoinGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(JoinGroupRequest => Ack, Post, |r| Endpoint::JoinGroup(r.group_id.clone()));

#[derive(Debug, Serialize)]
pub struct ApproveMemberRequest {
    #[serde(skip)]
    pub group_id: String,
    #[serde(skip)]
    pub user_id: String,
}

api_request!(ApproveMemberRequest => Ack, Patch, |r| Endpoint::ApproveMember {
    group_id: r.group_id.clone(),
    user_id: r.user_id.clone(),
});

#[derive(Debug, Serialize)]
pub struct PromoteAdminRequest {
    #[serde(skip)]
    pub group_id: String,
    #[serde(skip)]
    pub user_id: String,
}

api_request!(PromoteAdminRequest => Ack, Patch, |r| Endpoint::PromoteAdmin {
    group_id: r.group_id.clone(),
    user_id: r.user_id.clone(),
});

#[derive(Debug, Serialize)]
pub struct LeaveGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(LeaveGroupRequest => Ack, Patch, |r| Endpoint::LeaveGroup(r.group_id.clone()));

#[derive(Debug, Serialize)]
pub struct GroupRankingsRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(GroupRankingsRequest => GroupRankings, Get, |r| {
    Endpoint::GroupRankings(r.group_id.clone())
});

// =========================================================
// 路线与成绩 (Routes & Accomplishments)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRouteRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "pontoInicio")]
    pub start_label: String,
    #[serde(rename = "pontoFim")]
    pub end_label: String,
    #[serde(rename = "distanciaKm")]
    pub distance_km: f64,
    #[serde(rename = "coordenadas")]
    pub coordinates: Vec<LatLng>,
}

api_request!(CreateRouteRequest => Ack, Post, |_r| Endpoint::Routes);

#[derive(Debug, Serialize)]
pub struct RoutesByGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(RoutesByGroupRequest => Vec<RunningRoute>, Get, |r| {
    Endpoint::RoutesByGroup(r.group_id.clone())
});

#[derive(Debug, Serialize)]
pub struct DeleteRouteRequest {
    #[serde(skip)]
    pub route_id: String,
}

api_request!(DeleteRouteRequest => Ack, Delete, |r| Endpoint::RouteById(r.route_id.clone()));

#[derive(Debug, Serialize)]
pub struct GetRouteRequest {
    #[serde(skip)]
    pub route_id: String,
}

api_request!(GetRouteRequest => RunningRoute, Get, |r| {
    Endpoint::SpecificRoute(r.route_id.clone())
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccomplishmentRequest {
    #[serde(rename = "rotaId")]
    pub route_id: String,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "horas")]
    pub hours: u32,
    #[serde(rename = "minutos")]
    pub minutes: u32,
    #[serde(rename = "segundos")]
    pub seconds: u32,
    #[serde(rename = "avaliacao")]
    pub rating: u8,
    #[serde(rename = "comentario")]
    pub comment: String,
}

api_request!(CreateAccomplishmentRequest => Ack, Post, |_r| Endpoint::Accomplishments);

#[derive(Debug, Serialize)]
pub struct AccomplishmentsByRouteRequest {
    #[serde(skip)]
    pub route_id: String,
}

api_request!(AccomplishmentsByRouteRequest => Vec<Accomplishment>, Get, |r| {
    Endpoint::AccomplishmentsByRoute(r.route_id.clone())
});

// =========================================================
// 群组活动 (Events)
// =========================================================

#[derive(Debug, Serialize)]
pub struct EventsByGroupRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(EventsByGroupRequest => Vec<GroupEvent>, Get, |r| {
    Endpoint::EventsByGroup(r.group_id.clone())
});

#[derive(Debug, Serialize)]
pub struct UpcomingEventsRequest {
    #[serde(skip)]
    pub group_id: String,
}

api_request!(UpcomingEventsRequest => Vec<GroupEvent>, Get, |r| {
    Endpoint::UpcomingEventsByGroup(r.group_id.clone())
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub location: String,
    #[serde(rename = "tipo")]
    pub kind: EventKind,
    #[serde(rename = "rotaAssociada", skip_serializing_if = "Option::is_none")]
    pub linked_route: Option<String>,
    #[serde(rename = "group")]
    pub group_id: String,
}

api_request!(CreateEventRequest => Ack, Post, |_r| Endpoint::Events);

#[derive(Debug, Serialize)]
pub struct GetEventRequest {
    #[serde(skip)]
    pub event_id: String,
}

api_request!(GetEventRequest => EventDetail, Get, |r| Endpoint::EventById(r.event_id.clone()));

#[derive(Debug, Serialize)]
pub struct DeleteEventRequest {
    #[serde(skip)]
    pub event_id: String,
}

api_request!(DeleteEventRequest => Ack, Delete, |r| Endpoint::EventById(r.event_id.clone()));

#[derive(Debug, Serialize)]
pub struct AttendanceRequest {
    #[serde(skip)]
    pub event_id: String,
    pub status: AttendanceStatus,
}

api_request!(AttendanceRequest => Ack, Post, |r| {
    Endpoint::EventAttendance(r.event_id.clone())
});

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_membership_paths() {
        let approve = Endpoint::ApproveMember {
            group_id: "g1".into(),
            user_id: "u7".into(),
        };
        assert_eq!(approve.path(), "/groups/g1/approve/u7");
        assert_eq!(
            Endpoint::PromoteAdmin {
                group_id: "g1".into(),
                user_id: "u7".into()
            }
            .path(),
            "/groups/g1/promote/u7"
        );
        assert_eq!(Endpoint::JoinGroup("g1".into()).path(), "/groups/g1/join");
        assert_eq!(Endpoint::LeaveGroup("g1".into()).path(), "/groups/g1/leave");
        assert_eq!(Endpoint::GroupRankings("g1".into()).path(), "/groups/g1/rankings");
    }

    #[test]
    fn route_and_event_paths() {
        assert_eq!(Endpoint::RoutesByGroup("g2".into()).path(), "/routes/groups/g2");
        assert_eq!(Endpoint::RouteById("r1".into()).path(), "/routes/r1");
        assert_eq!(Endpoint::SpecificRoute("r1".into()).path(), "/routes/specific/r1");
        assert_eq!(
            Endpoint::AccomplishmentsByRoute("r1".into()).path(),
            "/accomplishments/routes/r1"
        );
        assert_eq!(Endpoint::EventsByGroup("g2".into()).path(), "/events/group/g2");
        assert_eq!(
            Endpoint::UpcomingEventsByGroup("g2".into()).path(),
            "/events/group/g2/futuros"
        );
        assert_eq!(Endpoint::EventAttendance("e5".into()).path(), "/events/e5/attendance");
        assert_eq!(Endpoint::CalculateRoute.path(), "/activities/calculate-route");
    }

    #[test]
    fn url_ignores_trailing_slash_on_base() {
        assert_eq!(
            Endpoint::CurrentUser.url("http://localhost:3000/api/"),
            "http://localhost:3000/api/users/me"
        );
        assert_eq!(
            Endpoint::PublicRuns.url("https://corrida.example"),
            "https://corrida.example/runs"
        );
    }

    #[test]
    fn request_metadata() {
        let join = JoinGroupRequest {
            group_id: "g9".into(),
        };
        assert_eq!(join.endpoint(), Endpoint::JoinGroup("g9".into()));
        assert_eq!(JoinGroupRequest::METHOD, HttpMethod::Post);
        assert_eq!(LeaveGroupRequest::METHOD, HttpMethod::Patch);
        assert_eq!(UpdateUserRequest::METHOD, HttpMethod::Put);

        assert!(CurrentUserRequest::AUTHENTICATED);
        assert!(!LoginRequest::AUTHENTICATED);
        assert!(!RegisterUserRequest::AUTHENTICATED);
        assert!(!ListPublicRunsRequest::AUTHENTICATED);

        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
        assert!(HttpMethod::Patch.carries_body());
    }

    #[test]
    fn path_ids_stay_out_of_the_body() {
        let req = AttendanceRequest {
            event_id: "e1".into(),
            status: AttendanceStatus::Confirmed,
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"status": "confirmed"}));

        let approve = ApproveMemberRequest {
            group_id: "g".into(),
            user_id: "u".into(),
        };
        assert_eq!(serde_json::to_value(&approve).unwrap(), json!({}));
    }

    #[test]
    fn payloads_use_backend_field_names() {
        let login = LoginRequest {
            email: "ana@example.com".into(),
            password: "segredo".into(),
        };
        assert_eq!(
            serde_json::to_value(&login).unwrap(),
            json!({"email": "ana@example.com", "senha": "segredo"})
        );

        let route = CalculateRouteRequest {
            start: LatLng { lat: -3.7, lng: -38.5 },
            end: LatLng { lat: -3.8, lng: -38.6 },
        };
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({"inicio": {"lat": -3.7, "lng": -38.5}, "fim": {"lat": -3.8, "lng": -38.6}})
        );

        let event = CreateEventRequest {
            title: "Treino".into(),
            description: String::new(),
            start_date: "2025-05-01T06:00".into(),
            end_date: None,
            location: "Parque".into(),
            kind: EventKind::Treino,
            linked_route: None,
            group_id: "g1".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["tipo"], "treino");
        assert_eq!(value["group"], "g1");
        assert!(value.get("endDate").is_none());
        assert!(value.get("rotaAssociada").is_none());
    }

    #[test]
    fn ack_accepts_any_body() {
        assert_eq!(serde_json::from_str::<Ack>("null").unwrap(), Ack);
        assert_eq!(serde_json::from_str::<Ack>(r#"{"ok":true}"#).unwrap(), Ack);
        assert_eq!(serde_json::from_str::<Ack>("\"Grupo criado\"").unwrap(), Ack);
    }

    #[test]
    fn login_response_without_token() {
        let res: LoginResponse =
            serde_json::from_value(json!({"message": "Credenciais inválidas"})).unwrap();
        assert!(res.access_token.is_none());
    }
}
