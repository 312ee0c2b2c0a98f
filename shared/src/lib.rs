use serde::{Deserialize, Serialize};

pub mod calendar;
mod doc_id;
pub mod format;
pub mod protocol;

pub use protocol::{ApiRequest, Endpoint, HttpMethod};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 保存会话令牌的 localStorage 键
pub const TOKEN_STORAGE_KEY: &str = "token";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// 前端内置的头像；其他取值回退到第一个
pub const AVATAR_CHOICES: [&str; 32] = [
    "/imgs/corredor1.png",
    "/imgs/corredor2.png",
    "/imgs/corredor3.png",
    "/imgs/corredor4.png",
    "/imgs/corredor5.png",
    "/imgs/corredor6.png",
    "/imgs/corredor7.png",
    "/imgs/corredor8.png",
    "/imgs/corredor9.png",
    "/imgs/corredor10.png",
    "/imgs/corredor11.png",
    "/imgs/corredor12.png",
    "/imgs/corredor13.png",
    "/imgs/corredor14.png",
    "/imgs/corredor15.png",
    "/imgs/corredor16.png",
    "/imgs/corredor17.png",
    "/imgs/corredor18.png",
    "/imgs/corredor19.png",
    "/imgs/corredor20.png",
    "/imgs/corredor21.png",
    "/imgs/corredor22.png",
    "/imgs/corredor23.png",
    "/imgs/corredor24.png",
    "/imgs/corredor25.png",
    "/imgs/corredor26.png",
    "/imgs/corredor27.png",
    "/imgs/corredor28.png",
    "/imgs/corredor29.png",
    "/imgs/corredor30.png",
    "/imgs/corredor31.png",
    "/imgs/corredor32.png",
];

// =========================================================
// 用户 (Users)
// =========================================================

/// 会话持有的当前用户最小投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "foto", default)]
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "idade", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(rename = "foto", default)]
    pub avatar: String,
    #[serde(rename = "nivelExperiencia", default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(rename = "estiloCorrida", default, skip_serializing_if = "Option::is_none")]
    pub running_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl From<UserProfile> for Profile {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
        }
    }
}

/// 嵌入在其他文档中的简短用户引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(
        flatten,
        deserialize_with = "crate::doc_id::deserialize_or_empty",
        serialize_with = "crate::doc_id::serialize"
    )]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
}

// =========================================================
// 群组 (Groups)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRole {
    Admin,
    Member,
    Pending,
    Outsider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "criadorId", default)]
    pub creator_id: String,
    #[serde(rename = "administradores", default)]
    pub admins: Vec<String>,
    #[serde(rename = "membros", default)]
    pub members: Vec<String>,
    #[serde(rename = "pendentes", default)]
    pub pending: Vec<String>,
}

impl Group {
    pub fn role_of(&self, user_id: &str) -> MembershipRole {
        if contains(&self.admins, user_id) {
            MembershipRole::Admin
        } else if contains(&self.members, user_id) {
            MembershipRole::Member
        } else if contains(&self.pending, user_id) {
            MembershipRole::Pending
        } else {
            MembershipRole::Outsider
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        contains(&self.members, user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        contains(&self.admins, user_id)
    }
}

fn contains(list: &[String], user_id: &str) -> bool {
    list.iter().any(|id| id == user_id)
}

/// 用户所属的群组排在前面，其余保持原有相对顺序
pub fn sort_joined_first(groups: &mut [Group], user_id: &str) {
    groups.sort_by_key(|g| !g.is_member(user_id));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "foto", default)]
    pub avatar: String,
    /// 每公里分钟数
    #[serde(rename = "mediaRitmo", default)]
    pub average_pace: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRankings {
    #[serde(rename = "iniciante", default)]
    pub beginner: Vec<RankingEntry>,
    #[serde(rename = "intermediario", default)]
    pub intermediate: Vec<RankingEntry>,
    #[serde(rename = "avancado", default)]
    pub advanced: Vec<RankingEntry>,
}

impl GroupRankings {
    pub fn is_empty(&self) -> bool {
        self.beginner.is_empty() && self.intermediate.is_empty() && self.advanced.is_empty()
    }
}

// =========================================================
// 路线与活动 (Routes & Activities)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningRoute {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "groupId", default)]
    pub group_id: String,
    #[serde(rename = "pontoInicio", default)]
    pub start_label: String,
    #[serde(rename = "pontoFim", default)]
    pub end_label: String,
    #[serde(rename = "distanciaKm", default)]
    pub distance_km: f64,
    #[serde(rename = "coordenadas", default)]
    pub coordinates: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "usuarioId", default)]
    pub user_id: String,
    #[serde(rename = "distanciaKm")]
    pub distance_km: f64,
    #[serde(rename = "tempoMinutos")]
    pub duration_minutes: f64,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "ritmoMedio", default)]
    pub average_pace: Option<f64>,
    #[serde(rename = "calorias", default)]
    pub calories: Option<f64>,
    #[serde(rename = "elevacao", default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(rename = "coordenadas", default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<LatLng>>,
    #[serde(rename = "pontoInicio", default, skip_serializing_if = "Option::is_none")]
    pub start_label: Option<String>,
    #[serde(rename = "pontoFim", default, skip_serializing_if = "Option::is_none")]
    pub end_label: Option<String>,
}

/// 后端计算的两点间路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    #[serde(rename = "distanciaKm")]
    pub distance_km: f64,
    #[serde(rename = "coordenadas", default)]
    pub coordinates: Vec<LatLng>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTime {
    #[serde(rename = "horas", default)]
    pub hours: u32,
    #[serde(rename = "minutos", default)]
    pub minutes: u32,
    #[serde(rename = "segundos", default)]
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accomplishment {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "usuarioId", default)]
    pub user_id: String,
    #[serde(rename = "rotaId", default)]
    pub route_id: String,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "tempo", default)]
    pub time: ElapsedTime,
    #[serde(rename = "ritmoMedio", default)]
    pub average_pace: Option<f64>,
    #[serde(rename = "avaliacao", default)]
    pub rating: u8,
    #[serde(rename = "comentario", default)]
    pub comment: String,
}

// =========================================================
// 日历 (Calendar)
// =========================================================

/// 公开日历上列出的赛事
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicRun {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    /// `YYYY-MM-DD`
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "local", default)]
    pub location: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Treino,
    Corrida,
    Outro,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Treino => "Treino conjunto",
            EventKind::Corrida => "Corrida organizada",
            EventKind::Outro => "Outro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEvent {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: Option<EventKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Confirmed,
    Maybe,
    Declined,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Confirmed => "Vou",
            AttendanceStatus::Maybe => "Talvez",
            AttendanceStatus::Declined => "Não vou",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub user: UserRef,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRoute {
    #[serde(flatten, with = "crate::doc_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "coordenadas", default)]
    pub coordinates: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCreator {
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: GroupEvent,
    #[serde(rename = "rotaAssociada", default)]
    pub linked_route: Option<LinkedRoute>,
    #[serde(rename = "createdBy", default)]
    pub created_by: Option<EventCreator>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl EventDetail {
    pub fn status_of(&self, user_id: &str) -> Option<AttendanceStatus> {
        self.attendees
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group() -> Group {
        serde_json::from_value(json!({
            "_id": "g1",
            "nome": "Madrugadores",
            "descricao": "Treinos às 5h",
            "criadorId": "u1",
            "administradores": ["u1"],
            "membros": ["u1", "u2"],
            "pendentes": ["u3"]
        }))
        .unwrap()
    }

    #[test]
    fn profile_accepts_both_id_spellings() {
        let a: Profile =
            serde_json::from_value(json!({"id": "1", "nome": "Ana", "foto": "/imgs/corredor1.png"}))
                .unwrap();
        let b: Profile = serde_json::from_value(
            json!({"_id": "1", "nome": "Ana", "foto": "/imgs/corredor1.png", "idade": 31}),
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "Ana");
    }

    #[test]
    fn profile_without_avatar_defaults_to_empty() {
        let p: Profile = serde_json::from_value(json!({"_id": "9", "nome": "Bia"})).unwrap();
        assert_eq!(p.avatar, "");
    }

    #[test]
    fn role_resolution_prefers_admin_then_member() {
        let g = group();
        assert_eq!(g.role_of("u1"), MembershipRole::Admin);
        assert_eq!(g.role_of("u2"), MembershipRole::Member);
        assert_eq!(g.role_of("u3"), MembershipRole::Pending);
        assert_eq!(g.role_of("u4"), MembershipRole::Outsider);
    }

    #[test]
    fn joined_groups_are_listed_first() {
        let mut a = group();
        a.id = "a".into();
        a.members = vec!["x".into()];
        let mut b = group();
        b.id = "b".into();
        let mut c = group();
        c.id = "c".into();
        c.members = vec![];
        let mut d = group();
        d.id = "d".into();

        let mut groups = vec![a, b, c, d];
        sort_joined_first(&mut groups, "u2");
        let ids: Vec<_> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a", "c"]);
    }

    #[test]
    fn event_detail_reads_attendance() {
        let detail: EventDetail = serde_json::from_value(json!({
            "_id": "e1",
            "title": "Longão",
            "startDate": "2025-03-02T06:00:00.000Z",
            "tipo": "treino",
            "rotaAssociada": {"_id": "r1", "nome": "Orla", "coordenadas": [{"lat": -3.7, "lng": -38.5}]},
            "createdBy": {"nome": "Ana"},
            "attendees": [
                {"user": {"_id": "u1", "nome": "Ana"}, "status": "confirmed"},
                {"user": {"_id": "u2", "nome": "Caio"}, "status": "maybe"}
            ]
        }))
        .unwrap();

        assert_eq!(detail.event.kind, Some(EventKind::Treino));
        assert_eq!(detail.status_of("u2"), Some(AttendanceStatus::Maybe));
        assert_eq!(detail.status_of("u9"), None);
        assert_eq!(detail.linked_route.unwrap().coordinates.len(), 1);
    }

    #[test]
    fn rankings_tolerate_missing_levels() {
        let r: GroupRankings = serde_json::from_value(json!({
            "iniciante": [{"userId": "u1", "nome": "Ana", "foto": "", "mediaRitmo": 6.5}]
        }))
        .unwrap();
        assert_eq!(r.beginner.len(), 1);
        assert!(r.advanced.is_empty());
        assert!(!r.is_empty());
    }
}
