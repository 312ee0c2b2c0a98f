use std::collections::HashMap;

use corrida_shared::calendar::format_timestamp;
use corrida_shared::format::{format_pace, medal};
use corrida_shared::{
    AttendanceStatus, EventDetail, Group, GroupEvent, GroupRankings, MembershipRole, RankingEntry,
    RunningRoute,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::group_calendar::GroupCalendar;
use crate::components::groups::viewer_role;
use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::confirm;
use crate::web::route::AppRoute;
use crate::web::router::Link;

const UPCOMING_SHOWN: usize = 3;

/// 群组引用的全部用户，按列出顺序去重
pub fn referenced_users(group: &Group) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in group.admins.iter().chain(&group.members).chain(&group.pending) {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    ids
}

/// 前三名显示奖牌，其后显示 `4º` 形式的序号
pub fn ranking_position(index: usize) -> String {
    medal(index)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}º", index + 1))
}

fn ranking_level(title: &'static str, entries: Vec<RankingEntry>) -> impl IntoView {
    view! {
        <div class="mb-4">
            <h4 class="font-semibold mb-2">{title}</h4>
            {if entries.is_empty() {
                view! { <p class="text-sm text-base-content/50">"Sem atividades registradas."</p> }.into_any()
            } else {
                view! {
                    <ul class="space-y-1">
                        {entries.into_iter().enumerate().map(|(i, entry)| view! {
                            <li class="flex justify-between">
                                <span>{ranking_position(i)} " " {entry.name}</span>
                                <span class="badge badge-outline">
                                    {entry.average_pace.and_then(format_pace).unwrap_or_else(|| "--".to_string())}
                                </span>
                            </li>
                        }).collect_view()}
                    </ul>
                }.into_any()
            }}
        </div>
    }
}

#[component]
fn RankingPanel(rankings: GroupRankings) -> impl IntoView {
    let GroupRankings { beginner, intermediate, advanced } = rankings;
    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h3 class="card-title">"Ranking por Nível"</h3>
                {ranking_level("Iniciantes", beginner)}
                {ranking_level("Intermediários", intermediate)}
                {ranking_level("Avançados", advanced)}
            </div>
        </div>
    }
}

/// 活动详情与出席按钮
#[component]
fn EventPanel(event_id: String, selected: RwSignal<Option<String>>) -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();
    let state = session.session();

    let detail = RwSignal::new(Option::<EventDetail>::None);
    let (busy, set_busy) = signal(false);
    let event_id = StoredValue::new(event_id);

    let api = session.api();
    spawn_local(async move {
        match api.get_event(&event_id.get_value()).await {
            Ok(event) => detail.set(Some(event)),
            Err(e) => toaster.api_error("Erro ao carregar evento", &e),
        }
    });

    let my_id = move || state.with(|s| s.user.as_ref().map(|u| u.id.clone()).unwrap_or_default());

    let respond = move |status: AttendanceStatus| {
        set_busy.set(true);
        let api = session.api();
        let id = event_id.get_value();
        spawn_local(async move {
            let result = async {
                api.set_attendance(&id, status).await?;
                api.get_event(&id).await
            }
            .await;
            match result {
                Ok(event) => {
                    detail.set(Some(event));
                    toaster.success("Presença registrada com sucesso!");
                }
                Err(e) => toaster.api_error("Erro ao confirmar presença", &e),
            }
            set_busy.set(false);
        });
    };

    let body = move || {
        detail.get().map(|d| {
            let me = my_id();
            let mine = d.status_of(&me);
            let GroupEvent { title, description, start_date, end_date, location, kind, .. } = d.event;
            let attendees = d
                .attendees
                .into_iter()
                .map(|a| {
                    let you = if a.user.id == me { " (você)" } else { "" };
                    view! { <li>{a.user.name} {you} " – " {a.status.label()}</li> }
                })
                .collect_view();
            let buttons = [AttendanceStatus::Confirmed, AttendanceStatus::Maybe, AttendanceStatus::Declined]
                .into_iter()
                .map(|status| {
                    let class = if mine == Some(status) { "btn btn-sm btn-success" } else { "btn btn-sm btn-outline" };
                    view! {
                        <button class=class disabled=move || busy.get() on:click=move |_| respond(status)>
                            {status.label()}
                        </button>
                    }
                })
                .collect_view();
            view! {
                <h3 class="card-title">{title}</h3>
                {description.map(|text| view! { <p>{text}</p> })}
                {kind.map(|k| view! { <p><strong>"Tipo: "</strong> {k.label()}</p> })}
                <p>
                    <strong>"Início: "</strong> {format_timestamp(&start_date)}
                    {end_date.map(|end| view! { " • " <strong>"Fim: "</strong> {format_timestamp(&end)} })}
                </p>
                {location.map(|place| view! { <p><strong>"Local: "</strong> {place}</p> })}
                {d.linked_route.map(|route| view! {
                    <p><strong>"Rota: "</strong>
                        <Link to=AppRoute::RouteView(route.id) class="link link-primary">{route.name}</Link>
                    </p>
                })}
                {d.created_by.map(|c| view! { <p><strong>"Criado por: "</strong> {c.name}</p> })}
                <ul class="list-disc ml-6">{attendees}</ul>
                <div class="flex gap-2 mt-2">{buttons}</div>
            }
        })
    };

    view! {
        <div class="card bg-base-100 shadow-xl border border-primary">
            <div class="card-body">
                {body}
                <div class="card-actions justify-end">
                    <button class="btn btn-sm btn-ghost" on:click=move |_| selected.set(None)>"Fechar"</button>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn GroupDetailPage(group_id: String) -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();
    let state = session.session();
    let group_id = StoredValue::new(group_id);

    let group = RwSignal::new(Option::<Group>::None);
    let names = RwSignal::new(HashMap::<String, String>::new());
    let routes = RwSignal::new(Vec::<RunningRoute>::new());
    let events = RwSignal::new(Vec::<GroupEvent>::new());
    let rankings = RwSignal::new(Option::<GroupRankings>::None);
    let selected_event = RwSignal::new(Option::<String>::None);
    let extras_loaded = StoredValue::new(false);

    let my_id = move || state.with(|s| s.user.as_ref().map(|u| u.id.clone()));
    let role = move || {
        let me = my_id();
        group.with(|g| g.as_ref().and_then(|g| viewer_role(g, me.as_deref())))
    };
    let is_admin = move || role() == Some(MembershipRole::Admin);
    let is_member = move || matches!(role(), Some(MembershipRole::Admin | MembershipRole::Member));

    let fetch_group = move || {
        let api = session.api();
        spawn_local(async move {
            match api.get_group(&group_id.get_value()).await {
                Ok(g) => group.set(Some(g)),
                Err(e) => toaster.api_error("Erro ao carregar grupo", &e),
            }
        });
    };
    fetch_group();

    // 成员名称
    Effect::new(move |_| {
        let Some(ids) = group.with(|g| g.as_ref().map(referenced_users)) else {
            return;
        };
        let api = session.api();
        spawn_local(async move {
            match api.users_by_ids(ids).await {
                Ok(users) => names.set(users.into_iter().map(|u| (u.id, u.name)).collect()),
                Err(e) => log::warn!("Failed to load group member names: {}", e),
            }
        });
    });

    // 成员可见内容：路线与近期活动
    Effect::new(move |_| {
        if !is_member() || extras_loaded.get_value() {
            return;
        }
        extras_loaded.set_value(true);
        let api = session.api();
        let id = group_id.get_value();
        spawn_local(async move {
            match api.routes_by_group(&id).await {
                Ok(list) => routes.set(list),
                Err(e) => toaster.api_error("Erro ao carregar rotas", &e),
            }
            match api.upcoming_events(&id).await {
                Ok(mut list) => {
                    list.truncate(UPCOMING_SHOWN);
                    events.set(list);
                }
                Err(e) => log::warn!("Failed to load upcoming events: {}", e),
            }
        });
    });

    let name_of = move |id: &str| names.with(|n| n.get(id).cloned().unwrap_or_else(|| id.to_string()));

    let on_join = move |_| {
        let api = session.api();
        spawn_local(async move {
            match api.join_group(&group_id.get_value()).await {
                Ok(()) => {
                    toaster.success("Solicitação enviada! Aguarde a aprovação.");
                    fetch_group();
                }
                Err(e) => toaster.api_error("Erro ao solicitar entrada", &e),
            }
        });
    };

    let on_rankings = move |_| {
        let api = session.api();
        spawn_local(async move {
            match api.group_rankings(&group_id.get_value()).await {
                Ok(r) => rankings.set(Some(r)),
                Err(e) => toaster.api_error("Não foi possível carregar o ranking", &e),
            }
        });
    };

    let on_approve = move |user_id: String| {
        let api = session.api();
        spawn_local(async move {
            match api.approve_member(&group_id.get_value(), &user_id).await {
                Ok(()) => {
                    toaster.success("Membro aprovado!");
                    fetch_group();
                }
                Err(e) => toaster.api_error("Erro ao aprovar membro", &e),
            }
        });
    };

    let on_promote = move |user_id: String| {
        let api = session.api();
        spawn_local(async move {
            match api.promote_admin(&group_id.get_value(), &user_id).await {
                Ok(()) => {
                    toaster.success("Membro promovido a administrador!");
                    fetch_group();
                }
                Err(e) => toaster.api_error("Erro ao promover membro", &e),
            }
        });
    };

    let on_delete_route = move |route_id: String| {
        if !confirm("Deseja excluir esta rota?") {
            return;
        }
        let api = session.api();
        spawn_local(async move {
            match api.delete_route(&route_id).await {
                Ok(()) => {
                    toaster.success("Rota excluída!");
                    routes.update(|list| list.retain(|r| r.id != route_id));
                }
                Err(e) => toaster.api_error("Erro ao excluir rota", &e),
            }
        });
    };

    let header = move || {
        group.get().map(|g| {
            view! {
                <div>
                    <h1 class="text-3xl font-bold">{g.name}</h1>
                    <p class="text-base-content/70">{g.description}</p>
                </div>
            }
        })
    };

    let membership = move || match role() {
        Some(MembershipRole::Outsider) => {
            view! { <button class="btn btn-primary" on:click=on_join>"Solicitar entrada"</button> }.into_any()
        }
        Some(MembershipRole::Pending) => {
            view! { <span class="badge badge-error">"Solicitação pendente"</span> }.into_any()
        }
        Some(MembershipRole::Admin) => view! { <span class="badge badge-success">"Administrador"</span> }.into_any(),
        Some(MembershipRole::Member) => view! { <span class="badge badge-info">"Membro"</span> }.into_any(),
        None => ().into_any(),
    };

    let event_board = move || {
        let list = events.get();
        if list.is_empty() {
            return view! { <p class="text-base-content/50">"Nenhum evento futuro."</p> }.into_any();
        }
        view! {
            <ul class="space-y-2">
                {list.into_iter().map(|ev| {
                    let id = ev.id.clone();
                    view! {
                        <li class="flex justify-between items-center">
                            <div>
                                <p class="font-semibold">{ev.title}</p>
                                <p class="text-sm">{format_timestamp(&ev.start_date)}</p>
                            </div>
                            <button class="btn btn-sm btn-outline" on:click=move |_| selected_event.set(Some(id.clone()))>
                                "Ver detalhes"
                            </button>
                        </li>
                    }
                }).collect_view()}
            </ul>
        }
        .into_any()
    };

    let route_list = move || {
        let list = routes.get();
        if list.is_empty() {
            return view! { <p class="text-base-content/50">"Nenhuma rota cadastrada."</p> }.into_any();
        }
        let admin = is_admin();
        view! {
            <ul class="space-y-2">
                {list.into_iter().map(|route| {
                    let id = route.id.clone();
                    view! {
                        <li class="flex justify-between items-center border border-base-300 rounded-box p-3">
                            <div>
                                <p class="font-semibold">{route.name}</p>
                                <p class="text-sm">{format!("{:.2} km", route.distance_km)}</p>
                            </div>
                            <div class="flex gap-2">
                                <Link to=AppRoute::RouteView(id.clone()) class="btn btn-sm btn-outline">"Ver rota"</Link>
                                {admin.then(|| view! {
                                    <button class="btn btn-sm btn-error" on:click=move |_| on_delete_route(id.clone())>"Excluir"</button>
                                })}
                            </div>
                        </li>
                    }
                }).collect_view()}
            </ul>
        }
        .into_any()
    };

    let people = move || {
        let Some(g) = group.get() else {
            return ().into_any();
        };
        let admin = is_admin();
        let admins = g
            .admins
            .iter()
            .map(|id| view! {
                <li class="flex justify-between items-center">
                    <span>{name_of(id)}</span>
                    <Link to=AppRoute::UserProfile(id.clone()) class="btn btn-xs btn-outline">"Ver perfil"</Link>
                </li>
            })
            .collect_view();
        let members = g
            .members
            .iter()
            .map(|id| {
                let promotable = admin && !g.is_admin(id);
                let target = id.clone();
                view! {
                    <li class="flex justify-between items-center">
                        <span>{name_of(id)}</span>
                        <div class="flex gap-2">
                            <Link to=AppRoute::UserProfile(id.clone()) class="btn btn-xs btn-outline">"Ver perfil"</Link>
                            {promotable.then(|| view! {
                                <button class="btn btn-xs btn-secondary" on:click=move |_| on_promote(target.clone())>
                                    "Promover a admin"
                                </button>
                            })}
                        </div>
                    </li>
                }
            })
            .collect_view();
        let pending = admin.then(|| {
            let rows = g
                .pending
                .iter()
                .map(|id| {
                    let target = id.clone();
                    view! {
                        <li class="flex justify-between items-center">
                            <span>{name_of(id)}</span>
                            <div class="flex gap-2">
                                <Link to=AppRoute::UserProfile(id.clone()) class="btn btn-xs btn-outline">"Ver perfil"</Link>
                                <button class="btn btn-xs btn-primary" on:click=move |_| on_approve(target.clone())>"Aprovar"</button>
                            </div>
                        </li>
                    }
                })
                .collect_view();
            view! {
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h3 class="card-title">"Solicitações Pendentes"</h3>
                        {if g.pending.is_empty() {
                            view! { <p class="text-base-content/50">"Nenhuma solicitação."</p> }.into_any()
                        } else {
                            view! { <ul class="space-y-2">{rows}</ul> }.into_any()
                        }}
                    </div>
                </div>
            }
        });
        view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h3 class="card-title">"Administradores"</h3>
                    <ul class="space-y-2">{admins}</ul>
                </div>
            </div>
            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h3 class="card-title">"Membros"</h3>
                    <ul class="space-y-2">{members}</ul>
                </div>
            </div>
            {pending}
        }
        .into_any()
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="max-w-5xl mx-auto space-y-6">
                <Show
                    when=move || group.with(Option::is_some)
                    fallback=|| view! { <p class="text-center mt-8">"Carregando grupo..."</p> }
                >
                    {header}
                    <div class="flex flex-wrap gap-2 items-center">{membership}</div>
                    <Show when=is_member>
                        <div class="flex flex-wrap gap-2">
                            <button class="btn btn-primary" on:click=on_rankings>"Ver Ranking Geral"</button>
                            <Show when=is_admin>
                                <Link to=AppRoute::NewRoute(group_id.get_value()) class="btn btn-success">"Criar Rota"</Link>
                            </Show>
                        </div>
                        {move || rankings.get().map(|r| view! { <RankingPanel rankings=r /> })}
                        {move || selected_event.get().map(|id| view! { <EventPanel event_id=id selected=selected_event /> })}
                        <div class="card bg-base-100 shadow">
                            <div class="card-body">
                                <h3 class="card-title">"Mural de Eventos (Próximos 3)"</h3>
                                {event_board}
                            </div>
                        </div>
                        <GroupCalendar
                            group_id=group_id.get_value()
                            is_admin=Signal::derive(is_admin)
                            routes=routes
                            selected_event=selected_event
                        />
                        <div class="card bg-base-100 shadow">
                            <div class="card-body">
                                <h3 class="card-title">"Rotas do Grupo"</h3>
                                {route_list}
                            </div>
                        </div>
                        {people}
                    </Show>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_users_are_unique_and_ordered() {
        let group: Group = serde_json::from_value(serde_json::json!({
            "_id": "g1",
            "nome": "Madrugadores",
            "administradores": ["u1"],
            "membros": ["u1", "u2"],
            "pendentes": ["u3", "u2"]
        }))
        .unwrap();
        assert_eq!(referenced_users(&group), vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn podium_then_ordinals() {
        assert_eq!(ranking_position(0), "🥇");
        assert_eq!(ranking_position(2), "🥉");
        assert_eq!(ranking_position(3), "4º");
    }
}
