use corrida_shared::{Group, MembershipRole, sort_joined_first};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::{Toaster, use_toaster};
use crate::session::{SessionStore, use_session};
use crate::web::confirm;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 用户在群组卡片上可执行的操作；默认值不提供任何操作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupActions {
    pub badge: Option<&'static str>,
    pub can_request: bool,
    pub can_leave: bool,
    pub can_delete: bool,
}

impl GroupActions {
    pub fn for_role(role: MembershipRole) -> Self {
        let badge = match role {
            MembershipRole::Admin => Some("Administrador"),
            MembershipRole::Member => Some("Membro"),
            MembershipRole::Pending => Some("Solicitação pendente"),
            MembershipRole::Outsider => None,
        };
        Self {
            badge,
            can_request: role == MembershipRole::Outsider,
            can_leave: matches!(role, MembershipRole::Admin | MembershipRole::Member),
            can_delete: role == MembershipRole::Admin,
        }
    }
}

/// 当前用户在群组中的角色；会话资料解析完成前为 `None`
pub fn viewer_role(group: &Group, viewer: Option<&str>) -> Option<MembershipRole> {
    viewer.map(|id| group.role_of(id))
}

fn reload(session: SessionStore, toaster: Toaster, set_groups: WriteSignal<Vec<Group>>) {
    let api = session.api();
    spawn_local(async move {
        match api.list_groups().await {
            Ok(list) => set_groups.set(list),
            Err(e) => toaster.api_error("Erro ao carregar grupos", &e),
        }
    });
}

#[component]
pub fn GroupsPage() -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();
    let state = session.session();

    let (groups, set_groups) = signal(Vec::<Group>::new());
    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());

    reload(session, toaster, set_groups);

    let my_id = move || state.with(|s| s.user.as_ref().map(|u| u.id.clone()));

    let on_create = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (n, d) = (name.get_untracked(), description.get_untracked());
        if n.trim().is_empty() {
            toaster.error("Informe o nome do grupo.");
            return;
        }
        let api = session.api();
        spawn_local(async move {
            match api.create_group(n.trim(), d.trim()).await {
                Ok(()) => {
                    toaster.success("Grupo criado com sucesso!");
                    name.set(String::new());
                    description.set(String::new());
                    reload(session, toaster, set_groups);
                }
                Err(e) => toaster.api_error("Erro ao criar grupo", &e),
            }
        });
    };

    let on_join = move |group_id: String| {
        let api = session.api();
        spawn_local(async move {
            match api.join_group(&group_id).await {
                Ok(()) => {
                    toaster.success("Solicitação enviada!");
                    reload(session, toaster, set_groups);
                }
                Err(e) => toaster.api_error("Erro ao solicitar entrada", &e),
            }
        });
    };

    let on_leave = move |group_id: String| {
        if !confirm("Deseja realmente sair deste grupo?") {
            return;
        }
        let api = session.api();
        spawn_local(async move {
            match api.leave_group(&group_id).await {
                Ok(()) => {
                    toaster.success("Você saiu do grupo.");
                    reload(session, toaster, set_groups);
                }
                Err(e) => toaster.api_error("Erro ao sair do grupo", &e),
            }
        });
    };

    let on_delete = move |group_id: String| {
        if !confirm("Tem certeza que deseja excluir este grupo?") {
            return;
        }
        let api = session.api();
        spawn_local(async move {
            match api.delete_group(&group_id).await {
                Ok(()) => {
                    toaster.success("Grupo excluído com sucesso!");
                    set_groups.update(|list| list.retain(|g| g.id != group_id));
                }
                Err(e) => toaster.api_error("Erro ao excluir grupo", &e),
            }
        });
    };

    let cards = move || {
        let me = my_id();
        let mut list = groups.get();
        if let Some(me) = &me {
            sort_joined_first(&mut list, me);
        }
        list.into_iter()
            .map(|group| {
                let actions = viewer_role(&group, me.as_deref())
                    .map(GroupActions::for_role)
                    .unwrap_or_default();
                let id = group.id.clone();
                view! {
                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h3 class="card-title">
                                {group.name}
                                {actions.badge.map(|b| view! { <span class="badge badge-info">{b}</span> })}
                            </h3>
                            <p class="text-base-content/70">{group.description}</p>
                            <div class="card-actions justify-end">
                                <Link to=AppRoute::GroupDetail(id.clone()) class="btn btn-sm btn-outline">"Ver grupo"</Link>
                                {actions.can_request.then(|| {
                                    let id = id.clone();
                                    view! { <button class="btn btn-sm btn-primary" on:click=move |_| on_join(id.clone())>"Solicitar entrada"</button> }
                                })}
                                {actions.can_leave.then(|| {
                                    let id = id.clone();
                                    view! { <button class="btn btn-sm btn-warning" on:click=move |_| on_leave(id.clone())>"Sair do grupo"</button> }
                                })}
                                {actions.can_delete.then(|| {
                                    let id = id.clone();
                                    view! { <button class="btn btn-sm btn-error" on:click=move |_| on_delete(id.clone())>"Excluir grupo"</button> }
                                })}
                            </div>
                        </div>
                    </div>
                }
            })
            .collect_view()
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="max-w-5xl mx-auto space-y-6">
                <form class="card bg-base-100 shadow-xl" on:submit=on_create>
                    <div class="card-body">
                        <h2 class="card-title">"Criar grupo"</h2>
                        <input
                            class="input input-bordered"
                            placeholder="Nome do grupo"
                            prop:value=move || name.get()
                            on:input=move |ev| name.set(event_target_value(&ev))
                        />
                        <textarea
                            class="textarea textarea-bordered"
                            placeholder="Descrição"
                            prop:value=move || description.get()
                            on:input=move |ev| description.set(event_target_value(&ev))
                        ></textarea>
                        <button class="btn btn-success">"Criar"</button>
                    </div>
                </form>

                <h2 class="text-xl font-semibold">"Grupos"</h2>
                <Show
                    when=move || !groups.with(Vec::is_empty)
                    fallback=|| view! { <p class="text-base-content/50">"Nenhum grupo encontrado."</p> }
                >
                    <div class="grid gap-4 md:grid-cols-2">{cards}</div>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_leave_and_delete() {
        let a = GroupActions::for_role(MembershipRole::Admin);
        assert_eq!(a.badge, Some("Administrador"));
        assert!(a.can_leave && a.can_delete && !a.can_request);
    }

    #[test]
    fn pending_user_waits() {
        let a = GroupActions::for_role(MembershipRole::Pending);
        assert_eq!(a.badge, Some("Solicitação pendente"));
        assert!(!a.can_request && !a.can_leave && !a.can_delete);
    }

    #[test]
    fn unresolved_viewer_gets_no_actions() {
        let group: Group = serde_json::from_value(serde_json::json!({
            "_id": "g1",
            "nome": "Madrugadores",
            "membros": ["u2"]
        }))
        .unwrap();
        assert_eq!(viewer_role(&group, None), None);
        assert_eq!(viewer_role(&group, Some("u2")), Some(MembershipRole::Member));
        let actions = viewer_role(&group, None).map(GroupActions::for_role).unwrap_or_default();
        assert!(!actions.can_request);
        assert_eq!(actions.badge, None);
    }

    #[test]
    fn outsider_may_only_request() {
        let a = GroupActions::for_role(MembershipRole::Outsider);
        assert_eq!(a.badge, None);
        assert!(a.can_request);
        assert!(!a.can_leave);
    }
}
