use corrida_shared::calendar::format_timestamp;
use corrida_shared::format::{format_pace, initial, resolve_avatar};
use corrida_shared::{Activity, UserProfile};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::confirm;
use crate::web::route::AppRoute;
use crate::web::router::Link;

fn activity_pace(activity: &Activity) -> String {
    activity
        .average_pace
        .or_else(|| {
            (activity.distance_km > 0.0).then(|| activity.duration_minutes / activity.distance_km)
        })
        .and_then(format_pace)
        .unwrap_or_else(|| "--".to_string())
}

/// 个人资料与活动记录；`user_id` 为 `None` 时展示当前登录用户
#[component]
pub fn ProfilePage(user_id: Option<String>) -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();
    let state = session.session();

    let (profile, set_profile) = signal(Option::<UserProfile>::None);
    let (activities, set_activities) = signal(Vec::<Activity>::new());

    let api = session.api();
    spawn_local(async move {
        let user = match &user_id {
            Some(id) => api.get_user(id).await,
            None => api.current_user().await,
        };
        match user {
            Ok(user) => {
                match api.activities_by_user(&user.id).await {
                    Ok(list) => set_activities.set(list),
                    Err(e) => toaster.api_error("Erro ao carregar atividades", &e),
                }
                set_profile.set(Some(user));
            }
            Err(e) => toaster.api_error("Erro ao carregar perfil", &e),
        }
    });

    let is_own = move || {
        let shown = profile.with(|p| p.as_ref().map(|p| p.id.clone()));
        let mine = state.with(|s| s.user.as_ref().map(|u| u.id.clone()));
        shown.is_some() && shown == mine
    };

    let handle_delete = move |id: String| {
        if !confirm("Tem certeza que deseja excluir esta atividade?") {
            return;
        }
        let api = session.api();
        spawn_local(async move {
            match api.delete_activity(&id).await {
                Ok(()) => {
                    toaster.success("Atividade excluída com sucesso!");
                    set_activities.update(|list| list.retain(|a| a.id != id));
                }
                Err(e) => toaster.api_error("Erro ao excluir a atividade", &e),
            }
        });
    };

    let header = move || {
        profile.get().map(|p| {
            let avatar = resolve_avatar(&p.avatar).to_string();
            let details = [
                p.age.map(|a| format!("{} anos", a)),
                p.experience_level.clone(),
                p.running_style.clone(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");
            view! {
                <div class="flex flex-col items-center mb-8 gap-2">
                    <div class="avatar placeholder">
                        <div class="w-28 rounded-full ring ring-success">
                            <img src=avatar alt=initial(&p.name) />
                        </div>
                    </div>
                    <h1 class="text-3xl font-bold">{p.name.clone()}</h1>
                    <p class="text-base-content/70">{details}</p>
                </div>
            }
        })
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="max-w-5xl mx-auto">
                <Show
                    when=move || profile.with(Option::is_some)
                    fallback=|| view! { <p class="text-center mt-8">"Carregando perfil..."</p> }
                >
                    {header}
                    <div class="flex justify-between items-center mb-4">
                        <h2 class="text-xl font-semibold">"Atividades"</h2>
                        <Show when=is_own>
                            <Link to=AppRoute::NewActivity class="btn btn-success btn-sm">"Nova atividade"</Link>
                        </Show>
                    </div>
                    <Show
                        when=move || !activities.with(Vec::is_empty)
                        fallback=|| view! { <p class="text-base-content/50">"Nenhuma atividade registrada."</p> }
                    >
                        <div class="grid gap-4 md:grid-cols-2">
                            <For
                                each=move || activities.get()
                                key=|a| a.id.clone()
                                children=move |activity: Activity| {
                                    let id = activity.id.clone();
                                    view! {
                                        <div class="card bg-base-100 shadow">
                                            <div class="card-body">
                                                <h3 class="card-title">{format_timestamp(&activity.date)}</h3>
                                                <p>{format!("{:.2} km em {:.0} min", activity.distance_km, activity.duration_minutes)}</p>
                                                <p>"Ritmo: " {activity_pace(&activity)}</p>
                                                {activity.calories.map(|c| view! { <p>{format!("{:.0} kcal", c)}</p> })}
                                                {activity.start_label.clone().zip(activity.end_label.clone()).map(|(from, to)| {
                                                    view! { <p class="text-sm text-base-content/70">{from} " → " {to}</p> }
                                                })}
                                                <Show when=is_own>
                                                    <div class="card-actions justify-end">
                                                        <button
                                                            class="btn btn-error btn-outline btn-sm"
                                                            on:click={
                                                                let id = id.clone();
                                                                move |_| handle_delete(id.clone())
                                                            }
                                                        >
                                                            "Excluir"
                                                        </button>
                                                    </div>
                                                </Show>
                                            </div>
                                        </div>
                                    }
                                }
                            />
                        </div>
                    </Show>
                </Show>
            </div>
        </div>
    }
}
