use std::collections::HashMap;

use corrida_shared::calendar::format_timestamp;
use corrida_shared::format::{format_elapsed, format_pace, rating_stars};
use corrida_shared::protocol::CreateAccomplishmentRequest;
use corrida_shared::{Accomplishment, RunningRoute};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::Link;

const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccomplishmentForm {
    pub date: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub rating: u8,
    pub comment: String,
}

/// 空白或无法解析的数值按 0 处理
fn lenient_count(input: &str) -> u32 {
    input.trim().parse().unwrap_or(0)
}

impl AccomplishmentForm {
    pub fn to_request(&self, route_id: &str) -> Result<CreateAccomplishmentRequest, String> {
        if self.date.trim().is_empty() {
            return Err("Informe a data.".into());
        }
        let (hours, minutes, seconds) = (
            lenient_count(&self.hours),
            lenient_count(&self.minutes),
            lenient_count(&self.seconds),
        );
        if minutes > 59 || seconds > 59 {
            return Err("Minutos e segundos vão até 59.".into());
        }
        if [hours, minutes, seconds].iter().all(|v| *v == 0) {
            return Err("Informe o tempo da realização.".into());
        }
        if self.comment.trim().is_empty() {
            return Err("Deixe um comentário.".into());
        }
        Ok(CreateAccomplishmentRequest {
            route_id: route_id.to_string(),
            date: self.date.trim().to_string(),
            hours,
            minutes,
            seconds,
            rating: self.rating.min(MAX_RATING),
            comment: self.comment.trim().to_string(),
        })
    }
}

#[component]
fn StarPicker(form: RwSignal<AccomplishmentForm>) -> impl IntoView {
    (1..=MAX_RATING)
        .map(|i| {
            let class = move || {
                if form.with(|f| f.rating >= i) {
                    "text-2xl cursor-pointer text-warning"
                } else {
                    "text-2xl cursor-pointer text-base-300"
                }
            };
            view! { <span class=class on:click=move |_| form.update(|f| f.rating = i)>"★"</span> }
        })
        .collect_view()
}

#[component]
pub fn RouteViewPage(route_id: String) -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();
    let route_id = StoredValue::new(route_id);

    let route = RwSignal::new(Option::<RunningRoute>::None);
    let accomplishments = RwSignal::new(Vec::<Accomplishment>::new());
    let names = RwSignal::new(HashMap::<String, String>::new());
    let form = RwSignal::new(AccomplishmentForm::default());
    let (saving, set_saving) = signal(false);

    let fetch_accomplishments = move || {
        let api = session.api();
        spawn_local(async move {
            match api.accomplishments_by_route(&route_id.get_value()).await {
                Ok(list) => accomplishments.set(list),
                Err(e) => log::warn!("Failed to load accomplishments: {}", e),
            }
        });
    };

    let api = session.api();
    spawn_local(async move {
        match api.get_route(&route_id.get_value()).await {
            Ok(r) => {
                match api.users_by_group(&r.group_id).await {
                    Ok(users) => names.set(users.into_iter().map(|u| (u.id, u.name)).collect()),
                    Err(e) => log::warn!("Failed to load route group members: {}", e),
                }
                route.set(Some(r));
                fetch_accomplishments();
            }
            Err(e) => toaster.api_error("Erro ao carregar rota", &e),
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = match form.with_untracked(|f| f.to_request(&route_id.get_value())) {
            Ok(req) => req,
            Err(msg) => {
                toaster.error(msg);
                return;
            }
        };
        set_saving.set(true);
        let api = session.api();
        spawn_local(async move {
            match api.create_accomplishment(req).await {
                Ok(()) => {
                    toaster.success("Realização registrada com sucesso.");
                    form.set(AccomplishmentForm::default());
                    fetch_accomplishments();
                }
                Err(e) => toaster.api_error("Erro ao registrar realização", &e),
            }
            set_saving.set(false);
        });
    };

    let details = move || {
        route.get().map(|r| {
            view! {
                <Link to=AppRoute::GroupDetail(r.group_id.clone()) class="btn btn-outline btn-sm">"← Voltar para o grupo"</Link>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title text-2xl">{r.name}</h2>
                        <p>{format!("Distância: {:.2} km", r.distance_km)}</p>
                        <p><strong>"Início: "</strong> {r.start_label}</p>
                        <p><strong>"Fim: "</strong> {r.end_label}</p>
                        {(!r.description.is_empty()).then(|| view! { <p>{r.description}</p> })}
                    </div>
                </div>
            }
        })
    };

    let history = move || {
        let list = accomplishments.get();
        if list.is_empty() {
            return view! { <p class="text-base-content/50">"Nenhuma realização ainda."</p> }.into_any();
        }
        view! {
            <ul class="space-y-3">
                {list.into_iter().map(|a| {
                    let who = names.with(|n| n.get(&a.user_id).cloned().unwrap_or_else(|| "Corredor".to_string()));
                    let pace = a.average_pace.and_then(format_pace).unwrap_or_else(|| "Inválido".to_string());
                    view! {
                        <li class="border border-base-300 rounded-box p-3">
                            <p class="font-semibold">{who} " · " {format_timestamp(&a.date)}</p>
                            <p>"Tempo: " {format_elapsed(&a.time)} " · Ritmo: " {pace}</p>
                            <p class="text-warning">{rating_stars(a.rating)}</p>
                            <p class="text-sm">{a.comment}</p>
                        </li>
                    }
                }).collect_view()}
            </ul>
        }
        .into_any()
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="max-w-3xl mx-auto space-y-4">
                <Show
                    when=move || route.with(Option::is_some)
                    fallback=|| view! { <p class="text-center mt-8">"Carregando rota..."</p> }
                >
                    {details}
                    <form class="card bg-base-100 shadow" on:submit=on_submit>
                        <div class="card-body space-y-2">
                            <h3 class="card-title">"Registrar realização"</h3>
                            <input
                                type="date"
                                class="input input-bordered"
                                prop:value=move || form.with(|f| f.date.clone())
                                on:input=move |ev| form.update(|f| f.date = event_target_value(&ev))
                            />
                            <div class="flex gap-2">
                                <input type="number" min="0" placeholder="Horas" class="input input-bordered w-1/3"
                                    prop:value=move || form.with(|f| f.hours.clone())
                                    on:input=move |ev| form.update(|f| f.hours = event_target_value(&ev)) />
                                <input type="number" min="0" max="59" placeholder="Minutos" class="input input-bordered w-1/3"
                                    prop:value=move || form.with(|f| f.minutes.clone())
                                    on:input=move |ev| form.update(|f| f.minutes = event_target_value(&ev)) />
                                <input type="number" min="0" max="59" placeholder="Segundos" class="input input-bordered w-1/3"
                                    prop:value=move || form.with(|f| f.seconds.clone())
                                    on:input=move |ev| form.update(|f| f.seconds = event_target_value(&ev)) />
                            </div>
                            <div class="flex gap-1 items-center">
                                <span class="label-text mr-2">"Avaliação:"</span>
                                <StarPicker form=form />
                            </div>
                            <textarea
                                class="textarea textarea-bordered"
                                rows="4"
                                placeholder="Comentário"
                                prop:value=move || form.with(|f| f.comment.clone())
                                on:input=move |ev| form.update(|f| f.comment = event_target_value(&ev))
                            ></textarea>
                            <button class="btn btn-success" disabled=move || saving.get()>"Registrar"</button>
                        </div>
                    </form>
                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <h3 class="card-title">"Realizações"</h3>
                            {history}
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AccomplishmentForm {
        AccomplishmentForm {
            date: "2025-03-02".into(),
            minutes: "25".into(),
            seconds: "10".into(),
            rating: 4,
            comment: "Subida puxada".into(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_hours_count_as_zero() {
        let req = form().to_request("r1").unwrap();
        assert_eq!((req.hours, req.minutes, req.seconds), (0, 25, 10));
        assert_eq!(req.route_id, "r1");
        assert_eq!(req.rating, 4);
    }

    #[test]
    fn rejects_out_of_range_and_empty_time() {
        let mut f = form();
        f.seconds = "75".into();
        assert!(f.to_request("r1").is_err());

        let mut f = form();
        f.minutes.clear();
        f.seconds.clear();
        assert_eq!(f.to_request("r1").unwrap_err(), "Informe o tempo da realização.");
    }

    #[test]
    fn comment_is_required() {
        let mut f = form();
        f.comment = "  ".into();
        assert_eq!(f.to_request("r1").unwrap_err(), "Deixe um comentário.");
    }
}
