use chrono::{Local, NaiveDate};
use corrida_shared::PublicRun;
use corrida_shared::calendar::{format_day, parse_day, race_days, runs_on};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;

/// 公开赛事日历，访客可见
#[component]
pub fn CalendarPage() -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();

    let (runs, set_runs) = signal(Vec::<PublicRun>::new());
    let (selected, set_selected) = signal(Local::now().date_naive());

    let api = session.api();
    spawn_local(async move {
        match api.public_runs().await {
            Ok(list) => set_runs.set(list),
            Err(e) => toaster.api_error("Erro ao carregar corridas", &e),
        }
    });

    let day_runs = move || {
        let day = selected.get();
        runs.with(|all| runs_on(all, day).into_iter().cloned().collect::<Vec<_>>())
    };

    let highlighted = move || {
        runs.with(|all| race_days(all))
            .into_iter()
            .map(|day: NaiveDate| {
                let class = move || {
                    if selected.get() == day {
                        "badge badge-success cursor-pointer"
                    } else {
                        "badge badge-outline cursor-pointer"
                    }
                };
                view! {
                    <span class=class on:click=move |_| set_selected.set(day)>{format_day(day)}</span>
                }
            })
            .collect_view()
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="max-w-5xl mx-auto space-y-6">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body items-center">
                        <h2 class="card-title">"Calendário de Corridas"</h2>
                        <input
                            type="date"
                            class="input input-bordered"
                            prop:value=move || selected.get().format("%Y-%m-%d").to_string()
                            on:change=move |ev| {
                                if let Some(day) = parse_day(&event_target_value(&ev)) {
                                    set_selected.set(day);
                                }
                            }
                        />
                        <div class="flex flex-wrap gap-2 justify-center mt-2">{highlighted}</div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Corridas em " {move || format_day(selected.get())}</h3>
                        {move || {
                            let list = day_runs();
                            if list.is_empty() {
                                view! { <p class="text-base-content/50">"Nenhuma corrida cadastrada para este dia."</p> }.into_any()
                            } else {
                                view! {
                                    <ul class="space-y-4">
                                        {list.into_iter().map(|run| view! {
                                            <li class="border border-base-300 p-4 rounded-box">
                                                <p class="font-bold text-lg">{run.name}</p>
                                                <p class="text-sm text-base-content/70">{run.location}</p>
                                                <div class="flex items-center gap-2 mt-2">
                                                    <span class="badge badge-outline">"Evento Oficial"</span>
                                                    <a href=run.link target="_blank" rel="noopener noreferrer" class="link link-primary text-sm">
                                                        "Link de inscrição"
                                                    </a>
                                                </div>
                                            </li>
                                        }).collect_view()}
                                    </ul>
                                }.into_any()
                            }
                        }}
                    </div>
                </div>
            </div>
        </div>
    }
}
