use corrida_shared::protocol::CreateRouteRequest;
use corrida_shared::{LatLng, RouteEstimate};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::new_activity::parse_lat_lng;
use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

const EARTH_RADIUS_KM: f64 = 6371.0;
const DEFAULT_START_LABEL: &str = "Início da rota";
const DEFAULT_END_LABEL: &str = "Fim da rota";

/// 两点间的大圆距离
pub fn straight_line_km(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDraft {
    pub name: String,
    pub description: String,
    pub start_label: String,
    pub end_label: String,
    pub start: String,
    pub end: String,
}

fn label_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() { fallback.to_string() } else { value.to_string() }
}

impl RouteDraft {
    /// 没有后端估算时，路线取两点间的直线段
    pub fn to_request(
        &self,
        group_id: &str,
        estimate: Option<&RouteEstimate>,
    ) -> Result<CreateRouteRequest, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Informe o nome da rota.".into());
        }
        let (Some(start), Some(end)) = (parse_lat_lng(&self.start), parse_lat_lng(&self.end)) else {
            return Err("Informe partida e chegada como \"lat, lng\".".into());
        };

        let (distance_km, coordinates) = match estimate {
            Some(e) if !e.coordinates.is_empty() => (e.distance_km, e.coordinates.clone()),
            _ => (straight_line_km(start, end), vec![start, end]),
        };

        Ok(CreateRouteRequest {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            group_id: group_id.to_string(),
            start_label: label_or(&self.start_label, DEFAULT_START_LABEL),
            end_label: label_or(&self.end_label, DEFAULT_END_LABEL),
            distance_km,
            coordinates,
        })
    }
}

#[component]
pub fn NewRoutePage(group_id: String) -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let toaster = use_toaster();
    let group_id = StoredValue::new(group_id);

    let draft = RwSignal::new(RouteDraft::default());
    let estimate = RwSignal::new(Option::<RouteEstimate>::None);
    let (busy, set_busy) = signal(false);

    let on_calculate = move |_| {
        let points = draft.with_untracked(|d| (parse_lat_lng(&d.start), parse_lat_lng(&d.end)));
        let (Some(start), Some(end)) = points else {
            toaster.error("Informe partida e chegada como \"lat, lng\".");
            return;
        };
        set_busy.set(true);
        let api = session.api();
        spawn_local(async move {
            match api.calculate_route(start, end).await {
                Ok(e) => estimate.set(Some(e)),
                Err(e) => toaster.api_error("Erro ao calcular a rota", &e),
            }
            set_busy.set(false);
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let id = group_id.get_value();
        let req = match estimate.with_untracked(|e| draft.with_untracked(|d| d.to_request(&id, e.as_ref()))) {
            Ok(req) => req,
            Err(msg) => {
                toaster.error(msg);
                return;
            }
        };
        let api = session.api();
        spawn_local(async move {
            match api.create_route(req).await {
                Ok(()) => {
                    toaster.success("Rota criada com sucesso.");
                    router.navigate_route(AppRoute::GroupDetail(id));
                }
                Err(e) => toaster.api_error("Falha ao criar a rota", &e),
            }
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="max-w-2xl mx-auto space-y-4">
                <Link to=AppRoute::GroupDetail(group_id.get_value()) class="btn btn-outline btn-sm">"← Voltar para o grupo"</Link>
                <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
                    <div class="card-body space-y-2">
                        <h2 class="card-title text-2xl">"Nova Rota"</h2>
                        <input class="input input-bordered" placeholder="Nome da rota" on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev)) />
                        <textarea class="textarea textarea-bordered" placeholder="Descrição" on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))></textarea>
                        <div class="grid md:grid-cols-2 gap-2">
                            <input class="input input-bordered" placeholder="Ponto de partida" on:input=move |ev| draft.update(|d| d.start_label = event_target_value(&ev)) />
                            <input class="input input-bordered" placeholder="Ponto de chegada" on:input=move |ev| draft.update(|d| d.end_label = event_target_value(&ev)) />
                            <input class="input input-bordered" placeholder="-23.55, -46.63" on:input=move |ev| draft.update(|d| d.start = event_target_value(&ev)) />
                            <input class="input input-bordered" placeholder="-23.56, -46.65" on:input=move |ev| draft.update(|d| d.end = event_target_value(&ev)) />
                        </div>
                        <button type="button" class="btn btn-outline" on:click=on_calculate disabled=move || busy.get()>
                            "Calcular rota"
                        </button>
                        {move || estimate.with(|e| e.as_ref().map(|e| view! {
                            <p class="text-sm text-success">{format!("Distância: {:.2} km", e.distance_km)}</p>
                        }))}
                        <button class="btn btn-success mt-2">"Criar rota"</button>
                    </div>
                </form>
            </div>
        </div>
    }
}
