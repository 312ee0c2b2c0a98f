use corrida_shared::LatLng;
use corrida_shared::format::{parse_decimal, total_minutes};
use corrida_shared::protocol::CreateActivityRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 表单原始输入，保持用户键入的内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityForm {
    pub distance: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub date: String,
    pub start_label: String,
    pub end_label: String,
    pub start: String,
    pub end: String,
}

/// 解析 `"lat, lng"`
pub fn parse_lat_lng(input: &str) -> Option<LatLng> {
    let (lat, lng) = input.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some(LatLng { lat, lng })
}

fn parse_count(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Some(0);
    }
    input.parse().ok()
}

impl ActivityForm {
    /// `route` 为后端计算出的路线估算（若有），用于填充路径与起终点名称。
    pub fn to_request(&self, route: Option<&[LatLng]>) -> Result<CreateActivityRequest, String> {
        let distance_km = parse_decimal(&self.distance)
            .filter(|d| *d > 0.0)
            .ok_or("Informe a distância em km.")?;
        let (Some(h), Some(m), Some(s)) = (
            parse_count(&self.hours),
            parse_count(&self.minutes),
            parse_count(&self.seconds),
        ) else {
            return Err("Tempo inválido.".into());
        };
        let duration_minutes = total_minutes(h, m, s);
        if duration_minutes <= 0.0 {
            return Err("Informe o tempo total.".into());
        }
        if self.date.trim().is_empty() {
            return Err("Informe a data.".into());
        }

        let label = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let coordinates = route.filter(|c| !c.is_empty()).map(<[LatLng]>::to_vec);

        Ok(CreateActivityRequest {
            distance_km,
            duration_minutes,
            date: self.date.trim().to_string(),
            start_label: coordinates.as_ref().and_then(|_| label(&self.start_label)),
            end_label: coordinates.as_ref().and_then(|_| label(&self.end_label)),
            coordinates,
        })
    }
}

#[component]
pub fn NewActivityPage() -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let toaster = use_toaster();

    let form = RwSignal::new(ActivityForm::default());
    let route = RwSignal::new(Option::<Vec<LatLng>>::None);
    let (calculating, set_calculating) = signal(false);

    let on_calculate = move |_| {
        let (start, end) = form.with_untracked(|f| (parse_lat_lng(&f.start), parse_lat_lng(&f.end)));
        let (Some(start), Some(end)) = (start, end) else {
            toaster.error("Informe início e fim como \"lat, lng\" antes de calcular a rota.");
            return;
        };
        set_calculating.set(true);
        let api = session.api();
        spawn_local(async move {
            match api.calculate_route(start, end).await {
                Ok(estimate) => {
                    form.update(|f| f.distance = format!("{:.2}", estimate.distance_km));
                    route.set(Some(estimate.coordinates));
                    toaster.success("Rota calculada!");
                }
                Err(e) => toaster.api_error("Erro ao calcular a rota", &e),
            }
            set_calculating.set(false);
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = route.with_untracked(|r| form.with_untracked(|f| f.to_request(r.as_deref())));
        let req = match req {
            Ok(req) => req,
            Err(msg) => {
                toaster.error(msg);
                return;
            }
        };
        let api = session.api();
        spawn_local(async move {
            match api.create_activity(req).await {
                Ok(()) => {
                    toaster.success("Atividade criada com sucesso!");
                    router.navigate_route(AppRoute::MyProfile);
                }
                Err(e) => toaster.api_error("Erro ao criar atividade", &e),
            }
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="card max-w-2xl mx-auto bg-base-100 shadow-xl">
                <form class="card-body space-y-2" on:submit=on_submit>
                    <h2 class="card-title text-2xl">"Nova atividade"</h2>

                    <div class="form-control">
                        <label class="label"><span class="label-text">"Data"</span></label>
                        <input type="date" class="input input-bordered" on:input=move |ev| form.update(|f| f.date = event_target_value(&ev)) />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Distância (km)"</span></label>
                        <input
                            class="input input-bordered"
                            placeholder="5,2"
                            prop:value=move || form.with(|f| f.distance.clone())
                            on:input=move |ev| form.update(|f| f.distance = event_target_value(&ev))
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Tempo total"</span></label>
                        <div class="flex gap-2">
                            <input type="number" min="0" placeholder="Horas" class="input input-bordered w-1/3" on:input=move |ev| form.update(|f| f.hours = event_target_value(&ev)) />
                            <input type="number" min="0" placeholder="Minutos" class="input input-bordered w-1/3" on:input=move |ev| form.update(|f| f.minutes = event_target_value(&ev)) />
                            <input type="number" min="0" placeholder="Segundos" class="input input-bordered w-1/3" on:input=move |ev| form.update(|f| f.seconds = event_target_value(&ev)) />
                        </div>
                    </div>

                    <div class="divider">"Percurso (opcional)"</div>
                    <div class="grid md:grid-cols-2 gap-2">
                        <input class="input input-bordered" placeholder="Ponto de início" on:input=move |ev| form.update(|f| f.start_label = event_target_value(&ev)) />
                        <input class="input input-bordered" placeholder="Ponto final" on:input=move |ev| form.update(|f| f.end_label = event_target_value(&ev)) />
                        <input class="input input-bordered" placeholder="-23.55, -46.63" on:input=move |ev| form.update(|f| f.start = event_target_value(&ev)) />
                        <input class="input input-bordered" placeholder="-23.56, -46.65" on:input=move |ev| form.update(|f| f.end = event_target_value(&ev)) />
                    </div>
                    <button type="button" class="btn btn-outline" on:click=on_calculate disabled=move || calculating.get()>
                        "Calcular rota"
                    </button>
                    {move || route.with(|r| r.as_ref().map(|c| {
                        view! { <p class="text-sm text-success">{format!("Rota com {} pontos", c.len())}</p> }
                    }))}

                    <button class="btn btn-primary mt-4">"Salvar atividade"</button>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ActivityForm {
        ActivityForm {
            distance: "5,2".into(),
            minutes: "28".into(),
            seconds: "30".into(),
            date: "2025-03-02".into(),
            start_label: "Parque".into(),
            end_label: "Praia".into(),
            ..Default::default()
        }
    }

    #[test]
    fn manual_entry_has_no_route_fields() {
        let req = form().to_request(None).unwrap();
        assert_eq!(req.distance_km, 5.2);
        assert_eq!(req.duration_minutes, 28.5);
        assert_eq!(req.start_label, None);
        assert_eq!(req.coordinates, None);
    }

    #[test]
    fn calculated_route_is_attached() {
        let path = [LatLng { lat: -23.5, lng: -46.6 }, LatLng { lat: -23.6, lng: -46.7 }];
        let req = form().to_request(Some(&path)).unwrap();
        assert_eq!(req.coordinates.as_deref(), Some(&path[..]));
        assert_eq!(req.start_label.as_deref(), Some("Parque"));
    }

    #[test]
    fn validation_messages() {
        let mut f = form();
        f.distance = "abc".into();
        assert_eq!(f.to_request(None).unwrap_err(), "Informe a distância em km.");

        let mut f = form();
        f.minutes.clear();
        f.seconds.clear();
        assert_eq!(f.to_request(None).unwrap_err(), "Informe o tempo total.");

        let mut f = form();
        f.hours = "uma".into();
        assert_eq!(f.to_request(None).unwrap_err(), "Tempo inválido.");
    }

    #[test]
    fn lat_lng_parsing() {
        assert_eq!(
            parse_lat_lng(" -23.55 , -46.63 "),
            Some(LatLng { lat: -23.55, lng: -46.63 })
        );
        assert_eq!(parse_lat_lng("91, 0"), None);
        assert_eq!(parse_lat_lng("-23.55"), None);
    }
}
