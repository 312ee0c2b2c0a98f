//! 群组活动日历
//!
//! 按日期列出群组活动；管理员可以创建与删除活动。

use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use corrida_shared::calendar::{events_on, format_day, format_timestamp, parse_day};
use corrida_shared::protocol::CreateEventRequest;
use corrida_shared::{EventKind, GroupEvent, RunningRoute};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::confirm;

const EVENT_KINDS: [EventKind; 3] = [EventKind::Treino, EventKind::Corrida, EventKind::Outro];

/// 新建活动表单的原始输入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    /// `datetime-local` 取值，如 `2025-03-02T06:30`
    pub start: String,
    pub end: String,
    pub location: String,
    pub kind: Option<EventKind>,
    /// 空串表示不关联路线
    pub route: String,
}

fn parse_local(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

fn to_timestamp(value: NaiveDateTime, offset: FixedOffset) -> Option<String> {
    offset.from_local_datetime(&value).single().map(|ts| ts.to_rfc3339())
}

impl EventDraft {
    /// 以所选日期的当前时刻预填开始时间
    pub fn starting_on(day: NaiveDate, now: NaiveDateTime) -> Self {
        Self {
            start: format!("{}T{}", day.format("%Y-%m-%d"), now.format("%H:%M")),
            ..Self::default()
        }
    }

    /// 校验并转换为请求；本地时间按 `offset` 换算为 RFC 3339。
    pub fn to_request(&self, group_id: &str, offset: FixedOffset) -> Result<CreateEventRequest, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Informe o título do evento.".into());
        }
        let kind = self.kind.ok_or("Selecione o tipo do evento.")?;
        let start = parse_local(&self.start).ok_or("Informe a data de início.")?;
        let end = match self.end.trim() {
            "" => None,
            raw => {
                let end = parse_local(raw).ok_or("Data de término inválida.")?;
                if end < start {
                    return Err("O término deve ser posterior ao início.".into());
                }
                Some(end)
            }
        };
        let invalid = || "Data inválida.".to_string();
        Ok(CreateEventRequest {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            start_date: to_timestamp(start, offset).ok_or_else(invalid)?,
            end_date: match end {
                Some(end) => Some(to_timestamp(end, offset).ok_or_else(invalid)?),
                None => None,
            },
            location: self.location.trim().to_string(),
            kind,
            linked_route: Some(self.route.clone()).filter(|r| !r.is_empty()),
            group_id: group_id.to_string(),
        })
    }
}

fn kind_from_value(value: &str) -> Option<EventKind> {
    EVENT_KINDS.into_iter().find(|k| kind_value(*k) == value)
}

fn kind_value(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Treino => "treino",
        EventKind::Corrida => "corrida",
        EventKind::Outro => "outro",
    }
}

#[component]
pub fn GroupCalendar(
    group_id: String,
    #[prop(into)] is_admin: Signal<bool>,
    routes: RwSignal<Vec<RunningRoute>>,
    /// 点击“Ver detalhes”时写入活动 ID
    selected_event: RwSignal<Option<String>>,
) -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();
    let group_id = StoredValue::new(group_id);

    let events = RwSignal::new(Vec::<GroupEvent>::new());
    let (day, set_day) = signal(Local::now().date_naive());
    let draft = RwSignal::new(Option::<EventDraft>::None);
    let (saving, set_saving) = signal(false);

    let reload = move || {
        let api = session.api();
        spawn_local(async move {
            match api.events_by_group(&group_id.get_value()).await {
                Ok(list) => events.set(list),
                Err(e) => {
                    events.set(Vec::new());
                    toaster.api_error("Erro ao carregar eventos", &e);
                }
            }
        });
    };
    reload();

    let edit = move |apply: fn(&mut EventDraft, String), value: String| {
        draft.update(|d| {
            if let Some(d) = d {
                apply(d, value);
            }
        });
    };

    let on_open = move |_| {
        draft.set(Some(EventDraft::starting_on(day.get_untracked(), Local::now().naive_local())));
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(current) = draft.get_untracked() else {
            return;
        };
        let req = match current.to_request(&group_id.get_value(), *Local::now().offset()) {
            Ok(req) => req,
            Err(msg) => {
                toaster.error(msg);
                return;
            }
        };
        set_saving.set(true);
        let api = session.api();
        spawn_local(async move {
            match api.create_event(req).await {
                Ok(()) => {
                    toaster.success("Evento criado com sucesso!");
                    draft.set(None);
                    reload();
                }
                Err(e) => toaster.api_error("Erro ao criar evento", &e),
            }
            set_saving.set(false);
        });
    };

    let on_delete = move |event_id: String| {
        if !confirm("Tem certeza que deseja excluir este evento?") {
            return;
        }
        let api = session.api();
        spawn_local(async move {
            match api.delete_event(&event_id).await {
                Ok(()) => {
                    toaster.success("Evento excluído!");
                    events.update(|list| list.retain(|e| e.id != event_id));
                    selected_event.update(|s| {
                        if s.as_deref() == Some(event_id.as_str()) {
                            *s = None;
                        }
                    });
                }
                Err(e) => toaster.api_error("Erro ao excluir evento", &e),
            }
        });
    };

    let day_events = move || {
        let selected = day.get();
        let list = events.with(|all| events_on(all, selected).into_iter().cloned().collect::<Vec<_>>());
        if list.is_empty() {
            return view! { <p class="text-base-content/50">"Nenhum evento neste dia."</p> }.into_any();
        }
        let admin = is_admin.get();
        view! {
            <ul class="space-y-2">
                {list.into_iter().map(|ev| {
                    let id = ev.id.clone();
                    let remove_id = ev.id.clone();
                    view! {
                        <li class="flex justify-between items-center border border-base-300 rounded-box p-3">
                            <div>
                                <p class="font-semibold">{ev.title}</p>
                                <p class="text-sm">{format_timestamp(&ev.start_date)}</p>
                                {ev.kind.map(|k| view! { <span class="badge badge-outline">{k.label()}</span> })}
                            </div>
                            <div class="flex gap-2">
                                <button class="btn btn-sm btn-outline" on:click=move |_| selected_event.set(Some(id.clone()))>
                                    "Ver detalhes"
                                </button>
                                {admin.then(|| view! {
                                    <button class="btn btn-sm btn-error" on:click=move |_| on_delete(remove_id.clone())>"Excluir"</button>
                                })}
                            </div>
                        </li>
                    }
                }).collect_view()}
            </ul>
        }
        .into_any()
    };

    let field = move |read: fn(&EventDraft) -> String| move || draft.with(|d| d.as_ref().map(read).unwrap_or_default());

    let form = move || {
        draft.with(Option::is_some).then(|| view! {
            <form class="flex flex-col gap-3 border border-base-300 rounded-box p-4" on:submit=on_submit>
                <h4 class="font-semibold">"Novo evento"</h4>
                <select
                    class="select select-bordered"
                    on:change=move |ev| {
                        let kind = kind_from_value(&event_target_value(&ev));
                        draft.update(|d| if let Some(d) = d { d.kind = kind; });
                    }
                >
                    <option value="" selected=true>"Selecione o tipo"</option>
                    {EVENT_KINDS.into_iter().map(|k| view! { <option value=kind_value(k)>{k.label()}</option> }).collect_view()}
                </select>
                <select
                    class="select select-bordered"
                    on:change=move |ev| edit(|d, v| d.route = v, event_target_value(&ev))
                >
                    <option value="" selected=true>"Nenhuma rota"</option>
                    {move || routes.get().into_iter().map(|r| view! { <option value=r.id>{r.name}</option> }).collect_view()}
                </select>
                <input
                    class="input input-bordered"
                    placeholder="Título"
                    prop:value=field(|d| d.title.clone())
                    on:input=move |ev| edit(|d, v| d.title = v, event_target_value(&ev))
                />
                <textarea
                    class="textarea textarea-bordered"
                    placeholder="Descrição"
                    prop:value=field(|d| d.description.clone())
                    on:input=move |ev| edit(|d, v| d.description = v, event_target_value(&ev))
                ></textarea>
                <label class="text-sm">"Início"</label>
                <input
                    type="datetime-local"
                    class="input input-bordered"
                    prop:value=field(|d| d.start.clone())
                    on:input=move |ev| edit(|d, v| d.start = v, event_target_value(&ev))
                />
                <label class="text-sm">"Fim (opcional)"</label>
                <input
                    type="datetime-local"
                    class="input input-bordered"
                    prop:value=field(|d| d.end.clone())
                    on:input=move |ev| edit(|d, v| d.end = v, event_target_value(&ev))
                />
                <input
                    class="input input-bordered"
                    placeholder="Local"
                    prop:value=field(|d| d.location.clone())
                    on:input=move |ev| edit(|d, v| d.location = v, event_target_value(&ev))
                />
                <div class="flex gap-2 justify-end">
                    <button type="button" class="btn btn-ghost" on:click=move |_| draft.set(None)>"Cancelar"</button>
                    <button class="btn btn-success" disabled=move || saving.get()>"Criar evento"</button>
                </div>
            </form>
        })
    };

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body space-y-3">
                <h3 class="card-title">"Calendário de eventos do grupo"</h3>
                <div class="flex flex-wrap gap-2 items-center">
                    <input
                        type="date"
                        class="input input-bordered"
                        prop:value=move || day.get().format("%Y-%m-%d").to_string()
                        on:change=move |ev| {
                            if let Some(d) = parse_day(&event_target_value(&ev)) {
                                set_day.set(d);
                            }
                        }
                    />
                    <Show when=move || is_admin.get() && draft.with(Option::is_none)>
                        <button class="btn btn-primary" on:click=on_open>"Adicionar evento"</button>
                    </Show>
                </div>
                {form}
                <h4 class="font-semibold">"Eventos em " {move || format_day(day.get())}</h4>
                {day_events}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_minus_3() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn filled() -> EventDraft {
        EventDraft {
            title: " Longão de domingo ".into(),
            description: "Ritmo leve".into(),
            start: "2025-03-02T06:30".into(),
            end: String::new(),
            location: "Parque Ibirapuera".into(),
            kind: Some(EventKind::Treino),
            route: String::new(),
        }
    }

    #[test]
    fn draft_becomes_request_in_local_offset() {
        let req = filled().to_request("g1", utc_minus_3()).unwrap();
        assert_eq!(req.title, "Longão de domingo");
        assert_eq!(req.start_date, "2025-03-02T06:30:00-03:00");
        assert_eq!(req.end_date, None);
        assert_eq!(req.linked_route, None);
        assert_eq!(req.group_id, "g1");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["tipo"], "treino");
        assert_eq!(body["group"], "g1");
        assert!(body.get("rotaAssociada").is_none());
    }

    #[test]
    fn selected_route_is_linked() {
        let draft = EventDraft { route: "r9".into(), end: "2025-03-02T08:00".into(), ..filled() };
        let req = draft.to_request("g1", utc_minus_3()).unwrap();
        assert_eq!(req.linked_route.as_deref(), Some("r9"));
        assert_eq!(req.end_date.as_deref(), Some("2025-03-02T08:00:00-03:00"));
    }

    #[test]
    fn incomplete_drafts_are_rejected() {
        let off = utc_minus_3();
        assert!(EventDraft { title: "  ".into(), ..filled() }.to_request("g1", off).is_err());
        assert!(EventDraft { kind: None, ..filled() }.to_request("g1", off).is_err());
        assert!(EventDraft { start: String::new(), ..filled() }.to_request("g1", off).is_err());
        assert_eq!(
            EventDraft { end: "2025-03-02T05:00".into(), ..filled() }.to_request("g1", off).unwrap_err(),
            "O término deve ser posterior ao início."
        );
    }

    #[test]
    fn new_draft_starts_on_selected_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(EventDraft::starting_on(day, now).start, "2025-03-02T07:05");
    }

    #[test]
    fn kind_select_values_match_wire_names() {
        for kind in EVENT_KINDS {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind_value(kind));
            assert_eq!(kind_from_value(kind_value(kind)), Some(kind));
        }
        assert_eq!(kind_from_value(""), None);
    }
}
