use corrida_shared::protocol::UpdateUserRequest;
use corrida_shared::{AVATAR_CHOICES, UserProfile};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::{Toaster, use_toaster};
use crate::session::{SessionStore, use_session};
use crate::web::route::AppRoute;
use crate::web::router::{RouterService, use_router};

pub const EXPERIENCE_LEVELS: [(&str, &str); 3] = [
    ("iniciante", "Iniciante"),
    ("intermediário", "Intermediário"),
    ("avançado", "Avançado"),
];

pub const RUNNING_STYLES: [(&str, &str); 3] = [("pista", "Pista"), ("trilha", "Trilha"), ("rua", "Rua")];

const MIN_AGE: u32 = 10;

/// 注册、补全资料与编辑资料共用的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub age: String,
    pub avatar: String,
    pub experience_level: String,
    pub running_style: String,
}

impl ProfileDraft {
    pub fn from_user(user: &UserProfile) -> Self {
        Self {
            name: user.name.clone(),
            age: user.age.map(|a| a.to_string()).unwrap_or_default(),
            avatar: user.avatar.clone(),
            experience_level: user.experience_level.clone().unwrap_or_default(),
            running_style: user.running_style.clone().unwrap_or_default(),
        }
    }

    /// 返回发现的第一个问题，措辞面向用户
    pub fn validate(&self) -> Result<UpdateUserRequest, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Nome é obrigatório.".into());
        }
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| *age >= MIN_AGE)
            .ok_or_else(|| format!("Idade deve ser um número a partir de {}.", MIN_AGE))?;
        if !AVATAR_CHOICES.contains(&self.avatar.as_str()) {
            return Err("Selecione uma imagem de perfil.".into());
        }
        if !EXPERIENCE_LEVELS.iter().any(|(v, _)| *v == self.experience_level) {
            return Err("Selecione o nível de experiência.".into());
        }
        if !RUNNING_STYLES.iter().any(|(v, _)| *v == self.running_style) {
            return Err("Selecione o estilo de corrida.".into());
        }

        Ok(UpdateUserRequest {
            name: name.to_string(),
            age,
            avatar: self.avatar.clone(),
            experience_level: self.experience_level.clone(),
            running_style: self.running_style.clone(),
        })
    }
}

// ============================================================================
// 表单组件
// ============================================================================

#[component]
pub fn AvatarPicker(draft: RwSignal<ProfileDraft>) -> impl IntoView {
    let avatars = AVATAR_CHOICES
        .iter()
        .map(|url| {
            let url: &'static str = url;
            let class = move || {
                if draft.with(|d| d.avatar == url) {
                    "w-16 h-16 rounded-full cursor-pointer ring-4 ring-success"
                } else {
                    "w-16 h-16 rounded-full cursor-pointer opacity-70 hover:opacity-100"
                }
            };
            view! {
                <img
                    src=url
                    alt="Avatar"
                    class=class
                    on:click=move |_| draft.update(|d| d.avatar = url.to_string())
                />
            }
        })
        .collect_view();

    view! { <div class="flex flex-wrap gap-3 mt-2">{avatars}</div> }
}

fn options(choices: &'static [(&'static str, &'static str)]) -> impl IntoView {
    choices
        .iter()
        .map(|(value, label)| view! { <option value=*value>{*label}</option> })
        .collect_view()
}

#[component]
pub fn ProfileFields(draft: RwSignal<ProfileDraft>) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label"><span class="label-text">"Nome"</span></label>
            <input
                class="input input-bordered"
                prop:value=move || draft.with(|d| d.name.clone())
                on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
            />
        </div>
        <div class="form-control">
            <label class="label"><span class="label-text">"Idade"</span></label>
            <input
                type="number"
                min="10"
                class="input input-bordered"
                prop:value=move || draft.with(|d| d.age.clone())
                on:input=move |ev| draft.update(|d| d.age = event_target_value(&ev))
            />
        </div>
        <div class="form-control">
            <label class="label"><span class="label-text">"Nível de experiência"</span></label>
            <select
                class="select select-bordered"
                prop:value=move || draft.with(|d| d.experience_level.clone())
                on:change=move |ev| draft.update(|d| d.experience_level = event_target_value(&ev))
            >
                <option value="" disabled>"Selecione"</option>
                {options(&EXPERIENCE_LEVELS)}
            </select>
        </div>
        <div class="form-control">
            <label class="label"><span class="label-text">"Estilo de corrida"</span></label>
            <select
                class="select select-bordered"
                prop:value=move || draft.with(|d| d.running_style.clone())
                on:change=move |ev| draft.update(|d| d.running_style = event_target_value(&ev))
            >
                <option value="" disabled>"Selecione"</option>
                {options(&RUNNING_STYLES)}
            </select>
        </div>
        <div class="form-control">
            <label class="label"><span class="label-text">"Foto de perfil"</span></label>
            <AvatarPicker draft=draft />
        </div>
    }
}

/// 通过 `PUT /users/update` 保存草稿，随后刷新会话资料并跳转到个人页
fn submit_update(
    (session, router, toaster): (SessionStore, RouterService, Toaster),
    draft: RwSignal<ProfileDraft>,
    saving: RwSignal<bool>,
    success: &'static str,
) {
    let req = match draft.with_untracked(ProfileDraft::validate) {
        Ok(req) => req,
        Err(msg) => {
            toaster.error(msg);
            return;
        }
    };

    saving.set(true);
    let api = session.api();
    spawn_local(async move {
        match api.update_user(req).await {
            Ok(()) => {
                toaster.success(success);
                if let Some(pending) = session.refresh() {
                    spawn_local(pending);
                }
                router.navigate_route(AppRoute::MyProfile);
            }
            Err(e) => toaster.api_error("Erro ao salvar", &e),
        }
        saving.set(false);
    });
}

#[component]
pub fn CompleteProfilePage() -> impl IntoView {
    let services = (use_session(), use_router(), use_toaster());
    let draft = RwSignal::new(ProfileDraft::default());
    let saving = RwSignal::new(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        submit_update(services, draft, saving, "Informações complementares salvas com sucesso!");
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="card max-w-xl mx-auto bg-base-100 shadow-xl">
                <form class="card-body space-y-2" on:submit=on_submit>
                    <h2 class="card-title text-2xl justify-center">"Complete seu perfil"</h2>
                    <ProfileFields draft=draft />
                    <button class="btn btn-primary mt-4" disabled=move || saving.get()>"Salvar"</button>
                </form>
            </div>
        </div>
    }
}

#[component]
pub fn EditProfilePage() -> impl IntoView {
    let services = (use_session(), use_router(), use_toaster());
    let (session, _, toaster) = services;
    let draft = RwSignal::new(ProfileDraft::default());
    let saving = RwSignal::new(false);
    let (loaded, set_loaded) = signal(false);

    let api = session.api();
    spawn_local(async move {
        match api.current_user().await {
            Ok(user) => {
                draft.set(ProfileDraft::from_user(&user));
                set_loaded.set(true);
            }
            Err(e) => toaster.api_error("Erro ao carregar perfil", &e),
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        submit_update(services, draft, saving, "Perfil atualizado com sucesso!");
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <Show
                when=move || loaded.get()
                fallback=|| view! { <p class="text-center mt-8">"Carregando..."</p> }
            >
                <div class="card max-w-xl mx-auto bg-base-100 shadow-xl">
                    <form class="card-body space-y-2" on:submit=on_submit>
                        <h2 class="card-title text-2xl justify-center">"Editar perfil"</h2>
                        <ProfileFields draft=draft />
                        <button class="btn btn-primary mt-4" disabled=move || saving.get()>"Salvar alterações"</button>
                    </form>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ProfileDraft {
        ProfileDraft {
            name: " Ana ".into(),
            age: "29".into(),
            avatar: "/imgs/corredor3.png".into(),
            experience_level: "intermediário".into(),
            running_style: "rua".into(),
        }
    }

    #[test]
    fn valid_draft_becomes_update_request() {
        let req = complete().validate().unwrap();
        assert_eq!(req.name, "Ana");
        assert_eq!(req.age, 29);
        assert_eq!(req.avatar, "/imgs/corredor3.png");
    }

    #[test]
    fn reports_first_problem() {
        let mut draft = complete();
        draft.name = "  ".into();
        assert_eq!(draft.validate().unwrap_err(), "Nome é obrigatório.");

        let mut draft = complete();
        draft.age = "9".into();
        assert!(draft.validate().unwrap_err().starts_with("Idade"));

        let mut draft = complete();
        draft.avatar = "https://elsewhere/me.png".into();
        assert_eq!(draft.validate().unwrap_err(), "Selecione uma imagem de perfil.");

        let mut draft = complete();
        draft.running_style = "esteira".into();
        assert_eq!(draft.validate().unwrap_err(), "Selecione o estilo de corrida.");
    }

    #[test]
    fn draft_from_partial_user() {
        let user: UserProfile = serde_json::from_value(serde_json::json!({
            "_id": "1", "nome": "Ana", "foto": "/imgs/corredor1.png", "idade": 30
        }))
        .unwrap();
        let draft = ProfileDraft::from_user(&user);
        assert_eq!(draft.age, "30");
        assert_eq!(draft.experience_level, "");
    }
}
