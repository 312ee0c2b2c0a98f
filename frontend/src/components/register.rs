use corrida_shared::protocol::RegisterUserRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::profile_form::{ProfileDraft, ProfileFields};
use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 注册表单状态，在通用资料字段之上增加账号信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub instagram: String,
    pub facebook: String,
    pub twitter: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl SignUp {
    pub fn into_request(self, profile: &ProfileDraft) -> Result<RegisterUserRequest, String> {
        let email = self.email.trim();
        if !email.contains('@') {
            return Err("Informe um e-mail válido.".into());
        }
        if self.password.chars().count() < 6 {
            return Err("A senha deve ter pelo menos 6 caracteres.".into());
        }
        let profile = profile.validate()?;

        Ok(RegisterUserRequest {
            name: profile.name,
            email: email.to_string(),
            password: self.password,
            age: profile.age,
            avatar: profile.avatar,
            experience_level: profile.experience_level,
            running_style: profile.running_style,
            instagram: optional(&self.instagram),
            facebook: optional(&self.facebook),
            twitter: optional(&self.twitter),
        })
    }
}

fn text_field(
    account: RwSignal<SignUp>,
    label: &'static str,
    kind: &'static str,
    field: fn(&mut SignUp) -> &mut String,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label"><span class="label-text">{label}</span></label>
            <input
                type=kind
                class="input input-bordered"
                on:input=move |ev| account.update(|a| *field(a) = event_target_value(&ev))
            />
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let toaster = use_toaster();

    let profile = RwSignal::new(ProfileDraft::default());
    let account = RwSignal::new(SignUp::default());
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = match profile.with_untracked(|p| account.get_untracked().into_request(p)) {
            Ok(req) => req,
            Err(msg) => {
                toaster.error(msg);
                return;
            }
        };

        set_saving.set(true);
        let api = session.api();
        spawn_local(async move {
            match api.register(req).await {
                Ok(()) => {
                    toaster.success("Usuário cadastrado com sucesso!");
                    router.navigate_route(AppRoute::Login);
                }
                Err(e) => toaster.api_error("Erro ao cadastrar", &e),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-6">
            <div class="card max-w-xl mx-auto bg-base-100 shadow-xl">
                <form class="card-body space-y-2" on:submit=on_submit>
                    <h2 class="card-title text-2xl justify-center">"Cadastro"</h2>
                    {text_field(account, "E-mail", "email", |a| &mut a.email)}
                    {text_field(account, "Senha", "password", |a| &mut a.password)}
                    <ProfileFields draft=profile />
                    {text_field(account, "Instagram (opcional)", "text", |a| &mut a.instagram)}
                    {text_field(account, "Facebook (opcional)", "text", |a| &mut a.facebook)}
                    {text_field(account, "Twitter (opcional)", "text", |a| &mut a.twitter)}
                    <button class="btn btn-primary mt-4" disabled=move || saving.get()>"Cadastrar"</button>
                    <p class="text-center text-sm">
                        "Já tem conta? "
                        <Link to=AppRoute::Login class="link link-primary">"Entrar"</Link>
                    </p>
                </form>
            </div>
        </div>
    }
}
