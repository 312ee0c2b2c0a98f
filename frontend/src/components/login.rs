use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::toast::use_toaster;
use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let toaster = use_toaster();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("Preencha e-mail e senha.".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let api = session.api();
        spawn_local(async move {
            match api.login(email.get_untracked().trim(), &password.get_untracked()).await {
                Ok(token) => {
                    // 路由服务监听令牌变化，自动离开登录页
                    spawn_local(session.login(token));
                    toaster.success("Login realizado!");
                }
                Err(e) => {
                    log::info!("login rejected: {}", e);
                    set_error_msg.set(Some(e.user_message()));
                }
            }
            set_is_submitting.set(false);
        });
    };

    let on_google = move |_| {
        let url = session.config().google_login_url();
        if let Some(window) = web_sys::window() {
            if window.location().set_href(&url).is_err() {
                toaster.error("Não foi possível abrir o login do Google.");
            }
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-4xl font-bold">"Corrida" <span class="text-success">"+"</span></h1>
                    <p class="text-base-content/70">"Entre para acompanhar suas corridas"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"E-mail"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="voce@exemplo.com"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Senha"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6 gap-2">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Entrando..." }.into_any()
                                } else {
                                    "Entrar".into_any()
                                }}
                            </button>
                            <button type="button" class="btn btn-outline" on:click=on_google>
                                "Entrar com Google"
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            "Ainda não tem conta? "
                            <Link to=AppRoute::Register class="link link-primary">"Cadastre-se"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
