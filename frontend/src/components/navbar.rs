use corrida_shared::format::{display_name, resolve_avatar};
use leptos::prelude::*;

use crate::session::use_session;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

#[component]
pub fn Navbar() -> impl IntoView {
    let session = use_session();
    let router = use_router();
    let state = session.session();

    let name = move || state.with(|s| display_name(s.user.as_ref()).to_string());
    let avatar = move || {
        state.with(|s| {
            resolve_avatar(s.user.as_ref().map(|u| u.avatar.as_str()).unwrap_or_default())
                .to_string()
        })
    };

    let on_logout = move |_| {
        session.logout();
        router.navigate_route(AppRoute::Login);
    };

    view! {
        <header class="navbar bg-neutral text-neutral-content sticky top-0 z-40 shadow-md">
            <div class="flex-1">
                <Link to=AppRoute::MyProfile class="btn btn-ghost text-2xl font-bold">
                    "Corrida" <span class="text-success">"+"</span>
                </Link>
            </div>
            <nav class="flex-none gap-4 text-sm font-medium">
                <Link to=AppRoute::MyProfile class="link link-hover">"Perfil"</Link>
                <Link to=AppRoute::Calendar class="link link-hover">"Calendário"</Link>
                <Link to=AppRoute::Groups class="link link-hover">"Grupos"</Link>
            </nav>
            <div class="dropdown dropdown-end ml-4">
                <div tabindex="0" role="button" class="btn btn-ghost gap-2">
                    <div class="avatar">
                        <div class="w-9 rounded-full">
                            <img src=avatar alt=name />
                        </div>
                    </div>
                    <span class="hidden md:inline">{name}</span>
                </div>
                <ul tabindex="0" class="menu dropdown-content bg-base-100 text-base-content rounded-box w-48 p-2 shadow">
                    <li><Link to=AppRoute::MyProfile>"Meu perfil"</Link></li>
                    <li><Link to=AppRoute::EditProfile>"Editar perfil"</Link></li>
                    <li><Link to=AppRoute::NewActivity>"Nova atividade"</Link></li>
                    <li><button class="text-error" on:click=on_logout>"Sair"</button></li>
                </ul>
            </div>
        </header>
    }
}
