//! Active Panel
//!
//! Exactly one of error, progress, connect prompt or composer with the feed.

use leptos::*;
use wave_portal::Panel;

use super::{Composer, ConnectPrompt, ErrorBanner, Feed, Progress};
use crate::state::PortalState;

#[component]
pub fn ActivePanel() -> impl IntoView {
    let state = use_context::<PortalState>().expect("PortalState not found");
    let panel = create_memo(move |_| state.shell.with(|s| s.panel()));

    move || match panel.get() {
        Panel::Error(message) => view! { <ErrorBanner message=message /> }.into_view(),
        Panel::Progress(label) => view! { <Progress label=label /> }.into_view(),
        Panel::ConnectPrompt { wallet_available } => {
            view! { <ConnectPrompt wallet_available=wallet_available /> }.into_view()
        }
        Panel::Composer => view! {
            <div class="space-y-8">
                <Composer />
                <Feed />
            </div>
        }
        .into_view(),
    }
}
