//! Connect Prompt Component

use leptos::*;
use wave_portal::ShellEvent;

use crate::state::PortalState;

const WALLET_INSTALL_URL: &str = "https://metamask.io/download/";

#[component]
pub fn ConnectPrompt(wallet_available: bool) -> impl IntoView {
    let state = use_context::<PortalState>().expect("PortalState not found");

    if !wallet_available {
        return view! {
            <div class="text-center space-y-4">
                <p class="text-gray-400">"You need an Ethereum wallet to wave."</p>
                <a
                    href=WALLET_INSTALL_URL
                    target="_blank"
                    class="inline-block px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
                >
                    "Get MetaMask"
                </a>
            </div>
        }
        .into_view();
    }

    view! {
        <div class="text-center space-y-4">
            <p class="text-gray-400">"Connect your Ethereum wallet and wave at me!"</p>
            <button
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
                on:click=move |_| state.dispatch(ShellEvent::ConnectRequested)
            >
                "Connect"
            </button>
        </div>
    }
    .into_view()
}
