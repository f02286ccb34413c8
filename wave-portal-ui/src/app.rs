//! App Root Component
//!
//! Mounts the shell, starts live polling and tears both down on unmount.

use leptos::*;
use wave_portal::{Config, ShellEvent};

use crate::components::ActivePanel;
use crate::state::provide_portal_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let config = Config::default();
    let state = provide_portal_state(&config);

    state.dispatch(ShellEvent::Mounted);
    let poll_ms = u32::try_from(config.contract.poll_interval_ms).unwrap_or(u32::MAX);
    let poller = state.start_polling(poll_ms);

    on_cleanup(move || {
        poller.cancel();
        state.dispatch(ShellEvent::Unmounted);
    });

    view! {
        <div class="min-h-screen bg-gray-900 text-white flex flex-col">
            <main class="flex-1 container mx-auto max-w-2xl px-4 py-12 space-y-8">
                <h1 class="text-3xl font-bold text-center">
                    "👋 Hey there. Nice to meet you."
                </h1>

                <ActivePanel />
            </main>
        </div>
    }
}
