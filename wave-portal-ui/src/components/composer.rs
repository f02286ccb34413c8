//! Composer Component
//!
//! Message box and wave button. The button is enabled only while a trimmed,
//! non-empty message is present and nothing is in flight.

use leptos::*;
use wave_portal::ShellEvent;

use crate::state::PortalState;

#[component]
pub fn Composer() -> impl IntoView {
    let state = use_context::<PortalState>().expect("PortalState not found");
    let shell = state.shell;

    let text = move || shell.with(|s| s.composer().text().to_string());
    let disabled = move || !shell.with(|s| s.can_submit());

    let on_input = {
        let state = state.clone();
        move |ev| state.dispatch(ShellEvent::ComposeInput(event_target_value(&ev)))
    };

    view! {
        <div class="space-y-3">
            <textarea
                class="w-full bg-gray-800 border border-gray-700 rounded-lg p-3 focus:outline-none focus:border-primary-500"
                rows="3"
                placeholder="Say hi..."
                prop:value=text
                on:input=on_input
            />
            <button
                class="w-full px-6 py-3 bg-primary-600 hover:bg-primary-700 disabled:opacity-50 rounded-lg font-medium transition-colors"
                disabled=disabled
                on:click=move |_| state.dispatch(ShellEvent::SubmitRequested)
            >
                "Wave at me"
            </button>
        </div>
    }
}
