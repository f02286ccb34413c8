//! Loading Component

use leptos::*;

/// Spinner with the label of the operation in flight
#[component]
pub fn Progress(#[prop(into)] label: String) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center space-x-3 py-6 text-primary-400">
            <div class="loading-spinner w-6 h-6" />
            <p class="loading">{label}</p>
        </div>
    }
}
