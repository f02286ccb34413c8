//! Error Banner Component
//!
//! Shows the current error notice until it expires.

use leptos::*;

#[component]
pub fn ErrorBanner(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div
            role="alert"
            class="flex items-center space-x-3 bg-red-600 text-white px-4 py-3 rounded-lg shadow-lg \
                   transform transition-all duration-300 ease-out animate-slide-in"
        >
            <span class="text-lg">"✕"</span>
            <span class="text-sm font-medium">{message}</span>
        </div>
    }
}
