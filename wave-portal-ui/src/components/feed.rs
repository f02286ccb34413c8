//! Wave Feed Component
//!
//! Every wave newest first: sender, relative time (absolute on hover) and
//! message. Shown only inside the composer panel.

use chrono::Utc;
use leptos::*;
use wave_portal::shell::format;
use wave_portal::WaveRecord;

use crate::state::PortalState;

#[component]
pub fn Feed() -> impl IntoView {
    let state = use_context::<PortalState>().expect("PortalState not found");
    let shell = state.shell;

    let records = create_memo(move |_| shell.with(|s| s.visible_records().to_vec()));

    move || {
        let records = records.get();
        if records.is_empty() {
            return view! {}.into_view();
        }
        let now = Utc::now();
        view! {
            <ul class="space-y-4">
                {records
                    .into_iter()
                    .map(|record| view! { <WaveCard record=record now=now /> })
                    .collect_view()}
            </ul>
        }
        .into_view()
    }
}

#[component]
fn WaveCard(record: WaveRecord, now: chrono::DateTime<Utc>) -> impl IntoView {
    view! {
        <li class="bg-gray-800 rounded-lg p-4 space-y-2">
            <h2 class="text-sm font-mono text-gray-400 break-all">
                "Address: " {record.sender.to_string()}
            </h2>
            <h3 class="text-xs text-gray-500" title=format::absolute(record.timestamp)>
                {format::relative(record.timestamp, now)}
            </h3>
            <p class="whitespace-pre-wrap">{record.message}</p>
        </li>
    }
}
