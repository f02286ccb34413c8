//! Wave Portal
//!
//! Browser front end for the WavePortal contract built with Leptos (WASM).
//!
//! # Features
//!
//! - Connect an injected Ethereum wallet
//! - Every wave ever sent, newest first
//! - Send a wave and watch it arrive live
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the contract through `window.ethereum`; all view
//! logic lives in the `wave-portal` shell state machine.

use leptos::*;

mod api;
mod app;
mod components;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
