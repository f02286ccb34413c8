//! Portal State
//!
//! Holds the [`ShellState`] in a signal and runs its effects with a
//! [`Driver`] on the browser event loop. Effect results come back through the
//! driver's sink and are applied like any other event.

use std::cell::{Cell, OnceCell};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Interval;
use leptos::*;
use wave_portal::{Config, Driver, ShellEvent, ShellState};

use crate::api::{BrowserProvider, GlooTimer};

type PortalDriver = Driver<BrowserProvider>;

/// Shared application state provided to all components
#[derive(Clone)]
pub struct PortalState {
    pub shell: RwSignal<ShellState>,
    driver: Rc<PortalDriver>,
}

/// Create the portal state and provide it to the component tree
pub fn provide_portal_state(config: &Config) -> PortalState {
    let shell = create_rw_signal(ShellState::new(config.ui.notice_timeout()));

    // The sink needs the driver it belongs to; a weak slot avoids the cycle.
    let slot: Rc<OnceCell<Weak<PortalDriver>>> = Rc::default();
    let sink_slot = Rc::clone(&slot);
    let driver = Rc::new(Driver::new(
        BrowserProvider::detect(),
        Rc::new(GlooTimer),
        config.contract.clone(),
        move |event| {
            if let Some(driver) = sink_slot.get().and_then(Weak::upgrade) {
                apply(shell, &driver, event);
            }
        },
    ));
    let _ = slot.set(Rc::downgrade(&driver));

    let state = PortalState { shell, driver };
    provide_context(state.clone());
    state
}

fn apply(shell: RwSignal<ShellState>, driver: &Rc<PortalDriver>, event: ShellEvent) {
    let mut effects = Vec::new();
    shell.update(|state| effects = state.apply(event));

    for effect in effects {
        let driver = Rc::clone(driver);
        spawn_local(async move { driver.run(effect).await });
    }
}

impl PortalState {
    /// Feed a UI event into the shell
    pub fn dispatch(&self, event: ShellEvent) {
        apply(self.shell, &self.driver, event);
    }

    /// Poll the live subscription every `period_ms`; dropping the interval stops it
    pub fn start_polling(&self, period_ms: u32) -> Interval {
        let driver = Rc::clone(&self.driver);
        let in_flight = Rc::new(Cell::new(false));

        Interval::new(period_ms, move || {
            if in_flight.replace(true) {
                return;
            }
            let driver = Rc::clone(&driver);
            let in_flight = Rc::clone(&in_flight);
            spawn_local(async move {
                driver.poll_live().await;
                in_flight.set(false);
            });
        })
    }
}
