//! Containment boundary for calls into the foreign model.
//!
//! Panics raised inside [`isolate`] are reported through `tracing` instead of
//! the default panic hook, so a contained accessor panic does not print a
//! `thread 'main' panicked at` banner. Panics anywhere else still reach the
//! previously installed hook.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe, catch_unwind};
use std::sync::Once;

use rptdoc_core::{AccessError, AccessResult};
use tracing::warn;

thread_local! {
    static CONTAINED: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the current panic hook so it stays silent on contained threads.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CONTAINED.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as contained until dropped.
struct ContainedScope {
    outer: bool,
}

impl ContainedScope {
    fn enter() -> Self {
        Self {
            outer: CONTAINED.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for ContainedScope {
    fn drop(&mut self) {
        CONTAINED.with(|flag| flag.set(self.outer));
    }
}

/// Runs one accessor call and never unwinds past this boundary.
///
/// Errors pass through unchanged; a panic becomes [`AccessError::Panicked`]
/// and is logged with `warn!`.
pub(crate) fn isolate<T>(call: impl FnOnce() -> AccessResult<T>) -> AccessResult<T> {
    install_quiet_hook();
    let outcome = {
        let _scope = ContainedScope::enter();
        catch_unwind(AssertUnwindSafe(call))
    };
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(panic = %message, "Contained accessor panic");
            Err(AccessError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
