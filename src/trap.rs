//! Panic recovery with site capture.
//!
//! The runner recovers from panicking spec methods with `catch_unwind`;
//! the panic site (file and line) is only observable from a panic hook.
//! A single process-wide hook is installed lazily; while a trap is active
//! on the current thread it records the site and stays silent, otherwise
//! it defers to the previously installed hook. Traps nest.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;

/// A recovered panic: its message and, when captured, its site.
pub(crate) struct Trapped {
    pub message: String,
    pub site: Option<(String, u32)>,
}

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
    static SITE: RefCell<Option<(String, u32)>> = RefCell::new(None);
}

static HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if DEPTH.with(|d| d.get()) > 0 {
            if let Some(location) = info.location() {
                SITE.with(|s| {
                    *s.borrow_mut() = Some((location.file().to_string(), location.line()))
                });
            }
        } else {
            previous(info);
        }
    }));
});

/// Run `f`, recovering a panic into [`Trapped`].
pub(crate) fn catch<T>(f: impl FnOnce() -> T) -> Result<T, Trapped> {
    Lazy::force(&HOOK);
    DEPTH.with(|d| d.set(d.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    DEPTH.with(|d| d.set(d.get() - 1));
    match outcome {
        Ok(value) => Ok(value),
        Err(payload) => Err(Trapped {
            message: panic_message(payload),
            site: SITE.with(|s| s.borrow_mut().take()),
        }),
    }
}

/// Extract a printable message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
