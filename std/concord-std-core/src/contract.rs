//!
//! Contract Violations
//!
//! Programmer errors (sending on a closed channel, setting a future twice,
//! tearing down a structure that is still in use) are reported here. They are
//! logged and then panic; they never become a `SyncError`.
//!

/// Report a broken precondition and unwind.
#[track_caller]
pub fn violation(what: &str) -> ! {
    tracing::error!(contract = what, "contract violation");
    panic!("contract violation: {what}");
}

/// Report `what` as a violation unless `holds` is true.
#[track_caller]
pub fn ensure(holds: bool, what: &str) {
    if !holds {
        violation(what);
    }
}
