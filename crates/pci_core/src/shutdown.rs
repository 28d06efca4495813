use std::sync::{
    OnceLock,
    atomic::{AtomicBool, Ordering},
};

use crate::{Error, Result};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);
static HOOK_INSTALLED: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Process-wide stop flag raised by Ctrl-C. The handler is installed on first call.
pub fn interrupt_flag() -> Result<&'static AtomicBool> {
    HOOK_INSTALLED
        .get_or_init(|| {
            ctrlc::set_handler(|| {
                if STOP_REQUESTED.swap(true, Ordering::SeqCst) {
                    // Second Ctrl-C: give up on the graceful stop.
                    std::process::exit(130);
                }
                log::warn!("shutdown: interrupt received, finishing current iteration");
            })
            .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| Error::other(format!("failed to install interrupt handler: {e}")))?;
    Ok(&STOP_REQUESTED)
}

