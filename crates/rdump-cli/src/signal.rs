use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Whether a SIGINT/SIGTERM (or console ctrl event) has been received.
/// The daemon loop polls this between sleeps and between cycle phases.
pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Install handlers for cooperative shutdown. The first signal flips the
/// flag and re-arms the default disposition, so a second signal kills the
/// process outright instead of being swallowed.
pub fn install_signal_handlers() {
    #[cfg(unix)]
    // Safety: the handler only touches an atomic and libc::signal itself.
    unsafe {
        let handler = unix_signal_handler as *const () as libc::sighandler_t;
        libc::signal(libc::SIGTERM, handler);
        libc::signal(libc::SIGINT, handler);
    }

    #[cfg(windows)]
    unsafe {
        windows_sys::Win32::System::Console::SetConsoleCtrlHandler(
            Some(windows_console_handler),
            1, // TRUE = add
        );
    }
}

#[cfg(unix)]
extern "C" fn unix_signal_handler(sig: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
    }
}

#[cfg(windows)]
unsafe extern "system" fn windows_console_handler(ctrl_type: u32) -> i32 {
    // CTRL_C_EVENT, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT
    if ctrl_type <= 2 {
        SHUTDOWN.store(true, Ordering::SeqCst);
        windows_sys::Win32::System::Console::SetConsoleCtrlHandler(
            Some(windows_console_handler),
            0, // FALSE = remove, next signal terminates
        );
        return 1;
    }
    0
}
