use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Exit code used when shutdown overruns the watchdog window.
pub const WATCHDOG_EXIT_CODE: i32 = 124;

/// Starts a detached timer that exits the process if it is still running when
/// `window` closes. There is no way to disarm it; arm it only once the
/// remaining work is shutdown.
pub fn arm(window: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(window);
        log::error!("Shutdown did not finish within {window:?}, forcing exit");
        std::process::exit(WATCHDOG_EXIT_CODE);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_watchdog_waits_for_its_window() {
        let timer = arm(Duration::from_secs(3600));
        thread::sleep(Duration::from_millis(20));
        assert!(!timer.is_finished());
    }
}
