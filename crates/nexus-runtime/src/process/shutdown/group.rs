//! Sweeps of a process group whose leader is already gone.
//!
//! A reaped leader says nothing about the rest of its group: backgrounded
//! servers and bundler workers keep the group id alive on their own.

use std::io;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::time::{Instant, sleep};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(super) fn group_of(pid: u32) -> io::Result<Pid> {
    i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))
}

/// Whether any process still carries the group id.
fn has_members(group: Pid) -> bool {
    signal::killpg(group, None).is_ok()
}

/// Wait for the group to empty until `deadline`, then SIGKILL what is left.
pub(super) async fn drain_group(group: Pid, deadline: Instant) {
    while has_members(group) {
        if Instant::now() >= deadline {
            debug!(pgid = %group, "group members outlived the grace period, sending SIGKILL");
            // ESRCH: emptied since the last check
            let _ = signal::killpg(group, Signal::SIGKILL);
            return;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Terminate whatever is left in the group led by the exited `pid`.
///
/// SIGTERM first, SIGKILL for members still present after `grace`. An empty
/// group returns immediately.
pub async fn sweep_group(pid: u32, grace: Duration) {
    let Ok(group) = group_of(pid) else {
        return;
    };
    match signal::killpg(group, Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return,
        Err(e) => {
            debug!(pgid = %group, error = %e, "failed to signal leftover group");
            return;
        }
    }
    debug!(pgid = %group, "leader exited with group members left, sweeping");
    drain_group(group, Instant::now() + grace).await;
}
