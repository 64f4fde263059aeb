//! Graceful shutdown for `tokio::process::Child` with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use tokio::time::{Instant, timeout_at};
#[cfg(unix)]
use tracing::debug;

#[cfg(unix)]
use super::group::{drain_group, group_of};

/// Terminate a child's process group, escalating to SIGKILL after `grace`.
///
/// # Strategy
/// 1. Send SIGTERM to the group and wait up to `grace` for the leader to exit
/// 2. If still running, SIGKILL the group
/// 3. Wait for reaping
/// 4. Give members that outlived the leader the rest of `grace`, then SIGKILL them
///
/// # Platform behavior
/// - Unix: group signals via nix
/// - Other: immediate `.kill()`
///
/// Returns once the child has been reaped and its group is empty. A child
/// that already exited is just reaped.
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        shutdown_other(child).await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    // Already reaped by an earlier wait
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let group = group_of(pid)?;
    let deadline = Instant::now() + grace;

    if let Err(e) = signal::killpg(group, Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    let status = match timeout_at(deadline, child.wait()).await {
        Ok(result) => result?,
        Err(_) => {
            debug!(pid, ?grace, "grace period elapsed, sending SIGKILL");
            // The group may be gone even though the leader is not reaped yet
            let _ = signal::killpg(group, Signal::SIGKILL);
            // Covers a leader that left its group
            let _ = child.start_kill();
            child.wait().await?
        }
    };

    // Members that ignored SIGTERM survive their leader
    drain_group(group, deadline).await;
    Ok(status)
}

#[cfg(not(unix))]
async fn shutdown_other(child: &mut Child) -> io::Result<ExitStatus> {
    child.kill().await?;
    child.wait().await
}
