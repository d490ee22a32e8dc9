//! Cross-process completion aggregation for scheduler/validation modes.
//!
//! Each statistical test invocation is a separate OS process; the outer
//! orchestrator spawns them and hands the pid list here. Children are polled
//! with `waitpid(WNOHANG)` at the caller's interval and classified by exit
//! status. There is no shared memory between test processes — only
//! file-based inputs and report outputs — and no cancellation: once spawned,
//! a child runs to completion or this call keeps polling.

use std::time::Duration;

/// Completion counts for a set of spawned test processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    /// Children that exited with status 0.
    pub succeeded: u64,
    /// Children that exited nonzero, died to a signal, or could not be waited
    /// on. A wait error counts the child as failed without retry.
    pub failed: u64,
}

/// Poll the given pids until every one has exited, classifying each by exit
/// status. Blocks the calling thread; there is no timeout for a hung child.
pub fn wait_for_processes(pids: &[i32], poll_interval: Duration) -> ProcessOutcome {
    let mut outstanding: Vec<i32> = pids.to_vec();
    let mut outcome = ProcessOutcome::default();

    while !outstanding.is_empty() {
        outstanding.retain(|&pid| {
            let mut status: libc::c_int = 0;
            let waited = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG) };
            if waited == 0 {
                return true; // still running
            }
            if waited == pid && libc::WIFEXITED(status) && libc::WEXITSTATUS(status) == 0 {
                outcome.succeeded += 1;
            } else {
                outcome.failed += 1;
            }
            false
        });
        if !outstanding.is_empty() {
            std::thread::sleep(poll_interval);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn spawn_exit(code: u32) -> i32 {
        Command::new("sh")
            .arg("-c")
            .arg(format!("exit {code}"))
            .spawn()
            .unwrap()
            .id() as i32
    }

    #[test]
    fn test_empty_pid_list() {
        let outcome = wait_for_processes(&[], Duration::from_millis(1));
        assert_eq!(outcome, ProcessOutcome::default());
    }

    #[test]
    fn test_classifies_exit_statuses() {
        let pids = vec![spawn_exit(0), spawn_exit(1), spawn_exit(0), spawn_exit(3)];
        let outcome = wait_for_processes(&pids, Duration::from_millis(5));
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 2);
    }

    #[test]
    fn test_unwaitable_pid_counts_as_failed() {
        // A pid we never spawned (and cannot wait on) is classified failed
        // rather than looping forever.
        let outcome = wait_for_processes(&[-999], Duration::from_millis(1));
        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.failed, 1);
    }

    #[test]
    fn test_waits_for_slow_child() {
        let pid = Command::new("sh")
            .arg("-c")
            .arg("sleep 0.2; exit 0")
            .spawn()
            .unwrap()
            .id() as i32;
        let outcome = wait_for_processes(&[pid], Duration::from_millis(10));
        assert_eq!(outcome.succeeded, 1);
    }
}
