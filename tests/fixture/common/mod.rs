use assert_cmd::cargo::CommandCargoExt;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

pub const BIN: &str = "memhog";

/// Generous upper bound for anything the fixture must do "promptly".
pub const PROMPT: Duration = Duration::from_secs(5);

/// Running fixture process with line by line access to its stdout.
pub struct HogProcess {
    child: Child,
    lines: Receiver<String>,
}

impl HogProcess {
    /// Spawn fixture with default timings.
    pub fn spawn(args: &[&str]) -> Self {
        Self::spawn_with_env(args, &[])
    }

    /// Spawn fixture without startup pause and with fast idle loop.
    pub fn spawn_fast(args: &[&str]) -> Self {
        Self::spawn_with_env(
            args,
            &[("MEMHOG_STARTUP_DELAY_MS", "0"), ("MEMHOG_IDLE_MS", "50")],
        )
    }

    pub fn spawn_with_env(args: &[&str], envs: &[(&str, &str)]) -> Self {
        let mut child = Command::cargo_bin(BIN)
            .unwrap()
            .args(args)
            .envs(envs.iter().copied())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();

        let stdout = child.stdout.take().unwrap();
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self { child, lines }
    }

    pub fn pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    /// Wait for the next stdout line, panic if it differs from `expected`.
    pub fn exp_line(&self, expected: &str) {
        let line = self
            .lines
            .recv_timeout(PROMPT)
            .unwrap_or_else(|e| panic!("expect line {expected:?}: {e}"));
        assert_eq!(line, expected);
    }

    /// Skip lines until `expected` appears.
    pub fn exp_line_eventually(&self, expected: &str) {
        let deadline = Instant::now() + PROMPT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(left) {
                Ok(line) if line == expected => return,
                Ok(_) => continue,
                Err(e) => panic!("expect line {expected:?}: {e}"),
            }
        }
    }

    /// Drain stdout until the process closes it.
    pub fn rest_lines(&self) -> Vec<String> {
        let mut rest = vec![];
        loop {
            match self.lines.recv_timeout(PROMPT) {
                Ok(line) => rest.push(line),
                Err(RecvTimeoutError::Disconnected) => return rest,
                Err(RecvTimeoutError::Timeout) => panic!("stdout not closed, got {rest:?}"),
            }
        }
    }

    pub fn terminate(&self) {
        signal::kill(self.pid(), Signal::SIGTERM).unwrap();
    }

    /// Wait for process exit, kill it and panic if it takes too long.
    pub fn wait_exit(&mut self) -> ExitStatus {
        let deadline = Instant::now() + PROMPT;
        loop {
            if let Some(status) = self.child.try_wait().unwrap() {
                return status;
            }
            if Instant::now() > deadline {
                let _ = self.child.kill();
                let _ = self.child.wait();
                panic!("fixture {} hangs", self.child.id());
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for HogProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Resident set size of a process in bytes.
pub fn resident_bytes(pid: Pid) -> Option<u64> {
    let sys = sysinfo::System::new_with_specifics(
        sysinfo::RefreshKind::everything()
            .without_cpu()
            .without_memory(),
    );
    sysinfo::System::process(&sys, sysinfo::Pid::from_u32(pid.as_raw() as u32))
        .map(|p| p.memory())
}

#[macro_export]
macro_rules! assert_no_proc {
    ($pid:expr) => {
        assert_eq!(
            nix::sys::signal::kill($pid, None),
            Err(nix::errno::Errno::ESRCH)
        )
    };
}
