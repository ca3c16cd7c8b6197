use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Process-control port for the external clients (tunnel, overlay daemon)
/// the exposure controllers drive. Implemented once against real
/// subprocess invocation; tests swap in a fake.
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Runs a command to completion and returns its captured stdout.
    /// A non-zero exit status is an error carrying stderr.
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, String>;

    /// Launches a long-lived background process detached from the calling
    /// path. Returns once the process has been spawned; the caller observes
    /// it only through its local status API afterwards.
    async fn launch(&self, program: &str, args: &[&str]) -> Result<(), String>;
}

pub struct SystemProcesses;

#[async_trait]
impl ProcessPort for SystemProcesses {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| format!("{}: {}", program, e))?;

        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn launch(&self, program: &str, args: &[&str]) -> Result<(), String> {
        // kill_on_drop stays false: the child outlives this handle and
        // keeps serving after the spawning call returns.
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("{}: {}", program, e))?;
        drop(child);
        Ok(())
    }
}
