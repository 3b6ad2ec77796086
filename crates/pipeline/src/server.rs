//! Target application server lifecycle: spawn, readiness probe, teardown

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PipelineResult};

/// Configuration for spawning the application under test
#[derive(Debug, Clone)]
pub struct AppServerConfig {
    /// Command that starts the server
    pub command: String,

    /// Arguments passed to the command
    pub args: Vec<String>,

    /// Directory the command runs in
    pub workdir: PathBuf,

    /// URL polled to decide the server is ready
    pub base_url: String,

    /// Bound on the readiness wait
    pub startup_timeout: Duration,

    /// Delay between readiness probes
    pub poll_interval: Duration,
}

impl Default for AppServerConfig {
    fn default() -> Self {
        Self {
            command: "yarn".to_string(),
            args: vec!["web".to_string()],
            workdir: PathBuf::from("."),
            base_url: "http://localhost:3000".to_string(),
            startup_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Handle to a running application server process
pub struct AppServer {
    child: Option<Child>,
    base_url: String,
}

impl AppServer {
    /// Spawn the server and wait until it answers HTTP requests.
    ///
    /// Any HTTP response counts as ready — dev servers commonly 404 on
    /// `/`. If the server never answers within the startup timeout it is
    /// torn down before the error surfaces.
    pub async fn spawn(config: AppServerConfig) -> PipelineResult<Self> {
        if !config.workdir.is_dir() {
            return Err(PipelineError::DirNotFound(config.workdir));
        }

        info!(
            "starting application server: {} {} (in {})",
            config.command,
            config.args.join(" "),
            config.workdir.display()
        );

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .current_dir(&config.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PipelineError::ServerStartup(format!("failed to spawn {}: {}", config.command, e))
            })?;

        // Keep the child's pipes drained so it never blocks on a full buffer.
        drain(child.stdout.take(), "server stdout");
        drain(child.stderr.take(), "server stderr");

        let mut server = AppServer {
            child: Some(child),
            base_url: config.base_url.clone(),
        };

        if let Err(e) = wait_until_ready(&config).await {
            server.stop().await;
            return Err(e);
        }

        info!("application server ready at {}", server.base_url);
        Ok(server)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the server: SIGTERM, short grace period, then kill. Idempotent.
    pub async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        info!("stopping application server");

        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
                sleep(Duration::from_millis(500)).await;
            }
        }

        if let Err(e) = child.kill().await {
            debug!("server kill: {}", e);
        }
        let _ = child.wait().await;
    }
}

async fn wait_until_ready(config: &AppServerConfig) -> PipelineResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut first = true;

    while start.elapsed() < config.startup_timeout {
        match client.get(&config.base_url).send().await {
            Ok(_) => return Ok(()),
            Err(e) => {
                if first {
                    info!("waiting for the application server...");
                    first = false;
                }
                // Connection refused is expected while the server boots
                if !e.is_connect() {
                    warn!("readiness probe error: {}", e);
                }
            }
        }
        sleep(config.poll_interval).await;
    }

    Err(PipelineError::ServerNotReady(config.startup_timeout))
}

fn drain<R>(stream: Option<R>, label: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Some(stream) = stream else {
        return;
    };
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!("{}: {}", label, line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppServerConfig::default();
        assert_eq!(config.command, "yarn");
        assert_eq!(config.args, vec!["web".to_string()]);
        assert_eq!(config.startup_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_spawn_rejects_missing_workdir() {
        let config = AppServerConfig {
            workdir: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        };
        let err = AppServer::spawn(config).await.err().unwrap();
        assert!(matches!(err, PipelineError::DirNotFound(_)));
    }
}
