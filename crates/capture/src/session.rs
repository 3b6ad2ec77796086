//! Browser session lifecycle: launch, navigate, guaranteed teardown

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{AutomationError, AutomationResult};

/// How long a closed browser process gets to exit before we stop waiting
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Options for launching a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Run without a visible window
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),

    /// Bound on navigation + settle after `open`
    pub navigation_timeout: Duration,

    /// Quiet period granted after the page settles
    pub settle_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 720),
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(100),
        }
    }
}

/// One browser process with exactly one open page.
///
/// Sessions are never pooled: scenarios mutate application state on the
/// remote side, so each scenario opens a fresh session and closes it on
/// every exit path. `close` consumes the session, which makes a second
/// teardown unrepresentable.
pub struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl Session {
    /// Launch a browser, open one page, and navigate it to `url`.
    ///
    /// Does not return until the page has settled or the navigation
    /// timeout elapses; a settle failure tears the browser down before
    /// surfacing [`AutomationError::Navigation`].
    pub async fn open(url: &str, opts: &SessionOptions) -> AutomationResult<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(opts.window_size.0, opts.window_size.1)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !opts.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(AutomationError::InvalidConfig)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // Drive the CDP websocket; the browser is unusable without this loop.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler loop ended");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(browser, handler_task).await;
                return Err(e.into());
            }
        };

        let session = Session {
            browser,
            page,
            handler_task,
        };

        if let Err(e) = session.navigate(url, opts).await {
            session.close().await;
            return Err(e);
        }

        Ok(session)
    }

    /// The session's single page
    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn navigate(&self, url: &str, opts: &SessionOptions) -> AutomationResult<()> {
        debug!("navigating to {}", url);

        let settle = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<(), CdpError>(())
        };

        match timeout(opts.navigation_timeout, settle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(AutomationError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(AutomationError::Navigation {
                    url: url.to_string(),
                    reason: format!(
                        "page did not settle within {}ms",
                        opts.navigation_timeout.as_millis()
                    ),
                });
            }
        }

        tokio::time::sleep(opts.settle_delay).await;
        Ok(())
    }

    /// Close the page and terminate the browser process.
    ///
    /// Best effort on every step: teardown failures are logged, never
    /// propagated, so error paths can always release the session.
    pub async fn close(self) {
        let Session {
            browser,
            page,
            handler_task,
        } = self;

        if let Err(e) = page.close().await {
            debug!("page close failed: {}", e);
        }
        shutdown(browser, handler_task).await;
    }
}

async fn shutdown(mut browser: Browser, handler_task: JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        warn!("browser close failed: {}", e);
    }
    if timeout(SHUTDOWN_GRACE, browser.wait()).await.is_err() {
        // The process is reaped on drop; note that it outlived the grace period.
        warn!("browser did not exit within {:?}", SHUTDOWN_GRACE);
    }
    handler_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SessionOptions::default();
        assert!(opts.headless);
        assert_eq!(opts.window_size, (1280, 720));
        assert_eq!(opts.navigation_timeout, Duration::from_secs(30));
    }
}
