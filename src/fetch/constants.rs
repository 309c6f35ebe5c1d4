//! Constants for the fetch module (timeouts, browser flags).

/// Default whole-request timeout for a page fetch (10 seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Default TCP connect timeout for the HTTP strategy.
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Grace period for a browser to close before it is killed.
pub const BROWSER_CLOSE_GRACE_SECS: u64 = 5;

/// Chromium flags applied to every headless launch.
pub const BROWSER_ARGS: [&str; 4] = [
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-first-run",
    "--disable-extensions",
];
