pub mod errors;

use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use log::{debug, info, warn};
use crate::config::BrowserParameters;
use crate::manager_browser::errors::BrowserError;

const BROWSER_ARGS: [&str; 5] = [
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-blink-features=AutomationControlled",
    "--blink-settings=imagesEnabled=false",
];

const IS_CLICKABLE_JS: &str = r#"function() {
    if (!this.isConnected || this.disabled) { return false; }
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.visibility !== 'hidden' && style.display !== 'none' && rect.width > 0 && rect.height > 0;
}"#;

const CLICK_JS: &str = "function() { this.click(); }";

/// How an element is found on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css '{}'", s),
            Locator::XPath(s) => write!(f, "xpath '{}'", s),
        }
    }
}

/// A headless browser session with one open tab.
///
/// The browser process is released when the session is closed or dropped, whichever
/// comes first.
pub struct Session {
    browser: Option<Browser>,
    tab: Arc<Tab>,
    page_load_timeout: Duration,
    poll_interval: Duration,
}

impl Session {
    /// Launches a browser and opens a tab configured with the user agent and with
    /// automation markers suppressed.
    ///
    /// When no executable is configured the browser is located on the system, or downloaded
    /// if none is installed.
    ///
    /// # Arguments
    ///
    /// * 'params' - browser configuration
    pub fn open(params: &BrowserParameters) -> Result<Session, BrowserError> {
        let args = BROWSER_ARGS.iter().map(OsStr::new).collect::<Vec<&OsStr>>();

        let options = LaunchOptions::default_builder()
            .headless(params.headless)
            .sandbox(false)
            .path(params.executable_path.clone())
            .user_data_dir(Some(params.user_data_dir.clone()))
            .args(args)
            .idle_browser_timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| BrowserError::Launch(format!("invalid launch options: {}", e)))?;

        let browser = Browser::new(options)
            .map_err(|e| BrowserError::Launch(format!("browser did not start: {}", e)))?;
        info!("browser started, version {}", browser_version(&browser));

        let tab = browser.new_tab()
            .map_err(|e| BrowserError::Launch(format!("could not open tab: {}", e)))?;

        tab.set_default_timeout(Duration::from_secs(params.page_load_timeout_secs));
        tab.set_user_agent(&params.user_agent, None, None)
            .map_err(|e| BrowserError::Launch(format!("could not set user agent: {}", e)))?;
        tab.enable_stealth_mode()
            .map_err(|e| BrowserError::Launch(format!("could not hide automation markers: {}", e)))?;

        Ok(Session {
            browser: Some(browser),
            tab,
            page_load_timeout: Duration::from_secs(params.page_load_timeout_secs),
            poll_interval: Duration::from_millis(params.poll_interval_ms),
        })
    }

    /// Loads the given url and waits until the document body is present
    ///
    /// # Arguments
    ///
    /// * 'url' - page to load
    pub fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        debug!("navigating to {}", url);
        self.tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| BrowserError::Timeout(format!("loading {}: {}", url, e)))?;

        self.wait_present(&Locator::Css("body".to_string()), self.page_load_timeout)
    }

    /// Waits until the element is present and clickable, then clicks it from within the page.
    /// The click is dispatched by script so overlays can't intercept it.
    ///
    /// # Arguments
    ///
    /// * 'locator' - the element to click
    /// * 'timeout' - max time to wait for the element to become clickable
    pub fn click_when_ready(&self, locator: &Locator, timeout: Duration) -> Result<(), BrowserError> {
        let element = self.poll(timeout, || {
            self.find(locator).filter(|e| is_clickable(e))
        }).ok_or_else(|| BrowserError::Timeout(format!("{} not clickable within {:?}", locator, timeout)))?;

        element.call_js_fn(CLICK_JS, vec![], false)
            .map_err(|e| BrowserError::Script(format!("click on {}: {}", locator, e)))?;
        debug!("clicked {}", locator);

        Ok(())
    }

    /// Waits until at least one element matches the locator
    ///
    /// # Arguments
    ///
    /// * 'locator' - the element to wait for
    /// * 'timeout' - max time to wait
    pub fn wait_present(&self, locator: &Locator, timeout: Duration) -> Result<(), BrowserError> {
        self.poll(timeout, || self.find(locator).map(|_| ()))
            .ok_or_else(|| BrowserError::Timeout(format!("{} not present within {:?}", locator, timeout)))
    }

    /// Returns the number of elements matching a css selector
    ///
    /// # Arguments
    ///
    /// * 'css' - the css selector
    pub fn count_matches(&self, css: &str) -> Result<u64, BrowserError> {
        let literal = serde_json::to_string(css)
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        let expression = format!("document.querySelectorAll({}).length", literal);

        let result = self.tab.evaluate(&expression, false)
            .map_err(|e| BrowserError::Script(format!("counting {}: {}", css, e)))?;

        result.value
            .and_then(|v| v.as_u64())
            .ok_or_else(|| BrowserError::Script(format!("counting {}: no numeric result", css)))
    }

    /// Polls the number of elements matching a selector until it has changed from `previous`
    /// to more than `min_rows` and holds over two consecutive polls, see `RowCountWatch`.
    /// Returns the last count seen, also if the timeout elapses first.
    ///
    /// # Arguments
    ///
    /// * 'css' - the css selector to count
    /// * 'previous' - the count before the page update was triggered
    /// * 'min_rows' - counts at or below this (e.g. a header-only table) are never final
    /// * 'timeout' - max time to wait for the count to settle
    pub fn wait_rows_settled(&self, css: &str, previous: u64, min_rows: u64, timeout: Duration) -> Result<u64, BrowserError> {
        let start = Instant::now();
        let mut watch = RowCountWatch::new(previous, min_rows);

        loop {
            thread::sleep(self.poll_interval);
            let count = self.count_matches(css)?;

            if watch.observe(count) {
                debug!("{} settled at {} matches after {:?}", css, count, start.elapsed());
                return Ok(count);
            }

            if start.elapsed() >= timeout {
                warn!("{} did not settle within {:?}, continuing with {} matches", css, timeout, watch.last());
                return Ok(watch.last());
            }
        }
    }

    /// Returns the live document serialized as html
    pub fn content(&self) -> Result<String, BrowserError> {
        self.tab.get_content()
            .map_err(|e| BrowserError::Script(format!("reading page content: {}", e)))
    }

    /// Closes the browser, calling it more than once is harmless
    pub fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            drop(browser);
            info!("browser closed");
        }
    }

    fn find(&self, locator: &Locator) -> Option<Element<'_>> {
        match locator {
            Locator::Css(s) => self.tab.find_element(s).ok(),
            Locator::XPath(s) => self.tab.find_element_by_xpath(s).ok(),
        }
    }

    /// Calls the check every poll interval until it returns something or the timeout elapses
    fn poll<T>(&self, timeout: Duration, mut check: impl FnMut() -> Option<T>) -> Option<T> {
        let start = Instant::now();
        loop {
            if let Some(found) = check() {
                return Some(found);
            }
            if start.elapsed() >= timeout {
                return None;
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Decides when a polled element count has settled after a page update.
///
/// A count is a candidate when it differs from the count before the update and exceeds
/// `min_rows`. The count has settled when the same candidate is seen twice in a row.
#[derive(Debug, Clone)]
pub struct RowCountWatch {
    previous: u64,
    min_rows: u64,
    last: u64,
    candidate: bool,
}

impl RowCountWatch {
    pub fn new(previous: u64, min_rows: u64) -> Self {
        Self { previous, min_rows, last: previous, candidate: false }
    }

    /// Records one polled count, returns true if the count has settled
    ///
    /// # Arguments
    ///
    /// * 'count' - the count just polled
    pub fn observe(&mut self, count: u64) -> bool {
        let settled = self.candidate && count == self.last;
        self.candidate = count != self.previous && count > self.min_rows;
        self.last = count;

        settled
    }

    /// The most recently polled count
    pub fn last(&self) -> u64 {
        self.last
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens a browser session, see `Session::open`
///
/// # Arguments
///
/// * 'params' - browser configuration
/// * 'executable_path' - explicit browser binary, overrides the configured one
pub fn open_session(params: &BrowserParameters, executable_path: Option<PathBuf>) -> Result<Session, BrowserError> {
    match executable_path {
        Some(path) => {
            let mut params = params.clone();
            params.executable_path = Some(path);
            Session::open(&params)
        },
        None => Session::open(params),
    }
}

/// Releases all browser resources held by the session
///
/// # Arguments
///
/// * 'session' - the session to close
pub fn close_session(mut session: Session) {
    session.close();
}

fn is_clickable(element: &Element) -> bool {
    element.call_js_fn(IS_CLICKABLE_JS, vec![], false)
        .ok()
        .and_then(|r| r.value)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn browser_version(browser: &Browser) -> String {
    browser.get_version()
        .map(|v| v.product)
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_display_names_kind() {
        assert_eq!(Locator::Css("#tabSynopArchive".to_string()).to_string(), "css '#tabSynopArchive'");
        assert_eq!(Locator::XPath("//label".to_string()).to_string(), "xpath '//label'");
    }

    fn settles_at(previous: u64, counts: &[u64]) -> Option<usize> {
        let mut watch = RowCountWatch::new(previous, 1);
        counts.iter().position(|c| watch.observe(*c))
    }

    #[test]
    fn unchanged_count_never_settles() {
        assert_eq!(settles_at(9, &[9, 9, 9, 9]), None);
    }

    #[test]
    fn changed_then_stable_settles() {
        assert_eq!(settles_at(9, &[57, 57]), Some(1));
        assert_eq!(settles_at(9, &[9, 57, 57, 57]), Some(2));
    }

    #[test]
    fn changing_counts_keep_polling() {
        assert_eq!(settles_at(9, &[30, 50, 57]), None);
        assert_eq!(settles_at(9, &[30, 50, 57, 57]), Some(3));
    }

    #[test]
    fn header_only_table_is_not_final() {
        assert_eq!(settles_at(9, &[1, 1, 1]), None);
        assert_eq!(settles_at(9, &[1, 1, 57, 57]), Some(3));
    }

    #[test]
    fn return_to_previous_count_resets() {
        assert_eq!(settles_at(9, &[57, 9, 9]), None);
    }

    #[test]
    fn last_tracks_latest_poll() {
        let mut watch = RowCountWatch::new(9, 1);
        assert_eq!(watch.last(), 9);
        watch.observe(1);
        assert_eq!(watch.last(), 1);
    }

    #[test]
    fn launch_args_disable_gpu_and_automation_flag() {
        assert!(BROWSER_ARGS.contains(&"--disable-gpu"));
        assert!(BROWSER_ARGS.contains(&"--disable-blink-features=AutomationControlled"));
    }
}
