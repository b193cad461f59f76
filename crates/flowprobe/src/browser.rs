//! Browser control over the Chrome `DevTools` Protocol.
//!
//! When compiled with the `browser` feature, [`ChromiumDocument`] adapts a
//! chromiumoxide page to the synchronous [`Document`](crate::Document) trait
//! by blocking on a Tokio runtime. The browser process itself is not managed
//! here: [`ChromiumSession::connect`] attaches to one that is already running.

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use crate::document::{Document, Element};
    use crate::locator::{Locator, Strategy};
    use crate::result::{FlowError, FlowResult};
    use chromiumoxide::browser::Browser as CdpBrowser;
    use chromiumoxide::element::Element as CdpElement;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::future::Future;
    use tokio::runtime::{Handle, Runtime};
    use tracing::{debug, info};

    const IS_DISPLAYED_FN: &str = "function() { \
        const style = window.getComputedStyle(this); \
        const rect = this.getBoundingClientRect(); \
        return style.visibility !== 'hidden' && style.display !== 'none' \
            && rect.width > 0 && rect.height > 0; }";

    const IS_ENABLED_FN: &str = "function() { return !this.disabled; }";

    /// Returns null when a click at the element's centre would land on the
    /// element itself, otherwise a short description of what covers it.
    const HIT_TEST_FN: &str = "function() { \
        this.scrollIntoView({ block: 'center', inline: 'center' }); \
        const rect = this.getBoundingClientRect(); \
        const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2); \
        if (hit === null || this.contains(hit)) { return null; } \
        let label = hit.tagName.toLowerCase(); \
        if (hit.id) { label += '#' + hit.id; } \
        if (typeof hit.className === 'string' && hit.className.trim()) { \
            label += '.' + hit.className.trim().split(/\\s+/).join('.'); } \
        return label; }";

    const CLEAR_FN: &str = "function() { \
        const proto = Object.getPrototypeOf(this); \
        const setter = Object.getOwnPropertyDescriptor(proto, 'value'); \
        if (setter && setter.set) { setter.set.call(this, ''); } else { this.value = ''; } \
        this.dispatchEvent(new Event('input', { bubbles: true })); \
        this.dispatchEvent(new Event('change', { bubbles: true })); }";

    /// Map a CDP failure onto the flow error taxonomy
    fn classify(locator: &str, err: &CdpError) -> FlowError {
        classify_message(locator, &err.to_string())
    }

    fn classify_message(locator: &str, message: &str) -> FlowError {
        let lower = message.to_lowercase();
        if lower.contains("could not find node")
            || lower.contains("no node")
            || lower.contains("detached")
            || lower.contains("stale")
        {
            FlowError::StaleElement {
                locator: locator.to_string(),
            }
        } else if lower.contains("box model")
            || lower.contains("not visible")
            || lower.contains("intercept")
            || lower.contains("scroll")
        {
            FlowError::not_interactable(format!("{locator}: {message}"))
        } else {
            FlowError::driver(message)
        }
    }

    /// Interpret the hit-test result: any string names the element on top
    fn hit_test_verdict(locator: &str, result: &serde_json::Value) -> FlowResult<()> {
        match result.as_str() {
            Some(cover) => Err(FlowError::not_interactable(format!(
                "{locator}: click would land on {cover}"
            ))),
            None => Ok(()),
        }
    }

    /// Turn a function call outcome into a value, surfacing thrown exceptions
    fn script_outcome(
        locator: &str,
        exception: Option<String>,
        value: Option<serde_json::Value>,
    ) -> FlowResult<serde_json::Value> {
        match exception {
            Some(description) => Err(FlowError::script(format!("{locator}: {description}"))),
            None => Ok(value.unwrap_or(serde_json::Value::Null)),
        }
    }

    /// Connection to a running Chromium
    #[derive(Debug)]
    pub struct ChromiumSession {
        runtime: Runtime,
        browser: CdpBrowser,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumSession {
        /// Attach to a browser through its `DevTools` WebSocket URL
        pub fn connect(ws_url: &str) -> FlowResult<Self> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let (browser, mut handler) = runtime
                .block_on(CdpBrowser::connect(ws_url))
                .map_err(|e| FlowError::driver(format!("connect {ws_url}: {e}")))?;

            // Spawn handler task
            let handle = runtime.spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });
            info!(ws_url, "connected to browser");

            Ok(Self {
                runtime,
                browser,
                handle,
            })
        }

        /// Open a new tab at `url`
        pub fn open(&self, url: &str) -> FlowResult<ChromiumDocument> {
            let page = self
                .runtime
                .block_on(self.browser.new_page(url))
                .map_err(|e| FlowError::driver(format!("open {url}: {e}")))?;
            Ok(ChromiumDocument::new(page, self.runtime.handle().clone()))
        }
    }

    impl Drop for ChromiumSession {
        fn drop(&mut self) {
            self.handle.abort();
        }
    }

    /// Document backed by a chromiumoxide page
    #[derive(Debug, Clone)]
    pub struct ChromiumDocument {
        page: CdpPage,
        runtime: Handle,
    }

    impl ChromiumDocument {
        /// Wrap a page; `runtime` must not be the runtime of the calling thread
        #[must_use]
        pub const fn new(page: CdpPage, runtime: Handle) -> Self {
            Self { page, runtime }
        }

        /// Underlying page
        #[must_use]
        pub const fn page(&self) -> &CdpPage {
            &self.page
        }

        fn block_on<F: Future>(&self, future: F) -> F::Output {
            self.runtime.block_on(future)
        }

        fn wrap(&self, element: CdpElement, locator: &Locator) -> ChromiumElement {
            ChromiumElement {
                element,
                runtime: self.runtime.clone(),
                locator: locator.to_string(),
            }
        }
    }

    impl Document for ChromiumDocument {
        type Element = ChromiumElement;

        fn navigate_to(&self, url: &str) -> FlowResult<()> {
            debug!(url, "navigate");
            self.block_on(self.page.goto(url))
                .map_err(|e| FlowError::driver(format!("navigate {url}: {e}")))?;
            Ok(())
        }

        fn current_location(&self) -> FlowResult<String> {
            self.block_on(self.page.url())
                .map(Option::unwrap_or_default)
                .map_err(|e| FlowError::driver(e.to_string()))
        }

        fn find_element(&self, locator: &Locator) -> FlowResult<Option<ChromiumElement>> {
            Ok(self.find_elements(locator)?.into_iter().next())
        }

        fn find_elements(&self, locator: &Locator) -> FlowResult<Vec<ChromiumElement>> {
            let found = match (locator.strategy(), locator.to_css()) {
                (Strategy::XPath, _) | (_, None) => {
                    self.block_on(self.page.find_xpaths(locator.selector()))
                }
                (_, Some(css)) => self.block_on(self.page.find_elements(css)),
            };
            let elements = found.map_err(|e| classify(&locator.to_string(), &e))?;
            Ok(elements.into_iter().map(|e| self.wrap(e, locator)).collect())
        }

        fn execute_script(
            &self,
            script: &str,
            args: &[&ChromiumElement],
        ) -> FlowResult<serde_json::Value> {
            match args {
                [] => {
                    let result = self
                        .block_on(self.page.evaluate(format!("(function() {{ {script} }})()")))
                        .map_err(|e| FlowError::script(e.to_string()))?;
                    Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
                }
                [target] => target.call(&format!(
                    "function() {{ const args = [this]; return (function() {{ {script} }}).apply(this, args); }}"
                )),
                _ => Err(FlowError::script(
                    "scripts with more than one element argument are not supported",
                )),
            }
        }
    }

    /// Element handle backed by a chromiumoxide element
    #[derive(Debug)]
    pub struct ChromiumElement {
        element: CdpElement,
        runtime: Handle,
        locator: String,
    }

    impl ChromiumElement {
        fn call(&self, function: &str) -> FlowResult<serde_json::Value> {
            let returns = self
                .runtime
                .block_on(self.element.call_js_fn(function, false))
                .map_err(|e| classify(&self.locator, &e))?;
            let exception = returns.exception_details.map(|details| {
                details
                    .exception
                    .and_then(|thrown| thrown.description)
                    .unwrap_or(details.text)
            });
            script_outcome(&self.locator, exception, returns.result.value)
        }
    }

    impl Element for ChromiumElement {
        fn click(&self) -> FlowResult<()> {
            hit_test_verdict(&self.locator, &self.call(HIT_TEST_FN)?)?;
            self.runtime
                .block_on(self.element.click())
                .map_err(|e| classify(&self.locator, &e))?;
            Ok(())
        }

        fn clear(&self) -> FlowResult<()> {
            self.call(CLEAR_FN).map(|_| ())
        }

        fn send_text(&self, text: &str) -> FlowResult<()> {
            self.runtime
                .block_on(async {
                    self.element.focus().await?;
                    self.element.type_str(text).await
                })
                .map_err(|e| classify(&self.locator, &e))?;
            Ok(())
        }

        fn text(&self) -> FlowResult<String> {
            self.runtime
                .block_on(self.element.inner_text())
                .map(Option::unwrap_or_default)
                .map_err(|e| classify(&self.locator, &e))
        }

        fn is_displayed(&self) -> FlowResult<bool> {
            Ok(self.call(IS_DISPLAYED_FN)?.as_bool().unwrap_or(false))
        }

        fn is_enabled(&self) -> FlowResult<bool> {
            Ok(self.call(IS_ENABLED_FN)?.as_bool().unwrap_or(false))
        }

        fn attribute(&self, name: &str) -> FlowResult<Option<String>> {
            self.runtime
                .block_on(self.element.attribute(name))
                .map_err(|e| classify(&self.locator, &e))
        }
    }

}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDocument, ChromiumElement, ChromiumSession};
