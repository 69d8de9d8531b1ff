//! Real browser control over the Chrome DevTools Protocol.
//!
//! With the `browser` feature, [`Browser`] launches chromium through
//! chromiumoxide and hands out one [`CdpDriver`] per scenario. Each driver
//! owns a fresh browser context, so cookies and local storage never leak
//! from one scenario into the next.
//! Every locator operation is a single script evaluation built from
//! [`crate::Locator::to_js`].

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run without a window
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Script acting on the first match of `locator_js`; `action` sees it as
/// `el` (possibly undefined) and the whole list as `els`. The result is
/// returned JSON-encoded.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn on_first(locator_js: &str, action: &str) -> String {
    format!(
        "(() => {{ const els = {locator_js}; const el = els[0]; \
         return JSON.stringify((() => {{ {action} }})()); }})()"
    )
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const VISIBLE_JS: &str = "if (!el) return false; \
    const style = getComputedStyle(el); \
    return style.visibility !== 'hidden' && style.display !== 'none' \
        && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);";

/// Sets the value through the native setter so framework-controlled inputs
/// notice the change
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn set_value_js(value_literal: &str, event: &str) -> String {
    format!(
        "if (!el) return false; \
         const proto = Object.getPrototypeOf(el); \
         const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
         setter.call(el, {value_literal}); \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('{event}', {{ bubbles: true }})); \
         return true;"
    )
}

#[cfg(feature = "browser")]
mod cdp {
    use super::*;
    use crate::driver::PageDriver;
    use crate::locator::{js_string, Locator};
    use crate::result::{SauceError, SauceResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::target::{
        BrowserContextId, CreateBrowserContextParams, CreateTargetParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Running chromium
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch chromium
        ///
        /// # Errors
        ///
        /// Returns error if the browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> SauceResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| SauceError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                SauceError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a blank page for one scenario in its own browser context
        ///
        /// # Errors
        ///
        /// Returns error if the context or the page cannot be created
        pub async fn new_driver(&self) -> SauceResult<CdpDriver> {
            let mut browser = self.inner.lock().await;
            let context = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(|e| SauceError::driver(e.to_string()))?;
            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context.clone())
                .build()
                .map_err(SauceError::driver)?;

            match browser.new_page(target).await {
                Ok(page) => {
                    tracing::debug!(context = ?context, "scenario page opened");
                    Ok(CdpDriver {
                        page,
                        context,
                        browser: Arc::clone(&self.inner),
                    })
                }
                Err(err) => {
                    if let Err(dispose) = browser.dispose_browser_context(context).await {
                        tracing::debug!(%dispose, "context dispose failed");
                    }
                    Err(SauceError::driver(err.to_string()))
                }
            }
        }

        /// Launch settings
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close chromium
        ///
        /// # Errors
        ///
        /// Returns error if the browser refuses to close
        pub async fn close(self) -> SauceResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| SauceError::driver(e.to_string()))?;
            self.handle.abort();
            Ok(())
        }
    }

    /// [`PageDriver`] over one chromium page in a private browser context
    #[derive(Debug, Clone)]
    pub struct CdpDriver {
        page: CdpPage,
        context: BrowserContextId,
        browser: Arc<Mutex<CdpBrowser>>,
    }

    impl CdpDriver {
        /// Browser context holding this driver's cookies and storage
        #[must_use]
        pub const fn context_id(&self) -> &BrowserContextId {
            &self.context
        }

        async fn eval<T: DeserializeOwned>(&self, script: String) -> SauceResult<T> {
            let encoded: String = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| SauceError::driver(e.to_string()))?
                .into_value()
                .map_err(|e| SauceError::driver(e.to_string()))?;
            Ok(serde_json::from_str(&encoded)?)
        }

        async fn act(&self, locator: &Locator, action: &str) -> SauceResult<()> {
            let done: bool = self.eval(on_first(&locator.to_js(), action)).await?;
            if done {
                Ok(())
            } else {
                Err(SauceError::ElementNotFound {
                    locator: locator.to_string(),
                })
            }
        }
    }

    #[async_trait]
    impl PageDriver for CdpDriver {
        async fn goto(&self, url: &str) -> SauceResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| SauceError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> SauceResult<String> {
            self.page
                .url()
                .await
                .map_err(|e| SauceError::driver(e.to_string()))?
                .ok_or_else(|| SauceError::driver("page has no URL"))
        }

        async fn count(&self, locator: &Locator) -> SauceResult<usize> {
            self.eval(on_first(&locator.to_js(), "return els.length;"))
                .await
        }

        async fn is_visible(&self, locator: &Locator) -> SauceResult<bool> {
            self.eval(on_first(&locator.to_js(), VISIBLE_JS)).await
        }

        async fn text_content(&self, locator: &Locator) -> SauceResult<Option<String>> {
            self.eval(on_first(
                &locator.to_js(),
                "return el ? (el.textContent || '') : null;",
            ))
            .await
        }

        async fn attribute(&self, locator: &Locator, name: &str) -> SauceResult<Option<String>> {
            let action = format!("return el ? el.getAttribute({}) : null;", js_string(name));
            self.eval(on_first(&locator.to_js(), &action)).await
        }

        async fn input_value(&self, locator: &Locator) -> SauceResult<Option<String>> {
            self.eval(on_first(
                &locator.to_js(),
                "return el && 'value' in el ? String(el.value) : null;",
            ))
            .await
        }

        async fn fill(&self, locator: &Locator, value: &str) -> SauceResult<()> {
            tracing::debug!(%locator, "fill");
            self.act(locator, &set_value_js(&js_string(value), "change"))
                .await
        }

        async fn click(&self, locator: &Locator) -> SauceResult<()> {
            tracing::debug!(%locator, "click");
            self.act(locator, "if (!el) return false; el.click(); return true;")
                .await
        }

        async fn select_option(&self, locator: &Locator, value: &str) -> SauceResult<()> {
            tracing::debug!(%locator, value, "select");
            self.act(locator, &set_value_js(&js_string(value), "change"))
                .await
        }

        async fn close(&self) -> SauceResult<()> {
            let closed = self
                .page
                .clone()
                .close()
                .await
                .map_err(|e| SauceError::driver(e.to_string()));
            // Disposing the context drops its storage even if the page lingers.
            self.browser
                .lock()
                .await
                .dispose_browser_context(self.context.clone())
                .await
                .map_err(|e| SauceError::driver(e.to_string()))?;
            closed
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, CdpDriver};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_viewport(800, 600)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.viewport_width, 800);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[test]
    fn test_scripts_return_json() {
        let script = on_first("[]", "return els.length;");
        assert!(script.contains("JSON.stringify"));
        assert!(script.contains("const el = els[0];"));
        assert!(set_value_js("\"x\"", "change").contains("setter.call(el, \"x\")"));
    }
}
