//! Headless Chrome sessions and video description extraction.
//!
//! The session layer drives a private chromedriver over WebDriver. Extraction
//! runs an ordered list of [`Strategy`] values against the rendered page and
//! returns the first plausible text.

mod cookies;
mod error;
mod pipeline;
mod service;
mod session;
mod strategy;

pub use cookies::{CookieLoader, CookieRecord, CookieRecords};
pub use error::{Error, Result};
pub use pipeline::{
    DEFAULT_SETTLE, ExtractionConfig, ExtractionPipeline, InjectionReport, inject_cookies,
    parse_target,
};
pub use service::DriverService;
pub use session::{BrowserSession, DEFAULT_USER_AGENT, PageDriver, chrome_args};
pub use strategy::{MIN_TEXT_CHARS, PageView, Strategy, Unescape, run_strategies};
