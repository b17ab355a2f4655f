use serde::Deserialize;

/// Main configuration structure for mapharvest
///
/// Every section and field has a default, so the CLI can run without a
/// configuration file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScraperConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable path; when unset the binary is
    /// discovered via CHROMIUM_PATH and well-known install locations
    #[serde(default, rename = "chrome-executable")]
    pub chrome_executable: Option<String>,
}

/// Result-list scrolling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    /// CSS selector for the scrollable results container
    #[serde(default = "default_container_selector", rename = "container-selector")]
    pub container_selector: String,

    /// Literal text that appears in the page once the list is exhausted
    #[serde(default = "default_end_marker", rename = "end-marker")]
    pub end_marker: String,

    /// Hard cap on scroll iterations; reaching it is not an error
    #[serde(default = "default_max_iterations", rename = "max-iterations")]
    pub max_iterations: u32,

    /// Pixels scrolled per iteration
    #[serde(default = "default_scroll_delta", rename = "scroll-delta-px")]
    pub scroll_delta_px: u32,

    /// Settle delay between scroll commands (milliseconds)
    #[serde(default = "default_scroll_pause", rename = "pause-ms")]
    pub pause_ms: u64,
}

/// Detail-page extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// How many detail pages are open concurrently; batches run sequentially
    #[serde(default = "default_batch_size", rename = "batch-size")]
    pub batch_size: usize,

    /// Selector that marks a detail page as rendered enough to read from
    #[serde(default = "default_ready_selector", rename = "ready-selector")]
    pub ready_selector: String,

    /// How long to wait for the ready selector before failing the page
    #[serde(default = "default_ready_timeout", rename = "ready-timeout-secs")]
    pub ready_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory CSV files are written into
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

fn default_headless() -> bool {
    true
}

fn default_container_selector() -> String {
    "div[role='feed']".to_string()
}

fn default_end_marker() -> String {
    "You've reached the end of the list".to_string()
}

fn default_max_iterations() -> u32 {
    200
}

fn default_scroll_delta() -> u32 {
    50_000
}

fn default_scroll_pause() -> u64 {
    300
}

fn default_batch_size() -> usize {
    5
}

fn default_ready_selector() -> String {
    "div[role='main']".to_string()
}

fn default_ready_timeout() -> u64 {
    10
}

fn default_output_directory() -> String {
    ".".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_executable: None,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            container_selector: default_container_selector(),
            end_marker: default_end_marker(),
            max_iterations: default_max_iterations(),
            scroll_delta_px: default_scroll_delta(),
            pause_ms: default_scroll_pause(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            ready_selector: default_ready_selector(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}
