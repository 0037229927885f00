extern crate anyhow;
extern crate reqwest;

use anyhow::Context;
use crate::config;
use crate::result;

const TIMEOUT_SECS: u64 = 10;

// Sent on both MyBus requests.
const BROWSER_HEADERS: [(&str, &str); 5] = [
    ("User-Agent", "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
    ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Holds the one HTTP session used for the life of the process, so cookies
/// set by the MyBus landing page carry over to the ETA pages.
pub struct FeedClient {
    client: reqwest::blocking::Client,
}

struct Page {
    status: reqwest::StatusCode,
    body: String,
}

impl FeedClient {
    pub fn new() -> result::HoboDashResult<FeedClient> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        return Ok(FeedClient{ client: client });
    }

    pub fn fetch_json(&self, url: &str) -> result::HoboDashResult<String> {
        debug!("Fetching {}", url);
        let body = self.client.get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .with_context(|| format!("while fetching url: {}", url))?;
        return Ok(body);
    }

    pub fn fetch_html(&self, url: &str) -> result::HoboDashResult<String> {
        return fetch_html_with(url, |page_url, referer| {
            let response = self.browser_get(page_url, referer)
                .with_context(|| format!("while fetching url: {}", page_url))?;
            let status = response.status();
            let body = response.text()
                .with_context(|| format!("while reading url: {}", page_url))?;
            return Ok(Page{ status: status, body: body });
        });
    }

    fn browser_get(&self, url: &str, referer: Option<&str>) -> reqwest::Result<reqwest::blocking::Response> {
        let mut request = self.client.get(url);
        for (name, value) in BROWSER_HEADERS.iter() {
            request = request.header(*name, *value);
        }
        if let Some(referer) = referer {
            request = request.header(reqwest::header::REFERER, referer);
        }
        return request.send();
    }
}

// Only the landing page's cookies matter, so its status is logged and
// ignored. Transport errors on either request and a non-2xx ETA page fail.
fn fetch_html_with<G>(url: &str, get_fn: G) -> result::HoboDashResult<String>
where
    G: Fn(&str, Option<&str>) -> result::HoboDashResult<Page>,
{
    debug!("Priming cookies from {}", config::MYBUS_HOME);
    let home = get_fn(config::MYBUS_HOME, None)?;
    if !home.status.is_success() {
        warn!("Landing page {} answered {}, continuing", config::MYBUS_HOME, home.status);
    }

    debug!("Fetching {}", url);
    let page = get_fn(url, Some(config::MYBUS_HOME))?;
    if !page.status.is_success() {
        return Err(result::make_error(&format!("HTTP status {} for url: {}", page.status, url)));
    }
    return Ok(page.body);
}
