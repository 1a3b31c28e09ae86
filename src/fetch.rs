// src/fetch.rs
//
// Where schedule pages come from: the faculty web server or a directory of
// saved pages.

use std::{
    error::Error,
    fs,
    path::PathBuf,
    thread,
    time::Duration,
};

use reqwest::blocking::Client;

use crate::config::consts::{FETCH_ATTEMPTS, PAGE_TIMEOUT_MS, RETRY_PAUSE_MS};
use crate::config::options::PageSource;

/// One group's page, or `None` when it cannot be had. Shared by workers.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, group: &str, url: &str) -> Option<String>;
}

/// GET over http(s) with a fixed number of attempts per page.
pub struct HttpFetcher {
    pub attempts: usize,
    pub pause: Duration,
    client: Client,
}

impl HttpFetcher {
    pub fn new(attempts: usize, pause: Duration, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("watcal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { attempts, pause, client })
    }

    pub fn with_defaults() -> Result<Self, Box<dyn Error>> {
        Self::new(
            FETCH_ATTEMPTS,
            Duration::from_millis(RETRY_PAUSE_MS),
            Duration::from_millis(PAGE_TIMEOUT_MS),
        )
    }

    fn get(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} for {url}").into());
        }
        // pages are served in several encodings; decode the same way saved pages are read
        let bytes = resp.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, group: &str, url: &str) -> Option<String> {
        let attempts = self.attempts.max(1);
        for attempt in 1..=attempts {
            match self.get(url) {
                Ok(body) => return Some(body),
                Err(e) => {
                    logw!("{group}: attempt {attempt}/{attempts} failed: {e}");
                    if attempt < attempts {
                        thread::sleep(self.pause);
                    }
                }
            }
        }
        loge!("{group}: giving up on {url}");
        None
    }
}

/// Reads `<dir>/<group>.htm`, then `<dir>/<group>.html`. The URL is ignored.
pub struct DirFetcher {
    pub dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PageFetcher for DirFetcher {
    fn fetch(&self, group: &str, _url: &str) -> Option<String> {
        let page = ["htm", "html"].iter().find_map(|ext| {
            let path = self.dir.join(join!(group, ".", ext));
            fs::read(&path).ok().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        });
        if page.is_none() {
            logw!("{group}: no saved page in {}", self.dir.display());
        }
        page
    }
}

pub fn fetcher_for(source: &PageSource) -> Result<Box<dyn PageFetcher>, Box<dyn Error>> {
    Ok(match source {
        PageSource::Http => Box::new(HttpFetcher::with_defaults()?),
        PageSource::Dir(dir) => Box::new(DirFetcher::new(dir.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Answers one request per entry of `replies` on a local port, in order.
    fn serve(replies: Vec<(&'static str, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut chunk).unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let reply = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });
        format!("http://{addr}")
    }

    fn fetcher(attempts: usize) -> HttpFetcher {
        HttpFetcher::new(attempts, Duration::ZERO, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn dir_fetcher_tries_both_extensions() {
        let dir = std::env::temp_dir().join("watcal_fetch_unit");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("A.htm"), "<table></table>").unwrap();
        fs::write(dir.join("B.html"), "<p>b</p>").unwrap();

        let f = DirFetcher::new(&dir);
        assert_eq!(f.fetch("A", "").as_deref(), Some("<table></table>"));
        assert_eq!(f.fetch("B", "").as_deref(), Some("<p>b</p>"));
        assert_eq!(f.fetch("C", ""), None);
    }

    #[test]
    fn http_fetcher_returns_page_body() {
        let base = serve(vec![("200 OK", "<table><tr><td>pon.</td></tr></table>")]);
        let page = fetcher(1).fetch("G1", &format!("{base}/Plany/G1.htm"));
        assert_eq!(page.as_deref(), Some("<table><tr><td>pon.</td></tr></table>"));
    }

    #[test]
    fn http_fetcher_retries_after_server_error() {
        let base = serve(vec![("503 Service Unavailable", "busy"), ("200 OK", "<p>ok</p>")]);
        assert_eq!(fetcher(2).fetch("G2", &format!("{base}/G2.htm")).as_deref(), Some("<p>ok</p>"));
    }

    #[test]
    fn http_fetcher_gives_up_on_missing_page() {
        let base = serve(vec![("404 Not Found", "nope"), ("404 Not Found", "nope")]);
        assert_eq!(fetcher(2).fetch("G3", &format!("{base}/G3.htm")), None);
    }

    #[test]
    fn every_preset_url_is_accepted_by_the_client() {
        // building the request must not reject https; nothing is sent
        let f = fetcher(1);
        for layout in crate::config::layout::FacultyLayout::all() {
            let url = layout.url_for("G1");
            assert!(url.starts_with("https://"), "{url}");
            assert!(f.client.get(&url).build().is_ok(), "{url}");
        }
    }
}
