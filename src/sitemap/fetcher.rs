//! Sitemap fetcher
//!
//! Downloads one sitemap and extracts the `<loc>` of every `<url>` entry.
//! Fetch and parse failures are logged and turned into an empty list so a
//! single broken sitemap never stops discovery.

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;

use crate::core::config::SitemapConfig;
use crate::core::{Result, SweepError};

/// HTTP client for sitemap documents
#[derive(Clone)]
pub struct SitemapFetcher {
    client: Client,
}

impl SitemapFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create a fetcher from configuration
    pub fn from_config(config: &SitemapConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }

    /// Fetch a sitemap, returning an empty list on any failure
    pub async fn fetch(&self, sitemap_url: &str) -> Vec<String> {
        match self.try_fetch(sitemap_url).await {
            Ok(urls) => {
                tracing::debug!(sitemap = sitemap_url, count = urls.len(), "sitemap parsed");
                urls
            }
            Err(e) => {
                tracing::warn!(
                    sitemap = sitemap_url,
                    error = %e,
                    "Error fetching or parsing the sitemap"
                );
                Vec::new()
            }
        }
    }

    /// Fetch and parse a sitemap, surfacing the failure
    pub async fn try_fetch(&self, sitemap_url: &str) -> Result<Vec<String>> {
        let body = self
            .client
            .get(sitemap_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_sitemap(&body)
    }
}

/// Extract page locations from a `<urlset>` sitemap document.
///
/// Element names are matched by local name so the usual
/// `xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"` declaration (or a
/// prefixed variant) makes no difference. Every `<url>` must carry a
/// non-empty `<loc>`.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut entries = 0usize;
    let mut in_url = false;
    let mut in_loc = false;
    let mut loc = String::new();
    let mut current: Option<String> = None;
    let mut urls = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = e.local_name();
                match depth {
                    0 => {
                        check_root(name.as_ref())?;
                        saw_root = true;
                    }
                    1 if name.as_ref() == b"url" => {
                        in_url = true;
                        current = None;
                    }
                    2 if in_url && name.as_ref() == b"loc" => {
                        in_loc = true;
                        loc.clear();
                    }
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                match depth {
                    0 => {
                        check_root(name.as_ref())?;
                        saw_root = true;
                    }
                    1 if name.as_ref() == b"url" => {
                        return Err(SweepError::shape("<url> entry without <loc>"));
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) if in_loc => {
                let text = e
                    .unescape()
                    .map_err(|e| SweepError::shape(format!("bad <loc> text: {}", e)))?;
                loc.push_str(&text);
            }
            Event::CData(e) if in_loc => {
                loc.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                match depth {
                    2 if in_loc => {
                        in_loc = false;
                        let value = loc.trim();
                        if !value.is_empty() {
                            current = Some(value.to_string());
                        }
                    }
                    1 if in_url => {
                        in_url = false;
                        entries += 1;
                        match current.take() {
                            Some(url) => urls.push(url),
                            None => return Err(SweepError::shape("<url> entry without <loc>")),
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(SweepError::shape("document ends inside an open element"));
    }
    if !saw_root {
        return Err(SweepError::shape("no root element"));
    }
    if entries == 0 {
        return Err(SweepError::shape("<urlset> has no <url> entries"));
    }

    Ok(urls)
}

fn check_root(name: &[u8]) -> Result<()> {
    if name == b"urlset" {
        Ok(())
    } else {
        Err(SweepError::shape(format!(
            "root element is <{}>, expected <urlset>",
            String::from_utf8_lossy(name)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/</loc>
            <lastmod>2024-01-05</lastmod>
          </url>
          <url>
            <loc>https://example.com/about?a=1&amp;b=2</loc>
            <changefreq>daily</changefreq>
          </url>
        </urlset>"#;

    #[test]
    fn test_parse_urlset() {
        let urls = parse_sitemap(SITEMAP).unwrap();
        assert_eq!(
            urls,
            ["https://example.com/", "https://example.com/about?a=1&b=2"]
        );
    }

    #[test]
    fn test_parse_prefixed_and_cdata() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
            <sm:url><sm:loc><![CDATA[https://example.com/x]]></sm:loc></sm:url>
        </sm:urlset>"#;
        assert_eq!(parse_sitemap(xml).unwrap(), ["https://example.com/x"]);
    }

    #[test]
    fn test_sitemap_index_is_rejected() {
        let xml = r#"<sitemapindex>
            <sitemap><loc>https://example.com/sitemap-0.xml</loc></sitemap>
        </sitemapindex>"#;
        let err = parse_sitemap(xml).unwrap_err();
        assert!(matches!(err, SweepError::SitemapShape(_)));
        assert!(err.to_string().contains("sitemapindex"));
    }

    #[test]
    fn test_url_without_loc_is_rejected() {
        let xml = "<urlset><url><loc>https://a/</loc></url><url><lastmod>x</lastmod></url></urlset>";
        assert!(matches!(
            parse_sitemap(xml),
            Err(SweepError::SitemapShape(_))
        ));
        assert!(parse_sitemap("<urlset><url/></urlset>").is_err());
    }

    #[test]
    fn test_empty_urlset_is_rejected() {
        assert!(parse_sitemap("<urlset></urlset>").is_err());
        assert!(parse_sitemap("<urlset/>").is_err());
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(parse_sitemap("<urlset><url><loc>https://a/</url></urlset>").is_err());
        assert!(parse_sitemap("<urlset><url><loc>https://a/</loc></url>").is_err());
        assert!(parse_sitemap("not xml at all").is_err());
        assert!(parse_sitemap("").is_err());
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap-0.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SITEMAP))
            .mount(&server)
            .await;

        let fetcher = SitemapFetcher::new(Duration::from_secs(5)).unwrap();
        let urls = fetcher
            .fetch(&format!("{}/sitemap-0.xml", server.uri()))
            .await;
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_http_error_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(SITEMAP))
            .mount(&server)
            .await;

        let fetcher = SitemapFetcher::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/missing.xml", server.uri());
        assert!(fetcher.fetch(&url).await.is_empty());
        assert!(matches!(
            fetcher.try_fetch(&url).await,
            Err(SweepError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SITEMAP)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let fetcher = SitemapFetcher::new(Duration::from_millis(200)).unwrap();
        assert!(fetcher.fetch(&server.uri()).await.is_empty());
    }
}
