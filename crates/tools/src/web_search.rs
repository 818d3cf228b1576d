//! Web search tool — DuckDuckGo HTML endpoint.
//!
//! Scrapes the no-JavaScript HTML results page, which needs no API key.
//! Network failures come back as result text so the model can adjust.

use async_trait::async_trait;

use nova_core::error::ToolError;
use nova_core::provider::ToolParameter;
use nova_core::tool::{Tool, ToolResult};

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

pub struct WebSearchTool {
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (compatible; nova-cli)")
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// Pull result anchors and snippets out of the DuckDuckGo HTML page.
///
/// The page marks each result title with `class="result__a"` and each
/// snippet with `class="result__snippet"`. Tolerant scanning, not a full
/// HTML parse; a layout change degrades to zero results, not a panic.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let mut rest = html;

    while hits.len() < max_results {
        let Some(anchor_pos) = rest.find("class=\"result__a\"") else {
            break;
        };
        let section = &rest[anchor_pos..];

        let url = section
            .find("href=\"")
            .map(|p| &section[p + 6..])
            .and_then(|s| s.split('"').next())
            .unwrap_or_default()
            .to_string();

        let title = section
            .find('>')
            .map(|p| &section[p + 1..])
            .and_then(|s| s.split("</a>").next())
            .map(strip_tags)
            .unwrap_or_default();

        let snippet = section
            .find("class=\"result__snippet\"")
            .map(|p| &section[p..])
            .and_then(|s| s.find('>').map(|p| &s[p + 1..]))
            .and_then(|s| s.split("</a>").next())
            .map(strip_tags)
            .unwrap_or_default();

        if !title.is_empty() && !url.is_empty() {
            hits.push(SearchHit {
                title,
                url,
                snippet,
            });
        }

        rest = &section[17..];
    }

    hits
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .trim()
        .to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![
            ToolParameter::required("query", "string", "The search query"),
            ToolParameter::optional("max_results", "integer", "Number of results to return")
                .with_default(serde_json::json!(5)),
        ]
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let max_results = arguments["max_results"].as_u64().unwrap_or(5).clamp(1, 10) as usize;

        let response = self
            .client
            .post(SEARCH_URL)
            .form(&[("q", query)])
            .send()
            .await;

        let html = match response {
            Ok(resp) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            Ok(resp) => {
                return Ok(ToolResult::failure(
                    String::new(),
                    format!("Search failed with status {}", resp.status()),
                ));
            }
            Err(e) => {
                return Ok(ToolResult::failure(
                    String::new(),
                    format!("Search request failed: {e}"),
                ));
            }
        };

        let hits = parse_results(&html, max_results);
        if hits.is_empty() {
            return Ok(ToolResult::ok(
                String::new(),
                format!("No results found for '{query}'"),
            ));
        }

        let formatted: Vec<String> = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                format!(
                    "{}. {}\n   {}\n   {}",
                    i + 1,
                    hit.title,
                    hit.url,
                    hit.snippet
                )
            })
            .collect();

        Ok(ToolResult::ok(String::new(), formatted.join("\n\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://doc.rust-lang.org/book/">The Rust <b>Book</b></a>
          <a class="result__snippet" href="...">Learn <b>Rust</b> from scratch &amp; build things.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://crates.io/">crates.io</a>
          <a class="result__snippet" href="...">The Rust community crate registry.</a>
        </div>
    "#;

    #[test]
    fn parses_titles_urls_and_snippets() {
        let hits = parse_results(SAMPLE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "The Rust Book");
        assert_eq!(hits[0].url, "https://doc.rust-lang.org/book/");
        assert_eq!(hits[0].snippet, "Learn Rust from scratch & build things.");
        assert_eq!(hits[1].url, "https://crates.io/");
    }

    #[test]
    fn respects_max_results() {
        let hits = parse_results(SAMPLE, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn empty_page_yields_no_hits() {
        assert!(parse_results("<html></html>", 5).is_empty());
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WebSearchTool::new();
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
