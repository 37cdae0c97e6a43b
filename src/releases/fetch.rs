// src/releases/fetch.rs
// =============================================================================
// This module fetches every release of a repository from the GitHub API.
//
// Strategy:
// - GET /repos/{owner}/{repo}/releases returns one page of releases
// - The first response's Link header advertises the pagination URLs; the
//   page numbers in them tell us how many pages exist
// - Remaining pages are fetched sequentially with ?page=N
//
// No retries, no concurrency: a non-200 response is fatal and aborts the
// run. The release list changes rarely and the API is rate-limited, so
// politeness beats throughput here.
//
// Rust concepts:
// - async functions: For network I/O
// - Result: For error handling with anyhow at the application edge
// - Url: For picking query parameters out of the Link header targets
// =============================================================================

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, LINK, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

use super::model::Release;

// The repository the original tooling was written for; overridable from
// the command line
pub const DEFAULT_OWNER: &str = "CleverRaven";
pub const DEFAULT_REPO: &str = "Cataclysm-DDA";

const GITHUB_API_BASE: &str = "https://api.github.com";
// GitHub rejects requests without a User-Agent
const USER_AGENT_VALUE: &str = "cdda-tools";

// Fetches all releases of a repository, following pagination
//
// Parameters:
//   owner: repository owner (e.g. "CleverRaven")
//   repo: repository name (e.g. "Cataclysm-DDA")
//
// Returns: every release across all pages, with assets sorted and
// classified, or the first fetch/parse error.
pub async fn fetch_releases(owner: &str, repo: &str) -> Result<Vec<Release>> {
    fetch_releases_from(GITHUB_API_BASE, owner, repo).await
}

// Same as fetch_releases, but against an arbitrary API base URL so tests
// can point it at a local server
pub(crate) async fn fetch_releases_from(
    api_base: &str,
    owner: &str,
    repo: &str,
) -> Result<Vec<Release>> {
    let client = Client::new();
    let url = format!("{api_base}/repos/{owner}/{repo}/releases");

    // The first page tells us how many pages there are
    let (first_body, headers) = fetch_page(&client, &url).await?;
    let num_pages = page_count(&headers).unwrap_or(1);
    info!("Detected {} release pages.", num_pages);

    let mut releases = parse_releases(&first_body, 1)?;
    for page in 2..=num_pages {
        let page_url = format!("{url}?page={page}");
        let (body, _) = fetch_page(&client, &page_url).await?;
        releases.extend(parse_releases(&body, page)?);
    }

    Ok(releases)
}

// Fetches one page, returning its body and response headers
//
// Anything other than HTTP 200 is an error - the statistics are useless
// if any page is missing, so there is nothing to recover.
async fn fetch_page(client: &Client, url: &str) -> Result<(String, HeaderMap)> {
    let start = Instant::now();
    let response = client
        .get(url)
        .header(USER_AGENT, USER_AGENT_VALUE)
        .send()
        .await
        .with_context(|| format!("requesting url: {url}"))?;
    debug!("Request time: {:?}.", start.elapsed());

    if response.status() != StatusCode::OK {
        bail!(
            "Error requesting url: {} - url: {}",
            response.status().as_u16(),
            url
        );
    }

    let headers = response.headers().clone();
    let body = response.text().await?;
    Ok((body, headers))
}

// Parses one page of the releases payload into typed releases
fn parse_releases(body: &str, page_num: usize) -> Result<Vec<Release>> {
    let mut releases: Vec<Release> =
        serde_json::from_str(body).with_context(|| format!("parsing page {page_num}"))?;
    for (i, release) in releases.iter_mut().enumerate() {
        debug!("Parsing release #{} on page {}: [TAG] {}", i, page_num, release.tag_name);
        release.normalize();
    }
    Ok(releases)
}

// Reads the page count out of the Link header of the first page
//
// The header looks like:
//   <https://api.github.com/...?page=2>; rel="next", <...?page=7>; rel="last"
// When exactly two page numbers are advertised, the larger one is the
// total page count. Anything else (no header, mid-stream shapes) means we
// can't tell and stick with a single page.
fn page_count(headers: &HeaderMap) -> Option<usize> {
    let link = headers.get(LINK)?.to_str().ok()?;
    let pages = page_numbers(link);
    if pages.len() == 2 {
        Some(pages[1])
    } else {
        None
    }
}

// Extracts every page=N query parameter from the Link header's target
// URLs, sorted ascending
fn page_numbers(link: &str) -> Vec<usize> {
    let mut pages = Vec::new();
    for part in link.split(',') {
        let part = part.trim();
        let Some(rest) = part.strip_prefix('<') else {
            continue;
        };
        let Some(end) = rest.find('>') else {
            continue;
        };
        let Ok(target) = Url::parse(&rest[..end]) else {
            continue;
        };
        for (key, value) in target.query_pairs() {
            if key == "page" {
                if let Ok(page) = value.parse::<usize>() {
                    pages.push(page);
                }
            }
        }
    }
    pages.sort_unstable();
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers_from_link_header() {
        let link = "<https://api.github.com/repositories/1/releases?page=2>; rel=\"next\", \
                    <https://api.github.com/repositories/1/releases?page=7>; rel=\"last\"";
        assert_eq!(page_numbers(link), vec![2, 7]);
    }

    #[test]
    fn test_page_count_needs_exactly_two_numbers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            "<https://x.test/r?page=2>; rel=\"next\", <https://x.test/r?page=7>; rel=\"last\""
                .parse()
                .unwrap(),
        );
        assert_eq!(page_count(&headers), Some(7));

        // A lone page number is ambiguous
        headers.insert(LINK, "<https://x.test/r?page=3>; rel=\"next\"".parse().unwrap());
        assert_eq!(page_count(&headers), None);

        // No Link header at all
        assert_eq!(page_count(&HeaderMap::new()), None);
    }

    #[test]
    fn test_page_numbers_ignores_garbage_parts() {
        let link = "nonsense, <not a url>; rel=\"next\", <https://x.test/r?page=4>; rel=\"last\"";
        assert_eq!(page_numbers(link), vec![4]);
    }

    #[tokio::test]
    async fn test_fetch_follows_pagination() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();

        let link = format!(
            "<{base}/repos/o/r/releases?page=2>; rel=\"next\", \
             <{base}/repos/o/r/releases?page=2>; rel=\"last\""
        );
        let page1 = server
            .mock("GET", "/repos/o/r/releases")
            .with_status(200)
            .with_header("link", &link)
            .with_body(
                r#"[{"tag_name": "0.F-2", "name": "Second", "assets":
                    [{"name": "cdda-windows-tiles-x64.zip", "download_count": 3}]}]"#,
            )
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/repos/o/r/releases?page=2")
            .with_status(200)
            .with_body(r#"[{"tag_name": "0.F-1", "name": "First", "assets": []}]"#)
            .create_async()
            .await;

        let releases = fetch_releases_from(&base, "o", "r").await.unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag_name, "0.F-2");
        assert_eq!(releases[1].tag_name, "0.F-1");
        assert_eq!(releases[0].total_downloads(), 3);

        page1.assert_async().await;
        page2.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _mock = server
            .mock("GET", "/repos/o/r/releases")
            .with_status(403)
            .with_body("rate limited")
            .create_async()
            .await;

        assert!(fetch_releases_from(&base, "o", "r").await.is_err());
    }
}
