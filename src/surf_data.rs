//! # surf-forecast.com Client
//!
//! All network operations live here: break search, ID to slug resolution,
//! break details, and fetching the latest forecast page. Everything that can
//! be done without a socket (search payload decoding, redirect parsing, page
//! extraction) is exposed as a plain function so it can be tested offline.
//!
//! ## Endpoints
//! - `GET /breaks/ac_location_name?query=<q>`: autocomplete search
//! - `POST /breaks/catch` (`loc_id=<id>`): answers `302` towards the slug
//! - `GET /breaks/{slug}`: break page with country and name selects
//! - `GET /breaks/{slug}/forecasts/latest`: the forecast table
//!
//! ## Error Handling
//! A break that does not exist surfaces as [`SurfError::BreakNotFound`] so the
//! caller can tell "nothing there" from "something broke". Redirects are
//! never followed; the catch endpoint's `Location` header is the answer.

use crate::config::SiteConfig;
use crate::error::ExtractError;
use crate::extract::{self, BreakPage};
use crate::timezones::{StaticTimezones, TimezoneResolver};
use crate::ForecastIssue;
use reqwest::{header, redirect, Client, StatusCode, Url};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from talking to the forecast site.
#[derive(Error, Debug)]
pub enum SurfError {
    /// No break matches the identifier, or the site answered 404
    #[error("surf break not found")]
    BreakNotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The site answered with a status the endpoint never returns on success
    #[error("received response with {0} status code")]
    Status(StatusCode),

    #[error("unexpected redirect location {0:?}")]
    Redirect(String),

    #[error("invalid URL {0:?}")]
    InvalidUrl(String),

    #[error("could not decode search results: {0}")]
    SearchPayload(#[from] serde_json::Error),

    #[error("unexpected search result row {0:?}")]
    SearchRow(Vec<String>),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// One break returned by the autocomplete search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSearchResult {
    pub id: u32,
    pub name: String,
    pub country_name: String,
}

/// A break with its URL slug resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub id: u32,
    pub slug: String,
    pub name: String,
    pub country_name: String,
}

pub struct SurfClient {
    base_url: Url,
    client: Client,
    resolver: Box<dyn TimezoneResolver + Send + Sync>,
}

impl SurfClient {
    /// Client using the built-in timezone abbreviation table.
    pub fn new(config: &SiteConfig) -> Result<Self, SurfError> {
        Self::with_resolver(config, StaticTimezones)
    }

    pub fn with_resolver(
        config: &SiteConfig,
        resolver: impl TimezoneResolver + Send + Sync + 'static,
    ) -> Result<Self, SurfError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| SurfError::InvalidUrl(config.base_url.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url,
            client,
            resolver: Box::new(resolver),
        })
    }

    fn url(&self, path: &str) -> Result<Url, SurfError> {
        self.base_url
            .join(path)
            .map_err(|_| SurfError::InvalidUrl(path.to_string()))
    }

    /// GET a page that answers 200 or 404.
    async fn get_page(&self, url: Url) -> Result<String, SurfError> {
        tracing::debug!(%url, "requesting page");
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(SurfError::BreakNotFound),
            status => Err(SurfError::Status(status)),
        }
    }

    /// Fetches and extracts the latest forecast for a break slug.
    ///
    /// # Example
    /// ```no_run
    /// use surf_glass::config::Config;
    /// use surf_glass::surf_data::SurfClient;
    ///
    /// # async fn run() -> Result<(), surf_glass::surf_data::SurfError> {
    /// let client = SurfClient::new(&Config::default().site)?;
    /// let issue = client.latest_forecast_issue("Hossegor-La-Graviere").await?;
    /// println!("{} days issued at {}", issue.daily.len(), issue.issued_at);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn latest_forecast_issue(&self, slug: &str) -> Result<ForecastIssue, SurfError> {
        let url = self.url(&format!("/breaks/{slug}/forecasts/latest"))?;
        let body = self.get_page(url).await?;

        let issue = parse_forecast_page(&body, self.resolver.as_ref())?;
        tracing::info!(
            slug,
            days = issue.daily.len(),
            issued_at = %issue.issued_at,
            "fetched forecast"
        );
        Ok(issue)
    }

    pub async fn search_breaks(&self, query: &str) -> Result<Vec<BreakSearchResult>, SurfError> {
        let url = self.url("/breaks/ac_location_name")?;
        let response = self
            .client
            .get(url)
            .query(&[("query", query)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SurfError::Status(response.status()));
        }

        let results = parse_search_results(&response.text().await?)?;
        tracing::debug!(query, results = results.len(), "searched breaks");
        Ok(results)
    }

    /// Asks the catch endpoint which slug belongs to a break ID.
    pub async fn break_slug(&self, id: u32) -> Result<String, SurfError> {
        let url = self.url("/breaks/catch")?;
        let response = self
            .client
            .post(url)
            .form(&[("loc_id", id.to_string())])
            .send()
            .await?;

        if response.status() != StatusCode::FOUND {
            return Err(SurfError::Status(response.status()));
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| SurfError::Redirect(String::new()))?;
        let target = self
            .base_url
            .join(location)
            .map_err(|_| SurfError::Redirect(location.to_string()))?;

        slug_from_redirect(target.path())
    }

    /// Resolves a numeric ID or a free-text name to `(id, slug)`.
    ///
    /// Free text is searched and the first matching break wins.
    pub async fn resolve_slug(&self, ident: &str) -> Result<(u32, String), SurfError> {
        let id = match ident.trim().parse::<u32>() {
            Ok(id) => id,
            Err(_) => self
                .search_breaks(ident)
                .await?
                .first()
                .map(|found| found.id)
                .ok_or(SurfError::BreakNotFound)?,
        };

        Ok((id, self.break_slug(id).await?))
    }

    pub async fn break_details(&self, id: u32) -> Result<Break, SurfError> {
        let slug = self.break_slug(id).await?;
        self.describe_break(id, slug).await
    }

    /// Reads name and country from the break page of an already resolved slug.
    pub async fn describe_break(&self, id: u32, slug: String) -> Result<Break, SurfError> {
        let body = self.get_page(self.url(&format!("/breaks/{slug}"))?).await?;
        let BreakPage { name, country_name } = parse_break_page(&body)?;

        Ok(Break {
            id,
            slug,
            name,
            country_name,
        })
    }
}

/// Parses a latest-forecast page body.
///
/// The parsed document is dropped before returning, so async callers never
/// hold it across an await point.
pub fn parse_forecast_page(
    body: &str,
    resolver: &dyn TimezoneResolver,
) -> Result<ForecastIssue, ExtractError> {
    let doc = Html::parse_document(body);
    extract::extract_forecast(&doc, resolver)
}

pub fn parse_break_page(body: &str) -> Result<BreakPage, ExtractError> {
    let doc = Html::parse_document(body);
    extract::extract_break_page(&doc)
}

/// Decodes the autocomplete payload, a 2-D array written with single quotes.
///
/// Rows whose ID is not numeric are regions or countries and are skipped.
pub fn parse_search_results(body: &str) -> Result<Vec<BreakSearchResult>, SurfError> {
    let rows: Vec<Vec<String>> = serde_json::from_str(&body.replace('\'', "\""))?;

    let mut breaks = Vec::with_capacity(rows.len());
    for row in rows {
        let [id, name, country_name] = <[String; 3]>::try_from(row).map_err(SurfError::SearchRow)?;
        match id.parse() {
            Ok(id) => breaks.push(BreakSearchResult {
                id,
                name,
                country_name,
            }),
            Err(_) => tracing::trace!(id = %id, name = %name, "skipping non-break search result"),
        }
    }

    Ok(breaks)
}

/// Extracts the slug from a catch redirect path such as
/// `/breaks/Hossegor-La-Graviere/forecasts/latest`.
pub fn slug_from_redirect(path: &str) -> Result<String, SurfError> {
    let rest = path
        .strip_prefix("/breaks/")
        .ok_or(SurfError::BreakNotFound)?;

    match rest.split("/forecasts").collect::<Vec<_>>().as_slice() {
        [slug, _] if !slug.is_empty() => Ok(slug.to_string()),
        _ => Err(SurfError::Redirect(path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use tokio::runtime::Runtime;

    const BREAK_PAGE: &str = r#"<div id="dropformcont-nav">
        <select id="country_id"><option selected>Spain</option></select>
        <select id="location_filename_part"><option selected>Mundaka</option></select>
    </div>"#;

    fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nConnection: close\r\nContent-Length: {}\r\n",
            body.len()
        );
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(body);
        out
    }

    /// Answers one connection per canned response, in order, and returns
    /// every request it read (head and body).
    fn serve(responses: Vec<String>) -> (SiteConfig, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|canned| {
                    let (stream, _) = listener.accept().unwrap();
                    let mut reader = BufReader::new(stream);
                    let mut request = String::new();
                    let mut body_len = 0;

                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                            break;
                        }
                        if let Some((name, value)) = line.split_once(':') {
                            if name.eq_ignore_ascii_case("content-length") {
                                body_len = value.trim().parse().unwrap();
                            }
                        }
                        request.push_str(&line);
                    }

                    let mut body = vec![0; body_len];
                    reader.read_exact(&mut body).unwrap();
                    request.push_str(&String::from_utf8_lossy(&body));

                    reader.get_mut().write_all(canned.as_bytes()).unwrap();
                    request
                })
                .collect()
        });

        let mut site = Config::default().site;
        site.base_url = format!("http://127.0.0.1:{port}");
        (site, handle)
    }

    fn run<T>(
        responses: Vec<String>,
        call: impl FnOnce(SurfClient) -> T,
    ) -> (T::Output, Vec<String>)
    where
        T: std::future::Future,
    {
        let (site, server) = serve(responses);
        let client = SurfClient::new(&site).unwrap();
        let result = Runtime::new().unwrap().block_on(call(client));
        (result, server.join().unwrap())
    }

    #[test]
    fn test_search_skips_regions() {
        let results =
            parse_search_results("[['123','Break A','CountryX'],['re77','RegionY','CountryZ']]")
                .unwrap();

        assert_eq!(
            results,
            vec![BreakSearchResult {
                id: 123,
                name: "Break A".to_string(),
                country_name: "CountryX".to_string(),
            }]
        );
    }

    #[test]
    fn test_search_empty_payload() {
        assert!(parse_search_results("[]").unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_short_rows() {
        let err = parse_search_results("[['123','Break A']]").unwrap_err();
        assert!(matches!(err, SurfError::SearchRow(row) if row.len() == 2));
    }

    #[test]
    fn test_search_rejects_garbage() {
        let err = parse_search_results("<html>").unwrap_err();
        assert!(matches!(err, SurfError::SearchPayload(_)));
    }

    #[test]
    fn test_slug_from_redirect() {
        assert_eq!(
            slug_from_redirect("/breaks/Hossegor-La-Graviere/forecasts/latest").unwrap(),
            "Hossegor-La-Graviere"
        );
        assert_eq!(slug_from_redirect("/breaks/Mundaka/forecasts").unwrap(), "Mundaka");
    }

    #[test]
    fn test_slug_from_foreign_redirect_is_not_found() {
        let err = slug_from_redirect("/countries/France").unwrap_err();
        assert!(matches!(err, SurfError::BreakNotFound));
    }

    #[test]
    fn test_slug_from_odd_redirect() {
        let err = slug_from_redirect("/breaks/Mundaka").unwrap_err();
        assert!(matches!(err, SurfError::Redirect(_)));

        let err = slug_from_redirect("/breaks/a/forecasts/b/forecasts").unwrap_err();
        assert!(matches!(err, SurfError::Redirect(_)));
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let mut site = Config::default().site;
        site.base_url = "not a url".to_string();
        assert!(matches!(
            SurfClient::new(&site),
            Err(SurfError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_missing_forecast_page_is_not_found() {
        let (result, requests) = run(vec![response("404 Not Found", &[], "")], |client| async move {
            client.latest_forecast_issue("Nowhere").await
        });

        assert!(matches!(result, Err(SurfError::BreakNotFound)));
        assert!(requests[0].starts_with("GET /breaks/Nowhere/forecasts/latest "));
    }

    #[test]
    fn test_server_error_is_status() {
        let (result, _) = run(
            vec![response("500 Internal Server Error", &[], "oops")],
            |client| async move { client.latest_forecast_issue("Mundaka").await },
        );

        assert!(matches!(
            result,
            Err(SurfError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[test]
    fn test_latest_forecast_over_http() {
        let page = include_str!("tests/fixtures/latest_forecast.html");
        let (result, _) = run(vec![response("200 OK", &[], page)], |client| async move {
            client.latest_forecast_issue("Mundaka").await
        });

        let issue = result.unwrap();
        assert_eq!(issue.daily.len(), 3);
        assert_eq!(issue.timezone, "Europe/Paris");
    }

    #[test]
    fn test_catch_follows_relative_location() {
        let (result, requests) = run(
            vec![response("302 Found", &[("Location", "/breaks/Mundaka/forecasts/latest")], "")],
            |client| async move { client.break_slug(42).await },
        );

        assert_eq!(result.unwrap(), "Mundaka");
        assert!(requests[0].starts_with("POST /breaks/catch "));
        assert!(requests[0].ends_with("loc_id=42"));
    }

    #[test]
    fn test_catch_follows_absolute_location() {
        let location = "https://www.surf-forecast.com/breaks/Hossegor-La-Graviere/forecasts/latest";
        let (result, _) = run(
            vec![response("302 Found", &[("Location", location)], "")],
            |client| async move { client.break_slug(7).await },
        );

        assert_eq!(result.unwrap(), "Hossegor-La-Graviere");
    }

    #[test]
    fn test_catch_without_location_is_redirect_error() {
        let (result, _) = run(vec![response("302 Found", &[], "")], |client| async move {
            client.break_slug(42).await
        });

        assert!(matches!(result, Err(SurfError::Redirect(ref location)) if location.is_empty()));
    }

    #[test]
    fn test_catch_without_redirect_is_status() {
        let (result, _) = run(vec![response("200 OK", &[], "<html></html>")], |client| async move {
            client.break_slug(42).await
        });

        assert!(matches!(result, Err(SurfError::Status(StatusCode::OK))));
    }

    #[test]
    fn test_search_over_http() {
        let (result, requests) = run(
            vec![response("200 OK", &[], "[['123','Break A','CountryX']]")],
            |client| async move { client.search_breaks("Break A").await },
        );

        assert_eq!(result.unwrap()[0].id, 123);
        assert!(requests[0].starts_with("GET /breaks/ac_location_name?query=Break+A "));

        let (result, _) = run(vec![response("503 Service Unavailable", &[], "")], |client| async move {
            client.search_breaks("Break A").await
        });
        assert!(matches!(
            result,
            Err(SurfError::Status(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }

    #[test]
    fn test_resolve_name_searches_then_catches() {
        let (result, requests) = run(
            vec![
                response("200 OK", &[], "[['re1','Basque','Spain'],['77','Mundaka','Spain']]"),
                response("302 Found", &[("Location", "/breaks/Mundaka/forecasts/latest")], ""),
            ],
            |client| async move { client.resolve_slug("Mundaka").await },
        );

        assert_eq!(result.unwrap(), (77, "Mundaka".to_string()));
        assert!(requests[1].ends_with("loc_id=77"));

        let (result, _) = run(vec![response("200 OK", &[], "[]")], |client| async move {
            client.resolve_slug("Atlantis").await
        });
        assert!(matches!(result, Err(SurfError::BreakNotFound)));
    }

    #[test]
    fn test_break_details_over_http() {
        let (result, requests) = run(
            vec![
                response("302 Found", &[("Location", "/breaks/Mundaka/forecasts/latest")], ""),
                response("200 OK", &[], BREAK_PAGE),
            ],
            |client| async move { client.break_details(77).await },
        );

        assert_eq!(
            result.unwrap(),
            Break {
                id: 77,
                slug: "Mundaka".to_string(),
                name: "Mundaka".to_string(),
                country_name: "Spain".to_string(),
            }
        );
        assert!(requests[1].starts_with("GET /breaks/Mundaka "));
    }

    #[test]
    fn test_client_joins_paths() {
        let client = SurfClient::new(&Config::default().site).unwrap();
        let url = client.url("/breaks/catch").unwrap();
        assert_eq!(url.as_str(), "https://www.surf-forecast.com/breaks/catch");
    }
}
