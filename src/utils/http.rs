// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body as text.
///
/// A 404 becomes [`AppError::PageNotReady`] so the caller's retry policy can
/// wait for a deploy to land; other failures become [`AppError::Status`].
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let response = check_status(url, response)?;
    Ok(response.text().await?)
}

/// Map a non-success response to an error.
pub fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 404 {
        return Err(AppError::PageNotReady(url.to_string()));
    }
    Err(AppError::Status {
        url: url.to_string(),
        status: status.as_u16(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn test_fetch_text_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<title>A</title>"))
            .mount(&server)
            .await;

        let client = create_async_client(&HttpConfig::default()).unwrap();
        let body = fetch_text(&client, &format!("{}/a/", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<title>A</title>");
    }

    #[tokio::test]
    async fn test_fetch_text_maps_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = create_async_client(&HttpConfig::default()).unwrap();

        let missing = fetch_text(&client, &format!("{}/missing/", server.uri())).await;
        assert!(matches!(missing, Err(AppError::PageNotReady(_))));

        let broken = fetch_text(&client, &format!("{}/broken/", server.uri())).await;
        assert!(matches!(broken, Err(AppError::Status { status: 500, .. })));
    }
}
