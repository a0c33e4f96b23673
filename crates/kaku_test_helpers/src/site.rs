//! A mock Kakuyomu origin backed by `wiremock`

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Local stand-in for `https://kakuyomu.jp`
pub struct MockSite {
    server: MockServer,
}

impl MockSite {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the client with
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Serve `html` for GET `route`
    pub async fn page(&self, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_response(200, html))
            .mount(&self.server)
            .await;
    }

    /// Serve `html` for GET `route` only when every query pair matches
    pub async fn page_with_query(&self, route: &str, query: &[(&str, &str)], html: String) {
        let mut mock = Mock::given(method("GET")).and(path(route));
        for (key, value) in query {
            mock = mock.and(query_param(*key, *value));
        }
        mock.respond_with(html_response(200, html))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Answer GET `route` with a bare status code
    pub async fn status(&self, route: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the site has received so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

fn html_response(status: u16, html: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(html.into_bytes(), "text/html; charset=utf-8")
}
