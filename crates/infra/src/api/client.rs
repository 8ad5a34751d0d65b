//! Document API client
//!
//! Implements [`DocumentApi`] over HTTP. Every call carries the session's
//! bearer token and runs through the retrying [`HttpClient`].

use async_trait::async_trait;
use capture_core::DocumentApi;
use capture_domain::{
    CaptureError, Document, ErrorEvent, ExtractionFeedback, ExtractionsContainer, PageImageSize,
    Payment, RemoteDocument, ResolvePaymentInput, Result, RetryPolicy, Session,
};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use super::errors::ApiError;
use crate::http::HttpClient;

/// Media type of document API v2 JSON payloads
pub const MEDIA_TYPE_JSON_V2: &str = "application/vnd.gini.v2+json";
/// Media type of the payment and event endpoints
pub const MEDIA_TYPE_JSON_V1: &str = "application/vnd.gini.v1+json";
const MEDIA_TYPE_JPEG: &str = "image/jpeg";

/// HTTP implementation of [`DocumentApi`]
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for `base_url` using `policy` for every request
    ///
    /// # Errors
    /// Returns [`CaptureError::Config`] for an unparsable base URL.
    pub fn new(base_url: &str, policy: RetryPolicy) -> Result<Self> {
        let http = HttpClient::builder().retry_policy(policy).build()?;
        Self::with_http_client(base_url, http)
    }

    /// Create a client around an existing [`HttpClient`]
    pub fn with_http_client(base_url: &str, http: HttpClient) -> Result<Self> {
        Ok(Self { http, base_url: parse_base_url(base_url)? })
    }

    /// Base URL all document paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CaptureError::Config(format!("invalid API path {path}: {e}")))
    }

    /// Base URL extended with `segments`, each percent-encoded as one segment
    ///
    /// Identifiers come from callers, so `/` inside one cannot reach another
    /// resource. Empty and dot segments are rejected.
    fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
            return Err(CaptureError::Validation(format!("invalid resource identifier {bad:?}")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CaptureError::Config(format!("base URL {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, bearer(session.access_token()))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.http.send(builder).await?;
        ensure_success(response, ApiError::from_status).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        url: Url,
        media_type: &'static str,
    ) -> Result<T> {
        let request = self.authorized(Method::GET, url, session).header(ACCEPT, media_type);
        read_json(self.execute(request).await?).await
    }
}

/// `Authorization` header value in the `BEARER <token>` form
pub(crate) fn bearer(token: &str) -> String {
    format!("BEARER {token}")
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let normalized =
        if base_url.ends_with('/') { base_url.to_string() } else { format!("{base_url}/") };
    Url::parse(&normalized)
        .map_err(|e| CaptureError::Config(format!("invalid base URL {base_url}: {e}")))
}

/// Turn a non-success response into a classified error
pub(crate) async fn ensure_success(
    response: Response,
    classify: fn(StatusCode, &str, &str) -> ApiError,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &url, &body).into())
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().clone();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CaptureError::Network(format!("failed to read response from {url}: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Decode(format!("{url} returned unexpected body: {e}")).into())
}

fn document_id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl DocumentApi for ApiClient {
    #[instrument(skip(self, session, document), fields(filename = %document.filename, bytes = document.len()))]
    async fn create_document(
        &self,
        session: &Session,
        document: &Document,
    ) -> Result<RemoteDocument> {
        let mut url = self.url("documents/")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("filename", &document.filename);
            if let Some(doc_type) = &document.doc_type {
                query.append_pair("doctype", doc_type);
            }
        }

        let content_type = HeaderValue::from_str(&document.mime_type).map_err(|_| {
            CaptureError::Validation(format!("invalid mime type {}", document.mime_type))
        })?;
        let request = self
            .authorized(Method::POST, url, session)
            .header(ACCEPT, MEDIA_TYPE_JSON_V2)
            .header(CONTENT_TYPE, content_type)
            .body(document.data.clone());
        let response = self.execute(request).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(document_id_from_location);
        let mut remote = match location {
            Some(id) => RemoteDocument::pending(id),
            None => read_json(response).await?,
        };
        if remote.name.is_none() {
            remote.name = Some(document.filename.clone());
        }
        info!(document_id = %remote.id, "document created");
        Ok(remote)
    }

    async fn get_document(&self, session: &Session, document_id: &str) -> Result<RemoteDocument> {
        let document: RemoteDocument =
            self.get_json(session, self.resource_url(&["documents", document_id])?, MEDIA_TYPE_JSON_V2)
                .await?;
        debug!(document_id, state = %document.processing_state, "document state fetched");
        Ok(document)
    }

    async fn get_extractions(
        &self,
        session: &Session,
        document_id: &str,
    ) -> Result<ExtractionsContainer> {
        let url = self.resource_url(&["documents", document_id, "extractions"])?;
        self.get_json(session, url, MEDIA_TYPE_JSON_V2).await
    }

    #[instrument(skip(self, session, feedback))]
    async fn send_feedback(
        &self,
        session: &Session,
        document_id: &str,
        feedback: &ExtractionFeedback,
    ) -> Result<()> {
        let url = self.resource_url(&["documents", document_id, "extractions", "feedback"])?;
        let body = serde_json::to_vec(&feedback.to_request_body())?;
        let request = self
            .authorized(Method::POST, url, session)
            .header(ACCEPT, MEDIA_TYPE_JSON_V2)
            .header(CONTENT_TYPE, MEDIA_TYPE_JSON_V2)
            .body(body);
        self.execute(request).await?;
        info!(document_id, extractions = feedback.extractions.len(), "feedback sent");
        Ok(())
    }

    async fn delete_document(&self, session: &Session, document_id: &str) -> Result<()> {
        let url = self.resource_url(&["documents", document_id])?;
        self.execute(self.authorized(Method::DELETE, url, session)).await?;
        info!(document_id, "document deleted");
        Ok(())
    }

    async fn page_image(
        &self,
        session: &Session,
        document_id: &str,
        page: u32,
        size: PageImageSize,
    ) -> Result<Vec<u8>> {
        let (page_segment, size_segment) = (page.to_string(), size.to_string());
        let url = self.resource_url(&["documents", document_id, "pages", &page_segment, &size_segment])?;
        let request = self.authorized(Method::GET, url, session).header(ACCEPT, MEDIA_TYPE_JPEG);
        let response = self.execute(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CaptureError::Network(format!("failed to read page image: {e}")))?;
        debug!(document_id, page, bytes = bytes.len(), "page image fetched");
        Ok(bytes.to_vec())
    }

    async fn resolve_payment(
        &self,
        session: &Session,
        request_id: &str,
        input: &ResolvePaymentInput,
    ) -> Result<Payment> {
        let url = self.resource_url(&["paymentRequests", request_id, "payment"])?;
        let request = self
            .authorized(Method::POST, url, session)
            .header(ACCEPT, MEDIA_TYPE_JSON_V1)
            .header(CONTENT_TYPE, MEDIA_TYPE_JSON_V1)
            .body(serde_json::to_vec(input)?);
        read_json(self.execute(request).await?).await
    }

    async fn payment(&self, session: &Session, request_id: &str) -> Result<Payment> {
        let url = self.resource_url(&["paymentRequests", request_id, "payment"])?;
        self.get_json(session, url, MEDIA_TYPE_JSON_V1).await
    }

    async fn log_error_event(&self, session: &Session, event: &ErrorEvent) -> Result<()> {
        let url = self.url("events/error")?;
        let request = self
            .authorized(Method::POST, url, session)
            .header(CONTENT_TYPE, MEDIA_TYPE_JSON_V1)
            .body(serde_json::to_vec(event)?);
        self.execute(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn session() -> Session {
        Session::from_expires_in("test-token", 3600)
    }

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), RetryPolicy::default()).expect("api client")
    }

    #[test]
    fn test_document_id_from_location() {
        assert_eq!(
            document_id_from_location("https://api.example.test/documents/abc-123"),
            Some("abc-123".to_string())
        );
        assert_eq!(document_id_from_location("/documents/abc/"), Some("abc".to_string()));
        assert_eq!(document_id_from_location(""), None);
    }

    #[test]
    fn test_identifiers_stay_in_one_segment() {
        let client = ApiClient::new("https://api.example.test/v2", RetryPolicy::default()).unwrap();

        let url = client.resource_url(&["documents", "a/../b", "extractions"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/v2/documents/a%2F..%2Fb/extractions");

        for bad in ["..", ".", ""] {
            let result = client.resource_url(&["documents", bad]);
            assert!(matches!(result, Err(CaptureError::Validation(_))), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("https://api.example.test/v2").unwrap();
        assert_eq!(url.join("documents/1").unwrap().as_str(), "https://api.example.test/v2/documents/1");
        assert!(matches!(parse_base_url("not a url"), Err(CaptureError::Config(_))));
    }

    #[tokio::test]
    async fn test_create_document_reads_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/"))
            .and(query_param("filename", "invoice.pdf"))
            .and(query_param("doctype", "Invoice"))
            .and(header("Authorization", "BEARER test-token"))
            .and(header("Content-Type", "application/pdf"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", format!("{}/documents/doc-42", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let document =
            Document::from_bytes(b"%PDF".to_vec(), "invoice.pdf").with_doc_type("Invoice");
        let remote = client(&server).await.create_document(&session(), &document).await.unwrap();

        assert_eq!(remote.id, "doc-42");
        assert_eq!(remote.name.as_deref(), Some("invoice.pdf"));
    }

    #[tokio::test]
    async fn test_get_document_parses_progress() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/doc-1"))
            .and(header("Accept", MEDIA_TYPE_JSON_V2))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "doc-1",
                "progress": "COMPLETED",
                "name": "scan.jpg",
                "pageCount": 1
            })))
            .mount(&server)
            .await;

        let remote = client(&server).await.get_document(&session(), "doc-1").await.unwrap();

        assert_eq!(remote.processing_state, capture_domain::ProcessingState::Completed);
        assert_eq!(remote.page_count, Some(1));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/doc-1/extractions"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).await.get_extractions(&session(), "doc-1").await;

        assert!(matches!(result, Err(CaptureError::Auth(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/doc-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = client(&server).await.get_document(&session(), "doc-1").await;

        assert!(matches!(result, Err(CaptureError::Decode(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn test_send_feedback_uses_plain_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/doc-1/extractions/feedback"))
            .and(body_json(serde_json::json!({
                "feedback": { "amountToPay": { "value": "13.99:EUR", "entity": "amount" } }
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut feedback = ExtractionFeedback::default();
        feedback.extractions.insert(
            "amountToPay".into(),
            capture_domain::Extraction::new("13.99:EUR", "amount"),
        );
        client(&server).await.send_feedback(&session(), "doc-1", &feedback).await.unwrap();
    }

    #[tokio::test]
    async fn test_page_image_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/doc-1/pages/1/750x900"))
            .and(header("Accept", "image/jpeg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let bytes = client(&server)
            .await
            .page_image(&session(), "doc-1", 1, PageImageSize { width: 750, height: 900 })
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_resolve_payment_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/paymentRequests/req-1/payment"))
            .and(header("Content-Type", MEDIA_TYPE_JSON_V1))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "paidAt": "2024-05-01T10:00:00Z",
                "recipient": "Dr. Martin Bahnhof",
                "iban": "DE02300209000106531065",
                "amount": "335.50:EUR",
                "purpose": "ReNr AZ356789Z"
            })))
            .mount(&server)
            .await;

        let input = ResolvePaymentInput {
            recipient: "Dr. Martin Bahnhof".into(),
            iban: "DE02300209000106531065".into(),
            bic: None,
            amount: "335.50:EUR".into(),
            purpose: "ReNr AZ356789Z".into(),
        };
        let payment =
            client(&server).await.resolve_payment(&session(), "req-1", &input).await.unwrap();

        assert_eq!(payment.paid_at, "2024-05-01T10:00:00Z");
        assert_eq!(payment.bic, None);
    }
}
