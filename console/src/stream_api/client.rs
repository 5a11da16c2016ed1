//! The Cloudflare Stream API client.

use crate::config::Config;
use crate::error::{ConfigError, OperationError, OperationResult};
use crate::stream_api::{
    lifecycle::LifecycleStatus,
    live_inputs::{CreateLiveInput, CreateLiveInputRequest, LiveInput},
    types::{ApiEnvelope, ErrorEnvelope},
    videos::Video,
};
use crate::urls::customer_origin;
use http::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use tracing::instrument;

/// Client for the live input endpoints of the Cloudflare Stream API.
///
/// Every operation is a single request/response. Nothing is cached between calls, so the
/// client can be cloned and used concurrently without coordination. Failures never escape as
/// panics: each method returns an [`OperationResult`] whose error carries the message the
/// service gave, or the transport error if there was no response at all.
#[derive(Debug, Clone)]
pub struct StreamClient {
    config: Config,
    /// `{api_base_url}/accounts/{account_id}/stream`
    api_base: String,
    /// Replaces `https://customer-{code}.{domain}` for the status endpoint.
    delivery_origin: Option<String>,
    client: reqwest::Client,
}

impl StreamClient {
    /// Creates a client for the account in `config`.
    ///
    /// Fails, before any network traffic, if the account id or API token is missing.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Like [`StreamClient::new`], but sharing an existing HTTP client.
    pub fn with_http_client(config: Config, client: reqwest::Client) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            api_base: config.stream_api_base(),
            delivery_origin: None,
            config,
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Makes a bearer-authenticated request to `{api_base}{path}`.
    ///
    /// Transport failures and non-2xx statuses both come back as
    /// [`ErrorKind::RemoteRequest`](crate::ErrorKind::RemoteRequest).
    #[instrument(skip(self, json_body), level = tracing::Level::TRACE)]
    async fn make_authenticated_request(
        &self,
        method: Method,
        path: &str,
        json_body: Option<&impl Serialize>,
    ) -> OperationResult<reqwest::Response> {
        let url = format!("{}{}", self.api_base, path);

        let mut request = self.client.request(method.clone(), &url).header(
            "Authorization",
            format!("Bearer {}", self.config.api_token().expose_secret()),
        );

        if let Some(body) = json_body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = request.send().await.map_err(|e| {
            OperationError::remote(format!("send {method} request to Stream API: {e}"))
        })?;

        ensure_success(response).await
    }

    /// Makes an authenticated request and unwraps the `result` of the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        json_body: Option<&impl Serialize>,
    ) -> OperationResult<T> {
        let response = self
            .make_authenticated_request(method, path, json_body)
            .await?;

        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            OperationError::remote(format!("parse Stream API response as JSON: {e}"))
        })?;

        envelope
            .result
            .ok_or_else(|| OperationError::remote("Stream API response did not include a result"))
    }

    /// Creates a live input.
    ///
    /// Unset fields of `input` get their defaults (see [`CreateLiveInputRequest`]). The
    /// retention period is forwarded as given; the service enforces its valid range.
    ///
    /// # API Reference
    ///
    /// <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/methods/create/>
    #[instrument(skip(self))]
    pub async fn create_live_input(&self, input: &CreateLiveInput) -> OperationResult<LiveInput> {
        let body = CreateLiveInputRequest::from(input);
        let live_input: LiveInput = self
            .call(Method::POST, "/live_inputs", Some(&body))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to create live input"))?;

        tracing::debug!(uid = live_input.uid, "created live input");
        Ok(live_input)
    }

    /// Lists every live input on the account.
    ///
    /// # API Reference
    ///
    /// <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/methods/list/>
    #[instrument(skip(self))]
    pub async fn list_live_inputs(&self) -> OperationResult<Vec<LiveInput>> {
        let inputs: Vec<LiveInput> = self
            .call(Method::GET, "/live_inputs", None::<&()>)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch live inputs"))?;

        tracing::debug!(returned_items = inputs.len(), "fetched live inputs");
        Ok(inputs)
    }

    /// Fetches a single live input, including its connection credentials.
    ///
    /// # API Reference
    ///
    /// <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/methods/get/>
    #[instrument(skip(self))]
    pub async fn get_live_input(&self, input_id: &str) -> OperationResult<LiveInput> {
        let input_id = path_segment(input_id)?;
        let live_input: LiveInput = self
            .call(Method::GET, &format!("/live_inputs/{input_id}"), None::<&()>)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch live input"))?;

        tracing::debug!(uid = live_input.uid, "fetched live input");
        Ok(live_input)
    }

    /// Lists the videos recorded from a live input.
    ///
    /// # API Reference
    ///
    /// <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/>
    #[instrument(skip(self))]
    pub async fn list_live_input_videos(&self, input_id: &str) -> OperationResult<Vec<Video>> {
        let input_id = path_segment(input_id)?;
        let videos: Vec<Video> = self
            .call(
                Method::GET,
                &format!("/live_inputs/{input_id}/videos"),
                None::<&()>,
            )
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch live input videos"))?;

        tracing::debug!(returned_items = videos.len(), "fetched live input videos");
        Ok(videos)
    }

    /// Checks whether a live input is currently receiving a broadcast.
    ///
    /// Unlike every other operation this goes to the per-customer playback host and sends no
    /// credentials: the lifecycle endpoint is public. It needs a configured customer code.
    #[instrument(skip(self), ret)]
    pub async fn get_live_input_status(&self, input_id: &str) -> OperationResult<LifecycleStatus> {
        let input_id = path_segment(input_id)?;
        let origin = match &self.delivery_origin {
            Some(origin) => origin.clone(),
            None => customer_origin(
                self.config.delivery_domain(),
                self.config.customer_code().unwrap_or_default(),
            )?,
        };
        let url = format!("{origin}/{input_id}/lifecycle");

        let status = self
            .fetch_lifecycle(&url)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to check live input status"))?;

        tracing::debug!(live = status.live, "checked live input status");
        Ok(status)
    }

    /// Unauthenticated GET of a lifecycle document.
    async fn fetch_lifecycle(&self, url: &str) -> OperationResult<LifecycleStatus> {
        let response =
            self.client.get(url).send().await.map_err(|e| {
                OperationError::remote(format!("send GET request to {url}: {e}"))
            })?;

        // The lifecycle host has no v4 envelope to read an error message from.
        let status_code = response.status();
        if !status_code.is_success() {
            return Err(status_error(status_code));
        }

        response
            .json()
            .await
            .map_err(|e| OperationError::remote(format!("parse lifecycle response as JSON: {e}")))
    }

    /// Deletes a live input. Its recorded videos are not deleted.
    ///
    /// # API Reference
    ///
    /// <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/methods/delete/>
    #[instrument(skip(self))]
    pub async fn delete_live_input(&self, input_id: &str) -> OperationResult<()> {
        let input_id = path_segment(input_id)?;
        self.make_authenticated_request(
            Method::DELETE,
            &format!("/live_inputs/{input_id}"),
            None::<&()>,
        )
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "failed to delete live input"))?;

        tracing::debug!(uid = %input_id, "deleted live input");
        Ok(())
    }
}

/// Turns a non-2xx response into an error, preferring the message in its body.
async fn ensure_success(response: reqwest::Response) -> OperationResult<reqwest::Response> {
    let status_code = response.status();
    if status_code.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ErrorEnvelope::first_message(&body)
        .map(OperationError::remote)
        .unwrap_or_else(|| status_error(status_code)))
}

fn status_error(status_code: reqwest::StatusCode) -> OperationError {
    OperationError::remote(format!(
        "Request failed with status code {}",
        status_code.as_u16()
    ))
}

/// Trims and percent-encodes an id so it stays a single path segment.
fn path_segment(input_id: &str) -> OperationResult<Cow<'_, str>> {
    let input_id = input_id.trim();
    if input_id.is_empty() {
        return Err(OperationError::invalid_input("Please enter a valid Input ID"));
    }
    Ok(urlencoding::encode(input_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stream_api::live_inputs::RecordingMode;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use wiremock::{
        Mock, MockServer, Request, Respond, ResponseTemplate,
        matchers::{body_json, header, method, path, path_regex},
    };

    const BASE: &str = "/accounts/acct/stream";

    fn client_for(server: &MockServer) -> StreamClient {
        let config = Config::new("acct", "test-token", "abc123").with_api_base_url(server.uri());
        StreamClient::new(config).unwrap()
    }

    fn envelope(result: Value) -> Value {
        json!({ "result": result, "success": true, "errors": [], "messages": [] })
    }

    fn live_input_json(uid: &str, name: &str) -> Value {
        json!({
            "uid": uid,
            "meta": { "name": name },
            "created": "2025-01-02T02:20:00Z",
            "modified": "2025-01-02T02:20:00Z",
            "recording": { "mode": "automatic", "requireSignedURLs": false, "allowedOrigins": null },
            "deleteRecordingAfterDays": null,
            "rtmps": { "url": "rtmps://live.cloudflare.com:443/live/", "streamKey": format!("key-{uid}") },
            "status": null
        })
    }

    #[test]
    fn construction_requires_credentials() {
        let err = StreamClient::new(Config::new("", "", "abc")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: CLOUDFLARE_ACCOUNT_ID, CLOUDFLARE_API_TOKEN"
        );
    }

    #[tokio::test]
    async fn create_with_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{BASE}/live_inputs")))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(json!({
                "meta": { "name": "Live Stream" },
                "recording": { "mode": "automatic", "requireSignedURLs": false, "allowedOrigins": null },
                "deleteRecordingAfterDays": null,
                "preferLowLatency": false
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(envelope(live_input_json("uid-1", "Live Stream"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let input = client_for(&server)
            .create_live_input(&CreateLiveInput::default())
            .await
            .unwrap();
        assert_eq!(input.uid, "uid-1");
        assert_eq!(input.name(), Some("Live Stream"));
        assert_eq!(input.recording_mode(), RecordingMode::Automatic);
        assert_eq!(
            input.rtmps.map(|r| r.stream_key),
            Some("key-uid-1".to_string())
        );
    }

    #[tokio::test]
    async fn create_forwards_retention_unmodified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{BASE}/live_inputs")))
            .and(body_json(json!({
                "meta": { "name": "Demo" },
                "recording": { "mode": "automatic", "requireSignedURLs": false, "allowedOrigins": null },
                "deleteRecordingAfterDays": 45,
                "preferLowLatency": false
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(live_input_json("uid-2", "Demo"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let input = client_for(&server)
            .create_live_input(&CreateLiveInput {
                name: Some("Demo".into()),
                delete_recording_after_days: Some(45),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(input.uid, "uid-2");
    }

    #[tokio::test]
    async fn error_message_comes_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/live_inputs/missing")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "result": null,
                "success": false,
                "errors": [{ "code": 10003, "message": "Live input not found" }],
                "messages": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_live_input("missing")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
        assert_eq!(err.message, "Live input not found");
    }

    #[tokio::test]
    async fn error_message_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/live_inputs")))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_live_inputs().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
        assert_eq!(err.message, "Request failed with status code 502");
    }

    #[tokio::test]
    async fn rejected_create_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{BASE}/live_inputs")))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "result": null,
                "success": false,
                "errors": [{ "code": 10005, "message": "deleteRecordingAfterDays must be at least 30" }],
                "messages": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_live_input(&CreateLiveInput {
                delete_recording_after_days: Some(5),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
        assert_eq!(err.message, "deleteRecordingAfterDays must be at least 30");
    }

    #[tokio::test]
    async fn failed_video_listing_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/live_inputs/uid-1/videos")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_live_input_videos("uid-1")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
        assert_eq!(err.message, "Request failed with status code 500");
    }

    #[tokio::test]
    async fn failed_status_check_reports_only_the_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uid-1/lifecycle"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errors": [{ "code": 10003, "message": "Not Found" }]
            })))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.delivery_origin = Some(server.uri());

        let err = client.get_live_input_status("uid-1").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
        assert_eq!(err.message, "Request failed with status code 404");
    }

    #[tokio::test]
    async fn ids_stay_inside_their_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/live_inputs/x%2Fvideos")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(live_input_json("x/videos", "Odd"))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/live_inputs/a%3Fb")))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let input = client.get_live_input("x/videos").await.unwrap();
        assert_eq!(input.uid, "x/videos");
        client.delete_live_input("a?b").await.unwrap();
    }

    #[tokio::test]
    async fn unauthorized_delete_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/live_inputs/uid-1")))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "result": null,
                "success": false,
                "errors": [{ "code": 10000, "message": "Authentication error" }],
                "messages": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_live_input("uid-1")
            .await
            .unwrap_err();
        assert_eq!(err.message, "Authentication error");
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        // Nothing listens on port 1.
        let config =
            Config::new("acct", "test-token", "abc123").with_api_base_url("http://127.0.0.1:1");
        let client = StreamClient::new(config).unwrap();

        let err = client.list_live_inputs().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
        assert!(err.message.starts_with("send GET request to Stream API"));
    }

    #[tokio::test]
    async fn missing_result_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/live_inputs/uid-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_live_input("uid-1")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteRequest);
    }

    #[tokio::test]
    async fn empty_id_never_reaches_the_network() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        for err in [
            client.get_live_input("  ").await.unwrap_err(),
            client.list_live_input_videos("").await.unwrap_err(),
            client.delete_live_input("").await.unwrap_err(),
            client.get_live_input_status("").await.unwrap_err(),
        ] {
            assert_eq!(err.kind, ErrorKind::InputValidation);
        }
        assert_eq!(server.received_requests().await.map(|r| r.len()), Some(0));
    }

    #[tokio::test]
    async fn list_videos() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/live_inputs/uid-1/videos")))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
                { "uid": "v1", "meta": { "name": "First" }, "status": { "state": "ready" } },
                { "uid": "v2", "status": { "state": "live-inprogress" } }
            ]))))
            .mount(&server)
            .await;

        let videos = client_for(&server)
            .list_live_input_videos("uid-1")
            .await
            .unwrap();
        assert_eq!(
            videos.iter().map(|v| v.uid.as_str()).collect::<Vec<_>>(),
            ["v1", "v2"]
        );
        assert!(!videos[0].is_live());
        assert!(videos[1].is_live());
    }

    #[tokio::test]
    async fn status_goes_unauthenticated_to_the_customer_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uid-1/lifecycle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isInput": true,
                "videoUID": "v2",
                "live": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.delivery_origin = Some(server.uri());

        let status = client.get_live_input_status("uid-1").await.unwrap();
        assert!(status.live);
        assert_eq!(status.video_uid.as_deref(), Some("v2"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn status_requires_customer_code() {
        let config = Config::new("acct", "test-token", "");
        let err = StreamClient::new(config)
            .unwrap()
            .get_live_input_status("uid-1")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InputValidation);
        assert_eq!(err.message, "Customer code not configured");
    }

    /// A tiny stand-in for the live input collection that remembers creates and deletes.
    #[derive(Clone, Default)]
    struct FakeLiveInputs {
        inputs: Arc<Mutex<Vec<Value>>>,
    }

    impl Respond for FakeLiveInputs {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let mut inputs = self.inputs.lock().unwrap();
            let id = request
                .url
                .path()
                .strip_prefix(&format!("{BASE}/live_inputs/"))
                .map(str::to_string);

            match (request.method.as_str(), id) {
                ("POST", None) => {
                    let body: Value = serde_json::from_slice(&request.body).unwrap();
                    let uid = format!("uid-{}", inputs.len() + 1);
                    let name = body["meta"]["name"].as_str().unwrap_or_default();
                    let input = live_input_json(&uid, name);
                    inputs.push(input.clone());
                    ResponseTemplate::new(201).set_body_json(envelope(input))
                }
                ("GET", None) => {
                    ResponseTemplate::new(200).set_body_json(envelope(Value::from(inputs.clone())))
                }
                ("DELETE", Some(id)) => {
                    inputs.retain(|i| i["uid"] != id.as_str());
                    ResponseTemplate::new(200).set_body_json(envelope(Value::Null))
                }
                _ => ResponseTemplate::new(405),
            }
        }
    }

    #[tokio::test]
    async fn deleted_input_disappears_from_list() {
        let server = MockServer::start().await;
        Mock::given(path_regex(format!("^{BASE}/live_inputs(/[^/]+)?$")))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(FakeLiveInputs::default())
            .mount(&server)
            .await;
        let client = client_for(&server);

        let keep = client
            .create_live_input(&CreateLiveInput {
                name: Some("Keep".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let created = client
            .create_live_input(&CreateLiveInput {
                name: Some("Test1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.name(), Some("Test1"));

        let before = client.list_live_inputs().await.unwrap();
        assert!(before.iter().any(|i| i.uid == created.uid));

        client.delete_live_input(&created.uid).await.unwrap();

        let after = client.list_live_inputs().await.unwrap();
        assert!(after.iter().all(|i| i.uid != created.uid));
        assert!(after.iter().any(|i| i.uid == keep.uid));
    }
}
