use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Credentials, RefreshCallback, Token, TokenStore};
use crate::config::ApiConfig;
use crate::error::{error_from_response, Error, Result};
use crate::http::{HttpClient, HttpRequest, HttpResponse, RequestBody, ReqwestClient};
use crate::locale::{is_valid_language, is_valid_timezone};
use crate::types::{
    Envelope, MediaStatus, MediaUpload, Member, Message, MessageFilters, MimeType,
    NewMemberOptions, Organization, ReviewEvent, Reviewer, SocialProfile,
};

/// Wire format for message timestamps, UTC.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const DEFAULT_MESSAGE_LIMIT: u32 = 50;

/// Ephemeral description of one API call, consumed by the dispatcher.
#[derive(Debug, Clone)]
struct ApiRequest {
    resource: String,
    method: Option<Method>,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            method: None,
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A client for the Hootsuite REST v1 API.
///
/// Generic over the HTTP implementation for testability; the default is
/// reqwest. Each call issues at most two HTTP requests: the original and,
/// after a 401 and an inline token refresh, one retry. There is no
/// background refresh task.
///
/// The client works through `&self` from async tasks, but the
/// refresh-and-retry protocol is not atomic across overlapping calls;
/// callers sharing one instance should serialize use.
pub struct HootsuiteClient<H: HttpClient = ReqwestClient> {
    http: Arc<H>,
    auth: TokenStore<H>,
    config: ApiConfig,
    timeout: Option<Duration>,
}

impl HootsuiteClient<ReqwestClient> {
    /// Creates a client with the production HTTP implementation.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_http_client(credentials, ReqwestClient::new())
    }
}

impl<H: HttpClient> HootsuiteClient<H> {
    /// Creates a client over a custom HTTP implementation.
    pub fn with_http_client(credentials: Credentials, http: H) -> Self {
        let http = Arc::new(http);
        let config = ApiConfig::default();
        let auth = TokenStore::new(http.clone(), config.clone(), credentials);
        Self {
            http,
            auth,
            config,
            timeout: None,
        }
    }

    /// Points the client at a different platform root.
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.auth.set_config(config.clone());
        self.config = config;
        self
    }

    /// Applies this timeout to every request that doesn't set its own.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registers a callback fired with every replacement token.
    pub fn with_refresh_callback(mut self, callback: RefreshCallback) -> Self {
        self.auth.set_refresh_callback(callback);
        self
    }

    /// Seeds the client with a previously obtained token.
    pub async fn set_token(&self, token: Token) {
        self.auth.set_token(token).await;
    }

    /// The last known token.
    pub async fn current_token(&self) -> Token {
        self.auth.current_token().await
    }

    /// The authorization URL the member must visit, with its `state`.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<(String, String)> {
        self.auth.authorization_url(state)
    }

    /// Exchanges an authorization code for the initial token.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        self.auth.exchange_code(code).await
    }

    /// Forces a refresh-token exchange.
    pub async fn refresh_token(&self) -> Result<Token> {
        self.auth.refresh().await
    }
}

// Dispatch
impl<H: HttpClient> HootsuiteClient<H> {
    /// Issues one API call, handling authentication transparently.
    ///
    /// In order: apply the client timeout when the descriptor has none,
    /// refresh proactively when the current token is stale, default the
    /// method from the body (`POST` with one, `GET` without), send with the
    /// current access token, and on a 401 refresh once and reissue the
    /// identical request. The second response stands whatever its status;
    /// anything other than 200 becomes a typed error.
    async fn dispatch(&self, request: ApiRequest) -> Result<HttpResponse> {
        let mut request = request;
        if request.timeout.is_none() {
            request.timeout = self.timeout;
        }

        if self.auth.current_token().await.is_stale() {
            self.auth.refresh().await?;
        }

        let method = request
            .method
            .clone()
            .unwrap_or(if request.body.is_some() {
                Method::POST
            } else {
                Method::GET
            });
        let url = self.resource_url(&request.resource, &request.query);

        tracing::debug!(%method, %url, "dispatching API request");
        let response = self
            .send(method.clone(), &url, request.body.as_ref(), request.timeout)
            .await?;

        let response = if response.is_unauthorized() {
            tracing::debug!(%url, "401 response, refreshing token and retrying once");
            self.auth.refresh().await?;
            self.send(method, &url, request.body.as_ref(), request.timeout)
                .await?
        } else {
            response
        };

        if response.status != 200 {
            return Err(error_from_response(&response));
        }
        Ok(response)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, url);
        request.bearer = Some(self.auth.current_token().await.access_token);
        request.body = body.map(|value| RequestBody::Json(value.clone()));
        request.timeout = timeout;
        self.http.send(request).await
    }

    /// Builds the full URL for a resource, encoding query parameters.
    fn resource_url(&self, resource: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}/{}", self.config.api_url(), resource);
        if !query.is_empty() {
            let encoded: Vec<String> = query
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect();
            url.push('?');
            url.push_str(&encoded.join("&"));
        }
        url
    }

    /// Dispatches and decodes the data envelope.
    async fn dispatch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.dispatch(request).await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&response.body).map_err(|e| Error::Protocol(e.to_string()))?;
        Ok(envelope.data)
    }

    /// Dispatches a call whose success carries no payload to decode.
    async fn dispatch_empty(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(request).await?;
        Ok(())
    }
}

// Member and organization endpoints
impl<H: HttpClient> HootsuiteClient<H> {
    /// Retrieves the currently authenticated member.
    pub async fn get_me(&self) -> Result<Member> {
        self.dispatch_json(ApiRequest::new("me")).await
    }

    /// Retrieves the organizations the authenticated member is in.
    pub async fn get_me_organizations(&self) -> Result<Vec<Organization>> {
        self.dispatch_json(ApiRequest::new("me/organizations")).await
    }

    /// Retrieves the social profiles the authenticated member has basic
    /// usage permissions on.
    pub async fn get_me_social_profiles(&self) -> Result<Vec<SocialProfile>> {
        self.dispatch_json(ApiRequest::new("me/socialProfiles")).await
    }

    /// Retrieves a member.
    pub async fn get_member(&self, member_id: &str) -> Result<Member> {
        self.dispatch_json(ApiRequest::new(format!("members/{member_id}")))
            .await
    }

    /// Retrieves the organizations a member is in.
    pub async fn get_member_organizations(&self, member_id: &str) -> Result<Vec<Organization>> {
        self.dispatch_json(ApiRequest::new(format!("members/{member_id}/organizations")))
            .await
    }

    /// Creates a member in one or more organizations.
    ///
    /// The language and timezone are validated locally and rejected before
    /// any network call.
    pub async fn create_member(
        &self,
        full_name: &str,
        email: &str,
        organization_ids: &[String],
        options: &NewMemberOptions,
    ) -> Result<Member> {
        if !is_valid_language(&options.language) {
            return Err(Error::InvalidLanguage(options.language.clone()));
        }
        if !is_valid_timezone(&options.timezone) {
            return Err(Error::InvalidTimezone(options.timezone.clone()));
        }

        let mut body = serde_json::Map::new();
        body.insert("fullName".to_string(), full_name.into());
        body.insert("email".to_string(), email.into());
        body.insert(
            "organizationIds".to_string(),
            serde_json::json!(organization_ids),
        );
        body.insert("timezone".to_string(), options.timezone.as_str().into());
        body.insert("language".to_string(), options.language.as_str().into());
        if let Some(company_name) = &options.company_name {
            body.insert("companyName".to_string(), company_name.as_str().into());
        }
        if let Some(bio) = &options.bio {
            body.insert("bio".to_string(), bio.as_str().into());
        }

        self.dispatch_json(ApiRequest::new("members").with_body(serde_json::Value::Object(body)))
            .await
    }
}

// Social profile endpoints
impl<H: HttpClient> HootsuiteClient<H> {
    /// Retrieves the social profiles the authenticated member has access to.
    pub async fn get_social_profiles(&self) -> Result<Vec<SocialProfile>> {
        self.dispatch_json(ApiRequest::new("socialProfiles")).await
    }

    /// Retrieves a social profile.
    pub async fn get_social_profile(&self, profile_id: i64) -> Result<SocialProfile> {
        self.dispatch_json(ApiRequest::new(format!("socialProfiles/{profile_id}")))
            .await
    }

    /// Retrieves the ids of teams with access to a social profile.
    pub async fn get_social_profile_teams(&self, profile_id: i64) -> Result<Vec<i64>> {
        self.dispatch_json(ApiRequest::new(format!("socialProfiles/{profile_id}/teams")))
            .await
    }
}

// Message endpoints
impl<H: HttpClient> HootsuiteClient<H> {
    /// Schedules a message to send on one or more social profiles at
    /// `send_time` (UTC).
    pub async fn schedule_message(
        &self,
        text: &str,
        social_profile_ids: &[String],
        send_time: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        self.schedule_message_with(text, social_profile_ids, send_time, serde_json::Map::new())
            .await
    }

    /// [`schedule_message`](Self::schedule_message) with provider
    /// passthrough fields (tags, targeting, location, ...) merged into the
    /// request body. Extra fields win over the defaults.
    pub async fn schedule_message_with(
        &self,
        text: &str,
        social_profile_ids: &[String],
        send_time: DateTime<Utc>,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<Message>> {
        let mut body = serde_json::Map::new();
        body.insert("text".to_string(), text.into());
        body.insert(
            "socialProfileIds".to_string(),
            serde_json::json!(social_profile_ids),
        );
        body.insert(
            "scheduledSendTime".to_string(),
            send_time.format(ISO_FORMAT).to_string().into(),
        );
        body.insert("emailNotification".to_string(), false.into());
        for (key, value) in extra {
            body.insert(key, value);
        }

        self.dispatch_json(
            ApiRequest::new("messages")
                .with_method(Method::POST)
                .with_body(serde_json::Value::Object(body)),
        )
        .await
    }

    /// Retrieves outbound messages scheduled between `start_time` and
    /// `end_time` (UTC).
    pub async fn get_outbound_messages(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        filters: &MessageFilters,
    ) -> Result<Vec<Message>> {
        let mut query = vec![
            (
                "startTime".to_string(),
                start_time.format(ISO_FORMAT).to_string(),
            ),
            (
                "endTime".to_string(),
                end_time.format(ISO_FORMAT).to_string(),
            ),
            (
                "limit".to_string(),
                filters.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT).to_string(),
            ),
        ];
        if let Some(state) = filters.state {
            query.push(("state".to_string(), state.as_str().to_string()));
        }
        if let Some(profile_ids) = &filters.social_profile_ids {
            for id in profile_ids {
                query.push(("socialProfileIds".to_string(), id.to_string()));
            }
        }
        if let Some(include) = filters.include_unscheduled_review_messages {
            query.push(("includeUnscheduledReviewMsgs".to_string(), include.to_string()));
        }

        self.dispatch_json(ApiRequest::new("messages").with_query(query))
            .await
    }

    /// Retrieves a message.
    pub async fn get_message(&self, message_id: &str) -> Result<Message> {
        self.dispatch_json(ApiRequest::new(format!("messages/{message_id}")))
            .await
    }

    /// Deletes a message. Success carries no payload.
    pub async fn delete_message(&self, message_id: &str) -> Result<()> {
        self.dispatch_empty(
            ApiRequest::new(format!("messages/{message_id}")).with_method(Method::DELETE),
        )
        .await
    }

    /// Approves a message awaiting review.
    pub async fn approve_message(
        &self,
        message_id: &str,
        sequence_number: i64,
        reviewer_type: Reviewer,
    ) -> Result<Vec<Message>> {
        let body = serde_json::json!({
            "sequenceNumber": sequence_number,
            "reviewerType": reviewer_type.as_str(),
        });
        self.dispatch_json(
            ApiRequest::new(format!("messages/{message_id}/approve"))
                .with_method(Method::POST)
                .with_body(body),
        )
        .await
    }

    /// Rejects a message awaiting review.
    pub async fn reject_message(
        &self,
        message_id: &str,
        reason: &str,
        sequence_number: i64,
        reviewer_type: Option<Reviewer>,
    ) -> Result<Vec<Message>> {
        let mut body = serde_json::Map::new();
        body.insert("reason".to_string(), reason.into());
        body.insert("sequenceNumber".to_string(), sequence_number.into());
        if let Some(reviewer) = reviewer_type {
            body.insert("reviewerType".to_string(), reviewer.as_str().into());
        }
        self.dispatch_json(
            ApiRequest::new(format!("messages/{message_id}/reject"))
                .with_method(Method::POST)
                .with_body(serde_json::Value::Object(body)),
        )
        .await
    }

    /// Retrieves a message's prescreening review history.
    pub async fn get_message_review_history(&self, message_id: &str) -> Result<Vec<ReviewEvent>> {
        self.dispatch_json(ApiRequest::new(format!("messages/{message_id}/history")))
            .await
    }
}

// Media endpoints
impl<H: HttpClient> HootsuiteClient<H> {
    /// Requests a presigned upload URL for a media file.
    ///
    /// The MIME type is validated against the allow list before any network
    /// call.
    pub async fn create_media_upload_url(
        &self,
        size_bytes: u64,
        mime_type: &str,
    ) -> Result<MediaUpload> {
        let mime: MimeType = mime_type.parse()?;
        let body = serde_json::json!({
            "sizeBytes": size_bytes,
            "mimeType": mime.as_str(),
        });
        self.dispatch_json(ApiRequest::new("media").with_body(body)).await
    }

    /// Retrieves the upload/transcode state of a media item.
    pub async fn get_media_upload_status(&self, media_id: &str) -> Result<MediaStatus> {
        self.dispatch_json(ApiRequest::new(format!("media/{media_id}")))
            .await
    }
}
