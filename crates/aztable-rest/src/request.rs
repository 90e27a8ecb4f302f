//! Request construction and signing.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use reqwest::header::{
    ACCEPT, ACCEPT_CHARSET, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName,
    HeaderValue, IF_MATCH,
};
use tracing::trace;
use url::Url;

use aztable_core::error::{ConfigurationError, InvalidInputError};
use aztable_core::types::ServiceEndpoint;
use aztable_core::{Error, Result};

use crate::auth::canonical::{canonical_headers, canonical_resource};
use crate::auth::{SharedKeySigner, SigningContext, SigningProfile};
use crate::error::transport_error;

/// Protocol version sent with every request.
pub const API_VERSION: &str = "2011-08-18";

/// Body and content type of every request.
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

const DATA_SERVICE_VERSION: &str = "2.0;NetFx";
const ENTITY_ACCEPT: &str = "application/atom+xml,application/xml";

/// Characters escaped in query names and values.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$');

/// One service call, before it is dated and signed.
///
/// # Example
///
/// ```
/// use aztable_rest::TableRequest;
///
/// let request = TableRequest::entity("GET", "Orders()")
///     .query("$top", "10")
///     .if_match("*");
/// assert_eq!(request.verb(), "GET");
/// assert_eq!(request.resource(), "Orders()");
/// ```
#[derive(Debug, Clone)]
pub struct TableRequest {
    verb: &'static str,
    resource: String,
    query: Vec<(String, String)>,
    body: Option<String>,
    if_match: Option<String>,
    profile: SigningProfile,
}

impl TableRequest {
    /// A request signed with the given profile.
    pub fn new(verb: &'static str, resource: impl Into<String>, profile: SigningProfile) -> Self {
        Self {
            verb,
            resource: resource.into(),
            query: Vec::new(),
            body: None,
            if_match: None,
            profile,
        }
    }

    /// A table metadata request (create, list or delete table).
    pub fn table(verb: &'static str, resource: impl Into<String>) -> Self {
        Self::new(verb, resource, SigningProfile::Table)
    }

    /// An entity request.
    pub fn entity(verb: &'static str, resource: impl Into<String>) -> Self {
        Self::new(verb, resource, SigningProfile::Entity)
    }

    /// Append a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Attach an XML body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Send `If-Match` with this token.
    pub fn if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    pub fn verb(&self) -> &'static str {
        self.verb
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn profile(&self) -> SigningProfile {
        self.profile
    }
}

/// Turns [`TableRequest`]s into signed HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: ServiceEndpoint,
    signer: SharedKeySigner,
}

impl RequestBuilder {
    pub fn new(endpoint: ServiceEndpoint, signer: SharedKeySigner) -> Self {
        Self { endpoint, signer }
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    /// Absolute URL of a request, query string included.
    pub fn url(&self, request: &TableRequest) -> Result<Url> {
        let raw = self.endpoint.resource_url(&request.resource);
        let mut url = Url::parse(&raw).map_err(|e| ConfigurationError::Endpoint {
            value: raw.clone(),
            reason: e.to_string(),
        })?;

        if !request.query.is_empty() {
            let query = request
                .query
                .iter()
                .map(|(name, value)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(name, QUERY_ESCAPE),
                        utf8_percent_encode(value, QUERY_ESCAPE)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    /// The complete header set, `Authorization` last.
    pub fn headers(&self, request: &TableRequest, url: &Url, now: DateTime<Utc>) -> Result<HeaderMap> {
        let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_length = request.body.as_ref().map_or(0, |b| b.len());

        let mut headers = HeaderMap::new();
        headers.insert(x_ms("x-ms-date"), header_value(&date)?);
        headers.insert(x_ms("x-ms-version"), HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(ATOM_CONTENT_TYPE));

        if request.profile == SigningProfile::Entity {
            headers.insert(
                HeaderName::from_static("dataserviceversion"),
                HeaderValue::from_static(DATA_SERVICE_VERSION),
            );
            headers.insert(
                HeaderName::from_static("maxdataserviceversion"),
                HeaderValue::from_static(DATA_SERVICE_VERSION),
            );
            headers.insert(ACCEPT, HeaderValue::from_static(ENTITY_ACCEPT));
        }
        if request.body.is_some() {
            headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("UTF-8"));
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        if let Some(ref etag) = request.if_match {
            headers.insert(IF_MATCH, header_value(etag)?);
        }

        let context = SigningContext {
            profile: request.profile,
            verb: request.verb,
            date: &date,
            content_type: ATOM_CONTENT_TYPE,
            content_length,
            if_match: request.if_match.as_deref(),
            content_md5: None,
            canonical_headers: canonical_headers(&headers),
            canonical_resource: canonical_resource(
                self.signer.account().as_str(),
                url,
                request.profile == SigningProfile::Entity,
            ),
        };
        headers.insert(AUTHORIZATION, header_value(&self.signer.authorization(&context))?);

        Ok(headers)
    }

    /// Build a dated, signed request ready to send.
    pub fn build(
        &self,
        client: &reqwest::Client,
        request: &TableRequest,
        now: DateTime<Utc>,
    ) -> Result<reqwest::Request> {
        let url = self.url(request)?;
        let headers = self.headers(request, &url, now)?;
        let method = Method::from_bytes(request.verb.as_bytes()).map_err(|e| {
            InvalidInputError::Other {
                message: format!("invalid HTTP verb '{}': {}", request.verb, e),
            }
        })?;

        trace!(verb = request.verb, %url, "built request");

        let mut builder = client.request(method, url).headers(headers);
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }
        builder.build().map_err(transport_error)
    }
}

fn x_ms(name: &'static str) -> HeaderName {
    HeaderName::from_static(name)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        Error::from(InvalidInputError::Other {
            message: format!("invalid header value '{}': {}", value, e),
        })
    })
}
