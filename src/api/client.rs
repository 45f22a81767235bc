//! Signed request dispatcher: builds the query, posts it, decodes the reply.

use crate::api::error::{ApiError, Result};
use crate::api::normalize::normalize;
use crate::api::protocol::{is_read_only_action, Clock, ProtocolConfig, SystemClock};
use crate::api::response::{interpret, VendorError};
use crate::api::signer::{Credentials, Signer};
use crate::api::transport::{HttpTransport, Transport};
use crate::api::tree::ResponseTree;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parameters the dispatcher injects itself; callers cannot override them.
pub const RESERVED_PARAMS: [&str; 7] = [
    "Action",
    "Timestamp",
    "AWSAccessKeyId",
    "Version",
    "SignatureVersion",
    "SignatureMethod",
    "Signature",
];

/// Connection settings for a [`QueryClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientSettings {
    /// Endpoint URL every request is posted to
    pub endpoint: String,
    /// Refuse actions that are not Get/List/Describe
    pub read_only: bool,
    /// Log every normalized response at debug level
    pub debug: bool,
    /// Request timeout, zero for the transport default
    pub timeout: Duration,
    /// Optional proxy URL
    pub proxy: Option<String>,
}

impl ClientSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), ..Default::default() }
    }
}

/// Client for the signed query API.
pub struct QueryClient {
    settings: ClientSettings,
    signer: Signer,
    protocol: ProtocolConfig,
    transport: Box<dyn Transport>,
    clock: Box<dyn Clock>,
}

impl QueryClient {
    /// Creates a client that talks HTTP through wreq.
    pub fn new(settings: ClientSettings, credentials: Credentials) -> Result<Self> {
        let transport = HttpTransport::new(settings.timeout, settings.proxy.as_deref())?;
        Self::with_transport(settings, credentials, Box::new(transport))
    }

    /// Creates a client over a custom transport (for testing).
    pub fn with_transport(
        settings: ClientSettings,
        credentials: Credentials,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let signer = Signer::new(&settings.endpoint, credentials)?;

        Ok(Self {
            settings,
            signer,
            protocol: ProtocolConfig::default(),
            transport,
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the clock used for `Timestamp`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the protocol constants.
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    pub fn access_key(&self) -> &str {
        &self.signer.credentials().access_key
    }

    pub fn is_read_only(&self) -> bool {
        self.settings.read_only
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Builds the complete, signed request body for `action`.
    ///
    /// Every key and value is percent-encoded on its own. The signature is
    /// computed over everything before it and appended last.
    pub fn signed_query(&self, action: &str, params: &BTreeMap<String, String>) -> String {
        let mut pairs = vec![encode_pair("Action", action)];

        for (key, value) in params {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                warn!("Ignoring reserved parameter {} passed to {}", key, action);
                continue;
            }
            pairs.push(encode_pair(key, value));
        }

        let timestamp = self.protocol.format_timestamp(self.clock.now());
        pairs.push(encode_pair("Timestamp", &timestamp));
        pairs.push(encode_pair("AWSAccessKeyId", self.access_key()));
        pairs.push(encode_pair("Version", &self.protocol.version));
        pairs.push(encode_pair("SignatureVersion", &self.protocol.signature_version));
        pairs.push(encode_pair("SignatureMethod", &self.protocol.signature_method));

        let mut query = pairs.join("&");
        let signature = self.signer.sign(&query);
        query.push('&');
        query.push_str(&encode_pair("Signature", &signature));
        query
    }

    /// Calls `action` and returns its interpreted payload.
    ///
    /// One attempt only. Transport failures come back as
    /// [`ApiError::Transport`]; bodies that are not XML as
    /// [`ApiError::Decode`]; vendor-reported failures as [`ApiError::Vendor`].
    pub async fn invoke(
        &self,
        action: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<ResponseTree> {
        if self.settings.read_only && !is_read_only_action(action) {
            return Err(ApiError::ReadOnly { action: action.to_string() });
        }

        let body = self.signed_query(action, params);

        info!("Invoking {}", action);
        let response = self
            .transport
            .post_form(&self.settings.endpoint, body)
            .await
            .map_err(ApiError::Transport)?;

        let tree = match ResponseTree::from_xml(&response.body) {
            Ok(tree) => normalize(tree),
            Err(e) if !response.is_success() => {
                warn!("{} failed with status {}: {}", action, response.status, e);
                return Err(ApiError::Status { status: response.status, body: response.body });
            }
            Err(e) => return Err(ApiError::Decode(e)),
        };

        if self.settings.debug {
            debug!("{} response: {}", action, tree.to_json_pretty());
        }

        if !response.is_success() && VendorError::from_tree(&tree).is_none() {
            warn!("{} failed with status {}", action, response.status);
            return Err(ApiError::Status { status: response.status, body: response.body });
        }

        interpret(action, tree)
    }
}

// Spaces go out as `%20`, not `+`; the signature covers the same bytes.
fn encode_pair(key: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
}
