//! HTTP client for the REG.RU API2.

use async_trait::async_trait;
use regru_core::{
    ensure_non_reseller, normalize_method, ApiResponse, EffectiveConfig, Params, RegruError,
};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Linear backoff step: attempt `n` is followed by a `n * 150ms` pause.
pub const BACKOFF_STEP_MS: u64 = 150;

/// Delay after the given (1-based) failed attempt.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_STEP_MS * u64::from(attempt))
}

/// Raw HTTP outcome of one attempt, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one form-encoded POST.
///
/// Implementations report connection-level failures as
/// [`RegruError::Transport`]; status codes and bodies are judged by the
/// client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<RawResponse, RegruError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("regru-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<RawResponse, RegruError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| RegruError::transport(e.to_string(), None))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RegruError::transport(e.to_string(), None))?;

        Ok(RawResponse { status, body })
    }
}

/// One API invocation: method, parameters, and the config it runs under.
#[derive(Debug, Clone)]
pub struct ApiCall<'a> {
    method: String,
    params: Params,
    config: &'a EffectiveConfig,
    require_auth: bool,
}

impl<'a> ApiCall<'a> {
    /// Authenticated call with no parameters.
    pub fn new(method: impl Into<String>, config: &'a EffectiveConfig) -> Self {
        Self {
            method: method.into(),
            params: Params::new(),
            config,
            require_auth: true,
        }
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Do not attach (or require) credentials.
    pub fn without_auth(mut self) -> Self {
        self.require_auth = false;
        self
    }
}

/// Client for the REG.RU API2.
///
/// Handles the whole request path for a call:
/// - Reseller-method policy check before anything is sent
/// - Form construction with `output_format=json` and credentials
/// - Per-attempt timeout, aborting the in-flight request
/// - Retries on transport failures with linear backoff
///
/// The decoded body is returned as-is; use
/// [`ApiResponse::ensure_success`] (or [`RegruClient::call_checked`]) to
/// classify it.
///
/// # Examples
///
/// ```no_run
/// use regructl::client::{ApiCall, RegruClient};
/// use regru_core::{config, EffectiveConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = EffectiveConfig::from_merged(config::defaults())?;
/// let client = RegruClient::new()?;
///
/// let response = client
///     .call_checked(ApiCall::new("service/get_list", &config).param("servtype", "domain"))
///     .await?;
/// println!("{} domains", response.domains().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegruClient<T = HttpTransport> {
    transport: T,
}

impl RegruClient<HttpTransport> {
    /// Create a client on top of a fresh `reqwest` transport.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?))
    }
}

impl<T: Transport> RegruClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Execute a call and return the decoded body without interpreting it.
    ///
    /// # Errors
    ///
    /// - [`RegruError::Policy`] for reseller methods, before any I/O
    /// - [`RegruError::Auth`] when credentials are required but missing
    /// - [`RegruError::Timeout`] / [`RegruError::Transport`] when every
    ///   attempt failed; the last failure wins
    pub async fn call(&self, call: ApiCall<'_>) -> Result<ApiResponse, RegruError> {
        let method = normalize_method(&call.method);
        ensure_non_reseller(&method)?;

        let config = call.config;
        let form = Self::build_form(&call, config)?;
        let url = config.method_url(&method);
        let max_attempts = config.retries.saturating_add(1).max(1);

        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(%method, attempt, max_attempts, "sending API request");

            match self.attempt(&url, &form, config.timeout).await {
                Ok(response) => {
                    debug!(%method, attempt, result = ?response.result(), "API responded");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(%method, attempt, max_attempts, error = %e, "API attempt failed");
                    last_error = Some(e);

                    if attempt < max_attempts {
                        let delay = backoff_delay(attempt);
                        debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RegruError::transport("API request failed.", None)))
    }

    /// [`call`](Self::call) followed by response classification.
    pub async fn call_checked(&self, call: ApiCall<'_>) -> Result<ApiResponse, RegruError> {
        self.call(call).await?.ensure_success()
    }

    fn build_form(call: &ApiCall<'_>, config: &EffectiveConfig) -> Result<Vec<(String, String)>, RegruError> {
        let mut params = call.params.clone();
        params.insert("output_format".to_string(), "json".to_string());

        if call.require_auth {
            let (Some(username), Some(password)) = (&config.username, &config.password) else {
                return Err(RegruError::Auth(
                    "Username/password are missing. Set via `regru cfg set username <value>` and \
                     `printf \"...\" | regru cfg set password -`, or env REGRU_USERNAME/REGRU_PASSWORD."
                        .to_string(),
                ));
            };
            params.insert("username".to_string(), username.clone());
            params.insert("password".to_string(), password.clone());
        }

        Ok(params.into_iter().collect())
    }

    /// One attempt, bounded by the timeout. Dropping the transport future on
    /// timeout aborts the request.
    async fn attempt(
        &self,
        url: &str,
        form: &[(String, String)],
        timeout_ms: u64,
    ) -> Result<ApiResponse, RegruError> {
        let raw = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.transport.post_form(url, form),
        )
        .await
        .map_err(|_| RegruError::Timeout { timeout_ms })??;

        Self::decode(raw)
    }

    fn decode(raw: RawResponse) -> Result<ApiResponse, RegruError> {
        let payload: Value = match serde_json::from_str(&raw.body) {
            Ok(payload) => payload,
            Err(_) => {
                return Err(RegruError::transport(
                    format!("Unexpected non-JSON response from API ({}).", raw.status),
                    Some(serde_json::json!({ "raw": raw.body })),
                ))
            }
        };

        if !(200..300).contains(&raw.status) {
            return Err(RegruError::transport(
                format!("HTTP {} from API.", raw.status),
                Some(payload),
            ));
        }

        match payload {
            Value::Object(body) => Ok(ApiResponse::new(body)),
            other => Err(RegruError::transport(
                format!("Unexpected non-object JSON response from API ({}).", raw.status),
                Some(serde_json::json!({ "raw": other })),
            )),
        }
    }
}
