//! WhatsApp delivery through Twilio or the Meta Cloud API.
//!
//! Transient failures are retried with exponential backoff (1 s, 2 s, 4 s).
//! A 4xx response means the request itself is wrong (bad number, bad
//! credentials) and fails immediately.

use std::time::Duration;

use async_trait::async_trait;
use orta_core::phone;

use super::{DeliveryChannel, DeliveryError, OutboundMessage};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const META_API_BASE: &str = "https://graph.facebook.com";
const DEFAULT_META_API_VERSION: &str = "v17.0";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WhatsAppError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("WhatsApp provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

impl WhatsAppError {
    /// Client errors are not worth retrying.
    fn is_permanent(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => (400..500).contains(status),
            Self::InvalidPhone(_) => true,
            Self::Request(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// WhatsAppConfig
// ---------------------------------------------------------------------------

/// Provider credentials.
#[derive(Debug, Clone)]
pub enum WhatsAppConfig {
    Twilio {
        account_sid: String,
        auth_token: String,
        /// Sender number, with or without the `whatsapp:` prefix.
        from_number: String,
    },
    Meta {
        access_token: String,
        phone_number_id: String,
        api_version: String,
    },
}

impl WhatsAppConfig {
    /// Load configuration from environment variables.
    ///
    /// `WHATSAPP_PROVIDER` selects `twilio` or `meta`. Returns `None` when
    /// the provider is unset, unknown, or missing credentials.
    ///
    /// | Variable                   | Provider | Default |
    /// |----------------------------|----------|---------|
    /// | `TWILIO_ACCOUNT_SID`       | twilio   | none    |
    /// | `TWILIO_AUTH_TOKEN`        | twilio   | none    |
    /// | `TWILIO_WHATSAPP_FROM`     | twilio   | none    |
    /// | `WHATSAPP_API_TOKEN`       | meta     | none    |
    /// | `WHATSAPP_PHONE_NUMBER_ID` | meta     | none    |
    /// | `WHATSAPP_API_VERSION`     | meta     | `v17.0` |
    pub fn from_env() -> Option<Self> {
        let provider = std::env::var("WHATSAPP_PROVIDER").ok()?;
        match provider.to_ascii_lowercase().as_str() {
            "twilio" => Some(Self::Twilio {
                account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok()?,
                auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok()?,
                from_number: std::env::var("TWILIO_WHATSAPP_FROM").ok()?,
            }),
            "meta" => Some(Self::Meta {
                access_token: std::env::var("WHATSAPP_API_TOKEN").ok()?,
                phone_number_id: std::env::var("WHATSAPP_PHONE_NUMBER_ID").ok()?,
                api_version: std::env::var("WHATSAPP_API_VERSION")
                    .unwrap_or_else(|_| DEFAULT_META_API_VERSION.to_string()),
            }),
            other => {
                tracing::warn!(provider = other, "Unknown WHATSAPP_PROVIDER, WhatsApp disabled");
                None
            }
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Twilio { .. } => "twilio",
            Self::Meta { .. } => "meta",
        }
    }
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

/// Form fields of a Twilio `Messages.json` request.
pub fn twilio_form(from_number: &str, to_phone: &str, body: &str) -> Vec<(&'static str, String)> {
    vec![
        ("From", whatsapp_address(from_number)),
        ("To", whatsapp_address(to_phone)),
        ("Body", body.to_string()),
    ]
}

/// JSON body of a Meta Cloud API text message.
pub fn meta_payload(to_phone: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "to": phone::digits_only(to_phone),
        "type": "text",
        "text": { "body": body }
    })
}

/// Extract the provider message id from a success response.
pub fn parse_message_id(config: &WhatsAppConfig, response: &serde_json::Value) -> Option<String> {
    let id = match config {
        WhatsAppConfig::Twilio { .. } => response.get("sid"),
        WhatsAppConfig::Meta { .. } => response.pointer("/messages/0/id"),
    };
    id.and_then(|v| v.as_str()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// WhatsAppDelivery
// ---------------------------------------------------------------------------

pub struct WhatsAppDelivery {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppDelivery {
    pub fn new(config: WhatsAppConfig) -> Result<Self, WhatsAppError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Send a text message, retrying transient failures.
    ///
    /// `phone` is normalized to `+<country><number>` first. Returns the
    /// provider message id when the response carries one.
    pub async fn deliver(&self, phone: &str, body: &str) -> Result<Option<String>, WhatsAppError> {
        let to = phone::normalize_for_whatsapp(phone)
            .ok_or_else(|| WhatsAppError::InvalidPhone(phone.to_string()))?;

        let mut last_err: Option<WhatsAppError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(&to, body).await {
                Ok(id) => return Ok(id),
                Err(e) if e.is_permanent() => {
                    tracing::error!(to = %to, error = %e, "WhatsApp delivery rejected");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        to = %to,
                        error = %e,
                        "WhatsApp delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(&to, body).await {
            Ok(id) => Ok(id),
            Err(e) => {
                tracing::error!(to = %to, error = %e, "WhatsApp delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single provider request and check the response status.
    async fn try_send(&self, to: &str, body: &str) -> Result<Option<String>, WhatsAppError> {
        let request = match &self.config {
            WhatsAppConfig::Twilio {
                account_sid,
                auth_token,
                from_number,
            } => self
                .client
                .post(format!("{TWILIO_API_BASE}/Accounts/{account_sid}/Messages.json"))
                .basic_auth(account_sid, Some(auth_token))
                .form(&twilio_form(from_number, to, body)),
            WhatsAppConfig::Meta {
                access_token,
                phone_number_id,
                api_version,
            } => self
                .client
                .post(format!("{META_API_BASE}/{api_version}/{phone_number_id}/messages"))
                .bearer_auth(access_token)
                .json(&meta_payload(to, body)),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await.unwrap_or_default();
        let id = parse_message_id(&self.config, &json);
        tracing::info!(
            to,
            provider = self.config.provider_name(),
            message_id = id.as_deref().unwrap_or(""),
            "WhatsApp message sent"
        );
        Ok(id)
    }
}

#[async_trait]
impl DeliveryChannel for WhatsAppDelivery {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<Option<String>, DeliveryError> {
        Ok(self.deliver(&message.recipient, &message.body).await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn twilio() -> WhatsAppConfig {
        WhatsAppConfig::Twilio {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+14155238886".into(),
        }
    }

    fn meta() -> WhatsAppConfig {
        WhatsAppConfig::Meta {
            access_token: "token".into(),
            phone_number_id: "1055".into(),
            api_version: DEFAULT_META_API_VERSION.into(),
        }
    }

    #[test]
    fn twilio_form_prefixes_whatsapp_scheme() {
        let form = twilio_form("+14155238886", "+34612345678", "Hola");
        assert_eq!(form[0], ("From", "whatsapp:+14155238886".to_string()));
        assert_eq!(form[1], ("To", "whatsapp:+34612345678".to_string()));
        assert_eq!(form[2].1, "Hola");
    }

    #[test]
    fn twilio_form_keeps_existing_scheme() {
        let form = twilio_form("whatsapp:+14155238886", "+34612345678", "Hola");
        assert_eq!(form[0].1, "whatsapp:+14155238886");
    }

    #[test]
    fn meta_payload_uses_bare_digits() {
        let payload = meta_payload("+34612345678", "Hola");
        assert_eq!(payload["messaging_product"], "whatsapp");
        assert_eq!(payload["to"], "34612345678");
        assert_eq!(payload["type"], "text");
        assert_eq!(payload["text"]["body"], "Hola");
    }

    #[test]
    fn message_id_is_read_per_provider() {
        let twilio_resp = serde_json::json!({"sid": "SM42"});
        assert_eq!(parse_message_id(&twilio(), &twilio_resp).as_deref(), Some("SM42"));

        let meta_resp = serde_json::json!({"messages": [{"id": "wamid.X"}]});
        assert_eq!(parse_message_id(&meta(), &meta_resp).as_deref(), Some("wamid.X"));
        assert_eq!(parse_message_id(&meta(), &twilio_resp), None);
    }

    #[test]
    fn client_errors_are_permanent() {
        let err = WhatsAppError::HttpStatus {
            status: 400,
            body: String::new(),
        };
        assert!(err.is_permanent());
        let err = WhatsAppError::HttpStatus {
            status: 503,
            body: String::new(),
        };
        assert!(!err.is_permanent());
    }

    #[tokio::test]
    async fn empty_phone_fails_without_request() {
        let delivery = WhatsAppDelivery::new(twilio()).unwrap();
        let err = delivery.deliver("---", "Hola").await.unwrap_err();
        assert!(matches!(err, WhatsAppError::InvalidPhone(_)));
    }

    #[test]
    fn from_env_returns_none_without_provider() {
        std::env::remove_var("WHATSAPP_PROVIDER");
        assert!(WhatsAppConfig::from_env().is_none());
    }
}
