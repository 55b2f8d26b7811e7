// Minimal client for the Twilio Programmable Messaging API (outbound SMS only).

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client, StatusCode};

use crate::models::MessageResponse;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("Request to Twilio failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio returned an error ({status}): {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender identity, an E.164 number owned by the account
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    api_base: String,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self::with_api_base(options, DEFAULT_API_BASE)
    }

    /// Point the client at a different API host (used against local stubs)
    pub fn with_api_base(options: TwilioOptions, api_base: impl Into<String>) -> Self {
        Self {
            options,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_number(&self) -> &str {
        &self.options.from_number
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{base}/2010-04-01/Accounts/{sid}/Messages.json",
            base = self.api_base,
            sid = self.options.account_sid
        )
    }

    /// Send a text message to `recipient`.
    ///
    /// One request, no retries. Any non-2xx response is an error. A 2xx
    /// response means the message was accepted, even if its body is unreadable.
    pub async fn send_sms(
        &self,
        recipient: &str,
        body: &str,
    ) -> Result<MessageResponse, TwilioError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", &self.options.from_number);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api { status, body });
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<MessageResponse>(&text) {
            Ok(message) => Ok(message),
            Err(e) => {
                tracing::warn!(%status, error = %e, "Twilio accepted message but response body was not understood");
                Ok(MessageResponse::default())
            }
        }
    }
}
