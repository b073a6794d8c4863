use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Base URL used when neither the environment nor the config names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

#[derive(Serialize)]
struct QueryRequest<'a> {
    prompt: &'a str,
}

/// Success body from `POST /agent/query`. The backend also sends a `status`
/// field; nothing here depends on it.
#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    image_base64: Option<String>,
}

/// What the agent produced: optional text, optional decoded PNG bytes.
/// Both may be present on the same reply.
#[derive(Debug, Clone, Default)]
pub struct AgentReply {
    pub text: Option<String>,
    pub image: Option<Vec<u8>>,
}

/// Thin HTTP client for the agent backend. Cloneable so the app can move a
/// copy into the spawned request task. Never touches conversation state;
/// the caller applies the transition from the returned result.
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one prompt and wait for the reply. Transport errors, non-2xx
    /// statuses, unparseable bodies, and bad base64 all surface as a single
    /// generic error; the conversation folds them into one fallback message.
    pub async fn ask(&self, prompt: &str) -> Result<AgentReply> {
        let url = format!("{}/agent/query", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest { prompt })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "agent request failed with status: {}",
                response.status()
            ));
        }

        decode_reply(response.json().await?)
    }
}

fn decode_reply(body: QueryResponse) -> Result<AgentReply> {
    let image = body
        .image_base64
        .as_deref()
        .map(|b64| BASE64.decode(b64))
        .transpose()?;

    Ok(AgentReply {
        text: body.response,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<AgentReply> {
        decode_reply(serde_json::from_str(json).expect("valid json"))
    }

    #[test]
    fn text_reply_parses_and_ignores_status() {
        let reply = parse(r#"{"status": "success", "response": "hello"}"#).unwrap();
        assert_eq!(reply.text.as_deref(), Some("hello"));
        assert!(reply.image.is_none());
    }

    #[test]
    fn image_reply_decodes_base64() {
        // "PNG!" in base64
        let reply = parse(r#"{"status": "success", "image_base64": "UE5HIQ=="}"#).unwrap();
        assert!(reply.text.is_none());
        assert_eq!(reply.image.as_deref(), Some(&b"PNG!"[..]));
    }

    #[test]
    fn text_and_image_may_coexist() {
        let reply = parse(r#"{"response": "here you go", "image_base64": "UE5HIQ=="}"#).unwrap();
        assert_eq!(reply.text.as_deref(), Some("here you go"));
        assert!(reply.image.is_some());
    }

    #[test]
    fn empty_body_yields_empty_reply() {
        let reply = parse("{}").unwrap();
        assert!(reply.text.is_none());
        assert!(reply.image.is_none());
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(parse(r#"{"image_base64": "not base64!!!"}"#).is_err());
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(QueryRequest { prompt: "make a post" }).unwrap();
        assert_eq!(body, serde_json::json!({ "prompt": "make a post" }));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = AgentClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
