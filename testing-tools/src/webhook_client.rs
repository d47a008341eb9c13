use anyhow::{Context, Result};
use log::*;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// What the receiver answered to one delivery.
#[derive(Debug)]
pub struct Delivery {
    pub status: u16,
    pub body: String,
}

impl Delivery {
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Posts deliveries to a running receiver the way Tebex does.
pub struct WebhookClient {
    client: Client,
    endpoint: String,
    secret: String,
}

impl WebhookClient {
    pub fn new(client: Client, base_url: &str, secret: String) -> Self {
        Self {
            client,
            endpoint: format!("{}/webhooks/tebex", base_url.trim_end_matches('/')),
            secret,
        }
    }

    /// The signature Tebex would send for `body`.
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        Ok(webhook::sign_payload(body, self.secret.as_bytes())?)
    }

    /// Sends a correctly signed JSON delivery.
    pub async fn deliver(&self, body: Vec<u8>) -> Result<Delivery> {
        let signature = self.sign(&body)?;
        self.send(body, "application/json", &signature).await
    }

    /// Sends a delivery with explicit content type and signature headers.
    pub async fn send(
        &self,
        body: Vec<u8>,
        content_type: &str,
        signature: &str,
    ) -> Result<Delivery> {
        debug!("POST {} ({} bytes)", self.endpoint, body.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .header(webhook::SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach receiver at {}", self.endpoint))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read receiver response")?;

        debug!("Receiver answered {status}: {body}");
        Ok(Delivery { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let client = WebhookClient::new(Client::new(), "http://localhost:4000/", "s".into());
        assert_eq!(client.endpoint, "http://localhost:4000/webhooks/tebex");
    }

    #[test]
    fn test_sign_matches_receiver_formula() {
        let client = WebhookClient::new(Client::new(), "http://localhost:4000", "s3cr3t".into());
        let body = br#"{"id":"evt_1"}"#;
        let signature = client.sign(body).unwrap();
        assert_eq!(signature, webhook::sign_payload(body, b"s3cr3t").unwrap());
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_delivery_json() {
        let delivery = Delivery {
            status: 200,
            body: r#"{"status":"ok"}"#.to_string(),
        };
        assert_eq!(delivery.json().unwrap()["status"], "ok");
        let plain = Delivery {
            status: 401,
            body: "invalid signature".to_string(),
        };
        assert!(plain.json().is_none());
    }
}
