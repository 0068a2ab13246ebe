use crate::domain::models::event::Event;
use crate::domain::ports::NotificationDispatcher;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Posts template key + structured parameters to the external mail
/// service. Rendering happens on that side; this core never sees message
/// content.
pub struct HttpNotificationDispatcher {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotificationDispatcher {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct NotificationPayload<'a> {
    to_addr: &'a str,
    template_key: &'a str,
    event_id: &'a str,
    params: &'a Value,
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn notify(
        &self,
        event: &Event,
        recipient: &str,
        template_key: &str,
        params: &Value,
    ) -> Result<(), AppError> {
        let payload = NotificationPayload {
            to_addr: recipient,
            template_key,
            event_id: &event.id,
            params,
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Mail service connection error: {}", e);
                error!("{}", msg);
                AppError::Dispatch(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Mail service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Dispatch(msg));
        }

        Ok(())
    }
}
