use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::a027_inventory_item::{SubmissionPayload, SubmissionResult};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Внешний обработчик создания позиции
#[async_trait]
pub trait ItemSubmitter: Send + Sync {
    async fn submit(&self, payload: SubmissionPayload) -> Result<SubmissionResult>;
}

/// Отправка формы multipart POST-запросом
pub struct HttpItemSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpItemSubmitter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn form(payload: SubmissionPayload) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in payload.fields {
            form = form.text(name, value);
        }
        for attachment in payload.attachments {
            let part = Part::bytes(attachment.file.bytes)
                .file_name(attachment.file.file_name)
                .mime_str(&attachment.file.content_type)?;
            form = form.part(attachment.field, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl ItemSubmitter for HttpItemSubmitter {
    async fn submit(&self, payload: SubmissionPayload) -> Result<SubmissionResult> {
        let attachments = payload.attachments.len();
        let form = Self::form(payload)?;

        tracing::info!(
            "Submitting item to {} ({} attachments)",
            self.endpoint,
            attachments
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timeout: {}", e)
                } else {
                    anyhow::anyhow!("Request failed: {}", e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<SubmissionResult>(&body) {
            Ok(result) => Ok(result),
            Err(_) if !status.is_success() => Ok(SubmissionResult::failure(format!(
                "Ошибка сервера: HTTP {}",
                status.as_u16()
            ))),
            Err(e) => Err(anyhow::anyhow!(
                "Unexpected response from {}: {} (body: {})",
                self.endpoint,
                e,
                body.chars().take(200).collect::<String>()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a027_inventory_item::{MediaFile, PayloadAttachment};

    #[test]
    fn test_form_accepts_fields_and_attachments() {
        let mut payload = SubmissionPayload::default();
        payload.push("name", "Футболка");
        payload.attachments.push(PayloadAttachment {
            field: "image",
            file: MediaFile::new("front.webp", "image/webp", vec![1, 2]),
        });
        assert!(HttpItemSubmitter::form(payload).is_ok());
    }

    #[test]
    fn test_form_rejects_invalid_mime() {
        let mut payload = SubmissionPayload::default();
        payload.attachments.push(PayloadAttachment {
            field: "image",
            file: MediaFile::new("front.webp", "invalid", vec![1]),
        });
        assert!(HttpItemSubmitter::form(payload).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let submitter =
            HttpItemSubmitter::new("http://127.0.0.1:9/items", Duration::from_millis(500)).unwrap();
        assert!(submitter.submit(SubmissionPayload::default()).await.is_err());
    }
}
