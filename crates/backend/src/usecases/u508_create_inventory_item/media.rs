use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use contracts::domain::a027_inventory_item::MediaFile;

/// Построение превью для загруженного файла
#[async_trait]
pub trait PreviewConverter: Send + Sync {
    async fn to_preview(&self, file: &MediaFile) -> Result<String>;
}

/// Превью как data URI (`data:<mime>;base64,...`)
pub struct DataUriPreviewConverter {
    max_bytes: usize,
}

impl DataUriPreviewConverter {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl Default for DataUriPreviewConverter {
    fn default() -> Self {
        Self::new(10 * 1024 * 1024)
    }
}

#[async_trait]
impl PreviewConverter for DataUriPreviewConverter {
    async fn to_preview(&self, file: &MediaFile) -> Result<String> {
        if !file.content_type.starts_with("image/") {
            anyhow::bail!("{} is not an image ({})", file.file_name, file.content_type);
        }
        if file.bytes.is_empty() {
            anyhow::bail!("{} is empty", file.file_name);
        }
        if file.bytes.len() > self.max_bytes {
            anyhow::bail!(
                "{} is too large: {} bytes (max {})",
                file.file_name,
                file.bytes.len(),
                self.max_bytes
            );
        }

        let content_type = file.content_type.clone();
        let bytes = file.bytes.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            base64::engine::general_purpose::STANDARD.encode(bytes)
        })
        .await?;

        Ok(format!("data:{};base64,{}", content_type, encoded))
    }
}
