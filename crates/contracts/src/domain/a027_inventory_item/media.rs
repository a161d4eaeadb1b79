use serde::{Deserialize, Serialize};

/// Необходимое количество детальных фото
pub const REQUIRED_DETAIL_IMAGES: usize = 3;

/// Слот фотографии позиции; имя поля совпадает с именем вложения при отправке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaSlot {
    Main,
    Back,
    Side,
    Detail,
}

impl MediaSlot {
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaSlot::Main => "image",
            MediaSlot::Back => "imageBack",
            MediaSlot::Side => "imageSide",
            MediaSlot::Detail => "imageDetails",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "main" | "image" => Some(MediaSlot::Main),
            "back" | "imageBack" => Some(MediaSlot::Back),
            "side" | "imageSide" => Some(MediaSlot::Side),
            "detail" | "details" | "imageDetails" => Some(MediaSlot::Detail),
            _ => None,
        }
    }
}

/// Загруженный файл (после сжатия внешним обработчиком)
#[derive(Clone, PartialEq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Файл вместе с его превью
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAttachment {
    pub file: MediaFile,
    pub preview: String,
}

/// Фотографии черновика. Не сериализуются: после восстановления черновика
/// файлы нужно загрузить заново.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSlots {
    pub main: Option<MediaAttachment>,
    pub back: Option<MediaAttachment>,
    pub side: Option<MediaAttachment>,
    pub details: Vec<MediaAttachment>,
}

impl MediaSlots {
    /// Поместить файл в слот: основные слоты заменяются, детальные накапливаются
    pub fn put(&mut self, slot: MediaSlot, attachment: MediaAttachment) {
        match slot {
            MediaSlot::Main => self.main = Some(attachment),
            MediaSlot::Back => self.back = Some(attachment),
            MediaSlot::Side => self.side = Some(attachment),
            MediaSlot::Detail => self.details.push(attachment),
        }
    }

    /// Очистить слот; для детальных фото удаляется элемент по индексу (или все, если индекс не задан)
    pub fn remove(&mut self, slot: MediaSlot, index: Option<usize>) -> bool {
        match slot {
            MediaSlot::Main => self.main.take().is_some(),
            MediaSlot::Back => self.back.take().is_some(),
            MediaSlot::Side => self.side.take().is_some(),
            MediaSlot::Detail => match index {
                Some(i) if i < self.details.len() => {
                    self.details.remove(i);
                    true
                }
                Some(_) => false,
                None => {
                    let had_any = !self.details.is_empty();
                    self.details.clear();
                    had_any
                }
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_none() && self.back.is_none() && self.side.is_none() && self.details.is_empty()
    }

    /// Все вложения в порядке отправки
    pub fn attachments(&self) -> impl Iterator<Item = (MediaSlot, &MediaAttachment)> {
        self.main
            .iter()
            .map(|a| (MediaSlot::Main, a))
            .chain(self.back.iter().map(|a| (MediaSlot::Back, a)))
            .chain(self.side.iter().map(|a| (MediaSlot::Side, a)))
            .chain(self.details.iter().map(|a| (MediaSlot::Detail, a)))
    }

    pub fn summary(&self) -> MediaSummary {
        MediaSummary {
            main_preview: self.main.as_ref().map(|a| a.preview.clone()),
            back_preview: self.back.as_ref().map(|a| a.preview.clone()),
            side_preview: self.side.as_ref().map(|a| a.preview.clone()),
            detail_previews: self.details.iter().map(|a| a.preview.clone()).collect(),
        }
    }
}

/// Сводка по фотографиям для ответа API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    #[serde(rename = "imagePreview")]
    pub main_preview: Option<String>,

    #[serde(rename = "imageBackPreview")]
    pub back_preview: Option<String>,

    #[serde(rename = "imageSidePreview")]
    pub side_preview: Option<String>,

    #[serde(rename = "imageDetailsPreviews")]
    pub detail_previews: Vec<String>,
}

/// Кадрирование миниатюры основного фото
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    pub zoom: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl ThumbnailSettings {
    /// Допустимое смещение (в процентах) для изображения с заданным соотношением сторон
    pub fn max_offset(&self, aspect_ratio: f64) -> (f64, f64) {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return (0.0, 0.0);
        }
        let base_scale = aspect_ratio.max(1.0 / aspect_ratio);
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        let scale = zoom * base_scale;
        let normalized_w = if aspect_ratio >= 1.0 { 1.0 } else { aspect_ratio };
        let normalized_h = if aspect_ratio <= 1.0 { 1.0 } else { 1.0 / aspect_ratio };

        (
            (50.0 * (normalized_w - 1.0 / scale)).max(0.0),
            (50.0 * (normalized_h - 1.0 / scale)).max(0.0),
        )
    }

    /// Смещение, ограниченное видимой областью
    pub fn clamped(&self, aspect_ratio: f64) -> Self {
        let (limit_x, limit_y) = self.max_offset(aspect_ratio);
        Self {
            zoom: self.zoom,
            x: self.x.clamp(-limit_x, limit_x),
            y: self.y.clamp(-limit_y, limit_y),
        }
    }
}
