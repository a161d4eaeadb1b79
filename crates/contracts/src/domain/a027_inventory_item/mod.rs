pub mod draft;
pub mod media;
pub mod packaging;
pub mod payload;

pub use draft::{DraftSnapshot, GeneratedIdentity, ItemDraft, ItemDraftPatch};
pub use media::{
    MediaAttachment, MediaFile, MediaSlot, MediaSlots, MediaSummary, ThumbnailSettings,
    REQUIRED_DETAIL_IMAGES,
};
pub use packaging::{PackagingFeature, PackagingType};
pub use payload::{CreatedItem, PayloadAttachment, SubmissionPayload, SubmissionResult};
