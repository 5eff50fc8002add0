use std::rc::Rc;

use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};

use crate::{
    clock::Clock,
    domain::media::{BinaryStore, FileCandidate, MediaKind, MediaRecord, NewRecord, RecordId},
    error::{SiteError, ValidationError},
    handles::{HandleRegistry, PlayableHandle},
    player::cursor,
    session::Session,
    storage::{error::StorageError, operations::Storage},
    ui::{self, Frontend, notice::Notice},
    upload::{UploadReport, Validator, run_batch},
};

/// `<unix millis>-<9 random base36 chars>`
pub fn image_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{suffix}", now.timestamp_millis())
}

/// The open viewer. `id` pins it to one record, so reloads that reorder the
/// list move `index` instead of swapping the picture.
struct Lightbox {
    index: usize,
    id: RecordId,
    handle: PlayableHandle,
}

/// One grid cell as the gallery renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: RecordId,
    pub filename: String,
    pub can_delete: bool,
}

/// Photo gallery, newest first, with a lightbox viewer.
pub struct Gallery {
    images: Vec<MediaRecord>,
    lightbox: Option<Lightbox>,
    handles: HandleRegistry,
    validator: Validator,
}

impl Gallery {
    pub fn new(validator: Validator) -> Self {
        Self {
            images: Vec::new(),
            lightbox: None,
            handles: HandleRegistry::new(),
            validator,
        }
    }

    /// Reloads from storage. On failure the previous list stays.
    pub fn load(&mut self, storage: &Storage) -> Result<(), StorageError> {
        let mut images = storage.get_all(BinaryStore::Images)?;
        images.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        self.images = images;

        let Some(lb) = self.lightbox.as_mut() else {
            return Ok(());
        };
        match self.images.iter().position(|img| img.id == lb.id) {
            Some(index) => lb.index = index,
            None => self.close(),
        }
        Ok(())
    }

    pub fn list(&self) -> &[MediaRecord] {
        &self.images
    }

    pub fn items(&self, session: &Session) -> Vec<GalleryItem> {
        let can_delete = session.is_privileged();
        self.images
            .iter()
            .map(|img| GalleryItem {
                id: img.id.clone(),
                filename: img.name.clone(),
                can_delete,
            })
            .collect()
    }

    /// Stores every acceptable image of the batch, then reloads.
    pub fn upload(
        &mut self,
        storage: &mut Storage,
        session: &Session,
        ui: &mut dyn Frontend,
        clock: &dyn Clock,
        files: Vec<FileCandidate>,
    ) -> Result<UploadReport, SiteError> {
        ui::authorize(session, ui, "upload images")?;
        if files.is_empty() {
            return Err(ValidationError::NothingSelected("images").into());
        }

        let report = run_batch(MediaKind::Image, &self.validator, files, |file| {
            let now = clock.now();
            let record = NewRecord::from_candidate(file, now).with_id(image_id(now));
            storage.put(BinaryStore::Images, record)?;
            Ok(())
        });
        ui.notify(report.notice());

        if let Err(e) = self.load(storage) {
            ui::report(ui, &e.into());
        }
        Ok(report)
    }

    /// Returns `Ok(false)` when the user backs out at the confirmation.
    pub fn delete(
        &mut self,
        storage: &mut Storage,
        session: &Session,
        ui: &mut dyn Frontend,
        id: &RecordId,
    ) -> Result<bool, SiteError> {
        ui::authorize(session, ui, "delete images")?;
        if !ui.confirm("Delete this image?") {
            return Ok(false);
        }

        storage.delete(BinaryStore::Images, id)?;
        self.load(storage)?;
        ui.notify(Notice::success("Image deleted successfully"));
        Ok(true)
    }

    /// Shows the image at `index`, releasing whatever was shown before.
    pub fn open_at(&mut self, index: usize) {
        let Some(image) = self.images.get(index) else {
            return;
        };
        let payload: Rc<[u8]> = Rc::from(image.payload.as_slice());
        let id = image.id.clone();

        self.close();
        self.lightbox = Some(Lightbox {
            index,
            id,
            handle: self.handles.acquire(payload),
        });
    }

    pub fn next(&mut self) {
        let Some(lb) = &self.lightbox else { return };
        if let Some(i) = cursor::next_index(Some(lb.index), self.images.len()) {
            self.open_at(i);
        }
    }

    pub fn previous(&mut self) {
        let Some(lb) = &self.lightbox else { return };
        if let Some(i) = cursor::previous_index(Some(lb.index), self.images.len()) {
            self.open_at(i);
        }
    }

    pub fn close(&mut self) {
        if let Some(lb) = self.lightbox.take() {
            self.handles.revoke(&lb.handle);
        }
    }

    pub fn lightbox_index(&self) -> Option<usize> {
        self.lightbox.as_ref().map(|lb| lb.index)
    }

    /// The image in the lightbox and the handle it is displayed through.
    pub fn showing(&self) -> Option<(&MediaRecord, &PlayableHandle)> {
        let lb = self.lightbox.as_ref()?;
        self.images.get(lb.index).map(|img| (img, &lb.handle))
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }
}
