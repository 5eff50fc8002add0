use std::rc::Rc;

use crate::{
    clock::Clock,
    domain::media::{BinaryStore, FileCandidate, NewRecord, RecordId, display_title},
    handles::{HandleRegistry, PlayableHandle},
    storage::{error::StorageError, operations::Storage},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: RecordId,
    pub name: String,
    pub handle: PlayableHandle,
}

impl Video {
    pub fn title(&self) -> &str {
        display_title(&self.name)
    }
}

/// Stored videos and the one shown in the player.
///
/// Whenever the player is empty and there are videos, the first one is shown.
#[derive(Default)]
pub struct VideoList {
    videos: Vec<Video>,
    showing: Option<PlayableHandle>,
    handles: HandleRegistry,
}

impl VideoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, storage: &Storage) -> Result<(), StorageError> {
        let records = storage.get_all(BinaryStore::VideoFiles)?;

        for video in self.videos.drain(..) {
            self.handles.revoke(&video.handle);
        }
        self.showing = None;
        self.videos = records
            .into_iter()
            .map(|record| Video {
                handle: self.handles.acquire(record.payload),
                id: record.id,
                name: record.name,
            })
            .collect();
        self.show_first_if_idle();
        Ok(())
    }

    pub fn add_video(
        &mut self,
        storage: &mut Storage,
        clock: &dyn Clock,
        file: FileCandidate,
    ) -> Result<RecordId, StorageError> {
        let record = NewRecord::from_candidate(file, clock.now());
        let payload: Rc<[u8]> = Rc::from(record.payload.as_slice());
        let name = record.name.clone();

        let id = storage.put(BinaryStore::VideoFiles, record)?;
        self.videos.push(Video {
            id: id.clone(),
            name,
            handle: self.handles.acquire(payload),
        });
        self.show_first_if_idle();
        Ok(id)
    }

    /// Same pairing as the playlist: the handle goes away even if the
    /// delete fails.
    pub fn remove_video(&mut self, storage: &mut Storage, index: usize) -> Result<(), StorageError> {
        if index >= self.videos.len() {
            return Ok(());
        }

        let deleted = storage.delete(BinaryStore::VideoFiles, &self.videos[index].id);
        let video = self.videos.remove(index);
        self.handles.revoke(&video.handle);

        if self.showing.as_ref() == Some(&video.handle) {
            self.showing = None;
        }
        self.show_first_if_idle();

        deleted
    }

    /// Shows the video at `index`. Out of range is ignored.
    pub fn select(&mut self, index: usize) {
        if let Some(video) = self.videos.get(index) {
            self.showing = Some(video.handle.clone());
        }
    }

    pub fn showing(&self) -> Option<&Video> {
        let handle = self.showing.as_ref()?;
        self.videos.iter().find(|v| &v.handle == handle)
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    fn show_first_if_idle(&mut self) {
        if self.showing.is_none() {
            self.select(0);
        }
    }
}
