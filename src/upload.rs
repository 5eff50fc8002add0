//! Validation and batch handling for media uploads.

use crate::{
    clock::Clock,
    config::UploadLimits,
    domain::media::{FileCandidate, MediaKind},
    error::{SiteError, ValidationError},
    player::{playlist::Playlist, video::VideoList},
    session::Session,
    storage::operations::Storage,
    ui::{self, Frontend, notice::Notice},
};

const AUDIO_TYPES: &[&str] = &["audio/mpeg", "audio/mp3"];
const VIDEO_TYPES: &[&str] = &["video/mp4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validator {
    limits: UploadLimits,
}

impl Validator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    pub fn max_bytes(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Audio => self.limits.audio_max_bytes,
            MediaKind::Video => self.limits.video_max_bytes,
            MediaKind::Image => self.limits.image_max_bytes,
        }
    }

    /// Type is checked before size, so a huge text file is "not an image".
    pub fn validate(&self, kind: MediaKind, file: &FileCandidate) -> Result<(), ValidationError> {
        let mime = file.mime_type.as_str();
        let type_ok = match kind {
            MediaKind::Audio => AUDIO_TYPES.contains(&mime),
            MediaKind::Video => VIDEO_TYPES.contains(&mime),
            MediaKind::Image => mime.starts_with("image/"),
        };

        if !type_ok {
            return Err(match kind {
                MediaKind::Image => ValidationError::NotAnImage {
                    name: file.name.clone(),
                },
                MediaKind::Audio => ValidationError::UnsupportedType {
                    name: file.name.clone(),
                    expected: "MP3",
                },
                MediaKind::Video => ValidationError::UnsupportedType {
                    name: file.name.clone(),
                    expected: "MP4",
                },
            });
        }

        let max = self.max_bytes(kind);
        if file.size > max {
            return Err(ValidationError::TooLarge {
                name: file.name.clone(),
                max_bytes: max,
            });
        }

        Ok(())
    }
}

/// Outcome of one batch. A bad file never stops the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub kind: MediaKind,
    pub succeeded: usize,
    pub errors: Vec<String>,
}

impl UploadReport {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn notice(&self) -> Notice {
        let noun = self.kind.noun();
        match (self.succeeded, self.errors.is_empty()) {
            (0, _) => Notice::error(self.errors.join(". ")),
            (n, true) => Notice::success(format!("Upload complete! {n} {noun}(s) uploaded.")),
            (n, false) => Notice::success(format!(
                "{n} {noun}(s) uploaded. {} failed.",
                self.failed()
            )),
        }
    }
}

/// Validates and stores files one at a time, in order.
pub fn run_batch<F>(
    kind: MediaKind,
    validator: &Validator,
    files: Vec<FileCandidate>,
    mut store: F,
) -> UploadReport
where
    F: FnMut(FileCandidate) -> Result<(), SiteError>,
{
    let mut report = UploadReport {
        kind,
        succeeded: 0,
        errors: Vec::new(),
    };

    for file in files {
        if let Err(e) = validator.validate(kind, &file) {
            log::warn!("rejected upload: {e}");
            report.errors.push(e.to_string());
            continue;
        }

        let name = file.name.clone();
        match store(file) {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                log::error!("failed to upload {name}: {e}");
                report.errors.push(format!("Failed to upload {name}"));
            }
        }
    }

    report
}

/// Upload entry points for the music and video sections.
pub struct Uploader {
    pub validator: Validator,
}

impl Uploader {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    pub fn tracks(
        &self,
        storage: &mut Storage,
        session: &Session,
        ui: &mut dyn Frontend,
        clock: &dyn Clock,
        playlist: &mut Playlist,
        files: Vec<FileCandidate>,
    ) -> Result<UploadReport, SiteError> {
        ui::authorize(session, ui, "upload music")?;
        if files.is_empty() {
            return Err(ValidationError::NothingSelected("music").into());
        }

        let report = run_batch(MediaKind::Audio, &self.validator, files, |file| {
            playlist.add_track(storage, clock, file)?;
            Ok(())
        });
        ui.notify(report.notice());
        Ok(report)
    }

    pub fn videos(
        &self,
        storage: &mut Storage,
        session: &Session,
        ui: &mut dyn Frontend,
        clock: &dyn Clock,
        videos: &mut VideoList,
        files: Vec<FileCandidate>,
    ) -> Result<UploadReport, SiteError> {
        ui::authorize(session, ui, "upload videos")?;
        if files.is_empty() {
            return Err(ValidationError::NothingSelected("videos").into());
        }

        let report = run_batch(MediaKind::Video, &self.validator, files, |file| {
            videos.add_video(storage, clock, file)?;
            Ok(())
        });
        ui.notify(report.notice());
        Ok(report)
    }
}
