use std::{rc::Rc, time::Duration};

use crate::{
    clock::Clock,
    config::PlayerConfig,
    domain::media::{BinaryStore, FileCandidate, NewRecord, RecordId, display_title},
    handles::{HandleRegistry, PlayableHandle},
    player::{
        cursor,
        visualizer::{Bar, FrequencySource, Visualizer},
    },
    storage::{error::StorageError, operations::Storage},
};

/// Runtime view of a stored audio record.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: RecordId,
    pub name: String,
    pub handle: PlayableHandle,
}

impl Track {
    pub fn title(&self) -> &str {
        display_title(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// no track loaded
    Empty,
    Loaded(usize),
    Playing(usize),
    Paused(usize),
}

impl Transport {
    pub fn cursor(self) -> Option<usize> {
        match self {
            Transport::Empty => None,
            Transport::Loaded(i) | Transport::Playing(i) | Transport::Paused(i) => Some(i),
        }
    }

    fn moved_to(self, cursor: usize) -> Self {
        match self {
            Transport::Empty => Transport::Empty,
            Transport::Loaded(_) => Transport::Loaded(cursor),
            Transport::Playing(_) => Transport::Playing(cursor),
            Transport::Paused(_) => Transport::Paused(cursor),
        }
    }
}

/// The music player: ordered tracks, a cursor, and transport state.
pub struct Playlist {
    tracks: Vec<Track>,
    transport: Transport,
    position: Duration,
    duration: Option<Duration>,
    volume: f32,
    artist: String,
    handles: HandleRegistry,
}

impl Playlist {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            transport: Transport::Empty,
            position: Duration::ZERO,
            duration: None,
            volume: config.volume.clamp(0.0, 1.0),
            artist: config.artist.clone(),
            handles: HandleRegistry::new(),
        }
    }

    /// Replaces the in-memory list with what is stored. On failure the
    /// current list is left as it was.
    pub fn load(&mut self, storage: &Storage) -> Result<(), StorageError> {
        let records = storage.get_all(BinaryStore::AudioFiles)?;

        for track in self.tracks.drain(..) {
            self.handles.revoke(&track.handle);
        }
        self.tracks = records
            .into_iter()
            .map(|record| Track {
                handle: self.handles.acquire(record.payload),
                id: record.id,
                name: record.name,
            })
            .collect();
        self.stop();

        log::info!("playlist loaded with {} track(s)", self.tracks.len());
        Ok(())
    }

    /// Stores the file and appends it. The first track added is loaded but
    /// not played.
    pub fn add_track(
        &mut self,
        storage: &mut Storage,
        clock: &dyn Clock,
        file: FileCandidate,
    ) -> Result<RecordId, StorageError> {
        let record = NewRecord::from_candidate(file, clock.now());
        let payload: Rc<[u8]> = Rc::from(record.payload.as_slice());
        let name = record.name.clone();

        let id = storage.put(BinaryStore::AudioFiles, record)?;
        self.tracks.push(Track {
            id: id.clone(),
            name,
            handle: self.handles.acquire(payload),
        });

        if self.tracks.len() == 1 {
            self.load_track(0);
        }
        Ok(id)
    }

    /// Deletes the stored record and drops the track from the list.
    ///
    /// The handle is revoked and the track leaves the list even when the
    /// delete fails; the error is still returned so it can be shown.
    pub fn remove_track(&mut self, storage: &mut Storage, index: usize) -> Result<(), StorageError> {
        if index >= self.tracks.len() {
            return Ok(());
        }

        let deleted = storage.delete(BinaryStore::AudioFiles, &self.tracks[index].id);
        let track = self.tracks.remove(index);
        self.handles.revoke(&track.handle);

        let was_current = self.cursor() == Some(index);
        match cursor::after_removal(self.cursor(), index) {
            Some(c) => self.transport = self.transport.moved_to(c),
            None if was_current => self.stop(),
            None => {}
        }

        deleted
    }

    /// Points the player at `index` and rewinds. Out of range is ignored.
    pub fn load_track(&mut self, index: usize) {
        if index >= self.tracks.len() {
            return;
        }
        self.transport = Transport::Loaded(index);
        self.position = Duration::ZERO;
        self.duration = None;
        log::debug!("loaded track {}", self.tracks[index].name);
    }

    /// Starts playback, loading the first track if none is loaded.
    pub fn play(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        if self.transport == Transport::Empty {
            self.load_track(0);
        }
        if let Some(c) = self.cursor() {
            self.transport = Transport::Playing(c);
        }
    }

    pub fn pause(&mut self) {
        if let Transport::Playing(c) = self.transport {
            self.transport = Transport::Paused(c);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.transport {
            Transport::Playing(_) => self.pause(),
            _ => self.play(),
        }
    }

    pub fn next(&mut self) {
        if let Some(i) = cursor::next_index(self.cursor(), self.tracks.len()) {
            self.load_track(i);
            self.play();
        }
    }

    pub fn previous(&mut self) {
        if let Some(i) = cursor::previous_index(self.cursor(), self.tracks.len()) {
            self.load_track(i);
            self.play();
        }
    }

    /// Natural end of the current track.
    pub fn on_track_ended(&mut self) {
        self.next();
    }

    /// Reported by the host once the track's metadata is known.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = Some(duration);
    }

    /// Playback position reported by the host.
    pub fn set_position(&mut self, position: Duration) {
        self.position = match self.duration {
            Some(d) => position.min(d),
            None => position,
        };
    }

    /// Seeks to a fraction (0..=1) of the track. Ignored until the duration is known.
    pub fn seek_fraction(&mut self, fraction: f32) {
        if let Some(d) = self.duration {
            self.position = d.mul_f32(fraction.clamp(0.0, 1.0));
        }
    }

    /// Played share of the current track, 0 when the duration is unknown.
    pub fn progress(&self) -> f32 {
        match self.duration {
            Some(d) if !d.is_zero() => self.position.as_secs_f32() / d.as_secs_f32(),
            _ => 0.0,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn cursor(&self) -> Option<usize> {
        self.transport.cursor()
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.transport, Transport::Playing(_))
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor().and_then(|c| self.tracks.get(c))
    }

    /// Source URL for the audio element, if a track is loaded.
    pub fn current_source(&self) -> Option<String> {
        self.current().map(|t| t.handle.url())
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// One visualizer frame, only while playing.
    pub fn visualize(
        &self,
        visualizer: &mut Visualizer,
        source: &mut dyn FrequencySource,
        width: f32,
        height: f32,
    ) -> Option<Vec<Bar>> {
        self.is_playing()
            .then(|| visualizer.frame(source, width, height))
    }

    fn stop(&mut self) {
        self.transport = Transport::Empty;
        self.position = Duration::ZERO;
        self.duration = None;
    }
}

/// "m:ss"
pub fn format_time(time: Duration) -> String {
    let secs = time.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{clock::testing::FixedClock, player::visualizer::testing::Flat};

    fn clock() -> FixedClock {
        FixedClock::at(Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap())
    }

    fn mp3(name: &str) -> FileCandidate {
        FileCandidate::new(name, "audio/mpeg", name.as_bytes().to_vec())
    }

    fn playlist_with(names: &[&str]) -> anyhow::Result<(Storage, Playlist)> {
        let mut storage = Storage::open_in_memory()?;
        let mut playlist = Playlist::new(&PlayerConfig::default());
        for name in names {
            playlist.add_track(&mut storage, &clock(), mp3(name))?;
        }
        Ok((storage, playlist))
    }

    fn current_name(playlist: &Playlist) -> Option<&str> {
        playlist.current().map(|t| t.name.as_str())
    }

    #[test]
    fn first_added_track_is_loaded_not_played() -> anyhow::Result<()> {
        let (_storage, playlist) = playlist_with(&["a.mp3"])?;
        assert_eq!(playlist.transport(), Transport::Loaded(0));
        assert_eq!(playlist.current().map(Track::title), Some("a"));
        assert!(playlist.current_source().is_some());
        Ok(())
    }

    #[test]
    fn later_tracks_do_not_move_the_cursor() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        playlist.load_track(1);
        playlist.add_track(&mut storage, &clock(), mp3("c.mp3"))?;
        assert_eq!(playlist.cursor(), Some(1));
        assert_eq!(playlist.len(), 3);
        Ok(())
    }

    #[test]
    fn play_on_empty_playlist_is_noop() {
        let mut playlist = Playlist::new(&PlayerConfig::default());
        playlist.play();
        playlist.next();
        playlist.previous();
        playlist.toggle_play_pause();
        assert_eq!(playlist.transport(), Transport::Empty);
    }

    #[test]
    fn load_track_out_of_range_is_ignored() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        playlist.load_track(1);
        playlist.set_position(Duration::from_secs(30));
        playlist.load_track(2);
        assert_eq!(playlist.transport(), Transport::Loaded(1));
        assert_eq!(playlist.position(), Duration::from_secs(30));

        playlist.load_track(0);
        assert_eq!(playlist.position(), Duration::ZERO);
        Ok(())
    }

    #[test]
    fn play_pause_toggle() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["a.mp3"])?;
        playlist.play();
        assert_eq!(playlist.transport(), Transport::Playing(0));
        playlist.pause();
        assert_eq!(playlist.transport(), Transport::Paused(0));
        playlist.toggle_play_pause();
        assert_eq!(playlist.transport(), Transport::Playing(0));
        playlist.toggle_play_pause();
        assert_eq!(playlist.transport(), Transport::Paused(0));
        Ok(())
    }

    #[test]
    fn play_without_loaded_track_starts_at_head() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        playlist.load(&storage)?;
        assert_eq!(playlist.transport(), Transport::Empty);

        playlist.play();
        assert_eq!(playlist.transport(), Transport::Playing(0));

        playlist.remove_track(&mut storage, 0)?;
        assert_eq!(playlist.transport(), Transport::Empty);
        Ok(())
    }

    #[test]
    fn next_from_last_wraps_to_first() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["A.mp3", "B.mp3", "C.mp3"])?;
        playlist.load_track(2);
        playlist.next();
        assert_eq!(current_name(&playlist), Some("A.mp3"));
        assert!(playlist.is_playing());

        playlist.previous();
        assert_eq!(current_name(&playlist), Some("C.mp3"));
        Ok(())
    }

    #[test]
    fn len_nexts_return_to_start() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3", "c.mp3", "d.mp3"])?;
        playlist.load_track(1);
        for _ in 0..playlist.len() {
            playlist.next();
        }
        assert_eq!(playlist.cursor(), Some(1));
        for _ in 0..playlist.len() {
            playlist.previous();
        }
        assert_eq!(playlist.cursor(), Some(1));
        Ok(())
    }

    #[test]
    fn track_end_advances() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        playlist.play();
        playlist.set_duration(Duration::from_secs(100));
        playlist.set_position(Duration::from_secs(100));
        playlist.on_track_ended();

        assert_eq!(playlist.transport(), Transport::Playing(1));
        assert_eq!(playlist.position(), Duration::ZERO);
        assert_eq!(playlist.duration(), None);
        Ok(())
    }

    #[test]
    fn removing_current_track_stops_and_unloads() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3", "c.mp3"])?;
        playlist.load_track(1);
        playlist.play();

        playlist.remove_track(&mut storage, 1)?;

        assert_eq!(playlist.transport(), Transport::Empty);
        assert_eq!(playlist.len(), 2);
        assert_eq!(storage.count(BinaryStore::AudioFiles)?, 2);
        Ok(())
    }

    #[test]
    fn removing_earlier_track_keeps_current_one() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3", "c.mp3"])?;
        playlist.load_track(2);
        playlist.play();

        playlist.remove_track(&mut storage, 0)?;

        assert_eq!(playlist.transport(), Transport::Playing(1));
        assert_eq!(current_name(&playlist), Some("c.mp3"));
        Ok(())
    }

    #[test]
    fn removing_later_track_changes_nothing() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3", "c.mp3"])?;
        playlist.load_track(0);
        playlist.pause();

        playlist.remove_track(&mut storage, 2)?;

        assert_eq!(playlist.transport(), Transport::Loaded(0));
        assert_eq!(current_name(&playlist), Some("a.mp3"));
        Ok(())
    }

    #[test]
    fn removal_out_of_range_is_noop() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3"])?;
        playlist.remove_track(&mut storage, 5)?;
        assert_eq!(playlist.len(), 1);
        Ok(())
    }

    #[test]
    fn removal_revokes_handle() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        let handle = playlist.tracks()[0].handle.clone();
        assert_eq!(playlist.handles().live(), 2);

        playlist.remove_track(&mut storage, 0)?;

        assert!(!playlist.handles().is_live(&handle));
        assert_eq!(playlist.handles().live(), 1);
        Ok(())
    }

    #[test]
    fn failed_delete_still_revokes_handle() -> anyhow::Result<()> {
        let (mut storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        storage.db.execute_batch("DROP TABLE audio_files")?;

        let result = playlist.remove_track(&mut storage, 0);

        assert!(result.is_err());
        assert_eq!(playlist.handles().live(), 1);
        assert_eq!(playlist.len(), 1);
        Ok(())
    }

    #[test]
    fn reload_replaces_handles() -> anyhow::Result<()> {
        let (storage, mut playlist) = playlist_with(&["a.mp3", "b.mp3"])?;
        let before = playlist.tracks()[0].handle.clone();

        playlist.load(&storage)?;

        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.handles().live(), 2);
        assert!(!playlist.handles().is_live(&before));
        let payload = playlist.handles().resolve(&playlist.tracks()[1].handle);
        assert_eq!(payload.as_deref(), Some(&b"b.mp3"[..]));
        Ok(())
    }

    #[test]
    fn failed_load_keeps_previous_list() -> anyhow::Result<()> {
        let (storage, mut playlist) = playlist_with(&["a.mp3"])?;
        storage.db.execute_batch("DROP TABLE audio_files")?;

        assert!(playlist.load(&storage).is_err());
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.transport(), Transport::Loaded(0));
        Ok(())
    }

    #[test]
    fn seek_progress_and_volume() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["a.mp3"])?;
        assert_eq!(playlist.volume(), 0.7);
        assert_eq!(playlist.progress(), 0.0);

        playlist.seek_fraction(0.5);
        assert_eq!(playlist.position(), Duration::ZERO);

        playlist.set_duration(Duration::from_secs(200));
        playlist.seek_fraction(0.25);
        assert_eq!(playlist.position(), Duration::from_secs(50));
        assert_eq!(playlist.progress(), 0.25);

        playlist.set_position(Duration::from_secs(999));
        assert_eq!(playlist.position(), Duration::from_secs(200));

        playlist.set_volume(1.5);
        assert_eq!(playlist.volume(), 1.0);
        Ok(())
    }

    #[test]
    fn visualizer_runs_only_while_playing() -> anyhow::Result<()> {
        let (_storage, mut playlist) = playlist_with(&["a.mp3"])?;
        let mut viz = Visualizer::new();

        assert!(playlist.visualize(&mut viz, &mut Flat(200), 640.0, 80.0).is_none());
        playlist.play();
        let bars = playlist.visualize(&mut viz, &mut Flat(200), 640.0, 80.0);
        assert!(bars.is_some_and(|b| !b.is_empty()));
        playlist.pause();
        assert!(playlist.visualize(&mut viz, &mut Flat(200), 640.0, 80.0).is_none());
        Ok(())
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(Duration::ZERO), "0:00");
        assert_eq!(format_time(Duration::from_secs(65)), "1:05");
        assert_eq!(format_time(Duration::from_millis(600_900)), "10:00");
    }
}
