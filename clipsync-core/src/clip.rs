//! Local mirror of clip-level values reported by the host.

use crate::host::ClipEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct ClipParams {
    pub exists: bool,
    /// Column the host is currently playing, if any.
    pub playing_column: Option<usize>,
    /// Play range in beats.
    pub play_start: f64,
    pub play_end: f64,
    /// Loop range in beats.
    pub loop_start: f64,
    pub loop_length: f64,
    pub loop_enabled: bool,
    /// 0.0-1.0
    pub shuffle: f64,
    /// 0.0-1.0
    pub accent: f64,
    pub pinned: bool,
    pub color: [f32; 3],
    pub can_hold_note_data: bool,
}

impl ClipParams {
    pub fn new() -> Self {
        Self {
            exists: false,
            playing_column: None,
            play_start: 0.0,
            play_end: 0.0,
            loop_start: 0.0,
            loop_length: 0.0,
            loop_enabled: false,
            shuffle: 0.0,
            accent: 0.0,
            pinned: false,
            color: [0.0; 3],
            can_hold_note_data: false,
        }
    }

    pub fn apply(&mut self, event: ClipEvent) {
        match event {
            ClipEvent::Exists(v) => self.exists = v,
            ClipEvent::PlayingColumn(v) => self.playing_column = v,
            ClipEvent::PlayStart(v) => self.play_start = v,
            ClipEvent::PlayEnd(v) => self.play_end = v,
            ClipEvent::LoopStart(v) => self.loop_start = v,
            ClipEvent::LoopLength(v) => self.loop_length = v,
            ClipEvent::LoopEnabled(v) => self.loop_enabled = v,
            ClipEvent::Shuffle(v) => self.shuffle = v,
            ClipEvent::Accent(v) => self.accent = v,
            ClipEvent::Pinned(v) => self.pinned = v,
            ClipEvent::Color(v) => self.color = v,
            ClipEvent::CanHoldNoteData(v) => self.can_hold_note_data = v,
        }
    }

    /// Whether the host is currently playing `column`.
    pub fn is_playing_column(&self, column: usize) -> bool {
        self.playing_column == Some(column)
    }
}

impl Default for ClipParams {
    fn default() -> Self {
        Self::new()
    }
}
