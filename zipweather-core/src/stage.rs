use std::fmt;

const TRACK_LEN: usize = 3;

/// One user-visible phase of a lookup, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Idle,
    Geocoding,
    Weather,
    Complete,
}

impl Stage {
    /// Stages drawn on the progress track. `Idle` is the resting state and is never drawn.
    pub const TRACK: [Stage; TRACK_LEN] = [Stage::Geocoding, Stage::Weather, Stage::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Geocoding => "geocoding",
            Stage::Weather => "weather",
            Stage::Complete => "complete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Idle => "Ready",
            Stage::Geocoding => "Looking up your location...",
            Stage::Weather => "Getting weather data...",
            Stage::Complete => "Complete!",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Stage::Idle => "📍",
            Stage::Geocoding => "🗺️",
            Stage::Weather => "☁️",
            Stage::Complete => "✅",
        }
    }

    /// Status line for screen readers and plain-text output.
    pub fn status_text(&self) -> &'static str {
        match self {
            Stage::Idle => "Ready to fetch weather",
            Stage::Geocoding => "Step 1 of 3: Looking up your location",
            Stage::Weather => "Step 2 of 3: Getting weather data",
            Stage::Complete => "Complete: Weather data loaded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageMark {
    #[default]
    Pending,
    Active,
    Completed,
}

/// Snapshot of what the progress display should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBoard {
    pub visible: bool,
    pub current: Stage,
    marks: [StageMark; TRACK_LEN],
}

impl Default for StageBoard {
    fn default() -> Self {
        Self {
            visible: false,
            current: Stage::Idle,
            marks: [StageMark::Pending; TRACK_LEN],
        }
    }
}

impl StageBoard {
    pub fn mark(&self, stage: Stage) -> StageMark {
        Stage::TRACK
            .iter()
            .position(|s| *s == stage)
            .map(|i| self.marks[i])
            .unwrap_or_default()
    }

    pub fn status_text(&self) -> &'static str {
        self.current.status_text()
    }

    /// Make `stage` current: everything before it on the track is completed,
    /// it is active, everything after it is pending.
    pub(crate) fn activate(&mut self, stage: Stage) {
        self.current = stage;
        for (mark, s) in self.marks.iter_mut().zip(Stage::TRACK) {
            *mark = match s.cmp(&stage) {
                std::cmp::Ordering::Less => StageMark::Completed,
                std::cmp::Ordering::Equal => StageMark::Active,
                std::cmp::Ordering::Greater => StageMark::Pending,
            };
        }
    }

    /// Back to idle with nothing marked; visibility is left alone.
    pub(crate) fn clear(&mut self) {
        self.current = Stage::Idle;
        self.marks = [StageMark::Pending; TRACK_LEN];
    }

    pub fn is_clear(&self) -> bool {
        self.current == Stage::Idle && self.marks.iter().all(|m| *m == StageMark::Pending)
    }
}
