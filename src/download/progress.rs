// vault-core - Epic Games marketplace vault downloader core
// Copyright (C) 2026 vault-core contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Progress events for the download/decode/extract phases
//!
//! Each phase reports exactly one `Start` carrying the total work item count,
//! zero or more `Progress` events with a monotonically non-decreasing
//! finished count, and exactly one `End`. That ordering is part of the
//! crate's contract with display layers, not an internal detail.
//!
//! The sink is a plain callback so this crate stays free of any rendering
//! concern; a CLI hangs a progress bar off it, tests hang a `Vec`.

use std::sync::Arc;

/// Pipeline phase a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Download,
    Decode,
    Extract,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Download => "download",
            Phase::Decode => "decode",
            Phase::Extract => "extract",
        }
    }
}

/// One progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Start { phase: Phase, total: usize },
    Progress { phase: Phase, finished: usize },
    End { phase: Phase },
}

/// Callback accepting progress events; shared across spawned work
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Per-phase reporter enforcing the start/progress/end shape
pub(crate) struct PhaseReporter<'a> {
    sink: Option<&'a ProgressSink>,
    phase: Phase,
}

impl<'a> PhaseReporter<'a> {
    /// Emit `Start{total}` and return the reporter for the rest of the phase
    pub fn start(sink: Option<&'a ProgressSink>, phase: Phase, total: usize) -> Self {
        if let Some(sink) = sink {
            sink(ProgressEvent::Start { phase, total });
        }
        Self { sink, phase }
    }

    pub fn progress(&self, finished: usize) {
        if let Some(sink) = self.sink {
            sink(ProgressEvent::Progress {
                phase: self.phase,
                finished,
            });
        }
    }

    pub fn end(self) {
        if let Some(sink) = self.sink {
            sink(ProgressEvent::End { phase: self.phase });
        }
    }
}
