/// Progress reporting for the mesh pipelines.
///
/// Pipelines never print. They emit [`ProgressEvent`]s and per-item ticks to a
/// [`Progress`] sink supplied by the caller; the binary decides whether those end
/// up as a progress bar, log lines, or nothing at all.
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// A pipeline stage completing.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    HeightmapLoaded {
        path: PathBuf,
        width: usize,
        height: usize,
    },
    Downsampled {
        resolution: u32,
    },
    MeshLoaded {
        path: PathBuf,
        vertices: usize,
        faces: usize,
        uvs: usize,
    },
    VerticesBuilt {
        count: usize,
    },
    FacesBuilt {
        count: usize,
    },
    Scaled {
        factor: f64,
    },
    Rotated {
        degrees: f64,
    },
    NormalsComputed {
        count: usize,
    },
    Displaced {
        vertices: usize,
    },
    Saved {
        path: PathBuf,
    },
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressEvent::HeightmapLoaded {
                path,
                width,
                height,
            } => write!(f, "Loaded heightmap {} ({}x{})", path.display(), width, height),
            ProgressEvent::Downsampled { resolution } => {
                write!(f, "Resampled heightmap to {}x{}", resolution, resolution)
            }
            ProgressEvent::MeshLoaded {
                path,
                vertices,
                faces,
                uvs,
            } => write!(
                f,
                "Loaded mesh {} ({} vertices, {} faces, {} uvs)",
                path.display(),
                vertices,
                faces,
                uvs
            ),
            ProgressEvent::VerticesBuilt { count } => write!(f, "Generated {} vertices", count),
            ProgressEvent::FacesBuilt { count } => write!(f, "Generated {} quads", count),
            ProgressEvent::Scaled { factor } => write!(f, "Applied scale factor {}", factor),
            ProgressEvent::Rotated { degrees } => {
                write!(f, "Rotated vertices by {} degrees around X", degrees)
            }
            ProgressEvent::NormalsComputed { count } => {
                write!(f, "Computed {} face normals", count)
            }
            ProgressEvent::Displaced { vertices } => write!(f, "Displaced {} vertices", vertices),
            ProgressEvent::Saved { path } => write!(f, "Saved mesh to {}", path.display()),
        }
    }
}

/// Sink for pipeline progress. Implementations must tolerate `advance`
/// without a preceding `begin`.
pub trait Progress {
    fn stage(&self, event: ProgressEvent);

    /// Start a determinate unit of work of `len` items.
    fn begin(&self, _len: u64, _message: &str) {}

    fn advance(&self, _delta: u64) {}

    fn finish(&self, _message: &str) {}
}

/// Discards everything.
pub struct NoProgress;

impl Progress for NoProgress {
    fn stage(&self, _event: ProgressEvent) {}
}

/// Stage events as `tracing` info lines.
pub struct LogProgress;

impl Progress for LogProgress {
    fn stage(&self, event: ProgressEvent) {
        info!("{}", event);
    }

    fn finish(&self, message: &str) {
        info!("{}", message);
    }
}

/// Terminal progress bar for the per-face and per-vertex loops, with stage
/// events logged through `tracing`.
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn stage(&self, event: ProgressEvent) {
        info!("{}", event);
    }

    fn begin(&self, len: u64, message: &str) {
        let pb = ProgressBar::new(len);
        let template = "[{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg}";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style.progress_chars("▉▊▋▌▍▎▏ "));
        }
        pb.set_message(message.to_string());

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn advance(&self, delta: u64) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.inc(delta);
            }
        }
    }

    fn finish(&self, message: &str) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(message.to_string());
            }
        }
    }
}

/// Keeps every stage event in order. Used to observe pipelines in tests.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
    ticks: Mutex<u64>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.lock().map(|ticks| *ticks).unwrap_or_default()
    }
}

impl Progress for RecordingProgress {
    fn stage(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn advance(&self, delta: u64) {
        if let Ok(mut ticks) = self.ticks.lock() {
            *ticks += delta;
        }
    }
}
