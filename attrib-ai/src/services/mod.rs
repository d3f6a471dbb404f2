//! Adapters for external collaborators
//!
//! Every external tool (text backend, captioner, ffprobe/ffmpeg) is a child
//! process run through [`process::run_with_timeout`]. Callers bound whole
//! adapter calls with [`process::run_bounded`].

pub mod backend_client;
pub mod caption_client;
pub mod file_scanner;
pub mod frame_extractor;
pub mod process;

pub use backend_client::{BackendError, BackendGateway, OllamaCliBackend, TextBackend};
pub use caption_client::{CaptionError, CaptionProvider, CommandCaptionProvider};
pub use file_scanner::{FileScanner, ScanError};
pub use frame_extractor::{FfmpegFrameExtractor, FrameError, FrameExtractor};
pub use process::{ProcessError, ProcessOutput};
