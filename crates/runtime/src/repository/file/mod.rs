//! File-based repository implementations.

mod replay;

pub use replay::FileReplayRepository;
