//! In-memory repository implementations.

mod replay;

pub use replay::InMemoryReplayRepository;
