pub mod config;
pub mod graph;
pub mod layout;
pub mod record;
pub mod rng;
pub mod rooms;
pub mod types;

pub use config::{
    ConfigError, CountRange, GraphConfig, LayoutConfig, RoomConfig, ScaleRange, SeedSpec,
};
pub use graph::{
    CandidateSegment, GraphBuilder, IncrementalSession, NavGraph, ProtocolError, ProtocolNote,
    SessionEvent, SessionSummary, SpatialIndex, Verdict,
};
pub use layout::{DungeonLayout, generate_layout};
pub use record::{LayoutRecord, RecordError, load_record, record_for, replay_record, save_record};
pub use rng::{DeterministicRng, fold_text_seed};
pub use rooms::{GrowthStrategy, Room, RoomPlacer};
pub use types::*;
