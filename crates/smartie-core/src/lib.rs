#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod services;
pub mod settings;
pub mod state;

// Re-export commonly used types for convenience
pub use domain::{
    AVATAR_CHOICES, Citation, DEFAULT_AVATAR, DEFAULT_DISPLAY_NAME, FAILURE_TEXT, FontSize,
    Message, Origin, PLACEHOLDER_TEXT, Preferences, Sender, SessionIdentity, Theme,
    UnknownPreference, WindowSize,
};
pub use events::{EventBus, Subscription, TranscriptEvent};
pub use ports::{
    Answer, AnswerError, AnswerRequest, AnswerService, FixedLocation, GeoPosition, KeyValueStore,
    LocationError, LocationProvider, MemoryStore, StorageError, keys,
};
pub use services::{ConversationStore, ProfileError, ProfileService, StoreError};
pub use settings::{ConfigError, SessionConfig, TranscriptPolicy};
pub use state::{
    RequestGuard, RequestPhase, SessionState, SessionStateCell, TransitionError, VoiceActivity,
};
