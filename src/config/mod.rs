mod settings;

pub use settings::{MatchmakingConfig, ServerConfig, Settings, WebSocketConfig};
