//! Real-time channel configuration

/// Real-time configuration
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Events buffered per subscriber before it starts skipping
    pub channel_capacity: usize,
    /// Chat author for sockets that never registered a name
    pub anonymous_name: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            anonymous_name: "Anónimo".to_string(),
        }
    }
}
