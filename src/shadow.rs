//! Device shadow topic naming.
//!
//! Topic structure for a thing named `iotrain-01`:
//! ```text
//! $aws/things/iotrain-01/shadow/update           - reported state (device publishes)
//! $aws/things/iotrain-01/shadow/update/delta     - desired changes (device subscribes)
//! ```

/// Prefix shared by every classic shadow topic.
pub const SHADOW_PREFIX: &str = "$aws/things";

/// Precomputed shadow topics for one thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTopics {
    thing_name: String,
    update: String,
    delta: String,
}

impl ShadowTopics {
    /// Build the topic set for `thing_name`.
    pub fn new(thing_name: &str) -> Self {
        let update = format!("{SHADOW_PREFIX}/{thing_name}/shadow/update");
        Self {
            thing_name: thing_name.to_string(),
            delta: format!("{update}/delta"),
            update,
        }
    }

    /// The thing these topics belong to.
    pub fn thing_name(&self) -> &str {
        &self.thing_name
    }

    /// Topic the device publishes reported state to.
    pub fn update(&self) -> &str {
        &self.update
    }

    /// Topic carrying desired-state deltas.
    pub fn delta(&self) -> &str {
        &self.delta
    }

    /// Returns true if `topic` is this thing's delta topic.
    pub fn is_delta(&self, topic: &str) -> bool {
        topic == self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_names() {
        let topics = ShadowTopics::new("iotrain-01");
        assert_eq!(topics.thing_name(), "iotrain-01");
        assert_eq!(topics.update(), "$aws/things/iotrain-01/shadow/update");
        assert_eq!(topics.delta(), "$aws/things/iotrain-01/shadow/update/delta");
    }

    #[test]
    fn delta_match_is_exact() {
        let topics = ShadowTopics::new("train");
        assert!(topics.is_delta("$aws/things/train/shadow/update/delta"));
        assert!(!topics.is_delta("$aws/things/other/shadow/update/delta"));
        assert!(!topics.is_delta("$aws/things/train/shadow/update"));
    }
}
