use tracing::info;

use crate::animation::{FrameSequence, SparkSequences};
use crate::error::ChatError;

const SMALL_SPARK: &str = include_str!("../assets/spark_small.json");
const LARGE_SPARK: &str = include_str!("../assets/spark_large.json");

/// Process-wide, read-only resources handed to every session.
#[derive(Debug, Clone)]
pub struct AppContext {
    sequences: SparkSequences,
}

impl AppContext {
    /// Parse the bundled spark sequences. Call once at startup.
    pub fn load() -> Result<Self, ChatError> {
        let small = FrameSequence::from_json(SMALL_SPARK)?;
        let large = FrameSequence::from_json(LARGE_SPARK)?;
        info!(
            small_frames = small.num_frames(),
            large_frames = large.num_frames(),
            "spark sequences loaded"
        );
        Ok(Self::with_sequences(SparkSequences::new(small, large)))
    }

    pub fn with_sequences(sequences: SparkSequences) -> Self {
        Self { sequences }
    }

    pub fn sequences(&self) -> &SparkSequences {
        &self.sequences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SparkSize;

    #[test]
    fn test_bundled_sequences_load() {
        let ctx = AppContext::load().unwrap();
        let small = ctx.sequences().get(SparkSize::Small);
        let large = ctx.sequences().get(SparkSize::Large);
        // The footer rests on frame 3 and the empty state on frame 4.
        assert!(small.num_frames() > 3);
        assert!(large.num_frames() > 4);
        for i in 0..large.num_frames() {
            assert_eq!(large.frame(i).glyph.len(), large.height as usize);
        }
    }
}
