//! Documentation tags derived from segment chains.

use super::segment::PathSegment;
use crate::config::TagStrategy;
use crate::naming::class_name;

pub trait TagGenerator {
    fn tags(&self, segment: &PathSegment<'_>) -> Vec<String>;
}

/// Tags a path with the class-cased name of the segment at `level`
/// (1-based over named segments), or of the last segment when the chain
/// is shorter.
#[derive(Debug, Clone, Copy)]
pub struct SegmentTagGenerator {
    level: usize,
}

impl SegmentTagGenerator {
    pub fn new(level: usize) -> Self {
        Self {
            level: level.max(1),
        }
    }
}

impl Default for SegmentTagGenerator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl TagGenerator for SegmentTagGenerator {
    fn tags(&self, segment: &PathSegment<'_>) -> Vec<String> {
        let chain = segment.chain();
        let picked = chain.get(self.level - 1).or_else(|| chain.last());
        picked
            .and_then(|s| s.name())
            .map(|name| vec![class_name(name)])
            .unwrap_or_default()
    }
}

pub fn generators_for(strategies: &[TagStrategy]) -> Vec<Box<dyn TagGenerator>> {
    strategies
        .iter()
        .map(|strategy| match strategy {
            TagStrategy::Segment { level } => {
                Box::new(SegmentTagGenerator::new(*level)) as Box<dyn TagGenerator>
            }
        })
        .collect()
}
