use anyhow::Result;
use std::fmt::Write as _;

use crate::state::{AppState, SegmentData};

/// List every known segment, in catalog order
pub fn list_segments(state: &AppState) -> Result<()> {
    let segments: Vec<SegmentData> = state.catalog.iter().map(SegmentData::from).collect();

    state.emit(&segments, |segments| {
        let mut out = String::new();
        for s in segments {
            let _ = writeln!(
                out,
                "{:<30} {:<24} ages {:<7} {} personas  [{}]",
                s.name,
                s.framework,
                s.age_range,
                s.persona_count,
                s.key_motivations.join(", ")
            );
        }
        out
    })
}
