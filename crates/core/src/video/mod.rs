//! Background footage selection: scene query planning plus stock search.

pub mod pexels;
pub mod queries;

pub use pexels::{PexelsClient, StockProvider};
pub use queries::{merge_empty_intervals, LlmQueryPlanner, QueryPlanner};

use anyhow::Result;

use crate::types::{SceneMedia, SceneQuery};

/// Pick one stock asset per scene query, deduplicating across scenes.
///
/// Scenes where nothing suitable exists get `media: None`; callers can
/// then merge those gaps into neighbouring scenes with
/// [`merge_empty_intervals`].
pub fn select_scene_media(
    provider: &dyn StockProvider,
    queries: &[SceneQuery],
) -> Result<Vec<SceneMedia>> {
    let mut used = std::collections::HashSet::new();
    let mut scenes = Vec::with_capacity(queries.len());

    for query in queries {
        let duration = (query.end - query.start).max(1.0);
        let media = provider.find_media(&query.keywords, duration, &mut used)?;
        if media.is_none() {
            log::warn!(
                "no stock media for interval [{:.2}, {:.2}] ({:?})",
                query.start,
                query.end,
                query.keywords
            );
        }
        scenes.push(SceneMedia {
            start: query.start,
            end: query.end,
            media,
        });
    }

    Ok(scenes)
}
