//! Pexels stock footage client.
//!
//! Searches portrait video first, falls back to high-resolution photos,
//! and keeps a used-asset set so the same clip never appears twice in
//! one video.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::types::{MediaKind, StockMedia};

const VIDEO_SEARCH_URL: &str = "https://api.pexels.com/videos/search";
const PHOTO_SEARCH_URL: &str = "https://api.pexels.com/v1/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const REQUEST_RETRIES: u32 = 3;
const RATE_LIMIT_DELAY: Duration = Duration::from_millis(1200);
const SERVER_ERROR_DELAY: Duration = Duration::from_secs(1);

const VIDEOS_PER_PAGE: u32 = 30;
const PHOTOS_PER_PAGE: u32 = 20;

/// Finds one stock asset for a scene.
///
/// `used` carries the base URLs already placed in the video; accepted
/// assets are added to it.
pub trait StockProvider {
    fn find_media(
        &self,
        keywords: &[String],
        target_duration: f64,
        used: &mut HashSet<String>,
    ) -> Result<Option<StockMedia>>;
}

pub struct PexelsClient {
    client: reqwest::blocking::Client,
    api_key: String,
}

struct VideoCandidate {
    url: String,
    base: String,
    width: u32,
    height: u32,
    pixels: u64,
    size: u64,
    fps: f64,
    duration_diff: f64,
}

struct PhotoCandidate {
    url: String,
    base: String,
    width: u32,
    height: u32,
}

impl PexelsClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("Mozilla/5.0")
            .build()
            .context("failed to build HTTP client")?;
        Ok(PexelsClient {
            client,
            api_key: api_key.to_string(),
        })
    }

    /// GET with retries on rate limiting and server errors.
    fn safe_request(&self, url: &str, params: &[(&str, String)]) -> Result<serde_json::Value> {
        let mut last_status: Option<reqwest::StatusCode> = None;
        for _ in 0..REQUEST_RETRIES {
            let response = self
                .client
                .get(url)
                .header("Authorization", &self.api_key)
                .query(params)
                .send();

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    log::debug!("stock search request error: {}", e);
                    std::thread::sleep(SERVER_ERROR_DELAY);
                    continue;
                }
            };

            let status = response.status();
            last_status = Some(status);
            if status.as_u16() == 429 {
                log::debug!("stock search rate limited, backing off");
                std::thread::sleep(RATE_LIMIT_DELAY);
                continue;
            }
            if status.is_server_error() {
                std::thread::sleep(SERVER_ERROR_DELAY);
                continue;
            }
            if !status.is_success() {
                anyhow::bail!("stock search returned HTTP {}", status);
            }
            return response.json().context("invalid stock search response");
        }
        anyhow::bail!(
            "stock search failed after {} attempts (last status: {:?})",
            REQUEST_RETRIES,
            last_status
        )
    }

    fn search_videos(&self, query: &str) -> Result<serde_json::Value> {
        self.safe_request(
            VIDEO_SEARCH_URL,
            &[
                ("query", query.to_string()),
                ("orientation", "portrait".to_string()),
                ("per_page", VIDEOS_PER_PAGE.to_string()),
            ],
        )
    }

    fn search_photos(&self, query: &str) -> Result<serde_json::Value> {
        self.safe_request(
            PHOTO_SEARCH_URL,
            &[
                ("query", query.to_string()),
                ("orientation", "portrait".to_string()),
                ("per_page", PHOTOS_PER_PAGE.to_string()),
                ("size", "large".to_string()),
            ],
        )
    }

    fn best_video(
        &self,
        keywords: &[String],
        target_duration: f64,
        used: &mut HashSet<String>,
    ) -> Option<StockMedia> {
        for query in keywords {
            let data = match self.search_videos(query) {
                Ok(d) => d,
                Err(e) => {
                    log::debug!("video search for {:?} failed: {}", query, e);
                    continue;
                }
            };

            let mut candidates = collect_video_candidates(&data, target_duration, used);
            if candidates.is_empty() {
                continue;
            }
            sort_video_candidates(&mut candidates);

            let best = candidates.remove(0);
            used.insert(best.base);
            return Some(StockMedia {
                kind: MediaKind::Video,
                url: best.url,
                width: best.width,
                height: best.height,
            });
        }
        None
    }

    fn best_photo(&self, keywords: &[String], used: &mut HashSet<String>) -> Option<StockMedia> {
        for query in keywords {
            let data = match self.search_photos(query) {
                Ok(d) => d,
                Err(e) => {
                    log::debug!("photo search for {:?} failed: {}", query, e);
                    continue;
                }
            };

            let mut candidates = collect_photo_candidates(&data, used);
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_by(|a, b| {
                let ka = (a.width as u64 * a.height as u64, a.height, a.width);
                let kb = (b.width as u64 * b.height as u64, b.height, b.width);
                kb.cmp(&ka)
            });

            let best = candidates.remove(0);
            used.insert(best.base);
            return Some(StockMedia {
                kind: MediaKind::Image,
                url: best.url,
                width: best.width,
                height: best.height,
            });
        }
        None
    }
}

impl StockProvider for PexelsClient {
    fn find_media(
        &self,
        keywords: &[String],
        target_duration: f64,
        used: &mut HashSet<String>,
    ) -> Result<Option<StockMedia>> {
        if let Some(video) = self.best_video(keywords, target_duration, used) {
            return Ok(Some(video));
        }
        // Photo fallback when no suitable portrait clip exists
        Ok(self.best_photo(keywords, used))
    }
}

/// Portrait check: height/width within the 9:16 neighbourhood.
fn is_portrait_ratio(width: u32, height: u32) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    let ratio = height as f64 / width as f64;
    (1.70..=1.90).contains(&ratio)
}

fn base_url(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

fn collect_video_candidates(
    data: &serde_json::Value,
    target_duration: f64,
    used: &HashSet<String>,
) -> Vec<VideoCandidate> {
    let mut candidates = Vec::new();
    let videos = match data["videos"].as_array() {
        Some(v) => v,
        None => return candidates,
    };

    for video in videos {
        let duration = video["duration"].as_f64().unwrap_or(0.0);
        let files = match video["video_files"].as_array() {
            Some(f) => f,
            None => continue,
        };
        for file in files {
            let width = file["width"].as_u64().unwrap_or(0) as u32;
            let height = file["height"].as_u64().unwrap_or(0) as u32;
            if !is_portrait_ratio(width, height) {
                continue;
            }
            let link = match file["link"].as_str() {
                Some(l) => l,
                None => continue,
            };
            let base = base_url(link);
            if used.contains(&base) {
                continue;
            }
            candidates.push(VideoCandidate {
                url: link.to_string(),
                base,
                width,
                height,
                pixels: width as u64 * height as u64,
                size: file["file_size"].as_u64().unwrap_or(0),
                fps: file["fps"].as_f64().unwrap_or(0.0),
                duration_diff: (duration - target_duration).abs(),
            });
        }
    }
    candidates
}

/// Highest resolution first, then size, then fps, then closest duration.
fn sort_video_candidates(candidates: &mut [VideoCandidate]) {
    candidates.sort_by(|a, b| {
        b.pixels
            .cmp(&a.pixels)
            .then(b.size.cmp(&a.size))
            .then(b.fps.total_cmp(&a.fps))
            .then(a.duration_diff.total_cmp(&b.duration_diff))
    });
}

fn collect_photo_candidates(data: &serde_json::Value, used: &HashSet<String>) -> Vec<PhotoCandidate> {
    let mut candidates = Vec::new();
    let photos = match data["photos"].as_array() {
        Some(p) => p,
        None => return candidates,
    };

    for photo in photos {
        let url = match photo["src"]["original"].as_str() {
            Some(u) => u,
            None => continue,
        };
        let base = base_url(url);
        if used.contains(&base) {
            continue;
        }
        candidates.push(PhotoCandidate {
            url: url.to_string(),
            base,
            width: photo["width"].as_u64().unwrap_or(0) as u32,
            height: photo["height"].as_u64().unwrap_or(0) as u32,
        });
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_portrait_ratio() {
        assert!(is_portrait_ratio(1080, 1920)); // exactly 16:9 portrait
        assert!(is_portrait_ratio(1000, 1750));
        assert!(!is_portrait_ratio(1920, 1080)); // landscape
        assert!(!is_portrait_ratio(1080, 1080)); // square
        assert!(!is_portrait_ratio(0, 1920));
        assert!(!is_portrait_ratio(100, 200)); // 2.0, too tall
    }

    #[test]
    fn test_base_url_strips_query_string() {
        assert_eq!(
            base_url("https://cdn.example/a.mp4?token=abc"),
            "https://cdn.example/a.mp4"
        );
        assert_eq!(base_url("https://cdn.example/a.mp4"), "https://cdn.example/a.mp4");
    }

    #[test]
    fn test_collect_video_candidates_filters_ratio_and_used() {
        let data = serde_json::json!({
            "videos": [{
                "duration": 10,
                "video_files": [
                    {"link": "https://v/portrait.mp4?x=1", "width": 1080, "height": 1920,
                     "fps": 30.0, "file_size": 500},
                    {"link": "https://v/landscape.mp4", "width": 1920, "height": 1080,
                     "fps": 30.0, "file_size": 900},
                    {"link": "https://v/used.mp4", "width": 1080, "height": 1920,
                     "fps": 30.0, "file_size": 400}
                ]
            }]
        });
        let mut used = HashSet::new();
        used.insert("https://v/used.mp4".to_string());

        let candidates = collect_video_candidates(&data, 5.0, &used);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].base, "https://v/portrait.mp4");
    }

    #[test]
    fn test_sort_prefers_resolution_then_size() {
        let mut candidates = vec![
            VideoCandidate {
                url: "small".into(), base: "small".into(), width: 720, height: 1280,
                pixels: 720 * 1280, size: 900, fps: 60.0, duration_diff: 0.0,
            },
            VideoCandidate {
                url: "big".into(), base: "big".into(), width: 1080, height: 1920,
                pixels: 1080 * 1920, size: 100, fps: 24.0, duration_diff: 10.0,
            },
        ];
        sort_video_candidates(&mut candidates);
        assert_eq!(candidates[0].url, "big");
    }

    #[test]
    fn test_collect_photo_candidates() {
        let data = serde_json::json!({
            "photos": [
                {"src": {"original": "https://p/a.jpg"}, "width": 2000, "height": 3600},
                {"src": {}, "width": 100, "height": 180}
            ]
        });
        let used = HashSet::new();
        let candidates = collect_photo_candidates(&data, &used);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].height, 3600);
    }
}
