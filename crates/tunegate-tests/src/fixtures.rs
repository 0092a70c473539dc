//! Upstream payload fixtures.

use serde_json::{Value, json};

/// Factory for YouTube Data API payloads.
pub struct YouTubeFixture;

impl YouTubeFixture {
    /// A `search.list` response with `count` videos titled after `query`.
    pub fn search(query: &str, count: usize) -> Value {
        let items: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "kind": "youtube#searchResult",
                    "id": {"kind": "youtube#video", "videoId": format!("yt{:09}", i)},
                    "snippet": {
                        "title": format!("{} (Official Video {})", query, i),
                        "channelTitle": "MusicVEVO",
                        "thumbnails": {
                            "default": {"url": format!("https://i.ytimg.com/vi/{}/default.jpg", i)},
                            "medium": {"url": format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", i)},
                            "high": {"url": format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", i)}
                        }
                    }
                })
            })
            .collect();

        json!({
            "kind": "youtube#searchListResponse",
            "pageInfo": {"totalResults": count, "resultsPerPage": count},
            "items": items
        })
    }

    /// A `videos.list` most-popular chart with durations.
    pub fn chart(count: usize) -> Value {
        let items: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "kind": "youtube#video",
                    "id": format!("chart{:06}", i),
                    "snippet": {"title": format!("Chart hit #{}", i + 1), "channelTitle": "Charts"},
                    "contentDetails": {"duration": "PT3M30S"}
                })
            })
            .collect();

        json!({"kind": "youtube#videoListResponse", "items": items})
    }

    /// The error body YouTube sends when the daily quota is gone.
    pub fn quota_exceeded() -> Value {
        json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"domain": "youtube.quota", "reason": "quotaExceeded"}]
            }
        })
    }
}

/// Factory for iTunes Search API payloads.
pub struct ItunesFixture;

impl ItunesFixture {
    pub fn search(query: &str, count: usize) -> Value {
        let results: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "wrapperType": "track",
                    "kind": "song",
                    "trackId": 1000 + i,
                    "trackName": format!("{} {}", query, i),
                    "artistName": "Some Artist",
                    "trackTimeMillis": 215000,
                    "previewUrl": format!("https://audio-ssl.itunes.apple.com/{}.m4a", i),
                    "artworkUrl100": format!("https://is1-ssl.mzstatic.com/{}/100x100bb.jpg", i),
                    "artworkUrl60": format!("https://is1-ssl.mzstatic.com/{}/60x60bb.jpg", i)
                })
            })
            .collect();

        json!({"resultCount": count, "results": results})
    }
}

/// Factory for Deezer API payloads.
pub struct DeezerFixture;

impl DeezerFixture {
    pub fn search(query: &str, count: usize) -> Value {
        let data: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": 3_000_000 + i,
                    "title": format!("{} {}", query, i),
                    "duration": 201,
                    "preview": format!("https://cdns-preview.dzcdn.net/{}.mp3", i),
                    "artist": {"id": 1, "name": "Deezer Artist"},
                    "album": {
                        "cover_small": "https://e-cdns-images.dzcdn.net/56x56.jpg",
                        "cover_medium": "https://e-cdns-images.dzcdn.net/250x250.jpg"
                    }
                })
            })
            .collect();

        json!({"data": data, "total": count})
    }

    /// Deezer reports errors inside a 200 response.
    pub fn error() -> Value {
        json!({"error": {"type": "Exception", "message": "Quota limit exceeded", "code": 4}})
    }
}
