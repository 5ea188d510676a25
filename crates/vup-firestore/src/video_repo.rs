//! Video record store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use vup_models::{Frame, Segment, SegmentStatus, Video, VideoId, VideoStatus, Visibility};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Fields, ToFirestoreValue, Value};

pub const DEFAULT_VIDEOS_COLLECTION: &str = "videos";

/// Fields written by [`VideoRepository::save`]. `deleted` is absent so a
/// pipeline save never undoes a soft delete.
const SAVE_FIELDS: &[&str] = &[
    "title",
    "description",
    "owner_id",
    "original_filename",
    "source_key",
    "visibility",
    "views",
    "duration_secs",
    "status",
    "segments",
    "frames",
    "updated_at",
];

const DELETE_FIELDS: &[&str] = &["deleted", "updated_at"];

/// Persistent store for [`Video`] records.
///
/// The pipeline and the delete path write disjoint fields, so a soft delete
/// issued during a run survives the run's saves and vice versa.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: &Video) -> FirestoreResult<()>;

    async fn get(&self, id: &VideoId) -> FirestoreResult<Option<Video>>;

    /// Update an existing record, leaving the stored `deleted` flag as is.
    async fn save(&self, video: &Video) -> FirestoreResult<()>;

    /// Set the soft-delete flag and `updated_at` only.
    async fn mark_deleted(&self, id: &VideoId) -> FirestoreResult<()>;

    /// Cheap reachability check used by readiness probes.
    async fn check_health(&self) -> FirestoreResult<()> {
        Ok(())
    }
}

/// Firestore-backed repository.
#[derive(Clone)]
pub struct FirestoreVideoRepository {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreVideoRepository {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// Client from the environment, collection from `FIRESTORE_VIDEOS_COLLECTION`.
    pub fn from_env() -> FirestoreResult<Self> {
        let collection = std::env::var("FIRESTORE_VIDEOS_COLLECTION")
            .unwrap_or_else(|_| DEFAULT_VIDEOS_COLLECTION.to_string());
        Ok(Self::new(FirestoreClient::from_env()?, collection))
    }
}

#[async_trait]
impl VideoRepository for FirestoreVideoRepository {
    async fn create(&self, video: &Video) -> FirestoreResult<()> {
        let (client, collection, id) = (&self.client, self.collection.as_str(), video.id.as_str());
        let fields = video_to_fields(video);
        client
            .with_retry("create_video", move || {
                client.create_document(collection, id, fields.clone())
            })
            .await?;
        debug!(video_id = %video.id, "Created video record");
        Ok(())
    }

    async fn get(&self, id: &VideoId) -> FirestoreResult<Option<Video>> {
        let (client, collection) = (&self.client, self.collection.as_str());
        let doc = client
            .with_retry("get_video", move || client.get_document(collection, id.as_str()))
            .await?;

        match doc {
            Some(doc) => {
                let fields = doc
                    .fields
                    .ok_or_else(|| FirestoreError::invalid_response("Document has no fields"))?;
                Ok(Some(fields_to_video(&fields, id)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, video: &Video) -> FirestoreResult<()> {
        let (client, collection, id) = (&self.client, self.collection.as_str(), video.id.as_str());
        let mut fields = video_to_fields(video);
        fields.retain(|name, _| SAVE_FIELDS.contains(&name.as_str()));
        client
            .with_retry("save_video", move || {
                client.update_document(collection, id, fields.clone(), Some(SAVE_FIELDS))
            })
            .await?;
        Ok(())
    }

    async fn mark_deleted(&self, id: &VideoId) -> FirestoreResult<()> {
        let (client, collection) = (&self.client, self.collection.as_str());
        let mut fields = HashMap::new();
        fields.insert("deleted".to_string(), true.to_firestore_value());
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());
        client
            .with_retry("delete_video", move || {
                client.update_document(collection, id.as_str(), fields.clone(), Some(DELETE_FIELDS))
            })
            .await?;
        debug!(video_id = %id, "Soft-deleted video record");
        Ok(())
    }

    async fn check_health(&self) -> FirestoreResult<()> {
        self.client
            .get_document(&self.collection, "_health")
            .await
            .map(|_| ())
    }
}

fn segment_to_value(segment: &Segment) -> Value {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), segment.id.to_firestore_value());
    fields.insert("sequence".to_string(), segment.sequence.to_firestore_value());
    fields.insert("status".to_string(), segment.status.as_str().to_firestore_value());
    fields.insert("storage_key".to_string(), segment.storage_key.to_firestore_value());
    fields.insert("start_secs".to_string(), segment.start_secs.to_firestore_value());
    fields.insert("end_secs".to_string(), segment.end_secs.to_firestore_value());
    fields.insert("size_bytes".to_string(), segment.size_bytes.to_firestore_value());
    fields.insert("quality".to_string(), segment.quality.to_firestore_value());
    fields.insert("created_at".to_string(), segment.created_at.to_firestore_value());
    Value::map(fields)
}

fn frame_to_value(frame: &Frame) -> Value {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), frame.id.to_firestore_value());
    fields.insert("sequence".to_string(), frame.sequence.to_firestore_value());
    fields.insert("timestamp_secs".to_string(), frame.timestamp_secs.to_firestore_value());
    fields.insert("storage_key".to_string(), frame.storage_key.to_firestore_value());
    fields.insert("is_key_frame".to_string(), frame.is_key_frame.to_firestore_value());
    fields.insert("frame_type".to_string(), frame.frame_type.to_firestore_value());
    fields.insert("quality".to_string(), frame.quality.to_firestore_value());
    fields.insert("size_bytes".to_string(), frame.size_bytes.to_firestore_value());
    fields.insert("created_at".to_string(), frame.created_at.to_firestore_value());
    fields.insert("thumbnail_key".to_string(), frame.thumbnail_key.to_firestore_value());
    fields.insert("width".to_string(), frame.width.to_firestore_value());
    fields.insert("height".to_string(), frame.height.to_firestore_value());
    Value::map(fields)
}

pub(crate) fn video_to_fields(video: &Video) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("id".to_string(), video.id.as_str().to_firestore_value());
    fields.insert("title".to_string(), video.title.to_firestore_value());
    fields.insert("description".to_string(), video.description.to_firestore_value());
    fields.insert("owner_id".to_string(), video.owner_id.to_firestore_value());
    fields.insert("original_filename".to_string(), video.original_filename.to_firestore_value());
    fields.insert("source_key".to_string(), video.source_key.to_firestore_value());
    fields.insert("visibility".to_string(), video.visibility.as_str().to_firestore_value());
    fields.insert("views".to_string(), video.views.to_firestore_value());
    fields.insert("duration_secs".to_string(), video.duration_secs.to_firestore_value());
    fields.insert("status".to_string(), video.status.as_str().to_firestore_value());
    fields.insert(
        "segments".to_string(),
        Value::array(video.segments.iter().map(segment_to_value).collect()),
    );
    fields.insert(
        "frames".to_string(),
        Value::array(video.frames.iter().map(frame_to_value).collect()),
    );
    fields.insert("created_at".to_string(), video.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), video.updated_at.to_firestore_value());
    fields.insert("deleted".to_string(), video.deleted.to_firestore_value());
    fields
}

fn value_to_segment(value: &Value) -> FirestoreResult<Segment> {
    let map = value
        .as_map()
        .ok_or_else(|| FirestoreError::invalid_response("segment is not a map"))?;
    let f = Fields(map);
    Ok(Segment {
        id: f.string("id"),
        sequence: f.u32("sequence"),
        status: SegmentStatus::parse(&f.string("status")).unwrap_or_default(),
        storage_key: f.string("storage_key"),
        start_secs: f.u64("start_secs"),
        end_secs: f.u64("end_secs"),
        size_bytes: f.u64("size_bytes"),
        quality: f.get("quality"),
        created_at: f.get("created_at").unwrap_or_else(Utc::now),
    })
}

fn value_to_frame(value: &Value) -> FirestoreResult<Frame> {
    let map = value
        .as_map()
        .ok_or_else(|| FirestoreError::invalid_response("frame is not a map"))?;
    let f = Fields(map);
    Ok(Frame {
        id: f.string("id"),
        sequence: f.u32("sequence"),
        timestamp_secs: f.u64("timestamp_secs"),
        storage_key: f.string("storage_key"),
        is_key_frame: f.bool("is_key_frame"),
        frame_type: f.string("frame_type"),
        quality: f.get("quality"),
        size_bytes: f.u64("size_bytes"),
        created_at: f.get("created_at").unwrap_or_else(Utc::now),
        thumbnail_key: f.get("thumbnail_key"),
        width: f.get("width"),
        height: f.get("height"),
    })
}

pub(crate) fn fields_to_video(
    fields: &HashMap<String, Value>,
    id: &VideoId,
) -> FirestoreResult<Video> {
    let f = Fields(fields);

    let status_raw = f.string("status");
    let status = VideoStatus::parse(&status_raw).ok_or_else(|| {
        FirestoreError::invalid_response(format!("unknown video status {:?}", status_raw))
    })?;

    let segments = f
        .array("segments")
        .iter()
        .map(value_to_segment)
        .collect::<FirestoreResult<Vec<_>>>()?;
    let frames = f
        .array("frames")
        .iter()
        .map(value_to_frame)
        .collect::<FirestoreResult<Vec<_>>>()?;

    let now = Utc::now();
    Ok(Video {
        id: id.clone(),
        title: f.string("title"),
        description: f.get("description"),
        owner_id: f.string("owner_id"),
        original_filename: f.string("original_filename"),
        source_key: f.string("source_key"),
        visibility: Visibility::parse(&f.string("visibility")).unwrap_or_default(),
        views: f.u64("views"),
        duration_secs: f.u64("duration_secs"),
        status,
        segments,
        frames,
        created_at: f.get("created_at").unwrap_or(now),
        updated_at: f.get("updated_at").unwrap_or(now),
        deleted: f.bool("deleted"),
    })
}

/// In-process repository for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<VideoId, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }

    /// Snapshot of every stored record, deleted ones included.
    pub async fn all(&self) -> Vec<Video> {
        self.videos.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: &Video) -> FirestoreResult<()> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(FirestoreError::AlreadyExists(video.id.to_string()));
        }
        videos.insert(video.id.clone(), video.clone());
        Ok(())
    }

    async fn get(&self, id: &VideoId) -> FirestoreResult<Option<Video>> {
        Ok(self.videos.read().await.get(id).cloned())
    }

    async fn save(&self, video: &Video) -> FirestoreResult<()> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                let deleted = existing.deleted;
                *existing = video.clone();
                existing.deleted = deleted;
                Ok(())
            }
            None => Err(FirestoreError::not_found(video.id.to_string())),
        }
    }

    async fn mark_deleted(&self, id: &VideoId) -> FirestoreResult<()> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(id) {
            Some(existing) => {
                existing.soft_delete();
                Ok(())
            }
            None => Err(FirestoreError::not_found(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vup_models::{FrameTick, SegmentSpan};

    fn processed_video() -> Video {
        let mut video = Video::new("Trip", "owner-1", "trip.mov", "video_abc.mp4")
            .with_description(Some("beach".to_string()))
            .with_visibility(Visibility::Unlisted);
        video.set_duration(310);
        video.set_segments(vec![
            Segment::ready(
                SegmentSpan {
                    sequence: 0,
                    start_secs: 0,
                    end_secs: 300,
                },
                "segment_a.mp4",
                1024,
            ),
            Segment::ready(
                SegmentSpan {
                    sequence: 1,
                    start_secs: 300,
                    end_secs: 310,
                },
                "segment_b.mp4",
                64,
            ),
        ]);
        video.set_frames(vec![Frame::key_frame(
            FrameTick {
                sequence: 0,
                timestamp_secs: 0,
            },
            "frame_a.jpg",
            10,
        )]);
        video
    }

    #[test]
    fn test_video_document_mapping() {
        let video = processed_video();
        let fields = video_to_fields(&video);

        // Through JSON, as Firestore would send it back
        let json = serde_json::to_string(&fields).unwrap();
        let decoded: HashMap<String, Value> = serde_json::from_str(&json).unwrap();
        let restored = fields_to_video(&decoded, &video.id).unwrap();

        assert_eq!(restored.status, video.status);
        assert_eq!(restored.description.as_deref(), Some("beach"));
        assert_eq!(restored.visibility, Visibility::Unlisted);
        assert_eq!(restored.segments.len(), 2);
        assert_eq!(restored.segments[1].start_secs, 300);
        assert_eq!(restored.segments[1].status, SegmentStatus::Ready);
        assert_eq!(restored.frames[0].frame_type, "I-frame");
        assert_eq!(restored.frames[0].width, None);
        assert_eq!(restored.created_at.timestamp(), video.created_at.timestamp());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let video = processed_video();
        let mut fields = video_to_fields(&video);
        fields.insert("status".to_string(), "archived".to_firestore_value());
        assert!(fields_to_video(&fields, &video.id).is_err());
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        let repo = InMemoryVideoRepository::new();
        let mut video = processed_video();

        assert!(matches!(
            repo.save(&video).await,
            Err(FirestoreError::NotFound(_))
        ));
        repo.create(&video).await.unwrap();
        assert!(repo.create(&video).await.is_err());

        video.transition_to(VideoStatus::Processing).unwrap();
        repo.save(&video).await.unwrap();

        let stored = repo.get(&video.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VideoStatus::Processing);
        assert!(repo.get(&VideoId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_keeps_soft_delete_flag() {
        let repo = InMemoryVideoRepository::new();
        let mut video = processed_video();
        repo.create(&video).await.unwrap();

        repo.mark_deleted(&video.id).await.unwrap();

        // A copy loaded before the delete is saved afterwards
        video.transition_to(VideoStatus::Processing).unwrap();
        repo.save(&video).await.unwrap();

        let stored = repo.get(&video.id).await.unwrap().unwrap();
        assert!(stored.deleted);
        assert_eq!(stored.status, VideoStatus::Processing);
        assert_eq!(stored.segments.len(), 2);
        assert!(matches!(
            repo.mark_deleted(&VideoId::new()).await,
            Err(FirestoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_save_fields_exclude_deleted() {
        let video = processed_video();
        let fields = video_to_fields(&video);
        assert!(!SAVE_FIELDS.contains(&"deleted"));
        for name in SAVE_FIELDS {
            assert!(fields.contains_key(*name), "{name}");
        }
    }
}
