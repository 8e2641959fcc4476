//! End-to-end ingestion pipeline tests: staged file in, three renditions
//! and one database record out.

use chrono::Utc;
use db::models::gallery_entry::GalleryEntry;
use db::models::image::Image;
use db::test_utils::create_test_pool;
use image::DynamicImage;
use services::services::{
    ingest::{IngestService, StagedUpload, Uploader},
    storage::ImageStorage,
};
use uuid::Uuid;

fn uploader() -> Uploader {
    Uploader {
        cid: "fotograf".to_string(),
        fullname: Some("Foto Graf".to_string()),
    }
}

/// Write a real JPEG into the staging area.
fn stage_jpeg(dir: &std::path::Path, name: &str) -> StagedUpload {
    let temp_path = dir.join(format!("staged-{}", Uuid::new_v4()));
    let temp_path = temp_path.with_extension("jpg");
    DynamicImage::new_rgb8(640, 480).save(&temp_path).unwrap();
    StagedUpload {
        temp_path,
        original_name: name.to_string(),
    }
}

#[tokio::test]
async fn ingest_produces_all_three_renditions_and_a_record() {
    let (pool, _db_dir) = create_test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = ImageStorage::new(dir.path().join("images"));
    let service = IngestService::new(pool.clone(), storage.clone());

    let gallery_id = Some(Uuid::new_v4());
    let image = service
        .ingest_file(stage_jpeg(dir.path(), "IMG.JPG"), gallery_id, &uploader())
        .await
        .expect("ingestion should succeed");

    // Extension preserved, token fresh
    assert!(image.full_size_path.ends_with(&format!("{}.jpg", image.filename)));
    assert!(std::path::Path::new(&image.full_size_path).is_file());
    assert!(std::path::Path::new(&image.thumbnail_path).is_file());
    assert!(std::path::Path::new(&image.preview_path).is_file());

    // Record carries the uploader's identity and gallery
    assert_eq!(image.core.author_cid, "fotograf");
    assert_eq!(image.core.author.as_deref(), Some("Foto Graf"));
    assert_eq!(image.core.gallery_id, gallery_id);
    assert!(!image.core.is_gallery_thumbnail);
}

#[tokio::test]
async fn shot_at_falls_back_to_ingestion_time_without_exif() {
    let (pool, _db_dir) = create_test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    let service = IngestService::new(pool, ImageStorage::new(dir.path().join("images")));

    let before = Utc::now();
    let image = service
        .ingest_file(stage_jpeg(dir.path(), "no_exif.jpg"), None, &uploader())
        .await
        .unwrap();
    let after = Utc::now();

    assert!(image.core.shot_at >= before && image.core.shot_at <= after);
}

#[tokio::test]
async fn undecodable_file_still_persists_the_full_size_asset() {
    let (pool, _db_dir) = create_test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    let service = IngestService::new(pool.clone(), ImageStorage::new(dir.path().join("images")));

    let temp_path = dir.path().join("staged.jpg");
    std::fs::write(&temp_path, b"this is not a jpeg").unwrap();

    let image = service
        .ingest_file(
            StagedUpload {
                temp_path,
                original_name: "broken.jpg".to_string(),
            },
            None,
            &uploader(),
        )
        .await
        .expect("derivative failure must not abort ingestion");

    assert!(std::path::Path::new(&image.full_size_path).is_file());
    assert!(!std::path::Path::new(&image.thumbnail_path).exists());
    assert!(!std::path::Path::new(&image.preview_path).exists());

    let reloaded = Image::find_by_id(&pool, image.core.id).await.unwrap();
    assert!(reloaded.is_some());
}

#[tokio::test]
async fn batch_files_are_ingested_independently() {
    let (pool, _db_dir) = create_test_pool().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = ImageStorage::new(dir.path().join("images"));
    let service = IngestService::new(pool.clone(), storage);

    let gallery_id = Some(Uuid::new_v4());
    let files = vec![
        stage_jpeg(dir.path(), "a.jpg"),
        stage_jpeg(dir.path(), "b.jpg"),
        stage_jpeg(dir.path(), "c.jpg"),
    ];

    let handles = service.spawn_batch(files, gallery_id, &uploader());
    for handle in handles {
        handle.await.unwrap();
    }

    let entries = Image::find_by_gallery(&pool, gallery_id.unwrap()).await.unwrap();
    assert_eq!(entries.len(), 3);
}
