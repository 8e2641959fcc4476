//! Integration tests for gallery entry models: listing order, thumbnail
//! flag reconciliation primitives, and the dual tag representation.

use chrono::{Duration, Utc};
use db::models::{
    gallery::{CreateGallery, Gallery},
    gallery_entry::GalleryEntry,
    image::{CreateImage, Image},
    image_tag::ImageTag,
    video::{CreateVideo, Video},
};
use db::test_utils::create_test_pool;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn create_test_gallery(pool: &SqlitePool) -> Gallery {
    let data = CreateGallery {
        name: "Aspiration".to_string(),
        description: None,
    };
    Gallery::create(pool, &data, Uuid::new_v4())
        .await
        .expect("Failed to create gallery")
}

fn image_data(gallery_id: Option<Uuid>, shot_offset_mins: i64) -> CreateImage {
    let token = Uuid::new_v4().to_string();
    CreateImage {
        filename: token.clone(),
        author_cid: "fotograf".to_string(),
        author: Some("Foto Graf".to_string()),
        gallery_id,
        shot_at: Utc::now() + Duration::minutes(shot_offset_mins),
        thumbnail_path: format!("/tmp/thumbnails/{token}.jpg"),
        preview_path: format!("/tmp/previews/{token}.jpg"),
        full_size_path: format!("/tmp/{token}.jpg"),
        exif_data: None,
    }
}

#[tokio::test]
async fn gallery_listing_is_ordered_by_shot_at() {
    let (pool, _dir) = create_test_pool().await;
    let gallery = create_test_gallery(&pool).await;

    // Insert out of capture order
    let later = Image::create(&pool, &image_data(Some(gallery.id), 30), Uuid::new_v4())
        .await
        .unwrap();
    let earlier = Image::create(&pool, &image_data(Some(gallery.id), -30), Uuid::new_v4())
        .await
        .unwrap();

    let entries = Image::find_by_gallery(&pool, gallery.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].core.id, earlier.core.id);
    assert_eq!(entries[1].core.id, later.core.id);
}

#[tokio::test]
async fn new_images_are_not_gallery_thumbnails() {
    let (pool, _dir) = create_test_pool().await;
    let gallery = create_test_gallery(&pool).await;

    let image = Image::create(&pool, &image_data(Some(gallery.id), 0), Uuid::new_v4())
        .await
        .unwrap();
    assert!(!image.core.is_gallery_thumbnail);

    let flagged = Image::find_gallery_thumbnails(&pool, Some(gallery.id))
        .await
        .unwrap();
    assert!(flagged.is_empty());
}

#[tokio::test]
async fn thumbnail_flag_round_trip() {
    let (pool, _dir) = create_test_pool().await;
    let gallery = create_test_gallery(&pool).await;

    let a = Image::create(&pool, &image_data(Some(gallery.id), 0), Uuid::new_v4())
        .await
        .unwrap();
    let b = Image::create(&pool, &image_data(Some(gallery.id), 1), Uuid::new_v4())
        .await
        .unwrap();

    Image::set_gallery_thumbnail(&pool, a.core.id, true)
        .await
        .unwrap();
    Image::set_gallery_thumbnail(&pool, b.core.id, true)
        .await
        .unwrap();
    Image::set_gallery_thumbnail(&pool, a.core.id, false)
        .await
        .unwrap();

    let flagged = Image::find_gallery_thumbnails(&pool, Some(gallery.id))
        .await
        .unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].core.id, b.core.id);
}

#[tokio::test]
async fn tags_are_stored_in_both_representations() {
    let (pool, _dir) = create_test_pool().await;
    let image = Image::create(&pool, &image_data(None, 0), Uuid::new_v4())
        .await
        .unwrap();

    ImageTag::create(&pool, image.core.id, "sunset").await.unwrap();
    Image::update_tags(&pool, image.core.id, &["sunset".to_string()])
        .await
        .unwrap();

    let joined = ImageTag::find_by_image(&pool, image.core.id).await.unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].tag_name, "sunset");

    let reloaded = Image::find_by_id(&pool, image.core.id)
        .await
        .unwrap()
        .expect("image should exist");
    assert_eq!(reloaded.core.tags.0, vec!["sunset".to_string()]);
}

#[tokio::test]
async fn duplicate_tags_are_kept() {
    let (pool, _dir) = create_test_pool().await;
    let image = Image::create(&pool, &image_data(None, 0), Uuid::new_v4())
        .await
        .unwrap();

    for _ in 0..2 {
        ImageTag::create(&pool, image.core.id, "sunset").await.unwrap();
    }
    Image::update_tags(
        &pool,
        image.core.id,
        &["sunset".to_string(), "sunset".to_string()],
    )
    .await
    .unwrap();

    let joined = ImageTag::find_by_image(&pool, image.core.id).await.unwrap();
    assert_eq!(joined.len(), 2);

    let reloaded = Image::find_by_id(&pool, image.core.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.core.tags.0.len(), 2);
}

#[tokio::test]
async fn tag_search_resolves_entries_through_join_records() {
    let (pool, _dir) = create_test_pool().await;
    let tagged = Image::create(&pool, &image_data(None, 0), Uuid::new_v4())
        .await
        .unwrap();
    let _untagged = Image::create(&pool, &image_data(None, 0), Uuid::new_v4())
        .await
        .unwrap();

    ImageTag::create(&pool, tagged.core.id, "archipelago")
        .await
        .unwrap();

    let hits = ImageTag::find_by_tag(&pool, "archipelago").await.unwrap();
    let ids: Vec<_> = hits.iter().map(|t| t.image_id).collect();
    let images = Image::find_by_ids(&pool, &ids).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].core.id, tagged.core.id);
}

#[tokio::test]
async fn videos_share_the_entry_core() {
    let (pool, _dir) = create_test_pool().await;
    let gallery = create_test_gallery(&pool).await;

    let data = CreateVideo {
        url: "https://example.com/v/123".to_string(),
        author_cid: "fotograf".to_string(),
        author: None,
        gallery_id: Some(gallery.id),
        shot_at: Utc::now(),
    };
    let video = Video::create(&pool, &data, Uuid::new_v4()).await.unwrap();
    assert_eq!(video.url, "https://example.com/v/123");

    let listed = Video::find_by_gallery(&pool, gallery.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].core.is_gallery_thumbnail);

    let by_ids = Video::find_by_ids(&pool, &[video.core.id]).await.unwrap();
    assert_eq!(by_ids.len(), 1);
    assert_eq!(by_ids[0].core.id, video.core.id);
}

#[tokio::test]
async fn delete_removes_only_the_record() {
    let (pool, _dir) = create_test_pool().await;
    let image = Image::create(&pool, &image_data(None, 0), Uuid::new_v4())
        .await
        .unwrap();
    ImageTag::create(&pool, image.core.id, "orphan").await.unwrap();

    let affected = Image::delete(&pool, image.core.id).await.unwrap();
    assert_eq!(affected, 1);
    assert!(Image::find_by_id(&pool, image.core.id).await.unwrap().is_none());

    // ImageTag rows are not cascaded; the gap is intentional.
    let orphaned = ImageTag::find_by_image(&pool, image.core.id).await.unwrap();
    assert_eq!(orphaned.len(), 1);
}
