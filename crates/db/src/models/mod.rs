pub mod gallery;
pub mod gallery_entry;
pub mod image;
pub mod image_tag;
pub mod user;
pub mod video;
