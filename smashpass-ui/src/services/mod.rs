//! External collaborators

pub mod image_fetcher;

pub use image_fetcher::{FetchedImage, ImageFetcher};
