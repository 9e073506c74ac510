//! Keys domain - authorized_keys entries, fetching and rendering

mod entity;
mod fetcher;
mod render;

pub use entity::Key;
pub use fetcher::KeyFetcher;
pub use render::render_authorized_keys;
