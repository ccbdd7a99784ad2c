pub mod album;
pub mod song;
