use rusqlite::Connection;

pub mod tables {
    pub const ALBUMS: &str = "albums";
    pub const SONGS: &str = "songs";

    pub const ALL_TABLES: &[&str] = &[ALBUMS, SONGS];
}

pub mod columns {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const COVER_ART_URL: &str = "cover_art_url";
    pub const ALBUM_ID: &str = "album_id";
    pub const AUDIO_FILE_NAME: &str = "audio_file_name";
}

pub use columns::*;
pub use tables::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS albums (
    id            INTEGER PRIMARY KEY,
    title         TEXT NOT NULL,
    cover_art_url TEXT
);

CREATE TABLE IF NOT EXISTS songs (
    id              INTEGER PRIMARY KEY,
    title           TEXT NOT NULL,
    artist          TEXT NOT NULL,
    cover_art_url   TEXT,
    album_id        INTEGER REFERENCES albums(id),
    audio_file_name TEXT NOT NULL
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
