use rusqlite::params;

use crate::{
    catalog::{
        db::{self, CatalogPool},
        error::CatalogError,
        schema::{columns, tables},
    },
    config,
    domain::{
        album::Album,
        song::{AlbumSong, Song},
    },
};

use columns::*;
use tables::*;

/// Read-only access layer over the catalog tables.
///
/// Holds the connection pool; handlers share one `Catalog` across threads.
/// Only public projections leave this type, with one exception: the private
/// storage key returned by [`Catalog::audio_key`], which exists solely to be
/// handed to the URL signer.
pub struct Catalog {
    pool: CatalogPool,
}

impl Catalog {
    /// opens the pool (and creates the schema if missing)
    pub fn new(db_config: &config::Database) -> Result<Self, CatalogError> {
        let pool = db::open_pool(db_config)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: CatalogPool) -> Self {
        Self { pool }
    }

    /// All songs in the catalog, public fields only, id ascending.
    pub fn list_songs(&self) -> Result<Vec<Song>, CatalogError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ID}, {TITLE}, {ARTIST}, {COVER_ART_URL} FROM {SONGS} ORDER BY {ID} ASC"
        ))?;

        let songs = stmt
            .query_map([], |row| {
                Ok(Song {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                    cover_art_url: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(songs)
    }

    /// All albums, newest first (id descending).
    pub fn list_albums(&self) -> Result<Vec<Album>, CatalogError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ID}, {TITLE}, {COVER_ART_URL} FROM {ALBUMS} ORDER BY {ID} DESC"
        ))?;

        let albums = stmt
            .query_map([], |row| {
                Ok(Album {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    cover_art_url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(albums)
    }

    /// Songs belonging to the album, id ascending.
    ///
    /// Zero matches is `NoSongsForAlbum`, never an empty list: callers must
    /// be able to tell "nothing there" from a store failure. An absent album
    /// and an album without songs are indistinguishable here on purpose.
    pub fn songs_for_album(&self, album_id: i64) -> Result<Vec<AlbumSong>, CatalogError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ID}, {TITLE}, {ARTIST} FROM {SONGS} WHERE {ALBUM_ID} = ?1 ORDER BY {ID} ASC"
        ))?;

        let songs = stmt
            .query_map(params![album_id], |row| {
                Ok(AlbumSong {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if songs.is_empty() {
            return Err(CatalogError::NoSongsForAlbum(album_id));
        }
        Ok(songs)
    }

    /// The private storage key of the song's audio object.
    pub fn audio_key(&self, song_id: i64) -> Result<String, CatalogError> {
        let conn = self.pool.get()?;

        let key = conn.query_row(
            &format!("SELECT {AUDIO_FILE_NAME} FROM {SONGS} WHERE {ID} = ?1"),
            params![song_id],
            |row| row.get::<_, String>(0),
        );

        match key {
            Ok(key) => Ok(key),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(CatalogError::SongNotFound(song_id)),
            Err(e) => Err(e.into()),
        }
    }
}
