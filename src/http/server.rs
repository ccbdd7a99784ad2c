use std::sync::Arc;

use chrono::{Duration, Local};
use log::{debug, error, info};
use rouille::{Request, Response, router};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{error::CatalogError, store::Catalog},
    config::HttpConfig,
    domain::{
        album::Album,
        song::{AlbumSong, Song},
    },
    http::error::ApiError,
    signer::UrlSigner,
};

pub struct HttpServer {
    catalog: Arc<Catalog>,
    signer: Arc<dyn UrlSigner>,
    url_ttl_secs: u32,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(
        catalog: Catalog,
        signer: Arc<dyn UrlSigner>,
        url_ttl_secs: u32,
        config: HttpConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            signer,
            url_ttl_secs,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        info!("{} {}", request.method(), request.url());

        // browser preflight; the player runs on another origin
        if request.method() == "OPTIONS" {
            return cors(Response::text("").with_status_code(204));
        }

        let response = router!(request,
            (GET) (/api) => {
                Response::text("API is running.")
            },

            (GET) (/api/songs) => {
                self.handle_list_songs()
            },

            (GET) (/api/albums) => {
                self.handle_list_albums()
            },

            (GET) (/api/albums/{album_id: i64}/songs) => {
                self.handle_album_songs(album_id)
            },

            (GET) (/api/songs/{id: i64}/stream) => {
                self.handle_stream(id)
            },

            _ => Response::empty_404()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        cors(response)
    }

    fn handle_list_songs(&self) -> Response {
        match self.catalog.list_songs() {
            Ok(songs) => {
                let body: Vec<_> = songs.iter().map(SongResponse::from_domain).collect();
                Response::json(&body)
            }
            Err(e) => {
                error!("listing songs failed: {e}");
                ApiError::from(e).into_response()
            }
        }
    }

    fn handle_list_albums(&self) -> Response {
        match self.catalog.list_albums() {
            Ok(albums) => {
                let body: Vec<_> = albums.iter().map(AlbumResponse::from_domain).collect();
                Response::json(&body)
            }
            Err(e) => {
                error!("listing albums failed: {e}");
                ApiError::from(e).into_response()
            }
        }
    }

    fn handle_album_songs(&self, album_id: i64) -> Response {
        match self.catalog.songs_for_album(album_id) {
            Ok(songs) => {
                let body: Vec<_> = songs.iter().map(AlbumSongResponse::from_domain).collect();
                Response::json(&body)
            }
            Err(e) => {
                log_catalog_error(&format!("listing songs for album {album_id}"), &e);
                ApiError::from(e).into_response()
            }
        }
    }

    /// Resolves the song to its private storage key, then trades the key for
    /// a fresh signed URL. A missing song never reaches the signer. The key
    /// itself stays inside this function.
    fn stream_url(&self, id: i64) -> Result<StreamResponse, ApiError> {
        let key = self.catalog.audio_key(id).map_err(|e| {
            log_catalog_error(&format!("resolving audio key for song {id}"), &e);
            ApiError::from(e)
        })?;

        let url = self.signer.sign_get(&key, self.url_ttl_secs).map_err(|e| {
            error!("issuing stream URL for song {id} failed: {e}");
            ApiError::from(e)
        })?;

        let expires_at = Local::now() + Duration::seconds(i64::from(self.url_ttl_secs));
        debug!("issued stream URL for song {id}, valid until {}", expires_at.to_rfc3339());

        Ok(StreamResponse { url })
    }

    fn handle_stream(&self, id: i64) -> Response {
        match self.stream_url(id) {
            Ok(body) => Response::json(&body),
            Err(e) => e.into_response(),
        }
    }
}

fn log_catalog_error(operation: &str, err: &CatalogError) {
    if err.is_not_found() {
        info!("{operation}: {err}");
    } else {
        error!("{operation}: {err}");
    }
}

fn cors(response: Response) -> Response {
    response
        .with_additional_header("Access-Control-Allow-Origin", "*")
        .with_additional_header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .with_additional_header("Access-Control-Allow-Headers", "Content-Type")
}

#[derive(Serialize, Deserialize)]
struct SongResponse {
    id: i64,
    title: String,
    artist: String,
    cover_art_url: Option<String>,
}

impl SongResponse {
    fn from_domain(song: &Song) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            cover_art_url: song.cover_art_url.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AlbumResponse {
    id: i64,
    title: String,
    cover_art_url: Option<String>,
}

impl AlbumResponse {
    fn from_domain(album: &Album) -> Self {
        Self {
            id: album.id,
            title: album.title.clone(),
            cover_art_url: album.cover_art_url.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AlbumSongResponse {
    id: i64,
    title: String,
    artist: String,
}

impl AlbumSongResponse {
    fn from_domain(song: &AlbumSong) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StreamResponse {
    url: String,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{db::CatalogPool, store::test_support::*},
        signer::SignerError,
    };

    use rouille::Request;
    use std::io::Read;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    fn parse_text_response(response: rouille::Response) -> String {
        let mut buf = String::new();
        let mut reader = response.data.into_reader_and_size().0;
        reader.read_to_string(&mut buf).unwrap();
        buf
    }

    /// Counts calls and hands out a distinct URL each time.
    #[derive(Default)]
    struct FakeSigner {
        calls: AtomicUsize,
        last_ttl: AtomicU32,
    }

    impl UrlSigner for FakeSigner {
        fn sign_get(&self, object_key: &str, ttl_secs: u32) -> Result<String, SignerError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_ttl.store(ttl_secs, Ordering::SeqCst);
            Ok(format!("https://store.example/{object_key}?sig={n}"))
        }
    }

    struct RefusingSigner;

    impl UrlSigner for RefusingSigner {
        fn sign_get(&self, _object_key: &str, _ttl_secs: u32) -> Result<String, SignerError> {
            Err(SignerError::Backend("credentials rejected".into()))
        }
    }

    fn create_server(pool: CatalogPool, signer: Arc<dyn UrlSigner>) -> HttpServer {
        HttpServer::new(
            Catalog::from_pool(pool),
            signer,
            300,
            HttpConfig {
                bind_addr: "127.0.0.1".to_string(),
                port: 0,
            },
        )
    }

    /// Album 1 "A" owns song 10; song 11 is album-less.
    fn seeded_pool() -> CatalogPool {
        let pool = memory_pool();
        insert_album(&pool, 1, "A", Some("https://cdn.example/a.jpg"));
        insert_song(&pool, 10, "S1", "Artist One", Some(1), "tracks/s1.mp3");
        insert_song(&pool, 11, "S2", "Artist Two", None, "tracks/s2.mp3");
        pool
    }

    fn get(server: &HttpServer, url: &str) -> Response {
        let request = Request::fake_http("GET", url, vec![], vec![]);
        server.handle_request(&request)
    }

    #[test]
    fn test_liveness_endpoint() {
        let server = create_server(memory_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api");

        assert_eq!(response.status_code, 200);
        assert_eq!(parse_text_response(response), "API is running.");
    }

    #[test]
    fn test_responses_carry_cors_header() {
        let server = create_server(memory_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/songs");

        assert!(
            response
                .headers
                .iter()
                .any(|(k, v)| k.as_ref() == "Access-Control-Allow-Origin" && v.as_ref() == "*"),
            "missing CORS header: {:?}",
            response.headers
        );
    }

    #[test]
    fn test_options_preflight() {
        let server = create_server(memory_pool(), Arc::new(FakeSigner::default()));

        let request = Request::fake_http("OPTIONS", "/api/songs", vec![], vec![]);
        let response = server.handle_request(&request);

        assert_eq!(response.status_code, 204);
        assert!(
            response
                .headers
                .iter()
                .any(|(k, _)| k.as_ref() == "Access-Control-Allow-Methods")
        );
    }

    #[test]
    fn test_empty_catalog_lists_as_empty_not_error() {
        let server = create_server(memory_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/songs");

        assert_eq!(response.status_code, 200);
        let songs: Vec<SongResponse> = parse_json_response(response).unwrap();
        assert!(songs.is_empty());
    }

    #[test]
    fn test_song_listing_includes_album_less_songs() {
        let server = create_server(seeded_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/songs");

        assert_eq!(response.status_code, 200);
        let songs: Vec<SongResponse> = parse_json_response(response).unwrap();
        assert_eq!(songs.iter().map(|s| s.id).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(songs[1].title, "S2");
    }

    #[test]
    fn test_song_listing_never_exposes_the_storage_key() {
        let server = create_server(seeded_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/songs");

        assert_eq!(response.status_code, 200);
        let body = parse_text_response(response);
        assert!(!body.contains("audio_file_name"), "leaked field: {body}");
        assert!(!body.contains("tracks/s1.mp3"), "leaked key: {body}");
    }

    #[test]
    fn test_album_listing_is_newest_first() {
        let pool = seeded_pool();
        insert_album(&pool, 2, "B", None);
        let server = create_server(pool, Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/albums");

        assert_eq!(response.status_code, 200);
        let albums: Vec<AlbumResponse> = parse_json_response(response).unwrap();
        assert_eq!(albums.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(albums[1].title, "A");
    }

    #[test]
    fn test_album_songs_success() {
        let server = create_server(seeded_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/albums/1/songs");

        assert_eq!(response.status_code, 200);
        let songs: Vec<AlbumSongResponse> = parse_json_response(response).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, 10);
        assert_eq!(songs[0].artist, "Artist One");
    }

    #[test]
    fn test_album_songs_missing_album_is_404() {
        let server = create_server(seeded_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/albums/999/songs");

        assert_eq!(response.status_code, 404);
    }

    #[test]
    fn test_album_songs_empty_album_is_404() {
        let pool = seeded_pool();
        insert_album(&pool, 2, "B", None); // exists, owns no songs
        let server = create_server(pool, Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/albums/2/songs");

        assert_eq!(response.status_code, 404);
    }

    #[test]
    fn test_stream_returns_signed_url_with_policy_ttl() {
        let signer = Arc::new(FakeSigner::default());
        let server = create_server(seeded_pool(), signer.clone());

        let response = get(&server, "/api/songs/11/stream");

        assert_eq!(response.status_code, 200);
        let body: StreamResponse = parse_json_response(response).unwrap();
        assert_eq!(body.url, "https://store.example/tracks/s2.mp3?sig=0");
        assert_eq!(signer.last_ttl.load(Ordering::SeqCst), 300);
    }

    #[test]
    fn test_stream_twice_yields_distinct_urls() {
        let signer = Arc::new(FakeSigner::default());
        let server = create_server(seeded_pool(), signer.clone());

        let first: StreamResponse =
            parse_json_response(get(&server, "/api/songs/10/stream")).unwrap();
        let second: StreamResponse =
            parse_json_response(get(&server, "/api/songs/10/stream")).unwrap();

        // no caching or deduplication between requests
        assert_ne!(first.url, second.url);
        assert_eq!(signer.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stream_missing_song_is_404_and_skips_the_signer() {
        let signer = Arc::new(FakeSigner::default());
        let server = create_server(seeded_pool(), signer.clone());

        let response = get(&server, "/api/songs/999/stream");

        assert_eq!(response.status_code, 404);
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_signer_failure_is_500_with_generic_body() {
        let server = create_server(seeded_pool(), Arc::new(RefusingSigner));

        let response = get(&server, "/api/songs/10/stream");

        assert_eq!(response.status_code, 500);
        let body = parse_text_response(response);
        assert!(body.contains("Could not generate stream URL"), "body: {body}");
        assert!(!body.contains("credentials"), "leaked signer error: {body}");
    }

    #[test]
    fn test_store_failure_is_500_with_generic_body() {
        let pool = impatient_memory_pool();
        let server = create_server(pool.clone(), Arc::new(FakeSigner::default()));

        // hold the only connection so the handler's checkout times out
        let _held = pool.get().unwrap();

        let response = get(&server, "/api/songs");

        assert_eq!(response.status_code, 500);
        let body = parse_text_response(response);
        assert!(body.contains("Internal server error"), "body: {body}");
    }

    #[test]
    fn test_unknown_route_is_404() {
        let server = create_server(memory_pool(), Arc::new(FakeSigner::default()));

        assert_eq!(get(&server, "/api/playlists").status_code, 404);
        assert_eq!(get(&server, "/").status_code, 404);
    }

    #[test]
    fn test_non_numeric_song_id_is_404() {
        let server = create_server(seeded_pool(), Arc::new(FakeSigner::default()));

        let response = get(&server, "/api/songs/not-a-number/stream");

        assert_eq!(response.status_code, 404);
    }
}
