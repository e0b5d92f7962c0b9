use std::sync::Arc;

use tokio::{sync::Mutex, task::JoinSet};

use crate::{
    management::{CredentialManager, GenreSet, TrackCollection},
    spotify::{ApiError, Catalog},
    types::Track,
    utils, warning,
};

/// Counters describing how one batch went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub queries: usize,
    pub resolved: usize,
    pub failed: usize,
    pub appended: usize,
}

/// What a single query produced once its search and enrichment calls finished.
struct ResolvedQuery {
    tracks: Vec<Track>,
    genres: Option<GenreSet>,
}

/// Turns batches of free-text queries into tracks and a genre descriptor.
///
/// Each query runs its own search-then-enrich chain as a task of a per-batch
/// [`JoinSet`]. Results are merged one at a time as tasks complete, so the
/// collection and the genre descriptor only ever see whole updates. Track
/// order is preserved within a query but not across queries, and the genre
/// descriptor is whatever the last completed query produced.
pub struct SearchOrchestrator {
    credentials: Arc<CredentialManager>,
    catalog: Arc<dyn Catalog>,
    tracks: Arc<Mutex<TrackCollection>>,
    genres: Arc<Mutex<GenreSet>>,
}

impl SearchOrchestrator {
    pub fn new(
        credentials: Arc<CredentialManager>,
        catalog: Arc<dyn Catalog>,
        tracks: Arc<Mutex<TrackCollection>>,
        genres: Arc<Mutex<GenreSet>>,
    ) -> Self {
        Self {
            credentials,
            catalog,
            tracks,
            genres,
        }
    }

    pub fn tracks(&self) -> Arc<Mutex<TrackCollection>> {
        Arc::clone(&self.tracks)
    }

    pub fn genres(&self) -> Arc<Mutex<GenreSet>> {
        Arc::clone(&self.genres)
    }

    /// Resolves every query and merges the results into the shared state.
    ///
    /// Blank queries are skipped. A query whose search fails contributes
    /// nothing; the rest of the batch carries on. The only way the whole batch
    /// is abandoned is when no credential can be obtained at all.
    pub async fn search(&self, queries: &[String], limit: u32) -> BatchReport {
        let queries: Vec<String> = queries
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .collect();

        let mut report = BatchReport {
            queries: queries.len(),
            ..Default::default()
        };

        if queries.is_empty() {
            return report;
        }

        if self.credentials.get_token().await.is_none() {
            warning!("Access token not available, skipping search");
            report.failed = report.queries;
            return report;
        }

        let mut tasks = JoinSet::new();
        for query in queries {
            let credentials = Arc::clone(&self.credentials);
            let catalog = Arc::clone(&self.catalog);
            tasks.spawn(async move {
                resolve_query(&credentials, catalog.as_ref(), &query, limit).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(resolved)) => {
                    report.resolved += 1;
                    report.appended += self.merge(resolved).await;
                }
                Ok(None) => report.failed += 1,
                Err(e) => {
                    warning!("Search task failed: {}", e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn merge(&self, resolved: ResolvedQuery) -> usize {
        let appended = self.tracks.lock().await.append(resolved.tracks);
        if let Some(genres) = resolved.genres {
            *self.genres.lock().await = genres;
        }
        appended
    }
}

async fn resolve_query(
    credentials: &CredentialManager,
    catalog: &dyn Catalog,
    query: &str,
    limit: u32,
) -> Option<ResolvedQuery> {
    let tracks = match credentials
        .authorized(|token| async move { catalog.search_tracks(&token, query, limit).await })
        .await
    {
        Ok(tracks) => tracks,
        Err(ApiError::Malformed(reason)) => {
            warning!("Search for '{}' returned an unreadable body: {}", query, reason);
            Vec::new()
        }
        Err(e) => {
            warning!("Search for '{}' failed: {}", query, e);
            return None;
        }
    };

    let artist_ids = utils::distinct_artist_ids(&tracks);
    if artist_ids.is_empty() {
        return Some(ResolvedQuery {
            tracks,
            genres: None,
        });
    }

    let ids = artist_ids.as_slice();
    let genres = match credentials
        .authorized(|token| async move { catalog.artist_genres(&token, ids).await })
        .await
    {
        Ok(artists) => Some(GenreSet::from_artists(&artists)),
        Err(ApiError::Malformed(reason)) => {
            warning!("Artist lookup returned an unreadable body: {}", reason);
            Some(GenreSet::default())
        }
        Err(e) => {
            warning!("Artist lookup for '{}' failed: {}", query, e);
            None
        }
    };

    Some(ResolvedQuery { tracks, genres })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Grant, SpotifySettings},
        spotify::MockCatalog,
        types::{ArtistGenres, Credential, CredentialSource, TrackArtist},
    };
    use mockall::predicate::*;

    fn settings() -> SpotifySettings {
        SpotifySettings {
            client_id: "id".into(),
            client_secret: "secret".into(),
            api_url: "http://127.0.0.1:9".into(),
            token_url: "http://127.0.0.1:9/api/token".into(),
            auth_url: "http://127.0.0.1:9/authorize".into(),
            redirect_uri: "http://127.0.0.1:9/callback".into(),
            user_id: None,
            device_id: None,
        }
    }

    async fn credentials() -> Arc<CredentialManager> {
        let manager = CredentialManager::new(&settings(), Grant::Interactive);
        manager
            .set_token(Credential::new("token", CredentialSource::ClientCredentials))
            .await;
        Arc::new(manager)
    }

    fn track(name: &str, artist_ids: &[&str]) -> Track {
        Track {
            name: name.into(),
            uri: format!("spotify:track:{}", name),
            artists: artist_ids
                .iter()
                .map(|id| TrackArtist {
                    id: id.to_string(),
                    name: format!("artist {}", id),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn orchestrator(catalog: MockCatalog, credentials: Arc<CredentialManager>) -> SearchOrchestrator {
        SearchOrchestrator::new(
            credentials,
            Arc::new(catalog),
            Arc::new(Mutex::new(TrackCollection::default())),
            Arc::new(Mutex::new(GenreSet::default())),
        )
    }

    #[tokio::test]
    async fn lookup_uses_each_artist_once() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .with(eq("token"), eq("song"), eq(5u32))
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    track("one", &["a1", "a2"]),
                    track("two", &["a2"]),
                    track("three", &["a1"]),
                ])
            });
        catalog
            .expect_artist_genres()
            .withf(|_, ids| ids == ["a1".to_string(), "a2".to_string()])
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    ArtistGenres {
                        id: "a1".into(),
                        genres: vec!["jazz".into()],
                    },
                    ArtistGenres {
                        id: "a2".into(),
                        genres: vec!["jazz".into(), "soul".into()],
                    },
                ])
            });

        let orchestrator = orchestrator(catalog, credentials().await);
        let report = orchestrator.search(&["song".to_string()], 5).await;

        assert_eq!(report.appended, 3);
        assert_eq!(orchestrator.genres().lock().await.descriptor(), "jazz, soul");
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_genres() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .returning(|_, _, _| Ok(vec![track("one", &["a1"])]));
        catalog
            .expect_artist_genres()
            .times(1)
            .returning(|_, _| Err(ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)));

        let previous = GenreSet::from_artists(&[ArtistGenres {
            id: "a9".into(),
            genres: vec!["ambient".into()],
        }]);
        let orchestrator = SearchOrchestrator::new(
            credentials().await,
            Arc::new(catalog),
            Arc::new(Mutex::new(TrackCollection::default())),
            Arc::new(Mutex::new(previous)),
        );
        let report = orchestrator.search(&["one".to_string()], 1).await;

        assert_eq!(report.resolved, 1);
        assert_eq!(report.appended, 1);
        assert_eq!(orchestrator.genres().lock().await.descriptor(), "ambient");
    }

    #[tokio::test]
    async fn tracks_without_artists_skip_the_lookup() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .returning(|_, _, _| Ok(vec![track("lonely", &[])]));
        catalog.expect_artist_genres().times(0);

        let orchestrator = orchestrator(catalog, credentials().await);
        let report = orchestrator.search(&["lonely".to_string()], 1).await;

        assert_eq!(report.appended, 1);
        assert!(orchestrator.genres().lock().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_search_degrades_to_empty() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .with(always(), eq("broken"), always())
            .returning(|_, _, _| Err(ApiError::Malformed("expected value".into())));
        catalog
            .expect_search_tracks()
            .with(always(), eq("fine"), always())
            .returning(|_, _, _| Ok(vec![track("fine", &[])]));

        let orchestrator = orchestrator(catalog, credentials().await);
        let report = orchestrator
            .search(&["broken".to_string(), "fine".to_string()], 1)
            .await;

        assert_eq!(report.resolved, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(orchestrator.tracks().lock().await.len(), 1);
    }

    #[tokio::test]
    async fn blank_queries_are_ignored() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks().times(0);

        let orchestrator = orchestrator(catalog, credentials().await);
        let report = orchestrator
            .search(&["".to_string(), "   ".to_string()], 1)
            .await;

        assert_eq!(report, BatchReport::default());
    }

    #[tokio::test]
    async fn missing_credential_abandons_the_batch() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks().times(0);

        let credentials = Arc::new(CredentialManager::new(&settings(), Grant::Interactive));
        let orchestrator = orchestrator(catalog, credentials);
        let report = orchestrator.search(&["song".to_string()], 1).await;

        assert_eq!(report.failed, 1);
        assert!(orchestrator.tracks().lock().await.is_empty());
    }
}
