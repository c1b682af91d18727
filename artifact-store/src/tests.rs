#[cfg(test)]
mod tests {
    use crate::{
        dated_key, download_latest, preview, read_posts, upload_artifact, write_posts,
        FsObjectStore, ObjectStore, StoreBackend,
    };
    use chrono::NaiveDate;
    use newsdesk_core::{ArtifactError, ArtifactFormat, CoreError, ForumPost, StorageError};
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn sample_posts() -> Vec<ForumPost> {
        vec![
            ForumPost {
                title: "Nintendo announces \"Direct\", today at 3pm".to_string(),
                url: "https://example.com/direct".to_string(),
                permalink: "https://reddit.com/r/gamernews/comments/abc/direct/".to_string(),
                score: 1520,
                subreddit: "gamernews".to_string(),
            },
            ForumPost {
                title: "Patch notes\nmultiline".to_string(),
                url: "https://example.com/patch".to_string(),
                permalink: "https://reddit.com/r/gamernews/comments/def/patch/".to_string(),
                score: -3,
                subreddit: "gamernews".to_string(),
            },
        ]
    }

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 7).unwrap()
    }

    #[test]
    fn test_csv_write_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/reddit_gamer_news_2025-04-07.csv");

        write_posts(&sample_posts(), &path, ArtifactFormat::Csv).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("title,url,permalink,score,subreddit\n"));

        let posts = read_posts(&path, ArtifactFormat::Csv).unwrap();
        assert_eq!(posts, sample_posts());
    }

    #[test]
    fn test_json_write_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");

        write_posts(&sample_posts(), &path, ArtifactFormat::Json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["score"], 1520);

        let posts = read_posts(&path, ArtifactFormat::Json).unwrap();
        assert_eq!(posts, sample_posts());
    }

    #[test]
    fn test_empty_csv_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        write_posts(&[], &path, ArtifactFormat::Csv).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "title,url,permalink,score,subreddit\n"
        );
        assert!(read_posts(&path, ArtifactFormat::Csv).unwrap().is_empty());
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.csv");

        write_posts(&sample_posts(), &path, ArtifactFormat::Csv).unwrap();
        write_posts(&sample_posts()[..1], &path, ArtifactFormat::Csv).unwrap();
        assert_eq!(read_posts(&path, ArtifactFormat::Csv).unwrap().len(), 1);
    }

    #[test]
    fn test_preview_any_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mlb_weather_2025-04-07.csv");
        fs::write(
            &path,
            "team,temp,wind\nNYY,71,5 out\nBOS,64,12 in\nCHC,55,20 out\n",
        )
        .unwrap();

        let text = preview(&path, ArtifactFormat::Csv, 2).unwrap();
        assert_eq!(text, "team,temp,wind\nNYY,71,5 out\nBOS,64,12 in\n");

        let all = preview(&path, ArtifactFormat::Csv, 10).unwrap();
        assert_eq!(all.lines().count(), 4);
    }

    #[test]
    fn test_preview_json_head() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        write_posts(&sample_posts(), &path, ArtifactFormat::Json).unwrap();

        let text = preview(&path, ArtifactFormat::Json, 1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["subreddit"], "gamernews");
    }

    #[test]
    fn test_preview_rejects_bad_files() {
        let dir = TempDir::new().unwrap();

        let empty = dir.path().join("empty.csv");
        fs::write(&empty, "").unwrap();
        assert!(matches!(
            preview(&empty, ArtifactFormat::Csv, 10),
            Err(CoreError::Artifact(ArtifactError::Empty { .. }))
        ));

        let object = dir.path().join("object.json");
        fs::write(&object, r#"{"title": "not a list"}"#).unwrap();
        assert!(matches!(
            preview(&object, ArtifactFormat::Json, 10),
            Err(CoreError::Artifact(ArtifactError::Malformed { .. }))
        ));

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            preview(&missing, ArtifactFormat::Csv, 10),
            Err(CoreError::Io(_))
        ));
    }

    #[test]
    fn test_read_rejects_foreign_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxscores.csv");
        fs::write(&path, "game,score\nNYY@BOS,4-3\n").unwrap();

        assert!(matches!(
            read_posts(&path, ArtifactFormat::Csv),
            Err(CoreError::Artifact(ArtifactError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_dated_key() {
        assert_eq!(
            dated_key("mlb_rosters", "mlb_rosters", fixed_date()),
            "mlb_rosters/mlb_rosters_2025-04-07.csv"
        );
    }

    /// Records requested keys and serves fixed bytes.
    struct RecordingStore {
        requested: Mutex<Vec<(String, String)>>,
    }

    impl ObjectStore for RecordingStore {
        async fn upload(&self, _local_path: &Path, _bucket: &str, _key: &str) -> Result<(), CoreError> {
            Ok(())
        }

        async fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), CoreError> {
            self.requested
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string()));
            fs::write(local_path, "a,b\n1,2\n")?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_download_latest_key() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore {
            requested: Mutex::new(Vec::new()),
        };
        let local = dir.path().join("latest.csv");

        let key = download_latest(
            &store,
            "news-headlines-csvs",
            "reddit_fantasy_baseball",
            "reddit_fantasy_baseball",
            &local,
            fixed_date(),
        )
        .await
        .unwrap();

        assert_eq!(
            key,
            "reddit_fantasy_baseball/reddit_fantasy_baseball_2025-04-07.csv"
        );
        assert_eq!(
            store.requested.lock().unwrap().as_slice(),
            &[("news-headlines-csvs".to_string(), key.clone())]
        );
        assert_eq!(fs::read_to_string(&local).unwrap(), "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let root = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let store = StoreBackend::Local(FsObjectStore::new(root.path()));

        let source = work.path().join("reddit_gamer_news_2025-04-07.csv");
        write_posts(&sample_posts(), &source, ArtifactFormat::Csv).unwrap();
        let key = dated_key("reddit_gamer_news", "reddit_gamer_news", fixed_date());

        upload_artifact(&store, &source, "bucket", &key).await.unwrap();
        assert!(root
            .path()
            .join("bucket/reddit_gamer_news/reddit_gamer_news_2025-04-07.csv")
            .exists());

        let target = work.path().join("downloaded/copy.csv");
        download_latest(
            &store,
            "bucket",
            "reddit_gamer_news",
            "reddit_gamer_news",
            &target,
            fixed_date(),
        )
        .await
        .unwrap();
        assert_eq!(read_posts(&target, ArtifactFormat::Csv).unwrap(), sample_posts());
    }

    #[tokio::test]
    async fn test_fs_store_missing_object() {
        let root = TempDir::new().unwrap();
        let store = FsObjectStore::new(root.path());
        let target = root.path().join("never.csv");

        let result = store.download("bucket", "nothing/here.csv", &target).await;
        assert!(matches!(
            result,
            Err(CoreError::Storage(StorageError::ObjectNotFound { .. }))
        ));
        assert!(!target.exists());

        let upload = store
            .upload(&root.path().join("absent.csv"), "bucket", "k.csv")
            .await;
        assert!(matches!(
            upload,
            Err(CoreError::Storage(StorageError::UploadFailed { .. }))
        ));
    }
}
