use std::sync::Arc;

use inkpress_core::PostId;
use inkpress_posts::Post;
use tracing::info;

use crate::{Collection, DocumentStore, StoreResult};

/// Blog post storage.
#[derive(Clone)]
pub struct Posts {
    docs: Collection<Post>,
}

impl Posts {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store),
        }
    }

    /// Every post, newest first.
    pub async fn all(&self) -> StoreResult<Vec<Post>> {
        let posts = self.docs.list(0, None).await?;
        info!(count = posts.len(), "posts listed");
        Ok(posts)
    }

    pub async fn find(&self, id: PostId) -> StoreResult<Option<Post>> {
        self.docs.get(&id).await
    }

    pub async fn create(&self, post: &Post) -> StoreResult<()> {
        self.docs.insert(post).await?;
        info!(post_id = %post.id, title = %post.title, author = %post.author, "post created");
        Ok(())
    }

    /// `false` when the post no longer exists.
    pub async fn update(&self, post: &Post) -> StoreResult<bool> {
        let updated = self.docs.replace(post).await?;
        if updated {
            info!(post_id = %post.id, title = %post.title, author = %post.author, "post updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: PostId) -> StoreResult<Option<Post>> {
        let removed = self.docs.remove(&id).await?;
        if let Some(post) = &removed {
            info!(post_id = %post.id, title = %post.title, author = %post.author, "post deleted");
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> StoreResult<u64> {
        self.docs.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use chrono::{DateTime, Duration, Utc};
    use inkpress_posts::PostDraft;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    #[tokio::test]
    async fn crud_round() {
        let posts = Posts::new(InMemoryStore::arc());
        let mut post = Post::create(PostDraft::new("T", "C", "A"), at(0)).unwrap();
        posts.create(&post).await.unwrap();

        post.revise(PostDraft::new("T2", "C2", "A2"), at(5)).unwrap();
        assert!(posts.update(&post).await.unwrap());

        let stored = posts.find(post.id).await.unwrap().unwrap();
        assert_eq!(stored, post);

        assert!(posts.delete(post.id).await.unwrap().is_some());
        assert!(posts.find(post.id).await.unwrap().is_none());
        assert!(!posts.update(&post).await.unwrap());
    }

    #[tokio::test]
    async fn all_is_newest_first() {
        let posts = Posts::new(InMemoryStore::arc());
        for (i, title) in ["first", "second", "third"].iter().enumerate() {
            let p = Post::create(PostDraft::new(*title, "c", "a"), at(i as i64)).unwrap();
            posts.create(&p).await.unwrap();
        }
        let titles: Vec<_> = posts.all().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn writes_are_logged_with_post_fields() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        // Current-thread runtime: the default stays in place across awaits.
        let _guard = tracing::subscriber::set_default(subscriber);

        let posts = Posts::new(InMemoryStore::arc());
        let mut post = Post::create(PostDraft::new("Logged", "c", "Ann"), at(0)).unwrap();
        posts.create(&post).await.unwrap();
        post.revise(PostDraft::new("Logged again", "c", "Ann"), at(1)).unwrap();
        posts.update(&post).await.unwrap();
        posts.all().await.unwrap();
        posts.delete(post.id).await.unwrap();

        let output = String::from_utf8(capture.0.lock().clone()).unwrap();
        for message in ["post created", "post updated", "posts listed", "post deleted"] {
            assert!(output.contains(message), "missing {message:?} in {output}");
        }
        assert!(output.contains(&post.id.to_string()));
        assert!(output.contains("\"author\":\"Ann\""));
        assert!(output.contains("\"count\":1"));
    }
}
