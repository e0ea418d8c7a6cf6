use chrono::{DateTime, Duration, Utc};
use tracing::info;

use inkpress_posts::{Post, PostDraft};

use crate::{Posts, StoreResult};

const SAMPLES: [(&str, &str, &str); 5] = [
    (
        "Welcome to Our Blog",
        "This is the first blog post on our platform. We're excited to share interesting content with our readers. Stay tuned for more articles about technology, development, and best practices.",
        "Admin Team",
    ),
    (
        "Getting Started with React",
        "React is a powerful JavaScript library for building user interfaces. In this post, we'll explore the basics of React components, state management, and hooks. Whether you're a beginner or experienced developer, there's something here for everyone.",
        "John Developer",
    ),
    (
        "Docker Best Practices",
        "Docker has revolutionized how we deploy applications. Learn about Docker best practices including multi-stage builds, security considerations, and optimization techniques. We'll cover everything from basic concepts to advanced deployment strategies.",
        "Sarah DevOps",
    ),
    (
        "API Design Principles",
        "Good API design is crucial for building scalable applications. We'll discuss RESTful principles, error handling, versioning strategies, and documentation best practices. These principles apply whether you're building microservices or monolithic applications.",
        "Mike Architect",
    ),
    (
        "Testing Strategies for Modern Applications",
        "Testing is an essential part of software development. We'll explore different testing strategies including unit tests, integration tests, and end-to-end tests. Learn how to implement comprehensive testing that gives you confidence in your code.",
        "Lisa QA",
    ),
];

/// The sample posts, stamped one millisecond apart so the first sample is oldest.
pub fn sample_posts(now: DateTime<Utc>) -> Vec<Post> {
    SAMPLES
        .iter()
        .enumerate()
        .filter_map(|(i, (title, content, author))| {
            let at = now + Duration::milliseconds(i as i64);
            Post::create(PostDraft::new(*title, *content, *author), at).ok()
        })
        .collect()
}

/// Replace every stored post with the samples. Returns how many were inserted.
pub async fn seed_posts(posts: &Posts, now: DateTime<Utc>) -> StoreResult<usize> {
    let removed = posts.clear().await?;
    info!(removed, "cleared existing posts");

    let samples = sample_posts(now);
    for post in &samples {
        posts.create(post).await?;
        info!(post_id = %post.id, title = %post.title, author = %post.author, "seeded post");
    }
    info!(count = samples.len(), "database seeding completed");
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    #[test]
    fn every_sample_is_a_valid_post() {
        assert_eq!(sample_posts(Utc::now()).len(), SAMPLES.len());
    }

    #[tokio::test]
    async fn seeding_replaces_existing_posts() {
        let posts = Posts::new(InMemoryStore::arc());
        let old = Post::create(PostDraft::new("old", "old", "old"), Utc::now()).unwrap();
        posts.create(&old).await.unwrap();

        let n = seed_posts(&posts, Utc::now()).await.unwrap();
        assert_eq!(n, 5);

        let all = posts.all().await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].title, "Testing Strategies for Modern Applications");
        assert!(all.iter().all(|p| p.id != old.id));
    }
}
