use crate::api::{RedditApiClient, RedditListing, RedditPostData};
use newsdesk_core::{CoreError, ForumPost};
use tracing::{debug, info};

/// Anything that can serve pages of a subreddit's hot listing.
pub trait ListingSource {
    async fn hot_page(
        &self,
        subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError>;
}

/// Hot listings read with a bearer token.
pub struct AuthorizedListings {
    api: RedditApiClient,
    access_token: String,
}

impl AuthorizedListings {
    pub fn new(api: RedditApiClient, access_token: String) -> Self {
        Self { api, access_token }
    }
}

impl ListingSource for AuthorizedListings {
    async fn hot_page(
        &self,
        subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        self.api
            .get_subreddit_posts(&self.access_token, subreddit, Some(limit), after)
            .await
    }
}

/// Keeps the first `wanted` non-stickied posts, in listing order.
pub fn select_hot_posts<I>(
    posts: I,
    wanted: usize,
    subreddit: &str,
    permalink_base: &str,
) -> Vec<ForumPost>
where
    I: IntoIterator<Item = RedditPostData>,
{
    posts
        .into_iter()
        .filter(|post| !post.stickied)
        .take(wanted)
        .map(|post| post.into_forum_post(subreddit, permalink_base))
        .collect()
}

pub struct ForumFetcher<S> {
    pub(crate) source: S,
    permalink_base: String,
}

impl<S: ListingSource> ForumFetcher<S> {
    pub fn new(source: S, permalink_base: impl Into<String>) -> Self {
        Self {
            source,
            permalink_base: permalink_base.into(),
        }
    }

    /// Up to `limit` non-stickied hot posts from one subreddit.
    ///
    /// Stickied posts take slots in a listing page, so further pages are read
    /// until `limit` posts are collected or the listing runs out.
    pub async fn fetch_hot(&self, subreddit: &str, limit: u32) -> Result<Vec<ForumPost>, CoreError> {
        let wanted = limit as usize;
        let mut posts = Vec::with_capacity(wanted);
        let mut after: Option<String> = None;

        while posts.len() < wanted {
            let listing = self
                .source
                .hot_page(subreddit, limit, after.as_deref())
                .await?;
            let page_len = listing.data.children.len();

            posts.extend(select_hot_posts(
                listing.data.children.into_iter().map(|child| child.data),
                wanted - posts.len(),
                subreddit,
                &self.permalink_base,
            ));

            after = listing.data.after;
            if page_len == 0 || after.is_none() {
                break;
            }
            if posts.len() < wanted {
                debug!(
                    "r/{}: {} of {} posts after stickied filtering, reading next page",
                    subreddit,
                    posts.len(),
                    wanted
                );
            }
        }

        info!("📰 r/{}: kept {} hot posts", subreddit, posts.len());
        Ok(posts)
    }

    /// Hot posts from several subreddits, concatenated in the given order and
    /// then capped at `max_total`.
    pub async fn fetch_all(
        &self,
        forums: &[String],
        limit: u32,
        max_total: Option<usize>,
    ) -> Result<Vec<ForumPost>, CoreError> {
        let mut posts = Vec::new();
        for forum in forums {
            posts.extend(self.fetch_hot(forum, limit).await?);
        }
        if let Some(cap) = max_total {
            posts.truncate(cap);
        }
        Ok(posts)
    }
}
