//! Building a viewer's feed: pick the candidate posts, rank them, render them for the client.
use crate::config::MediaConfig;
use crate::datastore::{Attachment, PostDetails, PostStore, RelationshipStore, User};
use crate::twoface::Fallible;
use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

/// Appended to every rendered attachment URL.
const SIZE_SUFFIX: &str = "?size=small";

/// Which posts a feed draws from.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Every post.
    #[default]
    All,
    /// Posts by the users the viewer follows.
    Following,
}

/// A user reduced to what other users may see.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Liker {
    pub user_id: i32,
    pub name: String,
}

/// A post as the client sees it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub id: i32,
    pub content: String,
    #[serde(serialize_with = "serialize_stamp")]
    pub created_at: DateTime<Utc>,
    pub author: UserSummary,
    pub attachments: Vec<String>,
    pub likes: Vec<Liker>,
}

impl PostView {
    pub fn render(details: PostDetails, media_base_url: &str) -> Self {
        Self {
            id: details.post.id,
            content: details.post.content,
            created_at: details.post.created_at,
            author: details.author.into(),
            attachments: details
                .attachments
                .iter()
                .map(|a: &Attachment| render_attachment(media_base_url, &a.path))
                .collect(),
            likes: details
                .likers
                .into_iter()
                .map(|user| Liker {
                    user_id: user.id,
                    name: user.name,
                })
                .collect(),
        }
    }
}

/// UTC, second precision, 'Z' suffix.
fn serialize_stamp<S: Serializer>(stamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&stamp.format("%Y-%m-%dT%H:%M:%SZ"))
}

/// Turn a stored filename into the URL clients fetch it from. Already-rendered URLs are returned
/// unchanged.
pub fn render_attachment(media_base_url: &str, path: &str) -> String {
    if path.starts_with(media_base_url) && path.ends_with(SIZE_SUFFIX) {
        return path.to_owned();
    }
    format!("{}{}{}", media_base_url, path, SIZE_SUFFIX)
}

/// Order posts by like count, most liked first, breaking ties newest first.
///
/// This is two sorts rather than one composite key: a timestamp sort followed by a stable sort on
/// like count. Equal like counts keep the order the first pass gave them.
pub fn rank(mut posts: Vec<PostDetails>) -> Vec<PostDetails> {
    posts.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
    posts.sort_by(|a, b| b.likers.len().cmp(&a.likers.len()));
    posts
}

/// The ranked feed for `viewer`. An empty `Following` scope short-circuits to an empty feed
/// without touching posts.
pub async fn get_feed<DS>(
    ds: &DS,
    viewer: &User,
    scope: Scope,
    media: &MediaConfig,
) -> Fallible<Vec<PostView>>
where
    DS: PostStore + RelationshipStore,
{
    let author_ids = match scope {
        Scope::All => None,
        Scope::Following => {
            let following = ds.relations(viewer.id).await?.following;
            if following.is_empty() {
                debug!(user_id = viewer.id, "viewer follows nobody");
                return Ok(Vec::new());
            }
            Some(following)
        }
    };

    let candidates = ds.post_details(author_ids).await?;
    let feed: Vec<PostView> = rank(candidates)
        .into_iter()
        .map(|details| PostView::render(details, &media.base_url))
        .collect();
    info!(user_id = viewer.id, posts = feed.len(), ?scope, "served feed");
    Ok(feed)
}
