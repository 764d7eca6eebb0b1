use crate::datastore::postfilters::PostFilters;
use crate::datastore::tables::{attachments, follows, likes, posts, users};
use chrono::{offset::Utc, DateTime};
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

/// A user of the website.
#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq, Eq, Hash)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub name: String,
    /// The opaque credential this user authenticates with. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: String,
}

/// Parameters for the database statement which inserts new users.
#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub api_key: String,
}

/// A post from a user
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq, Eq, Hash,
)]
#[diesel(belongs_to(User, foreign_key = author_id))]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i32,
}

impl Post {
    #[allow(dead_code)]
    /// Does this post match all specified filters?
    pub fn matches(&self, filters: &PostFilters) -> bool {
        if let Some(author_id) = filters.author_id {
            if author_id != self.author_id {
                return false;
            }
        }
        if let Some(id) = filters.id {
            if id != self.id {
                return false;
            }
        }
        if let Some(substring) = &filters.text_contains {
            if !self.content.contains(substring) {
                return false;
            }
        }
        if let Some(created_before) = filters.created_before {
            if self.created_at >= created_before {
                return false;
            }
        }
        true
    }
}

/// Parameters for the database statement which inserts new posts. The creation time is assigned
/// by the datastore.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub content: String,
    pub author_id: i32,
}

/// An uploaded file. `post_id` stays unset until a post claims it.
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(belongs_to(Post))]
#[diesel(table_name = attachments)]
pub struct Attachment {
    pub id: i32,
    /// Filename inside the upload directory.
    pub path: String,
    /// The uploader.
    pub user_id: i32,
    pub post_id: Option<i32>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = attachments)]
pub struct NewAttachment {
    pub path: String,
    pub user_id: i32,
}

/// A directed follow edge.
#[derive(Insertable, Debug, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = follows)]
pub struct Follow {
    pub follower_id: i32,
    pub followee_id: i32,
}

/// A user liking a post.
#[derive(
    Queryable, Selectable, Identifiable, Insertable, Associations, Debug, Clone, Copy, PartialEq, Eq,
)]
#[diesel(primary_key(user_id, post_id))]
#[diesel(belongs_to(Post))]
#[diesel(belongs_to(User))]
#[diesel(table_name = likes)]
pub struct Like {
    pub user_id: i32,
    pub post_id: i32,
}

/// A post joined with everything needed to show it to a viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDetails {
    pub post: Post,
    pub author: User,
    /// Ordered by attachment id, i.e. upload order.
    pub attachments: Vec<Attachment>,
    pub likers: Vec<User>,
}

/// One user's edges in the follow and like graphs, exactly as currently stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relations {
    /// Ids of the users this user follows.
    pub following: Vec<i32>,
    /// Ids of the users who follow this user.
    pub followers: Vec<i32>,
    /// Ids of the posts this user likes.
    pub liked_posts: Vec<i32>,
}

/// A user together with both directions of their follow edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub user: User,
    pub followers: Vec<User>,
    pub following: Vec<User>,
}

#[cfg(test)]
mod post_tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_post_condition() {
        let post = Post {
            id: 4,
            author_id: 1,
            content: "example text".to_owned(),
            created_at: Utc::now() - Duration::seconds(10),
        };

        assert!(post.matches(&PostFilters {
            author_id: Some(1),
            ..Default::default()
        }));

        assert!(!post.matches(&PostFilters {
            author_id: Some(2),
            ..Default::default()
        }));

        assert!(post.matches(&PostFilters {
            text_contains: Some("ample".to_owned()),
            ..Default::default()
        }));

        assert!(post.matches(&PostFilters {
            created_before: Some(Utc::now()),
            ..Default::default()
        }));

        // The post didn't exist yet at its own creation time minus a second.
        assert!(!post.matches(&PostFilters {
            created_before: Some(post.created_at - Duration::seconds(1)),
            ..Default::default()
        }));

        assert!(!post.matches(&PostFilters {
            id: Some(5),
            ..Default::default()
        }));
    }

    #[test]
    fn test_likes_are_keyed_by_user_and_post() {
        use diesel::{BelongingToDsl, Identifiable};

        let like = Like {
            user_id: 1,
            post_id: 2,
        };
        assert_eq!((&like).id(), (&1, &2));

        let posts = vec![Post {
            id: 2,
            author_id: 1,
            content: "liked".to_owned(),
            created_at: Utc::now(),
        }];
        let query = Like::belonging_to(&posts);
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(sql.contains(r#""likes"."post_id" = ANY"#), "{}", sql);
    }

    #[test]
    fn test_credential_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Oliver".to_owned(),
            api_key: "secret".to_owned(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Oliver"}"#);
    }
}
