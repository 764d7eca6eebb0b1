use crate::datastore::{
    postfilters::PostFilters, Attachment, AttachmentStore, Follow, Like, NewAttachment, NewPost,
    NewUser, Post, PostDetails, PostStore, Profile, Relations, RelationshipStore, User, UserStore,
};
use crate::twoface::{Cause, Fallible, TfError};
use async_trait::async_trait;
use chrono::offset::Utc;
use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc, Mutex,
};

type Store<T> = Arc<Mutex<Vec<T>>>;

/// A mock implementation of every datastore trait, with the same cascades as the Postgres schema.
#[derive(Clone, Default, Debug)]
pub struct Client {
    users: Store<User>,
    posts: Store<Post>,
    attachments: Store<Attachment>,
    follows: Store<Follow>,
    likes: Store<Like>,
    last_id: Arc<AtomicI32>,
}

impl Client {
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = Arc::new(Mutex::new(posts));
    }

    /// Insert a user with a fresh id, skipping the uniqueness checks.
    pub fn add_user(&self, name: &str, api_key: &str) -> User {
        let user = User {
            id: self.next_id(),
            name: name.to_owned(),
            api_key: api_key.to_owned(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn follows(&self) -> Vec<Follow> {
        self.follows.lock().unwrap().clone()
    }

    pub fn likes(&self) -> Vec<Like> {
        self.likes.lock().unwrap().clone()
    }

    fn next_id(&self) -> i32 {
        self.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn user(&self, user_id: i32) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    /// Remove everything hanging off the given posts.
    fn cascade_posts(&self, post_ids: &[i32]) {
        self.attachments
            .lock()
            .unwrap()
            .retain(|a| !matches!(a.post_id, Some(id) if post_ids.contains(&id)));
        self.likes
            .lock()
            .unwrap()
            .retain(|l| !post_ids.contains(&l.post_id));
    }
}

#[async_trait]
impl UserStore for Client {
    async fn find_user(&self, user_id: i32) -> Fallible<Option<User>> {
        Ok(self.user(user_id))
    }

    async fn find_user_by_api_key(&self, api_key: String) -> Fallible<Option<User>> {
        let user = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.api_key == api_key)
            .cloned();
        Ok(user)
    }

    async fn user_profile(&self, user_id: i32) -> Fallible<Option<Profile>> {
        let Some(user) = self.user(user_id) else {
            return Ok(None);
        };
        let follows = self.follows();
        let followers = follows
            .iter()
            .filter(|f| f.followee_id == user_id)
            .filter_map(|f| self.user(f.follower_id))
            .collect();
        let following = follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .filter_map(|f| self.user(f.followee_id))
            .collect();
        Ok(Some(Profile {
            user,
            followers,
            following,
        }))
    }

    async fn new_user(&self, new_user: NewUser) -> Fallible<User> {
        let taken = self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.api_key == new_user.api_key);
        if taken {
            return Err(TfError::rejection(
                Cause::UserConflict,
                "A user with this api-key already exists",
            ));
        }
        Ok(self.add_user(&new_user.name, &new_user.api_key))
    }

    async fn delete_user(&self, user_id: i32) -> Fallible<Option<User>> {
        let Some(user) = self.user(user_id) else {
            return Ok(None);
        };
        self.users.lock().unwrap().retain(|u| u.id != user_id);

        let mut owned_posts = Vec::new();
        self.posts.lock().unwrap().retain(|p| {
            if p.author_id == user_id {
                owned_posts.push(p.id);
                false
            } else {
                true
            }
        });
        self.cascade_posts(&owned_posts);

        self.attachments
            .lock()
            .unwrap()
            .retain(|a| a.user_id != user_id);
        self.likes.lock().unwrap().retain(|l| l.user_id != user_id);
        self.follows
            .lock()
            .unwrap()
            .retain(|f| f.follower_id != user_id && f.followee_id != user_id);
        Ok(Some(user))
    }
}

#[async_trait]
impl PostStore for Client {
    async fn new_post(&self, new_post: NewPost, attachment_ids: Vec<i32>) -> Fallible<Post> {
        // Insert the new post
        let post = Post {
            id: self.next_id(),
            content: new_post.content,
            created_at: Utc::now(),
            author_id: new_post.author_id,
        };
        self.posts.lock().unwrap().push(post.clone());

        for attachment in self.attachments.lock().unwrap().iter_mut() {
            if attachment_ids.contains(&attachment.id) && attachment.post_id.is_none() {
                attachment.post_id = Some(post.id);
            }
        }

        Ok(post)
    }

    async fn find_post(&self, post_id: i32) -> Fallible<Option<Post>> {
        let post = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned();
        Ok(post)
    }

    async fn delete_post(&self, author_id: i32, post_id: i32) -> Fallible<Option<Post>> {
        let filters = PostFilters {
            id: Some(post_id),
            author_id: Some(author_id),
            ..Default::default()
        };
        let mut posts = self.posts.lock().unwrap();
        let Some(index) = posts.iter().position(|p| p.matches(&filters)) else {
            return Ok(None);
        };
        let post = posts.remove(index);
        drop(posts);

        self.cascade_posts(&[post.id]);
        Ok(Some(post))
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let all_posts = self.posts.lock().unwrap();
        let posts = all_posts
            .iter()
            .filter(|p| p.matches(&filters))
            .take(filters.limit as usize);
        let mut results = Vec::new();
        for post in posts {
            results.push(post.clone())
        }
        Ok(results)
    }

    async fn post_details(&self, author_ids: Option<Vec<i32>>) -> Fallible<Vec<PostDetails>> {
        let posts = self.posts.lock().unwrap().clone();
        let attachments = self.attachments.lock().unwrap().clone();
        let likes = self.likes();

        let mut details = Vec::new();
        for post in posts {
            if let Some(author_ids) = &author_ids {
                if !author_ids.contains(&post.author_id) {
                    continue;
                }
            }
            let Some(author) = self.user(post.author_id) else {
                continue;
            };
            let mut post_attachments: Vec<Attachment> = attachments
                .iter()
                .filter(|a| a.post_id == Some(post.id))
                .cloned()
                .collect();
            post_attachments.sort_by_key(|a| a.id);
            let likers = likes
                .iter()
                .filter(|l| l.post_id == post.id)
                .filter_map(|l| self.user(l.user_id))
                .collect();
            details.push(PostDetails {
                post,
                author,
                attachments: post_attachments,
                likers,
            });
        }
        // Same order as the Postgres query.
        details.sort_by(|a, b| {
            (b.post.created_at, b.post.id).cmp(&(a.post.created_at, a.post.id))
        });
        Ok(details)
    }
}

#[async_trait]
impl RelationshipStore for Client {
    async fn relations(&self, user_id: i32) -> Fallible<Relations> {
        let follows = self.follows();
        Ok(Relations {
            following: follows
                .iter()
                .filter(|f| f.follower_id == user_id)
                .map(|f| f.followee_id)
                .collect(),
            followers: follows
                .iter()
                .filter(|f| f.followee_id == user_id)
                .map(|f| f.follower_id)
                .collect(),
            liked_posts: self
                .likes()
                .iter()
                .filter(|l| l.user_id == user_id)
                .map(|l| l.post_id)
                .collect(),
        })
    }

    async fn add_follow(&self, follow: Follow) -> Fallible<bool> {
        let mut follows = self.follows.lock().unwrap();
        if follows.contains(&follow) {
            return Ok(false);
        }
        follows.push(follow);
        Ok(true)
    }

    async fn remove_follow(&self, follow: Follow) -> Fallible<bool> {
        let mut follows = self.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|f| f != &follow);
        Ok(follows.len() < before)
    }

    async fn add_like(&self, like: Like) -> Fallible<bool> {
        let mut likes = self.likes.lock().unwrap();
        if likes.contains(&like) {
            return Ok(false);
        }
        likes.push(like);
        Ok(true)
    }

    async fn remove_like(&self, like: Like) -> Fallible<bool> {
        let mut likes = self.likes.lock().unwrap();
        let before = likes.len();
        likes.retain(|l| l != &like);
        Ok(likes.len() < before)
    }
}

#[async_trait]
impl AttachmentStore for Client {
    async fn new_attachment(&self, new_attachment: NewAttachment) -> Fallible<Attachment> {
        let attachment = Attachment {
            id: self.next_id(),
            path: new_attachment.path,
            user_id: new_attachment.user_id,
            post_id: None,
        };
        self.attachments.lock().unwrap().push(attachment.clone());
        Ok(attachment)
    }

    async fn find_attachment(&self, attachment_id: i32) -> Fallible<Option<Attachment>> {
        let attachment = self
            .attachments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == attachment_id)
            .cloned();
        Ok(attachment)
    }
}
