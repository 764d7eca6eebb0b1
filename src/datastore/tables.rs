diesel::table! {
    users (id) {
        id -> Int4,
        name -> Varchar,
        api_key -> Varchar,
    }
}

diesel::table! {
    posts (id) {
        id -> Int4,
        content -> Text,
        created_at -> Timestamptz,
        author_id -> Int4,
    }
}

diesel::table! {
    attachments (id) {
        id -> Int4,
        path -> Varchar,
        user_id -> Int4,
        post_id -> Nullable<Int4>,
    }
}

diesel::table! {
    follows (follower_id, followee_id) {
        follower_id -> Int4,
        followee_id -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    likes (user_id, post_id) {
        user_id -> Int4,
        post_id -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(attachments -> posts (post_id));
diesel::joinable!(likes -> posts (post_id));
diesel::joinable!(likes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(attachments, follows, likes, posts, users);
