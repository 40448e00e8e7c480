use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;

use agora_persist::{
    CreateThreadParams, Forum, InMemoryPersistenceClient, NewCommunity, NewThread, Page,
    PersistError, PersistenceClient, UserProfile,
};

async fn forum_with_users(ids: &[&str]) -> (Forum, Arc<InMemoryPersistenceClient>) {
    let client = Arc::new(InMemoryPersistenceClient::new());
    let forum = Forum::new(client.clone());
    for id in ids {
        forum
            .upsert_user(UserProfile {
                id: id.to_string(),
                username: format!("{}_name", id),
                name: id.to_uppercase(),
                image: None,
                bio: None,
            })
            .await
            .unwrap();
    }
    (forum, client)
}

fn post(text: &str, author: &str, community_id: Option<&str>) -> CreateThreadParams {
    CreateThreadParams {
        text: text.to_string(),
        author: author.to_string(),
        community_id: community_id.map(str::to_string),
    }
}

fn community(id: &str, created_by: &str) -> NewCommunity {
    NewCommunity {
        id: id.to_string(),
        username: id.to_string(),
        name: format!("Community {}", id),
        image: None,
        bio: None,
        created_by: created_by.to_string(),
    }
}

#[tokio::test]
async fn test_create_thread_links_author_and_community() {
    let (forum, client) = forum_with_users(&["alice"]).await;
    forum.create_community(community("rust", "alice")).await.unwrap();

    let thread = forum.create_thread(post("hello", "alice", Some("rust"))).await.unwrap();

    assert_eq!(thread.community.as_deref(), Some("rust"));
    let user = client.get_user("alice").await.unwrap().unwrap();
    assert_eq!(user.threads, vec![thread.id.clone()]);
    let rust = client.get_community("rust").await.unwrap().unwrap();
    assert_eq!(rust.threads, vec![thread.id]);
}

#[tokio::test]
async fn test_unknown_community_creates_personal_thread() {
    let (forum, _) = forum_with_users(&["alice"]).await;

    let thread = forum.create_thread(post("hello", "alice", Some("missing"))).await.unwrap();

    assert!(thread.community.is_none());
}

#[tokio::test]
async fn test_create_thread_validation() {
    let (forum, _) = forum_with_users(&["alice"]).await;

    let err = forum.create_thread(post("   ", "alice", None)).await.unwrap_err();
    assert!(matches!(err, PersistError::Validation(_)));

    let err = forum.create_thread(post("hi", "nobody", None)).await.unwrap_err();
    assert!(matches!(err, PersistError::UserNotFound(id) if id == "nobody"));
}

#[tokio::test]
async fn test_fetch_posts_paginates_top_level_only() {
    let (forum, _) = forum_with_users(&["alice", "bob"]).await;
    let mut ids = Vec::new();
    for i in 0..3 {
        let thread = forum.create_thread(post(&format!("post {}", i), "alice", None)).await.unwrap();
        ids.push(thread.id);
    }
    forum.add_comment_to_thread(&ids[0], "a reply", "bob").await.unwrap();

    let first = forum.fetch_posts(Page::new(1, 2)).await.unwrap();
    assert_eq!(first.posts.len(), 2);
    assert!(first.is_next);
    assert_eq!(first.posts[0].id, ids[2]);
    assert_eq!(first.posts[1].id, ids[1]);

    let second = forum.fetch_posts(Page::new(2, 2)).await.unwrap();
    assert_eq!(second.posts.len(), 1);
    assert!(!second.is_next);
    let oldest = &second.posts[0];
    assert_eq!(oldest.id, ids[0]);
    assert_eq!(oldest.children.len(), 1);
    assert_eq!(oldest.children[0].author.as_ref().unwrap().id, "bob");
}

#[tokio::test]
async fn test_page_zero_is_first_page() {
    let page = Page::new(0, 0);
    assert_eq!(page.number, 1);
    assert_eq!(page.size, 1);
    assert_eq!(page.skip(), 0);
    assert_eq!(Page::new(3, 500).size, 100);
    assert_eq!(Page::new(3, 10).skip(), 20);
}

#[tokio::test]
async fn test_comment_is_added_to_parent_children() {
    let (forum, client) = forum_with_users(&["alice", "bob"]).await;
    let thread = forum.create_thread(post("root", "alice", None)).await.unwrap();

    let comment = forum.add_comment_to_thread(&thread.id, "reply", "bob").await.unwrap();

    assert_eq!(comment.parent_id.as_deref(), Some(thread.id.as_str()));
    let parent = client.get_thread(&thread.id).await.unwrap().unwrap();
    assert_eq!(parent.children, vec![comment.id]);
    let bob = client.get_user("bob").await.unwrap().unwrap();
    assert!(bob.threads.is_empty());
}

#[tokio::test]
async fn test_comment_on_missing_thread() {
    let (forum, _) = forum_with_users(&["bob"]).await;

    let err = forum.add_comment_to_thread("missing", "reply", "bob").await.unwrap_err();

    assert!(matches!(err, PersistError::ThreadNotFound(_)));
}

#[tokio::test]
async fn test_fetch_thread_by_id_expands_two_levels() {
    let (forum, _) = forum_with_users(&["alice", "bob", "carol"]).await;
    let root = forum.create_thread(post("root", "alice", None)).await.unwrap();
    let first = forum.add_comment_to_thread(&root.id, "first", "bob").await.unwrap();
    let second = forum.add_comment_to_thread(&root.id, "second", "carol").await.unwrap();
    let nested = forum.add_comment_to_thread(&first.id, "nested", "carol").await.unwrap();
    forum.add_comment_to_thread(&nested.id, "too deep", "alice").await.unwrap();

    let view = forum.fetch_thread_by_id(&root.id).await.unwrap();

    assert_eq!(view.author.as_ref().unwrap().name, "ALICE");
    let child_ids: Vec<&str> = view.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(child_ids, vec![first.id.as_str(), second.id.as_str()]);
    let grandchild = &view.children[0].children[0];
    assert_eq!(grandchild.id, nested.id);
    assert_eq!(grandchild.author.as_ref().unwrap().id, "carol");
    assert!(grandchild.children.is_empty());
    assert_eq!(grandchild.children_count, 1);
}

#[tokio::test]
async fn test_toggle_like_adds_then_removes() {
    let (forum, client) = forum_with_users(&["alice", "bob"]).await;
    let thread = forum.create_thread(post("like me", "alice", None)).await.unwrap();

    let liked = forum.toggle_like(&thread.id, "bob").await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.likes_count, 1);

    let unliked = forum.toggle_like(&thread.id, "bob").await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.likes_count, 0);

    let stored = client.get_thread(&thread.id).await.unwrap().unwrap();
    assert!(stored.likes.is_empty());
}

#[tokio::test]
async fn test_toggle_like_counts_likes_written_by_others() {
    let (forum, client) = forum_with_users(&["alice", "bob"]).await;
    let thread = forum.create_thread(post("popular", "alice", None)).await.unwrap();

    forum.toggle_like(&thread.id, "bob").await.unwrap();
    client.add_like(&thread.id, "carol").await.unwrap();
    let state = forum.toggle_like(&thread.id, "dave").await.unwrap();

    assert!(state.liked);
    assert_eq!(state.likes_count, 3);
}

#[tokio::test]
async fn test_concurrent_likes_report_stored_count() {
    let (forum, client) = forum_with_users(&["alice"]).await;
    let thread = forum.create_thread(post("busy", "alice", None)).await.unwrap();
    let likers: Vec<String> = (0..10).map(|i| format!("user_{}", i)).collect();

    let states = join_all(likers.iter().map(|user_id| forum.toggle_like(&thread.id, user_id))).await;

    let stored = client.get_thread(&thread.id).await.unwrap().unwrap();
    assert_eq!(stored.likes.len(), 10);
    let highest = states
        .into_iter()
        .map(|state| state.unwrap().likes_count)
        .max()
        .unwrap();
    assert_eq!(highest, stored.likes.len());
}

#[tokio::test]
async fn test_delete_thread_removes_subtree_and_references() {
    let (forum, client) = forum_with_users(&["alice", "bob", "carol"]).await;
    forum.create_community(community("rust", "alice")).await.unwrap();
    let root = forum.create_thread(post("root", "alice", Some("rust"))).await.unwrap();
    let keep = forum.create_thread(post("keep", "alice", None)).await.unwrap();
    let reply = forum.add_comment_to_thread(&root.id, "reply", "bob").await.unwrap();
    let nested = forum.add_comment_to_thread(&reply.id, "nested", "carol").await.unwrap();

    let deleted = forum.delete_thread(&root.id).await.unwrap();

    assert_eq!(deleted.thread_ids.len(), 3);
    assert_eq!(deleted.thread_ids[0], root.id);
    assert_eq!(deleted.author_ids, vec!["alice", "bob", "carol"]);
    assert_eq!(deleted.community_ids, vec!["rust"]);
    for id in [&root.id, &reply.id, &nested.id] {
        assert!(client.get_thread(id).await.unwrap().is_none());
    }
    let alice = client.get_user("alice").await.unwrap().unwrap();
    assert_eq!(alice.threads, vec![keep.id]);
    let rust = client.get_community("rust").await.unwrap().unwrap();
    assert!(rust.threads.is_empty());
}

#[tokio::test]
async fn test_delete_reply_detaches_from_parent() {
    let (forum, client) = forum_with_users(&["alice", "bob"]).await;
    let root = forum.create_thread(post("root", "alice", None)).await.unwrap();
    let reply = forum.add_comment_to_thread(&root.id, "reply", "bob").await.unwrap();

    forum.delete_thread(&reply.id).await.unwrap();

    let root = client.get_thread(&root.id).await.unwrap().unwrap();
    assert!(root.children.is_empty());
}

#[tokio::test]
async fn test_delete_missing_thread() {
    let (forum, _) = forum_with_users(&[]).await;

    let err = forum.delete_thread("missing").await.unwrap_err();

    assert!(matches!(err, PersistError::ThreadNotFound(id) if id == "missing"));
}

#[tokio::test]
async fn test_fetch_all_child_threads_walks_every_level() {
    let (forum, _) = forum_with_users(&["alice"]).await;
    let root = forum.create_thread(post("root", "alice", None)).await.unwrap();
    let mut parent = root.id.clone();
    for depth in 0..5 {
        parent = forum
            .add_comment_to_thread(&parent, &format!("depth {}", depth), "alice")
            .await
            .unwrap()
            .id;
    }

    let descendants = forum.fetch_all_child_threads(&root.id).await.unwrap();

    assert_eq!(descendants.len(), 5);
    assert_eq!(descendants.last().unwrap().id, parent);
}

#[tokio::test]
async fn test_activity_lists_replies_from_others() {
    let (forum, _) = forum_with_users(&["alice", "bob"]).await;
    let root = forum.create_thread(post("root", "alice", None)).await.unwrap();
    forum.add_comment_to_thread(&root.id, "self reply", "alice").await.unwrap();
    let reply = forum.add_comment_to_thread(&root.id, "reply", "bob").await.unwrap();

    let activity = forum.get_activity("alice").await.unwrap();

    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].id, reply.id);
}

#[tokio::test]
async fn test_user_posts_are_newest_first() {
    let (forum, _) = forum_with_users(&["alice"]).await;
    let older = forum.create_thread(post("older", "alice", None)).await.unwrap();
    let newer = forum.create_thread(post("newer", "alice", None)).await.unwrap();

    let posts = forum.fetch_user_posts("alice").await.unwrap();

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
}

#[tokio::test]
async fn test_listings_agree_on_order_for_equal_timestamps() {
    let (forum, client) = forum_with_users(&["alice"]).await;
    forum.create_community(community("rust", "alice")).await.unwrap();

    let created_at = Utc::now();
    let mut expected = Vec::new();
    for text in ["first", "second", "third"] {
        let thread = client
            .create_thread(NewThread {
                created_at,
                ..NewThread::post(text, "alice", Some("rust".to_string()))
            })
            .await
            .unwrap();
        client.push_user_thread("alice", &thread.id).await.unwrap();
        client.push_community_thread("rust", &thread.id).await.unwrap();
        expected.push(thread.id);
    }
    expected.reverse();

    let feed: Vec<String> = forum
        .fetch_posts(Page::default())
        .await
        .unwrap()
        .posts
        .into_iter()
        .map(|p| p.id)
        .collect();
    let user_posts: Vec<String> = forum
        .fetch_user_posts("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    let community_posts: Vec<String> = forum
        .fetch_community_posts("rust")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(feed, expected);
    assert_eq!(user_posts, expected);
    assert_eq!(community_posts, expected);
}

#[tokio::test]
async fn test_community_membership() {
    let (forum, client) = forum_with_users(&["alice", "bob"]).await;

    let created = forum.create_community(community("rust", "alice")).await.unwrap();
    assert_eq!(created.members, vec!["alice"]);

    let joined = forum.join_community("rust", "bob").await.unwrap();
    assert!(joined.has_member("bob"));
    let rejoined = forum.join_community("rust", "bob").await.unwrap();
    assert_eq!(rejoined.members, vec!["alice", "bob"]);
    let bob = client.get_user("bob").await.unwrap().unwrap();
    assert_eq!(bob.communities, vec!["rust"]);

    let left = forum.leave_community("rust", "bob").await.unwrap();
    assert!(!left.has_member("bob"));
    let bob = client.get_user("bob").await.unwrap().unwrap();
    assert!(bob.communities.is_empty());

    let err = forum.join_community("missing", "bob").await.unwrap_err();
    assert!(matches!(err, PersistError::CommunityNotFound(_)));
}

#[tokio::test]
async fn test_fetch_communities_and_posts() {
    let (forum, _) = forum_with_users(&["alice"]).await;
    forum.create_community(community("one", "alice")).await.unwrap();
    forum.create_community(community("two", "alice")).await.unwrap();
    let thread = forum.create_thread(post("inside", "alice", Some("two"))).await.unwrap();

    let page = forum.fetch_communities(Page::new(1, 1)).await.unwrap();
    assert_eq!(page.communities.len(), 1);
    assert!(page.is_next);

    let posts = forum.fetch_community_posts("two").await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, thread.id);
    assert_eq!(posts[0].community.as_ref().unwrap().id, "two");
}

#[tokio::test]
async fn test_upsert_user_updates_profile() {
    let (forum, _) = forum_with_users(&["alice"]).await;
    let thread = forum.create_thread(post("hello", "alice", None)).await.unwrap();

    let updated = forum
        .upsert_user(UserProfile {
            id: "alice".to_string(),
            username: "Alice".to_string(),
            name: "Alice Liddell".to_string(),
            image: Some("https://example.com/a.png".to_string()),
            bio: None,
        })
        .await
        .unwrap();

    assert_eq!(updated.username, "alice");
    assert_eq!(updated.name, "Alice Liddell");
    assert!(updated.onboarded);
    assert_eq!(updated.threads, vec![thread.id]);
}
