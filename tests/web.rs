//! End-to-end tests against a live Postgres server.
//!
//! Every test connects with `DATABASE_URL`, creates its own
//! throwaway database and runs the embedded migrations there, so
//! tests never see each other's rows. When `DATABASE_URL` is not
//! set the whole suite quietly skips.
#![allow(clippy::unwrap_used)]

use actix_web::{middleware::ErrorHandlers, web};
use sqlx::Connection as _;
use std::num::{NonZeroU32, NonZeroU64};

use murmur::{
    config,
    http::Jwt,
    schema::{Group, InsertGroup, InsertPost, Post, PostFilter, User, ANONYMOUS},
    types::form::PostForm,
    types::id::{marker::PostMarker, Id},
    util::Sensitive,
    App,
};

struct TestApp {
    app: App,
}

impl TestApp {
    async fn spawn() -> Option<Self> {
        let Ok(admin_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL is not set, skipping");
            return None;
        };

        let db_name = format!(
            "_murmur_test_{}",
            random_string::generate(12, "abcdefghijklmnopqrstuvwxyz")
        );

        let mut admin = sqlx::PgConnection::connect(&admin_url).await.unwrap();
        sqlx::query(&format!(r#"CREATE DATABASE "{db_name}""#))
            .execute(&mut admin)
            .await
            .unwrap();
        admin.close().await.unwrap();

        let mut url = url::Url::parse(&admin_url).unwrap();
        url.set_path(&db_name);

        let config = config::Server {
            db: config::Database {
                primary: config::DbPoolConfig {
                    readonly: false,
                    min_idle: None,
                    pool_size: NonZeroU32::new(5).unwrap(),
                    url: Sensitive::new(url.to_string()),
                },
                replica: None,
                enforce_tls: false,
                timeout_secs: NonZeroU64::new(5).unwrap(),
            },
            jwt_secret: Sensitive::new("testing-session-secret".to_string()),
            posts_per_page: NonZeroU32::new(10).unwrap(),
            login_url: "/auth/login/".to_string(),
            ip: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0,
        };

        let app = App::new(config).await.unwrap();
        app.run_pending_migrations().await.unwrap();

        Some(Self { app })
    }

    async fn seed_user(&self, name: &str) -> User {
        let mut conn = self.app.db_write().await.unwrap();
        User::create(&mut conn, name).await.unwrap()
    }

    async fn seed_group(&self, slug: &str) -> Group {
        let mut conn = self.app.db_write().await.unwrap();
        InsertGroup {
            title: Some("Test group"),
            description: "A group made by the test suite",
            slug,
        }
        .insert(&mut conn)
        .await
        .unwrap()
    }

    async fn seed_post(&self, author: &User, group: Option<&Group>, text: &str) -> Post {
        let mut conn = self.app.db_write().await.unwrap();
        InsertPost {
            author_id: author.id,
            text,
            group_id: group.map(|g| g.id),
        }
        .insert(&mut conn)
        .await
        .unwrap()
    }

    async fn find_post(&self, id: Id<PostMarker>) -> Option<Post> {
        let mut conn = self.app.db_write().await.unwrap();
        Post::find(&mut conn, id).await.unwrap()
    }

    async fn posts_by(&self, author: &User) -> u64 {
        let mut conn = self.app.db_write().await.unwrap();
        Post::count(&mut conn, PostFilter::Author(author.id))
            .await
            .unwrap()
    }

    fn bearer(&self, user: &User) -> (&'static str, String) {
        let token = Jwt::encode(user.id, self.app.config.jwt_secret.as_str()).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }
}

/// Builds the same service tree the server binary runs.
macro_rules! service {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new($ctx.app.clone()))
                .app_data(
                    web::PathConfig::default()
                        .error_handler(|err, _req| actix_web::error::ErrorNotFound(err)),
                )
                .wrap(ErrorHandlers::new().default_handler(murmur::http::util::handle_actix_web_error))
                .configure(murmur::http::controllers::configure),
        )
        .await
    };
}

macro_rules! get {
    ($srv:expr, $uri:expr) => {
        actix_web::test::call_service(
            &$srv,
            actix_web::test::TestRequest::get().uri($uri).to_request(),
        )
        .await
    };
}

async fn body_of(res: actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    let bytes = actix_web::test::read_body(res).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn count_posts(body: &str) -> usize {
    body.matches(r#"<article class="post""#).count()
}

fn location_of(res: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> &str {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn index_paginates_posts() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("leo").await;
    for n in 0..13 {
        ctx.seed_post(&author, None, &format!("post #{n}")).await;
    }

    let srv = service!(ctx);

    let res = get!(srv, "/");
    assert!(res.status().is_success());
    assert_eq!(count_posts(&body_of(res).await), 10);

    let res = get!(srv, "/?page=2");
    assert!(res.status().is_success());
    assert_eq!(count_posts(&body_of(res).await), 3);

    // out-of-range and garbage page values must not break the page
    let res = get!(srv, "/?page=999");
    assert!(res.status().is_success());
    assert_eq!(count_posts(&body_of(res).await), 3);

    let res = get!(srv, "/?page=banana");
    assert!(res.status().is_success());
    assert_eq!(count_posts(&body_of(res).await), 10);
}

#[tokio::test]
async fn index_renders_newest_posts_first() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("nina").await;
    ctx.seed_post(&author, None, "the older post").await;
    ctx.seed_post(&author, None, "the newer post").await;

    let srv = service!(ctx);
    let body = body_of(get!(srv, "/")).await;

    let newer = body.find("the newer post").unwrap();
    let older = body.find("the older post").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn group_page_lists_only_its_posts() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("mark").await;
    let cats = ctx.seed_group("cats").await;
    let dogs = ctx.seed_group("dogs").await;

    for n in 0..13 {
        ctx.seed_post(&author, Some(&cats), &format!("cat #{n}")).await;
    }
    ctx.seed_post(&author, Some(&dogs), "a dog").await;
    ctx.seed_post(&author, None, "no group at all").await;

    let srv = service!(ctx);

    let res = get!(srv, "/group/cats/");
    assert!(res.status().is_success());
    let body = body_of(res).await;
    assert_eq!(count_posts(&body), 10);
    assert!(!body.contains("a dog"));
    assert!(!body.contains("no group at all"));

    // the filtered listing paginates like the front page does
    let res = get!(srv, "/group/cats/?page=2");
    assert!(res.status().is_success());
    let body = body_of(res).await;
    assert_eq!(count_posts(&body), 3);
    assert!(!body.contains("a dog"));

    // a group with no posts still renders a page, whatever the
    // requested page number is
    let empty = ctx.seed_group("birds").await;
    let res = get!(srv, &format!("/group/{}/", empty.slug));
    assert!(res.status().is_success());
    assert_eq!(count_posts(&body_of(res).await), 0);

    let res = get!(srv, &format!("/group/{}/?page=5", empty.slug));
    assert!(res.status().is_success());
    assert_eq!(count_posts(&body_of(res).await), 0);

    let res = get!(srv, "/group/does-not-exist/");
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn profile_page_lists_the_authors_posts() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let alice = ctx.seed_user("alice").await;
    let bob = ctx.seed_user("bob").await;

    for n in 0..13 {
        ctx.seed_post(&alice, None, &format!("alice #{n}")).await;
    }
    ctx.seed_post(&bob, None, "by bob").await;

    let srv = service!(ctx);

    let res = get!(srv, "/profile/alice/");
    assert!(res.status().is_success());
    let body = body_of(res).await;
    assert_eq!(count_posts(&body), 10);
    assert!(!body.contains("by bob"));

    let res = get!(srv, "/profile/alice/?page=2");
    assert!(res.status().is_success());
    let body = body_of(res).await;
    assert_eq!(count_posts(&body), 3);
    assert!(!body.contains("by bob"));

    let res = get!(srv, "/profile/nobody/");
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn post_detail_shows_the_full_post() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("carol").await;
    let group = ctx.seed_group("thoughts").await;
    let post = ctx
        .seed_post(&author, Some(&group), "a rather insightful observation")
        .await;

    let srv = service!(ctx);

    let res = get!(srv, &format!("/posts/{}/", post.id));
    assert!(res.status().is_success());
    let body = body_of(res).await;
    assert!(body.contains("a rather insightful observation"));
    assert!(body.contains("carol"));
    assert!(body.contains("thoughts"));

    // reading is idempotent
    let again = body_of(get!(srv, &format!("/posts/{}/", post.id))).await;
    assert_eq!(body, again);

    let res = get!(srv, "/posts/999999/");
    assert_eq!(res.status(), 404);

    // a post id that is not a number is a missing page
    let res = get!(srv, "/posts/banana/");
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn create_requires_a_logged_in_user() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let srv = service!(ctx);

    let res = get!(srv, "/create/");
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), "/auth/login/");

    let req = actix_web::test::TestRequest::post()
        .uri("/create/")
        .set_form(PostForm {
            text: "sneaky".into(),
            group: None,
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), "/auth/login/");
}

#[tokio::test]
async fn create_persists_the_post() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("dave").await;
    let group = ctx.seed_group("news").await;
    let srv = service!(ctx);

    let req = actix_web::test::TestRequest::post()
        .uri("/create/")
        .insert_header(ctx.bearer(&author))
        .set_form(PostForm {
            text: "fresh off the press".into(),
            group: Some(group.slug.clone()),
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), "/profile/dave/");

    assert_eq!(ctx.posts_by(&author).await, 1);

    let mut conn = ctx.app.db_write().await.unwrap();
    let posts = Post::list(&mut conn, PostFilter::Author(author.id), 10, 0)
        .await
        .unwrap();
    assert_eq!(posts[0].text, "fresh off the press");
    assert_eq!(posts[0].group_slug.as_deref(), Some("news"));
}

#[tokio::test]
async fn create_rejects_blank_text() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("erin").await;
    let srv = service!(ctx);

    let req = actix_web::test::TestRequest::post()
        .uri("/create/")
        .insert_header(ctx.bearer(&author))
        .set_form(PostForm {
            text: "   ".into(),
            group: None,
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;

    // the form is re-rendered with a message, nothing is stored
    assert!(res.status().is_success());
    assert!(body_of(res).await.contains("Enter the post text."));
    assert_eq!(ctx.posts_by(&author).await, 0);
}

#[tokio::test]
async fn create_rejects_an_unknown_group() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("fred").await;
    let srv = service!(ctx);

    let req = actix_web::test::TestRequest::post()
        .uri("/create/")
        .insert_header(ctx.bearer(&author))
        .set_form(PostForm {
            text: "a fine text".into(),
            group: Some("no-such-group".into()),
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;

    assert!(res.status().is_success());
    assert!(body_of(res).await.contains("Select a valid group."));
    assert_eq!(ctx.posts_by(&author).await, 0);
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("gwen").await;
    let intruder = ctx.seed_user("hank").await;
    let post = ctx.seed_post(&author, None, "original words").await;
    let srv = service!(ctx);

    let req = actix_web::test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(ctx.bearer(&intruder))
        .set_form(PostForm {
            text: "defaced".into(),
            group: None,
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;

    // quietly bounced back to the post, nothing changed
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), format!("/posts/{}/", post.id));
    assert_eq!(ctx.find_post(post.id).await.unwrap().text, "original words");

    // anonymous visitors go to the login page instead
    let res = get!(srv, &format!("/posts/{}/edit/", post.id));
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), "/auth/login/");

    // submitting without a session is bounced the same way
    let req = actix_web::test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .set_form(PostForm {
            text: "still defaced".into(),
            group: None,
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), "/auth/login/");
    assert_eq!(ctx.find_post(post.id).await.unwrap().text, "original words");
}

#[tokio::test]
async fn editing_rewrites_text_and_group_only() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("iris").await;
    let group = ctx.seed_group("updates").await;
    let post = ctx.seed_post(&author, None, "first draft").await;
    let srv = service!(ctx);

    let req = actix_web::test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(ctx.bearer(&author))
        .set_form(PostForm {
            text: "second draft".into(),
            group: Some(group.slug.clone()),
        })
        .to_request();
    let res = actix_web::test::call_service(&srv, req).await;
    assert_eq!(res.status(), 302);
    assert_eq!(location_of(&res), format!("/posts/{}/", post.id));

    let edited = ctx.find_post(post.id).await.unwrap();
    assert_eq!(edited.text, "second draft");
    assert_eq!(edited.group_id, Some(group.id));
    assert_eq!(edited.author_id, post.author_id);
    assert_eq!(edited.pub_date, post.pub_date);
}

#[tokio::test]
async fn deleting_a_group_keeps_its_posts() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("jack").await;
    let group = ctx.seed_group("doomed").await;
    let post = ctx.seed_post(&author, Some(&group), "survivor").await;

    let mut conn = ctx.app.db_write().await.unwrap();
    Group::delete(&mut conn, group.id).await.unwrap();
    drop(conn);

    let post = ctx.find_post(post.id).await.unwrap();
    assert_eq!(post.group_id, None);
    assert_eq!(post.text, "survivor");
}

#[tokio::test]
async fn deleting_a_user_hands_posts_to_anonymous() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let author = ctx.seed_user("kate").await;
    let post = ctx.seed_post(&author, None, "orphan-to-be").await;

    let mut conn = ctx.app.db_write().await.unwrap();
    User::delete(&mut conn, author.id).await.unwrap();

    let anonymous = User::by_name(&mut conn, ANONYMOUS)
        .await
        .unwrap()
        .unwrap();
    drop(conn);

    let post = ctx.find_post(post.id).await.unwrap();
    assert_eq!(post.author_id, anonymous.id);

    // the sentinel itself cannot be deleted
    let mut conn = ctx.app.db_write().await.unwrap();
    User::delete(&mut conn, anonymous.id).await.unwrap();
    assert!(User::by_id(&mut conn, anonymous.id).await.unwrap().is_some());
}

#[tokio::test]
async fn unknown_routes_render_the_not_found_page() {
    let Some(ctx) = TestApp::spawn().await else {
        return;
    };
    let srv = service!(ctx);

    let res = get!(srv, "/definitely/not/a/page/");
    assert_eq!(res.status(), 404);
    assert!(body_of(res).await.contains("Page not found"));
}
