use actix_web::{cookie::Cookie, http::header, http::StatusCode, test, web};
use feedback_board::{config, database::MemoryStore, http::controllers, App};
use serde_json::Value;
use std::sync::Arc;

macro_rules! init {
    () => {{
        let state = App::with_store(config::Server::for_tests(), Arc::new(MemoryStore::new()));
        test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(state))
                .configure(controllers::configure),
        )
        .await
    }};
}

/// Sends the request with the jar's session cookie and keeps
/// whatever session cookie comes back.
macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let mut req = $req;
        if let Some(cookie) = $jar.clone() {
            req = req.cookie(cookie);
        }
        let res = test::call_service(&$app, req.to_request()).await;
        if let Some(cookie) = res.response().cookies().find(|v| v.name() == "session") {
            $jar = Some(cookie.into_owned());
        }
        res
    }};
}

fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn register_form<'a>(username: &'a str, email: &'a str) -> [(&'static str, &'a str); 5] {
    [
        ("username", username),
        ("password", "pw123"),
        ("email", email),
        ("first_name", "First"),
        ("last_name", "Last"),
    ]
}

fn notices(body: &Value) -> Vec<&str> {
    body["notices"]
        .as_array()
        .map(|v| v.iter().filter_map(|n| n["message"].as_str()).collect())
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_register_and_view_own_page() {
    let app = init!();
    let mut alice: Option<Cookie<'static>> = None;

    let res = send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "a@x.com"))
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/alice");

    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["view"], "user");
    assert_eq!(
        notices(&body),
        vec!["Welcome! Successfully Created Your Account!"]
    );
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert_eq!(body["data"]["user"]["email"], "a@x.com");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert_eq!(body["data"]["feedback"], Value::Array(Vec::new()));

    // notices are shown once
    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    let body: Value = test::read_body_json(res).await;
    assert!(notices(&body).is_empty());

    let res = send!(app, alice, test::TestRequest::get().uri("/"));
    assert_eq!(location(&res), "/users/alice");
}

#[actix_web::test]
async fn test_register_duplicates() {
    let app = init!();
    let mut jar: Option<Cookie<'static>> = None;

    let res = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "a@x.com"))
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let mut other: Option<Cookie<'static>> = None;
    let res = send!(
        app,
        other,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "b@x.com"))
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["view"], "register");
    assert_eq!(
        body["errors"]["username"][0],
        "Username taken. Please pick another"
    );
    assert_eq!(body["data"]["email"], "b@x.com");
    assert!(body["data"].get("password").is_none());

    let res = send!(
        app,
        other,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("bob", "a@x.com"))
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["email"].is_array());

    // neither failed attempt started a session
    let res = send!(app, other, test::TestRequest::get().uri("/"));
    assert_eq!(location(&res), "/register");
}

#[actix_web::test]
async fn test_register_validation() {
    let app = init!();
    let mut jar: Option<Cookie<'static>> = None;

    let res = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/register")
            .set_form([("username", "not valid"), ("email", "nope")])
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(res).await;
    for field in ["username", "password", "email", "first_name", "last_name"] {
        assert!(body["errors"][field].is_array(), "{field} has no errors");
    }
}

#[actix_web::test]
async fn test_login_logout() {
    let app = init!();
    let mut jar: Option<Cookie<'static>> = None;
    send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "a@x.com"))
    );

    let res = send!(app, jar, test::TestRequest::post().uri("/logout"));
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let res = send!(app, jar, test::TestRequest::get().uri("/login"));
    let body: Value = test::read_body_json(res).await;
    assert!(notices(&body).contains(&"Bye!"));

    // logging out twice is fine
    let res = send!(app, jar, test::TestRequest::post().uri("/logout"));
    assert_eq!(location(&res), "/login");

    let mut messages = Vec::new();
    for (username, password) in [("alice", "wrong"), ("nobody", "pw123")] {
        let res = send!(
            app,
            jar,
            test::TestRequest::post()
                .uri("/login")
                .set_form([("username", username), ("password", password)])
        );
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        messages.push(body["errors"].clone());
    }
    assert_eq!(messages[0], messages[1]);
    assert_eq!(messages[0]["username"][0], "Invalid username/password.");

    let res = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "pw123")])
    );
    assert_eq!(location(&res), "/users/alice");

    let res = send!(app, jar, test::TestRequest::get().uri("/secret"));
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["view"], "secret");
    assert_eq!(notices(&body), vec!["Welcome back, alice!"]);
}

#[actix_web::test]
async fn test_anonymous_is_sent_to_login() {
    let app = init!();
    let mut jar: Option<Cookie<'static>> = None;

    for uri in ["/secret", "/users/alice", "/users/alice/feedback/add"] {
        let res = send!(app, jar, test::TestRequest::get().uri(uri));
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&res), "/login", "{uri}");
    }

    let res = send!(app, jar, test::TestRequest::get().uri("/login"));
    let body: Value = test::read_body_json(res).await;
    assert!(notices(&body).contains(&"Please log in first!"));

    let res = send!(app, jar, test::TestRequest::get().uri("/"));
    assert_eq!(location(&res), "/register");
}

#[actix_web::test]
async fn test_tampered_cookie_is_anonymous() {
    let app = init!();
    let mut jar = Some(Cookie::new("session", "definitely.not.valid"));

    let res = send!(app, jar, test::TestRequest::get().uri("/"));
    assert_eq!(location(&res), "/register");
}

#[actix_web::test]
async fn test_feedback_ownership() {
    let app = init!();
    let mut alice: Option<Cookie<'static>> = None;
    let mut bob: Option<Cookie<'static>> = None;

    send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "a@x.com"))
    );
    send!(
        app,
        bob,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("bob", "b@x.com"))
    );

    // alice cannot look at bob's page
    let res = send!(app, alice, test::TestRequest::get().uri("/users/bob"));
    assert_eq!(location(&res), "/users/alice");
    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    let body: Value = test::read_body_json(res).await;
    assert!(notices(&body).contains(&"You don't have permission to do that."));

    let res = send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/users/alice/feedback/add")
            .set_form([("title", "T"), ("content", "C")])
    );
    assert_eq!(location(&res), "/users/alice");

    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(notices(&body), vec!["Feedback Created!"]);
    assert_eq!(body["data"]["feedback"][0]["title"], "T");
    let id = body["data"]["feedback"][0]["id"].as_u64().unwrap_or_default();
    assert_ne!(id, 0);

    // bob is sent back to his own add page
    let res = send!(
        app,
        bob,
        test::TestRequest::post()
            .uri("/users/alice/feedback/add")
            .set_form([("title", "B"), ("content", "C")])
    );
    assert_eq!(location(&res), "/users/bob/feedback/add");

    let res = send!(
        app,
        bob,
        test::TestRequest::post().uri(&format!("/feedback/{id}/delete"))
    );
    assert_eq!(location(&res), "/users/bob");

    // the denial happens before the form is validated
    let res = send!(
        app,
        bob,
        test::TestRequest::post()
            .uri(&format!("/feedback/{id}/update"))
            .set_form([("title", ""), ("content", "")])
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/bob");

    let res = send!(
        app,
        alice,
        test::TestRequest::get().uri(&format!("/feedback/{id}/update"))
    );
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["title"], "T");
    assert_eq!(body["data"]["content"], "C");

    let res = send!(
        app,
        alice,
        test::TestRequest::post()
            .uri(&format!("/feedback/{id}/update"))
            .set_form([("title", "T2"), ("content", "C")])
    );
    assert_eq!(location(&res), "/users/alice");

    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(notices(&body), vec!["Feedback is updated"]);
    let feedback = &body["data"]["feedback"];
    assert_eq!(feedback.as_array().map(Vec::len), Some(1));
    assert_eq!(feedback[0]["title"], "T2");
    assert_eq!(feedback[0]["content"], "C");
    assert_eq!(feedback[0]["id"], id);

    let res = send!(
        app,
        alice,
        test::TestRequest::post()
            .uri(&format!("/feedback/{id}/update"))
            .set_form([("title", "x".repeat(101).as_str()), ("content", "C")])
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // deleting alice takes her feedback with her
    let res = send!(
        app,
        alice,
        test::TestRequest::post().uri("/users/alice/delete")
    );
    assert_eq!(location(&res), "/");

    let res = send!(app, alice, test::TestRequest::get().uri("/"));
    assert_eq!(location(&res), "/register");

    let res = send!(
        app,
        bob,
        test::TestRequest::get().uri(&format!("/feedback/{id}/update"))
    );
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_feedback() {
    let app = init!();
    let mut alice: Option<Cookie<'static>> = None;
    send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "a@x.com"))
    );
    send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/users/alice/feedback/add")
            .set_form([("title", "T"), ("content", "C")])
    );

    let res = send!(app, alice, test::TestRequest::post().uri("/feedback/1/delete"));
    assert_eq!(location(&res), "/users/alice");

    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    let body: Value = test::read_body_json(res).await;
    assert!(notices(&body).contains(&"Feedback deleted"));
    assert_eq!(body["data"]["feedback"], Value::Array(Vec::new()));

    let res = send!(app, alice, test::TestRequest::post().uri("/feedback/1/delete"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_feedback_ids() {
    let app = init!();
    let mut jar: Option<Cookie<'static>> = None;

    for uri in ["/feedback/0/update", "/feedback/abc/update", "/feedback/42/update"] {
        let res = send!(app, jar, test::TestRequest::get().uri(uri));
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "not_found");
    }
}

#[actix_web::test]
async fn test_posts_without_a_form() {
    let app = init!();
    let mut alice: Option<Cookie<'static>> = None;
    let mut bob: Option<Cookie<'static>> = None;
    let mut anonymous: Option<Cookie<'static>> = None;

    // an empty body fails validation like an empty form does
    for (uri, fields) in [
        ("/register", &["username", "password", "email"][..]),
        ("/login", &["username", "password"][..]),
    ] {
        let res = send!(app, anonymous, test::TestRequest::post().uri(uri));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = test::read_body_json(res).await;
        for field in fields {
            assert!(body["errors"][field].is_array(), "{uri}: {field} has no errors");
        }
    }

    send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("alice", "a@x.com"))
    );
    send!(
        app,
        bob,
        test::TestRequest::post()
            .uri("/register")
            .set_form(register_form("bob", "b@x.com"))
    );
    send!(
        app,
        alice,
        test::TestRequest::post()
            .uri("/users/alice/feedback/add")
            .set_form([("title", "T"), ("content", "C")])
    );

    for uri in [
        "/users/alice/feedback/add",
        "/users/alice/delete",
        "/feedback/1/update",
        "/feedback/1/delete",
    ] {
        let res = send!(app, anonymous, test::TestRequest::post().uri(uri));
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&res), "/login", "{uri}");
    }
    let res = send!(app, anonymous, test::TestRequest::get().uri("/login"));
    let body: Value = test::read_body_json(res).await;
    assert!(notices(&body).contains(&"Please log in first!"));

    let res = send!(
        app,
        bob,
        test::TestRequest::post().uri("/users/alice/feedback/add")
    );
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/bob/feedback/add");

    let res = send!(app, bob, test::TestRequest::post().uri("/feedback/1/update"));
    assert_eq!(location(&res), "/users/bob");

    // the owner gets the form back with errors
    let res = send!(
        app,
        alice,
        test::TestRequest::post().uri("/users/alice/feedback/add")
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"].is_array());

    // nothing was changed along the way
    let res = send!(app, alice, test::TestRequest::get().uri("/users/alice"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["feedback"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["feedback"][0]["title"], "T");
}

#[actix_web::test]
async fn test_dot_usernames_are_rejected() {
    let app = init!();
    let mut jar: Option<Cookie<'static>> = None;

    for username in [".", ".."] {
        let res = send!(
            app,
            jar,
            test::TestRequest::post()
                .uri("/register")
                .set_form(register_form(username, "dots@x.com"))
        );
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{username}");
        let body: Value = test::read_body_json(res).await;
        assert!(body["errors"]["username"].is_array(), "{username}");
    }
}
