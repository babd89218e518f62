/// End-to-end tests driving the router in-process over an in-memory store
///
/// Every test builds its own store, so they run in parallel without setup.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let (status, body) = ctx.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new();

    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::Service;

        ctx.app
            .clone()
            .call(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap()
    };

    assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new();

    let (status, body) = ctx.request(Method::GET, "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = ctx.get("/v1/folders", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;

    let (status, _) = ctx.get("/v1/users/me", &alice.refresh_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_refresh() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice@Example.com").await;

    let (status, me) = ctx.get("/v1/users/me", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");
    assert!(me.get("password_hash").is_none());

    let (status, login) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user_id"], alice.id.to_string());
    assert_eq!(login["token_type"], "Bearer");
    assert_eq!(login["expires_in"], ctx.config.jwt.access_ttl_seconds);

    let (status, _) = ctx
        .request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Wrong4ever" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, refreshed) = ctx
        .request(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": alice.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = refreshed["access_token"].as_str().unwrap();
    let (status, _) = ctx.get("/v1/users/me", token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "ALICE@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");

    let (status, body) = ctx
        .request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "email": "bob@example.com", "password": "alllowercase" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "password");
}

#[tokio::test]
async fn test_work_scenario() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let bob = ctx.register("bob@example.com").await;
    let carol = ctx.register("carol@example.com").await;

    let work = ctx.create_folder(&alice, "Work").await;

    let (status, members) = ctx
        .get(&format!("/v1/folders/{}/members", work), &alice.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(members[0]["user_id"], alice.id.to_string());

    ctx.add_member(&alice, work, &bob, "editor").await;

    let (status, created) = ctx
        .post(
            &format!("/v1/folders/{}/tasks", work),
            &bob.token,
            json!({
                "title": "Weekly report",
                "due": "2024-03-01T09:00:00Z",
                "repeat_type": "weekly"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", created);
    assert_eq!(created["message"], "Task Created");
    assert_eq!(created["task"]["folder_id"], work.to_string());
    assert_eq!(created["task"]["user_id"], bob.id.to_string());
    assert_eq!(created["task"]["completed"], "false");
    assert_eq!(created["task"]["repeat_amount"], 1);

    let task_id = created["task"]["id"].as_str().unwrap().to_string();

    let (status, updated) = ctx
        .put(
            &format!("/v1/tasks/{}", task_id),
            &bob.token,
            json!({ "completed": "true" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["message"], "Task Updated");
    assert_eq!(updated["task"]["completed"], "false");
    assert_eq!(updated["task"]["due"], "2024-03-08T09:00:00Z");

    // Alice sees the task through her folder
    let (status, _) = ctx.get(&format!("/v1/tasks/{}", task_id), &alice.token).await;
    assert_eq!(status, StatusCode::OK);

    // Carol is not a member; the task does not exist for her
    let (status, body) = ctx.get(&format!("/v1/tasks/{}", task_id), &carol.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let (status, _) = ctx
        .get(&format!("/v1/folders/{}/tasks", work), &carol.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, tasks) = ctx.get("/v1/tasks", &carol.token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(tasks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_updates_leave_task_unchanged() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;

    let (_, created) = ctx
        .post("/v1/tasks", &alice.token, json!({ "title": "Groceries", "due": "2024-05-01T18:00:00Z" }))
        .await;
    let uri = format!("/v1/tasks/{}", created["task"]["id"].as_str().unwrap());

    let (status, body) = ctx.put(&uri, &alice.token, json!({ "title": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title cannot be null");

    let (status, body) = ctx
        .put(&uri, &alice.token, json!({ "repeat_type": "daily", "due": null, "description": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "due date is required to repeat tasks");

    let (status, body) = ctx.put(&uri, &alice.token, json!({ "priority": "urgent" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (_, task) = ctx.get(&uri, &alice.token).await;
    assert_eq!(task["title"], "Groceries");
    assert_eq!(task["description"], serde_json::Value::Null);
    assert_eq!(task["repeat_type"], "never");
    assert_eq!(task["due"], "2024-05-01T18:00:00Z");

    // Explicit null clears a nullable field
    let (status, updated) = ctx.put(&uri, &alice.token, json!({ "due": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["task"]["due"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;

    let (status, body) = ctx.post("/v1/tasks", &alice.token, json!({ "title": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title required");

    let (status, body) = ctx
        .post("/v1/tasks", &alice.token, json!({ "title": "Gym", "repeat_type": "daily" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "due date is required to repeat tasks");

    let (status, _) = ctx
        .post("/v1/tasks", &alice.token, json!({ "title": "Gym", "repeat_type": "daily",
            "due": "2024-01-01T07:00:00Z", "repeat_amount": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewer_reads_but_cannot_write() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let dave = ctx.register("dave@example.com").await;

    let folder = ctx.create_folder(&alice, "Home").await;
    ctx.add_member(&alice, folder, &dave, "viewer").await;

    let (_, created) = ctx
        .post(&format!("/v1/folders/{}/tasks", folder), &alice.token, json!({ "title": "Fix sink" }))
        .await;
    let uri = format!("/v1/tasks/{}", created["task"]["id"].as_str().unwrap());

    let (status, _) = ctx.get(&uri, &dave.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.put(&uri, &dave.token, json!({ "title": "Ignore sink" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = ctx.delete(&uri, &dave.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post(&format!("/v1/folders/{}/tasks", folder), &dave.token, json!({ "title": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .get(&format!("/v1/folders/{}/members", folder), &dave.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_membership_rules() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let bob = ctx.register("bob@example.com").await;

    let folder = ctx.create_folder(&alice, "Work").await;
    let members = format!("/v1/folders/{}/members", folder);

    let (status, _) = ctx
        .post(&members, &alice.token, json!({ "user_id": bob.id, "role": "owner" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.add_member(&alice, folder, &bob, "viewer").await;

    let (status, body) = ctx
        .post(&members, &alice.token, json!({ "user_id": bob.id, "role": "editor" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User is already a member of this folder");

    let (status, _) = ctx
        .post(&members, &alice.token, json!({ "user_id": uuid::Uuid::new_v4(), "role": "editor" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let bob_uri = format!("{}/{}", members, bob.id);
    let (status, changed) = ctx.put(&bob_uri, &alice.token, json!({ "role": "editor" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(changed["member"]["role"], "editor");

    let (status, _) = ctx.put(&bob_uri, &alice.token, json!({ "role": "owner" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let alice_uri = format!("{}/{}", members, alice.id);
    let (status, _) = ctx.put(&alice_uri, &alice.token, json!({ "role": "viewer" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = ctx.delete(&alice_uri, &alice.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "folder owner cannot be removed");

    // Editors cannot manage membership
    let (status, _) = ctx.delete(&bob_uri, &bob.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.delete(&bob_uri, &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member Removed");

    let (status, _) = ctx.delete(&bob_uri, &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get(&format!("/v1/folders/{}", folder), &bob.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_folder_lifecycle() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let bob = ctx.register("bob@example.com").await;

    let folder = ctx.create_folder(&alice, "Work").await;
    ctx.add_member(&alice, folder, &bob, "editor").await;
    let uri = format!("/v1/folders/{}", folder);

    let (status, _) = ctx.post("/v1/folders", &alice.token, json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.patch(&uri, &bob.token, json!({ "name": "Mine" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, renamed) = ctx.patch(&uri, &alice.token, json!({ "name": " Office " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["folder"]["name"], "Office");

    let (_, folders) = ctx.get("/v1/folders", &bob.token).await;
    assert_eq!(folders.as_array().unwrap().len(), 1);
    assert_eq!(folders[0]["name"], "Office");

    let (_, created) = ctx
        .post(&format!("{}/tasks", uri), &bob.token, json!({ "title": "Plan" }))
        .await;
    let task_uri = format!("/v1/tasks/{}", created["task"]["id"].as_str().unwrap());

    let (status, _) = ctx.delete(&uri, &bob.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.delete(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Folder Deleted");

    let (status, _) = ctx.get(&task_uri, &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_search_filters() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let bob = ctx.register("bob@example.com").await;

    for body in [
        json!({ "title": "Quarterly REPORT", "priority": "high", "due": "2024-03-08T23:30:00Z" }),
        json!({ "title": "Water plants", "description": "balcony", "completed": "true" }),
        json!({ "title": "Report expenses_2024", "priority": "low", "due": "2024-03-09T00:00:00Z" }),
    ] {
        let (status, _) = ctx.post("/v1/tasks", &alice.token, body).await;
        assert_eq!(status, StatusCode::OK);
    }
    ctx.post("/v1/tasks", &bob.token, json!({ "title": "Bob's report" })).await;

    let titles = |tasks: &serde_json::Value| -> Vec<String> {
        tasks
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, all) = ctx.get("/v1/tasks", &alice.token).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, found) = ctx.get("/v1/tasks?title=report", &alice.token).await;
    let mut found = titles(&found);
    found.sort();
    assert_eq!(found, vec!["Quarterly REPORT", "Report expenses_2024"]);

    let (_, found) = ctx.get("/v1/tasks?title=report&priority=low", &alice.token).await;
    assert_eq!(titles(&found), vec!["Report expenses_2024"]);

    let (_, found) = ctx.get("/v1/tasks?title=s_2", &alice.token).await;
    assert_eq!(titles(&found), vec!["Report expenses_2024"]);

    let (_, found) = ctx.get("/v1/tasks?due=2024-03-08", &alice.token).await;
    assert_eq!(titles(&found), vec!["Quarterly REPORT"]);

    let (_, found) = ctx.get("/v1/tasks?completed=true&description=BALC", &alice.token).await;
    assert_eq!(titles(&found), vec!["Water plants"]);

    let (_, found) = ctx.get("/v1/tasks?limit=2", &alice.token).await;
    assert_eq!(found.as_array().unwrap().len(), 2);

    let (_, found) = ctx.get("/v1/tasks?limit=2&offset=2", &alice.token).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, _) = ctx.get("/v1/tasks?repeat_type=hourly", &alice.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.get("/v1/tasks?due=08-03-2024", &alice.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_personal_task_is_private() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let bob = ctx.register("bob@example.com").await;

    let (_, created) = ctx.post("/v1/tasks", &alice.token, json!({ "title": "Diary" })).await;
    assert_eq!(created["task"]["folder_id"], serde_json::Value::Null);
    let uri = format!("/v1/tasks/{}", created["task"]["id"].as_str().unwrap());

    let (status, _) = ctx.put(&uri, &bob.token, json!({ "title": "Mine now" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.delete(&uri, &bob.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx.delete(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task Deleted");

    let (status, _) = ctx.get(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_removed_member_cannot_find_own_folder_task() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice@example.com").await;
    let bob = ctx.register("bob@example.com").await;

    let folder = ctx.create_folder(&alice, "Work").await;
    ctx.add_member(&alice, folder, &bob, "editor").await;

    let (status, created) = ctx
        .post(&format!("/v1/folders/{}/tasks", folder), &bob.token, json!({ "title": "Secret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let task_uri = format!("/v1/tasks/{}", created["task"]["id"].as_str().unwrap());

    let (_, listed) = ctx.get("/v1/tasks?title=secret", &bob.token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = ctx
        .delete(&format!("/v1/folders/{}/members/{}", folder, bob.id), &alice.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.get(&task_uri, &bob.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = ctx.get("/v1/tasks", &bob.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, listed) = ctx.get("/v1/tasks?title=secret", &bob.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, _) = ctx
        .get(&format!("/v1/folders/{}/tasks", folder), &bob.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listed) = ctx.get("/v1/tasks?title=secret", &alice.token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
