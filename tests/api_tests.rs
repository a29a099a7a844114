//! API integration tests
//!
//! These run against a live server with a clean database:
//! `cargo test -- --ignored`

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};

use biblib_server::models::user::UserClaims;

const BASE_URL: &str = "http://localhost:8080/api/v1";
const JWT_SECRET: &str = "change-this-secret-in-production";

/// Mint a gateway-style bearer token for a test user
fn token_for(user_id: i32, email: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = UserClaims {
        sub: user_id.to_string(),
        user_id,
        email: email.to_string(),
        iat: now,
        exp: now + 3600,
    };
    claims.create_token(JWT_SECRET).expect("Failed to mint token")
}

async fn create_library(client: &Client, token: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

/// Any authenticated request makes the user known to the service; a plain
/// listing is the cheapest one
async fn touch(client: &Client, token: &str) {
    let response = client
        .get(format!("{}/libraries", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
}

/// Fresh user id per run, so per-owner name sequences start at 1
fn fresh_user_id(offset: i32) -> i32 {
    (Utc::now().timestamp() % 100_000_000) as i32 + offset
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/libraries", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

/// A user creates a library without filling in any details, then fixes the
/// pre-filled name and description afterwards, one field at a time.
#[tokio::test]
#[ignore]
async fn test_blank_metadata_is_never_stored() {
    let client = Client::new();
    let mary_id = fresh_user_id(101);
    let mary = token_for(mary_id, &format!("mary{}@example.com", mary_id));

    let library = create_library(&client, &mary, json!({ "name": "", "description": "" })).await;
    let library_id = library["id"].as_str().expect("No library id").to_string();
    let default_name = library["name"].as_str().unwrap().to_string();
    let default_description = library["description"].as_str().unwrap().to_string();

    // first library of a new owner gets sequence number 1
    assert_eq!(default_name, "Untitled Library 1");
    assert_eq!(default_description, "My ADS library");

    // blanking out either field must not erase it
    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", mary))
        .json(&json!({ "name": "", "description": "" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], default_name.as_str());
    assert_eq!(body["description"], default_description.as_str());

    // updating only the name leaves the description untouched
    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", mary))
        .json(&json!({ "name": "something sensible" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "something sensible");
    assert_eq!(body["description"], default_description.as_str());

    // and the other way around
    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", mary))
        .json(&json!({ "description": "something relevant" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "something sensible");
    assert_eq!(body["description"], "something relevant");

    // both at once
    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", mary))
        .json(&json!({ "name": "Disliked the other one", "description": "It didn't make sense before" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Disliked the other one");
    assert_eq!(body["description"], "It didn't make sense before");
}

/// A teacher shares a private library with two students, then revokes one
/// student's access without affecting the other.
#[tokio::test]
#[ignore]
async fn test_revoking_one_reader_leaves_others_intact() {
    let client = Client::new();
    let teacher = token_for(201, "teacher@example.com");
    let student1 = token_for(202, "student1@example.com");
    let student2 = token_for(203, "student2@example.com");

    let library = create_library(&client, &teacher, json!({ "name": "Astro 101" })).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    // nobody can see the private library yet
    for token in [&student1, &student2] {
        let response = client
            .get(format!("{}/libraries/{}", BASE_URL, library_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 403);
    }

    // the teacher grants read to both students
    for email in ["student1@example.com", "student2@example.com"] {
        let response = client
            .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
            .header("Authorization", format!("Bearer {}", teacher))
            .json(&json!({ "email": email, "permission": "read", "value": true }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }

    for token in [&student1, &student2] {
        let response = client
            .get(format!("{}/libraries/{}", BASE_URL, library_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert!(body["documents"].is_array());
    }

    // revoke student2 only
    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", teacher))
        .json(&json!({ "email": "student2@example.com", "permission": "read", "value": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "none");

    // student2 is locked out, student1 is not
    let response = client
        .get(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", student2))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", student1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_cannot_change_own_permissions() {
    let client = Client::new();
    let owner = token_for(301, "owner301@example.com");

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "owner301@example.com", "permission": "admin", "value": true }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_operation");
}

#[tokio::test]
#[ignore]
async fn test_granting_admin_requires_owner() {
    let client = Client::new();
    let owner = token_for(401, "owner401@example.com");
    let admin = token_for(402, "admin402@example.com");
    let other = token_for(403, "other403@example.com");

    for token in [&admin, &other] {
        touch(&client, token).await;
    }

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "admin402@example.com", "permission": "admin", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // an admin can grant read and write...
    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "email": "other403@example.com", "permission": "write", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // ...but not admin
    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "email": "other403@example.com", "permission": "admin", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // and nobody can touch the owner's implicit access, not even an admin
    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "email": "owner401@example.com", "permission": "read", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_operation");
}

#[tokio::test]
#[ignore]
async fn test_document_mutation_absorbs_duplicates() {
    let client = Client::new();
    let owner = token_for(501, "owner501@example.com");

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/libraries/{}/documents", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({
            "add": ["2015ApJ...808...16N", "2015ApJ...808...16N", "1975CMaPh..43..199H"]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["documents"].as_array().unwrap().len(), 2);

    // removing an absent identifier is a no-op
    let response = client
        .post(format!("{}/libraries/{}/documents", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "remove": ["2020arXiv200112345A", "1975CMaPh..43..199H"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["documents"].as_array().unwrap().len(), 1);
    assert_eq!(body["documents"][0], "2015ApJ...808...16N");
}

#[tokio::test]
#[ignore]
async fn test_delete_cascades_grants() {
    let client = Client::new();
    let owner = token_for(601, "owner601@example.com");
    let reader = token_for(602, "reader602@example.com");

    touch(&client, &reader).await;

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "reader602@example.com", "permission": "read", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // only the owner can delete
    let response = client
        .delete(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // nothing about the library resolves any more, for anyone
    for token in [&owner, &reader] {
        let response = client
            .get(format!("{}/libraries/{}", BASE_URL, library_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 404);
    }
}

#[tokio::test]
#[ignore]
async fn test_readiness_reports_database_state() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

/// A user who has merely authenticated, without ever creating anything,
/// must already be addressable as a grant target.
#[tokio::test]
#[ignore]
async fn test_any_authenticated_user_can_be_granted() {
    let client = Client::new();
    let owner = token_for(801, "owner801@example.com");
    let newcomer = token_for(802, "newcomer802@example.com");

    touch(&client, &newcomer).await;

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "newcomer802@example.com", "permission": "read", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "read");
}

/// Revoking a right the user does not hold must not disturb the rights
/// they do hold, and must not be an error.
#[tokio::test]
#[ignore]
async fn test_revoking_unheld_right_is_a_noop() {
    let client = Client::new();
    let owner = token_for(811, "owner811@example.com");
    let editor = token_for(812, "editor812@example.com");

    touch(&client, &editor).await;

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "editor812@example.com", "permission": "write", "value": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // revoke a right the editor never held
    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "editor812@example.com", "permission": "read", "value": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "write");

    // the editor can still edit
    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", editor))
        .json(&json!({ "name": "still writable" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // revoking from a user with no grant at all succeeds quietly too
    let bystander = token_for(813, "bystander813@example.com");
    touch(&client, &bystander).await;

    let response = client
        .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "email": "bystander813@example.com", "permission": "read", "value": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "none");
}

/// Granting read to a user who already holds write must not downgrade
/// them; only an explicit revoke removes a right.
#[tokio::test]
#[ignore]
async fn test_granting_read_never_downgrades_a_writer() {
    let client = Client::new();
    let owner = token_for(821, "owner821@example.com");
    let editor = token_for(822, "editor822@example.com");

    touch(&client, &editor).await;

    let library = create_library(&client, &owner, json!({})).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    for (permission, expected_role) in [("write", "write"), ("read", "write")] {
        let response = client
            .post(format!("{}/libraries/{}/permissions", BASE_URL, library_id))
            .header("Authorization", format!("Bearer {}", owner))
            .json(&json!({ "email": "editor822@example.com", "permission": permission, "value": true }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["role"], expected_role);
    }

    // write access survived the read grant
    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", editor))
        .json(&json!({ "description": "still a writer" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_public_library_is_readable_but_not_writable() {
    let client = Client::new();
    let owner = token_for(701, "owner701@example.com");
    let visitor = token_for(702, "visitor702@example.com");

    let library = create_library(&client, &owner, json!({ "public": true })).await;
    let library_id = library["id"].as_str().unwrap().to_string();

    let response = client
        .get(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", visitor))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "read");

    let response = client
        .put(format!("{}/libraries/{}", BASE_URL, library_id))
        .header("Authorization", format!("Bearer {}", visitor))
        .json(&json!({ "name": "defaced" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}
