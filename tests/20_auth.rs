mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn missing_or_bad_tokens_are_unauthorized() -> Result<()> {
    let app = common::spawn_app().await?;

    let resp = app.client.get(app.url("/projects")).send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let resp = app.get("/projects", "not.a.token").send().await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .client
        .post(app.url("/preferences/organisations"))
        .json(&serde_json::json!({ "name": "TMR" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn callers_without_a_known_role_are_forbidden() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token("auditor-1", &["auditor"]);

    let resp = app.get("/projects", &token).send().await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn admin_only_routes_reject_members() -> Result<()> {
    let app = common::spawn_app().await?;
    let member = app.token("lead-1", &["member"]);

    let resp = app
        .post("/projects", &member, &common::project_payload("Nope", "lead-1", "client-1"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app.get("/users/lead-2", &member).send().await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .post("/benchmarks", &member, &common::benchmark_payload("Nope"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn me_reflects_the_token_subject() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token("crew-1", &["member"]);

    let resp = app.get("/users/me", &token).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["fullName"], "Mia Crew");

    let resp = app.get("/users", &token).send().await?;
    let body: Value = resp.json().await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(common::directory().len()));
    Ok(())
}
