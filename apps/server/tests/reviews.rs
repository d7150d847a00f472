//! Reviews and grade recomputation over HTTP

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{assert_error, assert_status, user_payload, DressmakerBuilder, TestApp};

struct Fixture {
    app: TestApp,
    dressmaker_id: String,
    user_token: String,
    dressmaker_token: String,
}

async fn fixture() -> anyhow::Result<Fixture> {
    let app = TestApp::new().await?;
    let dressmaker_id = app
        .create_dressmaker(&DressmakerBuilder::new("helo@costura.test").build())
        .await?;
    app.create_user(&user_payload("ines@costura.test", "pw")).await?;
    let user_token = app.login("/users/auth", "ines@costura.test", "pw").await?;
    let dressmaker_token = app
        .login("/dressmakers/auth", "helo@costura.test", "s3cret")
        .await?;
    Ok(Fixture {
        app,
        dressmaker_id,
        user_token,
        dressmaker_token,
    })
}

#[tokio::test]
async fn grade_is_the_rounded_mean_of_all_reviews() -> anyhow::Result<()> {
    let Fixture {
        app,
        dressmaker_id,
        user_token,
        ..
    } = fixture().await?;
    let path = format!("/dressmakers/{dressmaker_id}/reviews");

    for (grade, expected) in [(5.0, 5.0), (4.0, 5.0), (1.0, 3.0)] {
        let (status, body) = app
            .post_json(
                &path,
                Some(&user_token),
                &json!({ "grade": grade, "comment": "Ótimo acabamento" }),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, "add review");
        assert_eq!(body["data"]["grade"], grade);
        assert_eq!(body["data"]["dressmakerId"], dressmaker_id.as_str());

        let (_, shown) = app.get_json(&format!("/dressmakers/{dressmaker_id}")).await?;
        assert_eq!(shown["data"]["grade"], expected, "after grading {grade}");
    }

    let (_, shown) = app.get_json(&format!("/dressmakers/{dressmaker_id}")).await?;
    assert_eq!(shown["data"]["reviews"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn review_input_is_validated() -> anyhow::Result<()> {
    let Fixture {
        app,
        dressmaker_id,
        user_token,
        ..
    } = fixture().await?;
    let path = format!("/dressmakers/{dressmaker_id}/reviews");

    for payload in [
        json!({ "grade": 6, "comment": "demais" }),
        json!({ "grade": 0.5, "comment": "de menos" }),
        json!({ "grade": 3, "comment": "   " }),
    ] {
        let (status, _) = app.post_json(&path, Some(&user_token), &payload).await?;
        assert_status(status, StatusCode::BAD_REQUEST, &payload.to_string());
    }

    let (status, body) = app
        .post_json(
            &format!("/dressmakers/{}/reviews", uuid::Uuid::new_v4()),
            Some(&user_token),
            &json!({ "grade": 3, "comment": "ok" }),
        )
        .await?;
    assert_error(status, &body, StatusCode::NOT_FOUND, "dressmaker not found");
    Ok(())
}

#[tokio::test]
async fn only_users_may_review() -> anyhow::Result<()> {
    let Fixture {
        app,
        dressmaker_id,
        dressmaker_token,
        ..
    } = fixture().await?;

    let (status, _) = app
        .post_json(
            &format!("/dressmakers/{dressmaker_id}/reviews"),
            Some(&dressmaker_token),
            &json!({ "grade": 5, "comment": "eu mesma" }),
        )
        .await?;
    assert_status(status, StatusCode::FORBIDDEN, "dressmaker reviewing");
    Ok(())
}
