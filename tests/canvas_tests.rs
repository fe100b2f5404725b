mod common;

use serde_json::json;

use common::{build_test_app, new_user_token};

fn sample_layout() -> serde_json::Value {
    json!({
        "lg": [
            { "i": "trades", "x": 0, "y": 0, "w": 6, "h": 4, "minW": 3 },
            { "i": "journal", "x": 6, "y": 0, "w": 6, "h": 4 }
        ],
        "sm": [
            { "i": "trades", "x": 0, "y": 0, "w": 2, "h": 4 }
        ]
    })
}

#[tokio::test]
async fn test_canvas_layout_stored_verbatim() {
    let app = build_test_app().await;
    let (_, token) = new_user_token();

    let (status, json) = app
        .send_json(
            "POST",
            "/api/canvases",
            Some(&token),
            json!({ "name": "Morning desk", "layout": sample_layout() }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["layout"], sample_layout());
    assert_eq!(json["data"]["is_public"], false);
    assert_eq!(json["data"]["likes_count"], 0);
}

#[tokio::test]
async fn test_private_canvas_hidden_from_others() {
    let app = build_test_app().await;
    let (_, owner) = new_user_token();
    let (_, stranger) = new_user_token();

    let (_, json) = app
        .send_json("POST", "/api/canvases", Some(&owner), json!({ "name": "Mine", "layout": {} }))
        .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.get(&format!("/api/canvases/{id}"), Some(&stranger)).await;
    assert_eq!(status, 404);

    // Importing a private canvas is refused too
    let (status, _) = app
        .send_json("POST", &format!("/api/canvases/{id}/import"), Some(&stranger), json!({}))
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_import_creates_private_copy() {
    let app = build_test_app().await;
    let (_, author) = new_user_token();
    let (importer_id, importer) = new_user_token();

    let (_, json) = app
        .send_json(
            "POST",
            "/api/canvases",
            Some(&author),
            json!({ "name": "Scalper", "layout": sample_layout(), "tags": ["scalping"] }),
        )
        .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();
    app.send_json("POST", &format!("/api/canvases/{id}/publish"), Some(&author), json!({}))
        .await;

    let (status, json) = app
        .send_json("POST", &format!("/api/canvases/{id}/import"), Some(&importer), json!({}))
        .await;
    assert_eq!(status, 200);

    let copy = &json["data"];
    assert_eq!(copy["name"], "Imported: Scalper");
    assert_eq!(copy["description"], "Imported from trader");
    assert_eq!(copy["is_public"], false);
    assert_eq!(copy["likes_count"], 0);
    assert_eq!(copy["user_id"], importer_id.to_string());
    assert_eq!(copy["layout"], sample_layout());
    assert_eq!(copy["tags"], json!(["scalping"]));
}

#[tokio::test]
async fn test_unpublish_keeps_likes() {
    let app = build_test_app().await;
    let (_, author) = new_user_token();
    let (_, fan) = new_user_token();

    let (_, json) = app
        .send_json("POST", "/api/canvases", Some(&author), json!({ "name": "Swing", "layout": {} }))
        .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    app.send_json("POST", &format!("/api/canvases/{id}/publish"), Some(&author), json!({}))
        .await;
    let (_, json) = app
        .send_json("POST", &format!("/api/canvases/{id}/like"), Some(&fan), json!({}))
        .await;
    assert_eq!(json["data"]["likes_count"], 1);

    let (_, json) = app
        .send_json("POST", &format!("/api/canvases/{id}/unpublish"), Some(&author), json!({}))
        .await;
    assert_eq!(json["data"]["is_public"], false);
    assert_eq!(json["data"]["likes_count"], 1);
}

#[tokio::test]
async fn test_community_ordered_by_likes() {
    let app = build_test_app().await;
    let (_, author) = new_user_token();

    let (_, json) = app
        .send_json(
            "POST",
            "/api/canvases",
            Some(&author),
            json!({ "name": "Crowd favourite", "layout": {}, "is_public": true }),
        )
        .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    // Lift it above anything other tests published
    sqlx::query("UPDATE canvases SET likes_count = 1000000 WHERE id = $1")
        .bind(id.parse::<uuid::Uuid>().unwrap())
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, json) = app.get("/api/community/canvases", None).await;
    assert_eq!(status, 200);

    let listed = json["data"].as_array().unwrap();
    assert!(listed.len() <= 50);
    assert!(listed.iter().any(|c| c["id"] == id.as_str()));
    assert!(listed.iter().all(|c| c["is_public"] == true));

    let likes: Vec<i64> = listed.iter().map(|c| c["likes_count"].as_i64().unwrap()).collect();
    assert!(likes.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_single_default_canvas() {
    let app = build_test_app().await;
    let (_, token) = new_user_token();

    let mut ids = Vec::new();
    for name in ["First", "Second"] {
        let (_, json) = app
            .send_json("POST", "/api/canvases", Some(&token), json!({ "name": name, "layout": {} }))
            .await;
        ids.push(json["data"]["id"].as_str().unwrap().to_string());
    }

    for id in &ids {
        app.send_json("PATCH", &format!("/api/canvases/{id}"), Some(&token), json!({ "is_default": true }))
            .await;
    }

    let (_, json) = app.get("/api/canvases", Some(&token)).await;
    let defaults: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["is_default"] == true)
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, vec![ids[1].as_str()]);
}
