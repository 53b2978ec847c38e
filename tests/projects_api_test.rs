//! Project templates and the projects built from them.

mod common;

use axum::http::Method;
use common::{num, response_json, TestApp};
use serde_json::{json, Value};

async fn create_template(app: &TestApp, product: &Value) -> Value {
    let response = app
        .request(
            Method::POST,
            "/api/projects/templates",
            Some(json!({
                "name": "Vitrine de loja",
                "category": "varejo",
                "items": [
                    { "productId": product["id"], "quantity": 12, "notes": "trilho central" }
                ]
            })),
            Some(&app.designer.token),
        )
        .await;
    assert_eq!(response.status(), 201);
    response_json(response).await
}

#[tokio::test]
async fn projects_copy_template_items_when_none_are_given() {
    let app = TestApp::new().await;
    let product = app.create_product("SPOT-TRILHO", 55.0).await;
    let client = app.create_client("Boutique Aurora").await;
    let template = create_template(&app, &product).await;

    let response = app
        .request(
            Method::POST,
            "/api/projects",
            Some(json!({
                "name": "Aurora - loja 2",
                "clientId": client["id"],
                "templateId": template["id"]
            })),
            Some(&app.salesperson.token),
        )
        .await;
    assert_eq!(response.status(), 201);
    let project = response_json(response).await;

    assert_eq!(project["status"], "draft");
    assert_eq!(project["clientName"], "Boutique Aurora");
    assert_eq!(project["templateName"], "Vitrine de loja");
    assert_eq!(project["creatorName"], "Bruno Vendas");
    assert_eq!(project["createdBy"], app.salesperson.id.to_string());
    let items = project["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], product["id"]);
    assert_eq!(num(&items[0]["quantity"]), 12.0);
}

#[tokio::test]
async fn explicit_items_win_over_the_template() {
    let app = TestApp::new().await;
    let product = app.create_product("PENDENTE", 210.0).await;
    let template = create_template(&app, &product).await;

    let project = response_json(
        app.as_admin(
            Method::POST,
            "/api/projects",
            Some(json!({
                "name": "Sob medida",
                "templateId": template["id"],
                "items": []
            })),
        )
        .await,
    )
    .await;
    assert!(project["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn project_update_and_delete() {
    let app = TestApp::new().await;
    let project = response_json(
        app.as_admin(
            Method::POST,
            "/api/projects",
            Some(json!({ "name": "Galpão logístico" })),
        )
        .await,
    )
    .await;
    let id = project["id"].as_str().unwrap().to_string();
    assert_eq!(project["clientName"], Value::Null);

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/projects/{id}"),
            Some(json!({ "status": "em_andamento", "notes": "Medição agendada" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["status"], "in_progress");
    assert_eq!(updated["notes"], "Medição agendada");
    assert_eq!(updated["name"], "Galpão logístico");

    let list = response_json(app.as_admin(Method::GET, "/api/projects", None).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = app
        .as_admin(Method::DELETE, &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let response = app
        .as_admin(Method::GET, &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn deleting_a_template_detaches_its_projects() {
    let app = TestApp::new().await;
    let product = app.create_product("BALIZADOR", 35.0).await;
    let template = create_template(&app, &product).await;
    let template_id = template["id"].as_str().unwrap().to_string();

    let project = response_json(
        app.as_admin(
            Method::POST,
            "/api/projects",
            Some(json!({ "name": "Jardim", "templateId": template["id"] })),
        )
        .await,
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/projects/templates/{template_id}"),
            None,
            Some(&app.designer.token),
        )
        .await;
    assert_eq!(response.status(), 200);

    let reloaded = response_json(
        app.as_admin(
            Method::GET,
            &format!("/api/projects/{}", project["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(reloaded["templateId"], Value::Null);
    assert_eq!(reloaded["templateName"], Value::Null);
    assert_eq!(reloaded["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_the_creator_keeps_the_project() {
    let app = TestApp::new().await;
    let project = response_json(
        app.request(
            Method::POST,
            "/api/projects",
            Some(json!({ "name": "Quadra poliesportiva" })),
            Some(&app.designer.token),
        )
        .await,
    )
    .await;

    let response = app
        .as_admin(
            Method::DELETE,
            &format!("/api/users/{}", app.designer.id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let reloaded = response_json(
        app.as_admin(
            Method::GET,
            &format!("/api/projects/{}", project["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(reloaded["createdBy"], Value::Null);
    assert_eq!(reloaded["creatorName"], Value::Null);
}

#[tokio::test]
async fn template_updates_replace_items() {
    let app = TestApp::new().await;
    let a = app.create_product("A-PROJ", 10.0).await;
    let b = app.create_product("B-PROJ", 20.0).await;
    let template = create_template(&app, &a).await;

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/projects/templates/{}", template["id"].as_str().unwrap()),
            Some(json!({
                "items": [
                    { "productId": b["id"], "quantity": 2 },
                    { "productId": a["id"], "quantity": 1 }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["items"].as_array().unwrap().len(), 2);
    assert_eq!(updated["items"][0]["productId"], b["id"]);
    assert_eq!(updated["name"], "Vitrine de loja");
}
