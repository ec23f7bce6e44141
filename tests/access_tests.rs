use actix_web::{App, http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use kitlog::access::{AccessRequirement, GateDecision, Role};
use kitlog::client::AccessView;
use kitlog::routes;

mod common;

use common::{TestContext, identity, superadmin};

#[actix_web::test]
async fn anonymous_caller_resolves_to_free() {
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/access").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["role"], "free");
    assert_eq!(
        body["data"]["permissions"],
        json!({
            "canAccessDashboard": false,
            "canManageEquipment": false,
            "canViewReports": false,
            "canAccessAdmin": false,
            "isSuper": false
        })
    );
}

#[actix_web::test]
async fn superadmin_email_is_matched_case_insensitively() {
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(routes::configure),
    )
    .await;

    let shouting = identity("auth0|boss2", None, Some("BOSS@KitLog.Test"));
    let req = test::TestRequest::get()
        .uri("/api/v1/access")
        .insert_header(("Authorization", format!("Bearer {}", ctx.token_for(&shouting))))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["role"], "superadmin");
    assert_eq!(body["data"]["permissions"]["isSuper"], true);
}

#[actix_web::test]
async fn invalid_token_on_open_endpoint_is_treated_as_anonymous() {
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/access")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["role"], "free");
}

#[actix_web::test]
async fn check_endpoint_reports_upgrade_view_for_free_user() {
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(routes::configure),
    )
    .await;

    let user = identity("auth0|free", Some("Free"), Some("user@x.com"));
    let req = test::TestRequest::post()
        .uri("/api/v1/access/check")
        .insert_header(("Authorization", format!("Bearer {}", ctx.token_for(&user))))
        .set_json(json!({ "requireDashboard": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["decision"], "deny");
    assert_eq!(body["data"]["view"]["kind"], "upgrade");
    assert_eq!(body["data"]["view"]["currentPlan"], "free");
    assert_eq!(body["data"]["view"]["planLabel"], "Current Plan: free");
    assert_eq!(body["data"]["view"]["upgradeAvailable"], false);
}

#[actix_web::test]
async fn admin_requirement_yields_restricted_view_even_for_paid_users() {
    let ctx = TestContext::with_paid_users(&["auth0|paid"]).await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(routes::configure),
    )
    .await;

    let user = identity("auth0|paid", Some("Paid"), Some("paid@x.com"));
    let req = test::TestRequest::post()
        .uri("/api/v1/access/check")
        .insert_header(("Authorization", format!("Bearer {}", ctx.token_for(&user))))
        .set_json(json!({ "requireEquipment": true, "requireAdmin": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["decision"], "deny");
    assert_eq!(body["data"]["view"]["kind"], "restricted");
    assert_eq!(body["data"]["view"]["title"], "Admin Access Required");

    let req = test::TestRequest::post()
        .uri("/api/v1/access/check")
        .insert_header(("Authorization", format!("Bearer {}", ctx.token_for(&user))))
        .set_json(json!({ "requireEquipment": true, "requireReports": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["decision"], "render");
    assert!(body["data"]["view"].is_null());
}

#[actix_web::test]
async fn gated_endpoint_returns_deny_view_with_403() {
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(routes::configure),
    )
    .await;

    let user = identity("auth0|free", Some("Free"), Some("user@x.com"));
    let req = test::TestRequest::get()
        .uri("/api/v1/equipment")
        .insert_header(("Authorization", format!("Bearer {}", ctx.token_for(&user))))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Upgrade to Pro");
    assert_eq!(body["data"]["kind"], "upgrade");
    assert_eq!(body["data"]["planLabel"], "Current Plan: free");
}

#[actix_web::test]
async fn access_view_loads_role_through_the_client() {
    let ctx = TestContext::new().await.unwrap();
    let base_url = ctx.spawn_server();

    let mut view = AccessView::new(ctx.client_for(&base_url, &superadmin()));
    assert_eq!(
        view.evaluate(&AccessRequirement::none().admin()),
        GateDecision::Loading
    );

    let resolution = view.load().await.unwrap();
    assert_eq!(resolution.role, Role::Superadmin);
    assert_eq!(
        view.evaluate(&AccessRequirement::none().admin()),
        GateDecision::Render
    );

    let mut anonymous = AccessView::new(ctx.anonymous_client(&base_url));
    anonymous.load().await.unwrap();
    assert!(matches!(
        anonymous.evaluate(&AccessRequirement::none().equipment()),
        GateDecision::Deny(_)
    ));
}
