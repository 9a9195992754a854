use actix_web::{
    App, HttpResponse,
    http::{StatusCode, header},
    test, web,
};

use toguna::middleware::{RedirectUnauthorized, SIGNIN_PATH};

#[actix_web::test]
async fn anonymous_dashboard_visit_goes_to_signin() {
    let app = test::init_service(
        App::new().wrap(RedirectUnauthorized).route(
            "/schedule",
            web::get().to(|| async { HttpResponse::Unauthorized().body("login required") }),
        ),
    )
    .await;

    let req = test::TestRequest::get().uri("/schedule").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(SIGNIN_PATH)
    );
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn forbidden_is_not_treated_as_signed_out() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Forbidden().finish() })),
    )
    .await;

    let req = test::TestRequest::post().uri("/companies/1/delete").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get(header::LOCATION).is_none());
}

#[actix_web::test]
async fn rendered_pages_keep_their_body() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Ok().body("schedule") })),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "schedule");
}
