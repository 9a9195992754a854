use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, cookie::Key, http::StatusCode, test, web};

use toguna::repository::DieselRepository;
use toguna::routes::api::{api_v1_appointments, api_v1_companies, api_v1_dashboard};

mod common;

#[actix_web::test]
async fn api_requires_identity() {
    let test_db = common::TestDb::new("test_api_requires_identity.db");
    let repo = DieselRepository::new(test_db.pool());

    let app = test::init_service(
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(web::Data::new(repo))
            .service(
                web::scope("/api")
                    .service(api_v1_companies)
                    .service(api_v1_appointments)
                    .service(api_v1_dashboard),
            ),
    )
    .await;

    for uri in ["/api/v1/companies", "/api/v1/appointments", "/api/v1/dashboard"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}
