//! Public master profile reads.
//!
//! ```text
//! GET /api/masters/3fa85f64-5717-4562-b3fc-2c963f66afa6/profile
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::MasterProfileResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// Profile of a master with non-null aggregates.
#[utoipa::path(
    get,
    path = "/api/masters/{id}/profile",
    params(("id" = String, Path, description = "Master user id")),
    responses(
        (status = 200, description = "Master profile", body = MasterProfileResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not a master", body = Error)
    ),
    tags = ["masters"],
    operation_id = "masterProfile",
    security([])
)]
#[get("/masters/{id}/profile")]
pub async fn master_profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MasterProfileResponse>> {
    let id = parse_user_id(&path, FieldName::new("id"))?;
    let profile = state.master_profiles.profile(&id).await?;
    Ok(web::Json(MasterProfileResponse::from(&profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MasterAggregates, MasterProfile, Role, UserId};
    use crate::inbound::http::test_utils::{MockPorts, sample_user, session_for, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    #[actix_web::test]
    async fn returns_profile_without_a_session() {
        let master = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .master_profiles
            .expect_profile()
            .withf(move |id| *id == master)
            .returning(|id| {
                Ok(MasterProfile::with_aggregates(
                    *id,
                    MasterAggregates {
                        rating: 4.5,
                        review_count: 12,
                        completed_orders: 7,
                    },
                ))
            });
        let anyone = sample_user("Olga", Role::Client);
        let app = actix_test::init_service(test_app!(
            ports.into_state(),
            session_for(&anyone),
            master_profile
        ))
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/masters/{master}/profile"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: MasterProfileResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.review_count, 12);
        assert_eq!(body.user_id, master.to_string());
    }

    #[actix_web::test]
    async fn non_masters_are_not_found() {
        let mut ports = MockPorts::default();
        ports
            .master_profiles
            .expect_profile()
            .returning(|_| Err(Error::not_found("master not found")));
        let anyone = sample_user("Olga", Role::Client);
        let app = actix_test::init_service(test_app!(
            ports.into_state(),
            session_for(&anyone),
            master_profile
        ))
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/masters/{}/profile", UserId::random()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
