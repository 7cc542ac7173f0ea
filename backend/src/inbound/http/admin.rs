//! Administrator maintenance endpoints.

use actix_web::{post, web};
use tracing::info;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::require_admin;
use crate::inbound::http::dto::RepairResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Fill missing master profile aggregates with defaults.
#[utoipa::path(
    post,
    path = "/api/admin/master-profiles/repair",
    responses(
        (status = 200, description = "Repair finished", body = RepairResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "repairMasterProfiles"
)]
#[post("/admin/master-profiles/repair")]
pub async fn repair_master_profiles(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RepairResponse>> {
    let admin = require_admin(&state, &session).await?;
    let report = state.master_profiles_command.repair().await?;
    info!(
        admin_id = %admin.id(),
        repaired = report.repaired,
        remaining = report.remaining_incomplete,
        "master profile repair requested"
    );
    Ok(web::Json(RepairResponse::from(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RepairReport, Role};
    use crate::inbound::http::test_utils::{
        MockPorts, login_cookie, sample_user, session_for, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;

    #[actix_web::test]
    async fn admin_receives_the_report() {
        let admin = sample_user("Root", Role::Admin);
        let mut ports = MockPorts::default().with_session_user(&admin);
        ports
            .master_profiles_command
            .expect_repair()
            .times(1)
            .returning(|| {
                Ok(RepairReport {
                    repaired: 3,
                    remaining_incomplete: 0,
                })
            });
        let app = actix_test::init_service(test_app!(
            ports.into_state(),
            session_for(&admin),
            repair_master_profiles
        ))
        .await;
        let cookie = login_cookie(&app).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/admin/master-profiles/repair")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: RepairResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.repaired, 3);
        assert_eq!(body.remaining_incomplete, 0);
    }

    #[rstest]
    #[case(Role::Client)]
    #[case(Role::VerifiedMaster)]
    #[actix_web::test]
    async fn other_roles_are_forbidden(#[case] role: Role) {
        let caller = sample_user("Olga", role);
        let mut ports = MockPorts::default().with_session_user(&caller);
        ports.master_profiles_command.expect_repair().never();
        let app = actix_test::init_service(test_app!(
            ports.into_state(),
            session_for(&caller),
            repair_master_profiles
        ))
        .await;
        let cookie = login_cookie(&app).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/admin/master-profiles/repair")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
