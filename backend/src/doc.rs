//! OpenAPI document for the marketplace API.
//!
//! Served by Swagger UI at `/docs` in debug builds and exported with
//! `cargo run --bin openapi-dump`. Request and response bodies are the DTOs
//! in [`crate::inbound::http`]; the error body is the domain [`Error`].
//!
//! [`Error`]: crate::domain::Error

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{BidStatus, Error, ErrorCode, OrderStatus, PaymentMethod, Role};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::{admin, auth, dto, health, masters, orders, payments, users};

/// Registers the session cookie security scheme.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default)
            .add_security_scheme(
                "SessionCookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Signed session cookie issued by POST /api/auth/login or /api/auth/register.",
                ))),
            );
    }
}

/// OpenAPI description of the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieAddon),
    info(
        title = "Masters marketplace API",
        description = "Accounts, master profiles, orders and card payments for the furniture masters marketplace."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        auth::login,
        auth::register,
        auth::logout,
        auth::me,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::toggle_block,
        users::change_role,
        masters::master_profile,
        admin::repair_master_profiles,
        orders::create_order,
        orders::get_order,
        orders::place_bid,
        orders::list_bids,
        payments::payments_config,
        payments::create_payment_intent,
        payments::confirm_payment,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        OrderStatus,
        BidStatus,
        PaymentMethod,
        dto::UserResponse,
        dto::MoneyDto,
        dto::MasterProfileResponse,
        dto::RepairResponse,
        dto::OrderResponse,
        dto::BidResponse,
        dto::TransactionResponse,
    )),
    tags(
        (name = "auth", description = "Login, registration and sessions"),
        (name = "users", description = "Administrator user management"),
        (name = "masters", description = "Master profiles"),
        (name = "admin", description = "Maintenance operations"),
        (name = "orders", description = "Orders and bids"),
        (name = "payments", description = "Card payments through the processor"),
        (name = "health", description = "Orchestration probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema(name: &str) -> RefOr<Schema> {
        ApiDoc::openapi()
            .components
            .expect("components")
            .schemas
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("schema {name} registered"))
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId", "details"])]
    #[case("UserResponse", &["id", "email", "role", "active", "createdAt"])]
    #[case("MasterProfileResponse", &["rating", "reviewCount", "completedOrders"])]
    fn schemas_expose_camel_case_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let RefOr::T(Schema::Object(object)) = schema(name) else {
            panic!("{name} should be an object schema");
        };
        for field in fields {
            assert!(object.properties.contains_key(*field), "{name}.{field}");
        }
    }

    #[rstest]
    #[case("/api/auth/login")]
    #[case("/api/users/{id}/role")]
    #[case("/api/admin/master-profiles/repair")]
    #[case("/api/payments/confirm-payment")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path), "{path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
