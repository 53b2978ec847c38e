use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Enerlight API",
        description = r#"
Order management for a lighting and electrical distributor.

Proposals ("orders") carry a client, priced lines and commercial terms. Totals are
always computed by the server:

```
line.total    = (unitPrice - discount) * quantity
subtotal      = sum(line.total)
totalDiscount = sum(discount * quantity)
total         = subtotal + freight + taxSubstitution - totalDiscount
```

Every route except login, registration and health requires
`Authorization: Bearer <token>`.
        "#
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, registration and the current account"),
        (name = "products", description = "Product catalog"),
        (name = "clients", description = "Customers"),
        (name = "orders", description = "Priced proposals and their lines"),
        (name = "users", description = "Account administration (admin only)"),
        (name = "projects", description = "Lighting projects and templates"),
        (name = "uploads", description = "Exported proposal PDFs"),
        (name = "health", description = "Service health")
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::auth::register,
        crate::handlers::auth::me,
        crate::handlers::auth::change_password,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::get_client,
        crate::handlers::clients::create_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::projects::list_templates,
        crate::handlers::projects::create_template,
        crate::handlers::projects::update_template,
        crate::handlers::projects::delete_template,
        crate::handlers::projects::list_projects,
        crate::handlers::projects::get_project,
        crate::handlers::projects::create_project,
        crate::handlers::projects::update_project,
        crate::handlers::projects::delete_project,
        crate::handlers::uploads::upload_pdf,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::models::MessageResponse,
            crate::models::LoginRequest,
            crate::models::RegisterRequest,
            crate::models::AuthResponse,
            crate::models::ChangePasswordRequest,
            crate::models::UserResponse,
            crate::models::CreateUserRequest,
            crate::models::UpdateUserRequest,
            crate::models::ProductResponse,
            crate::models::CreateProductRequest,
            crate::models::UpdateProductRequest,
            crate::models::ClientResponse,
            crate::models::CreateClientRequest,
            crate::models::UpdateClientRequest,
            crate::models::OrderResponse,
            crate::models::OrderItemResponse,
            crate::models::OrderClientSummary,
            crate::models::OrderProductSummary,
            crate::models::CreateOrderRequest,
            crate::models::UpdateOrderRequest,
            crate::models::OrderItemRequest,
            crate::models::TemplateResponse,
            crate::models::CreateTemplateRequest,
            crate::models::UpdateTemplateRequest,
            crate::models::ProjectResponse,
            crate::models::CreateProjectRequest,
            crate::models::UpdateProjectRequest,
            crate::models::UploadResponse,
            crate::models::UploadPdfForm,
            crate::entities::user::Role,
            crate::entities::order::OrderStatus,
            crate::entities::project::ProjectStatus,
            crate::entities::project_template::ProjectItem,
            crate::pricing::OrderTotals,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,
        )
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_every_resource() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Enerlight API"));
        assert!(json.contains("/api/orders/{id}"));
        assert!(json.contains("/api/projects/templates"));
        assert!(json.contains("/api/uploads/pdf"));
        assert!(json.contains("bearer_auth"));
    }
}
