//! OpenAPI documentation for the relay API.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::relay_handler,
        crate::api::handlers::health_handler,
    ),
    components(
        schemas(
            crate::api::models::RelayRequest,
            crate::api::models::RelayResponse,
            crate::api::models::ErrorBody,
            crate::api::models::HealthResponse,
        )
    ),
    tags(
        (name = "relay", description = "Network engineering assistant relay"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "NetAssist Relay API",
        version = "0.1.0",
        description = "Forwards networking questions to a hosted generative model and normalizes its answers."
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_relay_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/gemini"));
        assert!(doc.paths.paths.contains_key("/health"));

        let schemas = doc.components.unwrap().schemas;
        assert!(schemas.contains_key("RelayRequest"));
        assert!(schemas.contains_key("RelayResponse"));
        assert!(schemas.contains_key("ErrorBody"));
    }
}
