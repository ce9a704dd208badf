//! OpenAPI document metadata.
//!
//! Route and schema entries are collected at router assembly time; this
//! module only carries the static document info plus the security
//! scheme the admin routes reference.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Static description of the Ngopi HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ngopi API",
        description = "Filterable, searchable, paginated catalog of Bandung cafes."
    ),
    modifiers(&AdminTokenScheme),
    tags(
        (name = "cafes", description = "Cafe discovery and management"),
        (name = "reviews", description = "Visitor reviews and moderation"),
        (name = "facilities", description = "Amenity vocabulary"),
        (name = "terms", description = "Editorial taxonomy"),
    )
)]
pub struct ApiDoc;

/// Registers the `admin_token` bearer scheme the mutation routes cite.
struct AdminTokenScheme;

impl Modify for AdminTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_token",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_carries_title_and_security_scheme() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Ngopi API");

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("admin_token"));
    }

    #[test]
    fn document_serializes_to_json() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(json["info"]["title"], "Ngopi API");
    }
}
