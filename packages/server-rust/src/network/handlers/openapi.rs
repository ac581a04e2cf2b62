//! OpenAPI description of the concerts API, served at `/openapi.json`.

use axum::Json;
use concerts_core::{Concert, ConcertPayload, ErrorBody};
use utoipa::OpenApi;

use super::concerts;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Concerts",
        description = "The concerts service manages music concert data."
    ),
    paths(
        concerts::list_concerts,
        concerts::create_concert,
        concerts::show_concert,
        concerts::update_concert,
        concerts::delete_concert,
    ),
    components(schemas(Concert, ConcertPayload, ErrorBody)),
    tags((name = "concerts", description = "Concert records"))
)]
pub struct ApiDoc;

/// `GET /openapi.json`
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_concert_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        assert!(paths["/concerts"].get("get").is_some());
        assert!(paths["/concerts"].get("post").is_some());
        for verb in ["get", "put", "delete"] {
            assert!(paths["/concerts/{concert_id}"].get(verb).is_some(), "{verb}");
        }
    }

    #[test]
    fn document_carries_concert_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        assert!(schemas.get("Concert").is_some());
        assert!(schemas.get("ConcertPayload").is_some());
        assert!(schemas.get("ErrorBody").is_some());
    }
}
