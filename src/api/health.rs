use crate::types::StatusResponse;
use crate::AppState;
use axum::{routing::get, Json, Router};
use tracing::info;

async fn home() -> Json<StatusResponse> {
    info!("Route / accessed");
    Json(StatusResponse {
        status: "online".to_string(),
        msg: "API LSTM funcionando!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_serialization() {
        let response = StatusResponse {
            status: "online".to_string(),
            msg: "API LSTM funcionando!".to_string(),
            version: "1.0.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"online\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
    }

    #[tokio::test]
    async fn test_home_handler() {
        let Json(response) = home().await;
        assert_eq!(response.status, "online");
        assert_eq!(response.msg, "API LSTM funcionando!");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }
}
