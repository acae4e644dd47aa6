use crate::core::engine::PuzzleEngine;
use crate::domain::model::{ErrorResponse, HealthResponse, HighScoreResponse, ValidationResponse};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// All endpoints, mounted both at the root and under `/api`.
pub fn routes(
    engine: Arc<PuzzleEngine>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let endpoints = health()
        .or(validate_word(Arc::clone(&engine)))
        .or(todays_high_score(Arc::clone(&engine)))
        .or(todays_puzzle(engine));
    let prefixed = warp::path("api").and(endpoints.clone());

    endpoints
        .or(prefixed)
        .with(warp::cors().allow_any_origin().allow_methods(vec!["GET"]))
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_engine(
    engine: Arc<PuzzleEngine>,
) -> impl Filter<Extract = (Arc<PuzzleEngine>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&engine))
}

fn health() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(|| {
        warp::reply::json(&HealthResponse {
            status: "ok".to_string(),
        })
    })
}

fn validate_word(
    engine: Arc<PuzzleEngine>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("validate-word" / String)
        .and(warp::get())
        .and(with_engine(engine))
        .and_then(handle_validate_word)
}

fn todays_high_score(
    engine: Arc<PuzzleEngine>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("todays-high-score")
        .and(warp::get())
        .and(with_engine(engine))
        .and_then(handle_high_score)
}

fn todays_puzzle(
    engine: Arc<PuzzleEngine>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("todays-puzzle")
        .and(warp::get())
        .and(with_engine(engine))
        .and_then(handle_puzzle)
}

/// warp hands path parameters over still percent-encoded.
/// 只做百分比解碼；`+` 與 `&` 在路徑裡沒有特殊意義
pub fn decode_path_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn error_reply(status: StatusCode, message: String) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse { message }), status).into_response()
}

async fn handle_validate_word(
    raw_word: String,
    engine: Arc<PuzzleEngine>,
) -> Result<Response, Infallible> {
    let word = decode_path_segment(&raw_word);

    match engine.validate_word(&word).await {
        Ok(response) => {
            tracing::debug!("Validated '{}': {}", word, response.is_valid);
            Ok(warp::reply::json(&response).into_response())
        }
        Err(e) => {
            tracing::error!("❌ Error validating word '{}': {}", word, e);
            Ok(warp::reply::with_status(
                warp::reply::json(&ValidationResponse::unavailable()),
                StatusCode::SERVICE_UNAVAILABLE,
            )
            .into_response())
        }
    }
}

async fn handle_high_score(engine: Arc<PuzzleEngine>) -> Result<Response, Infallible> {
    match engine.todays_high_score() {
        Ok(high_score) => Ok(warp::reply::json(&HighScoreResponse { high_score }).into_response()),
        Err(e) => {
            tracing::error!("❌ Error computing high score: {}", e);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.user_friendly_message(),
            ))
        }
    }
}

async fn handle_puzzle(engine: Arc<PuzzleEngine>) -> Result<Response, Infallible> {
    match engine.todays_puzzle() {
        Ok(puzzle) => Ok(warp::reply::json(&puzzle).into_response()),
        Err(e) => {
            tracing::error!("❌ Error building today's puzzle: {}", e);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.user_friendly_message(),
            ))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not found".to_string()));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        ));
    }

    tracing::warn!("Unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal error".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::lexicon::LexiconOracle;
    use crate::core::engine::EngineSettings;
    use crate::domain::ports::DictionaryOracle;
    use crate::domain::word_list::{DailyWord, WordList};
    use crate::utils::error::{BogstavbiError, Result};
    use async_trait::async_trait;

    struct DownOracle;

    #[async_trait]
    impl DictionaryOracle for DownOracle {
        async fn check_word_exists(&self, _word: &str) -> Result<bool> {
            Err(BogstavbiError::oracle("ordnet unreachable"))
        }
    }

    fn engine_with(oracle: Arc<dyn DictionaryOracle>) -> Arc<PuzzleEngine> {
        let clock = Arc::new(FixedClock::on_date(2025, 2, 4));
        let words = WordList::new(vec![DailyWord::new("SNØRKLE", "curl")]).unwrap();
        Arc::new(PuzzleEngine::new(
            clock,
            words,
            oracle,
            EngineSettings::default(),
        ))
    }

    fn engine() -> Arc<PuzzleEngine> {
        engine_with(Arc::new(LexiconOracle::new(["snørkle", "snører"])))
    }

    #[tokio::test]
    async fn test_health() {
        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes(engine()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_validate_word_decodes_danish_letters() {
        let filter = routes(engine());
        let response = warp::test::request()
            .method("GET")
            .path("/validate-word/sn%C3%B8rkle")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: ValidationResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, ValidationResponse::from_verdict(true));

        let response = warp::test::request()
            .method("GET")
            .path("/api/validate-word/rknes")
            .reply(&filter)
            .await;
        let body: ValidationResponse = serde_json::from_slice(response.body()).unwrap();
        assert!(!body.is_valid);
        assert_eq!(body.message, "Ikke et gyldigt dansk ord");
    }

    #[tokio::test]
    async fn test_oracle_failure_is_service_unavailable() {
        let response = warp::test::request()
            .method("GET")
            .path("/validate-word/klister")
            .reply(&routes(engine_with(Arc::new(DownOracle))))
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ValidationResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, ValidationResponse::unavailable());
    }

    #[tokio::test]
    async fn test_high_score_follows_confirmed_words() {
        let engine = engine();
        let filter = routes(Arc::clone(&engine));

        let response = warp::test::request()
            .method("GET")
            .path("/todays-high-score")
            .reply(&filter)
            .await;
        let body: HighScoreResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body.high_score, 50);

        engine.ledger().record_confirmed_word(
            chrono::NaiveDate::from_ymd_opt(2025, 2, 4).unwrap(),
            "snører",
            true,
        )
        .unwrap();
        let response = warp::test::request()
            .method("GET")
            .path("/api/todays-high-score")
            .reply(&filter)
            .await;
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, serde_json::json!({"highScore": 50}));
    }

    #[tokio::test]
    async fn test_todays_puzzle() {
        let response = warp::test::request()
            .method("GET")
            .path("/todays-puzzle")
            .reply(&routes(engine()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["sourceWord"], "SNØRKLE");
        assert_eq!(body["mandatoryLetter"], "E");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = warp::test::request()
            .method("GET")
            .path("/nope")
            .reply(&routes(engine()))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_decode_path_segment() {
        assert_eq!(decode_path_segment("sn%C3%B8rkle"), "snørkle");
        assert_eq!(decode_path_segment("klister"), "klister");
        assert_eq!(decode_path_segment(""), "");
        assert_eq!(decode_path_segment("sn%C3%B8rkle%26zz"), "snørkle&zz");
        assert_eq!(decode_path_segment("sn%C3%B8rkle%3Dx"), "snørkle=x");
        assert_eq!(decode_path_segment("kr+ft"), "kr+ft");
    }

    #[tokio::test]
    async fn test_validate_word_keeps_query_characters_in_word() {
        let response = warp::test::request()
            .method("GET")
            .path("/validate-word/sn%C3%B8rkle%26zz")
            .reply(&routes(engine()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: ValidationResponse = serde_json::from_slice(response.body()).unwrap();
        assert!(!body.is_valid);
    }
}
