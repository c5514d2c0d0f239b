use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    quiz::{QuizRng, ANY_CATEGORY},
    server::{app::AppState, deserializers::deserialize_i64_from_int_or_string},
    telemetry::QUIZ_QUESTIONS_CNTR,
};

use super::{ApiError, ApiResponse};

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_i64_from_int_or_string")]
    id: i64,
}

#[derive(Deserialize)]
struct QuizRound {
    #[serde(default)]
    previous_questions: Vec<i64>,
    quiz_category: QuizCategory,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    State(rng): State<QuizRng>,
    payload: Result<Json<QuizRound>, JsonRejection>,
) -> ApiResponse<NextQuestion> {
    let Json(round) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let category = round.quiz_category.id;

    let in_scope = if category == ANY_CATEGORY {
        questions::get_all_questions(&pool).await?
    } else {
        questions::get_questions_for_category(&pool, category).await?
    };
    let question = rng.pick(in_scope, &round.previous_questions);

    match &question {
        Some(q) => {
            let scope = if category == ANY_CATEGORY {
                "all".to_owned()
            } else {
                category.to_string()
            };
            QUIZ_QUESTIONS_CNTR.with_label_values(&[scope.as_str()]).inc();
            tracing::debug!(id = q.id, category, "Serving quiz question");
        }
        None => tracing::debug!(
            category,
            played = round.previous_questions.len(),
            "Quiz exhausted"
        ),
    }

    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .route("/play", post(next_question))
        .with_state(state)
}
