use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_types, questions},
        NewQuestion, Question,
    },
    server::{app::AppState, deserializers::deserialize_i64_from_int_or_string},
    telemetry::QUESTION_MUTATIONS_CNTR,
};

use super::{ApiError, ApiResponse};

const QUESTIONS_PER_PAGE: i64 = 10;

#[derive(Deserialize)]
struct Pagination {
    page: Option<i64>,
}

#[derive(Deserialize)]
struct CreateQuestion {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_i64_from_int_or_string")]
    category: i64,
    #[serde(deserialize_with = "deserialize_i64_from_int_or_string")]
    difficulty: i64,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default, rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    message: &'static str,
    created: i64,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    id: i64,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    #[serde(rename = "totalQuestions")]
    total_questions: usize,
}

async fn questions_page(
    State(pool): State<SqlitePool>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> ApiResponse<QuestionsPage> {
    let Query(Pagination { page }) = pagination.map_err(ApiError::bad_request)?;
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::BadRequest(format!(
            "page must be a positive integer, got {page}"
        )));
    }

    let offset = (page - 1).saturating_mul(QUESTIONS_PER_PAGE);
    let page_questions = questions::get_questions_page(&pool, offset, QUESTIONS_PER_PAGE).await?;
    Ok(Json(QuestionsPage {
        success: true,
        questions: page_questions,
        total_questions: questions::count_questions(&pool).await?,
        categories: get_category_types(&pool).await?,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    payload: Result<Json<CreateQuestion>, JsonRejection>,
) -> ApiResponse<Created> {
    let Json(new) = payload.map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;
    let id = questions::create_question(
        &pool,
        NewQuestion {
            question: &new.question,
            answer: &new.answer,
            category: new.category,
            difficulty: new.difficulty,
        },
    )
    .await
    .map_err(ApiError::unprocessable)?;

    QUESTION_MUTATIONS_CNTR.with_label_values(&["create"]).inc();
    tracing::info!(id, category = new.category, "Question created");
    Ok(Json(Created {
        success: true,
        message: "successfully added a question",
        created: id,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    questions::delete_question(&pool, id)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            err => ApiError::unprocessable(err),
        })?;

    QUESTION_MUTATIONS_CNTR.with_label_values(&["delete"]).inc();
    tracing::info!(id, "Question deleted");
    Ok(Json(Deleted { success: true, id }))
}

async fn search(
    State(pool): State<SqlitePool>,
    payload: Result<Json<SearchQuery>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let Json(SearchQuery { search_term }) =
        payload.map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;
    let found = questions::search_questions(&pool, &search_term)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(SearchResults {
        success: true,
        total_questions: found.len(),
        questions: found,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search))
        .with_state(state)
}
