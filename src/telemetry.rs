use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

// sqlx logs every statement at info
const DEFAULT_FILTER: &str = "info,sqlx=warn";

lazy_static! {
    pub static ref QUIZ_QUESTIONS_CNTR: CounterVec = register_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions served to quiz players",
        &["scope"]
    )
    .unwrap();
    pub static ref QUESTION_MUTATIONS_CNTR: CounterVec = register_counter_vec!(
        "questions_mutations_total",
        "Number of questions created or deleted",
        &["action"]
    )
    .unwrap();
}

pub fn init_tracing() {
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// Renders every registered metric in the Prometheus text format, with its content type.
pub fn encode_metrics() -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buf = vec![];
    encoder.encode(&prometheus::gather(), &mut buf)?;
    Ok((encoder.format_type().to_owned(), buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        QUIZ_QUESTIONS_CNTR.with_label_values(&["all"]).inc();
        let (content_type, body) = encode_metrics().unwrap();
        assert!(content_type.starts_with("text/plain"));
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains("quiz_questions_served_total{scope=\"all\"}"));
    }
}
