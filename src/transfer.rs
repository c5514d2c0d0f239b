//! CSV import and export of the quiz data, used to load reference data beyond the seed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: PathBuf) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(&path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Bad record in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        path.display()
    );
    write_to(path.join(CATEGORIES_FILE), categories)?;
    write_to(path.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

/// Upserts categories, then questions, by id in a single transaction. Rows absent from the
/// files are left alone.
pub async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(path.join(QUESTIONS_FILE))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        path.display()
    );
    let mut tx = pool.begin().await?;
    import_categories(&mut *tx, categories).await?;
    import_questions(&mut *tx, questions).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::categories::get_category_types;
    use crate::db::queries::questions::count_questions;
    use crate::db::test_pool;

    #[tokio::test]
    async fn import_from_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CATEGORIES_FILE),
            "id,type\n7,Music\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n\
             1,Who wrote the Four Seasons?,Vivaldi,7,2\n\
             2,\"Which band sang \"\"Yesterday\"\"?\",The Beatles,7,1\n",
        )
        .unwrap();

        let pool = test_pool().await;
        import_data(&pool, dir.path()).await.unwrap();

        assert_eq!(get_category_types(&pool).await.unwrap()[&7], "Music");
        let questions = get_all_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question, "Which band sang \"Yesterday\"?");
        assert_eq!(questions[0].category, 7);
    }

    #[tokio::test]
    async fn export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("dump");
        let pool = test_pool().await;

        export_data(&pool, &target).await.unwrap();

        let categories = std::fs::read_to_string(target.join(CATEGORIES_FILE)).unwrap();
        assert!(categories.starts_with("id,type\n1,Science\n"));
        assert!(target.join(QUESTIONS_FILE).exists());
        assert_eq!(count_questions(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_question_import_keeps_categories_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n1,Physics\n7,Music\n").unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n1,Who wrote the Four Seasons?,Vivaldi,7,2\n",
        )
        .unwrap();

        let pool = test_pool().await;
        sqlx::query(
            r#"
CREATE TRIGGER reject_questions BEFORE INSERT ON questions
BEGIN
    SELECT RAISE(ABORT, 'questions are read-only');
END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        assert!(import_data(&pool, dir.path()).await.is_err());

        let types = get_category_types(&pool).await.unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[&1], "Science");
        assert_eq!(count_questions(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        assert!(import_data(&pool, dir.path()).await.is_err());
    }
}
