use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Categories keyed by id, the shape the web client renders its sidebar from.
pub async fn get_category_types(pool: &SqlitePool) -> sqlx::Result<BTreeMap<i64, String>> {
    let categories = get_all_categories(pool).await?;
    Ok(categories.into_iter().map(|c| (c.id, c.kind)).collect())
}

pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: Vec<Category>,
) -> sqlx::Result<()> {
    for category in categories {
        sqlx::query(
            r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
ON CONFLICT (id) DO UPDATE SET type = excluded.type
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn category_types_are_keyed_by_id() {
        let pool = test_pool().await;
        let types = get_category_types(&pool).await.unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[&4], "History");
    }

    #[tokio::test]
    async fn import_updates_existing_and_adds_new() {
        let pool = test_pool().await;
        let mut tx = pool.begin().await.unwrap();
        import_categories(
            &mut *tx,
            vec![
                Category {
                    id: 2,
                    kind: "Fine Art".to_owned(),
                },
                Category {
                    id: 7,
                    kind: "Music".to_owned(),
                },
            ],
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let types = get_category_types(&pool).await.unwrap();
        assert_eq!(types.len(), 7);
        assert_eq!(types[&2], "Fine Art");
        assert_eq!(types[&7], "Music");
    }
}
