use coffee_shop_common::types::{Drink, DrinkChanges, NewDrink};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use super::StorageError;

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StorageError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

/// Repository for the `drinks` table
#[derive(Debug, Clone)]
pub struct DrinkRepository {
    pool: SqlitePool,
}

impl DrinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All drinks ordered by id
    pub async fn list(&self) -> Result<Vec<Drink>, StorageError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Drink::try_from).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Option<Drink>, StorageError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Drink::try_from).transpose()
    }

    pub async fn insert(&self, drink: &NewDrink) -> Result<Drink, StorageError> {
        let recipe = serde_json::to_string(&drink.recipe)?;

        let result = sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(&drink.title)
            .bind(&recipe)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &drink.title))?;

        let id = result.last_insert_rowid();
        debug!("Inserted drink {} with id {}", drink.title, id);

        Ok(Drink {
            id,
            title: drink.title.clone(),
            recipe: drink.recipe.clone(),
        })
    }

    /// Apply `changes` to the drink with `id` in a single statement.
    /// Columns without a change keep their stored value. Returns `None` if
    /// the drink does not exist.
    pub async fn update(
        &self,
        id: i64,
        changes: &DrinkChanges,
    ) -> Result<Option<Drink>, StorageError> {
        let title = changes.title.as_deref();
        let recipe = changes
            .recipe
            .as_ref()
            .map(|recipe| serde_json::to_string(recipe))
            .transpose()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET title = COALESCE(?, title), recipe = COALESCE(?, recipe)
            WHERE id = ?
            RETURNING id, title, recipe
            "#,
        )
        .bind(title)
        .bind(recipe.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, title.unwrap_or_default()))?;

        row.map(Drink::try_from).transpose()
    }

    /// Delete the drink with `id`. Returns `false` if it does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_unique_violation(err: sqlx::Error, title: &str) -> StorageError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StorageError::DuplicateTitle(title.to_string());
        }
    }
    StorageError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::create_test_database;
    use coffee_shop_common::types::RecipePart;

    fn recipe_names(recipe: &[RecipePart]) -> Vec<&str> {
        recipe.iter().map(|part| part.name.as_str()).collect()
    }

    fn part(name: &str, color: &str, parts: u32) -> RecipePart {
        RecipePart {
            name: name.to_string(),
            color: color.to_string(),
            parts,
        }
    }

    fn latte() -> NewDrink {
        NewDrink {
            title: "Latte".to_string(),
            recipe: vec![part("espresso", "brown", 1), part("milk", "white", 3)],
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, _file) = create_test_database().await;
        let repo = db.drinks();

        let drink = repo.insert(&latte()).await.unwrap();
        assert!(drink.id > 0);

        let stored = repo.get(drink.id).await.unwrap().unwrap();
        assert_eq!(stored, drink);
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert!(repo.get(drink.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_title_is_rejected() {
        let (db, _file) = create_test_database().await;
        let repo = db.drinks();

        repo.insert(&latte()).await.unwrap();
        let err = repo.insert(&latte()).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateTitle(title) if title == "Latte"));
    }

    #[tokio::test]
    async fn test_update_applies_only_given_fields() {
        let (db, _file) = create_test_database().await;
        let repo = db.drinks();
        let drink = repo.insert(&latte()).await.unwrap();

        let changes = DrinkChanges {
            title: Some("Oat Latte".to_string()),
            recipe: None,
        };
        let updated = repo.update(drink.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.title, "Oat Latte");
        assert_eq!(updated.recipe, drink.recipe);

        let changes = DrinkChanges {
            title: None,
            recipe: Some(vec![part("oat milk", "beige", 2)]),
        };
        let updated = repo.update(drink.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.title, "Oat Latte");
        assert_eq!(recipe_names(&updated.recipe), vec!["oat milk"]);

        assert_eq!(repo.get(drink.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_partial_updates_keep_both_changes() {
        let (db, _file) = create_test_database().await;
        let repo = db.drinks();
        let id = repo.insert(&latte()).await.unwrap().id;

        for round in 0..25 {
            let title = format!("Latte #{round}");
            let recipe = vec![part("espresso", "brown", round + 1)];

            let title_change = DrinkChanges {
                title: Some(title.clone()),
                recipe: None,
            };
            let recipe_change = DrinkChanges {
                title: None,
                recipe: Some(recipe.clone()),
            };

            let (first, second) = (repo.clone(), repo.clone());
            let (a, b) = tokio::join!(
                tokio::spawn(async move { first.update(id, &title_change).await }),
                tokio::spawn(async move { second.update(id, &recipe_change).await }),
            );
            assert!(a.unwrap().unwrap().is_some());
            assert!(b.unwrap().unwrap().is_some());

            let stored = repo.get(id).await.unwrap().unwrap();
            assert_eq!(stored.title, title, "round {round}");
            assert_eq!(stored.recipe, recipe, "round {round}");
        }
    }

    #[tokio::test]
    async fn test_update_missing_drink() {
        let (db, _file) = create_test_database().await;
        let changes = DrinkChanges {
            title: Some("Ghost".to_string()),
            recipe: None,
        };
        assert!(db.drinks().update(42, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_existing_title_is_rejected() {
        let (db, _file) = create_test_database().await;
        let repo = db.drinks();
        repo.insert(&latte()).await.unwrap();
        let mocha = repo
            .insert(&NewDrink {
                title: "Mocha".to_string(),
                recipe: vec![part("chocolate", "brown", 1)],
            })
            .await
            .unwrap();

        let changes = DrinkChanges {
            title: Some("Latte".to_string()),
            recipe: None,
        };
        let err = repo.update(mocha.id, &changes).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateTitle(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, _file) = create_test_database().await;
        let repo = db.drinks();
        let drink = repo.insert(&latte()).await.unwrap();

        assert!(repo.delete(drink.id).await.unwrap());
        assert!(!repo.delete(drink.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
