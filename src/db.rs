//! # Recipe Store
//!
//! Read-only access to the recipe collection. `MongoRecipeRepo` is the production
//! store; `InMemoryRecipeRepo` has the same semantics over a plain vector and is
//! used by the test suites.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::models::Recipe;

/// Read operations the bot needs from a recipe store
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Every stored recipe, in store order
    async fn list_all(&self) -> Result<Vec<Recipe>, StoreError>;

    /// Exact lookup by the hex form of the recipe id
    async fn get_by_id(&self, id: &str) -> Result<Recipe, StoreError>;

    /// Deduplicated union of all `base_ingredients`, sorted ascending
    async fn list_distinct_base_ingredients(&self) -> Result<Vec<String>, StoreError>;

    /// Recipes whose `base_ingredients` contain every requested name.
    /// An empty set matches every recipe.
    async fn find_by_ingredients(&self, names: &BTreeSet<String>) -> Result<Vec<Recipe>, StoreError>;
}

fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Connect to MongoDB and verify the deployment answers a ping within `timeout`
pub async fn connect_mongo(uri: &str, timeout: Duration) -> Result<Client, StoreError> {
    let connect = async {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some("recipe-bot".to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok::<_, mongodb::error::Error>(client)
    };

    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(client)) => {
            info!("Connected to MongoDB");
            Ok(client)
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StoreError::Unavailable(format!(
            "connect timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// MongoDB-backed recipe store
#[derive(Clone, Debug)]
pub struct MongoRecipeRepo {
    collection: Collection<Recipe>,
    timeout: Duration,
}

impl MongoRecipeRepo {
    pub fn new(client: &Client, database: &str, collection: &str, timeout: Duration) -> Self {
        Self {
            collection: client.database(database).collection(collection),
            timeout,
        }
    }

    /// Run one store operation under the per-operation timeout
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "{operation} timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl RecipeRepository for MongoRecipeRepo {
    async fn list_all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.bounded("list_all", async {
            let cursor = self.collection.find(doc! {}, None).await?;
            let recipes: Vec<Recipe> = cursor.try_collect().await?;
            debug!(count = recipes.len(), "Listed recipes");
            Ok::<_, StoreError>(recipes)
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Recipe, StoreError> {
        let object_id = parse_object_id(id)?;
        self.bounded("get_by_id", async {
            self.collection
                .find_one(doc! { "_id": object_id }, None)
                .await?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
        .await
    }

    async fn list_distinct_base_ingredients(&self) -> Result<Vec<String>, StoreError> {
        self.bounded("list_distinct_base_ingredients", async {
            let pipeline = vec![
                doc! { "$unwind": "$base_ingredients" },
                doc! { "$group": { "_id": "$base_ingredients" } },
                doc! { "$sort": { "_id": 1 } },
            ];
            let cursor = self.collection.aggregate(pipeline, None).await?;
            let groups: Vec<Document> = cursor.try_collect().await?;

            // Non-string array entries cannot be rendered as buttons, skip them
            let ingredients: Vec<String> = groups
                .iter()
                .filter_map(|group| group.get_str("_id").ok().map(str::to_string))
                .collect();
            debug!(count = ingredients.len(), "Listed distinct base ingredients");
            Ok::<_, StoreError>(ingredients)
        })
        .await
    }

    async fn find_by_ingredients(&self, names: &BTreeSet<String>) -> Result<Vec<Recipe>, StoreError> {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.bounded("find_by_ingredients", async {
            let filter = doc! { "base_ingredients": { "$all": names.clone() } };
            let cursor = self.collection.find(filter, None).await?;
            let recipes: Vec<Recipe> = cursor.try_collect().await?;
            debug!(requested = ?names, matched = recipes.len(), "Searched recipes by ingredients");
            Ok::<_, StoreError>(recipes)
        })
        .await
    }
}

/// In-process recipe store with the same matching rules as the MongoDB one
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecipeRepo {
    recipes: Vec<Recipe>,
}

impl InMemoryRecipeRepo {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepo {
    async fn list_all(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.recipes.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Recipe, StoreError> {
        let object_id = parse_object_id(id)?;
        self.recipes
            .iter()
            .find(|recipe| recipe.id == object_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_distinct_base_ingredients(&self) -> Result<Vec<String>, StoreError> {
        let distinct: BTreeSet<&String> = self
            .recipes
            .iter()
            .flat_map(|recipe| recipe.base_ingredients.iter())
            .collect();
        Ok(distinct.into_iter().cloned().collect())
    }

    async fn find_by_ingredients(&self, names: &BTreeSet<String>) -> Result<Vec<Recipe>, StoreError> {
        Ok(self
            .recipes
            .iter()
            .filter(|recipe| recipe.contains_all(names))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample_repo() -> InMemoryRecipeRepo {
        InMemoryRecipeRepo::new(vec![
            Recipe::new("Omelette").with_base_ingredients(["eggs", "milk"]),
            Recipe::new("Pancakes").with_base_ingredients(["eggs", "flour", "milk"]),
            Recipe::new("Bread").with_base_ingredients(["flour", "water"]),
        ])
    }

    #[tokio::test]
    async fn test_distinct_ingredients_sorted_and_deduplicated() {
        let repo = sample_repo();
        let ingredients = repo.list_distinct_base_ingredients().await.unwrap();
        assert_eq!(ingredients, vec!["eggs", "flour", "milk", "water"]);
    }

    #[tokio::test]
    async fn test_find_by_ingredients_superset() {
        let repo = sample_repo();
        let found = repo.find_by_ingredients(&names(&["eggs", "milk"])).await.unwrap();
        let found: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(found, vec!["Omelette", "Pancakes"]);

        let found = repo.find_by_ingredients(&names(&["water", "eggs"])).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_empty_set_matches_everything() {
        let repo = sample_repo();
        let found = repo.find_by_ingredients(&BTreeSet::new()).await.unwrap();
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_get_by_id_errors() {
        let repo = sample_repo();
        assert_eq!(
            repo.get_by_id("not-hex").await,
            Err(StoreError::InvalidId("not-hex".to_string()))
        );

        let missing = ObjectId::new().to_hex();
        assert_eq!(
            repo.get_by_id(&missing).await,
            Err(StoreError::NotFound(missing.clone()))
        );
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let repo = sample_repo();
        let bread = repo.list_all().await.unwrap().pop().unwrap();
        let found = repo.get_by_id(&bread.id_hex()).await.unwrap();
        assert_eq!(found, bread);
    }
}
