//! Item Repository
//!
//! Items and their variations are written together in one transaction;
//! a variation row never exists without its item.

use super::{RepoError, RepoResult};
use shared::models::{Item, ItemCreate, ItemUpdate, Variation, VariationInput};
use shared::util;
use sqlx::SqlitePool;

const ITEM_COLUMNS: &str = "id, category_id, uid, name, price, weight, image_url, created_at";

async fn load_variations(pool: &SqlitePool, item_id: i64) -> RepoResult<Vec<Variation>> {
    let variations = sqlx::query_as::<_, Variation>(
        "SELECT id, item_id, name, price, weight, unit FROM variation WHERE item_id = ? ORDER BY id",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;
    Ok(variations)
}

async fn with_variations(pool: &SqlitePool, mut item: Item) -> RepoResult<Item> {
    item.variations = load_variations(pool, item.id).await?;
    Ok(item)
}

pub async fn find_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM item WHERE category_id = ? ORDER BY created_at",
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(with_variations(pool, item).await?);
    }
    Ok(out)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM item WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match item {
        Some(item) => Ok(Some(with_variations(pool, item).await?)),
        None => Ok(None),
    }
}

async fn insert_variations(
    txn: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    item_id: i64,
    variations: &[VariationInput],
) -> RepoResult<()> {
    for variation in variations {
        sqlx::query(
            "INSERT INTO variation (id, item_id, name, price, weight, unit) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(util::snowflake_id())
        .bind(item_id)
        .bind(&variation.name)
        .bind(variation.price)
        .bind(variation.weight)
        .bind(&variation.unit)
        .execute(&mut **txn)
        .await?;
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: ItemCreate) -> RepoResult<Item> {
    let id = util::snowflake_id();

    let mut txn = pool.begin().await?;
    sqlx::query(
        "INSERT INTO item (id, category_id, uid, name, price, weight, image_url, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.category_id)
    .bind(&data.uid)
    .bind(&data.name)
    .bind(data.price)
    .bind(data.weight)
    .bind(&data.image_url)
    .bind(util::now_millis())
    .execute(&mut *txn)
    .await?;
    insert_variations(&mut txn, id, &data.variations).await?;
    txn.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ItemUpdate) -> RepoResult<Item> {
    let mut txn = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE item SET \
         name = COALESCE(?1, name), \
         price = COALESCE(?2, price), \
         weight = COALESCE(?3, weight), \
         image_url = COALESCE(?4, image_url) \
         WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(data.weight)
    .bind(&data.image_url)
    .bind(id)
    .execute(&mut *txn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Item {id} not found")));
    }

    // Some(vec) replaces the whole variation set
    if let Some(variations) = &data.variations {
        sqlx::query("DELETE FROM variation WHERE item_id = ?")
            .bind(id)
            .execute(&mut *txn)
            .await?;
        insert_variations(&mut txn, id, variations).await?;
    }

    txn.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Item {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut txn = pool.begin().await?;
    sqlx::query("DELETE FROM variation WHERE item_id = ?")
        .bind(id)
        .execute(&mut *txn)
        .await?;
    let rows = sqlx::query("DELETE FROM item WHERE id = ?")
        .bind(id)
        .execute(&mut *txn)
        .await?;
    txn.commit().await?;
    Ok(rows.rows_affected() > 0)
}
