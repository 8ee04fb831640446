//! SQLite-backed cart store.
//!
//! The store owns a single-threaded tokio runtime and exposes the synchronous
//! [`CartStore`] API by blocking on it, so it must not be called from inside
//! another async runtime (use `spawn_blocking` there).
//!
//! Prices and quantities are stored as text and validated on every read; a row
//! that no longer decodes is reported as [`StoreError::Corrupt`] instead of
//! being skipped.

use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::runtime::{Builder, Runtime};

use shopcart_cart::{CartStore, StoreError};
use shopcart_core::{CartLineItem, Entity, ProductId, Quantity, UnitPrice};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS cart_items (
        id          TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL,
        unit_price  TEXT NOT NULL,
        attribute   TEXT NULL,
        image_url   TEXT NULL,
        quantity    TEXT NOT NULL
    )
"#;

const SELECT_COLUMNS: &str = "SELECT id, name, unit_price, attribute, image_url, quantity FROM cart_items";

/// On-device cart store.
#[derive(Debug)]
pub struct SqliteCartStore {
    // Dropped before the runtime that drives it.
    pool: SqlitePool,
    runtime: Runtime,
    location: String,
}

/// Raw row as persisted.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRecord {
    id: String,
    name: String,
    unit_price: String,
    attribute: Option<String>,
    image_url: Option<String>,
    quantity: String,
}

impl CartItemRecord {
    fn into_line_item(self) -> Result<CartLineItem, StoreError> {
        let corrupt = |reason: String| StoreError::corrupt(self.id.as_str(), reason);

        let id = ProductId::new(self.id.as_str()).map_err(|e| corrupt(e.to_string()))?;
        let unit_price = UnitPrice::from_str(&self.unit_price).map_err(|e| corrupt(e.to_string()))?;
        let quantity = Quantity::from_str(&self.quantity).map_err(|e| corrupt(e.to_string()))?;
        let item = CartLineItem::new(id, self.name.as_str(), unit_price, quantity)
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(item
            .with_attribute(self.attribute)
            .with_image_url(self.image_url))
    }
}

fn backend(operation: &'static str, err: sqlx::Error) -> StoreError {
    tracing::error!(operation, error = %err, "SQLite cart store query failed");
    StoreError::backend(format!("{operation}: {err}"))
}

fn setup_failed(err: anyhow::Error) -> StoreError {
    StoreError::backend(format!("{err:#}"))
}

impl SqliteCartStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let opened = (|| -> anyhow::Result<Self> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create cart directory at {parent:?}"))?;
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            Self::connect(
                options,
                SqlitePoolOptions::new().max_connections(4),
                path.display().to_string(),
            )
        })();
        opened.map_err(setup_failed)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn in_memory() -> Result<Self, StoreError> {
        let opened = (|| -> anyhow::Result<Self> {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .context("invalid in-memory SQLite URL")?;
            // Every in-memory connection is a separate database: keep exactly one alive.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
            Self::connect(options, pool, ":memory:".to_owned())
        })();
        opened.map_err(setup_failed)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn connect(
        options: SqliteConnectOptions,
        pool_options: SqlitePoolOptions,
        location: String,
    ) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build runtime for SQLite cart store")?;

        let pool = runtime.block_on(async {
            let pool = pool_options
                .connect_with(options)
                .await
                .with_context(|| format!("failed to open SQLite cart store at {location}"))?;

            sqlx::query(CREATE_TABLE)
                .execute(&pool)
                .await
                .context("failed to create cart_items table")?;

            anyhow::Ok(pool)
        })?;

        tracing::info!(location = %location, "SQLite cart store opened");
        Ok(Self {
            pool,
            runtime,
            location,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl CartStore for SqliteCartStore {
    fn fetch_all(&self) -> Result<Vec<CartLineItem>, StoreError> {
        let records: Vec<CartItemRecord> = self
            .block_on(
                sqlx::query_as::<_, CartItemRecord>(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
                    .fetch_all(&self.pool),
            )
            .map_err(|e| backend("fetch_all", e))?;

        records.into_iter().map(CartItemRecord::into_line_item).collect()
    }

    fn fetch_by_id(&self, id: &ProductId) -> Result<Option<CartLineItem>, StoreError> {
        let record: Option<CartItemRecord> = self
            .block_on(
                sqlx::query_as::<_, CartItemRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                    .bind(id.as_str())
                    .fetch_optional(&self.pool),
            )
            .map_err(|e| backend("fetch_by_id", e))?;

        record.map(CartItemRecord::into_line_item).transpose()
    }

    fn insert(&self, item: CartLineItem) -> Result<(), StoreError> {
        let result = self.block_on(
            sqlx::query(
                r#"
                INSERT INTO cart_items (id, name, unit_price, attribute, image_url, quantity)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(item.id().as_str())
            .bind(item.name())
            .bind(item.unit_price().to_string())
            .bind(item.attribute())
            .bind(item.image_url())
            .bind(item.quantity().to_string())
            .execute(&self.pool),
        );

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(item.id().clone()))
            }
            Err(err) => Err(backend("insert", err)),
        }
    }

    fn update_quantity(&self, id: &ProductId, quantity: Quantity) -> Result<(), StoreError> {
        if quantity.is_zero() {
            return Err(StoreError::Rejected(format!("zero quantity for '{id}'")));
        }

        let done = self
            .block_on(
                sqlx::query("UPDATE cart_items SET quantity = ?1 WHERE id = ?2")
                    .bind(quantity.to_string())
                    .bind(id.as_str())
                    .execute(&self.pool),
            )
            .map_err(|e| backend("update_quantity", e))?;

        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        let done = self
            .block_on(
                sqlx::query("DELETE FROM cart_items WHERE id = ?1")
                    .bind(id.as_str())
                    .execute(&self.pool),
            )
            .map_err(|e| backend("delete", e))?;

        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopcart_cart::{CartStateManager, InMemoryCartStore};

    fn pid(s: &str) -> ProductId {
        ProductId::new(s).unwrap()
    }

    fn item(id: &str, price: &str, quantity: u32) -> CartLineItem {
        CartLineItem::new(
            pid(id),
            format!("Product {id}"),
            price.parse().unwrap(),
            Quantity::new(quantity),
        )
        .unwrap()
    }

    fn insert_raw(store: &SqliteCartStore, id: &str, price: &str, quantity: &str) {
        store
            .block_on(
                sqlx::query(
                    "INSERT INTO cart_items (id, name, unit_price, quantity) VALUES (?1, 'raw', ?2, ?3)",
                )
                .bind(id)
                .bind(price)
                .bind(quantity)
                .execute(&store.pool),
            )
            .unwrap();
    }

    #[test]
    fn insert_then_fetch_keeps_every_field() {
        let store = SqliteCartStore::in_memory().unwrap();
        let stored = item("p1", "12.50", 2)
            .with_attribute(Some("500 ml".into()))
            .with_image_url(Some("https://img/p1.png".into()));

        store.insert(stored.clone()).unwrap();

        assert_eq!(store.fetch_by_id(&pid("p1")).unwrap(), Some(stored.clone()));
        assert_eq!(store.fetch_all().unwrap(), vec![stored]);
    }

    #[test]
    fn price_scale_survives_the_text_encoding() {
        let store = SqliteCartStore::in_memory().unwrap();
        store.insert(item("p1", "0.10", 3)).unwrap();

        let read = store.fetch_by_id(&pid("p1")).unwrap().unwrap();

        assert_eq!(read.line_total().unwrap(), "0.30".parse::<Decimal>().unwrap());
        assert_eq!(read.unit_price().to_string(), "0.10");
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = SqliteCartStore::in_memory().unwrap();
        store.insert(item("p1", "1", 1)).unwrap();

        let err = store.insert(item("p1", "2", 5)).unwrap_err();

        assert_eq!(err, StoreError::Duplicate(pid("p1")));
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn update_quantity_of_missing_row_is_not_found() {
        let store = SqliteCartStore::in_memory().unwrap();

        let err = store.update_quantity(&pid("nope"), Quantity::new(2)).unwrap_err();

        assert_eq!(err, StoreError::NotFound(pid("nope")));
    }

    #[test]
    fn zero_quantity_is_never_written() {
        let store = SqliteCartStore::in_memory().unwrap();
        store.insert(item("p1", "1", 1)).unwrap();

        let err = store.update_quantity(&pid("p1"), Quantity::ZERO).unwrap_err();

        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(store.fetch_by_id(&pid("p1")).unwrap().unwrap().quantity(), Quantity::ONE);
    }

    #[test]
    fn delete_reports_whether_a_row_was_removed() {
        let store = SqliteCartStore::in_memory().unwrap();
        store.insert(item("p1", "1", 1)).unwrap();

        assert!(store.delete(&pid("p1")).unwrap());
        assert!(!store.delete(&pid("p1")).unwrap());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn unparsable_quantity_is_corrupt() {
        let store = SqliteCartStore::in_memory().unwrap();
        insert_raw(&store, "bad", "1.00", "three");

        let err = store.fetch_all().unwrap_err();

        assert!(matches!(err, StoreError::Corrupt { ref id, .. } if id == "bad"));
    }

    #[test]
    fn zero_or_negative_records_are_corrupt() {
        let store = SqliteCartStore::in_memory().unwrap();
        insert_raw(&store, "zero", "1.00", "0");
        insert_raw(&store, "neg", "-4", "1");

        assert!(matches!(store.fetch_by_id(&pid("zero")), Err(StoreError::Corrupt { .. })));
        assert!(matches!(store.fetch_by_id(&pid("neg")), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("shopcart-test-{}", std::process::id()));
        let path = dir.join("nested").join("cart.db");
        let _ = std::fs::remove_file(&path);

        {
            let store = SqliteCartStore::open(&path).unwrap();
            store.insert(item("p1", "3.25", 4)).unwrap();
        }

        let reopened = SqliteCartStore::open(&path).unwrap();
        let items = reopened.fetch_all().unwrap();
        assert_eq!(items, vec![item("p1", "3.25", 4)]);

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn manager_over_sqlite_keeps_total_in_sync() {
        let cart = CartStateManager::new(SqliteCartStore::in_memory().unwrap());
        let candidate = |id: &str, price: &str| {
            shopcart_core::ProductCandidate::new(pid(id), id, price.parse().unwrap())
        };

        cart.add(candidate("p1", "10").with_quantity(Quantity::new(2))).unwrap();
        cart.add(candidate("p2", "5").with_quantity(Quantity::new(3))).unwrap();
        assert_eq!(cart.total().get().amount, Decimal::from(35));

        cart.decrement(&pid("p1")).unwrap();
        cart.update_quantity(&pid("p2"), Quantity::ZERO).unwrap();

        assert_eq!(cart.total().get().amount, Decimal::from(10));
        assert!(!cart.is_in_cart(&pid("p2")).unwrap());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, u32),
            Update(u8, u32),
            Delete(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..4, 1u32..5).prop_map(|(id, q)| Op::Insert(id, q)),
                (0u8..4, 0u32..5).prop_map(|(id, q)| Op::Update(id, q)),
                (0u8..4).prop_map(Op::Delete),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 32,
                .. ProptestConfig::default()
            })]

            /// The SQLite store answers exactly like the in-memory one.
            #[test]
            fn behaves_like_the_in_memory_store(ops in proptest::collection::vec(op(), 0..25)) {
                let sqlite = SqliteCartStore::in_memory().unwrap();
                let memory = InMemoryCartStore::new();

                for op in ops {
                    match op {
                        Op::Insert(n, q) => {
                            let it = item(&format!("p{n}"), "1.5", q);
                            prop_assert_eq!(sqlite.insert(it.clone()), memory.insert(it));
                        }
                        Op::Update(n, q) => {
                            let id = pid(&format!("p{n}"));
                            prop_assert_eq!(
                                sqlite.update_quantity(&id, Quantity::new(q)),
                                memory.update_quantity(&id, Quantity::new(q))
                            );
                        }
                        Op::Delete(n) => {
                            let id = pid(&format!("p{n}"));
                            prop_assert_eq!(sqlite.delete(&id), memory.delete(&id));
                        }
                    }

                    let mut a = sqlite.fetch_all().unwrap();
                    let mut b = memory.fetch_all().unwrap();
                    a.sort_by(|x, y| x.id().cmp(y.id()));
                    b.sort_by(|x, y| x.id().cmp(y.id()));
                    prop_assert_eq!(a, b);
                }
            }
        }
    }
}
