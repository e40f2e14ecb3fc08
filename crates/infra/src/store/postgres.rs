//! Postgres-backed identity/ledger store.
//!
//! Per-account exclusion is delegated to row locks: every balance mutation
//! runs in a transaction that first takes `SELECT ... FOR UPDATE` on the rows
//! it will write. Transfers lock both rows in one statement ordered by id, so
//! two opposing transfers always contend on the same first row.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) on `accounts.username` | `23505` | `UsernameTaken` |
//! | Database (any other) | any | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |
//!
//! The `balance >= 0` CHECK constraint is a backstop only; balances are
//! validated with [`coinshop_ledger::apply_delta`] before any UPDATE is issued.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use async_trait::async_trait;
use coinshop_core::{AccountId, Coins, CredentialHash, TransferId, Username};
use coinshop_ledger::{Account, InventoryEntry, TransferRecord, apply_delta, credit, debit};

use super::r#trait::{AccountStore, StoreError};

/// Idempotent schema, applied by [`PostgresAccountStore::migrate`].
pub const SCHEMA: &str = include_str!("../../migrations/0001_ledger.sql");

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }

    async fn lock_balance(
        tx: &mut Transaction<'static, Postgres>,
        id: AccountId,
    ) -> Result<Coins, StoreError> {
        let row = sqlx::query("SELECT balance FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock_balance", e))?
            .ok_or(StoreError::AccountNotFound(id))?;
        balance_from_row(&row)
    }

    async fn write_balance(
        tx: &mut Transaction<'static, Postgres>,
        id: AccountId,
        balance: Coins,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET balance = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(balance.get())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("write_balance", e))?;
        Ok(())
    }

    async fn history(
        &self,
        column: &'static str,
        id: AccountId,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let sql = format!(
            "SELECT id, from_account_id, to_account_id, amount, created_at \
             FROM transfers WHERE {column} = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("history", e))?;

        rows.iter()
            .map(|row| {
                TransferRow::from_row(row)
                    .map_err(|e| map_sqlx_error("decode_transfer", e))?
                    .try_into()
            })
            .collect()
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, account), fields(username = %account.username), err)]
    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO accounts (id, username, credential_hash, balance, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            RETURNING created_at
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.username.as_str())
        .bind(account.credential_hash.as_str())
        .bind(account.balance.get())
        .bind(account.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        match inserted {
            Some(row) => Ok(Account {
                created_at: stored_timestamp(&row, "decode_account")?,
                ..account
            }),
            None => Err(StoreError::UsernameTaken(account.username.as_str().to_owned())),
        }
    }

    #[instrument(skip(self), fields(username = %username), err)]
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, credential_hash, balance, created_at \
             FROM accounts WHERE username = $1",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_username", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, credential_hash, balance, created_at \
             FROM accounts WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn adjust_balance(&self, id: AccountId, delta: i64) -> Result<Coins, StoreError> {
        let mut tx = self.begin().await?;
        let current = Self::lock_balance(&mut tx, id).await?;
        let next = apply_delta(current, delta)?;
        Self::write_balance(&mut tx, id, next).await?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(next)
    }

    #[instrument(skip(self), fields(from = %from, to = %to, amount = %amount), err)]
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<TransferRecord, StoreError> {
        if from == to {
            return Err(StoreError::SameAccount(from));
        }
        let mut tx = self.begin().await?;

        let rows = sqlx::query(
            "SELECT id, balance FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![*from.as_uuid(), *to.as_uuid()])
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_transfer_pair", e))?;

        let mut sender_balance = None;
        let mut receiver_balance = None;
        for row in &rows {
            let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_balance", e))?;
            let balance = balance_from_row(row)?;
            if id == *from.as_uuid() {
                sender_balance = Some(balance);
            } else if id == *to.as_uuid() {
                receiver_balance = Some(balance);
            }
        }
        // Dropping `tx` rolls back on every early return below.
        let sender_balance = sender_balance.ok_or(StoreError::AccountNotFound(from))?;
        let receiver_balance = receiver_balance.ok_or(StoreError::AccountNotFound(to))?;

        let debited = debit(sender_balance, amount)?;
        let credited = credit(receiver_balance, amount).map_err(|e| StoreError::CreditFailed {
            account: to,
            amount,
            reason: e.to_string(),
        })?;

        Self::write_balance(&mut tx, from, debited).await?;
        Self::write_balance(&mut tx, to, credited).await.map_err(|e| StoreError::CreditFailed {
            account: to,
            amount,
            reason: e.to_string(),
        })?;

        let mut record = TransferRecord::new(from, to, amount, Utc::now());
        // TIMESTAMPTZ keeps microseconds; hand back what was stored.
        let row = sqlx::query(
            r#"
            INSERT INTO transfers (id, from_account_id, to_account_id, amount, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING created_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.from.as_uuid())
        .bind(record.to.as_uuid())
        .bind(record.amount.get())
        .bind(record.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("record_transfer", e))?;
        record.created_at = stored_timestamp(&row, "decode_transfer")?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(record)
    }

    #[instrument(skip(self), fields(account_id = %id, item = %item_name, price = %price), err)]
    async fn purchase(
        &self,
        id: AccountId,
        item_name: &str,
        price: Coins,
    ) -> Result<InventoryEntry, StoreError> {
        let mut tx = self.begin().await?;
        let current = Self::lock_balance(&mut tx, id).await?;
        let next = debit(current, price)?;
        Self::write_balance(&mut tx, id, next).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO inventory (account_id, item_name, quantity, created_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (account_id, item_name)
            DO UPDATE SET quantity = inventory.quantity + 1
            RETURNING account_id, item_name, quantity, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(item_name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_inventory", e))?;
        let entry = inventory_from_row(&row)?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(entry)
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn inventory(&self, id: AccountId) -> Result<Vec<InventoryEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, item_name, quantity, created_at
            FROM inventory
            WHERE account_id = $1
            ORDER BY item_name ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("inventory", e))?;

        rows.iter().map(inventory_from_row).collect()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn received_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError> {
        self.history("to_account_id", id).await
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn sent_transfers(&self, id: AccountId) -> Result<Vec<TransferRecord>, StoreError> {
        self.history("from_account_id", id).await
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match (db_err.code().as_deref(), db_err.constraint()) {
                (Some("23505"), Some("accounts_username_key")) => {
                    StoreError::UsernameTaken(msg)
                }
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("corrupt {what} row: {detail}"))
}

fn stored_timestamp(row: &PgRow, operation: &str) -> Result<DateTime<Utc>, StoreError> {
    row.try_get("created_at").map_err(|e| map_sqlx_error(operation, e))
}

fn balance_from_row(row: &PgRow) -> Result<Coins, StoreError> {
    let raw: i64 = row
        .try_get("balance")
        .map_err(|e| map_sqlx_error("decode_balance", e))?;
    Coins::new(raw).map_err(|e| corrupt("account", e))
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let decode = |e| map_sqlx_error("decode_account", e);
    let id: Uuid = row.try_get("id").map_err(decode)?;
    let username: String = row.try_get("username").map_err(decode)?;
    let credential_hash: String = row.try_get("credential_hash").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;

    Ok(Account {
        id: AccountId::from_uuid(id),
        username: Username::parse(&username).map_err(|e| corrupt("account", e))?,
        credential_hash: CredentialHash::new(credential_hash),
        balance: balance_from_row(row)?,
        created_at,
    })
}

fn inventory_from_row(row: &PgRow) -> Result<InventoryEntry, StoreError> {
    let decode = |e| map_sqlx_error("decode_inventory", e);
    let account_id: Uuid = row.try_get("account_id").map_err(decode)?;
    let quantity: i32 = row.try_get("quantity").map_err(decode)?;

    Ok(InventoryEntry {
        account_id: AccountId::from_uuid(account_id),
        item_name: row.try_get("item_name").map_err(decode)?,
        quantity: u32::try_from(quantity).map_err(|e| corrupt("inventory", e))?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

struct TransferRow {
    id: Uuid,
    from_account_id: Uuid,
    to_account_id: Uuid,
    amount: i64,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for TransferRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TransferRow {
            id: row.try_get("id")?,
            from_account_id: row.try_get("from_account_id")?,
            to_account_id: row.try_get("to_account_id")?,
            amount: row.try_get("amount")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<TransferRow> for TransferRecord {
    type Error = StoreError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        Ok(TransferRecord {
            id: TransferId::from_uuid(row.id),
            from: AccountId::from_uuid(row.from_account_id),
            to: AccountId::from_uuid(row.to_account_id),
            amount: Coins::new(row.amount).map_err(|e| corrupt("transfer", e))?,
            created_at: row.created_at,
        })
    }
}
