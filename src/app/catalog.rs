//! Read-only access to the server's metadata catalog.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor, Row};

use crate::app::config::AppConfig;
use crate::app::models::{CheckConstraint, EventRow, ForeignKey, Record, Routine, Trigger};
use crate::app::row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    Function,
}

impl RoutineKind {
    /// Value of `INFORMATION_SCHEMA.ROUTINES.ROUTINE_TYPE`.
    pub fn as_sql(self) -> &'static str {
        match self {
            RoutineKind::Procedure => "PROCEDURE",
            RoutineKind::Function => "FUNCTION",
        }
    }
}

/// One method per metadata query. Every schema-scoped method takes the schema
/// explicitly; implementations must not rely on the session's current schema.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    async fn databases(&mut self) -> Result<Vec<String>, sqlx::Error>;

    async fn tables(&mut self, schema: &str) -> Result<Vec<String>, sqlx::Error>;

    /// Column descriptions, one record per column in definition order.
    async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<Record>, sqlx::Error>;

    /// Raw index rows, one per indexed column.
    async fn indexes(&mut self, schema: &str, table: &str) -> Result<Vec<Record>, sqlx::Error>;

    async fn checks(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<CheckConstraint>, sqlx::Error>;

    async fn foreign_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKey>, sqlx::Error>;

    async fn routines(
        &mut self,
        schema: &str,
        kind: RoutineKind,
    ) -> Result<Vec<Routine>, sqlx::Error>;

    async fn events(&mut self, schema: &str) -> Result<Vec<EventRow>, sqlx::Error>;

    async fn triggers(&mut self, schema: &str) -> Result<Vec<Trigger>, sqlx::Error>;
}

/// Backtick-quote an identifier for statements that cannot bind it.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

const CHECKS_SQL: &str = r#"
    SELECT tc.CONSTRAINT_NAME, cc.CHECK_CLAUSE
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS tc
    JOIN INFORMATION_SCHEMA.CHECK_CONSTRAINTS AS cc
      ON tc.CONSTRAINT_CATALOG = cc.CONSTRAINT_CATALOG
      AND tc.CONSTRAINT_SCHEMA = cc.CONSTRAINT_SCHEMA
      AND tc.CONSTRAINT_NAME = cc.CONSTRAINT_NAME
    WHERE tc.CONSTRAINT_TYPE = 'CHECK'
      AND tc.TABLE_NAME = ?
      AND tc.TABLE_SCHEMA = ?
    "#;

const FOREIGN_KEYS_SQL: &str = r#"
    SELECT TABLE_NAME, COLUMN_NAME, CONSTRAINT_NAME,
           REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME
    FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
    WHERE TABLE_SCHEMA = ?
      AND TABLE_NAME = ?
      AND REFERENCED_TABLE_NAME IS NOT NULL
    "#;

const ROUTINES_SQL: &str = r#"
    SELECT ROUTINE_NAME
    FROM INFORMATION_SCHEMA.ROUTINES
    WHERE ROUTINE_SCHEMA = ? AND ROUTINE_TYPE = ?
    "#;

const EVENTS_SQL: &str = r#"
    SELECT EVENT_NAME, LAST_EXECUTED, EVENT_TYPE, EXECUTE_AT,
           INTERVAL_VALUE, INTERVAL_FIELD, STATUS
    FROM INFORMATION_SCHEMA.EVENTS
    WHERE EVENT_SCHEMA = ?
    "#;

const TRIGGERS_SQL: &str = r#"
    SELECT TRIGGER_NAME, EVENT_OBJECT_TABLE, EVENT_MANIPULATION,
           ACTION_TIMING, ACTION_STATEMENT
    FROM INFORMATION_SCHEMA.TRIGGERS
    WHERE TRIGGER_SCHEMA = ?
    "#;

/// [`Catalog`] over a single MySQL/MariaDB connection.
pub struct MySqlCatalog {
    conn: MySqlConnection,
}

impl MySqlCatalog {
    pub async fn connect(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password);
        let conn = MySqlConnection::connect_with(&options).await?;
        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }

    // Unparameterized statements go over the text protocol, which SHOW and
    // DESCRIBE need on servers that refuse to prepare them.
    async fn first_column(&mut self, sql: &str) -> Result<Vec<String>, sqlx::Error> {
        tracing::debug!(sql, "catalog query");
        let rows = (&mut self.conn).fetch_all(sql).await?;
        rows.iter()
            .map(|row| row.try_get_unchecked::<String, _>(0))
            .collect()
    }

    async fn records(&mut self, sql: &str) -> Result<Vec<Record>, sqlx::Error> {
        tracing::debug!(sql, "catalog query");
        let rows = (&mut self.conn).fetch_all(sql).await?;
        rows.iter().map(row::to_record).collect()
    }
}

impl Catalog for MySqlCatalog {
    async fn databases(&mut self) -> Result<Vec<String>, sqlx::Error> {
        self.first_column("SHOW DATABASES").await
    }

    async fn tables(&mut self, schema: &str) -> Result<Vec<String>, sqlx::Error> {
        self.first_column(&format!("SHOW TABLES FROM {}", quote_ident(schema)))
            .await
    }

    async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<Record>, sqlx::Error> {
        self.records(&format!("DESCRIBE {}", qualified(schema, table)))
            .await
    }

    async fn indexes(&mut self, schema: &str, table: &str) -> Result<Vec<Record>, sqlx::Error> {
        self.records(&format!("SHOW INDEX FROM {}", qualified(schema, table)))
            .await
    }

    async fn checks(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<CheckConstraint>, sqlx::Error> {
        tracing::debug!(schema, table, "check constraints");
        sqlx::query_as::<_, CheckConstraint>(CHECKS_SQL)
            .bind(table)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn foreign_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKey>, sqlx::Error> {
        tracing::debug!(schema, table, "foreign keys");
        sqlx::query_as::<_, ForeignKey>(FOREIGN_KEYS_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn routines(
        &mut self,
        schema: &str,
        kind: RoutineKind,
    ) -> Result<Vec<Routine>, sqlx::Error> {
        tracing::debug!(schema, kind = kind.as_sql(), "routines");
        sqlx::query_as::<_, Routine>(ROUTINES_SQL)
            .bind(schema)
            .bind(kind.as_sql())
            .fetch_all(&mut self.conn)
            .await
    }

    async fn events(&mut self, schema: &str) -> Result<Vec<EventRow>, sqlx::Error> {
        tracing::debug!(schema, "events");
        sqlx::query_as::<_, EventRow>(EVENTS_SQL)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
    }

    async fn triggers(&mut self, schema: &str) -> Result<Vec<Trigger>, sqlx::Error> {
        tracing::debug!(schema, "triggers");
        sqlx::query_as::<_, Trigger>(TRIGGERS_SQL)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_backtick_quoted() {
        assert_eq!(quote_ident("orders"), "`orders`");
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
        assert_eq!(qualified("shop", "order items"), "`shop`.`order items`");
    }

    #[test]
    fn foreign_key_query_skips_rows_without_a_referenced_table() {
        assert!(FOREIGN_KEYS_SQL.contains("REFERENCED_TABLE_NAME IS NOT NULL"));
    }

    #[test]
    fn routine_kinds_map_to_catalog_values() {
        assert_eq!(RoutineKind::Procedure.as_sql(), "PROCEDURE");
        assert_eq!(RoutineKind::Function.as_sql(), "FUNCTION");
    }
}
