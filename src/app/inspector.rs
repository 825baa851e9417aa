use crate::app::catalog::{Catalog, MySqlCatalog, RoutineKind};
use crate::app::config::AppConfig;
use crate::app::error::{ExtractError, Result};
use crate::app::models::{
    CheckConstraint, Event, ForeignKey, Record, Routine, SchemaDocument, SchemaSection, TableMap,
    Trigger,
};

// It handles all database interaction for one schema.

pub struct Inspector<C> {
    catalog: C,
    host: String,
    schema: String,
}

impl Inspector<MySqlCatalog> {
    /// Opens the single connection the inspector holds for its lifetime.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        tracing::info!(host = %config.host, port = config.port, user = %config.user, "connecting");
        let catalog = MySqlCatalog::connect(config)
            .await
            .map_err(ExtractError::Connection)?;
        Ok(Self::new(catalog, &config.host, &config.schema))
    }

    pub async fn close(self) -> Result<()> {
        self.catalog
            .close()
            .await
            .map_err(ExtractError::query("closing connection"))
    }
}

impl<C: Catalog> Inspector<C> {
    pub fn new(catalog: C, host: &str, schema: &str) -> Self {
        Self {
            catalog,
            host: host.to_string(),
            schema: schema.to_string(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub async fn get_databases(&mut self) -> Result<Vec<String>> {
        self.catalog
            .databases()
            .await
            .map_err(ExtractError::query("listing databases"))
    }

    pub async fn get_tables(&mut self) -> Result<Vec<String>> {
        self.catalog
            .tables(&self.schema)
            .await
            .map_err(ExtractError::query("listing tables"))
    }

    pub async fn get_table(&mut self, table: &str) -> Result<Vec<Record>> {
        self.catalog
            .columns(&self.schema, table)
            .await
            .map_err(ExtractError::query("describing table"))
    }

    pub async fn get_checks(&mut self, table: &str) -> Result<Vec<CheckConstraint>> {
        self.catalog
            .checks(&self.schema, table)
            .await
            .map_err(ExtractError::query("reading check constraints"))
    }

    pub async fn get_indexes(&mut self, table: &str) -> Result<Vec<Record>> {
        self.catalog
            .indexes(&self.schema, table)
            .await
            .map_err(ExtractError::query("reading indexes"))
    }

    pub async fn get_procedures(&mut self) -> Result<Vec<Routine>> {
        self.catalog
            .routines(&self.schema, RoutineKind::Procedure)
            .await
            .map_err(ExtractError::query("reading procedures"))
    }

    pub async fn get_functions(&mut self) -> Result<Vec<Routine>> {
        self.catalog
            .routines(&self.schema, RoutineKind::Function)
            .await
            .map_err(ExtractError::query("reading functions"))
    }

    /// Events with `LAST_EXECUTED` and `EXECUTE_AT` rendered as text.
    pub async fn get_events(&mut self) -> Result<Vec<Event>> {
        let rows = self
            .catalog
            .events(&self.schema)
            .await
            .map_err(ExtractError::query("reading events"))?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn get_triggers(&mut self) -> Result<Vec<Trigger>> {
        self.catalog
            .triggers(&self.schema)
            .await
            .map_err(ExtractError::query("reading triggers"))
    }

    pub async fn get_foreign_keys(&mut self, table: &str) -> Result<Vec<ForeignKey>> {
        self.catalog
            .foreign_keys(&self.schema, table)
            .await
            .map_err(ExtractError::query("reading foreign keys"))
    }

    /// Extracts the whole schema. Fails with [`ExtractError::EmptySchema`] when
    /// the schema has no tables; any query failure aborts the extraction.
    pub async fn get_scheme(&mut self) -> Result<SchemaDocument> {
        let tables = self.get_tables().await?;
        if tables.is_empty() {
            return Err(ExtractError::EmptySchema {
                schema: self.schema.clone(),
            });
        }
        tracing::info!(schema = %self.schema, tables = tables.len(), "extracting schema");

        let mut described: TableMap<Record> = TableMap::with_capacity(tables.len());
        let mut indices: TableMap<Record> = TableMap::with_capacity(tables.len());
        let mut foreign_keys: TableMap<ForeignKey> = TableMap::with_capacity(tables.len());
        let mut checks: TableMap<CheckConstraint> = TableMap::with_capacity(tables.len());

        for table in tables {
            described.insert(table.clone(), self.get_table(&table).await?);
            indices.insert(table.clone(), self.get_indexes(&table).await?);
            foreign_keys.insert(table.clone(), self.get_foreign_keys(&table).await?);
            checks.insert(table.clone(), self.get_checks(&table).await?);
        }

        let section = SchemaSection {
            tables: described,
            indices,
            events: self.get_events().await?,
            triggers: self.get_triggers().await?,
            procedures: self.get_procedures().await?,
            functions: self.get_functions().await?,
            foreign_keys,
            checks,
        };
        tracing::info!(
            schema = %self.schema,
            events = section.events.len(),
            triggers = section.triggers.len(),
            procedures = section.procedures.len(),
            functions = section.functions.len(),
            "schema extracted"
        );

        Ok(SchemaDocument {
            host: self.host.clone(),
            schema: self.schema.clone(),
            section,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::EventRow;
    use serde_json::json;
    use std::collections::HashMap;

    /// In-memory catalog. Tables missing from a map have no such metadata.
    #[derive(Default)]
    struct FakeCatalog {
        tables: Vec<String>,
        columns: HashMap<String, Vec<Record>>,
        indexes: HashMap<String, Vec<Record>>,
        checks: HashMap<String, Vec<CheckConstraint>>,
        foreign_keys: HashMap<String, Vec<ForeignKey>>,
        procedures: Vec<Routine>,
        functions: Vec<Routine>,
        events: Vec<EventRow>,
        triggers: Vec<Trigger>,
        fail_indexes_of: Option<String>,
        schemas_seen: Vec<String>,
    }

    impl FakeCatalog {
        fn with_tables(names: &[&str]) -> Self {
            Self {
                tables: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl Catalog for FakeCatalog {
        async fn databases(&mut self) -> Result<Vec<String>, sqlx::Error> {
            Ok(vec!["information_schema".into(), "shop".into()])
        }

        async fn tables(&mut self, schema: &str) -> Result<Vec<String>, sqlx::Error> {
            self.schemas_seen.push(schema.to_string());
            Ok(self.tables.clone())
        }

        async fn columns(&mut self, schema: &str, table: &str) -> Result<Vec<Record>, sqlx::Error> {
            self.schemas_seen.push(schema.to_string());
            Ok(self.columns.get(table).cloned().unwrap_or_default())
        }

        async fn indexes(&mut self, schema: &str, table: &str) -> Result<Vec<Record>, sqlx::Error> {
            self.schemas_seen.push(schema.to_string());
            if self.fail_indexes_of.as_deref() == Some(table) {
                return Err(sqlx::Error::Protocol("connection lost".into()));
            }
            Ok(self.indexes.get(table).cloned().unwrap_or_default())
        }

        async fn checks(
            &mut self,
            _schema: &str,
            table: &str,
        ) -> Result<Vec<CheckConstraint>, sqlx::Error> {
            Ok(self.checks.get(table).cloned().unwrap_or_default())
        }

        async fn foreign_keys(
            &mut self,
            _schema: &str,
            table: &str,
        ) -> Result<Vec<ForeignKey>, sqlx::Error> {
            Ok(self.foreign_keys.get(table).cloned().unwrap_or_default())
        }

        async fn routines(
            &mut self,
            _schema: &str,
            kind: RoutineKind,
        ) -> Result<Vec<Routine>, sqlx::Error> {
            Ok(match kind {
                RoutineKind::Procedure => self.procedures.clone(),
                RoutineKind::Function => self.functions.clone(),
            })
        }

        async fn events(&mut self, _schema: &str) -> Result<Vec<EventRow>, sqlx::Error> {
            Ok(self.events.clone())
        }

        async fn triggers(&mut self, _schema: &str) -> Result<Vec<Trigger>, sqlx::Error> {
            Ok(self.triggers.clone())
        }
    }

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn keys<T>(map: &TableMap<T>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn empty_schema_is_a_distinct_error() {
        let mut inspector = Inspector::new(FakeCatalog::default(), "db1", "empty");
        let err = inspector.get_scheme().await.unwrap_err();
        assert!(
            matches!(&err, ExtractError::EmptySchema { schema } if schema == "empty"),
            "{err:?}"
        );
        assert_eq!(err.to_string(), "No tables found in schema `empty`");
    }

    #[tokio::test]
    async fn per_table_maps_follow_the_table_list() {
        let mut catalog = FakeCatalog::with_tables(&["orders", "customers", "audit"]);
        catalog.columns.insert(
            "orders".into(),
            vec![record(json!({"Field": "id", "Type": "int", "Null": "NO", "Key": "PRI", "Default": null, "Extra": "auto_increment"}))],
        );
        let mut inspector = Inspector::new(catalog, "db1", "shop");

        let doc = inspector.get_scheme().await.unwrap();
        let expected = vec!["orders", "customers", "audit"];
        assert_eq!(keys(&doc.section.tables), expected);
        assert_eq!(keys(&doc.section.indices), expected);
        assert_eq!(keys(&doc.section.foreign_keys), expected);
        assert_eq!(keys(&doc.section.checks), expected);
    }

    #[tokio::test]
    async fn every_query_targets_the_configured_schema() {
        let mut inspector =
            Inspector::new(FakeCatalog::with_tables(&["orders", "customers"]), "db1", "shop");
        inspector.get_scheme().await.unwrap();
        assert!(!inspector.catalog.schemas_seen.is_empty());
        assert!(inspector.catalog.schemas_seen.iter().all(|s| s == "shop"));
    }

    #[tokio::test]
    async fn missing_metadata_yields_empty_sequences() {
        let mut inspector = Inspector::new(FakeCatalog::with_tables(&["orders"]), "db1", "shop");
        assert!(inspector.get_checks("orders").await.unwrap().is_empty());
        assert!(inspector.get_foreign_keys("orders").await.unwrap().is_empty());
        assert!(inspector.get_indexes("orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shop_without_routines_serializes_empty_arrays() {
        let mut inspector =
            Inspector::new(FakeCatalog::with_tables(&["orders", "customers"]), "db1", "shop");
        let doc = inspector.get_scheme().await.unwrap();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["Host"], "db1");
        let shop = &value["shop"];
        for key in ["Procedures", "Functions", "Triggers", "Events"] {
            assert_eq!(shop[key], json!([]), "{key}");
        }
        assert_eq!(shop["Tables"], json!({"orders": [], "customers": []}));
        assert_eq!(shop["indices"], json!({"orders": [], "customers": []}));
    }

    #[tokio::test]
    async fn check_clause_is_kept_verbatim() {
        let mut catalog = FakeCatalog::with_tables(&["orders", "customers"]);
        catalog.checks.insert(
            "orders".into(),
            vec![CheckConstraint {
                constraint_name: "orders_chk_1".into(),
                check_clause: "(`quantity` > 0)".into(),
            }],
        );
        let mut inspector = Inspector::new(catalog, "db1", "shop");
        let value = serde_json::to_value(inspector.get_scheme().await.unwrap()).unwrap();

        assert_eq!(
            value["shop"]["Checks"]["orders"],
            json!([{"CONSTRAINT_NAME": "orders_chk_1", "CHECK_CLAUSE": "(`quantity` > 0)"}])
        );
        assert_eq!(value["shop"]["Checks"]["customers"], json!([]));
    }

    #[tokio::test]
    async fn events_always_carry_textual_timestamps() {
        let mut catalog = FakeCatalog::with_tables(&["orders"]);
        catalog.events.push(EventRow {
            event_name: "nightly_purge".into(),
            last_executed: None,
            event_type: "RECURRING".into(),
            execute_at: None,
            interval_value: Some("1".into()),
            interval_field: Some("DAY".into()),
            status: "ENABLED".into(),
        });
        let mut inspector = Inspector::new(catalog, "db1", "shop");
        let value = serde_json::to_value(inspector.get_scheme().await.unwrap()).unwrap();

        let event = &value["shop"]["Events"][0];
        assert_eq!(event["LAST_EXECUTED"], "None");
        assert_eq!(event["EXECUTE_AT"], "None");
        assert_eq!(event["INTERVAL_FIELD"], "DAY");
    }

    #[tokio::test]
    async fn extraction_is_repeatable() {
        let build = || {
            let mut catalog = FakeCatalog::with_tables(&["orders", "customers"]);
            catalog.foreign_keys.insert(
                "orders".into(),
                vec![ForeignKey {
                    table_name: "orders".into(),
                    column_name: "customer_id".into(),
                    constraint_name: "fk_orders_customer".into(),
                    referenced_table_name: "customers".into(),
                    referenced_column_name: "id".into(),
                }],
            );
            catalog.procedures.push(Routine {
                routine_name: "restock".into(),
            });
            catalog
        };

        let mut first = Inspector::new(build(), "db1", "shop");
        let mut second = Inspector::new(build(), "db1", "shop");
        let a = serde_json::to_string(&first.get_scheme().await.unwrap()).unwrap();
        let b = serde_json::to_string(&second.get_scheme().await.unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn query_failure_aborts_without_a_document() {
        let mut catalog = FakeCatalog::with_tables(&["orders", "customers"]);
        catalog.fail_indexes_of = Some("customers".into());
        let mut inspector = Inspector::new(catalog, "db1", "shop");

        let err = inspector.get_scheme().await.unwrap_err();
        assert!(
            matches!(err, ExtractError::Query { operation: "reading indexes", .. }),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn databases_are_listed() {
        let mut inspector = Inspector::new(FakeCatalog::default(), "db1", "");
        assert_eq!(
            inspector.get_databases().await.unwrap(),
            vec!["information_schema", "shop"]
        );
    }
}
