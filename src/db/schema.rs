//! Fixed store registry and the SQLite DDL derived from it.
//!
//! Every table the API touches is declared here; nothing else exists. Each store names
//! its domain and sub-kind (used to group search results) and the key column that
//! search matches on.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Engines,
    Generators,
    Spares,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
    }
}

const fn int(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Integer,
    }
}

/// One logical record kind, backed by one table.
#[derive(Debug)]
pub struct StoreDef {
    pub name: &'static str,
    pub domain: Domain,
    /// Sub-kind label inside the domain, e.g. `supply` for `eng_supply`.
    pub kind: &'static str,
    pub key_column: &'static str,
    /// Columns after the implicit `id` and `ts`.
    pub columns: &'static [Column],
}

pub const ID_COLUMN: &str = "id";
pub const TS_COLUMN: &str = "ts";

pub static STORES: &[StoreDef] = &[
    StoreDef {
        name: "eng_supply",
        domain: Domain::Engines,
        kind: "supply",
        key_column: "serial",
        columns: &[
            text("itemName"),
            text("engineType"),
            text("model"),
            text("serial"),
            text("prevSite"),
            text("supDate"),
            text("supplier"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_issue",
        domain: Domain::Engines,
        kind: "issue",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("currSite"),
            text("receiver"),
            text("requester"),
            text("issueDate"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_rehab",
        domain: Domain::Engines,
        kind: "rehab",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("rehabber"),
            text("rehabType"),
            text("rehabDate"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_check",
        domain: Domain::Engines,
        kind: "check",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("inspector"),
            text("desc"),
            text("checkDate"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_upload",
        domain: Domain::Engines,
        kind: "upload",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("rehabUp"),
            text("checkUp"),
            text("rehabUpDate"),
            text("checkUpDate"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_lathe",
        domain: Domain::Engines,
        kind: "lathe",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("lathe"),
            text("latheDate"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_pump",
        domain: Domain::Engines,
        kind: "pump",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("pumpSerial"),
            text("pumpRehab"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "eng_electrical",
        domain: Domain::Engines,
        kind: "electrical",
        key_column: "serial",
        columns: &[
            text("serial"),
            text("etype"),
            text("starter"),
            text("alternator"),
            text("edate"),
        ],
    },
    StoreDef {
        name: "gen_supply",
        domain: Domain::Generators,
        kind: "supply",
        key_column: "code",
        columns: &[
            text("itemName"),
            text("gType"),
            text("model"),
            text("code"),
            text("prevSite"),
            text("supDate"),
            text("supplier"),
            text("vendor"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "gen_issue",
        domain: Domain::Generators,
        kind: "issue",
        key_column: "code",
        columns: &[
            text("itemName"),
            text("code"),
            text("issueDate"),
            text("receiver"),
            text("requester"),
            text("currSite"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "gen_inspect",
        domain: Domain::Generators,
        kind: "inspect",
        key_column: "code",
        columns: &[
            text("code"),
            text("inspector"),
            text("elecRehab"),
            text("rehabDate"),
            text("rehabUp"),
            text("checkUp"),
            text("notes"),
        ],
    },
    StoreDef {
        name: "spares",
        domain: Domain::Spares,
        kind: "spares",
        key_column: "key",
        columns: &[
            text("itemType"),
            text("key"),
            text("model"),
            text("partName"),
            int("qty"),
            text("state"),
            text("notes"),
        ],
    },
];

/// Look up a store by its table name.
pub fn store(name: &str) -> Option<&'static StoreDef> {
    STORES.iter().find(|s| s.name == name)
}

/// Quote an identifier for SQLite.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl StoreDef {
    pub fn has_column(&self, name: &str) -> bool {
        name == ID_COLUMN || name == TS_COLUMN || self.columns.iter().any(|c| c.name == name)
    }

    pub fn create_table_sql(&self) -> String {
        let mut cols = vec![
            format!("{} TEXT PRIMARY KEY", quote_ident(ID_COLUMN)),
            format!("{} INTEGER", quote_ident(TS_COLUMN)),
        ];
        cols.extend(
            self.columns
                .iter()
                .map(|c| format!("{} {}", quote_ident(c.name), c.ty.sql())),
        );
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(self.name),
            cols.join(", ")
        )
    }

    pub fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({})",
            quote_ident(&format!("idx_{}_{}", self.name, self.key_column)),
            quote_ident(self.name),
            quote_ident(self.key_column)
        )
    }
}

/// All DDL statements, tables first then key-column indexes.
pub fn init_statements() -> Vec<String> {
    STORES
        .iter()
        .map(StoreDef::create_table_sql)
        .chain(STORES.iter().map(StoreDef::create_index_sql))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_has_twelve_unique_stores() {
        assert_eq!(STORES.len(), 12);
        let names: HashSet<_> = STORES.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), STORES.len());
    }

    #[test]
    fn key_column_belongs_to_every_store() {
        for s in STORES {
            assert!(s.has_column(s.key_column), "{} lacks {}", s.name, s.key_column);
            let expected = match s.domain {
                Domain::Engines => "serial",
                Domain::Generators => "code",
                Domain::Spares => "key",
            };
            assert_eq!(s.key_column, expected);
        }
    }

    #[test]
    fn domain_sizes() {
        let count = |d| STORES.iter().filter(|s| s.domain == d).count();
        assert_eq!(count(Domain::Engines), 8);
        assert_eq!(count(Domain::Generators), 3);
        assert_eq!(count(Domain::Spares), 1);
    }

    #[test]
    fn ddl_quotes_keyword_columns() {
        let spares = store("spares").unwrap();
        let ddl = spares.create_table_sql();
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"spares\""));
        assert!(ddl.contains("\"key\" TEXT"));
        assert!(ddl.contains("\"qty\" INTEGER"));
        assert_eq!(
            spares.create_index_sql(),
            "CREATE INDEX IF NOT EXISTS \"idx_spares_key\" ON \"spares\"(\"key\")"
        );
        assert!(store("eng_check").unwrap().create_table_sql().contains("\"desc\" TEXT"));
    }

    #[test]
    fn has_column_includes_implicit_columns() {
        let s = store("eng_pump").unwrap();
        assert!(s.has_column("id"));
        assert!(s.has_column("ts"));
        assert!(s.has_column("pumpSerial"));
        assert!(!s.has_column("pumpserial"));
        assert!(store("eng_nope").is_none());
    }

    #[test]
    fn init_statements_cover_tables_and_indexes() {
        let stmts = init_statements();
        assert_eq!(stmts.len(), STORES.len() * 2);
        assert!(stmts[..12].iter().all(|s| s.starts_with("CREATE TABLE")));
        assert!(stmts[12..].iter().all(|s| s.starts_with("CREATE INDEX")));
    }
}
