/// Row Mapping Module
///
/// Converts SQLite rows into flat records keyed by fixed lowercase names.
/// Each relation declares a static table of `Field`s (column name to output
/// key); a single `RecordMapper` walks that table for every row, so the
/// shape of a record is defined in exactly one place per relation.

use rusqlite::{types::ValueRef, Connection, Params, Row};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One column of a relation and the key it is exposed under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub column: &'static str,
    pub key: &'static str,
}

impl Field {
    pub const fn new(column: &'static str, key: &'static str) -> Self {
        Field { column, key }
    }
}

/// A mapped row: ordered keys with textual values, `None` for SQL NULL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(&'static str, Option<String>)>,
}

impl Record {
    /// Returns the value stored under `key`, or `None` if the key is absent
    /// or the column was NULL.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Returns true if the record has a slot named `key`, NULL or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| *k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Table-driven mapper from rows of one relation to records.
#[derive(Debug, Clone, Copy)]
pub struct RecordMapper {
    table: &'static str,
    fields: &'static [Field],
}

impl RecordMapper {
    pub const fn new(table: &'static str, fields: &'static [Field]) -> Self {
        RecordMapper { table, fields }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// Builds `SELECT <mapped columns> FROM <table>`.
    ///
    /// Only the static column table goes into the statement text; callers
    /// append predicates with bound parameters.
    pub fn select(&self) -> String {
        let columns: Vec<&str> = self.fields.iter().map(|f| f.column).collect();
        format!("SELECT {} FROM {}", columns.join(", "), self.table)
    }

    /// Runs `SELECT <mapped columns> FROM <table> <clause>` and maps every
    /// row. `clause` holds the predicates and ordering, with values bound
    /// through `params`.
    pub fn query<P: Params>(
        &self,
        conn: &Connection,
        clause: &str,
        params: P,
    ) -> rusqlite::Result<Vec<Record>> {
        let sql = format!("{} {}", self.select(), clause);
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params, |row| self.map_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Maps one row, looking columns up by name.
    pub fn map_row(&self, row: &Row) -> rusqlite::Result<Record> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let value = row.get_ref(field.column)?;
            fields.push((field.key, value_to_text(value)));
        }
        Ok(Record { fields })
    }
}

/// Renders a SQLite value as text; NULL becomes `None`.
fn value_to_text(value: ValueRef) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GADGET_FIELDS: &[Field] = &[
        Field::new("gadgetID", "gadgetid"),
        Field::new("gadgetName", "name"),
        Field::new("weight", "weight"),
        Field::new("note", "note"),
    ];
    const GADGETS: RecordMapper = RecordMapper::new("Gadgets", GADGET_FIELDS);

    fn gadget_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Gadgets (gadgetID INTEGER PRIMARY KEY, gadgetName TEXT, weight REAL, note TEXT);
             INSERT INTO Gadgets (gadgetID, gadgetName, weight, note) VALUES (7, 'lamp', 1.5, NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_select_lists_mapped_columns() {
        assert_eq!(
            GADGETS.select(),
            "SELECT gadgetID, gadgetName, weight, note FROM Gadgets"
        );
    }

    #[test]
    fn test_map_row_renders_values_as_text() {
        let conn = gadget_db();
        let record = conn
            .query_row(&GADGETS.select(), [], |row| GADGETS.map_row(row))
            .unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("gadgetid"), Some("7"));
        assert_eq!(record.get("name"), Some("lamp"));
        assert_eq!(record.get("weight"), Some("1.5"));
        assert_eq!(record.get("note"), None);
        assert!(record.contains_key("note"));
        assert!(!record.contains_key("gadgetName"));
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["gadgetid", "name", "weight", "note"]
        );
    }

    #[test]
    fn test_record_serializes_in_declaration_order() {
        let conn = gadget_db();
        let record = conn
            .query_row(&GADGETS.select(), [], |row| GADGETS.map_row(row))
            .unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"gadgetid":"7","name":"lamp","weight":"1.5","note":null}"#
        );
    }

    #[test]
    fn test_query_binds_clause_parameters() {
        let conn = gadget_db();
        conn.execute(
            "INSERT INTO Gadgets (gadgetID, gadgetName, weight) VALUES (3, 'kettle', 0.9)",
            [],
        )
        .unwrap();

        let all = GADGETS.query(&conn, "ORDER BY gadgetID", []).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get("name"), Some("kettle"));

        let lamps = GADGETS
            .query(&conn, "WHERE gadgetName = ?1", ["lamp'; DROP TABLE Gadgets; --"])
            .unwrap();
        assert!(lamps.is_empty());
        assert_eq!(GADGETS.query(&conn, "WHERE gadgetName = ?1", ["lamp"]).unwrap().len(), 1);
    }

    #[test]
    fn test_map_row_unknown_column_fails() {
        const BROKEN: RecordMapper =
            RecordMapper::new("Gadgets", &[Field::new("missing", "missing")]);
        let conn = gadget_db();
        let result = conn.query_row("SELECT gadgetID FROM Gadgets", [], |row| BROKEN.map_row(row));
        assert!(result.is_err());
    }
}
