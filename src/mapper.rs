//! Row <-> domain mapping shared by every entity.
//!
//! Store rows arrive as JSON objects keyed by column name (`first_name`),
//! domain types serialize with camelCase properties (`firstName`). Each entity
//! declares one [`FieldTable`]; the same two functions map in both directions.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single persisted record, keyed by column name.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub column: &'static str,
    pub property: &'static str,
}

pub const fn field(column: &'static str, property: &'static str) -> Field {
    Field { column, property }
}

/// Column/property pairs for one table.
#[derive(Debug)]
pub struct FieldTable {
    pub entity: &'static str,
    pub table: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("{entity} row is missing column `{column}`")]
    MissingColumn {
        entity: &'static str,
        column: &'static str,
    },
    #[error("{entity} has no column for property `{property}`")]
    UnknownProperty {
        entity: &'static str,
        property: String,
    },
    #[error("{entity} did not serialize to an object")]
    NotAnObject { entity: &'static str },
    #[error("{entity} value is malformed: {source}")]
    Malformed {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FieldTable {
    /// Comma separated column list, in declaration order.
    pub fn columns(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Maps a store row to a domain value. Columns outside the table are ignored.
    pub fn from_row<T: DeserializeOwned>(&self, mut row: Row) -> Result<T, MapError> {
        let mut object = Map::with_capacity(self.fields.len());
        for f in self.fields {
            let value = row.remove(f.column).ok_or(MapError::MissingColumn {
                entity: self.entity,
                column: f.column,
            })?;
            object.insert(f.property.to_string(), value);
        }
        serde_json::from_value(Value::Object(object)).map_err(|source| MapError::Malformed {
            entity: self.entity,
            source,
        })
    }

    /// Maps a domain value (or a subset of its properties) to a store row.
    pub fn to_row<T: Serialize>(&self, value: &T) -> Result<Row, MapError> {
        let object = match serde_json::to_value(value) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(MapError::NotAnObject { entity: self.entity }),
            Err(source) => {
                return Err(MapError::Malformed {
                    entity: self.entity,
                    source,
                })
            }
        };

        let mut row = Row::with_capacity(object.len());
        for (property, value) in object {
            let f = self
                .fields
                .iter()
                .find(|f| f.property == property)
                .ok_or_else(|| MapError::UnknownProperty {
                    entity: self.entity,
                    property: property.clone(),
                })?;
            row.insert(f.column.to_string(), value);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    static WIDGET: FieldTable = FieldTable {
        entity: "widget",
        table: "widgets",
        fields: &[
            field("id", "id"),
            field("display_name", "displayName"),
            field("is_active", "isActive"),
        ],
    };

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Widget {
        id: String,
        display_name: String,
        is_active: bool,
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn from_row_renames_columns_and_ignores_extras() {
        let widget: Widget = WIDGET
            .from_row(row(json!({
                "id": "w-1",
                "display_name": "Gadget",
                "is_active": true,
                "internal_flag": 7
            })))
            .expect("row should map");

        assert_eq!(
            widget,
            Widget {
                id: "w-1".into(),
                display_name: "Gadget".into(),
                is_active: true,
            }
        );
    }

    #[test]
    fn from_row_reports_missing_column() {
        let err = WIDGET
            .from_row::<Widget>(row(json!({ "id": "w-1", "is_active": false })))
            .unwrap_err();
        assert!(matches!(
            err,
            MapError::MissingColumn {
                column: "display_name",
                ..
            }
        ));
    }

    #[test]
    fn to_row_is_the_inverse_of_from_row() {
        let original = Widget {
            id: "w-2".into(),
            display_name: "Sprocket".into(),
            is_active: false,
        };
        let mapped = WIDGET.to_row(&original).expect("to_row");
        assert_eq!(mapped.get("display_name"), Some(&json!("Sprocket")));
        assert!(mapped.get("displayName").is_none());

        let back: Widget = WIDGET.from_row(mapped).expect("from_row");
        assert_eq!(back, original);
    }

    #[test]
    fn to_row_rejects_undeclared_properties() {
        let err = WIDGET
            .to_row(&json!({ "id": "w-3", "colour": "red" }))
            .unwrap_err();
        assert!(matches!(err, MapError::UnknownProperty { ref property, .. } if property == "colour"));
    }

    #[test]
    fn columns_follow_declaration_order() {
        assert_eq!(WIDGET.columns(), "id, display_name, is_active");
    }
}
