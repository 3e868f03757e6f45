//! Typed, in-memory reference tables.
//!
//! reftab treats small, mostly static datasets (seasons, shirt sizes,
//! categories) as rows of lightweight tables: each record gets an integer
//! id, tables can be filtered and ordered, records can reference records of
//! other tables, and whole tables round-trip through JSON documents.
//!
//! This is the main entry point for applications. It re-exports the public
//! API of the layer crates:
//!
//! - `reftab-types` -- values, timestamps, schemas, references
//! - `reftab-codec` -- JSON encoding of field values
//! - `reftab-record` -- records, filters, query sets
//! - `reftab-table` -- catalog, tables, documents, managers, object builders
//!
//! A typical session defines tables on a [`Catalog`], seeds them, and
//! queries them through [`Table::objects`]:
//!
//! ```ignore
//! let catalog = Catalog::new();
//! let season = catalog.define(
//!     TableDef::new(Schema::new("Season").field("name", FieldType::Text))
//!         .seed(Seed::from_json(json!([{"name": "Summer"}, {"name": "Fall"}]))?),
//! )?;
//! let fall = season.objects().get(&Filter::new().eq("name", "Fall"))?;
//! assert_eq!(fall.id(), Some(2));
//! ```

pub use reftab_codec::{
    decode, decode_reference, decode_structural, encode, encode_reference, CodecError, CodecResult,
    ReferenceResolver,
};
pub use reftab_record::{
    Behavior, Filter, Predicate, QuerySet, Record, RecordError, RecordResult, RecordStore, TableHandle,
};
pub use reftab_table::{
    Catalog, CatalogConfig, ExportOptions, InitOptions, Manager, ObjectBuilder, ObjectManager, RawRecord,
    Seed, Table, TableDef, TableError, TableResult,
};
pub use reftab_types::{
    lookup_constant, snake_case, FieldDef, FieldType, RecordRef, Schema, Timestamp, TypeError, TypeResult,
    Value,
};

/// The types most applications need.
pub mod prelude {
    pub use crate::{
        Catalog, FieldType, Filter, InitOptions, Manager, QuerySet, Record, RecordRef, Schema, Seed, Table,
        TableDef, Value,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value as Json};

    fn season(catalog: &Catalog) -> Table {
        catalog
            .define(
                TableDef::new(Schema::new("Season").field("name", FieldType::Text)).seed(
                    Seed::from_json(json!([
                        {"name": "Summer"},
                        {"name": "Fall"},
                        {"name": "Winter"},
                        {"name": "Spring"},
                    ]))
                    .unwrap(),
                ),
            )
            .unwrap()
    }

    fn shirt_schema() -> Schema {
        Schema::new("Shirt")
            .field("label", FieldType::Text)
            .field("size", FieldType::reference("ShirtSize"))
            .field("made", FieldType::DateTime)
            .field("extra", FieldType::Json)
            .field("price", FieldType::Float)
    }

    fn wardrobe(catalog: &Catalog) -> (Table, Table) {
        let size = catalog
            .define(
                TableDef::new(
                    Schema::new("ShirtSize")
                        .field("name", FieldType::Text)
                        .field("choice", FieldType::Text),
                )
                .seed(
                    Seed::from_json(json!({
                        "1": {"name": "S", "choice": "Small"},
                        "2": {"name": "XL", "choice": "Extra large"},
                    }))
                    .unwrap(),
                ),
            )
            .unwrap();
        size.ensure_init().unwrap();

        let shirt = catalog
            .define(
                TableDef::new(shirt_schema()).seed(
                    Seed::from_json(json!([
                        {
                            "label": "plain",
                            "size": {"table_name": "ShirtSize", "id": 2},
                            "made": "2024-03-01T10:30:00",
                            "extra": {"tags": ["cotton"]},
                            "price": 12,
                        },
                        {"label": "spare", "size": null, "made": "2023-12-24"},
                    ]))
                    .unwrap(),
                ),
            )
            .unwrap();
        shirt.ensure_init().unwrap();
        (size, shirt)
    }

    fn names(qs: &QuerySet) -> Vec<&str> {
        qs.iter().filter_map(|r| r.text("name")).collect()
    }

    // -----------------------------------------------------------------------
    // Seasons
    // -----------------------------------------------------------------------

    #[test]
    fn season_queries() {
        let catalog = Catalog::new();
        let season = season(&catalog);
        let objects = season.objects();

        let fall = objects.get(&Filter::new().eq("name", "Fall")).unwrap();
        assert_eq!(fall.id(), Some(2));

        let ordered = objects.all().unwrap().order_by("-id").unwrap();
        assert_eq!(names(&ordered), vec!["Spring", "Winter", "Fall", "Summer"]);

        let cold = objects
            .filter(&[("name__in", Value::from(vec!["Winter", "Fall"]))].into_iter().collect())
            .unwrap();
        assert_eq!(names(&cold), vec!["Fall", "Winter"]);

        assert_eq!(season.constant("WINTER"), Some(3));
        assert_eq!(
            objects.choices().unwrap(),
            vec![
                (1, "Summer".to_string()),
                (2, "Fall".to_string()),
                (3, "Winter".to_string()),
                (4, "Spring".to_string()),
            ]
        );
    }

    #[test]
    fn season_ids_after_save_and_delete() {
        let catalog = Catalog::new();
        let season = season(&catalog);
        season.init(None, InitOptions::default()).unwrap();
        for id in [3, 4] {
            season.get(id).unwrap().delete().unwrap();
        }
        assert_eq!(season.ids(), vec![1, 2]);

        let monsoon = season.objects().create([("name", "Monsoon")]).unwrap();
        assert_eq!(monsoon.id(), Some(3));
        monsoon.delete().unwrap();
        let again = season.objects().create([("name", "Monsoon")]).unwrap();
        assert_eq!(again.id(), Some(3));
    }

    #[test]
    fn ensure_init_is_idempotent() {
        let catalog = Catalog::new();
        let season = season(&catalog);
        season.ensure_init().unwrap();
        season.ensure_init().unwrap();
        assert_eq!(season.len(), 4);
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    #[test]
    fn references_resolve_across_tables() {
        let catalog = Catalog::new();
        let (_size, shirt) = wardrobe(&catalog);
        let plain = shirt.get(1).unwrap();
        let size = plain.get("size").and_then(Value::as_record_ref).unwrap();
        assert_eq!(catalog.fetch(size).unwrap().text("choice"), Some("Extra large"));
    }

    #[test]
    fn encoded_reference_decodes_to_same_record() {
        let catalog = Catalog::new();
        let (size, _shirt) = wardrobe(&catalog);
        let xl = size.get(2).unwrap();

        let encoded = encode_reference(&xl.reference()).unwrap();
        let decoded = decode_reference(&encoded, &catalog).unwrap();
        assert_eq!(catalog.fetch(&decoded).unwrap(), xl);
    }

    #[test]
    fn unsaved_references_cannot_be_encoded() {
        let catalog = Catalog::new();
        let season = season(&catalog);
        let transient = season.new_record();
        assert!(matches!(
            encode_reference(&transient.reference()),
            Err(CodecError::NotPersisted { .. })
        ));
    }

    #[test]
    fn dangling_reference_is_record_not_found() {
        let catalog = Catalog::new();
        season(&catalog).ensure_init().unwrap();
        let err = decode(
            &json!({"table_name": "Season", "id": 99}),
            &FieldType::any_reference(),
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::RecordNotFound { id: 99, .. }));
    }

    #[test]
    fn reference_to_wrong_table_is_rejected() {
        let catalog = Catalog::new();
        season(&catalog).ensure_init().unwrap();
        let (_size, shirt) = wardrobe(&catalog);
        let err = shirt
            .from_raw(
                json!({"size": {"table_name": "Season", "id": 1}})
                    .as_object()
                    .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, TableError::Codec(CodecError::TypeMismatch { .. })));
    }

    #[test]
    fn declared_types_drive_decoding() {
        let catalog = Catalog::new();
        let (_size, shirt) = wardrobe(&catalog);
        let plain = shirt.get(1).unwrap();
        assert_eq!(
            plain.get("made").and_then(Value::as_datetime),
            Some(&Timestamp::parse("2024-03-01T10:30:00").unwrap())
        );
        let spare = shirt.get(2).unwrap();
        assert_eq!(
            spare.get("made").and_then(Value::as_datetime).map(Timestamp::to_iso8601),
            Some("2023-12-24T00:00:00".to_string())
        );

        let raw = json!({"label": "2024-01-01"});
        let record = shirt.from_raw(raw.as_object().unwrap()).unwrap();
        assert_eq!(record.text("label"), Some("2024-01-01"));
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    #[test]
    fn export_then_import_into_fresh_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let sizes_path = dir.path().join("sizes.json");
        let shirts_path = dir.path().join("shirts.json");

        let catalog = Catalog::new();
        let (size, shirt) = wardrobe(&catalog);
        let priced = shirt
            .objects()
            .create([("label", Value::from("priced")), ("price", Value::from(3))])
            .unwrap();
        assert_eq!(priced.get("price"), Some(&Value::Float(3.0)));
        size.export_to_path(&sizes_path, ExportOptions::default()).unwrap();
        shirt.export_to_path(&shirts_path, catalog.config().export_options()).unwrap();

        let fresh = Catalog::new();
        fresh
            .define(
                Schema::new("ShirtSize")
                    .field("name", FieldType::Text)
                    .field("choice", FieldType::Text),
            )
            .unwrap();
        fresh.define(shirt_schema()).unwrap();
        let imported_sizes = fresh.import_from_path(&sizes_path, InitOptions::default()).unwrap();
        let imported_shirts = fresh.import_from_path(&shirts_path, InitOptions::default()).unwrap();

        assert_eq!(imported_sizes.records(), size.records());
        assert_eq!(imported_shirts.records(), shirt.records());
        assert_eq!(imported_shirts.get(3).unwrap().get("price"), Some(&Value::Float(3.0)));
        assert_eq!(imported_sizes.constant("XL"), Some(2));
    }

    #[test]
    fn import_before_referenced_table_fails() {
        let catalog = Catalog::new();
        let (_size, shirt) = wardrobe(&catalog);
        let bytes = shirt.to_document(ExportOptions::default()).unwrap();

        let fresh = Catalog::new();
        fresh.define(shirt_schema()).unwrap();
        let err = fresh.load_document(&bytes, InitOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::Codec(CodecError::TableNotFound(_))));
    }

    #[test]
    fn config_from_toml() {
        let config = CatalogConfig::from_toml_str("force_by_default = true\npretty_documents = true").unwrap();
        let catalog = Catalog::with_config(config);
        let season = season(&catalog);
        season.init(None, InitOptions::default()).unwrap();
        season.init(None, InitOptions::default()).unwrap();
        let bytes = season.to_document(catalog.config().export_options()).unwrap();
        assert!(bytes.contains(&b'\n'));
    }

    proptest! {
        #[test]
        fn documents_round_trip(rows in proptest::collection::btree_map(1u64..50, "[a-z]{1,8}", 0..12)) {
            let schema = || {
                Schema::new("Word")
                    .field("name", FieldType::Text)
                    .field("length", FieldType::Int)
                    .field("weight", FieldType::Float)
            };
            let catalog = Catalog::new();
            let words = catalog.define(schema()).unwrap();
            let seed: serde_json::Map<String, Json> = rows
                .iter()
                .map(|(id, name)| (id.to_string(), json!({"name": name, "length": name.len(), "weight": name.len()})))
                .collect();
            words.init(Some(Seed::from_json(Json::Object(seed)).unwrap()), InitOptions::default()).unwrap();
            words
                .objects()
                .create([("name", Value::from("extra")), ("weight", Value::from(rows.len() as i64))])
                .unwrap();
            let bytes = words.to_document(ExportOptions::default()).unwrap();

            let fresh = Catalog::new();
            fresh.define(schema()).unwrap();
            let imported = fresh.load_document(&bytes, InitOptions::default()).unwrap();
            prop_assert_eq!(imported.ids(), words.ids());
            prop_assert_eq!(imported.records(), words.records());
        }
    }
}
