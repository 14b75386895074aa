use curation_api::entity::Gene;
use curation_api::{Database, EntityStore, ResolutionKey, Resolver, StorageError};

fn database() -> Database {
    let db = Database::new();
    db.genes.insert(Gene::new(1, 42, "AKT1")).unwrap();
    db.genes.insert(Gene::new(2, 7, "42")).unwrap();
    db.genes
        .insert(Gene::new(3, 673, "BRAF").with_alias("BRAF1").with_alias("B-RAF1"))
        .unwrap();
    db.genes.insert(Gene::new(4, 2064, "ERBB2").with_alias("HER2")).unwrap();
    db
}

#[test]
fn numeric_token_prefers_numeric_id() {
    let db = database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    let gene = resolver.resolve("42").unwrap().unwrap();
    assert_eq!(gene.hugo_symbol, "AKT1");
}

#[test]
fn zero_padded_token_matches_numeric_id() {
    let db = database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    assert_eq!(resolver.resolve("0673").unwrap().unwrap().hugo_symbol, "BRAF");
    assert_eq!(resolver.resolve("00042").unwrap().unwrap().hugo_symbol, "AKT1");

    let genes = resolver.resolve_all(&["673", "0673", "BRAF"]).unwrap();
    assert_eq!(genes.len(), 1);
}

#[test]
fn symbol_then_alias() {
    let db = database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    assert_eq!(resolver.resolve("ERBB2").unwrap().unwrap().id, 4);
    assert_eq!(resolver.resolve("her2").unwrap().unwrap().id, 4);
    assert_eq!(resolver.resolve("B-RAF1").unwrap().unwrap().id, 3);
}

#[test]
fn total_miss_is_absent() {
    let db = database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    assert!(resolver.resolve("NOT_A_GENE").unwrap().is_none());
    assert!(resolver.resolve("999999").unwrap().is_none());
    assert!(resolver.resolve("").unwrap().is_none());
}

#[test]
fn batch_drops_misses_without_error() {
    let db = database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    let genes = resolver.resolve_all(&["42", "unknown", "BRAF"]).unwrap();
    let symbols: Vec<&str> = genes.iter().map(|g| g.hugo_symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AKT1", "BRAF"]);
}

#[test]
fn batch_is_a_set() {
    let db = database();
    let resolver = Resolver::<Gene>::new(&db.genes);
    let genes = resolver
        .resolve_all(&["BRAF", "braf1", "673", "B-RAF1"])
        .unwrap();
    assert_eq!(genes.len(), 1);
    assert_eq!(genes[0].id, 3);
}

#[test]
fn alias_collision_is_rejected_by_store() {
    let db = database();
    let err = db
        .genes
        .insert(Gene::new(5, 5, "RAF1").with_alias("her2"))
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateKey(_)));
    assert!(Resolver::<Gene>::new(&db.genes).resolve("RAF1").unwrap().is_none());
}

#[test]
fn precedence_chain_shape() {
    assert_eq!(Resolver::<Gene>::precedence("673")[0], ResolutionKey::NumericId);
    assert_eq!(Resolver::<Gene>::precedence("BRAF")[0], ResolutionKey::PrimaryName);
    assert_eq!(Resolver::<Gene>::precedence(" 12 ")[0], ResolutionKey::NumericId);
}
