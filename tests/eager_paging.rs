use std::collections::BTreeSet;

use curation_api::entity::{FeatureFlag, Flag, Gene, Transcript, User};
use curation_api::{Database, EagerLoader, EntityStore, PageRequest, RelatedRecord};

fn database() -> Database {
    let db = Database::new();
    for id in 1..=6 {
        db.genes.insert(Gene::new(id, i32::try_from(id).unwrap() * 100, format!("G{id}"))).unwrap();
    }
    for id in 1..=3 {
        db.transcripts.insert(Transcript::new(id, "GRCh37")).unwrap();
    }
    // Flags with 0..=6 genes so the joined row count differs from the parent count.
    for id in 1..=7 {
        let genes = 1..=(id - 1);
        let mut flag = Flag::new(id, "GENE", format!("F{id}"), format!("Flag {id}")).with_genes(genes);
        if id % 2 == 0 {
            flag = flag.with_transcripts([1, 2]);
        }
        db.flags.insert(flag).unwrap();
    }
    db
}

#[test]
fn find_all_eager_returns_each_parent_once() {
    let db = database();
    let loader = EagerLoader::<Flag>::new(&db.flags, &db);
    let all = loader.find_all(true).unwrap();
    let ids: Vec<i64> = all.iter().map(|f| f.record.id).collect();
    assert_eq!(ids, (1..=7).collect::<Vec<_>>());

    let seven = &all[6];
    assert_eq!(seven.related("genes").len(), 6);
    assert!(seven.related("transcripts").is_empty());
    let six = &all[5];
    assert_eq!(six.related("transcripts").len(), 2);
}

#[test]
fn eager_pages_partition_the_parents() {
    let db = database();
    let loader = EagerLoader::<Flag>::new(&db.flags, &db);
    let expected: BTreeSet<i64> = loader.find_all(true).unwrap().iter().map(|f| f.record.id).collect();

    for size in 1..=8 {
        let mut seen = Vec::new();
        let mut page = 0;
        loop {
            let result = loader
                .find_all_paged(true, &PageRequest::new(page, size).unwrap())
                .unwrap();
            assert_eq!(result.total_elements, 7, "count must be of distinct parents");
            if result.content.is_empty() {
                break;
            }
            seen.extend(result.content.iter().map(|f| f.record.id));
            page += 1;
        }
        let unique: BTreeSet<i64> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len(), "duplicate parent across pages at size {size}");
        assert_eq!(unique, expected);
    }
}

#[test]
fn lazy_reads_skip_relationships() {
    let db = database();
    let loader = EagerLoader::<Flag>::new(&db.flags, &db);
    let page = loader.find_all_paged(false, &PageRequest::new(0, 3).unwrap()).unwrap();
    assert_eq!(page.content.len(), 3);
    assert!(page.content.iter().all(|f| f.related.is_empty()));
    // Relationship ids stay on the record itself.
    assert_eq!(page.content[2].record.gene_ids, vec![1, 2]);
}

#[test]
fn find_one_eager_present_and_absent() {
    let db = database();
    db.users.insert(User::new(1, "admin")).unwrap();
    db.users.insert(User::new(2, "curator")).unwrap();
    db.feature_flags
        .insert(FeatureFlag::new(1, "curation-v2", true).with_users([2, 1]))
        .unwrap();

    let loader = EagerLoader::<FeatureFlag>::new(&db.feature_flags, &db);
    let found = loader.find_one_eager(1).unwrap().unwrap();
    let logins: Vec<&str> = found
        .related("users")
        .iter()
        .filter_map(|r| match r {
            RelatedRecord::User(u) => Some(u.login.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(logins, vec!["admin", "curator"]);
    assert!(loader.find_one_eager(99).unwrap().is_none());
}
