use curation_api::entity::{Flag, Gene, Transcript};
use curation_api::{
    CriteriaSet, CurationError, Database, EntityStore, FilterError, PageRequest, QueryService,
    Record,
};

fn database() -> Database {
    let db = Database::new();
    for (id, entrez, symbol) in [
        (1, 673, "BRAF"),
        (2, 3845, "KRAS"),
        (3, 4893, "NRAS"),
        (4, 7157, "TP53"),
        (5, 2064, "ERBB2"),
    ] {
        db.genes.insert(Gene::new(id, entrez, symbol)).unwrap();
    }

    let mut braf_37 = Transcript::new(1, "GRCh37");
    braf_37.gene_id = Some(1);
    braf_37.ensembl_transcript_id = Some("ENST00000288602".to_string());
    braf_37.canonical = true;
    let mut braf_38 = Transcript::new(2, "GRCh38");
    braf_38.gene_id = Some(1);
    let orphan = Transcript::new(3, "GRCh38");
    for t in [braf_37, braf_38, orphan] {
        db.transcripts.insert(t).unwrap();
    }

    db.flags
        .insert(Flag::new(1, "GENE", "ONCOGENE", "Oncogene").with_genes([1, 2, 3, 5]))
        .unwrap();
    db.flags
        .insert(Flag::new(2, "GENE", "TSG", "Tumor Suppressor Gene").with_genes([4]))
        .unwrap();
    db.flags
        .insert(Flag::new(3, "TRANSCRIPT", "MANE_SELECT", "MANE Select").with_transcripts([1]))
        .unwrap();
    db
}

fn gene_ids(db: &Database, pairs: &[(&str, &str)]) -> Vec<i64> {
    let criteria = CriteriaSet::from_query_pairs(Gene::SCHEMA, pairs.iter().copied()).unwrap();
    QueryService::<Gene>::new(&db.genes)
        .find_all_by_criteria(&criteria)
        .unwrap()
        .iter()
        .map(|g| g.id)
        .collect()
}

fn flag_ids(db: &Database, pairs: &[(&str, &str)]) -> Vec<i64> {
    let criteria = CriteriaSet::from_query_pairs(Flag::SCHEMA, pairs.iter().copied()).unwrap();
    QueryService::<Flag>::new(&db.flags)
        .find_all_by_criteria(&criteria)
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect()
}

#[test]
fn empty_criteria_returns_everything() {
    let db = database();
    assert_eq!(gene_ids(&db, &[]), vec![1, 2, 3, 4, 5]);
}

#[test]
fn equality_and_membership() {
    let db = database();
    assert_eq!(gene_ids(&db, &[("hugoSymbol.equals", "KRAS")]), vec![2]);
    assert_eq!(gene_ids(&db, &[("entrezGeneId.in", "673,7157,1")]), vec![1, 4]);
    assert_eq!(gene_ids(&db, &[("id.notIn", "1,2")]), vec![3, 4, 5]);
    assert_eq!(gene_ids(&db, &[("id.notEquals", "3")]), vec![1, 2, 4, 5]);
}

#[test]
fn range_bounds() {
    let db = database();
    assert_eq!(gene_ids(&db, &[("entrezGeneId.greaterThanOrEqual", "4893")]), vec![3, 4]);
    assert_eq!(gene_ids(&db, &[("entrezGeneId.lessThan", "2064")]), vec![1]);
    assert_eq!(
        gene_ids(
            &db,
            &[("entrezGeneId.greaterThan", "673"), ("entrezGeneId.lessThanOrEqual", "4893")]
        ),
        vec![2, 3, 5]
    );
}

#[test]
fn contains_is_case_insensitive() {
    let db = database();
    assert_eq!(gene_ids(&db, &[("hugoSymbol.contains", "ras")]), vec![2, 3]);
    assert_eq!(gene_ids(&db, &[("hugoSymbol.doesNotContain", "RAS")]), vec![1, 4, 5]);
}

#[test]
fn specified_distinguishes_null() {
    let db = database();
    let ids = |pairs: &[(&str, &str)]| -> Vec<i64> {
        let criteria =
            CriteriaSet::from_query_pairs(Transcript::SCHEMA, pairs.iter().copied()).unwrap();
        QueryService::<Transcript>::new(&db.transcripts)
            .find_all_by_criteria(&criteria)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect()
    };
    assert_eq!(ids(&[("geneId.specified", "true")]), vec![1, 2]);
    assert_eq!(ids(&[("geneId.specified", "false")]), vec![3]);
    assert_eq!(ids(&[("ensemblTranscriptId.specified", "false")]), vec![2, 3]);
    // NULL never satisfies a negated comparison.
    assert_eq!(ids(&[("geneId.notEquals", "7")]), vec![1, 2]);
    assert_eq!(ids(&[("canonical.equals", "true"), ("referenceGenome.equals", "GRCh37")]), vec![1]);
}

#[test]
fn relationship_filter_fans_out_unless_distinct() {
    let db = database();
    assert_eq!(flag_ids(&db, &[("geneId.in", "1,2,4")]), vec![1, 1, 2]);
    assert_eq!(flag_ids(&db, &[("geneId.in", "1,2,4"), ("distinct", "true")]), vec![1, 2]);
    assert_eq!(flag_ids(&db, &[("geneId.specified", "false")]), vec![3]);
    assert_eq!(flag_ids(&db, &[("transcriptId.equals", "1")]), vec![3]);
}

#[test]
fn count_uses_the_same_predicate() {
    let db = database();
    let service = QueryService::<Flag>::new(&db.flags);
    let fan_out = CriteriaSet::from_query_pairs(Flag::SCHEMA, [("geneId.specified", "true")]).unwrap();
    assert_eq!(service.count_by_criteria(&fan_out).unwrap(), 5);
    assert_eq!(service.count_by_criteria(&fan_out.with_distinct(true)).unwrap(), 2);
}

#[test]
fn paged_query_reports_totals() {
    let db = database();
    let service = QueryService::<Gene>::new(&db.genes);
    let criteria = CriteriaSet::from_query_pairs(Gene::SCHEMA, [("id.greaterThan", "1")]).unwrap();

    let mut seen = Vec::new();
    for page in 0..2 {
        let result = service
            .find_by_criteria(&criteria, &PageRequest::new(page, 3).unwrap())
            .unwrap();
        assert_eq!(result.total_elements, 4);
        assert_eq!(result.total_pages, 2);
        seen.extend(result.content.iter().map(|g| g.id));
    }
    assert_eq!(seen, vec![2, 3, 4, 5]);

    let past_end = service
        .find_by_criteria(&criteria, &PageRequest::new(5, 3).unwrap())
        .unwrap();
    assert!(past_end.content.is_empty());
    assert_eq!(past_end.total_elements, 4);
}

#[test]
fn invalid_filters_are_rejected() {
    let parse = |key: &str, value: &str| CriteriaSet::from_query_pairs(Gene::SCHEMA, [(key, value)]);

    assert!(matches!(parse("color.equals", "red"), Err(FilterError::UnknownField { .. })));
    assert!(matches!(parse("id.near", "5"), Err(FilterError::UnknownOperator { .. })));
    assert!(matches!(parse("id.contains", "5"), Err(FilterError::UnsupportedOperator { .. })));
    assert!(matches!(parse("id.equals", "five"), Err(FilterError::TypeMismatch { .. })));
    assert!(matches!(parse("entrezGeneId.equals", "3000000000"), Err(FilterError::TypeMismatch { .. })));
    assert!(matches!(parse("hugoSymbol", "BRAF"), Err(FilterError::MalformedParameter { .. })));
    assert!(matches!(parse("distinct", "maybe"), Err(FilterError::TypeMismatch { .. })));

    let err = CurationError::from(parse("id.in", "1,x").unwrap_err());
    assert!(err.is_client_error());
    assert_eq!(err.status_code(), 400);
}
