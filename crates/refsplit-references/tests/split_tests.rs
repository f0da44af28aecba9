use refsplit_core::{ControlField, DataField, MODIFIED_TAG, Record, SplitConfig, Subfield};
use refsplit_references::references::clean_reference;
use refsplit_references::references::dedup::remove_duplicates;
use refsplit_references::{
    BatchRunner, ChangeLog, FieldOutcome, ReferenceSplitter, SplitOptions, SplitStats,
    StaticMatcher,
};

fn sf(code: char, value: &str) -> Subfield {
    Subfield::new(code, value)
}

fn reference_field(subfields: Vec<Subfield>) -> DataField {
    DataField::new("999", 'C', '5', subfields)
}

fn dedup(values: &[&str]) -> Vec<String> {
    let mut log = ChangeLog::new();
    remove_duplicates(values.iter().map(|v| v.to_string()).collect(), &mut log)
}

fn split(matcher: &StaticMatcher, field: &DataField) -> Vec<DataField> {
    let splitter = ReferenceSplitter::new(matcher, SplitOptions::default());
    match splitter.process_field(field) {
        FieldOutcome::Split { fields, .. } => fields,
        FieldOutcome::Unchanged(_) => panic!("expected {field} to be split"),
    }
}

#[test]
fn longer_pubnote_survives_in_either_order() {
    assert_eq!(dedup(&["78-2005", "JHEP,2005,78"]), ["JHEP,2005,78"]);
    assert_eq!(dedup(&["JHEP,2005,78", "78-2005"]), ["JHEP,2005,78"]);
}

#[test]
fn partial_token_is_not_containment() {
    assert_eq!(dedup(&["05,78", "JHEP,2005,78"]), ["05,78", "JHEP,2005,78"]);
}

#[test]
fn dedup_is_idempotent_on_its_output() {
    let once = dedup(&["A,1", "B,2", "A,1,B,2", "2", "C,3", "C"]);
    let refs: Vec<&str> = once.iter().map(String::as_str).collect();
    assert_eq!(dedup(&refs), once);
}

#[test]
fn garbage_pubnotes_move_to_notes() {
    let (reference, log) =
        clean_reference(&[sf('s', ",123"), sf('s', "4567"), sf('s', "JHEP,2005,78")]);

    assert_eq!(reference.pubnotes(), ["JHEP,2005,78"]);
    assert_eq!(reference.notes(), [",123", "4567"]);
    assert_eq!(log.entries().len(), 2);
}

#[test]
fn single_pubnote_is_left_alone() {
    let matcher = StaticMatcher::new()
        .with_pubnote("JHEP,0505,078", &[1])
        .with_text("Doe, Phys. Rev. D70", &[2]);
    let splitter = ReferenceSplitter::new(&matcher, SplitOptions::default());
    let field = reference_field(vec![sf('s', "JHEP,0505,078"), sf('a', "Doe, Phys. Rev. D70")]);

    assert_eq!(splitter.process_field(&field), FieldOutcome::Unchanged(field.clone()));
    assert_eq!(matcher.queries(), 0);
}

#[test]
fn two_records_give_two_fields_with_note_and_year() {
    let matcher = StaticMatcher::new()
        .with_pubnote("JHEP,0505,078", &[1])
        .with_pubnote("Phys.Rev.,D70,1", &[2])
        .with_year(1, "2005");
    let field = reference_field(vec![
        sf('o', "12"),
        sf('s', "JHEP,0505,078"),
        sf('s', "Phys.Rev.,D70,1"),
        sf('y', "2004"),
        sf('9', "CURATOR"),
    ]);

    let fields = split(&matcher, &field);

    assert_eq!(fields.len(), 2);
    assert_eq!(
        fields[0].subfields,
        vec![
            sf('s', "JHEP,0505,078"),
            sf('y', "2005"),
            sf('o', "12"),
            sf('m', "Split reference"),
        ]
    );
    assert_eq!(
        fields[1].subfields,
        vec![
            sf('s', "Phys.Rev.,D70,1"),
            sf('o', "12"),
            sf('y', "2004"),
            sf('m', "Split reference"),
        ]
    );
    assert!(fields.iter().all(|f| f.tag == "999" && f.ind1 == 'C' && f.ind2 == '5'));
}

#[test]
fn ambiguous_pubnote_follows_the_record_owning_a_citation() {
    let matcher = StaticMatcher::new()
        .with_pubnote("A,1,2", &[1])
        .with_pubnote("B,3,4", &[2, 3])
        .with_text("Roe, B 3 4", &[3]);
    let field = reference_field(vec![
        sf('a', "Roe, B 3 4"),
        sf('s', "A,1,2"),
        sf('s', "B,3,4"),
    ]);

    let fields = split(&matcher, &field);

    assert_eq!(fields.len(), 2);
    assert_eq!(
        fields[0].subfields,
        vec![sf('s', "A,1,2"), sf('m', "Split reference")]
    );
    assert_eq!(
        fields[1].subfields,
        vec![sf('a', "Roe, B 3 4"), sf('s', "B,3,4"), sf('m', "Split reference")]
    );
}

#[test]
fn shared_subfields_are_copied_to_every_output() {
    let matcher = StaticMatcher::new()
        .with_pubnote("A,1,2", &[1])
        .with_pubnote("B,3,4", &[2]);
    let field = reference_field(vec![
        sf('o', "7"),
        sf('h', "Doe, J."),
        sf('s', "A,1,2"),
        sf('m', "Additional pubnote: B,3,4 / erratum"),
        sf('0', "1234"),
    ]);

    let fields = split(&matcher, &field);

    assert_eq!(fields.len(), 2);
    for (field, pubnote) in fields.iter().zip(["A,1,2", "B,3,4"]) {
        assert_eq!(
            field.subfields,
            vec![
                sf('s', pubnote),
                sf('o', "7"),
                sf('h', "Doe, J."),
                sf('m', "erratum"),
                sf('m', "Split reference"),
            ]
        );
    }
}

#[test]
fn unmatched_values_share_one_trailing_field() {
    let matcher = StaticMatcher::new()
        .with_pubnote("A,1,2", &[1])
        .with_pubnote("B,3,4", &[2])
        .with_report_number("hep-th/0501001", &[2, 4]);
    let field = reference_field(vec![
        sf('a', "Some unknown work"),
        sf('r', "hep-th/0501001"),
        sf('s', "A,1,2"),
        sf('s', "B,3,4"),
        sf('s', "C,5,6"),
    ]);

    let fields = split(&matcher, &field);

    assert_eq!(fields.len(), 3);
    assert_eq!(
        fields[2].subfields,
        vec![
            sf('a', "Some unknown work"),
            sf('r', "hep-th/0501001"),
            sf('s', "C,5,6"),
            sf('m', "Split reference"),
        ]
    );
}

#[test]
fn garbage_pubnotes_are_dropped_from_split_outputs() {
    let matcher = StaticMatcher::new()
        .with_pubnote("A,1,2", &[1])
        .with_pubnote("B,3,4", &[2]);
    let splitter = ReferenceSplitter::new(&matcher, SplitOptions::default());
    let field = reference_field(vec![
        sf('s', "A,1,2"),
        sf('s', "4567"),
        sf('s', "B,3,4"),
        sf('m', "erratum"),
    ]);

    let FieldOutcome::Split {
        fields, clean_log, ..
    } = splitter.process_field(&field)
    else {
        panic!("expected {field} to be split");
    };

    assert!(clean_log.to_string().contains("s -> m \"4567\""));
    assert_eq!(fields.len(), 2);
    for (field, pubnote) in fields.iter().zip(["A,1,2", "B,3,4"]) {
        assert_eq!(
            field.subfields,
            vec![
                sf('s', pubnote),
                sf('m', "erratum"),
                sf('m', "Split reference"),
            ]
        );
    }
}

#[test]
fn one_record_plus_leftovers_still_needs_two_records() {
    let matcher = StaticMatcher::new().with_pubnote("A,1,2", &[1]);
    let splitter = ReferenceSplitter::new(&matcher, SplitOptions::default());
    let field = reference_field(vec![sf('s', "A,1,2"), sf('s', "C,5,6")]);

    assert_eq!(splitter.process_field(&field), FieldOutcome::Unchanged(field.clone()));
}

fn record(id: u64, references: Vec<DataField>) -> Record {
    let mut record = Record::new(id);
    record.add_field(DataField::new("100", ' ', ' ', vec![sf('a', "Author, A.")]));
    for field in references {
        record.add_field(field);
    }
    record
}

#[test]
fn batch_routes_records_by_largest_split() {
    let matcher = StaticMatcher::new()
        .with_pubnote("JHEP,2005,78", &[1])
        .with_pubnote("B,3,4", &[2])
        .with_pubnote("C,5,6", &[3]);
    let config = SplitConfig {
        limit_split: 2,
        ..SplitConfig::default()
    };
    let splitter = ReferenceSplitter::new(&matcher, SplitOptions::from(&config));
    let runner = BatchRunner::new(splitter, &config);

    let mut stamped = record(
        10,
        vec![reference_field(vec![
            sf('s', "78-2005"),
            sf('s', "JHEP,2005,78"),
            sf('s', "B,3,4"),
        ])],
    );
    stamped.controlfields = vec![
        ControlField::new(MODIFIED_TAG, "20190101000000.0"),
        ControlField::new("008", "190101s2019"),
    ];

    let records = vec![
        stamped,
        record(
            11,
            vec![reference_field(vec![
                sf('s', "JHEP,2005,78"),
                sf('s', "B,3,4"),
                sf('s', "C,5,6"),
            ])],
        ),
        record(12, vec![reference_field(vec![sf('s', "B,3,4")])]),
    ];

    let report = runner.run(records);

    assert_eq!(report.processed, 3);
    assert_eq!(report.updated(), 2);
    assert_eq!(report.stats.to_string(), "{2: 1, 3: 1}");

    assert_eq!(report.regular.len(), 1);
    assert_eq!(report.regular[0].id.0, 10);
    assert_eq!(report.regular[0].fields.len(), 2);
    assert!(report.regular[0].fields.iter().all(|f| f.tag == "999"));
    assert_eq!(
        report.regular[0].controlfields,
        vec![ControlField::new(MODIFIED_TAG, "20190101000000.0")]
    );
    assert_eq!(report.many.len(), 1);
    assert_eq!(report.many[0].id.0, 11);

    assert!(report.log.contains("\n10 ===========================\n"));
    assert!(report.log.contains("Cleanup in 10 : delete \"78-2005\""));
    assert!(!report.log.contains("Cleanup in 11"));
    assert!(!report.log.contains("12 ==="));
    assert!(report.render_log().ends_with("Done with 3 records: {2: 1, 3: 1}"));
}

#[test]
fn process_record_keeps_other_fields_first() {
    let matcher = StaticMatcher::new()
        .with_pubnote("A,1,2", &[1])
        .with_pubnote("B,3,4", &[2]);
    let config = SplitConfig::default();
    let runner = BatchRunner::new(
        ReferenceSplitter::new(&matcher, SplitOptions::from(&config)),
        &config,
    );
    let mut stored = record(
        20,
        vec![
            reference_field(vec![sf('s', "A,1,2"), sf('s', "B,3,4")]),
            reference_field(vec![sf('s', "Z,9,9")]),
        ],
    );
    let mut stats = SplitStats::new();

    let report = runner.process_record(&mut stored, &mut stats);

    assert!(report.updated);
    assert_eq!(report.max_split, 2);
    assert_eq!(stats.get(2), 1);
    let tags: Vec<&str> = stored.fields.iter().map(|f| f.tag.as_str()).collect();
    assert_eq!(tags, ["100", "999", "999", "999"]);
    assert_eq!(stored.fields[3].subfields, vec![sf('s', "Z,9,9")]);
}
