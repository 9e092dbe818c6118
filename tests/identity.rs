//! Identity resolution and save dispatch.

mod support;

use datamapa::{
    Clause, InMemoryRecordStore, Mapper, MappersExt, PersistenceError, RecordStore, StoreCall,
};
use serde_json::json;
use support::{registry, setup, Company, Person};

#[test]
fn save_without_id_or_semantic_key_creates_once() {
    let (store, registry) = setup();
    let companies = store.mapper::<Company>(&registry).unwrap();

    let mut acme = Company::new("Acme");
    companies.save(&mut acme).unwrap();

    assert_eq!(acme.id, Some(1));
    let journal = store.journal();
    assert_eq!(journal.len(), 1);
    assert!(matches!(&journal[0], StoreCall::Create { table, .. } if table == "companies"));
}

#[test]
fn save_with_id_updates_once_by_that_id() {
    let (store, registry) = setup();
    let companies = store.mapper::<Company>(&registry).unwrap();

    let mut acme = Company::new("Acme");
    companies.save(&mut acme).unwrap();
    store.clear_journal();

    acme.name = "Acme Corp".into();
    companies.save(&mut acme).unwrap();

    let journal = store.journal();
    assert_eq!(journal.len(), 1);
    match &journal[0] {
        StoreCall::Update {
            table,
            id,
            attributes,
        } => {
            assert_eq!(table, "companies");
            assert_eq!(*id, 1);
            assert_eq!(attributes.get("name"), Some(&json!("Acme Corp")));
        }
        other => panic!("expected an update, got {:?}", other),
    }
    assert_eq!(store.count("companies"), 1);
}

#[test]
fn save_with_semantic_key_match_updates_existing_record() {
    let (store, registry) = setup();
    let people = store.mapper::<Person>(&registry).unwrap();

    let mut first = Person::new("Ada", "ada@example.com");
    people.save(&mut first).unwrap();
    store.clear_journal();

    let mut same_person = Person::new("Ada Lovelace", "ada@example.com");
    people.save(&mut same_person).unwrap();

    assert_eq!(same_person.id, first.id);
    assert_eq!(store.count("people"), 1);

    let journal = store.journal();
    assert_eq!(journal.len(), 2);
    assert_eq!(
        journal[0],
        StoreCall::FindByClause {
            table: "people".into(),
            clause: Clause::new().eq("email", "ada@example.com"),
        }
    );
    assert!(matches!(journal[1], StoreCall::Update { id: 1, .. }));

    let record = store.find_by_id("people", 1).unwrap();
    assert_eq!(record.get("name"), Some(&json!("Ada Lovelace")));
}

#[test]
fn save_with_semantic_key_miss_creates_new_record() {
    let (store, registry) = setup();
    let people = store.mapper::<Person>(&registry).unwrap();

    let mut ada = Person::new("Ada", "ada@example.com");
    people.save(&mut ada).unwrap();
    let mut grace = Person::new("Grace", "grace@example.com");
    store.clear_journal();
    people.save(&mut grace).unwrap();

    assert_eq!(grace.id, Some(2));
    let journal = store.journal();
    assert_eq!(journal.len(), 2);
    assert!(matches!(journal[0], StoreCall::FindByClause { .. }));
    assert!(matches!(journal[1], StoreCall::Create { .. }));
}

#[test]
fn incomplete_semantic_key_is_rejected_before_any_store_call() {
    let (store, registry) = setup();
    let people = store.mapper::<Person>(&registry).unwrap();

    let mut anonymous = Person::default();
    let err = people.save(&mut anonymous).unwrap_err();

    assert_eq!(
        err,
        PersistenceError::IncompleteSemanticKey {
            mapper: "PersonMapper".into(),
            field: "email".into(),
        }
    );
    assert!(store.journal().is_empty());
    assert_eq!(anonymous.id, None);
}

#[test]
fn exists_backfills_id_only_on_match() {
    let (store, registry) = setup();
    let people = store.mapper::<Person>(&registry).unwrap();

    let mut ada = Person::new("Ada", "ada@example.com");
    people.save(&mut ada).unwrap();

    let mut lookup = Person::new("whoever", "ada@example.com");
    assert!(people.exists(&mut lookup).unwrap());
    assert_eq!(lookup.id, ada.id);

    let mut stranger = Person::new("Grace", "grace@example.com");
    assert!(!people.exists(&mut stranger).unwrap());
    assert_eq!(stranger.id, None);

    // exists never writes
    assert_eq!(store.count("people"), 1);
}

#[test]
fn exists_with_id_checks_by_id() {
    let (store, registry) = setup();
    let companies = store.mapper::<Company>(&registry).unwrap();

    let mut acme = Company::new("Acme");
    companies.save(&mut acme).unwrap();
    store.clear_journal();

    assert!(companies.exists(&mut acme).unwrap());

    let mut gone = Company::new("Gone");
    gone.id = Some(7);
    assert!(!companies.exists(&mut gone).unwrap());
    assert_eq!(gone.id, Some(7));

    assert_eq!(
        store.journal(),
        vec![
            StoreCall::ExistsById {
                table: "companies".into(),
                id: 1
            },
            StoreCall::ExistsById {
                table: "companies".into(),
                id: 7
            },
        ]
    );
}

#[test]
fn exists_without_id_or_semantic_key_is_false() {
    let (store, registry) = setup();
    let companies = store.mapper::<Company>(&registry).unwrap();

    let mut acme = Company::new("Acme");
    assert!(!companies.exists(&mut acme).unwrap());
    assert!(store.journal().is_empty());
}

#[test]
fn identify_by_missing_id_is_not_found() {
    let (store, registry) = setup();
    let people = store.mapper::<Person>(&registry).unwrap();

    let mut ghost = Person::new("Ghost", "ghost@example.com");
    ghost.id = Some(5);

    let err = people.identify(&mut ghost).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn identify_returns_the_backing_record() {
    let (store, registry) = setup();
    let people = store.mapper::<Person>(&registry).unwrap();

    let mut ada = Person::new("Ada", "ada@example.com");
    people.save(&mut ada).unwrap();

    let mut lookup = Person::new("", "ada@example.com");
    let record = people.identify(&mut lookup).unwrap().expect("record exists");
    assert_eq!(record.id, 1);
    assert_eq!(record.get("name"), Some(&json!("Ada")));
    assert_eq!(lookup.id, Some(1));
}

#[test]
fn update_without_id_is_rejected() {
    let (store, registry) = setup();
    let companies = store.mapper::<Company>(&registry).unwrap();

    let err = companies.update(&mut Company::new("Acme")).unwrap_err();
    assert_eq!(
        err,
        PersistenceError::MissingId {
            mapper: "CompanyMapper".into()
        }
    );
}

#[test]
fn update_of_vanished_record_is_not_found() {
    let (store, registry) = setup();
    let companies = store.mapper::<Company>(&registry).unwrap();

    let mut acme = Company::new("Acme");
    acme.id = Some(3);
    let err = companies.save(&mut acme).unwrap_err();
    assert_eq!(
        err,
        PersistenceError::RecordNotFound {
            table: "companies".into(),
            id: 3
        }
    );
}

#[test]
fn constraint_violation_becomes_duplicate_key() {
    let store = InMemoryRecordStore::new().with_unique("people", &["email"]);
    let registry = registry();
    let people = store.mapper::<Person>(&registry).unwrap();

    people
        .create(&mut Person::new("Ada", "ada@example.com"))
        .unwrap();

    // create skips identity resolution, so the store sees the clash
    let mut twin = Person::new("Ada", "ada@example.com");
    let err = people.create(&mut twin).unwrap_err();
    assert_eq!(
        err,
        PersistenceError::DuplicateKey("UNIQUE constraint failed: people.email".into())
    );
    assert_eq!(twin.id, None);
}

#[test]
fn unregistered_model_has_no_mapper() {
    let store = InMemoryRecordStore::new();
    let registry = datamapa::MapperRegistry::new();

    let err = store.mapper::<Person>(&registry).err().unwrap();
    assert!(matches!(err, PersistenceError::UnregisteredMapper(_)));

    let err = Mapper::<Company>::new(&store, &registry).err().unwrap();
    assert!(matches!(err, PersistenceError::UnregisteredMapper(name) if name.contains("Company")));
}
