//! Linker tests

use super::*;
use crate::naming::ResourceNamer;
use crate::value::{AttrValue, AttributeMap};
use pretty_assertions::assert_eq;
use serde_json::json;

fn cache() -> SiblingCache {
    let mut cache = SiblingCache::new();
    cache.insert("dbtcloud_project", "1", json!({"id": 1}));
    cache.insert("dbtcloud_job", "10", json!({"id": 10}));
    cache.insert("dbtcloud_job", "11", json!({"id": 11}));
    cache.insert(
        "dbtcloud_environment",
        "100",
        json!({"id": 100, "project_id": 1, "name": "Prod"}),
    );
    cache.insert(
        "dbtcloud_environment",
        "101",
        json!({"id": 101, "project_id": 2, "name": "Prod"}),
    );
    cache
}

fn map(entries: &[(&str, AttrValue)]) -> AttributeMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn ids(values: &[i64]) -> AttrValue {
    AttrValue::List(values.iter().map(|v| AttrValue::int(*v)).collect())
}

#[test]
fn test_link_set_from_list() {
    assert_eq!(LinkSet::from_list::<&str>(&[]), LinkSet::None);
    assert_eq!(LinkSet::from_list(&["all", "dbtcloud_job"]), LinkSet::All);

    let only = LinkSet::from_list(&["dbtcloud_project"]);
    assert!(only.allows("dbtcloud_project"));
    assert!(!only.allows("dbtcloud_job"));
    assert!(!LinkSet::None.allows("dbtcloud_project"));
    assert!(LinkSet::None.is_none());
}

#[test]
fn test_reference_when_sibling_cached() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let mut attrs = map(&[("project_id", AttrValue::int(1))]);
    let outcome = linker.link(
        &mut attrs,
        &[LinkRule::reference("project_id", "dbtcloud_project", "id")],
    );

    assert_eq!(outcome, LinkOutcome::Keep);
    assert_eq!(
        attrs["project_id"],
        AttrValue::reference("dbtcloud_project.terraform_managed_resource_1.id")
    );
}

#[test]
fn test_dangling_reference_keeps_literal() {
    let cache = cache();
    let links = LinkSet::from_list(&["dbtcloud_project"]);
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let mut attrs = map(&[("project_id", AttrValue::int(2))]);
    linker.link(
        &mut attrs,
        &[LinkRule::reference("project_id", "dbtcloud_project", "id")],
    );

    assert_eq!(attrs["project_id"], AttrValue::int(2));
}

#[test]
fn test_linking_disabled_keeps_literal() {
    let cache = cache();
    let links = LinkSet::None;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let mut attrs = map(&[("project_id", AttrValue::int(1))]);
    linker.link(
        &mut attrs,
        &[LinkRule::reference("project_id", "dbtcloud_project", "id")],
    );

    assert_eq!(attrs["project_id"], AttrValue::int(1));
}

#[test]
fn test_string_ids_match_numeric_cache_keys() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let mut attrs = map(&[(
        "job_ids",
        AttrValue::List(vec![AttrValue::string("10"), AttrValue::string("99")]),
    )]);
    let outcome = linker.link(
        &mut attrs,
        &[LinkRule::reference_at(
            FieldPath::top("job_ids"),
            "dbtcloud_job",
            "id",
            MissingPolicy::DropElementOrSkip,
        )],
    );

    assert_eq!(outcome, LinkOutcome::Keep);
    assert_eq!(
        attrs["job_ids"],
        AttrValue::List(vec![AttrValue::reference(
            "dbtcloud_job.terraform_managed_resource_10.id"
        )])
    );
}

#[test]
fn test_list_emptied_by_linking_skips_resource() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());
    let rule = LinkRule::reference_at(
        FieldPath::top("job_ids"),
        "dbtcloud_job",
        "id",
        MissingPolicy::DropElementOrSkip,
    );

    let mut attrs = map(&[("job_ids", ids(&[98, 99]))]);
    assert_eq!(linker.link(&mut attrs, &[rule.clone()]), LinkOutcome::Skip);

    let mut empty = map(&[("job_ids", ids(&[]))]);
    assert_eq!(linker.link(&mut empty, &[rule]), LinkOutcome::Keep);
}

#[test]
fn test_keep_literal_list_is_all_or_nothing() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());
    let rule = LinkRule::reference("group_ids", "dbtcloud_job", "id");

    let mut partial = map(&[("group_ids", ids(&[10, 12]))]);
    linker.link(&mut partial, &[rule.clone()]);
    assert_eq!(partial["group_ids"], ids(&[10, 12]));

    let mut complete = map(&[("group_ids", ids(&[10, 11]))]);
    linker.link(&mut complete, &[rule]);
    assert!(complete["group_ids"].has_reference_member());
}

#[test]
fn test_keep_element_links_what_resolves() {
    let mut cache = SiblingCache::new();
    cache.insert("dbtcloud_group", "6", json!({"id": 6, "name": "Analysts"}));
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());
    let rule = LinkRule::reference_at(
        FieldPath::top("group_ids"),
        "dbtcloud_group",
        "id",
        MissingPolicy::KeepElement,
    );

    let mut attrs = map(&[("group_ids", ids(&[5, 6]))]);
    assert_eq!(linker.link(&mut attrs, &[rule]), LinkOutcome::Keep);
    assert_eq!(
        attrs["group_ids"],
        AttrValue::List(vec![
            AttrValue::int(5),
            AttrValue::reference("dbtcloud_group.terraform_managed_resource_6.id"),
        ])
    );
}

#[test]
fn test_drop_element_filters_list() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let mut attrs = map(&[("on_failure", ids(&[11, 404]))]);
    let outcome = linker.link(
        &mut attrs,
        &[LinkRule::reference_at(
            FieldPath::top("on_failure"),
            "dbtcloud_job",
            "id",
            MissingPolicy::DropElement,
        )],
    );

    assert_eq!(outcome, LinkOutcome::Keep);
    assert_eq!(
        attrs["on_failure"],
        AttrValue::List(vec![AttrValue::reference(
            "dbtcloud_job.terraform_managed_resource_11.id"
        )])
    );
}

#[test]
fn test_nested_drop_entry_and_flag_guard() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let entry = |project: AttrValue, all: bool| {
        AttrValue::Map(map(&[
            ("project_id", project),
            ("all_projects", AttrValue::bool(all)),
        ]))
    };

    let mut attrs = map(&[(
        "permissions",
        AttrValue::List(vec![
            entry(AttrValue::int(1), false),
            entry(AttrValue::int(2), false),
            entry(AttrValue::Null, true),
        ]),
    )]);
    let rule = LinkRule::reference_at(
        FieldPath::nested("permissions", "project_id"),
        "dbtcloud_project",
        "id",
        MissingPolicy::DropEntry,
    );
    linker.link(&mut attrs, &[rule]);

    let AttrValue::List(items) = &attrs["permissions"] else {
        panic!("expected list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        entry(
            AttrValue::reference("dbtcloud_project.terraform_managed_resource_1.id"),
            false
        )
    );
    assert_eq!(items[1], entry(AttrValue::Null, true));

    let mut guarded = map(&[("permissions", AttrValue::List(vec![entry(AttrValue::int(1), true)]))]);
    linker.link(
        &mut guarded,
        &[LinkRule::Reference {
            field: FieldPath::nested("permissions", "project_id"),
            target: "dbtcloud_project".to_string(),
            attribute: "id".to_string(),
            missing: MissingPolicy::KeepLiteral,
            unless_flag: Some("all_projects".to_string()),
        }],
    );
    assert_eq!(
        guarded["permissions"],
        AttrValue::List(vec![entry(AttrValue::int(1), true)])
    );
}

#[test]
fn test_placeholder_is_type_gated() {
    let cache = cache();
    let rule = LinkRule::placeholder(
        "credential_id",
        "---TBD---",
        &["dbtcloud_snowflake_credential", "dbtcloud_bigquery_credential"],
    );

    let none = LinkSet::from_list(&["dbtcloud_project"]);
    let mut attrs = map(&[("credential_id", AttrValue::int(5))]);
    ReferenceLinker::new(&cache, &none, ResourceNamer::default()).link(&mut attrs, &[rule.clone()]);
    assert_eq!(attrs["credential_id"], AttrValue::int(5));

    let some = LinkSet::from_list(&["dbtcloud_bigquery_credential"]);
    ReferenceLinker::new(&cache, &some, ResourceNamer::default()).link(&mut attrs, &[rule]);
    assert_eq!(attrs["credential_id"], AttrValue::string("---TBD---"));
}

#[test]
fn test_depends_on_matches_project_and_name() {
    let cache = cache();
    let links = LinkSet::All;
    let linker = ReferenceLinker::new(&cache, &links, ResourceNamer::default());

    let mut attrs = AttributeMap::new();
    linker.link(
        &mut attrs,
        &[LinkRule::DependsOn {
            target: "dbtcloud_environment".to_string(),
            project_id: 1,
            names: vec!["Prod".to_string(), "Dev".to_string()],
        }],
    );

    assert_eq!(
        attrs["depends_on"],
        AttrValue::List(vec![AttrValue::reference(
            "dbtcloud_environment.terraform_managed_resource_100"
        )])
    );
}
