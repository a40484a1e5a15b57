use std::sync::Arc;

use proptest::prelude::*;
use rbac_shield_core::{AppError, AppResult, AuthenticatedIdentity};
use rbac_shield_domain::{RoleSet, SchemaPermissionTable};

use super::{AccessDecision, CombinedPredicate, PermissionNode, PermissionTree};

fn roles() -> RoleSet {
    RoleSet::from_names(["ADMIN", "DEVELOPER", "GUEST"]).unwrap_or_else(|_| unreachable!())
}

fn identity(role: &str) -> AuthenticatedIdentity {
    AuthenticatedIdentity::with_role(role)
}

fn compile(table: AppResult<SchemaPermissionTable>) -> PermissionTree {
    let table = table.unwrap_or_else(|_| unreachable!());
    PermissionTree::compile(&roles(), &table).unwrap_or_else(|_| unreachable!())
}

#[test]
fn whole_type_rule_with_single_role() {
    let tree = compile(SchemaPermissionTable::new().with_whole_type("Obj", ["ADMIN"]));

    assert_eq!(tree.decide("Obj", "name", &identity("ADMIN")), AccessDecision::Allowed);
    assert_eq!(tree.decide("Obj", "name", &identity("DEVELOPER")), AccessDecision::Denied);
}

#[test]
fn whole_type_rule_is_an_or_of_its_roles() {
    let tree = compile(SchemaPermissionTable::new().with_whole_type("Obj", ["ADMIN", "DEVELOPER"]));

    assert_eq!(tree.decide("Obj", "name", &identity("ADMIN")), AccessDecision::Allowed);
    assert_eq!(tree.decide("Obj", "name", &identity("DEVELOPER")), AccessDecision::Allowed);
    assert_eq!(tree.decide("Obj", "name", &identity("GUEST")), AccessDecision::Denied);
}

#[test]
fn whole_type_rule_applies_to_every_field() {
    let tree = compile(SchemaPermissionTable::new().with_whole_type("Obj", ["ADMIN"]));

    for field in ["name", "secret", "anything"] {
        assert_eq!(tree.decide("Obj", field, &identity("ADMIN")), AccessDecision::Allowed);
    }
}

#[test]
fn field_rule_leaves_unlisted_fields_unrestricted() {
    let tree = compile(SchemaPermissionTable::new().with_field("Obj", "secret", ["ADMIN"]));

    assert_eq!(tree.decide("Obj", "secret", &identity("DEVELOPER")), AccessDecision::Denied);
    assert_eq!(tree.decide("Obj", "name", &identity("DEVELOPER")), AccessDecision::Unrestricted);
    assert!(tree.predicate_for("Obj", "name").is_none());
    assert_eq!(tree.decide("Other", "name", &identity("GUEST")), AccessDecision::Unrestricted);
}

#[test]
fn query_field_denies_developer() {
    let tree = compile(SchemaPermissionTable::new().with_field("Query", "test", ["ADMIN"]));

    assert_eq!(tree.decide("Query", "test", &identity("ADMIN")), AccessDecision::Allowed);
    assert_eq!(tree.decide("Query", "test", &identity("DEVELOPER")), AccessDecision::Denied);
}

#[test]
fn mutation_field_allows_multiple_roles() {
    let tree = compile(
        SchemaPermissionTable::new().with_field("Mutation", "test", ["ADMIN", "DEVELOPER"]),
    );

    assert_eq!(tree.decide("Mutation", "test", &identity("ADMIN")), AccessDecision::Allowed);
    assert_eq!(tree.decide("Mutation", "test", &identity("DEVELOPER")), AccessDecision::Allowed);
}

#[test]
fn empty_role_list_denies_everyone() {
    let tree = compile(
        SchemaPermissionTable::new()
            .with_whole_type("Locked", Vec::<String>::new())
            .and_then(|table| table.with_field("Query", "closed", Vec::<String>::new())),
    );

    for candidate in [
        identity("ADMIN"),
        identity("DEVELOPER"),
        identity(""),
        AuthenticatedIdentity::anonymous(),
    ] {
        assert_eq!(tree.decide("Locked", "any", &candidate), AccessDecision::Denied);
        assert_eq!(tree.decide("Query", "closed", &candidate), AccessDecision::Denied);
    }
}

#[test]
fn undeclared_role_identity_is_denied_everywhere() {
    let tree = compile(SchemaPermissionTable::new().with_whole_type("Obj", ["ADMIN", "GUEST"]));

    assert_eq!(tree.decide("Obj", "name", &identity("ROOT")), AccessDecision::Denied);
}

#[test]
fn undeclared_role_in_table_fails_compilation() {
    let table = SchemaPermissionTable::new()
        .with_field("Query", "test", ["ADMIN", "ROOT"])
        .unwrap_or_else(|_| unreachable!());

    let result = PermissionTree::compile(&roles(), &table);

    assert!(matches!(
        result,
        Err(AppError::Validation(message)) if message.contains("ROOT") && message.contains("Query.test")
    ));
}

#[test]
fn tree_mirrors_table_shape() {
    let tree = compile(
        SchemaPermissionTable::new()
            .with_whole_type("Obj", ["ADMIN"])
            .and_then(|table| table.with_field("Query", "a", ["ADMIN"]))
            .and_then(|table| table.with_field("Query", "b", ["GUEST"])),
    );

    assert_eq!(tree.len(), 2);
    assert!(matches!(tree.node("Obj"), Some(PermissionNode::WholeType(_))));
    assert!(matches!(tree.node("Query"), Some(PermissionNode::Fields(fields)) if fields.len() == 2));
    assert_eq!(tree.leaves().count(), 3);
}

#[test]
fn role_predicates_are_shared_across_locations() {
    let tree = compile(
        SchemaPermissionTable::new()
            .with_whole_type("Obj", ["ADMIN"])
            .and_then(|table| table.with_field("Query", "test", ["ADMIN", "DEVELOPER"])),
    );

    let first = tree.predicate_for("Obj", "name").map(CombinedPredicate::members);
    let second = tree.predicate_for("Query", "test").map(CombinedPredicate::members);

    assert!(matches!(
        (first, second),
        (Some([a]), Some([b, _])) if Arc::ptr_eq(a, b)
    ));
}

#[test]
fn repeated_role_in_rule_is_kept_once() {
    let tree = compile(SchemaPermissionTable::new().with_whole_type("Obj", ["ADMIN", "ADMIN"]));

    let roles: Vec<&str> = tree
        .predicate_for("Obj", "name")
        .map(|predicate| predicate.roles().map(|role| role.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(roles, vec!["ADMIN"]);
}

#[test]
fn combined_predicate_with_no_members_is_false() {
    let predicate = CombinedPredicate::any_of(Vec::new());
    assert!(predicate.denies_all());
    assert!(!predicate.evaluate(&identity("ADMIN")));
}

fn arbitrary_table() -> impl Strategy<Value = SchemaPermissionTable> {
    let role = prop_oneof![Just("ADMIN"), Just("DEVELOPER"), Just("GUEST")];
    let role_list = proptest::collection::vec(role, 0..4);
    proptest::collection::btree_map("[A-Z][a-z]{0,5}", ("[a-z]{1,6}", role_list), 0..6).prop_map(
        |entries| {
            entries
                .into_iter()
                .fold(SchemaPermissionTable::new(), |table, (location, (field, roles))| {
                    table
                        .with_field(location, field, roles)
                        .unwrap_or_default()
                })
        },
    )
}

proptest! {
    #[test]
    fn compiling_twice_yields_equivalent_trees(table in arbitrary_table()) {
        let first = PermissionTree::compile(&roles(), &table);
        let second = PermissionTree::compile(&roles(), &table);
        prop_assert!(first.is_ok() && second.is_ok());
        let first = first.unwrap_or_default();
        let second = second.unwrap_or_default();

        for leaf in first.leaves() {
            let field = leaf.field.unwrap_or("any");
            for role in ["ADMIN", "DEVELOPER", "GUEST", "ROOT"] {
                prop_assert_eq!(
                    first.decide(leaf.location, field, &identity(role)),
                    second.decide(leaf.location, field, &identity(role))
                );
            }
        }
        prop_assert_eq!(first.leaves().count(), second.leaves().count());
    }
}
