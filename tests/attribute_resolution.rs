//! Attribute resolution over super-type hierarchies
//!
//! Runs `AttributeResolver` against the in-memory catalog with injected
//! failures and latencies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use entity_detail::config::ResolverOptions;
use entity_detail::resolver::AttributeResolver;
use entity_detail::types::{AttributeDefinition, TypeDefinition};
use entity_detail::InMemoryCatalog;

fn attr(name: &str) -> AttributeDefinition {
    AttributeDefinition::new(name, "string")
}

fn sorted(mut names: Vec<&str>) -> Vec<&str> {
    names.sort_unstable();
    names
}

async fn diamond() -> Arc<InMemoryCatalog> {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert_type(TypeDefinition::new("D").with_super_types(["B", "C"]).with_attributes([attr("d")]))
        .await;
    catalog
        .insert_type(TypeDefinition::new("B").with_super_types(["A"]).with_attributes([attr("b")]))
        .await;
    catalog
        .insert_type(TypeDefinition::new("C").with_super_types(["A"]).with_attributes([attr("c")]))
        .await;
    catalog
        .insert_type(TypeDefinition::new("A").with_attributes([attr("a1"), attr("a2")]))
        .await;
    catalog
}

#[tokio::test]
async fn table_asset_scenario() {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert_type(
            TypeDefinition::new("Table")
                .with_super_types(["Asset"])
                .with_attributes([attr("name"), attr("qualifiedName")]),
        )
        .await;
    catalog
        .insert_type(TypeDefinition::new("Asset").with_attributes([attr("owner")]))
        .await;

    let resolver = AttributeResolver::new(catalog.clone());
    let fired = AtomicUsize::new(0);
    let resolved = resolver
        .resolve_with(Some("Table"), |attrs| {
            assert_eq!(attrs.len(), 3);
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(
        sorted(resolved.attribute_names()),
        vec!["name", "owner", "qualifiedName"]
    );
    assert_eq!(resolved.fetches_issued, 2);
    assert_eq!(catalog.in_flight(), 0);
}

#[tokio::test]
async fn failed_super_type_keeps_root_attributes() {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert_type(
            TypeDefinition::new("Table")
                .with_super_types(["Asset"])
                .with_attributes([attr("name")]),
        )
        .await;
    catalog
        .insert_type(TypeDefinition::new("Asset").with_attributes([attr("owner")]))
        .await;
    catalog.fail_type("Asset").await;

    let resolver = AttributeResolver::new(catalog.clone());
    let fired = AtomicUsize::new(0);
    let resolved = resolver
        .resolve_with(Some("Table"), |_| {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(resolved.attribute_names(), vec!["name"]);
    assert_eq!(resolved.fetches_failed, 1);
}

#[tokio::test]
async fn failure_does_not_abort_siblings() {
    let catalog = diamond().await;
    catalog.fail_type("B").await;

    let resolver = AttributeResolver::new(catalog.clone());
    let resolved = resolver.resolve(Some("D")).await.unwrap();

    assert_eq!(sorted(resolved.attribute_names()), vec!["a1", "a2", "c", "d"]);
    assert_eq!(catalog.fetch_count("A").await, 1);
}

#[tokio::test]
async fn diamond_fetches_shared_ancestor_per_path() {
    let catalog = diamond().await;
    let resolver = AttributeResolver::new(catalog.clone());

    let resolved = resolver.resolve(Some("D")).await.unwrap();

    assert_eq!(catalog.fetch_count("A").await, 2);
    assert_eq!(resolved.fetches_issued, 5);
    let a1 = resolved.attributes.iter().filter(|a| a.name == "a1").count();
    assert_eq!(a1, 2);
    assert_eq!(resolved.attributes.len(), 7);
}

#[tokio::test]
async fn once_per_type_fetches_shared_ancestor_once() {
    let catalog = diamond().await;
    let resolver = AttributeResolver::with_options(catalog.clone(), ResolverOptions::default().once_per_type());

    let resolved = resolver.resolve(Some("D")).await.unwrap();

    assert_eq!(catalog.fetch_count("A").await, 1);
    assert_eq!(sorted(resolved.attribute_names()), vec!["a1", "a2", "b", "c", "d"]);
}

#[tokio::test(start_paused = true)]
async fn completion_waits_for_fan_out_issued_by_later_settlements() {
    let catalog = diamond().await;
    catalog.delay_type("B", Duration::from_millis(30)).await;
    catalog.delay_type("C", Duration::from_millis(5)).await;
    catalog.delay_type("A", Duration::from_millis(10)).await;

    let resolver = AttributeResolver::new(catalog.clone());
    let fired = AtomicUsize::new(0);
    let resolved = resolver
        .resolve_with(Some("D"), |attrs| {
            // Nothing may still be outstanding when the barrier fires.
            assert_eq!(catalog.in_flight(), 0);
            assert_eq!(attrs.len(), 7);
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    // B and C were in flight together.
    assert!(catalog.peak_in_flight() >= 2);
    // Settlement order: D, C (5ms), A via C (15ms), B (30ms), A via B (40ms).
    assert_eq!(
        resolved.attribute_names(),
        vec!["d", "c", "a1", "a2", "b", "a1", "a2"]
    );
}

#[tokio::test]
async fn self_cycle_is_cut_on_first_repeat() {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert_type(TypeDefinition::new("Loop").with_super_types(["Loop"]).with_attributes([attr("x")]))
        .await;

    let resolver = AttributeResolver::new(catalog.clone());
    let fired = AtomicUsize::new(0);
    let resolved = resolver
        .resolve_with(Some("Loop"), |_| {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(catalog.fetch_count("Loop").await, 1);
    assert_eq!(resolved.attribute_names(), vec!["x"]);
    assert_eq!(resolved.cycle_skipped, 1);
    assert_eq!(resolved.depth_limited, 0);
}

#[tokio::test]
async fn branching_cycle_terminates_with_default_options() {
    // X -> [Y, Z], Y -> [X], Z -> [X]
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert_type(TypeDefinition::new("X").with_super_types(["Y", "Z"]).with_attributes([attr("x")]))
        .await;
    catalog
        .insert_type(TypeDefinition::new("Y").with_super_types(["X"]).with_attributes([attr("y")]))
        .await;
    catalog
        .insert_type(TypeDefinition::new("Z").with_super_types(["X"]).with_attributes([attr("z")]))
        .await;

    let resolver = AttributeResolver::new(catalog.clone());
    let fired = AtomicUsize::new(0);
    let resolved = resolver
        .resolve_with(Some("X"), |_| {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(resolved.fetches_issued, 3);
    assert_eq!(catalog.fetch_count("X").await, 1);
    assert_eq!(resolved.cycle_skipped, 2);
    assert_eq!(resolved.depth_limited, 0);
    assert_eq!(sorted(resolved.attribute_names()), vec!["x", "y", "z"]);
}

#[tokio::test]
async fn diamond_below_a_cycle_keeps_every_path() {
    // A -> D closes a cycle on both paths through the diamond.
    let catalog = diamond().await;
    catalog
        .insert_type(TypeDefinition::new("A").with_super_types(["D"]).with_attributes([attr("a1"), attr("a2")]))
        .await;

    let resolver = AttributeResolver::new(catalog.clone());
    let resolved = resolver.resolve(Some("D")).await.unwrap();

    assert_eq!(catalog.fetch_count("A").await, 2);
    assert_eq!(resolved.fetches_issued, 5);
    assert_eq!(resolved.cycle_skipped, 2);
}

#[tokio::test]
async fn once_per_type_breaks_cycles_without_depth_limit() {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert_type(TypeDefinition::new("X").with_super_types(["Y"]).with_attributes([attr("x")]))
        .await;
    catalog
        .insert_type(TypeDefinition::new("Y").with_super_types(["X"]).with_attributes([attr("y")]))
        .await;

    let resolver = AttributeResolver::with_options(catalog.clone(), ResolverOptions::default().once_per_type());
    let resolved = resolver.resolve(Some("X")).await.unwrap();

    assert_eq!(resolved.attribute_names(), vec!["x", "y"]);
    assert_eq!(resolved.depth_limited, 0);
}

#[tokio::test]
async fn empty_type_name_performs_no_fetch() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let resolver = AttributeResolver::new(catalog.clone());
    let fired = AtomicUsize::new(0);

    let out = resolver
        .resolve_with(Some(""), |_| {
            fired.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert!(out.is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(catalog.fetch_log().await.is_empty());
}

#[tokio::test]
async fn separate_runs_do_not_share_state() {
    let catalog = diamond().await;
    let resolver = AttributeResolver::new(catalog.clone());

    let (first, second) = tokio::join!(resolver.resolve(Some("B")), resolver.resolve(Some("C")));

    assert_eq!(sorted(first.unwrap().attribute_names()), vec!["a1", "a2", "b"]);
    assert_eq!(sorted(second.unwrap().attribute_names()), vec!["a1", "a2", "c"]);
}
