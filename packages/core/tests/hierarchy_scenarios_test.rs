//! Integration tests for the hierarchy manager over libsql
//!
//! Tests cover:
//! - Create/get round trips with resolved parent names
//! - Forest completeness after mixed mutations
//! - Cycle rejection on re-parenting
//! - The three delete policies end to end

use anyhow::Result;
use orgchart_core::{
    db::{DatabaseService, PositionStore, TursoStore},
    Position, PositionInput, PositionService, PositionServiceError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

/// Test helper: Create a test environment
async fn create_test_env() -> Result<(Arc<TursoStore>, PositionService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db = Arc::new(DatabaseService::new(db_path).await?);
    let store = Arc::new(TursoStore::new(db));
    let service = PositionService::new(store.clone());

    Ok((store, service, temp_dir))
}

async fn create(service: &PositionService, name: &str, parent: Option<&Position>) -> Result<Position> {
    let input = PositionInput::new(name, "", parent.map(|p| p.id.clone()));
    Ok(service.create_position(input).await?)
}

/// id -> parent id for every position in the forest, checking each appears once
fn flatten(forest: &[Position], parent: Option<&str>, out: &mut HashMap<String, Option<String>>) {
    for position in forest {
        assert_eq!(position.parent_id.as_deref(), parent);
        let previous = out.insert(position.id.clone(), position.parent_id.clone());
        assert!(previous.is_none(), "{} appears twice", position.id);
        flatten(&position.children, Some(&position.id), out);
    }
}

// =========================================================================
// Round Trips
// =========================================================================

#[tokio::test]
async fn test_get_after_create_matches() -> Result<()> {
    let (_store, service, _temp_dir) = create_test_env().await?;

    let ceo = service
        .create_position(PositionInput::new("CEO", "Runs the company", None))
        .await?;
    let cto = service
        .create_position(PositionInput::new("CTO", "Runs tech", Some(ceo.id.clone())))
        .await?;

    for created in [&ceo, &cto] {
        let fetched = service.get_position(&created.id).await?.expect("position exists");
        assert_eq!(&fetched, created);
    }
    assert_eq!(cto.parent_name.as_deref(), Some("CEO"));

    Ok(())
}

#[tokio::test]
async fn test_blank_name_is_rejected_and_nothing_is_written() -> Result<()> {
    let (store, service, _temp_dir) = create_test_env().await?;

    let result = service
        .create_position(PositionInput::new("", "no name", None))
        .await;
    assert!(matches!(result, Err(PositionServiceError::ValidationFailed(_))));
    assert!(store.list_positions().await?.is_empty());

    Ok(())
}

// =========================================================================
// Forest Completeness
// =========================================================================

#[tokio::test]
async fn test_hierarchy_contains_every_position_once() -> Result<()> {
    let (_store, service, _temp_dir) = create_test_env().await?;

    let ceo = create(&service, "CEO", None).await?;
    let cto = create(&service, "CTO", Some(&ceo)).await?;
    let cfo = create(&service, "CFO", Some(&ceo)).await?;
    let eng = create(&service, "Eng Manager", Some(&cto)).await?;
    let dev = create(&service, "Developer", Some(&eng)).await?;
    let accountant = create(&service, "Accountant", Some(&cfo)).await?;
    create(&service, "Advisory Board", None).await?;

    // Move the developer under finance, then drop the CFO with reassignment
    service
        .update_position(&dev.id, PositionInput::new("Developer", "", Some(cfo.id.clone())))
        .await?;
    service.delete_position_with_reassignment(&cfo.id).await?;
    service.delete_position(&accountant.id).await?;

    let forest = service.get_hierarchy().await?;
    let mut placed = HashMap::new();
    flatten(&forest, None, &mut placed);

    let all = service.list_positions().await?;
    assert_eq!(placed.len(), all.len());
    for position in &all {
        assert_eq!(placed.get(&position.id), Some(&position.parent_id));
    }
    assert_eq!(placed.get(&dev.id), Some(&Some(ceo.id.clone())));
    assert!(service.check_integrity().await?.healthy);

    Ok(())
}

// =========================================================================
// Cycle Rejection
// =========================================================================

#[tokio::test]
async fn test_self_parent_is_rejected() -> Result<()> {
    let (_store, service, _temp_dir) = create_test_env().await?;
    let ceo = create(&service, "CEO", None).await?;

    let result = service
        .update_position(&ceo.id, PositionInput::new("CEO", "", Some(ceo.id.clone())))
        .await;
    assert!(matches!(result, Err(PositionServiceError::InvalidReference { .. })));

    Ok(())
}

#[tokio::test]
async fn test_three_cycle_is_rejected() -> Result<()> {
    let (store, service, _temp_dir) = create_test_env().await?;
    let a = create(&service, "A", None).await?;
    let b = create(&service, "B", Some(&a)).await?;
    let c = create(&service, "C", Some(&b)).await?;

    let result = service
        .update_position(&a.id, PositionInput::new("A", "", Some(c.id.clone())))
        .await;
    assert!(matches!(result, Err(PositionServiceError::InvalidReference { .. })));

    let a_after = store.get_position(&a.id).await?.expect("A still exists");
    assert!(a_after.is_root());

    Ok(())
}

// =========================================================================
// Delete Policies
// =========================================================================

#[tokio::test]
async fn test_simple_delete_with_children_leaves_store_unchanged() -> Result<()> {
    let (store, service, _temp_dir) = create_test_env().await?;
    let ceo = create(&service, "CEO", None).await?;
    create(&service, "CTO", Some(&ceo)).await?;
    let before = store.list_positions().await?;

    let result = service.delete_position(&ceo.id).await;
    assert!(matches!(
        result,
        Err(PositionServiceError::HasChildren { child_count: 1, .. })
    ));
    assert_eq!(store.list_positions().await?, before);

    Ok(())
}

#[tokio::test]
async fn test_reassign_scenario() -> Result<()> {
    let (_store, service, _temp_dir) = create_test_env().await?;
    let ceo = create(&service, "CEO", None).await?;
    let cto = create(&service, "CTO", Some(&ceo)).await?;
    let eng = create(&service, "Eng Manager", Some(&cto)).await?;

    assert!(service.delete_position_with_reassignment(&cto.id).await?);

    let eng_after = service.get_position(&eng.id).await?.expect("Eng Manager exists");
    assert_eq!(eng_after.parent_id, Some(ceo.id.clone()));
    assert_eq!(eng_after.parent_name.as_deref(), Some("CEO"));

    let all = service.list_positions().await?;
    assert!(all.iter().all(|p| p.id != cto.id));
    assert_eq!(all.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_cascade_scenario() -> Result<()> {
    let (_store, service, _temp_dir) = create_test_env().await?;
    let ceo = create(&service, "CEO", None).await?;
    let cto = create(&service, "CTO", Some(&ceo)).await?;
    let eng = create(&service, "Eng Manager", Some(&cto)).await?;

    assert!(service.delete_position_cascade(&cto.id).await?);

    let ids: Vec<String> = service
        .list_positions()
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![ceo.id.clone()]);
    assert!(!ids.contains(&eng.id));
    assert!(service.check_integrity().await?.dangling.is_empty());

    Ok(())
}
