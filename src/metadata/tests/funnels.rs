use std::env::temp_dir;
use std::sync::Arc;

use metadata::error::MetadataError;
use metadata::error::Result;
use metadata::funnels::CreateFunnelRequest;
use metadata::funnels::CreateFunnelStepRequest;
use metadata::funnels::Funnels;
use metadata::funnels::StepKind;
use uuid::Uuid;

fn step(name: &str, kind: StepKind, descriptor: &str) -> CreateFunnelStepRequest {
    CreateFunnelStepRequest {
        name: name.to_string(),
        kind,
        descriptor: descriptor.to_string(),
    }
}

#[test]
fn test_funnels() -> Result<()> {
    let mut path = temp_dir();
    path.push(format!("{}.db", Uuid::new_v4()));
    let db = Arc::new(metadata::rocksdb::new(path).unwrap());
    let funnels = Funnels::new(db.clone());

    // try to get, delete unexisting funnel
    assert!(funnels.get_by_id("w1", 1).is_err());
    assert!(funnels.delete("w1", 1).is_err());
    assert!(matches!(
        funnels.create_step("w1", 1, step("a", StepKind::Page, "equals:/")),
        Err(MetadataError::NotFound(_))
    ));

    let req = CreateFunnelRequest {
        created_by: Some("admin".to_string()),
        name: "signup".to_string(),
    };
    let f = funnels.create("w1", req.clone())?;
    assert_eq!(f.id, 1);
    assert_eq!(f.website_id, "w1");
    assert_eq!(funnels.get_by_id("w1", 1)?.name, "signup");
    // other websites don't see it
    assert!(funnels.get_by_id("w2", 1).is_err());
    assert!(funnels.list("w2")?.data.is_empty());

    let f2 = funnels.create("w1", req)?;
    assert_eq!(f2.id, 2);
    assert_eq!(funnels.list("w1")?.data.len(), 2);

    for (i, name) in ["landing", "pricing", "signup"].iter().enumerate() {
        let s = funnels.create_step(
            "w1",
            1,
            step(name, StepKind::Page, &format!("equals:/{name}")),
        )?;
        assert_eq!(s.id, i as u64 + 1);
    }
    funnels.create_step("w1", 2, step("paid", StepKind::Goal, "completes:paid"))?;

    let steps = funnels.list_steps("w1", 1)?;
    let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["landing", "pricing", "signup"]);
    assert_eq!(funnels.count_steps("w1", 1)?, 3);
    assert_eq!(funnels.count_steps("w1", 2)?, 1);

    funnels.delete_step("w1", 1, 2)?;
    assert!(funnels.get_step("w1", 1, 2).is_err());
    let names: Vec<String> = funnels
        .list_steps("w1", 1)?
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["landing".to_string(), "signup".to_string()]);

    funnels.delete("w1", 1)?;
    assert!(funnels.get_by_id("w1", 1).is_err());
    assert!(funnels.list_steps("w1", 1).is_err());
    assert_eq!(funnels.count_steps("w1", 1)?, 0);
    // steps of the other funnel are untouched
    assert_eq!(funnels.list_steps("w1", 2)?.len(), 1);

    Ok(())
}

#[test]
fn test_steps_are_ordered_by_creation() -> Result<()> {
    let mut path = temp_dir();
    path.push(format!("{}.db", Uuid::new_v4()));
    let db = Arc::new(metadata::rocksdb::new(path).unwrap());
    let funnels = Funnels::new(db);

    let f = funnels.create("w1", CreateFunnelRequest {
        created_by: None,
        name: "long".to_string(),
    })?;

    // ids past 9 sort differently as strings
    for i in 1..=12 {
        funnels.create_step("w1", f.id, step(&i.to_string(), StepKind::Page, "equals:/"))?;
    }

    let ids: Vec<u64> = funnels
        .list_steps("w1", f.id)?
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());

    Ok(())
}
