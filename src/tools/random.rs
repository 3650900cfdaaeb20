//! Random data tools: `generate_uuid`, `generate_random_data`.
//!
//! Both tools are non-deterministic by design; their tests assert shape and
//! ranges, not exact values. The synthetic record generator is also reused by
//! the `data://server-info` resource.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::core::catalog::{Catalog, CatalogError, ParamType, ToolError, ToolSpec, handler};

const NAME_POOL: &[&str] = &[
    "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi", "ivan", "judy",
];

/// One synthetic record. Sequential ids restart at 1 on every call; all other
/// fields come from the thread-local RNG.
#[derive(Clone, Debug, Serialize)]
pub struct SyntheticRecord {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub score: f64,
    pub active: bool,
}

pub fn register(catalog: &mut Catalog) -> Result<(), CatalogError> {
    catalog.register_tool(
        ToolSpec::new("generate_uuid", "Generates a random UUID.").returns(ParamType::Text),
        handler(|_args| Ok(json!(Uuid::new_v4().to_string()))),
    )?;

    catalog.register_tool(
        ToolSpec::new(
            "generate_random_data",
            "Generates a list of synthetic records with random fields.",
        )
        .optional(
            "count",
            ParamType::Number,
            "Number of records to generate",
            json!(5),
        )
        .returns(ParamType::Sequence),
        handler(|args| {
            let count = args.integer("count")?;
            if count < 0 {
                return Err(ToolError::Validation(
                    "argument 'count' must be non-negative".to_string(),
                ));
            }
            Ok(json!(sample_records(count as usize)))
        }),
    )?;

    Ok(())
}

/// Generate `count` synthetic records using only function-local randomness.
pub fn sample_records(count: usize) -> Vec<SyntheticRecord> {
    let mut rng = rand::thread_rng();
    (1..=count as u64)
        .map(|id| {
            let name = NAME_POOL
                .choose(&mut rng)
                .map(|base| format!("{base}{}", rng.gen_range(10..100)))
                .unwrap_or_default();
            let score = rng.gen_range(0.0..=100.0_f64);
            SyntheticRecord {
                id,
                name,
                age: rng.gen_range(18..=80),
                score: (score * 100.0).round() / 100.0,
                active: rng.gen_bool(0.5),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        register(&mut catalog).unwrap();
        catalog
    }

    #[tokio::test]
    async fn uuid_has_the_canonical_shape() {
        let out = catalog().invoke("generate_uuid", json!({})).await.unwrap();
        let text = out.as_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
        assert_eq!(text.len(), 36);
    }

    #[tokio::test]
    async fn zero_count_yields_an_empty_sequence() {
        let out = catalog()
            .invoke("generate_random_data", json!({"count": 0}))
            .await
            .unwrap();
        assert_eq!(out, json!([]));
    }

    #[tokio::test]
    async fn records_have_sequential_ids_and_bounded_fields() {
        let out = catalog()
            .invoke("generate_random_data", json!({"count": 3}))
            .await
            .unwrap();
        let records = out.as_array().unwrap();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record["id"], json!(i as u64 + 1));
            assert!(!record["name"].as_str().unwrap().is_empty());
            let age = record["age"].as_u64().unwrap();
            assert!((18..=80).contains(&age));
            let score = record["score"].as_f64().unwrap();
            assert!((0.0..=100.0).contains(&score));
            assert!(record["active"].is_boolean());
        }
    }

    #[tokio::test]
    async fn count_defaults_to_five() {
        let out = catalog()
            .invoke("generate_random_data", json!({}))
            .await
            .unwrap();
        assert_eq!(out.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn negative_or_fractional_count_is_a_validation_error() {
        let c = catalog();
        for bad in [json!({"count": -1}), json!({"count": 2.5})] {
            let err = c.invoke("generate_random_data", bad).await.unwrap_err();
            assert_eq!(err.kind(), "ValidationError");
        }
    }

    #[tokio::test]
    async fn concurrent_calls_each_restart_ids_at_one() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                tokio::spawn(async {
                    let mut catalog = Catalog::new();
                    register(&mut catalog).unwrap();
                    catalog
                        .invoke("generate_random_data", json!({"count": 4}))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            let out = handle.await.unwrap();
            let ids: Vec<u64> = out
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["id"].as_u64().unwrap())
                .collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
        }
    }
}
