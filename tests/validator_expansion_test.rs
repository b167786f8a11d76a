// ==========================================
// 通配校验值展开测试
// ==========================================
// 场景: 作用域展开 / 幂等 / 具体值行不变 / 展开顺序相关性
// ==========================================


use settlement_engine::domain::{DiscountType, ExpandedConditionRecord, ValidatorField};
use settlement_engine::engine::ValidatorExpansionEngine;
use test_helpers::*;

fn keys(expanded: &[ExpandedConditionRecord]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = expanded
        .iter()
        .map(|e| {
            (
                e.key(ValidatorField::Client).unwrap_or("*").to_string(),
                e.key(ValidatorField::Product).unwrap_or("*").to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn test_wildcard_product_scoped_by_client() {
    let conditions = vec![condition_for(DiscountType::Rebate, "Tonelada", 0.05, "C1", "All")];
    let transactions = vec![
        sale("C1", "P1", 1, 10.0, 100.0),
        sale("C1", "P2", 1, 10.0, 100.0),
        sale("C2", "P3", 1, 10.0, 100.0),
    ];

    let expanded =
        ValidatorExpansionEngine::expand(&conditions, &transactions, &ValidatorField::SELL_IN_ORDER);

    assert_eq!(
        keys(&expanded),
        vec![
            ("C1".to_string(), "P1".to_string()),
            ("C1".to_string(), "P2".to_string())
        ]
    );
    assert!(expanded
        .iter()
        .all(|e| !e.condition.has_wildcard_in(&ValidatorField::SELL_IN_ORDER)));
}

#[test]
fn test_expansion_is_idempotent() {
    let conditions = vec![condition(DiscountType::Rebate, "Tonelada", 0.05)];
    let transactions = vec![sale("C1", "P1", 1, 10.0, 100.0), sale("C2", "P2", 1, 5.0, 50.0)];
    let order = ValidatorField::SELL_IN_ORDER;

    let once = ValidatorExpansionEngine::expand(&conditions, &transactions, &order);
    let again_input: Vec<_> = once.iter().map(|e| e.condition.clone()).collect();
    let twice = ValidatorExpansionEngine::expand(&again_input, &transactions, &order);

    assert_eq!(keys(&once), keys(&twice));
    assert_eq!(once.len(), 2);
}

#[test]
fn test_concrete_rows_pass_through() {
    let mut concrete = condition_for(DiscountType::Rebate, "Tonelada", 0.05, "C9", "P9");
    concrete.recipient = v("R-C9");
    concrete.stage = v("Engorde");
    concrete.family = v("Nicovita Classic");
    let transactions = vec![sale("C1", "P1", 1, 10.0, 100.0)];

    let expanded = ValidatorExpansionEngine::expand(
        &[concrete.clone()],
        &transactions,
        &ValidatorField::SELL_IN_ORDER,
    );

    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].condition, concrete);
}

#[test]
fn test_expansion_order_matters() {
    // client 通配 + product 具体: 先展开 client 时不受 product 约束
    let conditions = vec![condition_for(DiscountType::Rebate, "Tonelada", 0.05, "All", "P1")];
    let transactions = vec![sale("C1", "P1", 1, 10.0, 100.0), sale("C2", "P2", 1, 5.0, 50.0)];

    let client_first = ValidatorExpansionEngine::expand(
        &conditions,
        &transactions,
        &[ValidatorField::Client, ValidatorField::Product],
    );
    let product_first = ValidatorExpansionEngine::expand(
        &conditions,
        &transactions,
        &[ValidatorField::Product, ValidatorField::Client],
    );

    assert_eq!(client_first.len(), 2);
    assert_eq!(product_first.len(), 1);
    assert_eq!(product_first[0].key(ValidatorField::Client), Some("C1"));
}

#[test]
fn test_conditions_not_mutated() {
    let conditions = vec![condition(DiscountType::Rebate, "Tonelada", 0.05)];
    let before = conditions.clone();
    let transactions = vec![sale("C1", "P1", 1, 10.0, 100.0)];

    let _ =
        ValidatorExpansionEngine::expand(&conditions, &transactions, &ValidatorField::SELL_IN_ORDER);

    assert_eq!(conditions, before);
}
