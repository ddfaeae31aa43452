//! Movement processing tests
//!
//! Tests for the movement ledger core including:
//! - Shape rules per movement type (IN, OUT, TRANSFER)
//! - Balance effect planning for create, update and delete
//! - The non-negative balance invariant under movement sequences

use proptest::prelude::*;
use shared::models::{merge_deltas, transition_deltas, LedgerDelta, MovementRoute, MovementType};
use uuid::Uuid;

/// Deterministic warehouse ids whose sort order follows the argument
fn wid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_movement_type_round_trip() {
        for movement_type in [MovementType::In, MovementType::Out, MovementType::Transfer] {
            assert_eq!(
                MovementType::from_str(movement_type.as_str()),
                Some(movement_type)
            );
        }
        assert_eq!(MovementType::from_str("SIDEWAYS"), None);
    }

    #[test]
    fn test_resolve_in_valid() {
        let route = MovementRoute::resolve(MovementType::In, None, Some(wid(1))).unwrap();
        assert_eq!(route, MovementRoute::Inbound { to: wid(1) });
        assert_eq!(route.movement_type(), MovementType::In);
        assert_eq!(route.warehouse_from(), None);
        assert_eq!(route.warehouse_to(), Some(wid(1)));
    }

    #[test]
    fn test_resolve_in_with_source_rejected() {
        // warehouse_from must be absent for IN movements
        let result = MovementRoute::resolve(MovementType::In, Some(wid(1)), Some(wid(1)));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_in_missing_destination() {
        assert!(MovementRoute::resolve(MovementType::In, None, None).is_err());
    }

    #[test]
    fn test_resolve_out_valid() {
        let route = MovementRoute::resolve(MovementType::Out, Some(wid(2)), None).unwrap();
        assert_eq!(route, MovementRoute::Outbound { from: wid(2) });
        assert_eq!(route.warehouse_from(), Some(wid(2)));
        assert_eq!(route.warehouse_to(), None);
    }

    #[test]
    fn test_resolve_out_with_destination_rejected() {
        assert!(MovementRoute::resolve(MovementType::Out, Some(wid(1)), Some(wid(2))).is_err());
    }

    #[test]
    fn test_resolve_out_missing_source() {
        assert!(MovementRoute::resolve(MovementType::Out, None, None).is_err());
    }

    #[test]
    fn test_resolve_transfer_valid() {
        let route =
            MovementRoute::resolve(MovementType::Transfer, Some(wid(1)), Some(wid(2))).unwrap();
        assert_eq!(
            route,
            MovementRoute::Transfer {
                from: wid(1),
                to: wid(2)
            }
        );
    }

    #[test]
    fn test_resolve_transfer_same_warehouse_rejected() {
        assert!(
            MovementRoute::resolve(MovementType::Transfer, Some(wid(1)), Some(wid(1))).is_err()
        );
    }

    #[test]
    fn test_resolve_transfer_missing_endpoint() {
        assert!(MovementRoute::resolve(MovementType::Transfer, Some(wid(1)), None).is_err());
        assert!(MovementRoute::resolve(MovementType::Transfer, None, Some(wid(2))).is_err());
        assert!(MovementRoute::resolve(MovementType::Transfer, None, None).is_err());
    }

    #[test]
    fn test_apply_deltas_in() {
        let route = MovementRoute::Inbound { to: wid(1) };
        assert_eq!(route.apply_deltas(10), vec![LedgerDelta::new(wid(1), 10)]);
    }

    #[test]
    fn test_apply_deltas_out() {
        let route = MovementRoute::Outbound { from: wid(1) };
        assert_eq!(route.apply_deltas(10), vec![LedgerDelta::new(wid(1), -10)]);
    }

    #[test]
    fn test_apply_deltas_transfer() {
        let route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(2),
        };
        assert_eq!(
            route.apply_deltas(4),
            vec![LedgerDelta::new(wid(1), -4), LedgerDelta::new(wid(2), 4)]
        );
    }

    #[test]
    fn test_reversal_deltas_negate_application() {
        let route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(2),
        };
        assert_eq!(
            route.reversal_deltas(4),
            vec![LedgerDelta::new(wid(1), 4), LedgerDelta::new(wid(2), -4)]
        );
    }

    /// A quantity-only edit of an IN must reach the ledger as a single net
    /// delta; reversing the old receipt first could spuriously fail the
    /// non-negative check.
    #[test]
    fn test_transition_in_quantity_only_coalesces() {
        let route = MovementRoute::Inbound { to: wid(1) };
        let deltas = transition_deltas(&route, 10, &route, 12);
        assert_eq!(deltas, vec![LedgerDelta::new(wid(1), 2)]);
    }

    #[test]
    fn test_transition_out_quantity_only_coalesces() {
        let route = MovementRoute::Outbound { from: wid(1) };
        let deltas = transition_deltas(&route, 10, &route, 12);
        assert_eq!(deltas, vec![LedgerDelta::new(wid(1), -2)]);
    }

    /// Moving a transfer's destination removes the old destination's credit
    /// and adds the new destination's credit; the unchanged origin nets out.
    #[test]
    fn test_transition_transfer_destination_change() {
        let old_route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(2),
        };
        let new_route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(3),
        };
        let deltas = transition_deltas(&old_route, 4, &new_route, 4);
        assert_eq!(
            deltas,
            vec![LedgerDelta::new(wid(2), -4), LedgerDelta::new(wid(3), 4)]
        );
    }

    #[test]
    fn test_transition_transfer_quantity_change() {
        let route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(2),
        };
        let deltas = transition_deltas(&route, 4, &route, 6);
        assert_eq!(
            deltas,
            vec![LedgerDelta::new(wid(1), -2), LedgerDelta::new(wid(2), 2)]
        );
    }

    /// Swapping both endpoints of a transfer must restore both old balances
    /// and charge both new ones.
    #[test]
    fn test_transition_transfer_full_pair_change() {
        let old_route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(2),
        };
        let new_route = MovementRoute::Transfer {
            from: wid(3),
            to: wid(4),
        };
        let deltas = transition_deltas(&old_route, 5, &new_route, 5);
        assert_eq!(
            deltas,
            vec![
                LedgerDelta::new(wid(1), 5),
                LedgerDelta::new(wid(2), -5),
                LedgerDelta::new(wid(3), -5),
                LedgerDelta::new(wid(4), 5),
            ]
        );
    }

    #[test]
    fn test_transition_identical_is_noop() {
        let route = MovementRoute::Transfer {
            from: wid(1),
            to: wid(2),
        };
        assert!(transition_deltas(&route, 4, &route, 4).is_empty());
    }

    #[test]
    fn test_merge_deltas_sorts_by_warehouse() {
        let deltas = merge_deltas(vec![
            LedgerDelta::new(wid(3), 1),
            LedgerDelta::new(wid(1), 2),
            LedgerDelta::new(wid(2), 3),
        ]);
        let warehouses: Vec<Uuid> = deltas.iter().map(|d| d.warehouse_id).collect();
        assert_eq!(warehouses, vec![wid(1), wid(2), wid(3)]);
    }

    #[test]
    fn test_merge_deltas_drops_zero_entries() {
        let deltas = merge_deltas(vec![
            LedgerDelta::new(wid(1), 4),
            LedgerDelta::new(wid(1), -4),
            LedgerDelta::new(wid(2), 1),
        ]);
        assert_eq!(deltas, vec![LedgerDelta::new(wid(2), 1)]);
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[cfg(test)]
mod scenario_tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory stand-in for the inventory balances of one product,
    /// applying a delta set with the same all-or-nothing, never-negative
    /// semantics as the transactional adjust primitive.
    #[derive(Default)]
    struct Ledger {
        balances: HashMap<Uuid, i64>,
    }

    impl Ledger {
        fn apply(&mut self, deltas: &[LedgerDelta]) -> Result<(), &'static str> {
            let mut staged = self.balances.clone();
            for d in deltas {
                let balance = staged.entry(d.warehouse_id).or_insert(0);
                *balance += d.delta;
                if *balance < 0 {
                    return Err("insufficient stock");
                }
            }
            self.balances = staged;
            Ok(())
        }

        fn commit(&mut self, route: &MovementRoute, quantity: i64) -> Result<(), &'static str> {
            self.apply(&merge_deltas(route.apply_deltas(quantity)))
        }

        fn balance(&self, warehouse_id: Uuid) -> i64 {
            self.balances.get(&warehouse_id).copied().unwrap_or(0)
        }
    }

    /// Receipt, transfer, then an over-issue that must be rejected with the
    /// balances left unchanged.
    #[test]
    fn test_receipt_transfer_issue_scenario() {
        let (x, y) = (wid(1), wid(2));
        let mut ledger = Ledger::default();

        ledger
            .commit(&MovementRoute::Inbound { to: x }, 10)
            .unwrap();
        assert_eq!(ledger.balance(x), 10);

        ledger
            .commit(&MovementRoute::Transfer { from: x, to: y }, 4)
            .unwrap();
        assert_eq!(ledger.balance(x), 6);
        assert_eq!(ledger.balance(y), 4);

        // Only 6 available at x
        let result = ledger.commit(&MovementRoute::Outbound { from: x }, 7);
        assert!(result.is_err());
        assert_eq!(ledger.balance(x), 6);
        assert_eq!(ledger.balance(y), 4);
    }

    #[test]
    fn test_in_then_out_round_trip() {
        let x = wid(1);
        let mut ledger = Ledger::default();
        ledger.commit(&MovementRoute::Inbound { to: x }, 25).unwrap();
        ledger
            .commit(&MovementRoute::Inbound { to: x }, 7)
            .unwrap();
        ledger
            .commit(&MovementRoute::Outbound { from: x }, 7)
            .unwrap();
        assert_eq!(ledger.balance(x), 25);
    }

    #[test]
    fn test_create_then_delete_round_trip() {
        let (x, y) = (wid(1), wid(2));
        let mut ledger = Ledger::default();
        ledger.commit(&MovementRoute::Inbound { to: x }, 10).unwrap();

        let transfer = MovementRoute::Transfer { from: x, to: y };
        ledger.commit(&transfer, 4).unwrap();
        ledger
            .apply(&merge_deltas(transfer.reversal_deltas(4)))
            .unwrap();

        assert_eq!(ledger.balance(x), 10);
        assert_eq!(ledger.balance(y), 0);
    }

    /// Two debits of 3 against a balance of 5 pass through the serialized
    /// adjust boundary one at a time; exactly one succeeds.
    #[test]
    fn test_concurrent_debits_exactly_one_succeeds() {
        let x = wid(1);
        let mut ledger = Ledger::default();
        ledger.commit(&MovementRoute::Inbound { to: x }, 5).unwrap();

        let out = MovementRoute::Outbound { from: x };
        let first = ledger.commit(&out, 3);
        let second = ledger.commit(&out, 3);

        assert!(first.is_ok());
        assert!(second.is_err());
        assert_eq!(ledger.balance(x), 2);
    }

    #[test]
    fn test_update_transfer_destination_moves_credit() {
        let (x, y, z) = (wid(1), wid(2), wid(3));
        let mut ledger = Ledger::default();
        ledger.commit(&MovementRoute::Inbound { to: x }, 10).unwrap();

        let old_route = MovementRoute::Transfer { from: x, to: y };
        ledger.commit(&old_route, 4).unwrap();

        let new_route = MovementRoute::Transfer { from: x, to: z };
        ledger
            .apply(&transition_deltas(&old_route, 4, &new_route, 4))
            .unwrap();

        assert_eq!(ledger.balance(x), 6);
        assert_eq!(ledger.balance(y), 0);
        assert_eq!(ledger.balance(z), 4);
    }

    /// Deleting a receipt whose stock was already issued elsewhere must be
    /// rejected rather than driving the balance negative.
    #[test]
    fn test_delete_rejected_when_stock_already_consumed() {
        let x = wid(1);
        let mut ledger = Ledger::default();

        let receipt = MovementRoute::Inbound { to: x };
        ledger.commit(&receipt, 10).unwrap();
        ledger
            .commit(&MovementRoute::Outbound { from: x }, 10)
            .unwrap();

        let result = ledger.apply(&merge_deltas(receipt.reversal_deltas(10)));
        assert!(result.is_err());
        assert_eq!(ledger.balance(x), 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use std::collections::HashMap;

    fn quantity_strategy() -> impl Strategy<Value = i64> {
        1i64..=1000
    }

    /// Small warehouse pool so sequences revisit the same balances
    fn warehouse_strategy() -> impl Strategy<Value = Uuid> {
        (1u128..=4).prop_map(Uuid::from_u128)
    }

    fn route_strategy() -> impl Strategy<Value = MovementRoute> {
        prop_oneof![
            warehouse_strategy().prop_map(|to| MovementRoute::Inbound { to }),
            warehouse_strategy().prop_map(|from| MovementRoute::Outbound { from }),
            (warehouse_strategy(), warehouse_strategy())
                .prop_filter("transfer endpoints must differ", |(from, to)| from != to)
                .prop_map(|(from, to)| MovementRoute::Transfer { from, to }),
        ]
    }

    /// Apply a delta set to balances, rejecting any negative intermediate
    fn try_apply(balances: &mut HashMap<Uuid, i64>, deltas: &[LedgerDelta]) -> bool {
        let mut staged = balances.clone();
        for d in deltas {
            let balance = staged.entry(d.warehouse_id).or_insert(0);
            *balance += d.delta;
            if *balance < 0 {
                return false;
            }
        }
        *balances = staged;
        true
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any movement sequence, every stored balance equals the signed
        /// sum of the committed effects and is never negative.
        #[test]
        fn prop_balance_is_signed_sum_of_committed_effects(
            movements in prop::collection::vec((route_strategy(), quantity_strategy()), 1..40)
        ) {
            let mut balances: HashMap<Uuid, i64> = HashMap::new();
            let mut committed: HashMap<Uuid, i64> = HashMap::new();

            for (route, quantity) in &movements {
                let deltas = merge_deltas(route.apply_deltas(*quantity));
                if try_apply(&mut balances, &deltas) {
                    for d in deltas {
                        *committed.entry(d.warehouse_id).or_insert(0) += d.delta;
                    }
                }
            }

            for (warehouse_id, balance) in &balances {
                prop_assert!(*balance >= 0);
                prop_assert_eq!(*balance, committed.get(warehouse_id).copied().unwrap_or(0));
            }
        }

        /// Creating a movement and then deleting it leaves every balance
        /// where it started.
        #[test]
        fn prop_create_then_delete_round_trips(
            seed in prop::collection::vec((warehouse_strategy(), quantity_strategy()), 0..8),
            route in route_strategy(),
            quantity in quantity_strategy()
        ) {
            let mut balances: HashMap<Uuid, i64> = HashMap::new();
            for (warehouse_id, amount) in &seed {
                *balances.entry(*warehouse_id).or_insert(0) += amount;
            }
            let before = balances.clone();

            if try_apply(&mut balances, &merge_deltas(route.apply_deltas(quantity))) {
                let reversed = try_apply(&mut balances, &merge_deltas(route.reversal_deltas(quantity)));
                prop_assert!(reversed);
            }

            // Compare effective quantities; a lazily materialized row at 0
            // is the same balance as no row at all.
            for warehouse_id in balances.keys().chain(before.keys()) {
                prop_assert_eq!(
                    balances.get(warehouse_id).copied().unwrap_or(0),
                    before.get(warehouse_id).copied().unwrap_or(0)
                );
            }
        }

        /// The merged transition deltas carry exactly the same net effect per
        /// warehouse as reversing the old movement and applying the new one.
        #[test]
        fn prop_transition_matches_reverse_then_apply(
            old_route in route_strategy(),
            old_quantity in quantity_strategy(),
            new_route in route_strategy(),
            new_quantity in quantity_strategy()
        ) {
            let mut expected: HashMap<Uuid, i64> = HashMap::new();
            for d in old_route.reversal_deltas(old_quantity) {
                *expected.entry(d.warehouse_id).or_insert(0) += d.delta;
            }
            for d in new_route.apply_deltas(new_quantity) {
                *expected.entry(d.warehouse_id).or_insert(0) += d.delta;
            }
            expected.retain(|_, delta| *delta != 0);

            let merged: HashMap<Uuid, i64> =
                transition_deltas(&old_route, old_quantity, &new_route, new_quantity)
                    .into_iter()
                    .map(|d| (d.warehouse_id, d.delta))
                    .collect();

            prop_assert_eq!(merged, expected);
        }

        /// A transfer conserves total stock; receipts and issues change it by
        /// exactly the movement quantity.
        #[test]
        fn prop_apply_deltas_net_quantity(
            route in route_strategy(),
            quantity in quantity_strategy()
        ) {
            let net: i64 = route.apply_deltas(quantity).iter().map(|d| d.delta).sum();
            let expected = match route.movement_type() {
                MovementType::In => quantity,
                MovementType::Out => -quantity,
                MovementType::Transfer => 0,
            };
            prop_assert_eq!(net, expected);
        }

        /// Merged deltas are strictly sorted with one entry per warehouse.
        #[test]
        fn prop_merge_deltas_sorted_and_unique(
            deltas in prop::collection::vec(
                (warehouse_strategy(), -1000i64..=1000),
                0..20
            )
        ) {
            let merged = merge_deltas(
                deltas.iter().map(|(w, d)| LedgerDelta::new(*w, *d)).collect()
            );

            for pair in merged.windows(2) {
                prop_assert!(pair[0].warehouse_id < pair[1].warehouse_id);
            }
            for d in &merged {
                prop_assert!(d.delta != 0);
            }
        }
    }
}
