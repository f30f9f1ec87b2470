//! Property-based tests for the purchase protocol.
//!
//! Random inventories and random operation sequences are applied to a
//! machine; the invariants are checked after every step.

use proptest::prelude::*;
use std::collections::HashMap;
use vendingmachine::domain::item::Item;
use vendingmachine::domain::machine::{
    Command, PurchaseMachine, Snapshot, StateKind, TransitionInput,
};
use vendingmachine::error::MachineError;

const NAMES: [&str; 4] = ["coke", "coffee", "milk", "tea"];

prop_compose! {
    fn arbitrary_item()(name in 0..NAMES.len(), count in 0u32..3, price in 0u32..200) -> Item {
        Item::new(NAMES[name], count, price)
    }
}

fn arbitrary_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (-50i64..300).prop_map(Command::InsertFunds),
        // "water" is never stocked.
        prop::sample::select(vec!["coke", "coffee", "milk", "tea", "water"])
            .prop_map(|name| Command::SelectProduct(name.to_string())),
        Just(Command::Deliver),
        Just(Command::Abort),
    ]
}

fn counts(snapshot: &Snapshot) -> HashMap<String, u32> {
    snapshot
        .inventory
        .iter()
        .map(|item| (item.name.clone(), item.count))
        .collect()
}

fn check_invariants(snapshot: &Snapshot, initial: &HashMap<String, u32>) -> Result<(), TestCaseError> {
    match snapshot.state {
        StateKind::Idle => {
            prop_assert!(snapshot.inserted_amount.is_none());
            prop_assert!(snapshot.selected_product.is_none());
        }
        StateKind::Selecting => {
            prop_assert!(snapshot.inserted_amount.is_some());
            prop_assert!(snapshot.selected_product.is_none());
        }
        StateKind::Delivering => {
            prop_assert!(snapshot.inserted_amount.is_some());
            let product = snapshot.selected_product.as_ref().unwrap();
            prop_assert!(initial.contains_key(product));
        }
    }
    for (name, count) in counts(snapshot) {
        prop_assert!(count <= initial[&name]);
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_for_any_sequence(
        items in prop::collection::vec(arbitrary_item(), 0..6),
        commands in prop::collection::vec(arbitrary_command(), 0..40),
    ) {
        let machine = PurchaseMachine::new(items);
        let initial = counts(&machine.snapshot());

        for command in commands {
            let before = machine.snapshot();
            if machine.apply(command).is_err() {
                // Failed operations have no observable effect.
                prop_assert_eq!(machine.snapshot(), before);
            }
            check_invariants(&machine.snapshot(), &initial)?;
        }
    }

    #[test]
    fn insert_succeeds_only_when_idle(
        commands in prop::collection::vec(arbitrary_command(), 0..20),
        amount in -100i64..1000,
    ) {
        let machine = PurchaseMachine::new(vec![Item::new("coffee", 2, 50)]);
        for command in commands {
            let _ = machine.apply(command);
        }

        let was_idle = machine.state() == StateKind::Idle;
        let result = machine.insert_funds(amount);
        prop_assert_eq!(result.is_ok(), was_idle);
        if was_idle {
            prop_assert_eq!(machine.state(), StateKind::Selecting);
            prop_assert_eq!(machine.inserted_amount(), Some(amount));
        } else {
            let is_bad_state = matches!(result, Err(MachineError::BadState { .. }));
            prop_assert!(is_bad_state);
        }
    }

    #[test]
    fn select_decision_table(
        count in 0u32..3,
        price in 0u32..200,
        inserted in -50i64..300,
    ) {
        let machine = PurchaseMachine::new(vec![Item::new("coffee", count, price)]);
        machine.insert_funds(inserted).unwrap();

        let result = machine.select_product("coffee");
        if count < 1 {
            prop_assert_eq!(result, Err(MachineError::OutOfStock("coffee".to_string())));
            prop_assert_eq!(machine.state(), StateKind::Selecting);
        } else if inserted < i64::from(price) {
            let is_insufficient = matches!(result, Err(MachineError::InsufficientFunds { .. }));
            prop_assert!(is_insufficient);
            prop_assert_eq!(machine.state(), StateKind::Selecting);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(machine.state(), StateKind::Delivering);

            let delivery = machine.deliver().unwrap();
            prop_assert_eq!(delivery.balance, inserted - i64::from(price));
            prop_assert_eq!(machine.item("coffee").unwrap().count, count - 1);
            prop_assert_eq!(machine.state(), StateKind::Idle);
        }
    }

    #[test]
    fn unknown_product_is_always_invalid(count in 0u32..3, price in 0u32..200, inserted in -50i64..300) {
        let machine = PurchaseMachine::new(vec![Item::new("coffee", count, price)]);
        machine.insert_funds(inserted).unwrap();
        prop_assert_eq!(
            machine.select_product("water"),
            Err(MachineError::InvalidProduct("water".to_string()))
        );
    }

    #[test]
    fn abort_is_total_and_idempotent(
        commands in prop::collection::vec(arbitrary_command(), 0..20),
        repeats in 1usize..4,
    ) {
        let machine = PurchaseMachine::new(vec![Item::new("coke", 1, 100), Item::new("coffee", 2, 50)]);
        for command in commands {
            let _ = machine.apply(command);
        }
        let stock = counts(&machine.snapshot());

        for _ in 0..repeats {
            machine.abort();
        }
        let snapshot = machine.snapshot();
        prop_assert_eq!(snapshot.state, StateKind::Idle);
        prop_assert_eq!(snapshot.inserted_amount, None);
        prop_assert_eq!(snapshot.selected_product.clone(), None);
        prop_assert_eq!(counts(&snapshot), stock);
    }

    #[test]
    fn transit_matches_operations(
        commands in prop::collection::vec(arbitrary_command(), 0..30),
    ) {
        let items = vec![Item::new("coke", 1, 100), Item::new("coffee", 2, 50), Item::new("milk", 0, 80)];
        let by_ops = PurchaseMachine::new(items.clone());
        let by_transit = PurchaseMachine::new(items);

        for command in commands {
            // Feed both machines the same data; transit picks the field the
            // state needs, the operation side does the same by hand.
            let input = match &command {
                Command::InsertFunds(amount) => TransitionInput::insert(*amount),
                Command::SelectProduct(name) => TransitionInput::select(name.clone()),
                Command::Deliver | Command::Abort => TransitionInput::default(),
            };
            if command == Command::Abort {
                by_ops.abort();
                by_transit.abort();
            } else {
                let expected = match by_ops.state() {
                    StateKind::Idle => input.inserted_amount.map(Command::InsertFunds),
                    StateKind::Selecting => input.selected_product.clone().map(Command::SelectProduct),
                    StateKind::Delivering => Some(Command::Deliver),
                };
                let ops_result = match expected {
                    Some(cmd) => by_ops.apply(cmd).map(|_| ()),
                    None => Err(MachineError::MissingInput("")),
                };
                let transit_result = by_transit.transit(input).map(|_| ());
                prop_assert_eq!(ops_result.is_ok(), transit_result.is_ok());
            }
            prop_assert_eq!(by_ops.snapshot(), by_transit.snapshot());
        }
    }
}
