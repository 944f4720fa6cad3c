//! Fuzz Test - Compares both containers against a reference model.
//!
//! The model is a plain `Vec` of `(insertion id, item)` pairs plus a
//! counter. Random operation streams are applied to the model and to the
//! container under test, and the observable state is compared after every
//! step.

use pricebook::{ArrayContainer, Error, Goods, InsertionId, Item, LinkedContainer, Query};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::cmp::Ordering;

const NAMES: [&str; 6] = ["apple", "bolt", "cable", "drill", "egg", "fuse"];

/// Simple reference implementation for verification
#[derive(Default)]
struct Reference {
    entries: Vec<(InsertionId, Goods)>,
    next_id: InsertionId,
}

impl Reference {
    fn push_back(&mut self, goods: Goods) -> InsertionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, goods));
        id
    }

    fn push_front(&mut self, goods: Goods) -> InsertionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(0, (id, goods));
        id
    }

    fn remove_at(&mut self, position: usize) -> Option<Goods> {
        (position < self.entries.len()).then(|| self.entries.remove(position).1)
    }

    fn get_by_id(&self, id: InsertionId) -> Option<&Goods> {
        self.entries.iter().find(|(probe, _)| *probe == id).map(|(_, g)| g)
    }

    fn named(&self, name: &str) -> Vec<&Goods> {
        self.entries.iter().map(|(_, g)| g).filter(|g| g.name() == name).collect()
    }

    fn ids(&self) -> Vec<InsertionId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    fn items(&self) -> Vec<&Goods> {
        self.entries.iter().map(|(_, g)| g).collect()
    }

    fn total(&self) -> Decimal {
        self.entries.iter().map(|(_, g)| g.price()).sum()
    }
}

fn random_goods(rng: &mut ChaCha8Rng) -> Goods {
    let name = NAMES[rng.gen_range(0..NAMES.len())];
    // Coarse prices so ties are common
    let price = Decimal::new(rng.gen_range(0..20) * 25, 2);
    match rng.gen_range(0..3) {
        0 => Goods::gadget(name, price, rng.gen_range(0..48)),
        1 => Goods::service(name, price, rng.gen_range(1..10)),
        _ => Goods::voucher(name, price),
    }
}

fn by_price_then_name(a: &Goods, b: &Goods) -> Ordering {
    a.compare(b)
}

fn by_name(a: &Goods, b: &Goods) -> Ordering {
    a.name().cmp(b.name())
}

#[test]
fn test_fuzz_linked_against_reference() {
    const SEED: u64 = 0xDEADBEEF;
    const OPS: usize = 5_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut list = LinkedContainer::new();
    let mut reference = Reference::default();

    for i in 0..OPS {
        match rng.gen_range(0..100) {
            0..=34 => {
                let goods = random_goods(&mut rng);
                let id = list.add_last(goods.clone()).unwrap();
                assert_eq!(id, reference.push_back(goods), "add_last id at op {}", i);
            }
            35..=54 => {
                let goods = random_goods(&mut rng);
                let id = list.add_first(goods.clone()).unwrap();
                assert_eq!(id, reference.push_front(goods), "add_first id at op {}", i);
            }
            55..=84 => {
                // Occasionally out of range
                let position = rng.gen_range(0..=reference.entries.len());
                match (list.remove_at(position), reference.remove_at(position)) {
                    (Ok(got), Some(expected)) => assert_eq!(got, expected, "remove at op {}", i),
                    (Err(Error::InvalidIndex { .. }), None) => {}
                    (got, expected) => panic!("op {}: got {:?}, expected {:?}", i, got, expected),
                }
            }
            85..=92 => {
                list.sort_by(by_price_then_name);
                reference.entries.sort_by(|a, b| by_price_then_name(&a.1, &b.1));
            }
            _ => {
                list.sort_by(by_name);
                reference.entries.sort_by(|a, b| by_name(&a.1, &b.1));
            }
        }

        assert_eq!(list.insertion_order(), reference.ids().as_slice(), "ids at op {}", i);
        assert_eq!(list.iter().collect::<Vec<_>>(), reference.items(), "items at op {}", i);

        if i % 50 == 0 {
            assert_eq!(list.total_price(), reference.total());
            let probe = rng.gen_range(0..=reference.next_id);
            assert_eq!(list.get_by_insertion_id(probe), reference.get_by_id(probe));
            let name = NAMES[rng.gen_range(0..NAMES.len())];
            assert_eq!(list.get_by_attribute(name), reference.named(name));
        }
    }

    println!("Fuzz test passed!");
    println!("  Operations: {}", OPS);
    println!("  Final count: {}", list.count());
}

#[test]
fn test_fuzz_array_against_reference() {
    const SEED: u64 = 0xBADC0DE;
    const OPS: usize = 3_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut array = ArrayContainer::new();
    let mut reference = Reference::default();

    for i in 0..OPS {
        match rng.gen_range(0..100) {
            0..=59 => {
                let goods = random_goods(&mut rng);
                let id = array.add(goods.clone()).unwrap();
                assert_eq!(id, reference.push_back(goods), "add id at op {}", i);
            }
            60..=94 => {
                let position = rng.gen_range(0..=reference.entries.len());
                match (array.remove_at(position), reference.remove_at(position)) {
                    (Ok(got), Some(expected)) => assert_eq!(got, expected, "remove at op {}", i),
                    (Err(Error::InvalidIndex { .. }), None) => {}
                    (got, expected) => panic!("op {}: got {:?}, expected {:?}", i, got, expected),
                }
            }
            _ => {
                // Exchange sort is not stable: check order and pairing,
                // then adopt the container's arrangement
                array.sort();
                let entries: Vec<(InsertionId, Goods)> =
                    array.entries().map(|(id, g)| (id, g.clone())).collect();

                for pair in entries.windows(2) {
                    assert_ne!(pair[0].1.compare(&pair[1].1), Ordering::Greater, "unsorted at op {}", i);
                }
                for (id, goods) in &entries {
                    assert_eq!(reference.get_by_id(*id), Some(goods), "pairing lost at op {}", i);
                }
                assert_eq!(entries.len(), reference.entries.len());
                reference.entries = entries;
            }
        }

        assert_eq!(array.insertion_order(), reference.ids().as_slice(), "ids at op {}", i);
        assert_eq!(array.iter().collect::<Vec<_>>(), reference.items(), "items at op {}", i);
    }

    assert_eq!(array.total_price(), reference.total());
    assert_eq!(array.next_insertion_id(), reference.next_id);
}

#[test]
fn test_fuzz_views_match_reference() {
    const SEED: u64 = 0x12345678;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut list = LinkedContainer::new();
    let mut reference = Reference::default();

    for _ in 0..500 {
        let goods = random_goods(&mut rng);
        list.add_last(goods.clone()).unwrap();
        reference.push_back(goods);
    }

    let mut by_price = reference.items();
    by_price.sort_by(|a, b| a.price().cmp(&b.price()));
    assert_eq!(list.sorted_by_price().collect::<Vec<_>>(), by_price);

    let mut by_name = reference.items();
    by_name.sort_by(|a, b| a.name().cmp(b.name()));
    assert_eq!(list.sorted_by_name().collect::<Vec<_>>(), by_name);

    let mut reversed = reference.items();
    reversed.reverse();
    assert_eq!(list.reversed().collect::<Vec<_>>(), reversed);

    let with_l: Vec<_> = reference.items().into_iter().filter(|g| g.name().contains('l')).collect();
    assert_eq!(list.containing("l").collect::<Vec<_>>(), with_l);

    // Views never disturb the stored order
    assert_eq!(list.insertion_order(), reference.ids().as_slice());
}
