#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use slrukit::ds::{IndexedList, ListId, SlotId, SlotPool};

// Fuzz arbitrary operation sequences on two IndexedLists sharing a pool
//
// Slots move between the lists and a detached set; each list is compared
// against a VecDeque model and its structural walk must stay clean.
fuzz_target!(|data: &[u8]| {
    const SLOTS: usize = 32;

    let mut pool: SlotPool<u8, u8> = SlotPool::with_capacity(SLOTS);
    let ids: Vec<SlotId> = pool.ids().collect();
    let mut lists = [
        IndexedList::new(ListId::Probationary),
        IndexedList::new(ListId::Protected),
    ];
    let mut models: [VecDeque<SlotId>; 2] = [VecDeque::new(), VecDeque::new()];
    let mut detached: Vec<SlotId> = ids.clone();

    for chunk in data.chunks_exact(2) {
        let op = chunk[0] % 5;
        let which = usize::from(chunk[0] >> 7);
        let id = ids[usize::from(chunk[1]) % SLOTS];

        let list = &mut lists[which];
        let model = &mut models[which];

        match op {
            0 => {
                // push_front of a detached slot
                if let Some(pos) = detached.iter().position(|&d| d == id) {
                    detached.swap_remove(pos);
                    list.push_front(&mut pool, id);
                    model.push_front(id);
                }
            }
            1 => {
                // pop_front
                let popped = list.pop_front(&mut pool);
                assert_eq!(popped, model.pop_front());
                detached.extend(popped);
            }
            2 => {
                // pop_back
                let popped = list.pop_back(&mut pool);
                assert_eq!(popped, model.pop_back());
                detached.extend(popped);
            }
            3 => {
                // remove
                let owned = model.iter().position(|&m| m == id);
                assert_eq!(list.remove(&mut pool, id), owned.is_some());
                if let Some(pos) = owned {
                    model.remove(pos);
                    detached.push(id);
                }
            }
            4 => {
                // move_to_front
                let owned = model.iter().position(|&m| m == id);
                assert_eq!(list.move_to_front(&mut pool, id), owned.is_some());
                if let Some(pos) = owned {
                    model.remove(pos);
                    model.push_front(id);
                    assert_eq!(list.front(), Some(id));
                }
            }
            _ => unreachable!(),
        }

        for (list, model) in lists.iter().zip(models.iter()) {
            let mut violations = Vec::new();
            list.collect_violations(&pool, &mut violations);
            assert!(violations.is_empty(), "{violations:?}");

            assert_eq!(list.len(), model.len());
            assert!(list.iter(&pool).eq(model.iter().copied()));
            assert!(list.iter_rev(&pool).eq(model.iter().rev().copied()));
        }
        assert_eq!(
            lists[0].len() + lists[1].len() + detached.len(),
            SLOTS
        );
    }
});
