//! Randomized attach/detach histories checked against a simple model.

use std::collections::{HashMap, HashSet};

use kinesis::{Entity, Signature, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
struct A(u32);
impl kinesis::Component for A {}

#[derive(Debug, Clone, PartialEq)]
struct B(u32);
impl kinesis::Component for B {}

#[derive(Debug, Clone, PartialEq)]
struct C(u32);
impl kinesis::Component for C {}

struct Model {
    owns: HashMap<Entity, HashSet<u8>>,
}

impl Model {
    fn expected(&self, world: &World, mask_members: &[u8]) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self
            .owns
            .iter()
            .filter(|(entity, owned)| {
                world.is_alive(**entity) && mask_members.iter().all(|m| owned.contains(m))
            })
            .map(|(entity, _)| *entity)
            .collect();
        entities.sort();
        entities
    }
}

fn mask_for(world: &World, members: &[u8]) -> Signature {
    let mut mask = Signature::EMPTY;
    for member in members {
        mask = mask
            | match member {
                0 => world.signature_of::<A>().unwrap(),
                1 => world.signature_of::<B>().unwrap(),
                _ => world.signature_of::<C>().unwrap(),
            };
    }
    mask
}

#[test]
fn query_matches_model_under_random_history() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut world = World::new();
    world.register_component::<A>().unwrap();
    world.register_component::<B>().unwrap();
    world.register_component::<C>().unwrap();

    let mut model = Model {
        owns: HashMap::new(),
    };
    let mut live: Vec<Entity> = Vec::new();

    for step in 0..2000u32 {
        match rng.gen_range(0..10) {
            // Spawn.
            0 | 1 | 2 => {
                let entity = world.create_entity().unwrap();
                model.owns.insert(entity, HashSet::new());
                live.push(entity);
            }
            // Attach a random component, tolerating duplicates.
            3 | 4 | 5 | 6 => {
                if live.is_empty() {
                    continue;
                }
                let entity = live[rng.gen_range(0..live.len())];
                let which = rng.gen_range(0..3u8);
                let result = match which {
                    0 => world.attach(entity, A(step)),
                    1 => world.attach(entity, B(step)),
                    _ => world.attach(entity, C(step)),
                };
                if result.is_ok() {
                    model.owns.get_mut(&entity).unwrap().insert(which);
                } else {
                    assert!(model.owns[&entity].contains(&which), "unexpected error");
                }
            }
            // Detach (no-op when absent).
            7 | 8 => {
                if live.is_empty() {
                    continue;
                }
                let entity = live[rng.gen_range(0..live.len())];
                let which = rng.gen_range(0..3u8);
                match which {
                    0 => world.detach::<A>(entity).unwrap(),
                    1 => world.detach::<B>(entity).unwrap(),
                    _ => world.detach::<C>(entity).unwrap(),
                }
                model.owns.get_mut(&entity).unwrap().remove(&which);
            }
            // Kill and sweep immediately.
            _ => {
                if live.is_empty() {
                    continue;
                }
                let index = rng.gen_range(0..live.len());
                let entity = live.swap_remove(index);
                world.kill(entity);
                world.sweep();
                model.owns.remove(&entity);
            }
        }

        if step % 50 == 0 {
            let masks: [&[u8]; 7] = [&[0], &[1], &[2], &[0, 1], &[1, 2], &[0, 1, 2], &[]];
            for members in masks {
                let mask = mask_for(&world, members);
                assert_eq!(
                    world.query(mask),
                    model.expected(&world, members),
                    "step {step}, members {members:?}"
                );
            }
        }
    }

    // Store invariants hold at the end of the run.
    let store = world.store::<A>().unwrap();
    for slot in 0..store.len() {
        let owner = store.entity_of(slot).unwrap();
        assert_eq!(store.slot_of(owner), Some(slot));
        assert!(world.is_alive(owner));
    }
}

#[test]
fn signature_reflects_every_attach_and_detach() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut world = World::new();
    let bit_a = world.register_component::<A>().unwrap();
    let bit_b = world.register_component::<B>().unwrap();

    for _ in 0..200 {
        let entity = world.create_entity().unwrap();
        let with_a = rng.gen_bool(0.5);
        let with_b = rng.gen_bool(0.5);
        if with_a {
            world.attach(entity, A(0)).unwrap();
        }
        if with_b {
            world.attach(entity, B(0)).unwrap();
        }
        let mut expected = Signature::EMPTY;
        if with_a {
            expected = expected | bit_a;
        }
        if with_b {
            expected = expected | bit_b;
        }
        assert_eq!(world.signature(entity), expected);

        // The signature bit and the store agree on membership.
        assert_eq!(world.has::<A>(entity), with_a);
        assert_eq!(world.has::<B>(entity), with_b);
    }
}
