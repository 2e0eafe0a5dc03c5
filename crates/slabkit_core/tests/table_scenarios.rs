//! Integration tests for the key table, with values held in an arena.

use slabkit_core::{djb2, Arena, ArenaSlot, CoreConfig, HashTable};

fn store_i32(arena: &mut Arena, value: i32) -> ArenaSlot {
    let slot = arena.alloc(std::mem::size_of::<i32>()).unwrap();
    arena.bytes_mut(slot).unwrap().copy_from_slice(&value.to_le_bytes());
    slot
}

fn load_i32(arena: &Arena, slot: ArenaSlot) -> i32 {
    i32::from_le_bytes(arena.bytes(slot).unwrap().try_into().unwrap())
}

#[test]
fn test_num_keys_in_arena() {
    let mut arena = Arena::new(500).unwrap();
    let mut table = HashTable::new(32).unwrap();

    for (key, value) in [("num1", 69), ("num2", 420), ("num3", 1337)] {
        let slot = store_i32(&mut arena, value);
        table.set(key, slot).unwrap();
    }

    assert_eq!(load_i32(&arena, table.get("num1").unwrap()), 69);
    assert_eq!(load_i32(&arena, table.get("num2").unwrap()), 420);
    assert_eq!(load_i32(&arena, table.get("num3").unwrap()), 1337);
    assert!(table.get("missing").is_none());

    table.destroy();
    arena.destroy();
}

#[test]
fn test_overwrite_points_at_new_value() {
    let mut arena = Arena::new(64).unwrap();
    let mut table = HashTable::new(32).unwrap();

    let v1 = store_i32(&mut arena, 1);
    let v2 = store_i32(&mut arena, 2);
    table.set("k", v1).unwrap();
    table.set("k", v2).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(load_i32(&arena, table.get("k").unwrap()), 2);
}

#[test]
fn test_every_key_survives_repeated_growth() {
    let mut arena = Arena::new(4096).unwrap();
    let mut table = HashTable::new(16).unwrap();
    let initial = table.capacity();

    let keys: Vec<String> = (0..500).map(|i| format!("entity-{i}")).collect();
    for (i, key) in keys.iter().enumerate() {
        let slot = store_i32(&mut arena, i32::try_from(i).unwrap());
        table.set(key, slot).unwrap();
        assert!(table.len() <= table.capacity() * 3 / 4);
    }

    assert!(table.capacity() > initial);
    assert!(table.capacity().is_power_of_two());
    assert_eq!(table.len(), keys.len());
    for (i, key) in keys.iter().enumerate() {
        let slot = table.get(key).unwrap();
        assert_eq!(load_i32(&arena, slot), i32::try_from(i).unwrap());
    }
}

#[test]
fn test_shared_prefix_beyond_limit_collides() {
    let mut table = HashTable::new(8).unwrap();
    table.set("prefix__one", 1u8).unwrap();
    table.set("prefix__two", 2u8).unwrap();

    assert_eq!(table.get("prefix__one"), Some(2));
    assert_eq!(table.get("prefix__"), Some(2));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_table_from_config() {
    let config = CoreConfig::from_toml_str(
        "[table]\nkey_max_len = 4\ninitial_capacity = 4\nkey_pool_chunks = 2\n",
    )
    .unwrap();
    let mut table = HashTable::with_config(&config.table).unwrap();
    assert_eq!(table.capacity(), 4);

    for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        table.set(key, i).unwrap();
    }
    assert_eq!(table.capacity(), 8);
    assert_eq!(table.key_pool().block_count(), 3);
    assert_eq!(table.get("e"), Some(4));
}

#[test]
fn test_probe_positions_follow_djb2() {
    // "num1", "num2", "num3" hash to consecutive integers.
    assert_eq!(djb2(b"num2"), djb2(b"num1") + 1);
    assert_eq!(djb2(b"num3"), djb2(b"num1") + 2);
}
