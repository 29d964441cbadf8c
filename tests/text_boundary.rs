//! String-marshaled layer: sentinels, status codes and text codecs.

use proptest::prelude::*;
use reg_facade::error::status;
use reg_facade::{Hive, KeyPath, MemoryStore, TextRegistry};

const KEY: &str = "Software\\TextBoundary";

fn registry() -> TextRegistry<MemoryStore> {
    TextRegistry::new(MemoryStore::new())
}

#[test]
fn test_example_app_scenario() {
    let reg = registry();
    assert_eq!(reg.create_key("HKCU", "Software\\ExampleApp"), status::OK);
    assert!(reg.exists("HKCU", "Software\\ExampleApp"));
    assert_eq!(
        reg.write_dword("HKCU", "Software\\ExampleApp", "Version", "7"),
        status::OK
    );
    assert_eq!(reg.read_integer("HKCU", "Software\\ExampleApp", "Version"), "7");
    assert_eq!(reg.value_type("HKCU", "Software\\ExampleApp", "Version"), "DWORD");
    assert_eq!(reg.delete_key("HKCU", "Software\\ExampleApp"), status::OK);
    assert!(!reg.exists("HKCU", "Software\\ExampleApp"));
}

#[test]
fn test_read_sentinels() {
    let reg = registry();
    reg.write_string("HKCU", KEY, "s", "text");

    // Wrong type reads flatten to the zero value as well
    assert_eq!(reg.read_integer("HKCU", KEY, "s"), "0");
    assert_eq!(reg.read_binary("HKCU", KEY, "s"), "");
    assert_eq!(reg.read_multi_string("HKCU", KEY, "s"), "");
    assert_eq!(reg.value_type("BOGUS", KEY, "s"), "NONE");
    assert_eq!(reg.read_string("BOGUS", KEY, "s"), "");
}

#[test]
fn test_write_status_codes() {
    let store = MemoryStore::new();
    let reg = TextRegistry::new(store.clone());

    assert_eq!(reg.write_string("XYZ", KEY, "s", "v"), status::INVALID_HIVE);
    assert_eq!(reg.delete_key("HKCU", "\\"), status::INVALID_PATH);
    assert_eq!(reg.write_binary("HKCU", KEY, "b", "zz"), status::INVALID_INPUT);
    assert_eq!(reg.write_qword("HKCU", KEY, "q", "12a"), status::INVALID_INPUT);
    assert_eq!(reg.write_qword("HKCU", KEY, "q", ""), status::INVALID_INPUT);
    assert_eq!(
        reg.write_qword("HKCU", KEY, "q", "18446744073709551616"),
        status::INVALID_INPUT
    );
    assert_eq!(reg.write_multi_string("HKCU", KEY, "m", "a\\0\\0b"), status::INVALID_INPUT);
    assert!(!reg.exists("HKCU", KEY));

    store.deny(Hive::CurrentUser, &KeyPath::parse("Locked").unwrap());
    assert_eq!(reg.write_dword("HKCU", "Locked", "d", "1"), status::ACCESS_DENIED);
    assert_eq!(reg.create_key("HKCU", "Locked/Child"), status::ACCESS_DENIED);
}

#[test]
fn test_deletes_are_idempotent() {
    let reg = registry();
    reg.write_dword("HKCU", KEY, "d", "1");
    assert_eq!(reg.delete_value("HKCU", KEY, "d"), status::OK);
    assert_eq!(reg.delete_value("HKCU", KEY, "d"), status::OK);
    assert_eq!(reg.delete_key("HKCU", KEY), status::OK);
    assert_eq!(reg.delete_key("HKCU", KEY), status::OK);
}

#[test]
fn test_binary_hex_is_lowercase() {
    let reg = registry();
    assert_eq!(reg.write_binary("HKCU", KEY, "b", "DEADbeef"), status::OK);
    assert_eq!(reg.read_binary("HKCU", KEY, "b"), "deadbeef");
    assert_eq!(reg.write_binary("HKCU", KEY, "empty", ""), status::OK);
    assert_eq!(reg.value_type("HKCU", KEY, "empty"), "BINARY");
    assert_eq!(reg.read_binary("HKCU", KEY, "empty"), "");
}

#[test]
fn test_expanded_read() {
    std::env::set_var("REG_FACADE_TEXT_HOME", "/home/reg");
    let reg = registry();
    reg.write_expand_string("HKCU", KEY, "e", "%REG_FACADE_TEXT_HOME%/cfg");
    assert_eq!(reg.read_string_expanded("HKCU", KEY, "e"), "/home/reg/cfg");
    assert_eq!(reg.read_string("HKCU", KEY, "e"), "%REG_FACADE_TEXT_HOME%/cfg");
}

#[test]
fn test_text_and_typed_views_agree() {
    let reg = registry();
    reg.write_multi_string("HKCU", KEY, "m", "x\\0y");
    reg.write_binary("HKCU", KEY, "b", "0102");

    let typed = reg.registry();
    assert_eq!(typed.read_multi_string("HKCU", KEY, "m").unwrap(), vec!["x", "y"]);
    assert_eq!(typed.read_binary("HKCU", KEY, "b").unwrap(), vec![1, 2]);
    assert_eq!(reg.list_values("HKCU", KEY), typed.list_values("HKCU", KEY).unwrap().join(","));
}

proptest! {
    #[test]
    fn prop_binary_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let reg = registry();
        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        prop_assert_eq!(reg.write_binary("HKCU", KEY, "b", &hex), status::OK);
        prop_assert_eq!(reg.read_binary("HKCU", KEY, "b"), hex);
    }

    #[test]
    fn prop_dword_round_trip(n in any::<u32>()) {
        let reg = registry();
        prop_assert_eq!(reg.write_dword("HKCU", KEY, "d", &n.to_string()), status::OK);
        prop_assert_eq!(reg.read_integer("HKCU", KEY, "d"), n.to_string());
        prop_assert_eq!(reg.value_type("HKCU", KEY, "d"), "DWORD");
    }

    #[test]
    fn prop_qword_round_trip(n in any::<u64>()) {
        let reg = registry();
        prop_assert_eq!(reg.write_qword("HKCU", KEY, "q", &n.to_string()), status::OK);
        prop_assert_eq!(reg.read_integer("HKCU", KEY, "q"), n.to_string());
    }

    #[test]
    fn prop_multi_string_keeps_order(items in proptest::collection::vec("[a-zA-Z0-9 ._-]{1,12}", 0..8)) {
        let reg = registry();
        let joined = items.join("\\0");
        prop_assert_eq!(reg.write_multi_string("HKCU", KEY, "m", &joined), status::OK);
        prop_assert_eq!(reg.read_multi_string("HKCU", KEY, "m"), joined);
    }

    #[test]
    fn prop_string_round_trip(s in "[^\\x00]{0,64}") {
        let reg = registry();
        prop_assert_eq!(reg.write_string("HKCU", KEY, "s", &s), status::OK);
        prop_assert_eq!(reg.read_string("HKCU", KEY, "s"), s);
    }
}
