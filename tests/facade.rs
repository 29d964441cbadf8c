//! Facade behavior against the in-memory store.

use reg_facade::{
    Hive, KeyPath, KeyTree, MemoryStore, NamedValue, RawValue, Registry, RegistryError,
    RegistryStore, StoreKey, ValueData, ValueType,
};

const APP: &str = "Software\\ExampleApp";

fn registry() -> Registry<MemoryStore> {
    Registry::new(MemoryStore::new())
}

#[test]
fn test_example_app_scenario() {
    let reg = registry();

    reg.create_key("HKCU", APP).unwrap();
    assert!(reg.key_exists("HKCU", APP));

    reg.write_dword("HKCU", APP, "Version", 7).unwrap();
    assert_eq!(reg.read_integer("HKCU", APP, "Version").unwrap(), 7);
    assert_eq!(reg.value_type("HKCU", APP, "Version").unwrap(), ValueType::Dword);

    reg.delete_key("HKCU", APP).unwrap();
    assert!(!reg.key_exists("HKCU", APP));
    assert!(reg.key_exists("HKCU", "Software"));
}

#[test]
fn test_round_trip_every_type() {
    let reg = registry();

    reg.write_string("HKCU", APP, "sz", "hello wörld").unwrap();
    reg.write_expand_string("HKCU", APP, "expand", "%SystemRoot%\\x").unwrap();
    reg.write_multi_string("HKCU", APP, "multi", &["first", "second", "third"])
        .unwrap();
    reg.write_binary("HKCU", APP, "bin", &[0x00, 0x7f, 0x80, 0xff]).unwrap();
    reg.write_dword("HKCU", APP, "dword", u32::MAX).unwrap();
    reg.write_qword("HKCU", APP, "qword", u64::from(u32::MAX) + 1).unwrap();

    assert_eq!(reg.read_string("HKCU", APP, "sz").unwrap(), "hello wörld");
    assert_eq!(reg.read_string("HKCU", APP, "expand").unwrap(), "%SystemRoot%\\x");
    assert_eq!(
        reg.read_multi_string("HKCU", APP, "multi").unwrap(),
        vec!["first", "second", "third"]
    );
    assert_eq!(
        reg.read_binary("HKCU", APP, "bin").unwrap(),
        vec![0x00, 0x7f, 0x80, 0xff]
    );
    assert_eq!(reg.read_integer("HKCU", APP, "dword").unwrap(), u64::from(u32::MAX));
    assert_eq!(
        reg.read_integer("HKCU", APP, "qword").unwrap(),
        u64::from(u32::MAX) + 1
    );

    let tags: Vec<_> = ["sz", "expand", "multi", "bin", "dword", "qword"]
        .iter()
        .map(|name| reg.value_type("HKCU", APP, name).unwrap().tag())
        .collect();
    assert_eq!(tags, ["SZ", "EXPAND_SZ", "MULTI_SZ", "BINARY", "DWORD", "QWORD"]);
}

#[test]
fn test_overwrite_changes_type() {
    let reg = registry();
    reg.write_string("HKCU", APP, "v", "text").unwrap();
    reg.write_qword("HKCU", APP, "v", 5).unwrap();
    assert_eq!(reg.value_type("HKCU", APP, "v").unwrap(), ValueType::Qword);
    assert_eq!(reg.list_values("HKCU", APP).unwrap(), vec!["v"]);
}

#[test]
fn test_default_value_has_empty_name() {
    let reg = registry();
    reg.write_string("HKCU", APP, "", "default").unwrap();
    assert_eq!(reg.read_string("HKCU", APP, "").unwrap(), "default");
    assert_eq!(reg.list_values("HKCU", APP).unwrap(), vec![""]);
}

#[test]
fn test_recursive_delete_removes_descendants() {
    let reg = registry();
    let paths = [
        "Software/Tree/A",
        "Software/Tree/A/A1",
        "Software/Tree/A/A1/Deep",
        "Software/Tree/B",
    ];
    for path in paths {
        reg.write_dword("HKCU", path, "n", 1).unwrap();
    }

    reg.delete_key("HKCU", "Software/Tree").unwrap();
    for path in paths {
        assert!(!reg.key_exists("HKCU", path), "{} survived", path);
    }
    assert!(!reg.key_exists("HKCU", "Software/Tree"));
    assert!(reg.list_subkeys("HKCU", "Software").unwrap().is_empty());
}

#[test]
fn test_enumeration_is_one_level() {
    let reg = registry();
    reg.create_key("HKLM", "Vendor/One/Nested").unwrap();
    reg.create_key("HKLM", "Vendor/Two").unwrap();
    reg.write_string("HKLM", "Vendor", "Zeta", "z").unwrap();
    reg.write_string("HKLM", "Vendor", "alpha", "a").unwrap();
    reg.write_string("HKLM", "Vendor/One", "hidden", "h").unwrap();

    assert_eq!(reg.list_subkeys("HKLM", "Vendor").unwrap(), vec!["One", "Two"]);
    assert_eq!(reg.list_values("HKLM", "Vendor").unwrap(), vec!["alpha", "Zeta"]);
}

#[test]
fn test_paths_are_case_insensitive() {
    let reg = registry();
    reg.write_dword("hkcu", "SOFTWARE/Mixed", "Value", 3).unwrap();
    assert!(reg.key_exists("HKCU", "software\\mixed"));
    assert_eq!(reg.read_integer("HKCU", "Software/MIXED", "VALUE").unwrap(), 3);
    assert_eq!(reg.list_subkeys("HKCU", "Software").unwrap(), vec!["Mixed"]);
}

#[test]
fn test_expansion() {
    std::env::set_var("REG_FACADE_TEST_DIR", "C:\\Scratch");
    let reg = registry();
    reg.write_expand_string("HKCU", APP, "p", "%REG_FACADE_TEST_DIR%\\logs")
        .unwrap();
    reg.write_string("HKCU", APP, "plain", "%REG_FACADE_TEST_DIR%").unwrap();
    reg.write_expand_string("HKCU", APP, "missing", "%REG_FACADE_UNSET_VAR%\\x")
        .unwrap();

    assert_eq!(
        reg.read_string_expanded("HKCU", APP, "p").unwrap(),
        "C:\\Scratch\\logs"
    );
    assert_eq!(
        reg.read_string("HKCU", APP, "p").unwrap(),
        "%REG_FACADE_TEST_DIR%\\logs"
    );
    assert_eq!(
        reg.read_string_expanded("HKCU", APP, "plain").unwrap(),
        "C:\\Scratch"
    );
    assert_eq!(
        reg.read_string_expanded("HKCU", APP, "missing").unwrap(),
        "%REG_FACADE_UNSET_VAR%\\x"
    );
}

#[test]
fn test_invalid_hive() {
    let reg = registry();
    assert!(!reg.key_exists("BOGUS", "Software"));
    assert!(matches!(
        reg.create_key("BOGUS", "Software"),
        Err(RegistryError::InvalidHive(_))
    ));
    assert!(matches!(
        reg.read_string("HKEY_NOPE", "", "x"),
        Err(RegistryError::InvalidHive(_))
    ));
}

#[test]
fn test_missing_is_not_found() {
    let reg = registry();
    assert!(reg.list_subkeys("HKCU", "Missing").unwrap_err().is_not_found());
    reg.create_key("HKCU", "Present").unwrap();
    assert!(reg.read_integer("HKCU", "Present", "nope").unwrap_err().is_not_found());
}

#[test]
fn test_access_denied_is_distinct() {
    let store = MemoryStore::new();
    let reg = Registry::new(store.clone());
    reg.write_dword("HKLM", "Secure/Inner", "v", 1).unwrap();
    store.deny(Hive::LocalMachine, &KeyPath::parse("Secure").unwrap());

    assert!(!reg.key_exists("HKLM", "Secure/Inner"));
    assert!(matches!(
        reg.read_integer("HKLM", "Secure/Inner", "v"),
        Err(RegistryError::AccessDenied(_))
    ));
    assert!(matches!(
        reg.write_dword("HKLM", "Secure/Inner", "v", 2),
        Err(RegistryError::AccessDenied(_))
    ));
}

#[test]
fn test_invalid_payloads_write_nothing() {
    let reg = registry();
    assert!(matches!(
        reg.write_multi_string("HKCU", APP, "m", &["a", "", "b"]),
        Err(RegistryError::InvalidInput(_))
    ));
    assert!(matches!(
        reg.write_string("HKCU", APP, "s", "a\0b"),
        Err(RegistryError::InvalidInput(_))
    ));
    assert!(!reg.key_exists("HKCU", APP));
}

#[test]
fn test_key_info() {
    let reg = registry();
    reg.write_dword("HKCU", APP, "a", 1).unwrap();
    reg.write_dword("HKCU", APP, "b", 2).unwrap();
    reg.create_key("HKCU", "Software\\ExampleApp\\Child").unwrap();

    let info = reg.key_info("HKCU", APP).unwrap();
    assert_eq!(info.subkey_count, 1);
    assert_eq!(info.value_count, 2);
    assert!(info.last_written.is_some());
    assert!(!info.is_empty());
}

#[test]
fn test_export_import_tree() {
    let reg = registry();
    reg.write_string("HKCU", "Src", "name", "root").unwrap();
    reg.write_multi_string("HKCU", "Src/Child", "list", &["x", "y"]).unwrap();
    reg.write_qword("HKCU", "Src/Child/Leaf", "big", 1 << 40).unwrap();

    let tree = reg.export_tree("HKCU", "Src", true).unwrap();
    assert_eq!(tree.key_count(), 3);
    assert_eq!(tree.value("name"), Some(&ValueData::String("root".to_string())));

    reg.write_dword("HKCU", "Dst/Stale", "old", 1).unwrap();
    reg.import_tree("HKCU", "Dst", &tree, true).unwrap();

    assert!(!reg.key_exists("HKCU", "Dst/Stale"));
    assert_eq!(reg.read_string("HKCU", "Dst", "name").unwrap(), "root");
    assert_eq!(
        reg.read_multi_string("HKCU", "Dst/Child", "list").unwrap(),
        vec!["x", "y"]
    );
    assert_eq!(reg.read_integer("HKCU", "Dst/Child/Leaf", "big").unwrap(), 1 << 40);
}

#[test]
fn test_import_without_purge_merges() {
    let reg = registry();
    reg.write_dword("HKCU", "Src", "a", 1).unwrap();
    let tree = reg.export_tree("HKCU", "Src", true).unwrap();

    reg.write_dword("HKCU", "Dst/Keep", "k", 9).unwrap();
    reg.import_tree("HKCU", "Dst", &tree, false).unwrap();

    assert!(reg.key_exists("HKCU", "Dst/Keep"));
    assert_eq!(reg.read_integer("HKCU", "Dst", "a").unwrap(), 1);
}

#[test]
fn test_export_skips_untyped_values() {
    let reg = registry();
    let key = reg
        .store()
        .create_key(Hive::CurrentUser, &KeyPath::parse("Raw").unwrap())
        .unwrap();
    key.set_raw_value("none", &RawValue::new(ValueType::None, Vec::new()))
        .unwrap();
    key.set_raw_value("link", &RawValue::new(ValueType::Link, vec![0x41, 0x00]))
        .unwrap();
    key.set_raw_value("dword", &RawValue::new(ValueType::Dword, vec![1, 0, 0, 0]))
        .unwrap();

    let tree = reg.export_tree("HKCU", "Raw", false).unwrap();
    assert_eq!(tree.values.len(), 1);
    assert_eq!(tree.value("dword"), Some(&ValueData::Dword(1)));
    assert_eq!(reg.value_type("HKCU", "Raw", "link").unwrap().tag(), "LINK");
}

#[test]
fn test_export_skips_corrupt_values() {
    let reg = registry();
    reg.write_string("HKCU", "App", "name", "app").unwrap();
    reg.write_dword("HKCU", "App/Child", "good", 5).unwrap();
    reg.store()
        .open_key(
            Hive::CurrentUser,
            &KeyPath::parse("App/Child").unwrap(),
            reg_facade::Access::Full,
        )
        .unwrap()
        .set_raw_value("short", &RawValue::new(ValueType::Dword, vec![1, 2]))
        .unwrap();

    let tree = reg.export_tree("HKCU", "App", true).unwrap();
    let child = &tree.subkeys["Child"];
    assert_eq!(child.values.len(), 1);
    assert_eq!(child.value("good"), Some(&ValueData::Dword(5)));
    assert!(child.value("short").is_none());
    assert_eq!(tree.value("name"), Some(&ValueData::String("app".to_string())));

    // Direct reads still report the corruption
    assert!(matches!(
        reg.read_integer("HKCU", "App/Child", "short"),
        Err(RegistryError::CorruptValue { .. })
    ));
}

#[test]
fn test_invalid_import_leaves_destination_untouched() {
    let reg = registry();
    reg.write_dword("HKCU", "Dst", "keep", 1).unwrap();
    reg.write_dword("HKCU", "Dst/Old", "old", 2).unwrap();

    let mut child = KeyTree::default();
    child.values.push(NamedValue {
        name: "m".to_string(),
        value: ValueData::MultiString(vec![String::new()]),
    });
    let mut tree = KeyTree::default();
    tree.values.push(NamedValue {
        name: "root".to_string(),
        value: ValueData::Dword(9),
    });
    tree.subkeys.insert("Child".to_string(), child);

    for purge in [true, false] {
        assert!(matches!(
            reg.import_tree("HKCU", "Dst", &tree, purge),
            Err(RegistryError::InvalidInput(_))
        ));
        assert_eq!(reg.read_integer("HKCU", "Dst", "keep").unwrap(), 1);
        assert_eq!(reg.read_integer("HKCU", "Dst/Old", "old").unwrap(), 2);
        assert!(reg.read_integer("HKCU", "Dst", "root").unwrap_err().is_not_found());
        assert!(!reg.key_exists("HKCU", "Dst/Child"));
    }
}

#[test]
fn test_import_nested_snapshot_names() {
    let reg = registry();
    let mut tree = KeyTree::default();
    tree.subkeys.insert("A\\B".to_string(), KeyTree::default());
    tree.subkeys.insert("C".to_string(), KeyTree::default());

    reg.import_tree("HKCU", "Nested", &tree, false).unwrap();
    assert!(reg.key_exists("HKCU", "Nested/A/B"));
    assert!(reg.key_exists("HKCU", "Nested/C"));
}

#[test]
fn test_multi_string_keeps_inner_empty_elements() {
    // a, "", b as stored by other writers
    let raw = RawValue::new(
        ValueType::MultiString,
        vec![b'a', 0, 0, 0, 0, 0, b'b', 0, 0, 0, 0, 0],
    );
    let reg = registry();
    reg.store()
        .create_key(Hive::CurrentUser, &KeyPath::parse("Multi").unwrap())
        .unwrap()
        .set_raw_value("m", &raw)
        .unwrap();

    assert_eq!(
        reg.read_multi_string("HKCU", "Multi", "m").unwrap(),
        vec!["a", "", "b"]
    );
}
