// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Clara Contributors

use super::*;

#[test]
fn service_key_displays_as_inner_string() {
    let key = ServiceKey::from("n8n");
    assert_eq!(key.to_string(), "n8n");
    assert_eq!(key.as_str(), "n8n");
}

#[test]
fn ids_are_usable_as_hash_map_keys() {
    use std::collections::HashMap;
    let mut map: HashMap<ServiceKey, u32> = HashMap::new();
    map.insert(ServiceKey::from("comfyui"), 1);
    assert_eq!(map.get(&ServiceKey::from("comfyui")), Some(&1));
}
