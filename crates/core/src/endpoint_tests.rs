// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    exact = { &[7u8; KEY_SIZE], [7u8; KEY_SIZE] },
    short = { &[1u8, 2, 3], [1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0] },
    long  = { &[9u8; KEY_SIZE + 8], [9u8; KEY_SIZE] },
    empty = { &[], [0u8; KEY_SIZE] },
)]
fn auth_key_from_slice(input: &[u8], expected: [u8; KEY_SIZE]) {
    assert_eq!(AuthKey::from_slice(input).as_bytes(), &expected);
}

#[test]
fn auth_key_debug_hides_material() {
    let key = AuthKey::new([0xAB; KEY_SIZE]);
    let debug = format!("{key:?}");
    assert_eq!(debug, "AuthKey(..)");
    assert!(!debug.contains("171"));
}

#[test]
fn auth_key_matches() {
    let key = AuthKey::new([5; KEY_SIZE]);
    assert!(key.matches(&[5; KEY_SIZE]));
    assert!(!key.matches(&[6; KEY_SIZE]));
    assert!(!key.matches(&[5; 4]));
}

#[test]
fn endpoint_setters_fill_overrides() {
    let ep = ClientEndpoint::new(AuthKey::default(), None, None)
        .ofname("out.txt")
        .ifname("/dev/null");
    assert_eq!(ep.ofname, Some(PathBuf::from("out.txt")));
    assert_eq!(ep.efname, None);
    assert_eq!(ep.ifname, Some(PathBuf::from("/dev/null")));
}
