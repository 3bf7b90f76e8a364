// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[yare::parameterized(
    mayor    = { &[("GT_ROLE", "mayor")], AgentAddress::mayor() },
    deacon   = { &[("GT_ROLE", "deacon")], AgentAddress::deacon() },
    boot     = { &[("GT_ROLE", "boot")], AgentAddress::boot() },
    witness  = { &[("GT_ROLE", "witness"), ("GT_RIG", "myrig")], AgentAddress::witness("myrig").unwrap() },
    refinery = { &[("GT_ROLE", "refinery"), ("GT_RIG", "myrig")], AgentAddress::refinery("myrig").unwrap() },
    crew     = { &[("GT_ROLE", "crew"), ("GT_RIG", "myrig"), ("GT_CREW", "max")], AgentAddress::crew("myrig", "max").unwrap() },
    polecat  = { &[("GT_ROLE", "polecat"), ("GT_RIG", "myrig"), ("GT_POLECAT", "toast")], AgentAddress::polecat("myrig", "toast").unwrap() },
)]
fn resolves_address_from_env(vars: &[(&str, &str)], expected: AgentAddress) {
    assert_eq!(self_address_from(lookup(vars)).unwrap(), expected);
}

#[yare::parameterized(
    no_role        = { &[] },
    empty_role     = { &[("GT_ROLE", "")] },
    unknown_role   = { &[("GT_ROLE", "janitor")] },
    witness_no_rig = { &[("GT_ROLE", "witness")] },
    crew_no_name   = { &[("GT_ROLE", "crew"), ("GT_RIG", "myrig")] },
    polecat_crew   = { &[("GT_ROLE", "polecat"), ("GT_RIG", "myrig"), ("GT_CREW", "max")] },
)]
fn missing_or_unknown_is_unknown_role(vars: &[(&str, &str)]) {
    let err = self_address_from(lookup(vars)).unwrap_err();
    assert!(matches!(err, AddressError::UnknownRole(_)), "got {err:?}");
}

#[yare::parameterized(
    hyphenated_rig   = { &[("GT_ROLE", "witness"), ("GT_RIG", "my-rig")] },
    polecat_witness  = { &[("GT_ROLE", "polecat"), ("GT_RIG", "myrig"), ("GT_POLECAT", "witness")] },
    polecat_crewlike = { &[("GT_ROLE", "polecat"), ("GT_RIG", "myrig"), ("GT_POLECAT", "crew-max")] },
)]
fn colliding_identity_is_invalid(vars: &[(&str, &str)]) {
    let err = self_address_from(lookup(vars)).unwrap_err();
    assert!(matches!(err, AddressError::Invalid(_)), "got {err:?}");
}

#[test]
fn identity_env_round_trips() {
    for addr in [
        AgentAddress::mayor(),
        AgentAddress::boot(),
        AgentAddress::witness("r").unwrap(),
        AgentAddress::refinery("r").unwrap(),
        AgentAddress::crew("r", "max").unwrap(),
        AgentAddress::polecat("r", "toast").unwrap(),
    ] {
        let env = identity_env(&addr);
        let map: HashMap<String, String> = env.into_iter().collect();
        let resolved = self_address_from(|k| map.get(k).cloned()).unwrap();
        assert_eq!(resolved, addr);
    }
}

#[test]
fn identity_env_empty_for_unrecognised_role() {
    let addr = AgentAddress::parse("test-agent").unwrap();
    assert!(identity_env(&addr).is_empty());
}
