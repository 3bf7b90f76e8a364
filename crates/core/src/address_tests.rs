// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    mayor    = { AgentAddress::mayor(),                  "mayor" },
    deacon   = { AgentAddress::deacon(),                 "deacon" },
    boot     = { AgentAddress::boot(),                   "boot" },
    witness  = { AgentAddress::witness("myrig").unwrap(),         "myrig/witness" },
    refinery = { AgentAddress::refinery("myrig").unwrap(),        "myrig/refinery" },
    polecat  = { AgentAddress::polecat("myrig", "toast").unwrap(), "myrig/polecat/toast" },
    crew     = { AgentAddress::crew("myrig", "max").unwrap(),     "myrig/crew/max" },
)]
fn constructors_produce_canonical_form(addr: AgentAddress, expected: &str) {
    assert_eq!(addr, expected);
    assert_eq!(AgentAddress::parse(expected).unwrap(), addr);
}

#[yare::parameterized(
    town   = { "mayor",               Tier::Town },
    rig    = { "myrig/witness",       Tier::Rig },
    worker = { "myrig/polecat/toast", Tier::Worker },
)]
fn tier_follows_segment_count(input: &str, tier: Tier) {
    assert_eq!(AgentAddress::parse(input).unwrap().tier(), tier);
}

#[yare::parameterized(
    too_many   = { "a/b/c/d" },
    empty      = { "" },
    leading    = { "/witness" },
    trailing   = { "myrig/" },
    double     = { "myrig//toast" },
)]
fn parse_rejects_malformed(input: &str) {
    let err = AgentAddress::parse(input).unwrap_err();
    assert!(matches!(err, AddressError::Invalid(_)), "got {err:?}");
}

#[yare::parameterized(
    polecat_named_witness  = { "myrig/polecat/witness" },
    polecat_named_refinery = { "myrig/polecat/refinery" },
    polecat_named_crew     = { "myrig/polecat/crew-max" },
    hyphenated_rig_witness = { "my-rig/witness" },
    hyphenated_rig_crew    = { "my-rig/crew/max" },
    spells_town_session    = { "hq-mayor" },
    spells_rig_session     = { "gt-myrig-witness" },
    spells_boot_session    = { "gt-boot" },
)]
fn parse_rejects_addresses_that_collide_with_another_agent(input: &str) {
    let err = AgentAddress::parse(input).unwrap_err();
    assert!(matches!(err, AddressError::Invalid(_)), "got {err:?}");
}

#[test]
fn constructors_reject_colliding_names() {
    assert!(AgentAddress::polecat("myrig", "witness").is_err());
    assert!(AgentAddress::polecat("myrig", "refinery").is_err());
    assert!(AgentAddress::polecat("myrig", "crew-max").is_err());
    assert!(AgentAddress::witness("my-rig").is_err());
    assert!(AgentAddress::refinery("my-rig").is_err());
    assert!(AgentAddress::crew("my-rig", "max").is_err());
}

#[test]
fn constructors_reject_embedded_separators() {
    assert!(AgentAddress::witness("a/b").is_err());
    assert!(AgentAddress::polecat("myrig", "a/b").is_err());
    assert!(AgentAddress::crew("", "max").is_err());
}

#[test]
fn near_miss_names_are_still_accepted() {
    for ok in [
        "myrig/polecat/crew",
        "myrig/polecat/witnesses",
        "myrig/crew/witness",
        "myrig/crew/crew-max",
        "myrig/polecat/big-toast",
        "my-rig/janitor",
        "gt-solo",
        "hq-janitor",
    ] {
        assert!(AgentAddress::parse(ok).is_ok(), "{ok}");
    }
}

#[test]
fn parse_accepts_unrecognised_roles() {
    let addr = AgentAddress::parse("test-agent").unwrap();
    assert_eq!(addr.tier(), Tier::Town);
    assert_eq!(addr.role_name(), "test-agent");
    assert_eq!(addr.role(), None);
}

#[test]
fn accessors_split_worker_address() {
    let addr = AgentAddress::polecat("myrig", "toast").unwrap();
    assert_eq!(addr.rig(), Some("myrig"));
    assert_eq!(addr.role(), Some(Role::Polecat));
    assert_eq!(addr.worker(), Some("toast"));
}

#[test]
fn accessors_on_town_address() {
    let addr = AgentAddress::deacon();
    assert_eq!(addr.rig(), None);
    assert_eq!(addr.role(), Some(Role::Deacon));
    assert_eq!(addr.worker(), None);
}

#[test]
fn role_round_trips_through_str() {
    for role in [
        Role::Mayor,
        Role::Deacon,
        Role::Boot,
        Role::Witness,
        Role::Refinery,
        Role::Crew,
        Role::Polecat,
    ] {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
    assert!(matches!(
        "janitor".parse::<Role>(),
        Err(AddressError::UnknownRole(_))
    ));
}

#[test]
fn role_scoping() {
    assert!(!Role::Mayor.is_rig_scoped());
    assert!(Role::Witness.is_rig_scoped());
    assert!(!Role::Witness.is_named());
    assert!(Role::Crew.is_named());
}

#[test]
fn address_deserialize_validates() {
    let ok: AgentAddress = serde_json::from_str("\"myrig/crew/max\"").unwrap();
    assert_eq!(ok, AgentAddress::crew("myrig", "max").unwrap());
    assert!(serde_json::from_str::<AgentAddress>("\"a/b/c/d\"").is_err());
}
