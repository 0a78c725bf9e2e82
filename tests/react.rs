use kincrab::{ForbiddenStructures, KineticsFamily, Molecule, ReactionSystem, Species, species_tuples};

fn system() -> ReactionSystem {
    ReactionSystem::new(vec![
        KineticsFamily::from_json(include_str!("data/h_abstraction.json")).unwrap(),
        KineticsFamily::from_json(include_str!("data/r_recombination.json")).unwrap(),
        KineticsFamily::from_json(include_str!("data/bond_fission.json")).unwrap(),
    ])
}

fn species(label: &str, adjlist: &str) -> Species {
    Species::from_adjacency_list(label, adjlist).unwrap()
}

fn pool() -> Vec<Species> {
    vec![
        species("CH4", "1 C u0"),
        species("H", "1 H u1"),
        species("CH3", "1 C u1"),
        species("C2H6", "1 C u0 {2,S}\n2 C u0 {1,S}"),
    ]
}

fn summary(system: &ReactionSystem, parallel: bool) -> Vec<String> {
    let tuples = species_tuples(&pool(), true, false);
    system
        .react_all(&tuples, parallel)
        .unwrap()
        .iter()
        .map(|r| format!("{}: {r} x{}", r.family, r.degeneracy))
        .collect()
}

#[test]
fn parallel_and_serial_agree() {
    let system = system();
    let serial = summary(&system, false);
    assert!(!serial.is_empty());
    assert_eq!(serial, summary(&system, true));
}

#[test]
fn expected_reactions_present() {
    let serial = summary(&system(), false);
    for expected in [
        "H_Abstraction: CH4 + H <=> H2 + CH3 x4",
        "R_Recombination: CH3 + CH3 <=> C2H6 x1",
        "Bond_Fission: C2H6 <=> CH3 + CH3 x2",
    ] {
        assert!(serial.iter().any(|s| s == expected), "missing {expected} in {serial:#?}");
    }
}

#[test]
fn only_selected_families_run() {
    let system = system();
    let pair = [species("CH3", "1 C u1"), species("CH3", "1 C u1")];
    let all = system.react_species(&pair, None).unwrap();
    let only = system.react_species(&pair, Some(&["R_Recombination"][..])).unwrap();
    assert!(all.len() >= only.len());
    assert_eq!(only.len(), 1);
    assert!(only.iter().all(|r| r.family == "R_Recombination"));
}

#[test]
fn system_forbidden_structures_apply() {
    let mut forbidden = ForbiddenStructures::new();
    forbidden.add_molecule("ethane", Molecule::from_adjacency_list("1 C u0 {2,S}\n2 C u0 {1,S}").unwrap());
    let system = system().with_forbidden(forbidden);
    let pair = [species("CH3", "1 C u1"), species("CH3", "1 C u1")];
    assert!(system.react_species(&pair, Some(&["R_Recombination"][..])).unwrap().is_empty());
}
