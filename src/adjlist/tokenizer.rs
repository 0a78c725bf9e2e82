use super::error::AdjListError;

/// One atom line, split into its fields but not yet interpreted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawAtom {
    pub line: usize,
    pub label: String,
    pub types: Vec<String>,
    pub radicals: Vec<u8>,
    pub charges: Vec<i8>,
    /// `(0-based neighbour index, bond order symbols)`.
    pub bonds: Vec<(usize, Vec<String>)>,
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<RawAtom>, AdjListError> {
    let mut atoms = Vec::new();
    let mut seen_content = false;
    for (i, raw_line) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw_line.trim();
        if content.is_empty() || content.starts_with("//") {
            continue;
        }
        let mut tokens = content.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        if first == "multiplicity" {
            continue;
        }
        if !seen_content && first.parse::<usize>().is_err() {
            // A leading non-numeric line names the species.
            seen_content = true;
            continue;
        }
        seen_content = true;

        let expected = atoms.len() + 1;
        if first.parse::<usize>().ok() != Some(expected) {
            return Err(AdjListError::InvalidIndex {
                line,
                expected,
                found: first.to_string(),
            });
        }

        let mut rest: Vec<&str> = tokens.collect();
        let label = match rest.first() {
            Some(tok) if tok.starts_with('*') => rest.remove(0).to_string(),
            _ => String::new(),
        };
        if rest.is_empty() {
            return Err(AdjListError::MissingAtomType { line });
        }
        let types = split_list(rest.remove(0));

        let mut atom = RawAtom {
            line,
            label,
            types,
            radicals: Vec::new(),
            charges: Vec::new(),
            bonds: Vec::new(),
        };
        for token in rest {
            read_property(token, line, &mut atom)?;
        }
        atoms.push(atom);
    }
    if atoms.is_empty() {
        return Err(AdjListError::EmptyInput);
    }
    Ok(atoms)
}

fn read_property(token: &str, line: usize, atom: &mut RawAtom) -> Result<(), AdjListError> {
    let invalid = || AdjListError::InvalidToken {
        line,
        token: token.to_string(),
    };
    if let Some(body) = token.strip_prefix('{') {
        let body = body.strip_suffix('}').ok_or_else(invalid)?;
        let (index, order) = body.split_once(',').ok_or_else(invalid)?;
        let index: usize = index.parse().map_err(|_| invalid())?;
        if index == 0 {
            return Err(AdjListError::BondToUnknownAtom { line, index });
        }
        atom.bonds.push((index - 1, split_list(order)));
    } else if let Some(body) = token.strip_prefix('u') {
        atom.radicals = split_list(body)
            .iter()
            .map(|v| v.parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
    } else if let Some(body) = token.strip_prefix('c') {
        atom.charges = split_list(body)
            .iter()
            .map(|v| v.trim_start_matches('+').parse::<i8>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
    } else if token.starts_with('p') {
        // Lone pairs follow from the element and are not tracked.
    } else {
        return Err(invalid());
    }
    Ok(())
}

/// `[a,b]` becomes `["a", "b"]`; a bare `a` becomes `["a"]`.
fn split_list(token: &str) -> Vec<String> {
    match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => vec![token.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn molecule_line() {
        let atoms = tokenize("1 *1 C u1 p0 c0 {2,S}\n2 H u0 p0 c0 {1,S}").unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].label, "*1");
        assert_eq!(atoms[0].types, vec!["C"]);
        assert_eq!(atoms[0].radicals, vec![1]);
        assert_eq!(atoms[0].charges, vec![0]);
        assert_eq!(atoms[0].bonds, vec![(1, vec!["S".to_string()])]);
        assert!(atoms[1].label.is_empty());
    }

    #[test]
    fn group_lists() {
        let atoms = tokenize("1 *2 [Cs,Cd] u[0,1] {2,[S,D]}\n2 R!H u0 {1,[S,D]}").unwrap();
        assert_eq!(atoms[0].types, vec!["Cs", "Cd"]);
        assert_eq!(atoms[0].radicals, vec![0, 1]);
        assert_eq!(atoms[0].bonds[0].1, vec!["S", "D"]);
        assert_eq!(atoms[1].types, vec!["R!H"]);
    }

    #[test]
    fn header_lines_skipped() {
        let atoms = tokenize("methyl\nmultiplicity 2\n1 C u1").unwrap();
        assert_eq!(atoms.len(), 1);
    }

    #[test]
    fn signed_charges() {
        let atoms = tokenize("1 N u0 c+1").unwrap();
        assert_eq!(atoms[0].charges, vec![1]);
        let atoms = tokenize("1 O u0 c-1").unwrap();
        assert_eq!(atoms[0].charges, vec![-1]);
    }

    #[test]
    fn wrong_index() {
        assert!(matches!(
            tokenize("1 C u0\n3 C u0"),
            Err(AdjListError::InvalidIndex { line: 2, expected: 2, .. })
        ));
    }

    #[test]
    fn bad_token() {
        assert!(matches!(
            tokenize("1 C u0 x7"),
            Err(AdjListError::InvalidToken { line: 1, .. })
        ));
        assert!(matches!(tokenize("1 C u0 {2S}"), Err(AdjListError::InvalidToken { .. })));
    }

    #[test]
    fn empty() {
        assert_eq!(tokenize("\n  \n"), Err(AdjListError::EmptyInput));
        assert!(matches!(tokenize("1 *1"), Err(AdjListError::MissingAtomType { line: 1 })));
    }
}
