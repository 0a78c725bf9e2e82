/// Errors produced when parsing an adjacency list.
///
/// Line numbers are 1-based and count every line of the input, including
/// blank ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdjListError {
    /// The input contained no atom lines.
    #[error("empty adjacency list")]
    EmptyInput,
    /// An atom line did not start with the expected running index.
    #[error("line {line}: expected atom index {expected}, found {found:?}")]
    InvalidIndex {
        line: usize,
        expected: usize,
        found: String,
    },
    /// An atom line ended before the atom type.
    #[error("line {line}: missing atom type")]
    MissingAtomType { line: usize },
    /// An element or atom-type symbol was not recognized.
    #[error("line {line}: unknown atom type {text:?}")]
    UnknownAtomType { line: usize, text: String },
    /// A token could not be interpreted.
    #[error("line {line}: invalid token {token:?}")]
    InvalidToken { line: usize, token: String },
    /// A bond referenced an atom index outside the list.
    #[error("line {line}: bond to unknown atom {index}")]
    BondToUnknownAtom { line: usize, index: usize },
    /// An atom was bonded to itself.
    #[error("line {line}: atom bonded to itself")]
    SelfBond { line: usize },
    /// Two atoms disagree about the bond between them.
    #[error("bond between atoms {a} and {b} is not listed consistently on both atoms")]
    AsymmetricBond { a: usize, b: usize },
    /// A molecule atom or bond listed several alternatives.
    #[error("line {line}: molecules need a single {what}, found a list")]
    Ambiguous { line: usize, what: &'static str },
}
