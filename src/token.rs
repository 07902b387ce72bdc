use crate::name::Name;
use serde::Serialize;
use std::fmt;

use Tok::*;

/// One instruction of the stepping machine.
///
/// The surface alphabet is everything but `Grab` and `Ret`, which only appear in the
/// compiled code of a signature entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "t")]
pub enum Tok {
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "->")]
    Arrow,
    #[serde(rename = ":")]
    Colon,
    #[serde(rename = "(")]
    LParen,
    #[serde(rename = ")")]
    RParen,
    #[serde(rename = "[")]
    LBrack,
    #[serde(rename = "]")]
    RBrack,
    #[serde(rename = ".")]
    Dot,
    #[serde(rename = "id")]
    Id { name: Name },
    #[serde(rename = "grab")]
    Grab,
    #[serde(rename = "ret")]
    Ret,
    #[serde(rename = "EOF")]
    Eof,
}

impl Tok {
    pub fn id(name: &str) -> Self { Id { name: Name::new(name) } }

    /// Classifies one whitespace-free surface atom.
    pub fn from_atom(atom: &str) -> Self {
        match atom {
            "type" => Type,
            "->" | "→" => Arrow,
            ":" => Colon,
            "(" => LParen,
            ")" => RParen,
            "[" => LBrack,
            "]" => RBrack,
            "." => Dot,
            "EOF" => Eof,
            owise => Tok::id(owise),
        }
    }

    /// The text this token stands for; also what a pending `:` reads as the name.
    pub fn raw(&self) -> &str {
        match self {
            Type => "type",
            Arrow => "->",
            Colon => ":",
            LParen => "(",
            RParen => ")",
            LBrack => "[",
            RBrack => "]",
            Dot => ".",
            Id { name } => name.as_str(),
            Grab => "grab",
            Ret => "ret",
            Eof => "EOF",
        }
    }

    pub fn opens_scope(&self) -> bool { matches!(self, LParen | LBrack) }

    pub fn closes_scope(&self) -> bool { matches!(self, RParen | RBrack) }
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.raw()) }
}
