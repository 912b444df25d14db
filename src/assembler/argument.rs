//! Instruction operand parsing.
//!
//! Turns the operand tokens of one instruction into a value plus the set
//! of addressing modes the written syntax could mean. The compilation
//! context later intersects that set with the mnemonic's supported modes
//! and applies the variant-selection rules.
//!
//! Alias substitution happens here: an identifier naming a known alias
//! becomes its literal bytes; any other identifier is a symbol reference.

use crate::addressing::AddressingMode;
use crate::program::Program;

use super::lexer::{Token, TokenType};
use super::{AssemblyError, AssemblyErrorKind};

/// The payload an operand contributes to encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgumentValue {
    /// No operand bytes (implied and accumulator instructions).
    None,

    /// Literal bytes, little-endian, one or two of them.
    Bytes(Vec<u8>),

    /// Reference to a symbol, resolved through a relocation.
    Symbol(String),
}

/// A parsed operand: its value and the modes its syntax allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedArgument {
    /// Addressing modes the surface syntax could select.
    pub possible_modes: Vec<AddressingMode>,

    /// Operand payload.
    pub value: ArgumentValue,
}

/// A bare term: a literal (or alias, substituted) or a symbol name.
enum Term {
    Bytes(Vec<u8>),
    Symbol(String),
}

fn resolve_term(token: &Token, program: &Program) -> Result<Term, AssemblyError> {
    match &token.token_type {
        TokenType::Number { value, width } => {
            let mut bytes = vec![(*value & 0xFF) as u8];
            if *width == 2 {
                bytes.push((*value >> 8) as u8);
            }
            Ok(Term::Bytes(bytes))
        }
        TokenType::Identifier(name) => match program.find_alias(name) {
            Some(alias) => Ok(Term::Bytes(alias.bytes.clone())),
            None => Ok(Term::Symbol(name.clone())),
        },
        _ => Err(unrecognized(token)),
    }
}

fn unrecognized(token: &Token) -> AssemblyError {
    AssemblyError {
        line: token.line,
        column: token.column,
        kind: AssemblyErrorKind::UnrecognizedOperand,
    }
}

fn is_register(token: &Token, name: &str) -> bool {
    matches!(&token.token_type, TokenType::Identifier(id) if id.eq_ignore_ascii_case(name))
}

use AddressingMode::*;

/// Modes a bare term can mean: byte-sized terms could be zero-page or a
/// branch offset; symbols stay 16-bit-capable until the selection rules
/// prune them.
fn direct_modes(term: &Term) -> Vec<AddressingMode> {
    match term {
        Term::Bytes(bytes) if bytes.len() == 1 => vec![ZeroPage, Relative, Absolute],
        Term::Bytes(_) => vec![Absolute],
        Term::Symbol(_) => vec![ZeroPage, Relative, Absolute],
    }
}

fn indexed_modes(term: &Term, zero_page: AddressingMode, absolute: AddressingMode) -> Vec<AddressingMode> {
    match term {
        Term::Bytes(bytes) if bytes.len() == 2 => vec![absolute],
        _ => vec![zero_page, absolute],
    }
}

fn term_value(term: Term) -> ArgumentValue {
    match term {
        Term::Bytes(bytes) => ArgumentValue::Bytes(bytes),
        Term::Symbol(name) => ArgumentValue::Symbol(name),
    }
}

/// Parses the operand tokens of one instruction line.
///
/// `line` is the source line used for errors on empty token slices.
pub(crate) fn parse_argument(
    tokens: &[Token],
    program: &Program,
    line: usize,
) -> Result<ParsedArgument, AssemblyError> {
    match tokens {
        // No operand: implied, or accumulator for the shift family
        [] => Ok(ParsedArgument {
            possible_modes: vec![Implied, Accumulator],
            value: ArgumentValue::None,
        }),

        // Explicit accumulator operand
        [reg] if is_register(reg, "A") => Ok(ParsedArgument {
            possible_modes: vec![Accumulator],
            value: ArgumentValue::None,
        }),

        // #value - immediate; must be a byte
        [hash, term_token] if hash.token_type == TokenType::Hash => {
            match resolve_term(term_token, program)? {
                Term::Bytes(bytes) if bytes.len() == 1 => Ok(ParsedArgument {
                    possible_modes: vec![Immediate],
                    value: ArgumentValue::Bytes(bytes),
                }),
                Term::Bytes(bytes) => Err(AssemblyError {
                    line: term_token.line,
                    column: term_token.column,
                    kind: AssemblyErrorKind::ValueOutOfRange {
                        value: bytes_value(&bytes),
                    },
                }),
                Term::Symbol(_) => Err(unrecognized(term_token)),
            }
        }

        // value - direct: zero-page, absolute, or a branch target
        [term_token] => {
            let term = resolve_term(term_token, program)?;
            Ok(ParsedArgument {
                possible_modes: direct_modes(&term),
                value: term_value(term),
            })
        }

        // value,X / value,Y
        [term_token, comma, reg] if comma.token_type == TokenType::Comma => {
            let term = resolve_term(term_token, program)?;
            let possible_modes = if is_register(reg, "X") {
                indexed_modes(&term, ZeroPageX, AbsoluteX)
            } else if is_register(reg, "Y") {
                indexed_modes(&term, ZeroPageY, AbsoluteY)
            } else {
                return Err(unrecognized(reg));
            };
            Ok(ParsedArgument {
                possible_modes,
                value: term_value(term),
            })
        }

        // (value) - indirect jump target
        [lparen, term_token, rparen]
            if lparen.token_type == TokenType::LParen && rparen.token_type == TokenType::RParen =>
        {
            let term = resolve_term(term_token, program)?;
            Ok(ParsedArgument {
                possible_modes: vec![Indirect],
                value: term_value(term),
            })
        }

        // (value,X) - indexed indirect
        [lparen, term_token, comma, reg, rparen]
            if lparen.token_type == TokenType::LParen
                && comma.token_type == TokenType::Comma
                && rparen.token_type == TokenType::RParen
                && is_register(reg, "X") =>
        {
            let term = resolve_term(term_token, program)?;
            Ok(ParsedArgument {
                possible_modes: vec![IndirectX],
                value: term_value(term),
            })
        }

        // (value),Y - indirect indexed
        [lparen, term_token, rparen, comma, reg]
            if lparen.token_type == TokenType::LParen
                && rparen.token_type == TokenType::RParen
                && comma.token_type == TokenType::Comma
                && is_register(reg, "Y") =>
        {
            let term = resolve_term(term_token, program)?;
            Ok(ParsedArgument {
                possible_modes: vec![IndirectY],
                value: term_value(term),
            })
        }

        _ => Err(tokens.first().map(unrecognized).unwrap_or(AssemblyError {
            line,
            column: 0,
            kind: AssemblyErrorKind::UnrecognizedOperand,
        })),
    }
}

pub(crate) fn bytes_value(bytes: &[u8]) -> u16 {
    match bytes {
        [lo] => u16::from(*lo),
        [lo, hi] => u16::from(*lo) | (u16::from(*hi) << 8),
        _ => 0,
    }
}
