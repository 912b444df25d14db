//! The compilation context: cursor, directives, labels and encoding.
//!
//! Assembly is a single pass. Instructions referencing a symbol that is
//! not yet defined emit placeholder operand bytes and queue a relocation;
//! defining the label later walks the queued references and patches each
//! site. Finalization rejects any symbol that never received an offset.

use log::debug;

use crate::addressing::AddressingMode;
use crate::opcodes::{encoding_of, variants_of, Mnemonic};
use crate::program::{Program, Relocation, RelocationMode, Segment, SymbolId};

use super::argument::{bytes_value, parse_argument, ArgumentValue};
use super::lexer::{Token, TokenType};
use super::{AssemblyError, AssemblyErrorKind};

/// State threaded through one assembly run.
pub(crate) struct CompilationContext {
    program: Program,
    current_position: u16,
}

impl CompilationContext {
    pub(crate) fn new() -> Self {
        Self {
            program: Program::new(),
            current_position: 0,
        }
    }

    /// Processes the tokens of one logical source line.
    pub(crate) fn process_line(&mut self, tokens: &[Token]) -> Result<(), AssemblyError> {
        let mut rest = tokens;

        // Leading `NAME:` defines a label at the cursor
        if rest.len() >= 2 && rest[1].token_type == TokenType::Colon {
            if let TokenType::Identifier(name) = &rest[0].token_type {
                self.define_label(name, &rest[0])?;
                rest = &rest[2..];
            }
        }

        match rest {
            [] => Ok(()),
            [dot, name_token, args @ ..] if dot.token_type == TokenType::Dot => {
                match &name_token.token_type {
                    TokenType::Identifier(name) => self.directive(name, name_token, args),
                    _ => Err(error_at(name_token, AssemblyErrorKind::UnexpectedToken)),
                }
            }
            [name_token, eq, value @ ..] if eq.token_type == TokenType::Equal => {
                match &name_token.token_type {
                    TokenType::Identifier(name) => self.define_alias(name, name_token, value),
                    _ => Err(error_at(name_token, AssemblyErrorKind::UnexpectedToken)),
                }
            }
            [name_token, args @ ..] => match &name_token.token_type {
                TokenType::Identifier(name) => self.instruction(name, name_token, args),
                _ => Err(error_at(name_token, AssemblyErrorKind::UnexpectedToken)),
            },
        }
    }

    /// Consumes the context, checking that every symbol got an offset.
    pub(crate) fn finalize(self) -> Result<Program, AssemblyError> {
        for symbol in self.program.symbols() {
            if !symbol.imported && symbol.offset.is_none() {
                let line = symbol
                    .references()
                    .first()
                    .map(|&id| self.program.relocation(id).line)
                    .unwrap_or(0);
                return Err(AssemblyError {
                    line,
                    column: 0,
                    kind: AssemblyErrorKind::UndefinedSymbol {
                        name: symbol.name.clone(),
                    },
                });
            }
        }
        Ok(self.program)
    }

    // ========== Labels ==========

    fn define_label(&mut self, name: &str, token: &Token) -> Result<(), AssemblyError> {
        let id = self.program.intern_symbol(name);
        if self.program.symbol(id).offset.is_some() {
            return Err(error_at(
                token,
                AssemblyErrorKind::DuplicateLabel {
                    name: name.to_string(),
                },
            ));
        }

        let position = self.current_position;
        debug!("defining label '{name}' at {position:04x}");
        {
            let symbol = self.program.symbol_mut(id);
            symbol.offset = Some(position);
            symbol.imported = false;
            symbol.segment = if position <= 0xFF {
                Segment::ZeroPage
            } else {
                Segment::Code
            };
        }
        self.relocate_symbol(id, position)
    }

    /// Patches every queued reference to a freshly defined symbol.
    fn relocate_symbol(&mut self, id: SymbolId, offset: u16) -> Result<(), AssemblyError> {
        let references: Vec<_> = self.program.symbol(id).references().to_vec();
        for reference in references {
            let relocation = self.program.relocation(reference).clone();
            debug!(
                "relocating {} reference at {:04x} -> {offset:04x}",
                relocation.mode, relocation.position
            );
            let bytes = relocation
                .mode
                .encode(offset, relocation.position)
                .map_err(|e| AssemblyError {
                    line: relocation.line,
                    column: 0,
                    kind: e.into(),
                })?;
            // Placeholders may legitimately be overwritten
            self.program
                .image
                .put_bytes(relocation.position, &bytes, true)
                .map_err(|e| AssemblyError {
                    line: relocation.line,
                    column: 0,
                    kind: e.into(),
                })?;
        }
        Ok(())
    }

    // ========== Directives ==========

    fn directive(
        &mut self,
        name: &str,
        name_token: &Token,
        args: &[Token],
    ) -> Result<(), AssemblyError> {
        match name.to_ascii_lowercase().as_str() {
            "org" => {
                let terms = split_terms(args)?;
                let [term] = terms.as_slice() else {
                    return Err(error_at(
                        name_token,
                        AssemblyErrorKind::WrongDirectiveArity {
                            directive: "org".to_string(),
                        },
                    ));
                };
                let value = self.term_word(term)?;
                debug!(
                    "moving cursor {:04x} -> {value:04x}",
                    self.current_position
                );
                self.current_position = value;
                Ok(())
            }
            "byte" => {
                let terms = split_terms(args)?;
                if terms.is_empty() {
                    return Err(error_at(
                        name_token,
                        AssemblyErrorKind::WrongDirectiveArity {
                            directive: "byte".to_string(),
                        },
                    ));
                }
                for term in terms {
                    let value = self.term_word(term)?;
                    if value > 0xFF {
                        return Err(error_at(
                            term,
                            AssemblyErrorKind::ValueOutOfRange { value },
                        ));
                    }
                    self.emit(&[value as u8], term)?;
                }
                Ok(())
            }
            "word" => {
                let terms = split_terms(args)?;
                if terms.is_empty() {
                    return Err(error_at(
                        name_token,
                        AssemblyErrorKind::WrongDirectiveArity {
                            directive: "word".to_string(),
                        },
                    ));
                }
                for term in terms {
                    let value = self.term_word(term)?;
                    self.emit(&[(value & 0xFF) as u8, (value >> 8) as u8], term)?;
                }
                Ok(())
            }
            _ => Err(error_at(
                name_token,
                AssemblyErrorKind::UnknownDirective {
                    name: name.to_string(),
                },
            )),
        }
    }

    /// Evaluates a directive term (literal or alias) to a word value.
    fn term_word(&self, token: &Token) -> Result<u16, AssemblyError> {
        match &token.token_type {
            TokenType::Number { value, .. } => Ok(*value),
            TokenType::Identifier(name) => match self.program.find_alias(name) {
                Some(alias) => Ok(bytes_value(&alias.bytes)),
                None => Err(error_at(
                    token,
                    AssemblyErrorKind::UndefinedAlias {
                        name: name.clone(),
                    },
                )),
            },
            _ => Err(error_at(token, AssemblyErrorKind::UnexpectedToken)),
        }
    }

    /// Writes bytes at the cursor and advances it.
    fn emit(&mut self, bytes: &[u8], token: &Token) -> Result<(), AssemblyError> {
        self.program
            .image
            .put_bytes(self.current_position, bytes, false)
            .map_err(|e| error_at(token, e.into()))?;
        self.current_position = self.current_position.wrapping_add(bytes.len() as u16);
        Ok(())
    }

    // ========== Aliases ==========

    fn define_alias(
        &mut self,
        name: &str,
        name_token: &Token,
        value_tokens: &[Token],
    ) -> Result<(), AssemblyError> {
        if self.program.find_alias(name).is_some() {
            return Err(error_at(
                name_token,
                AssemblyErrorKind::AliasRedefined {
                    name: name.to_string(),
                },
            ));
        }

        let [value_token] = value_tokens else {
            return Err(error_at(name_token, AssemblyErrorKind::UnexpectedToken));
        };

        let bytes = match &value_token.token_type {
            TokenType::Number { value, width } => {
                let mut bytes = vec![(*value & 0xFF) as u8];
                if *width == 2 {
                    bytes.push((*value >> 8) as u8);
                }
                bytes
            }
            TokenType::Identifier(other) if other == name => {
                return Err(error_at(
                    value_token,
                    AssemblyErrorKind::CyclicAlias {
                        name: name.to_string(),
                    },
                ));
            }
            TokenType::Identifier(other) => match self.program.find_alias(other) {
                Some(alias) => alias.bytes.clone(),
                None => {
                    return Err(error_at(
                        value_token,
                        AssemblyErrorKind::UndefinedAlias {
                            name: other.clone(),
                        },
                    ));
                }
            },
            _ => return Err(error_at(value_token, AssemblyErrorKind::UnexpectedToken)),
        };

        debug!("defining alias '{name}'");
        self.program.add_alias(crate::program::ValueAlias {
            name: name.to_string(),
            bytes,
        });
        Ok(())
    }

    // ========== Instructions ==========

    fn instruction(
        &mut self,
        name: &str,
        name_token: &Token,
        args: &[Token],
    ) -> Result<(), AssemblyError> {
        let mnemonic: Mnemonic = name.parse().map_err(|_| {
            error_at(
                name_token,
                AssemblyErrorKind::UnknownMnemonic {
                    name: name.to_string(),
                },
            )
        })?;

        let argument = parse_argument(args, &self.program, name_token.line)?;
        let mode = self.select_mode(mnemonic, &argument, name_token)?;
        let entry = encoding_of(mnemonic, mode).ok_or_else(|| {
            error_at(
                name_token,
                AssemblyErrorKind::UnsupportedAddressMode {
                    mnemonic: mnemonic.to_string(),
                },
            )
        })?;

        self.emit(&[entry.opcode], name_token)?;

        match argument.value {
            ArgumentValue::None => Ok(()),
            ArgumentValue::Bytes(bytes) => {
                let width = entry.operand_bytes() as usize;
                if bytes.len() > width {
                    // A word literal in a one-byte operand position
                    return Err(error_at(
                        name_token,
                        AssemblyErrorKind::ValueOutOfRange {
                            value: bytes_value(&bytes),
                        },
                    ));
                }
                let mut operand = bytes;
                // Byte-sized values widen when the selected mode takes a word
                operand.resize(width, 0);
                self.emit(&operand, name_token)
            }
            ArgumentValue::Symbol(symbol_name) => {
                self.symbol_operand(&symbol_name, mode, name_token)
            }
        }
    }

    /// Emits a symbol operand: an immediate patch when the offset is
    /// already known, else placeholder bytes. Either way a relocation is
    /// recorded.
    fn symbol_operand(
        &mut self,
        name: &str,
        mode: AddressingMode,
        token: &Token,
    ) -> Result<(), AssemblyError> {
        let relocation_mode = match mode {
            AddressingMode::Relative => RelocationMode::Relative,
            m if m.operand_bytes() == 1 => RelocationMode::ZeroPage,
            _ => RelocationMode::Absolute,
        };

        let target = self.program.intern_symbol(name);
        let position = self.current_position;

        let bytes = match self.program.symbol(target).offset {
            Some(offset) => relocation_mode
                .encode(offset, position)
                .map_err(|e| error_at(token, e.into()))?,
            None => {
                debug!("forward reference to '{name}' at {position:04x}");
                vec![0u8; relocation_mode.size() as usize]
            }
        };
        self.emit(&bytes, token)?;

        self.program.add_relocation(Relocation {
            target,
            position,
            mode: relocation_mode,
            line: token.line,
        });
        Ok(())
    }

    /// Applies the variant-selection rules: intersect syntax-possible
    /// modes with the mnemonic's supported modes, prefer zero-page for
    /// byte-sized literals, never zero-page for symbols, and require
    /// exactly one survivor.
    fn select_mode(
        &self,
        mnemonic: Mnemonic,
        argument: &super::argument::ParsedArgument,
        token: &Token,
    ) -> Result<AddressingMode, AssemblyError> {
        let supported = variants_of(mnemonic);
        let mut candidates: Vec<AddressingMode> = argument
            .possible_modes
            .iter()
            .copied()
            .filter(|m| supported.iter().any(|e| e.mode == *m))
            .collect();

        match &argument.value {
            ArgumentValue::Bytes(bytes) if bytes.len() == 1 => {
                let zero_page: Vec<_> = candidates
                    .iter()
                    .copied()
                    .filter(|m| m.is_zero_page())
                    .collect();
                for mode in zero_page {
                    if let Some(absolute) = mode.absolute_form() {
                        candidates.retain(|&c| c != absolute);
                    }
                }
            }
            // Symbols stay 16-bit until defined, so they never select a
            // zero-page variant
            ArgumentValue::Symbol(_) => candidates.retain(|m| !m.is_zero_page()),
            _ => {}
        }

        match candidates.as_slice() {
            [mode] => Ok(*mode),
            [] => Err(error_at(
                token,
                AssemblyErrorKind::UnsupportedAddressMode {
                    mnemonic: mnemonic.to_string(),
                },
            )),
            _ => Err(error_at(
                token,
                AssemblyErrorKind::AmbiguousAddressMode {
                    mnemonic: mnemonic.to_string(),
                },
            )),
        }
    }
}

fn error_at(token: &Token, kind: AssemblyErrorKind) -> AssemblyError {
    AssemblyError {
        line: token.line,
        column: token.column,
        kind,
    }
}

/// Splits comma-separated directive arguments into their term tokens.
fn split_terms(args: &[Token]) -> Result<Vec<&Token>, AssemblyError> {
    let mut terms = Vec::new();
    let mut expect_term = true;
    for token in args {
        match (&token.token_type, expect_term) {
            (TokenType::Comma, false) => expect_term = true,
            (TokenType::Number { .. } | TokenType::Identifier(_), true) => {
                terms.push(token);
                expect_term = false;
            }
            _ => return Err(error_at(token, AssemblyErrorKind::UnexpectedToken)),
        }
    }
    if expect_term && !terms.is_empty() {
        if let Some(last) = args.last() {
            // Trailing comma
            return Err(error_at(last, AssemblyErrorKind::UnexpectedToken));
        }
    }
    Ok(terms)
}

