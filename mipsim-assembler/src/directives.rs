//! Assembler directives: argument validation, byte sizing for the symbol
//! passes, and execution against the memory image.

use crate::error::AssemblerError;
use crate::lexer::Line;
use crate::tokenizer::parse_int;
use mipsim_types::Memory;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DirectiveKind {
    Align,
    Ascii,
    Asciiz,
    Byte,
    Half,
    Word,
    Float,
    Double,
    Space,
    Data,
    Text,
}

impl DirectiveKind {
    fn parse(mnemonic: &str) -> Option<DirectiveKind> {
        let kind = match mnemonic {
            ".align" => DirectiveKind::Align,
            ".ascii" => DirectiveKind::Ascii,
            ".asciiz" => DirectiveKind::Asciiz,
            ".byte" => DirectiveKind::Byte,
            ".half" => DirectiveKind::Half,
            ".word" => DirectiveKind::Word,
            ".float" => DirectiveKind::Float,
            ".double" => DirectiveKind::Double,
            ".space" => DirectiveKind::Space,
            ".data" => DirectiveKind::Data,
            ".text" => DirectiveKind::Text,
            _ => return None,
        };
        Some(kind)
    }
}

/// A parsed directive line. `forward_offset` reports the bytes it reserves;
/// `execute` writes its initializer bytes at the address recorded for it
/// during the resolution walk.
#[derive(Debug, Clone)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub args: Vec<String>,
    pub line: usize,
    text: String,
}

impl Directive {
    /// Parse a normalized directive line. The line's mnemonic must start
    /// with `.`; an unrecognized name is a syntax error.
    pub fn parse(line: &Line) -> Result<Directive, AssemblerError> {
        let kind = DirectiveKind::parse(&line.mnemonic).ok_or_else(|| AssemblerError::Syntax {
            line: line.num,
            text: line.text(),
        })?;

        Ok(Directive {
            kind,
            args: line.args.clone(),
            line: line.num,
            text: line.text(),
        })
    }

    /// Check arity and argument shape without touching memory.
    pub fn validate(&self) -> Result<(), AssemblerError> {
        match self.kind {
            DirectiveKind::Align | DirectiveKind::Space => {
                if self.args.len() != 1 {
                    return Err(self.syntax_error());
                }
                self.unsigned_arg(&self.args[0])?;
            }
            DirectiveKind::Ascii | DirectiveKind::Asciiz => {
                if self.args.is_empty() {
                    return Err(self.syntax_error());
                }
                self.string_arg()?;
            }
            DirectiveKind::Byte | DirectiveKind::Half | DirectiveKind::Word => {
                if self.args.is_empty() {
                    return Err(self.syntax_error());
                }
                for arg in &self.args {
                    self.int_arg(arg)?;
                }
            }
            DirectiveKind::Float | DirectiveKind::Double => {
                if self.args.is_empty() {
                    return Err(self.syntax_error());
                }
                for arg in &self.args {
                    if arg.parse::<f64>().is_err() {
                        return Err(AssemblerError::DirectiveSemantic {
                            line: self.line,
                            message: format!("expected a numeric literal, found '{}'", arg),
                        });
                    }
                }
            }
            DirectiveKind::Data | DirectiveKind::Text => {
                if !self.args.is_empty() {
                    return Err(self.syntax_error());
                }
            }
        }
        Ok(())
    }

    /// The number of bytes this directive reserves, given the current
    /// location counter.
    pub fn forward_offset(&self, counter: u32) -> Result<u32, AssemblerError> {
        let argc = self.args.len() as u32;
        let bytes = match self.kind {
            DirectiveKind::Align => {
                let arg = self.args.get(0).ok_or_else(|| self.syntax_error())?;
                let boundary = self.unsigned_arg(arg)?;
                if boundary <= 1 {
                    0
                } else {
                    (boundary - counter % boundary) % boundary
                }
            }
            DirectiveKind::Ascii => self.decoded_string()?.len() as u32,
            DirectiveKind::Asciiz => self.decoded_string()?.len() as u32 + 1,
            DirectiveKind::Byte => argc,
            DirectiveKind::Half => 2 * argc,
            DirectiveKind::Word | DirectiveKind::Float => 4 * argc,
            DirectiveKind::Double => 8 * argc,
            DirectiveKind::Space => {
                let arg = self.args.get(0).ok_or_else(|| self.syntax_error())?;
                self.unsigned_arg(arg)?
            }
            DirectiveKind::Data | DirectiveKind::Text => 0,
        };
        Ok(bytes)
    }

    /// Write the directive's initializer bytes into memory at `address`.
    /// Reservation-only directives write nothing; the unsupported
    /// floating-point directives warn and still reserve their space.
    pub fn execute(&self, address: u32, memory: &mut Memory) -> Result<(), AssemblerError> {
        let bytes = match self.kind {
            DirectiveKind::Ascii => self.decoded_string()?,
            DirectiveKind::Asciiz => {
                let mut bytes = self.decoded_string()?;
                bytes.push(0);
                bytes
            }
            DirectiveKind::Byte => {
                let mut bytes = Vec::with_capacity(self.args.len());
                for arg in &self.args {
                    bytes.push(self.int_arg(arg)? as u8);
                }
                bytes
            }
            DirectiveKind::Half => {
                let mut bytes = Vec::with_capacity(2 * self.args.len());
                for arg in &self.args {
                    bytes.extend_from_slice(&(self.int_arg(arg)? as u16).to_le_bytes());
                }
                bytes
            }
            DirectiveKind::Word => {
                let mut bytes = Vec::with_capacity(4 * self.args.len());
                for arg in &self.args {
                    bytes.extend_from_slice(&(self.int_arg(arg)? as u32).to_le_bytes());
                }
                bytes
            }
            DirectiveKind::Float | DirectiveKind::Double => {
                log::warn!(
                    "line {}: floating-point directives are not supported; \
                     reserving space without initializing it",
                    self.line
                );
                return Ok(());
            }
            DirectiveKind::Align
            | DirectiveKind::Space
            | DirectiveKind::Data
            | DirectiveKind::Text => return Ok(()),
        };

        memory
            .write(address, &bytes)
            .map_err(|source| AssemblerError::Memory {
                line: self.line,
                source,
            })
    }

    fn syntax_error(&self) -> AssemblerError {
        AssemblerError::DirectiveSyntax {
            line: self.line,
            text: self.text.clone(),
        }
    }

    fn int_arg(&self, arg: &str) -> Result<i64, AssemblerError> {
        parse_int(arg).ok_or_else(|| AssemblerError::DirectiveSemantic {
            line: self.line,
            message: format!("expected an integer, found '{}'", arg),
        })
    }

    fn unsigned_arg(&self, arg: &str) -> Result<u32, AssemblerError> {
        match self.int_arg(arg)? {
            value if (0..=u32::MAX as i64).contains(&value) => Ok(value as u32),
            value => Err(AssemblerError::DirectiveSemantic {
                line: self.line,
                message: format!("expected a non-negative integer, found {}", value),
            }),
        }
    }

    /// The quoted string argument, rejoined across comma-split parts.
    fn string_arg(&self) -> Result<String, AssemblerError> {
        let joined = self.args.join(", ");
        let inner = joined
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| self.syntax_error())?;
        Ok(inner.to_string())
    }

    fn decoded_string(&self) -> Result<Vec<u8>, AssemblerError> {
        Ok(decode_escapes(&self.string_arg()?))
    }
}

/// Process the string-directive escape alphabet. Each recognized
/// two-character escape contributes one byte; an unknown escape keeps the
/// backslash literally.
fn decode_escapes(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            bytes.push(c as u8);
            continue;
        }

        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0C),
            Some('v') => bytes.push(0x0B),
            Some('\\') => bytes.push(b'\\'),
            Some('"') => bytes.push(b'"'),
            Some('\'') => bytes.push(b'\''),
            Some(other) => {
                bytes.push(b'\\');
                bytes.push(other as u8);
            }
            None => bytes.push(b'\\'),
        }
    }

    bytes
}
