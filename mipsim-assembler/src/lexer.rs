//! Source normalization: raw text to logical lines.

use crate::error::AssemblerError;

/// One normalized logical line: a label definition, a directive, or an
/// instruction, in canonical `mnemonic arg…` form with comma-split,
/// trimmed arguments.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Line {
    /// 1-based source line number (shared by lines split off a label)
    pub num: usize,
    pub mnemonic: String,
    pub args: Vec<String>,
}

impl Line {
    /// The canonical text of the line, used in error messages.
    pub fn text(&self) -> String {
        if self.args.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{} {}", self.mnemonic, self.args.join(" "))
        }
    }

    /// The label name if this line is a label definition (colon stripped).
    pub fn label(&self) -> Option<&str> {
        if self.args.is_empty() && self.mnemonic.ends_with(':') {
            Some(&self.mnemonic[..self.mnemonic.len() - 1])
        } else {
            None
        }
    }

    pub fn is_directive(&self) -> bool {
        self.mnemonic.starts_with('.')
    }
}

/// Normalize raw source text into logical lines, applying in order:
/// comment removal (`#` and `;`), label splitting, empty-line removal,
/// whitespace collapse, and character-literal conversion.
pub fn normalize(source: &str) -> Result<Vec<Line>, AssemblerError> {
    let mut lines = Vec::new();

    for (idx, raw) in source.trim_end().lines().enumerate() {
        let num = idx + 1;
        let stripped = strip_comment(raw);

        for piece in split_labels(stripped, num)? {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            lines.push(canonicalize(piece, num)?);
        }
    }

    Ok(lines)
}

/// Remove everything from the first comment marker to end-of-line.
/// `;` is a synonym for `#`.
fn strip_comment(line: &str) -> &str {
    match line.find(|c| c == '#' || c == ';') {
        Some(start) => &line[..start],
        None => line,
    }
}

/// Break a line after every `:` that is not inside a double-quoted string
/// or a single-quoted character literal, so a label always ends up on its
/// own logical line. A colon at end-of-line splits off only an empty tail,
/// which the caller drops.
fn split_labels(line: &str, num: usize) -> Result<Vec<String>, AssemblerError> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut in_char = false;
    let mut escaped = false;

    for c in line.chars() {
        current.push(c);

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if in_char {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\'' {
                in_char = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == '\'' {
            in_char = true;
        } else if c == ':' {
            pieces.push(std::mem::take(&mut current));
        }
    }

    if in_string {
        return Err(AssemblerError::Syntax {
            line: num,
            text: format!("unterminated string in '{}'", line.trim()),
        });
    }

    if in_char {
        return Err(AssemblerError::Syntax {
            line: num,
            text: format!("malformed character literal in '{}'", line.trim()),
        });
    }

    pieces.push(current);
    Ok(pieces)
}

/// Collapse a logical line into its canonical form: the mnemonic followed
/// by comma-split, trimmed arguments with character literals converted to
/// integer literals.
fn canonicalize(piece: &str, num: usize) -> Result<Line, AssemblerError> {
    let (mnemonic, rest) = match piece.find(char::is_whitespace) {
        Some(split) => (&piece[..split], piece[split..].trim_start()),
        None => (piece, ""),
    };

    let mut args = Vec::new();
    if !rest.is_empty() {
        for arg in rest.split(',') {
            let arg = arg.trim();
            if arg.is_empty() {
                continue;
            }
            args.push(convert_char_literal(arg, num)?);
        }
    }

    Ok(Line {
        num,
        mnemonic: mnemonic.to_string(),
        args,
    })
}

/// Rewrite a single-quoted character literal (`'c'` or `'\e'`) as the
/// decimal ASCII code in the same token position. Other tokens pass
/// through untouched.
fn convert_char_literal(arg: &str, num: usize) -> Result<String, AssemblerError> {
    if arg.len() < 3 || !arg.starts_with('\'') || !arg.ends_with('\'') {
        return Ok(arg.to_string());
    }

    let inner: Vec<char> = arg[1..arg.len() - 1].chars().collect();
    let code = match inner.as_slice() {
        [c] if *c != '\\' => *c as u32,
        ['\\', escape] => match escape {
            'n' => '\n' as u32,
            'r' => '\r' as u32,
            't' => '\t' as u32,
            '\\' => '\\' as u32,
            '\'' => '\'' as u32,
            '"' => '"' as u32,
            '0' => 0,
            _ => {
                return Err(AssemblerError::Syntax {
                    line: num,
                    text: format!("unknown escape in character literal {}", arg),
                })
            }
        },
        _ => {
            return Err(AssemblerError::Syntax {
                line: num,
                text: format!("malformed character literal {}", arg),
            })
        }
    };

    Ok(code.to_string())
}
