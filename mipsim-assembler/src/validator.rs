//! Line validation: every logical line must be a well-formed directive, a
//! label definition, or a known instruction with the right arity.

use crate::directives::Directive;
use crate::error::AssemblerError;
use crate::isa;
use crate::lexer::Line;

/// Check the whole line stream, stopping at the first failure. Unknown
/// registers and unresolved labels are deliberately not checked here; they
/// surface during pass 2 so forward references work.
pub fn validate(lines: &[Line]) -> Result<(), AssemblerError> {
    for line in lines {
        validate_line(line)?;
    }
    Ok(())
}

fn validate_line(line: &Line) -> Result<(), AssemblerError> {
    if let Some(label) = line.label() {
        return if is_identifier(label) {
            Ok(())
        } else {
            Err(AssemblerError::Syntax {
                line: line.num,
                text: line.text(),
            })
        };
    }

    if line.is_directive() {
        return Directive::parse(line)?.validate();
    }

    let arity = isa::op_info(&line.mnemonic)
        .map(|info| info.operands)
        .or_else(|| isa::pseudo_arity(&line.mnemonic));

    match arity {
        Some(arity) if line.args.len() == arity => Ok(()),
        Some(_) => Err(AssemblerError::InstructionSyntax {
            line: line.num,
            text: line.text(),
        }),
        None => Err(AssemblerError::Syntax {
            line: line.num,
            text: line.text(),
        }),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::normalize;

    fn check(source: &str) -> Result<(), AssemblerError> {
        validate(&normalize(source).unwrap())
    }

    #[test]
    fn accepts_wellformed_programs() {
        check(
            "main: li $t0, 5\n\
             loop: addi $t0, $t0, -1\n\
             bne $t0, $zero, loop\n\
             .data\n\
             msg: .asciiz \"done\"\n\
             .text\n\
             nop",
        )
        .unwrap();
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = check("add $t0, $t1").unwrap_err();
        assert!(matches!(err, AssemblerError::InstructionSyntax { line: 1, .. }));
    }

    #[test]
    fn rejects_unknown_mnemonics() {
        let err = check("nop\nfrobnicate $t0").unwrap_err();
        assert!(matches!(err, AssemblerError::Syntax { line: 2, .. }));
    }

    #[test]
    fn rejects_bad_labels() {
        assert!(check("9lives: nop").is_err());
        assert!(check("ok_label: nop").is_ok());
    }

    #[test]
    fn pseudo_arity_is_checked() {
        assert!(check("li $t0").is_err());
        assert!(check("blt $t0, $t1, out").is_ok());
    }
}
