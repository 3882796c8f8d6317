//! The compiled matching program.
//!
//! A program is a pre-order listing of the pattern tree. Fixed-arity nodes
//! are followed by exactly `arity` child subprograms; list nodes and
//! multi-statement runs are followed by child subprograms up to an `End`
//! marker. Every instruction records the grammar field its node must occupy
//! in the parent.

use std::fmt::Write as _;
use std::sync::Arc;

/// Grammar fields a sequence wildcard may consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Any children regardless of field.
    Any,
    /// Only children occupying one of these fields.
    Fields(Vec<&'static str>),
}

impl Slot {
    /// Returns whether a child in `field` may be consumed.
    #[must_use]
    pub fn admits(&self, field: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Fields(fields) => field.is_some_and(|f| fields.contains(&f)),
        }
    }
}

/// The operation performed by one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// A node of `kind` with exactly `arity` children and the given
    /// operator/keyword tokens.
    Node {
        /// Grammar kind.
        kind: &'static str,
        /// Operator and keyword tokens, punctuation excluded.
        tokens: Vec<&'static str>,
        /// Number of child subprograms that follow.
        arity: usize,
    },
    /// A node of `kind` whose children are matched as a sequence.
    List {
        /// Grammar kind.
        kind: &'static str,
        /// Operator and keyword tokens, punctuation excluded.
        tokens: Vec<&'static str>,
        /// Whether the whole node may be absent from its parent.
        optional: bool,
    },
    /// A token-level node compared by spelling or literal value.
    Leaf {
        /// Grammar kind.
        kind: &'static str,
        /// Source spelling in the pattern.
        text: String,
    },
    /// An identifier naming an imported package.
    Package {
        /// Spelling used in the pattern.
        alias: String,
        /// Import path the identifier must resolve to.
        path: String,
    },
    /// Any single node, optionally captured.
    Wildcard {
        /// Capture name, `None` for `$_`.
        var: Option<Arc<str>>,
    },
    /// Zero or more nodes, optionally captured.
    SeqWildcard {
        /// Capture name, `None` for `$*_`.
        var: Option<Arc<str>>,
        /// Fields the wildcard may consume.
        slot: Slot,
    },
    /// Terminates a `List` or `Run`.
    End,
    /// A run of consecutive statements.
    Run,
}

/// One program step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation.
    pub op: Op,
    /// Field the matched node must occupy in its parent.
    pub field: Option<&'static str>,
}

/// An immutable compiled matching program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    strict: bool,
}

impl Program {
    pub(crate) const fn new(instructions: Vec<Instruction>, strict: bool) -> Self {
        Self {
            instructions,
            strict,
        }
    }

    /// Returns the instructions in program order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the instruction at `pc`.
    #[must_use]
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    /// Whether literals compare by spelling.
    #[must_use]
    pub const fn strict(&self) -> bool {
        self.strict
    }

    /// Whether the program matches statement runs rather than single nodes.
    #[must_use]
    pub fn is_run(&self) -> bool {
        matches!(self.get(0).map(|i| &i.op), Some(Op::Run))
    }

    /// Returns the position just past the subprogram starting at `pc`.
    pub(crate) fn skip(&self, pc: usize) -> usize {
        match self.get(pc).map(|i| &i.op) {
            Some(Op::Node { arity, .. }) => {
                (0..*arity).fold(pc + 1, |next, _| self.skip(next))
            }
            Some(Op::List { .. } | Op::Run) => {
                let mut next = pc + 1;
                while let Some(instruction) = self.get(next) {
                    if instruction.op == Op::End {
                        return next + 1;
                    }
                    next = self.skip(next);
                }
                next
            }
            _ => pc + 1,
        }
    }

    /// Collects the named sequence wildcards inside the subprogram at `pc`.
    pub(crate) fn seq_vars(&self, pc: usize) -> Vec<Arc<str>> {
        let end = self.skip(pc);
        self.instructions
            .get(pc..end)
            .unwrap_or_default()
            .iter()
            .filter_map(|instruction| match &instruction.op {
                Op::SeqWildcard { var: Some(name), .. } => Some(Arc::clone(name)),
                _ => None,
            })
            .collect()
    }

    /// Renders the program one instruction per line, indented by depth.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut pc = 0;
        while pc < self.instructions.len() {
            pc = self.dump_at(pc, 0, &mut out);
        }
        out
    }

    fn dump_at(&self, pc: usize, depth: usize, out: &mut String) -> usize {
        let Some(instruction) = self.get(pc) else {
            return pc + 1;
        };
        let indent = "  ".repeat(depth);
        let field = instruction
            .field
            .map(|f| format!("{f}: "))
            .unwrap_or_default();
        let _ = writeln!(out, "{indent}{field}{}", describe(&instruction.op));

        match &instruction.op {
            Op::Node { arity, .. } => {
                (0..*arity).fold(pc + 1, |next, _| self.dump_at(next, depth + 1, out))
            }
            Op::List { .. } | Op::Run => {
                let mut next = pc + 1;
                while let Some(child) = self.get(next) {
                    if child.op == Op::End {
                        let _ = writeln!(out, "{indent}  End");
                        return next + 1;
                    }
                    next = self.dump_at(next, depth + 1, out);
                }
                next
            }
            _ => pc + 1,
        }
    }
}

fn describe(op: &Op) -> String {
    let tokens = |tokens: &[&str]| {
        if tokens.is_empty() {
            String::new()
        } else {
            format!(" {}", tokens.join(" "))
        }
    };
    match op {
        Op::Node { kind, tokens: t, .. } => format!("Node({kind}){}", tokens(t)),
        Op::List {
            kind,
            tokens: t,
            optional,
        } => {
            let opt = if *optional { "?" } else { "" };
            format!("List({kind}){opt}{}", tokens(t))
        }
        Op::Leaf { kind, text } => format!("Leaf({kind} {text})"),
        Op::Package { alias, path } => format!("Package({alias} {path:?})"),
        Op::Wildcard { var: None } => "Any".to_owned(),
        Op::Wildcard { var: Some(name) } => format!("Var({name})"),
        Op::SeqWildcard { var, slot } => {
            let head = var
                .as_ref()
                .map_or_else(|| "AnySeq".to_owned(), |name| format!("SeqVar({name})"));
            match slot {
                Slot::Any => head,
                Slot::Fields(fields) => format!("{head} [{}]", fields.join("|")),
            }
        }
        Op::End => "End".to_owned(),
        Op::Run => "Run".to_owned(),
    }
}
