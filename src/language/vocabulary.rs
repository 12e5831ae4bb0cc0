//! Fixed word lists of the Stacky language.
//!
//! The order of each list is significant: completion emits suggestions in
//! exactly this order.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Every Stacky command, in suggestion order.
pub const COMMANDS: &[&str] = &[
    "nop", "push", "pop", "add", "sub", "mul", "div", "mod", "neg", "dup",
    "print", "println", "read",
    "goto", "br",
    "load", "store",
    "gt", "lt", "ge", "le", "eq", "ne",
    "and", "or", "not", "xor", "shl", "shr",
    "convert",
    "rotl", "rotr", "clz", "ctz",
    "min", "max", "abs", "sign", "ceil", "floor", "trunc", "sqrt", "pow",
    "sin", "cos", "tan", "asin", "acos", "atan",
    "sinh", "cosh", "tanh", "asinh", "acosh", "atanh",
    "exp", "log",
    "len", "getarg", "assert", "error", "exit",
];

/// Valid operands of `convert`.
pub const TYPE_NAMES: &[&str] = &["string", "int", "float", "bool", "nil"];

/// Literal operands offered after `push`.
pub const CONSTANTS: &[&str] = &["true", "false", "nil"];

/// Commands whose operand is a label.
pub const LABEL_COMMANDS: &[&str] = &["goto", "br"];

/// Commands whose operand is a local.
pub const LOCAL_COMMANDS: &[&str] = &["load", "store"];

static COMMAND_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| COMMANDS.iter().copied().collect());

/// Whether `word` is a reserved command (a keyword for highlighting).
pub fn is_command(word: &str) -> bool {
    COMMAND_SET.contains(word)
}
