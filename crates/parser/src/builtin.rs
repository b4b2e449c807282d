/// Predeclared type identifiers of the Go universe scope
const UNIVERSE_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Whether `name` is a built-in type that never belongs to a package
pub fn is_builtin(name: &str) -> bool {
    UNIVERSE_TYPES.contains(&name)
}
