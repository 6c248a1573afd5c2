//! Attribute registry (spec.md §4.3), static table ported from
//! `init_attributes` in `examples/original_source/iopc/iopc-parser.c`.

mod table;
pub mod check;

pub use table::{AttrId, AttrRegistry};

use std::fmt;

use crate::error::IopError;
use crate::loc::SourceLoc;
use crate::token::Literal;

/// A tiny hand-rolled bitmask newtype, in place of pulling in the
/// `bitflags` crate for three small masks (the teacher's dependency list
/// has no bitmask helper, so this stays plain `u32` arithmetic behind a
/// typed wrapper).
macro_rules! bitmask {
    ($name:ident { $($variant:ident = $val:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name(pub u32);

        impl $name {
            $(pub const $variant: $name = $name($val);)+

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            pub const fn intersects(self, other: $name) -> bool {
                (self.0 & other.0) != 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }
    };
}

bitmask!(TargetMask {
    STRUCT = 1 << 0,
    UNION = 1 << 1,
    CLASS = 1 << 2,
    ENUM = 1 << 3,
    INTERFACE = 1 << 4,
    RPC = 1 << 5,
    SNMP_IFACE = 1 << 6,
    SNMP_OBJ = 1 << 7,
    SNMP_TBL = 1 << 8,
    ALL = 0x1FF,
});

bitmask!(FieldKindMask {
    INT = 1 << 0,
    BOOL = 1 << 1,
    DOUBLE = 1 << 2,
    STRING = 1 << 3,
    DATA = 1 << 4,
    XML = 1 << 5,
    STRUCT = 1 << 6,
    UNION = 1 << 7,
    ENUM = 1 << 8,
    VOID = 1 << 9,
    ALL = 0x3FF,
});

bitmask!(RepeatMask {
    REQUIRED = 1 << 0,
    OPTIONAL = 1 << 1,
    REPEATED = 1 << 2,
    DEFVAL = 1 << 3,
    ALL = 0xF,
    ALL_BUT_REQUIRED = 0xE,
});

/// Accepted token kind for one attribute argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgTokenKind {
    Ident,
    Integer,
    Double,
    Str,
    Json,
}

#[derive(Debug, Clone)]
pub struct ArgDescriptor {
    pub name: &'static str,
    pub kind: ArgTokenKind,
}

/// Static, process-wide attribute descriptor (spec.md §3).
#[derive(Debug, Clone)]
pub struct AttrDescriptor {
    pub id: AttrId,
    pub name: &'static str,
    pub targets: TargetMask,
    pub field_kinds: FieldKindMask,
    pub repeats: RepeatMask,
    pub applies_to_decl: bool,
    pub applies_to_field: bool,
    pub allows_repetition: bool,
    pub is_constraint: bool,
    pub args: Vec<ArgDescriptor>,
}

/// One concrete argument value in a parsed attribute application.
#[derive(Debug, Clone)]
pub enum ArgValue {
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Ident(String),
    Json(String),
}

impl From<Literal> for ArgValue {
    fn from(lit: Literal) -> Self {
        match lit {
            Literal::Int(v, crate::token::Sign::Signed) => ArgValue::I64(v),
            Literal::Int(v, crate::token::Sign::Unsigned) => ArgValue::U64(v as u64),
            Literal::Double(d) => ArgValue::F64(d),
            Literal::String(s) => ArgValue::Str(s),
            Literal::Char(c) => ArgValue::Str(c.to_string()),
            Literal::Bool(b) => ArgValue::Ident(b.to_string()),
        }
    }
}

/// A parsed `@name(args...)` application (spec.md §3).
#[derive(Debug, Clone)]
pub struct AttrInstance {
    pub id: AttrId,
    /// For `IOPC_ATTR_GENERIC`: the fully qualified `namespace:localname`.
    pub generic_name: Option<String>,
    pub args: Vec<ArgValue>,
    pub loc: SourceLoc,
}

/// What the attribute is attached to, for the registry's target check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTarget {
    Struct,
    Union,
    Class,
    Enum,
    Interface,
    Rpc,
    SnmpIface,
    SnmpObj,
    SnmpTbl,
}

impl AttrTarget {
    fn mask(self) -> TargetMask {
        match self {
            AttrTarget::Struct => TargetMask::STRUCT,
            AttrTarget::Union => TargetMask::UNION,
            AttrTarget::Class => TargetMask::CLASS,
            AttrTarget::Enum => TargetMask::ENUM,
            AttrTarget::Interface => TargetMask::INTERFACE,
            AttrTarget::Rpc => TargetMask::RPC,
            AttrTarget::SnmpIface => TargetMask::SNMP_IFACE,
            AttrTarget::SnmpObj => TargetMask::SNMP_OBJ,
            AttrTarget::SnmpTbl => TargetMask::SNMP_TBL,
        }
    }
}

impl fmt::Display for AttrTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttrTarget::Struct => "struct",
            AttrTarget::Union => "union",
            AttrTarget::Class => "class",
            AttrTarget::Enum => "enum",
            AttrTarget::Interface => "interface",
            AttrTarget::Rpc => "rpc",
            AttrTarget::SnmpIface => "snmpIface",
            AttrTarget::SnmpObj => "snmpObj",
            AttrTarget::SnmpTbl => "snmpTbl",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_length_rejects_int_field() {
        let reg = AttrRegistry::new();
        let desc = reg.lookup("minLength").unwrap();
        assert!(!desc.field_kinds.contains(FieldKindMask::INT));
        assert!(desc.field_kinds.contains(FieldKindMask::STRING));
    }

    #[test]
    fn ctype_applies_to_struct_union_enum_only() {
        let reg = AttrRegistry::new();
        let desc = reg.lookup("ctype").unwrap();
        assert!(desc.targets.contains(TargetMask::STRUCT));
        assert!(desc.targets.contains(TargetMask::ENUM));
        assert!(!desc.targets.contains(TargetMask::INTERFACE));
    }
}
