//! Interface / RPC / Module AST nodes (spec.md §3).

use crate::attrs::AttrInstance;
use crate::loc::SourceLoc;

use super::composite::Composite;
use super::ids::{InterfaceId, TypeId};

/// Either an anonymous inline struct or a reference to a named one
/// (spec.md §3 "RPC (function)").
#[derive(Debug, Clone)]
pub enum Payload {
    Anonymous(Composite),
    Named { package_path: Vec<String>, name: String, resolved: Option<TypeId> },
    Void,
}

#[derive(Debug, Clone)]
pub struct Rpc {
    pub name: String,
    pub tag: u16,
    pub is_async: bool,
    pub args: Option<Payload>,
    pub result: Option<Payload>,
    pub exception: Option<Payload>,
    pub attrs: Vec<AttrInstance>,
    pub brief: Option<String>,
    pub details: Option<String>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub rpcs: Vec<Rpc>,
    pub attrs: Vec<AttrInstance>,
    pub brief: Option<String>,
    pub details: Option<String>,
    pub loc: SourceLoc,
}

impl Interface {
    pub fn new(name: impl Into<String>, loc: SourceLoc) -> Self {
        Self {
            name: name.into(),
            rpcs: Vec::new(),
            attrs: Vec::new(),
            brief: None,
            details: None,
            loc,
        }
    }
}

/// A named collection of interface fields (spec.md §3 "Module").
#[derive(Debug, Clone)]
pub struct ModuleField {
    pub name: String,
    pub tag: u16,
    pub package_path: Vec<String>,
    pub interface_name: String,
    pub resolved: Option<InterfaceId>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub fields: Vec<ModuleField>,
    pub attrs: Vec<AttrInstance>,
    pub brief: Option<String>,
    pub loc: SourceLoc,
}

impl Module {
    pub fn new(name: impl Into<String>, loc: SourceLoc) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            attrs: Vec::new(),
            brief: None,
            loc,
        }
    }
}
