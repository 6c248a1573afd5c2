//! SNMP interface AST node (spec.md §3 "Interface / SNMP-interface").

use crate::attrs::AttrInstance;
use crate::loc::SourceLoc;

use super::ids::SnmpInterfaceId;
use super::interface::Rpc;

#[derive(Debug, Clone)]
pub enum SnmpParent {
    Pending { package_path: Vec<String>, name: String },
    Resolved(SnmpInterfaceId),
}

#[derive(Debug, Clone)]
pub struct SnmpInterface {
    pub name: String,
    /// Mandatory for SNMP interfaces (spec.md §3).
    pub parent: SnmpParent,
    pub oid: Option<u32>,
    pub rpcs: Vec<Rpc>,
    pub attrs: Vec<AttrInstance>,
    pub brief: Option<String>,
    pub details: Option<String>,
    pub loc: SourceLoc,
}
