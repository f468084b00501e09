//! Extension catalog.
//!
//! Maps an extension-type id to its declared payload size and name. The
//! standard table is built once per process and never mutated; callers that
//! need private extension types derive their own catalog through
//! [`ExtensionCatalog::builder`].

use std::fmt;
use std::sync::OnceLock;

use crate::error::{FormatError, FormatResult};

/// Sentinel size marking a variable-length extension.
pub const VARLENGTH: u16 = 0xFFFF;

/// Reserved "null" extension id.
pub const EX_NULL: u16 = 0;

/// Number of ids in the standard table (ids `0..MAX_ELEMENTS`).
pub const MAX_ELEMENTS: usize = 31;

/// Relative flow start/end in milliseconds.
pub const EX_MSEC_REL_TIME_FLOW: u16 = 1;
/// Absolute flow start/end in milliseconds.
pub const EX_MSEC_TIME_FLOW: u16 = 2;
/// Time the flow was received by the collector.
pub const EX_MSEC_RECEIVED: u16 = 3;
/// IPv4 source/destination addresses.
pub const EX_IPV4_FLOW: u16 = 4;
/// IPv6 source/destination addresses.
pub const EX_IPV6_FLOW: u16 = 5;
/// Ports, TCP flags, protocol, direction.
pub const EX_FLOW_MISC: u16 = 6;
/// TOS, masks, forwarding status.
pub const EX_FLOW_ADD: u16 = 7;
/// Flow, packet and byte counters.
pub const EX_CNT_FLOW: u16 = 8;
/// SNMP input/output interface.
pub const EX_SNMP_INTERFACE: u16 = 9;
/// Source/destination VLAN.
pub const EX_VLAN: u16 = 10;
/// Source/destination AS.
pub const EX_AS_ROUTING: u16 = 11;
/// BGP next hop, IPv4.
pub const EX_BGP_NEXT_HOP_V4: u16 = 12;
/// BGP next hop, IPv6.
pub const EX_BGP_NEXT_HOP_V6: u16 = 13;
/// IP next hop, IPv4.
pub const EX_IP_NEXT_HOP_V4: u16 = 14;
/// IP next hop, IPv6.
pub const EX_IP_NEXT_HOP_V6: u16 = 15;
/// Exporter address the flow was received from, IPv4.
pub const EX_IP_RECEIVED_V4: u16 = 16;
/// Exporter address the flow was received from, IPv6.
pub const EX_IP_RECEIVED_V6: u16 = 17;
/// MPLS label stack (10 labels).
pub const EX_MPLS_LABEL: u16 = 18;
/// In/out source/destination MAC addresses.
pub const EX_MAC_ADDR: u16 = 19;
/// Next/previous adjacent AS.
pub const EX_AS_ADJACENT: u16 = 20;
/// Client/server network delay and application latency.
pub const EX_LATENCY: u16 = 21;
/// Sampler information.
pub const EX_SAMPLER_INFO: u16 = 22;
/// NSEL common event fields.
pub const EX_NSEL_COMMON: u16 = 23;
/// NSEL IPv4 address translation.
pub const EX_NSEL_XLATE_IPV4: u16 = 24;
/// NSEL IPv6 address translation.
pub const EX_NSEL_XLATE_IPV6: u16 = 25;
/// NSEL port translation.
pub const EX_NSEL_XLATE_PORT: u16 = 26;
/// NSEL ingress/egress ACLs.
pub const EX_NSEL_ACL: u16 = 27;
/// NSEL user name.
pub const EX_NSEL_USER: u16 = 28;
/// NEL common event fields.
pub const EX_NEL_COMMON: u16 = 29;
/// NEL port block translation.
pub const EX_NEL_XLATE_PORT: u16 = 30;

/// Declared shape of one extension type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDef {
    /// Extension-type id.
    pub id: u16,
    /// Payload size in bytes, or [`VARLENGTH`].
    pub size: u16,
    /// Human-readable name.
    pub name: &'static str,
}

impl ExtensionDef {
    /// Creates a new definition.
    #[must_use]
    pub const fn new(id: u16, size: u16, name: &'static str) -> Self {
        Self { id, size, name }
    }

    /// Returns true if instances carry their own length.
    #[must_use]
    pub const fn is_var_length(&self) -> bool {
        self.size == VARLENGTH
    }

    /// Returns the fixed payload size, or `None` for variable-length types.
    #[must_use]
    pub const fn fixed_size(&self) -> Option<usize> {
        if self.is_var_length() {
            None
        } else {
            Some(self.size as usize)
        }
    }
}

impl fmt::Display for ExtensionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_var_length() {
            write!(f, "{}({}, var)", self.name, self.id)
        } else {
            write!(f, "{}({}, {}B)", self.name, self.id, self.size)
        }
    }
}

/// The standard V3 extension table, indexed by id.
pub const STANDARD_EXTENSIONS: [ExtensionDef; MAX_ELEMENTS] = [
    ExtensionDef::new(EX_NULL, 0, "ExNull"),
    ExtensionDef::new(EX_MSEC_REL_TIME_FLOW, 16, "EXmsecRelTimeFlow"),
    ExtensionDef::new(EX_MSEC_TIME_FLOW, 16, "EXmsecTimeFlow"),
    ExtensionDef::new(EX_MSEC_RECEIVED, 8, "EXmsecReceived"),
    ExtensionDef::new(EX_IPV4_FLOW, 8, "EXipv4Flow"),
    ExtensionDef::new(EX_IPV6_FLOW, 32, "EXipv6Flow"),
    ExtensionDef::new(EX_FLOW_MISC, 8, "EXflowMisc"),
    ExtensionDef::new(EX_FLOW_ADD, 6, "EXflowAdd"),
    ExtensionDef::new(EX_CNT_FLOW, 40, "EXcntFlow"),
    ExtensionDef::new(EX_SNMP_INTERFACE, 8, "EXsnmpInterface"),
    ExtensionDef::new(EX_VLAN, 8, "EXvLan"),
    ExtensionDef::new(EX_AS_ROUTING, 8, "EXasRouting"),
    ExtensionDef::new(EX_BGP_NEXT_HOP_V4, 4, "EXbgpNextHopV4"),
    ExtensionDef::new(EX_BGP_NEXT_HOP_V6, 16, "EXbgpNextHopV6"),
    ExtensionDef::new(EX_IP_NEXT_HOP_V4, 4, "EXipNextHopV4"),
    ExtensionDef::new(EX_IP_NEXT_HOP_V6, 16, "EXipNextHopV6"),
    ExtensionDef::new(EX_IP_RECEIVED_V4, 4, "EXipReceivedV4"),
    ExtensionDef::new(EX_IP_RECEIVED_V6, 16, "EXipReceivedV6"),
    ExtensionDef::new(EX_MPLS_LABEL, 40, "EXmplsLabel"),
    ExtensionDef::new(EX_MAC_ADDR, 32, "EXmacAddr"),
    ExtensionDef::new(EX_AS_ADJACENT, 8, "EXasAdjacent"),
    ExtensionDef::new(EX_LATENCY, 24, "EXlatency"),
    ExtensionDef::new(EX_SAMPLER_INFO, 12, "EXsamplerInfo"),
    ExtensionDef::new(EX_NSEL_COMMON, 16, "EXnselCommon"),
    ExtensionDef::new(EX_NSEL_XLATE_IPV4, 8, "EXnselXlateIPv4"),
    ExtensionDef::new(EX_NSEL_XLATE_IPV6, 16, "EXnselXlateIPv6"),
    ExtensionDef::new(EX_NSEL_XLATE_PORT, 4, "EXnselXlatePort"),
    ExtensionDef::new(EX_NSEL_ACL, 24, "EXnselAcl"),
    ExtensionDef::new(EX_NSEL_USER, 66, "EXnselUser"),
    ExtensionDef::new(EX_NEL_COMMON, 24, "EXnelCommon"),
    ExtensionDef::new(EX_NEL_XLATE_PORT, 8, "EXnelXlatePort"),
];

/// Lookup table from extension id to definition.
///
/// The table is dense: slot `i` holds the definition for id `i` if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionCatalog {
    slots: Vec<Option<ExtensionDef>>,
}

impl ExtensionCatalog {
    /// Returns the shared standard catalog.
    pub fn standard() -> &'static ExtensionCatalog {
        static STANDARD: OnceLock<ExtensionCatalog> = OnceLock::new();
        STANDARD.get_or_init(|| ExtensionCatalog {
            slots: STANDARD_EXTENSIONS.iter().copied().map(Some).collect(),
        })
    }

    /// Starts a catalog derived from the standard table.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder {
            catalog: Self::standard().clone(),
        }
    }

    /// Looks up an extension definition.
    ///
    /// Unknown ids return `None`; callers skip them rather than fail.
    #[inline]
    #[must_use]
    pub fn get(&self, id: u16) -> Option<&ExtensionDef> {
        self.slots.get(usize::from(id)).and_then(Option::as_ref)
    }

    /// Returns true if the id is known.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: u16) -> bool {
        self.get(id).is_some()
    }

    /// Returns the name of an extension, or `"unknown"`.
    #[must_use]
    pub fn name(&self, id: u16) -> &'static str {
        self.get(id).map_or("unknown", |def| def.name)
    }

    /// Returns the highest known id.
    #[must_use]
    pub fn max_id(&self) -> u16 {
        // slots is never empty: ExNull is always present
        (self.slots.len() - 1) as u16
    }

    /// Returns the number of known extension types, including `ExNull`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over known definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionDef> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

/// Builder for catalogs carrying caller-defined extension types.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    catalog: ExtensionCatalog,
}

impl CatalogBuilder {
    /// Registers a caller-defined extension.
    ///
    /// # Errors
    ///
    /// Fails for the reserved ids `0` and `0xFFFF`, and for ids that are
    /// already defined.
    pub fn extension(mut self, def: ExtensionDef) -> FormatResult<Self> {
        if def.id == EX_NULL || def.id == VARLENGTH {
            return Err(FormatError::invalid_catalog(format!(
                "extension id {} is reserved",
                def.id
            )));
        }
        if self.catalog.contains(def.id) {
            return Err(FormatError::invalid_catalog(format!(
                "extension id {} already defined as {}",
                def.id,
                self.catalog.name(def.id)
            )));
        }

        let index = usize::from(def.id);
        if self.catalog.slots.len() <= index {
            self.catalog.slots.resize(index + 1, None);
        }
        self.catalog.slots[index] = Some(def);
        Ok(self)
    }

    /// Finishes the catalog.
    #[must_use]
    pub fn build(self) -> ExtensionCatalog {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_indexed_by_id() {
        for (index, def) in STANDARD_EXTENSIONS.iter().enumerate() {
            assert_eq!(usize::from(def.id), index);
        }
    }

    #[test]
    fn standard_lookup() {
        let catalog = ExtensionCatalog::standard();
        let ipv4 = catalog.get(EX_IPV4_FLOW).unwrap();
        assert_eq!(ipv4.size, 8);
        assert_eq!(ipv4.name, "EXipv4Flow");
        assert_eq!(catalog.get(EX_CNT_FLOW).unwrap().fixed_size(), Some(40));
        assert_eq!(catalog.max_id(), 30);
        assert_eq!(catalog.len(), MAX_ELEMENTS);
    }

    #[test]
    fn unknown_id_is_none() {
        let catalog = ExtensionCatalog::standard();
        assert!(catalog.get(31).is_none());
        assert!(catalog.get(VARLENGTH).is_none());
        assert_eq!(catalog.name(500), "unknown");
    }

    #[test]
    fn builder_adds_caller_defined_types() {
        let catalog = ExtensionCatalog::builder()
            .extension(ExtensionDef::new(40, VARLENGTH, "EXpayload"))
            .unwrap()
            .build();

        assert!(catalog.get(40).unwrap().is_var_length());
        assert!(catalog.get(35).is_none());
        assert_eq!(catalog.max_id(), 40);
        assert_eq!(catalog.len(), MAX_ELEMENTS + 1);
        // The shared table is unaffected.
        assert!(ExtensionCatalog::standard().get(40).is_none());
    }

    #[test]
    fn builder_rejects_reserved_and_duplicate_ids() {
        let reserved = ExtensionCatalog::builder().extension(ExtensionDef::new(0, 4, "x"));
        assert!(matches!(reserved, Err(FormatError::InvalidCatalog { .. })));

        let sentinel = ExtensionCatalog::builder().extension(ExtensionDef::new(VARLENGTH, 4, "x"));
        assert!(matches!(sentinel, Err(FormatError::InvalidCatalog { .. })));

        let duplicate =
            ExtensionCatalog::builder().extension(ExtensionDef::new(EX_IPV4_FLOW, 8, "x"));
        assert!(matches!(duplicate, Err(FormatError::InvalidCatalog { .. })));
    }

    #[test]
    fn display_definition() {
        assert_eq!(
            STANDARD_EXTENSIONS[4].to_string(),
            "EXipv4Flow(4, 8B)".to_string()
        );
        assert_eq!(
            ExtensionDef::new(40, VARLENGTH, "EXpayload").to_string(),
            "EXpayload(40, var)"
        );
    }
}
