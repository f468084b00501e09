//! Named fields of the standard extensions.
//!
//! Each [`Field`] locates one member inside an extension payload. They are
//! the usual building blocks for sequence entries.

use crate::catalog::*;

/// Location of one member within an extension payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Extension that carries the field.
    pub extension: u16,
    /// Byte offset within the extension payload.
    pub offset: u16,
    /// Field width in bytes.
    pub length: u16,
    /// Field name.
    pub name: &'static str,
}

impl Field {
    /// Creates a field descriptor.
    #[must_use]
    pub const fn new(extension: u16, offset: u16, length: u16, name: &'static str) -> Self {
        Self {
            extension,
            offset,
            length,
            name,
        }
    }
}

macro_rules! fields {
    ($($(#[$doc:meta])* $ident:ident = ($ext:expr, $off:expr, $len:expr, $name:literal);)*) => {
        $(
            $(#[$doc])*
            pub const $ident: Field = Field::new($ext, $off, $len, $name);
        )*

        /// Every named field, in extension order.
        pub const ALL: &[Field] = &[$($ident),*];
    };
}

fields! {
    /// First seen, relative msec.
    MSEC_REL_FIRST = (EX_MSEC_REL_TIME_FLOW, 0, 8, "msecRelFirst");
    /// Last seen, relative msec.
    MSEC_REL_LAST = (EX_MSEC_REL_TIME_FLOW, 8, 8, "msecRelLast");
    /// First seen, msec since epoch.
    MSEC_FIRST = (EX_MSEC_TIME_FLOW, 0, 8, "msecFirst");
    /// Last seen, msec since epoch.
    MSEC_LAST = (EX_MSEC_TIME_FLOW, 8, 8, "msecLast");
    /// Receive time, msec since epoch.
    MSEC_RECEIVED = (EX_MSEC_RECEIVED, 0, 8, "msecReceived");
    /// IPv4 source address.
    SRC4_ADDR = (EX_IPV4_FLOW, 0, 4, "src4Addr");
    /// IPv4 destination address.
    DST4_ADDR = (EX_IPV4_FLOW, 4, 4, "dst4Addr");
    /// IPv6 source address.
    SRC6_ADDR = (EX_IPV6_FLOW, 0, 16, "src6Addr");
    /// IPv6 destination address.
    DST6_ADDR = (EX_IPV6_FLOW, 16, 16, "dst6Addr");
    /// Source port.
    SRC_PORT = (EX_FLOW_MISC, 0, 2, "srcPort");
    /// Destination port.
    DST_PORT = (EX_FLOW_MISC, 2, 2, "dstPort");
    /// Cumulated TCP flags.
    TCP_FLAGS = (EX_FLOW_MISC, 4, 2, "tcpFlags");
    /// IP protocol.
    PROTO = (EX_FLOW_MISC, 6, 1, "proto");
    /// Flow direction.
    DIR = (EX_FLOW_MISC, 7, 1, "dir");
    /// Source TOS.
    SRC_TOS = (EX_FLOW_ADD, 0, 1, "srcTos");
    /// Destination TOS.
    DST_TOS = (EX_FLOW_ADD, 1, 1, "dstTos");
    /// Source prefix mask.
    SRC_MASK = (EX_FLOW_ADD, 2, 1, "srcMask");
    /// Destination prefix mask.
    DST_MASK = (EX_FLOW_ADD, 3, 1, "dstMask");
    /// Forwarding status.
    FWD_STATUS = (EX_FLOW_ADD, 4, 1, "fwdStatus");
    /// Aggregated flow count.
    FLOWS = (EX_CNT_FLOW, 0, 8, "flows");
    /// Input packets.
    IN_PACKETS = (EX_CNT_FLOW, 8, 8, "inPackets");
    /// Input bytes.
    IN_BYTES = (EX_CNT_FLOW, 16, 8, "inBytes");
    /// Output packets.
    OUT_PACKETS = (EX_CNT_FLOW, 24, 8, "outPackets");
    /// Output bytes.
    OUT_BYTES = (EX_CNT_FLOW, 32, 8, "outBytes");
    /// SNMP input interface.
    INPUT = (EX_SNMP_INTERFACE, 0, 4, "input");
    /// SNMP output interface.
    OUTPUT = (EX_SNMP_INTERFACE, 4, 4, "output");
    /// Source VLAN.
    SRC_VLAN = (EX_VLAN, 0, 4, "srcVlan");
    /// Destination VLAN.
    DST_VLAN = (EX_VLAN, 4, 4, "dstVlan");
    /// Source AS.
    SRC_AS = (EX_AS_ROUTING, 0, 4, "srcAS");
    /// Destination AS.
    DST_AS = (EX_AS_ROUTING, 4, 4, "dstAS");
    /// BGP next hop, IPv4.
    BGP4_NEXT_IP = (EX_BGP_NEXT_HOP_V4, 0, 4, "bgp4NextIP");
    /// BGP next hop, IPv6.
    BGP6_NEXT_IP = (EX_BGP_NEXT_HOP_V6, 0, 16, "bgp6NextIP");
    /// IP next hop, IPv4.
    NEXT4_HOP_IP = (EX_IP_NEXT_HOP_V4, 0, 4, "next4HopIP");
    /// IP next hop, IPv6.
    NEXT6_HOP_IP = (EX_IP_NEXT_HOP_V6, 0, 16, "next6HopIP");
    /// Exporter address, IPv4.
    RECEIVED4_IP = (EX_IP_RECEIVED_V4, 0, 4, "received4IP");
    /// Exporter address, IPv6.
    RECEIVED6_IP = (EX_IP_RECEIVED_V6, 0, 16, "received6IP");
    /// MPLS label 1.
    MPLS_LABEL_1 = (EX_MPLS_LABEL, 0, 4, "mplsLabel1");
    /// MPLS label 2.
    MPLS_LABEL_2 = (EX_MPLS_LABEL, 4, 4, "mplsLabel2");
    /// MPLS label 3.
    MPLS_LABEL_3 = (EX_MPLS_LABEL, 8, 4, "mplsLabel3");
    /// MPLS label 4.
    MPLS_LABEL_4 = (EX_MPLS_LABEL, 12, 4, "mplsLabel4");
    /// MPLS label 5.
    MPLS_LABEL_5 = (EX_MPLS_LABEL, 16, 4, "mplsLabel5");
    /// MPLS label 6.
    MPLS_LABEL_6 = (EX_MPLS_LABEL, 20, 4, "mplsLabel6");
    /// MPLS label 7.
    MPLS_LABEL_7 = (EX_MPLS_LABEL, 24, 4, "mplsLabel7");
    /// MPLS label 8.
    MPLS_LABEL_8 = (EX_MPLS_LABEL, 28, 4, "mplsLabel8");
    /// MPLS label 9.
    MPLS_LABEL_9 = (EX_MPLS_LABEL, 32, 4, "mplsLabel9");
    /// MPLS label 10.
    MPLS_LABEL_10 = (EX_MPLS_LABEL, 36, 4, "mplsLabel10");
    /// Input source MAC.
    IN_SRC_MAC = (EX_MAC_ADDR, 0, 8, "inSrcMac");
    /// Output destination MAC.
    OUT_DST_MAC = (EX_MAC_ADDR, 8, 8, "outDstMac");
    /// Input destination MAC.
    IN_DST_MAC = (EX_MAC_ADDR, 16, 8, "inDstMac");
    /// Output source MAC.
    OUT_SRC_MAC = (EX_MAC_ADDR, 24, 8, "outSrcMac");
    /// Next adjacent AS.
    NEXT_ADJACENT_AS = (EX_AS_ADJACENT, 0, 4, "nextAdjacentAS");
    /// Previous adjacent AS.
    PREV_ADJACENT_AS = (EX_AS_ADJACENT, 4, 4, "prevAdjacentAS");
    /// Client network delay, usec.
    USEC_CLIENT_NW_DELAY = (EX_LATENCY, 0, 8, "usecClientNwDelay");
    /// Server network delay, usec.
    USEC_SERVER_NW_DELAY = (EX_LATENCY, 8, 8, "usecServerNwDelay");
    /// Application latency, usec.
    USEC_APPL_LATENCY = (EX_LATENCY, 16, 8, "usecApplLatency");
    /// Sampler id assigned by the exporter.
    SAMPLER_ID = (EX_SAMPLER_INFO, 0, 4, "sampID");
    /// Sampling interval.
    SAMPLER_INTERVAL = (EX_SAMPLER_INFO, 4, 4, "sampInterval");
    /// Sampling mode.
    SAMPLER_MODE = (EX_SAMPLER_INFO, 8, 2, "sampMode");
    /// Internal exporter reference.
    SAMPLER_EXPORTER = (EX_SAMPLER_INFO, 10, 2, "sampExporter");
    /// NSEL event time, msec.
    MSEC_EVENT = (EX_NSEL_COMMON, 0, 8, "msecEvent");
    /// NSEL connection id.
    CONN_ID = (EX_NSEL_COMMON, 8, 4, "connID");
    /// NSEL extended firewall event.
    FW_XEVENT = (EX_NSEL_COMMON, 12, 2, "fwXevent");
    /// NSEL firewall event.
    FW_EVENT = (EX_NSEL_COMMON, 14, 1, "fwEvent");
    /// Translated IPv4 source.
    XLATE_SRC4_ADDR = (EX_NSEL_XLATE_IPV4, 0, 4, "xlateSrc4Addr");
    /// Translated IPv4 destination.
    XLATE_DST4_ADDR = (EX_NSEL_XLATE_IPV4, 4, 4, "xlateDst4Addr");
    /// Translated IPv6 source.
    XLATE_SRC6_ADDR = (EX_NSEL_XLATE_IPV6, 0, 8, "xlateSrc6Addr");
    /// Translated IPv6 destination.
    XLATE_DST6_ADDR = (EX_NSEL_XLATE_IPV6, 8, 8, "xlateDst6Addr");
    /// Translated source port.
    XLATE_SRC_PORT = (EX_NSEL_XLATE_PORT, 0, 2, "xlateSrcPort");
    /// Translated destination port.
    XLATE_DST_PORT = (EX_NSEL_XLATE_PORT, 2, 2, "xlateDstPort");
    /// Ingress ACL triple.
    INGRESS_ACL = (EX_NSEL_ACL, 0, 12, "ingressAcl");
    /// Egress ACL triple.
    EGRESS_ACL = (EX_NSEL_ACL, 12, 12, "egressAcl");
    /// NSEL user name.
    USERNAME = (EX_NSEL_USER, 0, 66, "username");
    /// NEL event time, msec.
    NEL_MSEC_EVENT = (EX_NEL_COMMON, 0, 8, "nelMsecEvent");
    /// Egress VRF.
    EGRESS_VRF = (EX_NEL_COMMON, 8, 4, "egressVrf");
    /// Ingress VRF.
    INGRESS_VRF = (EX_NEL_COMMON, 12, 4, "ingressVrf");
    /// NAT pool id.
    NAT_POOL_ID = (EX_NEL_COMMON, 16, 4, "natPoolID");
    /// NAT event.
    NAT_EVENT = (EX_NEL_COMMON, 20, 1, "natEvent");
    /// Port block start.
    NEL_BLOCK_START = (EX_NEL_XLATE_PORT, 0, 2, "nelblockStart");
    /// Port block end.
    NEL_BLOCK_END = (EX_NEL_XLATE_PORT, 2, 2, "nelblockEnd");
    /// Port block step.
    NEL_BLOCK_STEP = (EX_NEL_XLATE_PORT, 4, 2, "nelblockStep");
    /// Port block size.
    NEL_BLOCK_SIZE = (EX_NEL_XLATE_PORT, 6, 2, "nelblockSize");
}

/// Finds a field by name.
#[must_use]
pub fn lookup(name: &str) -> Option<Field> {
    ALL.iter().copied().find(|field| field.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_fits_its_extension() {
        let catalog = ExtensionCatalog::standard();
        for field in ALL {
            let def = catalog.get(field.extension).unwrap();
            assert!(
                field.offset + field.length <= def.size,
                "{} overruns {}",
                field.name,
                def.name
            );
        }
    }

    #[test]
    fn field_names_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            assert!(ALL[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(lookup("inBytes"), Some(IN_BYTES));
        assert_eq!(IN_BYTES.offset, 16);
        assert_eq!(lookup("dst4Addr").unwrap().offset, 4);
        assert!(lookup("noSuchField").is_none());
    }
}
