//! Switch capability description carried by the features reply.

use bytes::{Buf, BufMut, BytesMut};

use crate::{CodecError, DatapathId, MacAddr};

/// Capability bits advertised in [`SwitchFeatures::capabilities`].
pub mod capabilities {
    pub const FLOW_STATS: u32 = 1 << 0;
    pub const TABLE_STATS: u32 = 1 << 1;
    pub const PORT_STATS: u32 = 1 << 2;
    pub const STP: u32 = 1 << 3;
    pub const IP_REASM: u32 = 1 << 5;
    pub const QUEUE_STATS: u32 = 1 << 6;
    pub const ARP_MATCH_IP: u32 = 1 << 7;
}

/// Wire size of one port description.
const PHY_PORT_LEN: usize = 48;

/// Wire size of the features-reply body before the port list.
const FEATURES_FIXED_LEN: usize = 24;

const PORT_NAME_LEN: usize = 16;

/// Description of one physical port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhyPort {
    pub port_no: u16,
    pub hw_addr: MacAddr,
    /// Human-readable interface name, null-trimmed from the wire.
    pub name: String,
    pub config: u32,
    /// Port state bitmask.
    pub state: u32,
    /// Current features bitmap.
    pub curr: u32,
    pub advertised: u32,
    pub supported: u32,
    pub peer: u32,
}

impl PhyPort {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < PHY_PORT_LEN {
            return Err(CodecError::Truncated("phy port"));
        }
        let port_no = buf.get_u16();
        let mut octets = [0u8; 6];
        buf.copy_to_slice(&mut octets);
        let mut name_bytes = [0u8; PORT_NAME_LEN];
        buf.copy_to_slice(&mut name_bytes);
        let end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PORT_NAME_LEN);
        let name = String::from_utf8_lossy(name_bytes.get(..end).unwrap_or_default()).into_owned();
        Ok(Self {
            port_no,
            hw_addr: MacAddr(octets),
            name,
            config: buf.get_u32(),
            state: buf.get_u32(),
            curr: buf.get_u32(),
            advertised: buf.get_u32(),
            supported: buf.get_u32(),
            peer: buf.get_u32(),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u16(self.port_no);
        dst.put_slice(&self.hw_addr.octets());
        let mut name_bytes = [0u8; PORT_NAME_LEN];
        for (slot, byte) in name_bytes.iter_mut().zip(self.name.as_bytes()) {
            *slot = *byte;
        }
        dst.put_slice(&name_bytes);
        dst.put_u32(self.config);
        dst.put_u32(self.state);
        dst.put_u32(self.curr);
        dst.put_u32(self.advertised);
        dst.put_u32(self.supported);
        dst.put_u32(self.peer);
    }
}

/// Features reply body: the switch's identity, capability bitmap and port
/// descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchFeatures {
    pub xid: u32,
    pub datapath_id: DatapathId,
    pub n_buffers: u32,
    pub n_tables: u8,
    pub capabilities: u32,
    pub actions: u32,
    pub ports: Vec<PhyPort>,
}

impl SwitchFeatures {
    pub(crate) fn decode(xid: u32, buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < FEATURES_FIXED_LEN {
            return Err(CodecError::Truncated("features reply"));
        }
        let datapath_id = DatapathId(buf.get_u64());
        let n_buffers = buf.get_u32();
        let n_tables = buf.get_u8();
        buf.advance(3);
        let capabilities = buf.get_u32();
        let actions = buf.get_u32();

        let mut ports = Vec::with_capacity(buf.remaining() / PHY_PORT_LEN);
        while buf.has_remaining() {
            ports.push(PhyPort::decode(buf)?);
        }
        Ok(Self {
            xid,
            datapath_id,
            n_buffers,
            n_tables,
            capabilities,
            actions,
            ports,
        })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u64(self.datapath_id.as_u64());
        dst.put_u32(self.n_buffers);
        dst.put_u8(self.n_tables);
        dst.put_bytes(0, 3);
        dst.put_u32(self.capabilities);
        dst.put_u32(self.actions);
        for port in &self.ports {
            port.encode(dst);
        }
    }
}
