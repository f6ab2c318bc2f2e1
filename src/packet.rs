use crate::Address;
use crate::clock::SimTime;
use crate::error::DsprError;
use crate::interfaces::InterfaceHandle;

const ADDRESS_BYTES: u32 = 4;

/// Per-packet routing metadata carried as a header option: who originated
/// the packet, the sender/receiver of the current hop, and the composite
/// node-index + sequence identity used for end-to-end correlation. Written
/// at the origin, restamped at every hop, read out at the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct DsprInfo {
    pub sender_address: Option<Address>,
    pub current_sender_address: Option<Address>,
    pub current_receiver_address: Option<Address>,
    pub node_packet_id: f64,
    length: u32,
}

impl DsprInfo {
    pub fn new() -> Self {
        // type and length octets plus three carried addresses
        let length = 2 + 3 * ADDRESS_BYTES;
        Self {
            sender_address: None,
            current_sender_address: None,
            current_receiver_address: None,
            node_packet_id: 0.0,
            length,
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }
}

impl Default for DsprInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed set of options that can appear in a header's TLV area.
#[derive(Debug, Clone, PartialEq)]
pub enum TlvOption {
    Dspr(DsprInfo),
}

impl TlvOption {
    fn length(&self) -> u32 {
        match self {
            TlvOption::Dspr(info) => info.length(),
        }
    }
}

fn round_up(value: u32, multiple: u32) -> u32 {
    value.div_ceil(multiple) * multiple
}

/// Header family with options embedded in the fixed header itself; the
/// header length field grows with the option area, padded to 4 octets.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedHeader {
    pub source: Address,
    pub destination: Address,
    pub header_length: u32,
    pub options: Vec<TlvOption>,
}

impl FixedHeader {
    const BASE_LENGTH: u32 = 20;

    fn new(source: Address, destination: Address) -> Self {
        Self {
            source,
            destination,
            header_length: Self::BASE_LENGTH,
            options: Vec::new(),
        }
    }

    fn insert_option(&mut self, option: TlvOption) {
        self.options.push(option);
        let options_length: u32 = self.options.iter().map(TlvOption::length).sum();
        self.header_length = Self::BASE_LENGTH + round_up(options_length, 4);
    }
}

/// Header family carrying options in a hop-by-hop extension block appended
/// after the fixed part, padded to 8 octets.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionHeader {
    pub source: Address,
    pub destination: Address,
    pub extension_length: u32,
    pub options: Vec<TlvOption>,
}

impl ExtensionHeader {
    fn new(source: Address, destination: Address) -> Self {
        Self {
            source,
            destination,
            extension_length: 0,
            options: Vec::new(),
        }
    }

    fn insert_option(&mut self, option: TlvOption) {
        self.options.push(option);
        let options_length: u32 = self.options.iter().map(TlvOption::length).sum();
        self.extension_length = round_up(2 + options_length, 8);
    }
}

/// Header family with a generic TLV options block and no alignment rules.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsHeader {
    pub source: Address,
    pub destination: Address,
    pub options: Vec<TlvOption>,
}

impl OptionsHeader {
    fn new(source: Address, destination: Address) -> Self {
        Self {
            source,
            destination,
            options: Vec::new(),
        }
    }

    fn insert_option(&mut self, option: TlvOption) {
        self.options.push(option);
    }
}

/// The three supported network-header families. Routing metadata is attached
/// and located through one interface, dispatched on the runtime variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkHeader {
    Fixed(FixedHeader),
    Extension(ExtensionHeader),
    Options(OptionsHeader),
}

impl NetworkHeader {
    pub fn fixed(source: Address, destination: Address) -> Self {
        NetworkHeader::Fixed(FixedHeader::new(source, destination))
    }

    pub fn extension(source: Address, destination: Address) -> Self {
        NetworkHeader::Extension(ExtensionHeader::new(source, destination))
    }

    pub fn options(source: Address, destination: Address) -> Self {
        NetworkHeader::Options(OptionsHeader::new(source, destination))
    }

    pub fn source(&self) -> Address {
        match self {
            NetworkHeader::Fixed(h) => h.source,
            NetworkHeader::Extension(h) => h.source,
            NetworkHeader::Options(h) => h.source,
        }
    }

    pub fn destination(&self) -> Address {
        match self {
            NetworkHeader::Fixed(h) => h.destination,
            NetworkHeader::Extension(h) => h.destination,
            NetworkHeader::Options(h) => h.destination,
        }
    }

    pub fn attach_dspr_info(&mut self, info: DsprInfo) {
        let option = TlvOption::Dspr(info);
        match self {
            NetworkHeader::Fixed(h) => h.insert_option(option),
            NetworkHeader::Extension(h) => h.insert_option(option),
            NetworkHeader::Options(h) => h.insert_option(option),
        }
    }

    fn option_area(&self) -> &[TlvOption] {
        match self {
            NetworkHeader::Fixed(h) => &h.options,
            NetworkHeader::Extension(h) => &h.options,
            NetworkHeader::Options(h) => &h.options,
        }
    }

    fn option_area_mut(&mut self) -> &mut [TlvOption] {
        match self {
            NetworkHeader::Fixed(h) => &mut h.options,
            NetworkHeader::Extension(h) => &mut h.options,
            NetworkHeader::Options(h) => &mut h.options,
        }
    }

    /// Returns None when the packet carries no routing metadata.
    pub fn find_dspr_info(&self) -> Option<&DsprInfo> {
        self.option_area().iter().find_map(|option| match option {
            TlvOption::Dspr(info) => Some(info),
        })
    }

    pub fn find_dspr_info_mut(&mut self) -> Option<&mut DsprInfo> {
        self.option_area_mut()
            .iter_mut()
            .find_map(|option| match option {
                TlvOption::Dspr(info) => Some(info),
            })
    }

    /// Variant of the lookup for sites where the metadata must be present.
    pub fn get_dspr_info(&self) -> Result<&DsprInfo, DsprError> {
        self.find_dspr_info()
            .ok_or(DsprError::MissingRoutingMetadata)
    }
}

/// In-flight datagram as seen by the routing hooks: a network header, the
/// remaining hop budget, and the dispatch tags filled in by a forwarding
/// decision.
#[derive(Debug, Clone)]
pub struct Packet {
    pub header: NetworkHeader,
    pub hop_limit: u32,
    pub creation_time: Option<SimTime>,
    pub next_hop_tag: Option<Address>,
    pub interface_tag: Option<InterfaceHandle>,
}

impl Packet {
    pub fn new(header: NetworkHeader, hop_limit: u32, creation_time: Option<SimTime>) -> Self {
        Self {
            header,
            hop_limit,
            creation_time,
            next_hop_tag: None,
            interface_tag: None,
        }
    }

    pub fn source(&self) -> Address {
        self.header.source()
    }

    pub fn destination(&self) -> Address {
        self.header.destination()
    }
}
