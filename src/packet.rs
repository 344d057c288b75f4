use byteorder::{ByteOrder, NetworkEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Cursor, Read};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::{PacketError, Result};

pub const HEADER_SIZE: usize = 12;
/// Largest UDP payload; replies from nonstandard resolvers may exceed 512 bytes.
pub const MAX_PACKET_SIZE: usize = 65_535;

const RCODE_MASK: u8 = 0x0F;
const PTR_MASK: u8 = 0xC0;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const MAX_POINTER_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packet {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
}

impl Packet {
    /// Encodes the whole message. Section counts in the header are taken
    /// from the section vectors, whatever the stored header says.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let header = Header {
            qdcount: section_count(self.questions.len())?,
            ancount: section_count(self.answers.len())?,
            nscount: section_count(self.authorities.len())?,
            arcount: section_count(self.additionals.len())?,
            ..self.header.clone()
        };

        let mut contents = header.serialize()?;
        for q in self.questions.iter() {
            q.write(&mut contents)?;
        }
        for r in self
            .answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
        {
            r.write(&mut contents)?;
        }

        Ok(contents)
    }

    pub fn parse(bytes: &[u8]) -> Result<Packet> {
        let header = Header::parse(bytes)?;
        let mut index = HEADER_SIZE;

        let mut questions = Vec::with_capacity(header.qdcount as usize);
        for _ in 0..header.qdcount {
            let (q, next) = Question::parse(bytes, index)?;
            questions.push(q);
            index = next;
        }
        let answers = Record::parse_section(bytes, &mut index, header.ancount)?;
        let authorities = Record::parse_section(bytes, &mut index, header.nscount)?;
        let additionals = Record::parse_section(bytes, &mut index, header.arcount)?;

        Ok(Packet {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

fn section_count(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| PacketError::TooManyRecords(len))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub rcode: RCode,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.write_u16::<NetworkEndian>(self.id)?;

        let mut control: [u8; 2] = [0; 2];
        if self.qr {
            control[0] |= 1 << 7;
        }
        control[0] |= (u8::from(self.opcode) & 0x0F) << 3;
        if self.aa {
            control[0] |= 1 << 2;
        }
        if self.tc {
            control[0] |= 1 << 1;
        }
        if self.rd {
            control[0] |= 1;
        }
        if self.ra {
            control[1] |= 1 << 7;
        }
        control[1] |= u8::from(self.rcode) & RCODE_MASK;
        header.extend_from_slice(&control);

        header.write_u16::<NetworkEndian>(self.qdcount)?;
        header.write_u16::<NetworkEndian>(self.ancount)?;
        header.write_u16::<NetworkEndian>(self.nscount)?;
        header.write_u16::<NetworkEndian>(self.arcount)?;

        Ok(header)
    }

    pub fn parse(bytes: &[u8]) -> Result<Header> {
        let mut rdr = Cursor::new(bytes);
        let id = rdr.read_u16::<NetworkEndian>()?;
        let mut control: [u8; 2] = [0; 2];
        rdr.read_exact(&mut control)?;
        let qdcount = rdr.read_u16::<NetworkEndian>()?;
        let ancount = rdr.read_u16::<NetworkEndian>()?;
        let nscount = rdr.read_u16::<NetworkEndian>()?;
        let arcount = rdr.read_u16::<NetworkEndian>()?;

        Ok(Header {
            id,
            qr: control[0] & 0x80 != 0,
            opcode: Opcode::from((control[0] >> 3) & 0x0F),
            aa: control[0] & 0x04 != 0,
            tc: control[0] & 0x02 != 0,
            rd: control[0] & 0x01 != 0,
            ra: control[1] & 0x80 != 0,
            rcode: RCode::from(control[1] & RCODE_MASK),
            qdcount,
            ancount,
            nscount,
            arcount,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Opcode {
    #[default]
    Query,
    IQuery,
    Status,
    Notify,
    Update,
    Unknown(u8),
}

impl From<u8> for Opcode {
    fn from(o: u8) -> Opcode {
        match o {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            o => Opcode::Unknown(o),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(o: Opcode) -> u8 {
        match o {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Unknown(o) => o,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RCode {
    #[default]
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Unknown(u8),
}

impl From<u8> for RCode {
    fn from(i: u8) -> Self {
        match i {
            0 => RCode::NoError,
            1 => RCode::FormatError,
            2 => RCode::ServerFailure,
            3 => RCode::NameError,
            4 => RCode::NotImplemented,
            5 => RCode::Refused,
            i => RCode::Unknown(i),
        }
    }
}

impl From<RCode> for u8 {
    fn from(r: RCode) -> u8 {
        match r {
            RCode::NoError => 0,
            RCode::FormatError => 1,
            RCode::ServerFailure => 2,
            RCode::NameError => 3,
            RCode::NotImplemented => 4,
            RCode::Refused => 5,
            RCode::Unknown(i) => i,
        }
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RCode::NoError => write!(f, "NOERROR"),
            RCode::FormatError => write!(f, "FORMERR"),
            RCode::ServerFailure => write!(f, "SERVFAIL"),
            RCode::NameError => write!(f, "NXDOMAIN"),
            RCode::NotImplemented => write!(f, "NOTIMP"),
            RCode::Refused => write!(f, "REFUSED"),
            RCode::Unknown(i) => write!(f, "RCODE{}", i),
        }
    }
}

/// Record type, shared by questions and resource records.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    OPT,
    ANY,
    Unknown(u16),
}

impl From<u16> for QType {
    fn from(i: u16) -> QType {
        match i {
            1 => QType::A,
            2 => QType::NS,
            5 => QType::CNAME,
            6 => QType::SOA,
            12 => QType::PTR,
            15 => QType::MX,
            16 => QType::TXT,
            28 => QType::AAAA,
            33 => QType::SRV,
            41 => QType::OPT,
            255 => QType::ANY,
            i => QType::Unknown(i),
        }
    }
}

impl From<QType> for u16 {
    fn from(t: QType) -> u16 {
        match t {
            QType::A => 1,
            QType::NS => 2,
            QType::CNAME => 5,
            QType::SOA => 6,
            QType::PTR => 12,
            QType::MX => 15,
            QType::TXT => 16,
            QType::AAAA => 28,
            QType::SRV => 33,
            QType::OPT => 41,
            QType::ANY => 255,
            QType::Unknown(i) => i,
        }
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QType::Unknown(i) => write!(f, "TYPE{}", i),
            known => write!(f, "{:?}", known),
        }
    }
}

impl FromStr for QType {
    type Err = PacketError;

    fn from_str(s: &str) -> Result<QType> {
        let upper = s.to_ascii_uppercase();
        let t = match upper.as_str() {
            "A" => QType::A,
            "NS" => QType::NS,
            "CNAME" => QType::CNAME,
            "SOA" => QType::SOA,
            "PTR" => QType::PTR,
            "MX" => QType::MX,
            "TXT" => QType::TXT,
            "AAAA" => QType::AAAA,
            "SRV" => QType::SRV,
            "OPT" => QType::OPT,
            "ANY" => QType::ANY,
            other => other
                .strip_prefix("TYPE")
                .and_then(|n| n.parse::<u16>().ok())
                .map(QType::from)
                .ok_or_else(|| PacketError::UnknownType(s.to_string()))?,
        };
        Ok(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QClass {
    Internet,
    Csnet,
    Chaos,
    Hesiod,
    Any,
    Unknown(u16),
}

impl From<u16> for QClass {
    fn from(i: u16) -> QClass {
        match i {
            1 => QClass::Internet,
            2 => QClass::Csnet,
            3 => QClass::Chaos,
            4 => QClass::Hesiod,
            255 => QClass::Any,
            i => QClass::Unknown(i),
        }
    }
}

impl From<QClass> for u16 {
    fn from(c: QClass) -> u16 {
        match c {
            QClass::Internet => 1,
            QClass::Csnet => 2,
            QClass::Chaos => 3,
            QClass::Hesiod => 4,
            QClass::Any => 255,
            QClass::Unknown(i) => i,
        }
    }
}

impl fmt::Display for QClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QClass::Internet => write!(f, "IN"),
            QClass::Csnet => write!(f, "CS"),
            QClass::Chaos => write!(f, "CH"),
            QClass::Hesiod => write!(f, "HS"),
            QClass::Any => write!(f, "ANY"),
            QClass::Unknown(i) => write!(f, "CLASS{}", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: QType,
    pub qclass: QClass,
}

impl Question {
    /// An A/IN question for `name`.
    pub fn new(name: impl Into<String>) -> Question {
        Question {
            name: name.into(),
            qtype: QType::A,
            qclass: QClass::Internet,
        }
    }

    fn write(&self, contents: &mut Vec<u8>) -> Result<()> {
        write_name(contents, &self.name)?;
        contents.write_u16::<NetworkEndian>(self.qtype.into())?;
        contents.write_u16::<NetworkEndian>(self.qclass.into())?;
        Ok(())
    }

    /// Parses the question at `offset`, returning it with the offset just past it.
    pub fn parse(msg: &[u8], offset: usize) -> Result<(Question, usize)> {
        let (name, i) = read_name(msg, offset)?;
        let mut rdr = Cursor::new(msg.get(i..).ok_or(PacketError::UnexpectedEof)?);
        let qtype = QType::from(rdr.read_u16::<NetworkEndian>()?);
        let qclass = QClass::from(rdr.read_u16::<NetworkEndian>()?);

        Ok((Question { name, qtype, qclass }, i + 4))
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", Fqdn(&self.name), self.qclass, self.qtype)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub rtype: QType,
    pub class: QClass,
    pub ttl: u32,
    pub data: RData,
}

impl Record {
    fn write(&self, contents: &mut Vec<u8>) -> Result<()> {
        write_name(contents, &self.name)?;
        contents.write_u16::<NetworkEndian>(self.rtype.into())?;
        contents.write_u16::<NetworkEndian>(self.class.into())?;
        contents.write_u32::<NetworkEndian>(self.ttl)?;

        // rdlength is patched once the data has been written
        let len_at = contents.len();
        contents.write_u16::<NetworkEndian>(0)?;
        self.data.write(contents)?;
        let rdlength = u16::try_from(contents.len() - len_at - 2)
            .map_err(|_| PacketError::MalformedField("rdata length"))?;
        NetworkEndian::write_u16(&mut contents[len_at..len_at + 2], rdlength);
        Ok(())
    }

    /// Parses the record at `offset`, returning it with the offset just past it.
    pub fn parse(msg: &[u8], offset: usize) -> Result<(Record, usize)> {
        let (name, i) = read_name(msg, offset)?;
        let mut rdr = Cursor::new(msg.get(i..).ok_or(PacketError::UnexpectedEof)?);
        let rtype = QType::from(rdr.read_u16::<NetworkEndian>()?);
        let class = QClass::from(rdr.read_u16::<NetworkEndian>()?);
        let ttl = rdr.read_u32::<NetworkEndian>()?;
        let rdlength = rdr.read_u16::<NetworkEndian>()? as usize;

        let start = i + 10;
        let end = start + rdlength;
        if end > msg.len() {
            return Err(PacketError::UnexpectedEof);
        }
        let data = RData::parse(rtype, msg, start, end)?;

        Ok((
            Record {
                name,
                rtype,
                class,
                ttl,
                data,
            },
            end,
        ))
    }

    fn parse_section(msg: &[u8], index: &mut usize, count: u16) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (r, next) = Record::parse(msg, *index)?;
            records.push(r);
            *index = next;
        }
        Ok(records)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            Fqdn(&self.name),
            self.ttl,
            self.class,
            self.rtype,
            self.data
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    /// NS, CNAME and PTR targets.
    Name(String),
    Mx { preference: u16, exchange: String },
    Txt(Vec<String>),
    Raw(Vec<u8>),
}

impl RData {
    fn parse(rtype: QType, msg: &[u8], start: usize, end: usize) -> Result<RData> {
        let raw = &msg[start..end];
        let data = match rtype {
            QType::A => {
                let octets = <[u8; 4]>::try_from(raw)
                    .map_err(|_| PacketError::MalformedField("A rdata"))?;
                RData::A(Ipv4Addr::from(octets))
            }
            QType::AAAA => {
                let octets = <[u8; 16]>::try_from(raw)
                    .map_err(|_| PacketError::MalformedField("AAAA rdata"))?;
                RData::AAAA(Ipv6Addr::from(octets))
            }
            QType::NS | QType::CNAME | QType::PTR => {
                let (name, next) = read_name(msg, start)?;
                if next != end {
                    return Err(PacketError::MalformedField("name rdata"));
                }
                RData::Name(name)
            }
            QType::MX => {
                if raw.len() < 3 {
                    return Err(PacketError::MalformedField("MX rdata"));
                }
                let preference = NetworkEndian::read_u16(raw);
                let (exchange, next) = read_name(msg, start + 2)?;
                if next != end {
                    return Err(PacketError::MalformedField("MX rdata"));
                }
                RData::Mx {
                    preference,
                    exchange,
                }
            }
            QType::TXT => {
                let mut strings = Vec::new();
                let mut rest = raw;
                while let Some((&len, tail)) = rest.split_first() {
                    let len = len as usize;
                    if len > tail.len() {
                        return Err(PacketError::MalformedField("TXT rdata"));
                    }
                    strings.push(String::from_utf8_lossy(&tail[..len]).into_owned());
                    rest = &tail[len..];
                }
                RData::Txt(strings)
            }
            _ => RData::Raw(raw.to_vec()),
        };
        Ok(data)
    }

    fn write(&self, contents: &mut Vec<u8>) -> Result<()> {
        match self {
            RData::A(ip) => contents.extend_from_slice(&ip.octets()),
            RData::AAAA(ip) => contents.extend_from_slice(&ip.octets()),
            RData::Name(name) => write_name(contents, name)?,
            RData::Mx {
                preference,
                exchange,
            } => {
                contents.write_u16::<NetworkEndian>(*preference)?;
                write_name(contents, exchange)?;
            }
            RData::Txt(strings) => {
                for s in strings {
                    let len = u8::try_from(s.len())
                        .map_err(|_| PacketError::MalformedField("TXT string"))?;
                    contents.push(len);
                    contents.extend_from_slice(s.as_bytes());
                }
            }
            RData::Raw(bytes) => contents.extend_from_slice(bytes),
        }
        Ok(())
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(ip) => write!(f, "{}", ip),
            RData::AAAA(ip) => write!(f, "{}", ip),
            RData::Name(name) => write!(f, "{}", Fqdn(name)),
            RData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, Fqdn(exchange)),
            RData::Txt(strings) => {
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:?}", s)?;
                }
                Ok(())
            }
            RData::Raw(bytes) => {
                write!(f, "\\# {}", bytes.len())?;
                if !bytes.is_empty() {
                    write!(f, " ")?;
                }
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// Renders a name with exactly one trailing dot.
struct Fqdn<'a>(&'a str);

impl fmt::Display for Fqdn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.strip_suffix('.').unwrap_or(self.0);
        write!(f, "{}.", name)
    }
}

fn write_name(contents: &mut Vec<u8>, name: &str) -> Result<()> {
    let start = contents.len();
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(PacketError::EmptyLabel(name.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(PacketError::LabelTooLong(label.to_string()));
            }
            contents.push(label.len() as u8);
            contents.extend_from_slice(label.as_bytes());
        }
    }
    contents.push(0); // Null terminate name

    if contents.len() - start > MAX_NAME_LEN {
        return Err(PacketError::NameTooLong(name.to_string()));
    }
    Ok(())
}

/// Reads a possibly compressed name starting at `offset`. The returned
/// offset is just past the name as it appears at `offset`, i.e. after the
/// first pointer if there was one.
fn read_name(msg: &[u8], offset: usize) -> Result<(String, usize)> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = offset;
    let mut resume = None;
    let mut jumps = 0;
    let mut wire_len = 1;

    loop {
        let len = *msg.get(pos).ok_or(PacketError::UnexpectedEof)?;

        if len & PTR_MASK == PTR_MASK {
            let low = *msg.get(pos + 1).ok_or(PacketError::UnexpectedEof)?;
            let target = (((len & !PTR_MASK) as usize) << 8) | low as usize;
            // pointers only ever point backwards, which also rules out loops
            if target >= pos {
                return Err(PacketError::InvalidCompressionPointer(target));
            }
            jumps += 1;
            if jumps > MAX_POINTER_DEPTH {
                return Err(PacketError::CompressionTooDeep);
            }
            resume.get_or_insert(pos + 2);
            pos = target;
            continue;
        }
        if len & PTR_MASK != 0 {
            return Err(PacketError::MalformedField("label type"));
        }
        if len == 0 {
            pos += 1;
            break;
        }

        let label_start = pos + 1;
        let label_end = label_start + len as usize;
        let label = msg
            .get(label_start..label_end)
            .ok_or(PacketError::UnexpectedEof)?;
        wire_len += len as usize + 1;
        if wire_len > MAX_NAME_LEN {
            return Err(PacketError::NameTooLong(labels.join(".")));
        }
        labels.push(String::from_utf8_lossy(label).into_owned());
        pos = label_end;
    }

    Ok((labels.join("."), resume.unwrap_or(pos)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_record(name: &str, ip: [u8; 4]) -> Record {
        Record {
            name: name.to_string(),
            rtype: QType::A,
            class: QClass::Internet,
            ttl: 60,
            data: RData::A(Ipv4Addr::from(ip)),
        }
    }

    #[test]
    fn header_flags_land_on_the_right_bits() {
        let header = Header {
            id: 0x1337,
            rd: true,
            ..Header::default()
        };
        assert_eq!(
            header.serialize().unwrap(),
            vec![0x13, 0x37, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );

        let reply = Header {
            id: 0x1337,
            qr: true,
            aa: true,
            rd: true,
            ra: true,
            rcode: RCode::NameError,
            ..Header::default()
        };
        let bytes = reply.serialize().unwrap();
        assert_eq!(&bytes[2..4], &[0x85, 0x83]);
        assert_eq!(Header::parse(&bytes).unwrap(), reply);
    }

    #[test]
    fn question_encodes_labels_type_and_class() {
        let packet = Packet {
            questions: vec![Question::new("google.com")],
            ..Packet::default()
        };
        let bytes = packet.serialize().unwrap();
        assert_eq!(&bytes[4..6], &[0, 1]);
        assert_eq!(
            &bytes[HEADER_SIZE..],
            b"\x06google\x03com\x00\x00\x01\x00\x01"
        );
    }

    #[test]
    fn counts_follow_sections() {
        let packet = Packet {
            header: Header {
                qdcount: 9,
                ancount: 9,
                ..Header::default()
            },
            questions: vec![Question::new("a.example"), Question::new("b.example")],
            answers: vec![a_record("a.example", [10, 0, 0, 1])],
            ..Packet::default()
        };
        let parsed = Packet::parse(&packet.serialize().unwrap()).unwrap();
        assert_eq!(parsed.header.qdcount, 2);
        assert_eq!(parsed.header.ancount, 1);
        assert_eq!(parsed.questions, packet.questions);
        assert_eq!(parsed.answers, packet.answers);
    }

    #[test]
    fn trailing_dot_and_root_names() {
        let mut buf = Vec::new();
        write_name(&mut buf, "example.com.").unwrap();
        assert_eq!(buf, b"\x07example\x03com\x00");

        buf.clear();
        write_name(&mut buf, ".").unwrap();
        assert_eq!(buf, vec![0]);
        assert_eq!(read_name(&buf, 0).unwrap(), (String::new(), 1));
    }

    #[test]
    fn bad_names_are_rejected() {
        let mut buf = Vec::new();
        assert!(matches!(
            write_name(&mut buf, "a..b"),
            Err(PacketError::EmptyLabel(_))
        ));
        let long_label = "x".repeat(64);
        assert!(matches!(
            write_name(&mut buf, &long_label),
            Err(PacketError::LabelTooLong(_))
        ));
        let long_name = vec!["y".repeat(60); 5].join(".");
        assert!(matches!(
            write_name(&mut buf, &long_name),
            Err(PacketError::NameTooLong(_))
        ));
    }

    #[test]
    fn compressed_answer_names_are_expanded() {
        let mut msg = Header {
            id: 7,
            qr: true,
            qdcount: 1,
            ancount: 1,
            ..Header::default()
        }
        .serialize()
        .unwrap();
        msg.extend_from_slice(b"\x04test\x07example\x03com\x00\x00\x01\x00\x01");
        // name: pointer to the question name at offset 12
        msg.extend_from_slice(&[0xC0, 0x0C]);
        msg.extend_from_slice(&[0, 5, 0, 1, 0, 0, 0, 30, 0, 2]);
        // CNAME target: pointer to "example.com" inside the question name
        msg.extend_from_slice(&[0xC0, 0x11]);

        let packet = Packet::parse(&msg).unwrap();
        assert_eq!(packet.questions[0].name, "test.example.com");
        let answer = &packet.answers[0];
        assert_eq!(answer.name, "test.example.com");
        assert_eq!(answer.data, RData::Name("example.com".to_string()));
        assert_eq!(
            answer.to_string(),
            "test.example.com. 30 IN CNAME example.com."
        );
    }

    #[test]
    fn forward_and_self_pointers_are_rejected() {
        let mut msg = vec![0u8; HEADER_SIZE];
        msg.extend_from_slice(&[0xC0, 0x0C]);
        assert!(matches!(
            read_name(&msg, HEADER_SIZE),
            Err(PacketError::InvalidCompressionPointer(12))
        ));

        msg.extend_from_slice(&[0xC0, 0x20]);
        assert!(matches!(
            read_name(&msg, HEADER_SIZE + 2),
            Err(PacketError::InvalidCompressionPointer(0x20))
        ));
    }

    #[test]
    fn long_pointer_chains_are_cut_off() {
        // each name is a single pointer to the one before it
        let mut msg = vec![0u8];
        for i in 0..MAX_POINTER_DEPTH + 1 {
            let target = if i == 0 { 0 } else { 1 + (i - 1) * 2 };
            msg.extend_from_slice(&[0xC0, target as u8]);
        }
        let last = msg.len() - 2;
        assert!(matches!(
            read_name(&msg, last),
            Err(PacketError::CompressionTooDeep)
        ));
        assert!(read_name(&msg, last - 2).is_ok());
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert!(matches!(
            Packet::parse(&[0, 1, 0x81]),
            Err(PacketError::UnexpectedEof)
        ));

        let packet = Packet {
            header: Header {
                qr: true,
                ..Header::default()
            },
            questions: vec![Question::new("example.com")],
            answers: vec![a_record("example.com", [93, 184, 216, 34])],
            ..Packet::default()
        };
        let bytes = packet.serialize().unwrap();
        for cut in [HEADER_SIZE + 3, bytes.len() - 1] {
            assert!(matches!(
                Packet::parse(&bytes[..cut]),
                Err(PacketError::UnexpectedEof)
            ));
        }
    }

    #[test]
    fn a_record_with_wrong_length_is_malformed() {
        let mut msg = Header {
            ancount: 1,
            ..Header::default()
        }
        .serialize()
        .unwrap();
        msg.extend_from_slice(b"\x01a\x00\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x03\x01\x02\x03");
        assert!(matches!(
            Packet::parse(&msg),
            Err(PacketError::MalformedField("A rdata"))
        ));
    }

    #[test]
    fn unknown_codes_do_not_panic() {
        let mut msg = Header {
            qr: true,
            rcode: RCode::Unknown(11),
            opcode: Opcode::Unknown(9),
            ancount: 1,
            ..Header::default()
        }
        .serialize()
        .unwrap();
        msg.extend_from_slice(b"\x01a\x00\x01\x00\x00\x07\x00\x00\x00\x00\x00\x02\xbe\xef");

        let packet = Packet::parse(&msg).unwrap();
        assert_eq!(packet.header.rcode, RCode::Unknown(11));
        assert_eq!(packet.header.opcode, Opcode::Unknown(9));
        let answer = &packet.answers[0];
        assert_eq!(answer.rtype, QType::Unknown(256));
        assert_eq!(answer.class, QClass::Unknown(7));
        assert_eq!(answer.to_string(), "a. 0 CLASS7 TYPE256 \\# 2 beef");
    }

    #[test]
    fn mx_and_txt_rdata() {
        let packet = Packet {
            answers: vec![
                Record {
                    name: "example.com".to_string(),
                    rtype: QType::MX,
                    class: QClass::Internet,
                    ttl: 300,
                    data: RData::Mx {
                        preference: 10,
                        exchange: "mail.example.com".to_string(),
                    },
                },
                Record {
                    name: "example.com".to_string(),
                    rtype: QType::TXT,
                    class: QClass::Internet,
                    ttl: 300,
                    data: RData::Txt(vec!["v=spf1 -all".to_string(), "hi".to_string()]),
                },
            ],
            ..Packet::default()
        };
        let parsed = Packet::parse(&packet.serialize().unwrap()).unwrap();
        assert_eq!(parsed.answers, packet.answers);
        assert_eq!(
            parsed.answers[0].to_string(),
            "example.com. 300 IN MX 10 mail.example.com."
        );
        assert_eq!(
            parsed.answers[1].to_string(),
            "example.com. 300 IN TXT \"v=spf1 -all\" \"hi\""
        );
    }

    #[test]
    fn qtype_from_str() {
        assert_eq!("aaaa".parse::<QType>().unwrap(), QType::AAAA);
        assert_eq!("MX".parse::<QType>().unwrap(), QType::MX);
        assert_eq!("type65".parse::<QType>().unwrap(), QType::Unknown(65));
        assert_eq!("TYPE28".parse::<QType>().unwrap(), QType::AAAA);
        assert!("bogus".parse::<QType>().is_err());
    }
}
