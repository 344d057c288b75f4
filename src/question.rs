use crate::packet::*;

pub const DEFAULT_NAMES: [&str; 3] = ["example.com", "test.example.com", "another.test.example.com"];

/// Builds a query carrying one question per name, in the order given.
pub fn create_query<S: AsRef<str>>(names: &[S], qtype: QType, recursion_desired: bool) -> Packet {
    let header = Header {
        id: rand::random(),
        qr: false,
        opcode: Opcode::Query,
        rd: recursion_desired,
        ..Header::default()
    };

    let questions = names
        .iter()
        .map(|name| Question {
            qtype,
            ..Question::new(name.as_ref())
        })
        .collect();

    Packet {
        header,
        questions,
        ..Packet::default()
    }
}
