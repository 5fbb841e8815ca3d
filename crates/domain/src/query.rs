/// The subset of an inbound DNS message the relay needs: the transaction ID
/// and the first question. Additional questions are dropped on decode.
///
/// The transaction ID is opaque — never inspected, only written back into the
/// upstream response so the client sees the ID it sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub transaction_id: u16,

    /// Question name as presented on the wire (FQDN, trailing dot).
    pub name: String,

    /// Question type (A = 1, AAAA = 28, ...), raw wire value.
    pub record_type: u16,

    /// Question class (IN = 1), raw wire value.
    pub record_class: u16,
}

impl QueryDescriptor {
    pub fn new(transaction_id: u16, name: String, record_type: u16, record_class: u16) -> Self {
        Self {
            transaction_id,
            name,
            record_type,
            record_class,
        }
    }
}
