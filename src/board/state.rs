/// Connection badge shown next to the meet name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Connection {
    Connecting,
    Connected,
    Error,
}

impl Connection {
    pub fn as_str(&self) -> &str {
        match self {
            Connection::Connecting => "Connecting",
            Connection::Connected => "Live",
            Connection::Error => "OFFLINE",
        }
    }
}
