use std::fmt;

/// The wire grammar shared by both protocols: `"<kind> <sender_id>"`,
/// ASCII, one message per datagram. `exit` carries no argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Election(u32),
    Ok(u32),
    Coordinator(u32),
    AreYouAlive(u32),
    Exit,
}

/// A datagram that didn't match the grammar. Callers drop these; the
/// variant carries the raw text only so a caller can log it at debug level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed datagram: {:?}", self.0)
    }
}

impl std::error::Error for DecodeError {}

impl Message {
    pub fn encode(&self) -> String {
        match self {
            Message::Election(id) => format!("election {id}"),
            Message::Ok(id) => format!("OK {id}"),
            Message::Coordinator(id) => format!("coordinator {id}"),
            Message::AreYouAlive(id) => format!("are_you_alive {id}"),
            Message::Exit => "exit".to_string(),
        }
    }

    pub fn decode(text: &str) -> Result<Message, DecodeError> {
        let mut tokens = text.trim().split(' ');
        let kind = tokens.next().ok_or_else(|| DecodeError(text.to_string()))?;
        let rest: Vec<&str> = tokens.collect();

        let parse_id = |tok: &str| -> Result<u32, DecodeError> {
            tok.parse::<u32>().map_err(|_| DecodeError(text.to_string()))
        };

        match (kind, rest.as_slice()) {
            ("election", [id]) => Ok(Message::Election(parse_id(id)?)),
            ("OK", [id]) => Ok(Message::Ok(parse_id(id)?)),
            ("coordinator", [id]) => Ok(Message::Coordinator(parse_id(id)?)),
            ("are_you_alive", [id]) => Ok(Message::AreYouAlive(parse_id(id)?)),
            ("exit", []) => Ok(Message::Exit),
            _ => Err(DecodeError(text.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_kind() {
        let cases = [
            Message::Election(7),
            Message::Ok(3),
            Message::Coordinator(42),
            Message::AreYouAlive(0),
            Message::Exit,
        ];
        for msg in cases {
            let encoded = msg.encode();
            let decoded = Message::decode(&encoded).expect("round trip decode");
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn rejects_malformed_datagrams() {
        assert!(Message::decode("election").is_err());
        assert!(Message::decode("election abc").is_err());
        assert!(Message::decode("bogus 1").is_err());
        assert!(Message::decode("exit 1").is_err());
        assert!(Message::decode("").is_err());
    }

    #[test]
    fn exit_carries_no_argument() {
        assert_eq!(Message::decode("exit"), Ok(Message::Exit));
        assert_eq!(Message::Exit.encode(), "exit");
    }
}
