//! Text codec.
//!
//! Client -> server (one message per read):
//!
//! - Connect:
//!   `msgtype:connect; alias:<name>`
//!
//! - Play:
//!   `msgtype:play; alias:<name>; answer:<rock|paper|scissors>`
//!
//! Fields are separated by `;`, each field is `key:value`, whitespace
//! around keys and values is ignored.
//!
//! Server -> client:
//!
//! - `connect type msg received`
//! - `play type msg`
//! - `Wrong message fields`
//! - `error in msg`
//! - `Countdown; <seconds>`
//! - `Outcome; <alias>: <score>, <alias>: <score>, ...`

use indexmap::IndexMap;
use thiserror::Error;

use rps_core::{ClientMessage, ServerMessage, Standing};

/// Decoded `key -> value` fields, in wire order.
pub type Fields = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The message is not UTF-8 or a field is not exactly one `key:value`.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A key required by the message kind is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown msgtype `{0}`")]
    UnknownMsgType(String),

    #[error("alias must not be empty")]
    EmptyAlias,
}

/// Split raw bytes into fields.
///
/// Fails if any `;`-separated segment does not contain exactly one `:`.
/// Repeated keys keep the last value.
pub fn decode(bytes: &[u8]) -> Result<Fields, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DecodeError::MalformedMessage(format!("not utf-8: {e}")))?;

    let mut fields = Fields::new();
    for segment in text.trim().split(';') {
        let (key, value) = split_field(segment)?;
        fields.insert(key.to_string(), value.to_string());
    }

    Ok(fields)
}

/// Decode raw bytes into a [`ClientMessage`], checking the keys its
/// `msgtype` requires. The `answer` value is not validated here.
pub fn parse_client_message(bytes: &[u8]) -> Result<ClientMessage, DecodeError> {
    let fields = decode(bytes)?;

    match required(&fields, "msgtype")? {
        "connect" => Ok(ClientMessage::Connect {
            alias: alias(&fields)?,
        }),
        "play" => Ok(ClientMessage::Play {
            alias: alias(&fields)?,
            answer: required(&fields, "answer")?.to_string(),
        }),
        other => Err(DecodeError::UnknownMsgType(other.to_string())),
    }
}

/// Join fields back into wire form: `k1:v1; k2:v2`.
pub fn encode_fields(fields: &Fields) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Wire form of a client message (used by clients and tests).
pub fn encode_client_message(msg: &ClientMessage) -> String {
    let mut fields = Fields::new();
    fields.insert("msgtype".to_string(), msg.msgtype().to_string());
    fields.insert("alias".to_string(), msg.alias().to_string());
    if let ClientMessage::Play { answer, .. } = msg {
        fields.insert("answer".to_string(), answer.clone());
    }
    encode_fields(&fields)
}

/// Wire form of a server message, without a line terminator.
pub fn encode_server_message(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::ConnectAck => "connect type msg received".to_string(),
        ServerMessage::PlayAck => "play type msg".to_string(),
        ServerMessage::WrongFields => "Wrong message fields".to_string(),
        ServerMessage::ErrorInMsg => "error in msg".to_string(),
        ServerMessage::Countdown(seconds) => format!("Countdown; {seconds}"),
        ServerMessage::Outcome(standings) => format!("Outcome; {}", format_standings(standings)),
    }
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn split_field(segment: &str) -> Result<(&str, &str), DecodeError> {
    let mut parts = segment.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Ok((key.trim(), value.trim())),
        _ => Err(DecodeError::MalformedMessage(format!(
            "field `{}` is not key:value",
            segment.trim()
        ))),
    }
}

fn required<'a>(fields: &'a Fields, key: &'static str) -> Result<&'a str, DecodeError> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or(DecodeError::MissingField(key))
}

fn alias(fields: &Fields) -> Result<String, DecodeError> {
    let alias = required(fields, "alias")?;
    if alias.is_empty() {
        return Err(DecodeError::EmptyAlias);
    }
    Ok(alias.to_string())
}

fn format_standings(standings: &[Standing]) -> String {
    standings
        .iter()
        .map(|s| format!("{}: {}", s.alias, s.score))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_connect() {
        let msg = parse_client_message(b"msgtype:connect; alias:alice").unwrap();
        assert_eq!(
            msg,
            ClientMessage::Connect {
                alias: "alice".into()
            }
        );
    }

    #[test]
    fn decodes_play_with_loose_whitespace() {
        let msg = parse_client_message(b"  msgtype : play ;alias:  bob ;  answer:rock \n").unwrap();
        assert_eq!(
            msg,
            ClientMessage::Play {
                alias: "bob".into(),
                answer: "rock".into()
            }
        );
    }

    #[test]
    fn play_answer_is_not_validated_by_codec() {
        let msg = parse_client_message(b"msgtype:play; alias:bob; answer:lizard").unwrap();
        assert_eq!(
            msg,
            ClientMessage::Play {
                alias: "bob".into(),
                answer: "lizard".into()
            }
        );
    }

    #[test]
    fn field_without_colon_is_malformed() {
        assert!(matches!(
            decode(b"msgtype:connect; alice"),
            Err(DecodeError::MalformedMessage(_))
        ));
        assert!(matches!(
            decode(b"garbage"),
            Err(DecodeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn field_with_two_colons_is_malformed() {
        assert!(matches!(
            decode(b"msgtype:connect; alias:a:b"),
            Err(DecodeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn trailing_separator_is_malformed() {
        assert!(matches!(
            decode(b"msgtype:connect; alias:alice;"),
            Err(DecodeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn non_utf8_is_malformed() {
        assert!(matches!(
            decode(&[0xff, 0xfe, b':', b'x']),
            Err(DecodeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn missing_required_fields() {
        assert_eq!(
            parse_client_message(b"alias:alice"),
            Err(DecodeError::MissingField("msgtype"))
        );
        assert_eq!(
            parse_client_message(b"msgtype:connect"),
            Err(DecodeError::MissingField("alias"))
        );
        assert_eq!(
            parse_client_message(b"msgtype:play; alias:alice"),
            Err(DecodeError::MissingField("answer"))
        );
    }

    #[test]
    fn empty_alias_rejected() {
        assert_eq!(
            parse_client_message(b"msgtype:connect; alias:  "),
            Err(DecodeError::EmptyAlias)
        );
    }

    #[test]
    fn unknown_msgtype_rejected() {
        assert_eq!(
            parse_client_message(b"msgtype:quit; alias:alice"),
            Err(DecodeError::UnknownMsgType("quit".into()))
        );
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let decoded = decode(b"msgtype:connect; alias:first; alias:second").unwrap();
        assert_eq!(decoded.get("alias").map(String::as_str), Some("second"));
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn fields_survive_encode_then_decode() {
        let cases = [
            fields(&[("msgtype", "connect"), ("alias", "alice")]),
            fields(&[("msgtype", "play"), ("alias", "bob"), ("answer", "scissors")]),
            fields(&[("answer", "paper"), ("alias", "x y"), ("msgtype", "play")]),
        ];
        for original in cases {
            let wire = encode_fields(&original);
            let decoded = decode(wire.as_bytes()).unwrap();
            assert_eq!(decoded, original);
            assert!(decoded.keys().eq(original.keys()));
        }
    }

    #[test]
    fn client_messages_survive_encode_then_parse() {
        let msgs = [
            ClientMessage::Connect {
                alias: "alice".into(),
            },
            ClientMessage::Play {
                alias: "alice".into(),
                answer: "paper".into(),
            },
        ];
        for msg in msgs {
            let wire = encode_client_message(&msg);
            assert_eq!(parse_client_message(wire.as_bytes()), Ok(msg));
        }
        assert_eq!(
            encode_client_message(&ClientMessage::Play {
                alias: "dave".into(),
                answer: "rock".into()
            }),
            "msgtype:play; alias:dave; answer:rock"
        );
    }

    #[test]
    fn server_literals() {
        assert_eq!(
            encode_server_message(&ServerMessage::ConnectAck),
            "connect type msg received"
        );
        assert_eq!(encode_server_message(&ServerMessage::PlayAck), "play type msg");
        assert_eq!(
            encode_server_message(&ServerMessage::WrongFields),
            "Wrong message fields"
        );
        assert_eq!(encode_server_message(&ServerMessage::ErrorInMsg), "error in msg");
        assert_eq!(
            encode_server_message(&ServerMessage::Countdown(17)),
            "Countdown; 17"
        );
    }

    #[test]
    fn outcome_joins_pairs_in_given_order() {
        let standings = vec![
            Standing {
                alias: "alice".into(),
                score: 5,
            },
            Standing {
                alias: "bob".into(),
                score: 0,
            },
        ];
        assert_eq!(
            encode_server_message(&ServerMessage::Outcome(standings)),
            "Outcome; alice: 5, bob: 0"
        );
        assert_eq!(
            encode_server_message(&ServerMessage::Outcome(Vec::new())),
            "Outcome; "
        );
    }
}
