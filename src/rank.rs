//! RANK vote payloads
//!
//! A vote is an `OP_RETURN` output tagged with the `RANK` LOKAD marker:
//!
//! ```text
//! OP_RETURN <"RANK"> <sentiment op> <platform byte> <profile id> [<post id>]
//! ```
//!
//! - sentiment: `OP_1` positive, `OP_0` negative, `OP_16` neutral
//! - platform: one byte, see [`Platform`]
//! - profile id: fixed-width UTF-8, left-padded with zero bytes
//! - post id: optional 8-byte big-endian integer
//!
//! Call sites only see the [`VoteDecoder`] trait, so the wire format can be
//! swapped without touching the enrichment code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::LOKAD_RANK;
use crate::script::opcodes::{OP_0, OP_1, OP_16, OP_RETURN};
use crate::script::{Instruction, Instructions, ScriptDecodeError};

/// Social platforms that can be voted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[Platform::Twitter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Platform::Twitter),
            _ => None,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            Platform::Twitter => 0x01,
        }
    }

    /// Width of the profile id field in bytes
    pub fn profile_id_len(&self) -> usize {
        match self {
            Platform::Twitter => 16,
        }
    }

    /// Width of the post id field in bytes
    pub fn post_id_len(&self) -> usize {
        match self {
            Platform::Twitter => 8,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_opcode(op: u8) -> Option<Self> {
        match op {
            OP_1 => Some(Sentiment::Positive),
            OP_0 => Some(Sentiment::Negative),
            OP_16 => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn to_opcode(&self) -> u8 {
        match self {
            Sentiment::Positive => OP_1,
            Sentiment::Negative => OP_0,
            Sentiment::Neutral => OP_16,
        }
    }
}

/// Decoded vote
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub platform: Platform,
    pub profile_id: String,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
}

/// Marker matched but the body is not a valid vote
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankDecodeError {
    #[error(transparent)]
    Script(#[from] ScriptDecodeError),
    #[error("missing sentiment")]
    MissingSentiment,
    #[error("invalid sentiment opcode 0x{0:02x}")]
    InvalidSentiment(u8),
    #[error("missing platform")]
    MissingPlatform,
    #[error("unknown platform byte 0x{0:02x}")]
    UnknownPlatform(u8),
    #[error("missing profile id")]
    MissingProfileId,
    #[error("invalid profile id")]
    InvalidProfileId,
    #[error("invalid post id")]
    InvalidPostId,
    #[error("unexpected data after vote")]
    TrailingData,
}

pub trait VoteDecoder: Send + Sync {
    /// Decode a vote from a data-carrying script.
    ///
    /// `Ok(None)` when the script does not carry the RANK marker.
    fn decode(&self, script: &[u8]) -> Result<Option<VotePayload>, RankDecodeError>;
}

/// Decoder for the RANK wire format described at the top of this module
#[derive(Debug, Clone, Copy, Default)]
pub struct RankScriptDecoder;

impl VoteDecoder for RankScriptDecoder {
    fn decode(&self, script: &[u8]) -> Result<Option<VotePayload>, RankDecodeError> {
        let mut instructions = Instructions::new(script);

        match instructions.next() {
            Some(Ok(Instruction::Op(OP_RETURN))) => {}
            _ => return Ok(None),
        }
        match instructions.next() {
            Some(Ok(Instruction::Push(marker))) if marker == LOKAD_RANK => {}
            _ => return Ok(None),
        }

        let body = instructions.collect::<Result<Vec<_>, _>>()?;
        let mut body = body.into_iter();

        let sentiment = match body.next() {
            Some(Instruction::Op(op)) => {
                Sentiment::from_opcode(op).ok_or(RankDecodeError::InvalidSentiment(op))?
            }
            Some(Instruction::Push(data)) => {
                return Err(RankDecodeError::InvalidSentiment(
                    data.first().copied().unwrap_or_default(),
                ))
            }
            None => return Err(RankDecodeError::MissingSentiment),
        };

        let platform = match body.next() {
            Some(Instruction::Push([byte])) => {
                Platform::from_byte(*byte).ok_or(RankDecodeError::UnknownPlatform(*byte))?
            }
            Some(_) => return Err(RankDecodeError::UnknownPlatform(0)),
            None => return Err(RankDecodeError::MissingPlatform),
        };

        let profile_id = match body.next() {
            Some(Instruction::Push(data)) if data.len() == platform.profile_id_len() => {
                decode_profile_id(data)?
            }
            Some(_) => return Err(RankDecodeError::InvalidProfileId),
            None => return Err(RankDecodeError::MissingProfileId),
        };

        let post_id = match body.next() {
            Some(Instruction::Push(data)) if data.len() == platform.post_id_len() => {
                let mut be = [0u8; 8];
                be.copy_from_slice(data);
                Some(u64::from_be_bytes(be).to_string())
            }
            Some(_) => return Err(RankDecodeError::InvalidPostId),
            None => None,
        };

        if body.next().is_some() {
            return Err(RankDecodeError::TrailingData);
        }

        Ok(Some(VotePayload {
            platform,
            profile_id,
            sentiment,
            post_id,
        }))
    }
}

fn decode_profile_id(data: &[u8]) -> Result<String, RankDecodeError> {
    let start = data.iter().position(|b| *b != 0).unwrap_or(data.len());
    let id = std::str::from_utf8(&data[start..]).map_err(|_| RankDecodeError::InvalidProfileId)?;
    if id.is_empty() {
        return Err(RankDecodeError::InvalidProfileId);
    }
    Ok(id.to_string())
}

/// Build the output script for a vote
pub fn encode_vote(vote: &VotePayload) -> Result<Vec<u8>, RankDecodeError> {
    let profile = vote.profile_id.as_bytes();
    let width = vote.platform.profile_id_len();
    if profile.is_empty() || profile.len() > width || profile[0] == 0 {
        return Err(RankDecodeError::InvalidProfileId);
    }

    let mut script = vec![OP_RETURN, LOKAD_RANK.len() as u8];
    script.extend_from_slice(LOKAD_RANK);
    script.push(vote.sentiment.to_opcode());
    script.extend_from_slice(&[0x01, vote.platform.to_byte()]);
    script.push(width as u8);
    script.extend(std::iter::repeat(0u8).take(width - profile.len()));
    script.extend_from_slice(profile);

    if let Some(post_id) = &vote.post_id {
        let id: u64 = post_id.parse().map_err(|_| RankDecodeError::InvalidPostId)?;
        script.push(vote.platform.post_id_len() as u8);
        script.extend_from_slice(&id.to_be_bytes());
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(sentiment: Sentiment, post_id: Option<&str>) -> VotePayload {
        VotePayload {
            platform: Platform::Twitter,
            profile_id: "elonmusk".to_string(),
            sentiment,
            post_id: post_id.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_profile_vote() {
        let expected = vote(Sentiment::Positive, None);
        let script = encode_vote(&expected).unwrap();
        assert_eq!(RankScriptDecoder.decode(&script), Ok(Some(expected)));
    }

    #[test]
    fn test_decode_post_vote_all_sentiments() {
        for sentiment in [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral] {
            let expected = vote(sentiment, Some("1790000000000000000"));
            let script = encode_vote(&expected).unwrap();
            assert_eq!(RankScriptDecoder.decode(&script), Ok(Some(expected)));
        }
    }

    #[test]
    fn test_marker_mismatch_is_absent() {
        // other LOKAD tag
        let script = [0x6a, 0x04, b'R', b'N', b'K', b'C', 0x51];
        assert_eq!(RankScriptDecoder.decode(&script), Ok(None));
        // bare OP_RETURN
        assert_eq!(RankScriptDecoder.decode(&[0x6a]), Ok(None));
        // marker push truncated
        assert_eq!(RankScriptDecoder.decode(&[0x6a, 0x04, b'R']), Ok(None));
        // not data-carrying at all
        assert_eq!(RankScriptDecoder.decode(&[0x76, 0xa9]), Ok(None));
    }

    #[test]
    fn test_malformed_body_is_error() {
        let prefix = [0x6a, 0x04, b'R', b'A', b'N', b'K'];

        assert_eq!(
            RankScriptDecoder.decode(&prefix),
            Err(RankDecodeError::MissingSentiment)
        );

        let mut bad_sentiment = prefix.to_vec();
        bad_sentiment.push(0x52);
        assert_eq!(
            RankScriptDecoder.decode(&bad_sentiment),
            Err(RankDecodeError::InvalidSentiment(0x52))
        );

        let mut bad_platform = prefix.to_vec();
        bad_platform.extend_from_slice(&[0x51, 0x01, 0x09]);
        assert_eq!(
            RankScriptDecoder.decode(&bad_platform),
            Err(RankDecodeError::UnknownPlatform(0x09))
        );

        let mut no_profile = prefix.to_vec();
        no_profile.extend_from_slice(&[0x51, 0x01, 0x01]);
        assert_eq!(
            RankScriptDecoder.decode(&no_profile),
            Err(RankDecodeError::MissingProfileId)
        );

        let mut truncated = encode_vote(&vote(Sentiment::Positive, None)).unwrap();
        truncated.truncate(truncated.len() - 3);
        assert!(matches!(
            RankScriptDecoder.decode(&truncated),
            Err(RankDecodeError::Script(_))
        ));

        let mut trailing = encode_vote(&vote(Sentiment::Positive, Some("7"))).unwrap();
        trailing.push(0x51);
        assert_eq!(
            RankScriptDecoder.decode(&trailing),
            Err(RankDecodeError::TrailingData)
        );
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("twitter".parse::<Platform>(), Ok(Platform::Twitter));
        assert_eq!(
            "unknownplatform".parse::<Platform>(),
            Err(UnknownPlatform("unknownplatform".to_string()))
        );
        assert_eq!(Platform::Twitter.to_string(), "twitter");
    }

    #[test]
    fn test_vote_payload_json() {
        let json = serde_json::to_value(vote(Sentiment::Neutral, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "platform": "twitter",
                "profileId": "elonmusk",
                "sentiment": "neutral"
            })
        );
    }

    #[test]
    fn test_encode_rejects_oversized_profile() {
        let mut long = vote(Sentiment::Positive, None);
        long.profile_id = "a".repeat(17);
        assert_eq!(encode_vote(&long), Err(RankDecodeError::InvalidProfileId));
    }
}
