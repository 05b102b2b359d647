//! Wire types for the Hootsuite REST v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Envelope every successful response body is wrapped in.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// The actor approving or rejecting a message under review.
///
/// Names are sent verbatim in request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reviewer {
    External,
    Member,
}

impl Reviewer {
    pub fn as_str(self) -> &'static str {
        match self {
            Reviewer::External => "EXTERNAL",
            Reviewer::Member => "MEMBER",
        }
    }
}

/// Lifecycle state of an outbound message.
///
/// Names are sent verbatim as the `state` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageState {
    PendingApproval,
    Rejected,
    Sent,
    Scheduled,
    SendFailedPermanently,
}

impl MessageState {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageState::PendingApproval => "PENDING_APPROVAL",
            MessageState::Rejected => "REJECTED",
            MessageState::Sent => "SENT",
            MessageState::Scheduled => "SCHEDULED",
            MessageState::SendFailedPermanently => "SEND_FAILED_PERMANENTLY",
        }
    }
}

/// MIME types accepted for media uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Mp4,
    Gif,
    Jpeg,
    Jpg,
    Png,
}

impl MimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            MimeType::Mp4 => "video/mp4",
            MimeType::Gif => "image/gif",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Jpg => "image/jpg",
            MimeType::Png => "image/png",
        }
    }
}

impl std::str::FromStr for MimeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video/mp4" => Ok(MimeType::Mp4),
            "image/gif" => Ok(MimeType::Gif),
            "image/jpeg" => Ok(MimeType::Jpeg),
            "image/jpg" => Ok(MimeType::Jpg),
            "image/png" => Ok(MimeType::Png),
            other => Err(Error::MimeTypeNotAllowed(other.to_string())),
        }
    }
}

/// A Hootsuite member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// An organization a member belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
}

/// A social media profile connected to Hootsuite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProfile {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub profile_type: Option<String>,
    #[serde(default)]
    pub social_network_id: Option<String>,
    #[serde(default)]
    pub social_network_username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub is_secure_post: Option<bool>,
}

/// An outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub state: Option<MessageState>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub scheduled_send_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sequence_number: Option<i64>,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One entry in a message's prescreening review history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub actor_type: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// A presigned upload slot for a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub id: String,
    pub upload_url: String,
    #[serde(default)]
    pub upload_url_duration_seconds: Option<i64>,
}

/// Upload/transcode state of a previously created media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatus {
    pub id: String,
    pub state: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub download_url_duration_seconds: Option<i64>,
}

/// Optional fields for [`create_member`](crate::HootsuiteClient::create_member).
#[derive(Debug, Clone)]
pub struct NewMemberOptions {
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub timezone: String,
    pub language: String,
}

impl Default for NewMemberOptions {
    fn default() -> Self {
        Self {
            company_name: None,
            bio: None,
            timezone: "Europe/London".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Optional filters for
/// [`get_outbound_messages`](crate::HootsuiteClient::get_outbound_messages).
#[derive(Debug, Clone, Default)]
pub struct MessageFilters {
    pub state: Option<MessageState>,
    pub social_profile_ids: Option<Vec<i64>>,
    /// Maximum number of messages returned. The provider default of 50 is
    /// applied when unset.
    pub limit: Option<u32>,
    pub include_unscheduled_review_messages: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviewer_names_match_wire_format() {
        assert_eq!(Reviewer::External.as_str(), "EXTERNAL");
        assert_eq!(Reviewer::Member.as_str(), "MEMBER");
        assert_eq!(
            serde_json::to_string(&Reviewer::External).unwrap(),
            "\"EXTERNAL\""
        );
    }

    #[test]
    fn message_state_names_match_wire_format() {
        assert_eq!(MessageState::PendingApproval.as_str(), "PENDING_APPROVAL");
        assert_eq!(
            MessageState::SendFailedPermanently.as_str(),
            "SEND_FAILED_PERMANENTLY"
        );
        let state: MessageState = serde_json::from_str("\"SCHEDULED\"").unwrap();
        assert_eq!(state, MessageState::Scheduled);
    }

    #[test]
    fn mime_type_allow_list() {
        assert_eq!("image/png".parse::<MimeType>().unwrap(), MimeType::Png);
        assert_eq!("video/mp4".parse::<MimeType>().unwrap(), MimeType::Mp4);
        assert!(matches!(
            "image/nnn".parse::<MimeType>(),
            Err(Error::MimeTypeNotAllowed(_))
        ));
        assert!(matches!(
            "video/quicktime".parse::<MimeType>(),
            Err(Error::MimeTypeNotAllowed(_))
        ));
    }

    #[test]
    fn message_deserializes_from_provider_shape() {
        let body = serde_json::json!({
            "id": "98765",
            "state": "SCHEDULED",
            "text": "A message",
            "scheduledSendTime": "2020-01-01T13:10:14Z",
            "sequenceNumber": 2
        });
        let message: Message = serde_json::from_value(body).unwrap();
        assert_eq!(message.id, "98765");
        assert_eq!(message.state, Some(MessageState::Scheduled));
        assert_eq!(message.sequence_number, Some(2));
        assert!(message.tags.is_empty());
        assert_eq!(
            message.scheduled_send_time.unwrap().to_rfc3339(),
            "2020-01-01T13:10:14+00:00"
        );
    }

    #[test]
    fn social_profile_renames_type_field() {
        let body = serde_json::json!({
            "id": 1234,
            "type": "TWITTER",
            "socialNetworkUsername": "hoot"
        });
        let profile: SocialProfile = serde_json::from_value(body).unwrap();
        assert_eq!(profile.id, 1234);
        assert_eq!(profile.profile_type.as_deref(), Some("TWITTER"));
        assert_eq!(profile.social_network_username.as_deref(), Some("hoot"));
    }

    #[test]
    fn new_member_defaults() {
        let options = NewMemberOptions::default();
        assert_eq!(options.timezone, "Europe/London");
        assert_eq!(options.language, "en");
        assert!(options.company_name.is_none());
        assert!(options.bio.is_none());
    }
}
