use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// Marker Slack sends in the `type` field of a URL verification handshake.
pub const URL_VERIFICATION: &str = "url_verification";

/// A decoded slash command invocation.
///
/// Slack posts slash commands as a flat `application/x-www-form-urlencoded`
/// body. Every field is kept in the map, so accessors for fields Slack adds
/// later are a one-liner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundCommand {
    fields: HashMap<String, String>,
}

impl InboundCommand {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn field(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.get("type")
    }

    #[must_use]
    pub fn is_url_verification(&self) -> bool {
        self.event_type() == Some(URL_VERIFICATION)
    }

    #[must_use]
    pub fn challenge(&self) -> &str {
        self.field("challenge")
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.field("text")
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        self.field("user_id")
    }

    #[must_use]
    pub fn channel_id(&self) -> &str {
        self.field("channel_id")
    }

    #[must_use]
    pub fn response_url(&self) -> &str {
        self.field("response_url")
    }

    /// Parent thread of the invocation; blank values are treated as absent.
    #[must_use]
    pub fn thread_ts(&self) -> Option<&str> {
        self.get("thread_ts").filter(|ts| !ts.trim().is_empty())
    }
}

/// Decodes a URL-encoded form component.
///
/// `+` stands for a space and is translated before percent-decoding, so an
/// escaped `%2B` survives as a literal plus sign.
///
/// # Errors
///
/// Returns an error message if the decoded bytes are not valid UTF-8.
///
/// # Examples
///
/// ```
/// use trumpify::slack::command_parser::decode_url_component;
///
/// assert_eq!(decode_url_component("hello%20world").unwrap(), "hello world");
/// assert_eq!(decode_url_component("hello+world").unwrap(), "hello world");
/// assert_eq!(decode_url_component("1%2B1").unwrap(), "1+1");
/// ```
pub fn decode_url_component(input: &str) -> Result<String, String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| format!("Failed to decode URL component: {e}"))
}

/// Parses a URL-encoded form body into an [`InboundCommand`].
///
/// Pairs without `=` are kept with an empty value; when a key repeats, the
/// last value wins.
///
/// # Errors
///
/// Returns an error message if a key or value is not valid UTF-8 after
/// decoding.
///
/// # Examples
///
/// ```
/// use trumpify::slack::command_parser::parse_form_data;
///
/// let command = parse_form_data(
///     "channel_id=C123&user_id=U123&command=%2Ftrumpify&text=the+economy+is+struggling",
/// )
/// .unwrap();
/// assert_eq!(command.channel_id(), "C123");
/// assert_eq!(command.text(), "the economy is struggling");
/// assert_eq!(command.thread_ts(), None);
/// ```
pub fn parse_form_data(form_data: &str) -> Result<InboundCommand, String> {
    let mut fields: HashMap<String, String> = HashMap::new();

    for pair in form_data.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));

        let key = decode_url_component(raw_key).map_err(|e| format!("Failed to decode key: {e}"))?;
        let value =
            decode_url_component(raw_value).map_err(|e| format!("Failed to decode value: {e}"))?;

        fields.insert(key, value);
    }

    Ok(InboundCommand { fields })
}
