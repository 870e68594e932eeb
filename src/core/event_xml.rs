// EventDash - core/event_xml.rs
//
// Parse the XML the Windows event API renders for a single event into a
// `RawEvent`. Kept free of any OS dependency so the parsing rules are
// unit-testable on every platform; the Windows live source feeds rendered
// XML through here.
//
// Only the fields the dashboard displays are extracted. The level string
// prefers the rendered display name (`RenderingInfo/Level`, which is what
// the Event Viewer shows) and falls back to the standard ETW name for the
// numeric `System/Level` value.

use crate::core::fetch::RawEvent;
use crate::util::error::FetchError;
use chrono::{DateTime, Utc};
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;

/// Standard ETW level names for the numeric `System/Level` value.
pub fn level_to_name(level: u8) -> &'static str {
    match level {
        0 => "LogAlways",
        1 => "Critical",
        2 => "Error",
        3 => "Warning",
        4 => "Information",
        5 => "Verbose",
        _ => "Unknown",
    }
}

/// Parse one rendered event XML document.
///
/// Returns `MalformedEvent` when the document is not well-formed or lacks
/// an `EventID`; the fetcher skips such records.
pub fn parse_rendered_event(xml: &str, channel: &str) -> Result<RawEvent, FetchError> {
    let malformed = |reason: String| FetchError::MalformedEvent {
        channel: channel.to_string(),
        reason,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut in_system = false;
    let mut in_rendering = false;
    let mut in_event_data = false;
    let mut current_element = String::new();
    let mut current_data_name: Option<String> = None;

    let mut time_created: Option<DateTime<Utc>> = None;
    let mut event_id: Option<u32> = None;
    let mut numeric_level: Option<u8> = None;
    let mut display_level: Option<String> = None;
    let mut provider: Option<String> = None;
    let mut user: Option<String> = None;
    let mut message: Option<String> = None;
    let mut event_data: Vec<(String, String)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) | Ok(XmlEvent::Empty(e)) => {
                let name_bytes = e.name();
                let name = String::from_utf8_lossy(name_bytes.as_ref()).into_owned();
                match name.as_str() {
                    "System" => in_system = true,
                    "RenderingInfo" => in_rendering = true,
                    "EventData" | "UserData" => in_event_data = true,
                    "Provider" if in_system => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"Name" {
                                if let Ok(value) = attr.unescape_value() {
                                    provider = Some(value.into_owned());
                                }
                            }
                        }
                    }
                    "TimeCreated" if in_system => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"SystemTime" {
                                if let Ok(value) = attr.unescape_value() {
                                    time_created = DateTime::parse_from_rfc3339(&value)
                                        .ok()
                                        .map(|dt| dt.with_timezone(&Utc));
                                }
                            }
                        }
                    }
                    "Security" if in_system => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"UserID" {
                                if let Ok(value) = attr.unescape_value() {
                                    user = Some(value.into_owned());
                                }
                            }
                        }
                    }
                    "Data" if in_event_data => {
                        current_data_name = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"Name" {
                                if let Ok(value) = attr.unescape_value() {
                                    current_data_name = Some(value.into_owned());
                                }
                            }
                        }
                    }
                    _ => {}
                }
                current_element = name;
            }
            Ok(XmlEvent::End(e)) => {
                let name_bytes = e.name();
                match name_bytes.as_ref() {
                    b"System" => in_system = false,
                    b"RenderingInfo" => in_rendering = false,
                    b"EventData" | b"UserData" => in_event_data = false,
                    b"Data" => current_data_name = None,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(XmlEvent::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| malformed(format!("bad text node: {e}")))?
                    .into_owned();
                if in_event_data {
                    if current_element == "Data" {
                        event_data.push((current_data_name.clone().unwrap_or_default(), text));
                    }
                } else if in_rendering {
                    match current_element.as_str() {
                        "Message" => message = Some(text),
                        "Level" => display_level = Some(text),
                        _ => {}
                    }
                } else if in_system {
                    match current_element.as_str() {
                        "EventID" => event_id = text.trim().parse::<u32>().ok(),
                        "Level" => numeric_level = text.trim().parse::<u8>().ok(),
                        _ => {}
                    }
                }
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(malformed(format!("invalid event XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    let event_id = event_id.ok_or_else(|| malformed("missing EventID".to_string()))?;

    // The rendered display name is what the Event Viewer shows; the numeric
    // level is always present even when provider metadata is missing.
    let level_name = display_level.or_else(|| numeric_level.map(|l| level_to_name(l).to_string()));

    // Providers without local metadata render no message; fall back to the
    // structured EventData pairs so the row is still informative.
    let description = match message {
        Some(m) if !m.is_empty() => Some(m),
        _ if !event_data.is_empty() => Some(
            event_data
                .iter()
                .map(|(name, value)| {
                    if name.is_empty() {
                        value.clone()
                    } else {
                        format!("{name}={value}")
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    };

    Ok(RawEvent {
        time_created,
        event_id,
        level_name,
        provider,
        user,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = r#"<Event xmlns="http://schemas.microsoft.com/win/2004/08/events/event">
  <System>
    <Provider Name="Microsoft-Windows-Security-Auditing" Guid="{54849625-5478-4994-a5ba-3e3b0328c30d}"/>
    <EventID>4624</EventID>
    <Version>2</Version>
    <Level>0</Level>
    <Task>12544</Task>
    <Opcode>0</Opcode>
    <Keywords>0x8020000000000000</Keywords>
    <TimeCreated SystemTime="2025-08-06T14:30:05.1234567Z"/>
    <EventRecordID>91021</EventRecordID>
    <Channel>Security</Channel>
    <Computer>WORKSTATION</Computer>
    <Security UserID="S-1-5-18"/>
  </System>
  <EventData>
    <Data Name="TargetUserName">alice</Data>
    <Data Name="LogonType">2</Data>
  </EventData>
  <RenderingInfo Culture="en-US">
    <Message>An account was successfully logged on.</Message>
    <Level>Information</Level>
  </RenderingInfo>
</Event>"#;

    #[test]
    fn test_parses_system_fields() {
        let raw = parse_rendered_event(RENDERED, "Security").unwrap();
        assert_eq!(raw.event_id, 4624);
        assert_eq!(raw.provider.as_deref(), Some("Microsoft-Windows-Security-Auditing"));
        assert_eq!(raw.user.as_deref(), Some("S-1-5-18"));
        let ts = raw.time_created.unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-08-06 14:30:05");
    }

    #[test]
    fn test_prefers_rendered_level_and_message() {
        let raw = parse_rendered_event(RENDERED, "Security").unwrap();
        assert_eq!(raw.level_name.as_deref(), Some("Information"));
        assert_eq!(
            raw.description.as_deref(),
            Some("An account was successfully logged on.")
        );
    }

    #[test]
    fn test_numeric_level_fallback_without_rendering_info() {
        let xml = r#"<Event><System><Provider Name="P"/><EventID>7</EventID><Level>2</Level></System></Event>"#;
        let raw = parse_rendered_event(xml, "System").unwrap();
        assert_eq!(raw.level_name.as_deref(), Some("Error"));
    }

    #[test]
    fn test_event_data_fallback_message() {
        let xml = r#"<Event><System><EventID>3008</EventID><Level>3</Level></System>
            <EventData><Data Name="QueryName">example.com</Data><Data Name="QueryType">1</Data></EventData></Event>"#;
        let raw = parse_rendered_event(xml, "DNS").unwrap();
        assert_eq!(
            raw.description.as_deref(),
            Some("QueryName=example.com; QueryType=1")
        );
    }

    #[test]
    fn test_missing_event_id_is_malformed() {
        let xml = r#"<Event><System><Level>4</Level></System></Event>"#;
        let err = parse_rendered_event(xml, "System").unwrap_err();
        assert!(matches!(err, FetchError::MalformedEvent { .. }));
    }

    #[test]
    fn test_unescapes_entities() {
        let xml = r#"<Event><System><EventID>1</EventID></System>
            <RenderingInfo><Message>a &lt; b &amp; c</Message></RenderingInfo></Event>"#;
        let raw = parse_rendered_event(xml, "Application").unwrap();
        assert_eq!(raw.description.as_deref(), Some("a < b & c"));
    }

    #[test]
    fn test_level_name_table() {
        assert_eq!(level_to_name(1), "Critical");
        assert_eq!(level_to_name(2), "Error");
        assert_eq!(level_to_name(3), "Warning");
        assert_eq!(level_to_name(4), "Information");
        assert_eq!(level_to_name(5), "Verbose");
        assert_eq!(level_to_name(99), "Unknown");
    }
}
