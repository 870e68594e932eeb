// EventDash - platform/win_event_log.rs
//
// Live Windows event-log source: queries a channel newest-first through
// the Win32 event API and yields rendered records as raw events.
//
// Failure mapping at the query boundary follows the channel-scoped error
// taxonomy (not found / access denied / other OS code); render and XML
// failures on individual records surface as record-scoped errors the
// fetcher skips.

use crate::core::event_xml;
use crate::core::fetch::{EventCursor, EventSource, RawEvent};
use crate::util::constants;
use crate::util::error::FetchError;
use std::collections::VecDeque;
use windows_sys::Win32::Foundation::{
    GetLastError, ERROR_ACCESS_DENIED, ERROR_EVT_CHANNEL_NOT_FOUND, ERROR_NO_MORE_ITEMS,
    ERROR_TIMEOUT,
};
use windows_sys::Win32::System::EventLog::{
    EvtClose, EvtNext, EvtQuery, EvtQueryChannelPath, EvtQueryReverseDirection, EvtRender,
    EvtRenderEventXml, EVT_HANDLE,
};

/// Owned event API handle, closed on drop.
struct EvtHandle(EVT_HANDLE);

impl Drop for EvtHandle {
    fn drop(&mut self) {
        if self.0 != 0 {
            unsafe {
                EvtClose(self.0);
            }
        }
    }
}

/// NUL-terminated UTF-16 for the Win32 API.
fn to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The live Windows event log.
#[derive(Debug, Default)]
pub struct WinEventLog;

impl WinEventLog {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for WinEventLog {
    fn query(&self, channel: &str) -> Result<EventCursor<'_>, FetchError> {
        let path = to_utf16(channel);
        let selector = to_utf16("*");

        // Reverse direction gives newest-first read order, so the bounded
        // fetch sees the most recent records without draining the channel.
        let handle = unsafe {
            EvtQuery(
                0,
                path.as_ptr(),
                selector.as_ptr(),
                EvtQueryChannelPath | EvtQueryReverseDirection,
            )
        };
        if handle == 0 {
            let code = unsafe { GetLastError() };
            return Err(match code {
                ERROR_EVT_CHANNEL_NOT_FOUND => FetchError::ChannelNotFound {
                    channel: channel.to_string(),
                },
                ERROR_ACCESS_DENIED => FetchError::AccessDenied {
                    channel: channel.to_string(),
                },
                _ => FetchError::Query {
                    channel: channel.to_string(),
                    code,
                },
            });
        }

        Ok(Box::new(ChannelCursor {
            query: EvtHandle(handle),
            channel: channel.to_string(),
            batch: VecDeque::new(),
            exhausted: false,
        }))
    }
}

/// Newest-first cursor over one channel, pulling event handles from the
/// OS in batches.
struct ChannelCursor {
    query: EvtHandle,
    channel: String,
    batch: VecDeque<EvtHandle>,
    exhausted: bool,
}

impl ChannelCursor {
    /// Pull the next batch of event handles. Sets `exhausted` at end of
    /// stream; returns an error only for unexpected OS failures.
    fn fill_batch(&mut self) -> Result<(), FetchError> {
        let mut handles: [EVT_HANDLE; constants::EVENT_READ_BATCH] =
            [0; constants::EVENT_READ_BATCH];
        let mut returned: u32 = 0;

        let ok = unsafe {
            EvtNext(
                self.query.0,
                handles.len() as u32,
                handles.as_mut_ptr(),
                constants::EVENT_READ_TIMEOUT_MS,
                0,
                &mut returned,
            )
        };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            self.exhausted = true;
            if code == ERROR_NO_MORE_ITEMS || code == ERROR_TIMEOUT || code == 0 {
                return Ok(());
            }
            return Err(FetchError::Query {
                channel: self.channel.clone(),
                code,
            });
        }

        for &handle in handles.iter().take(returned as usize) {
            self.batch.push_back(EvtHandle(handle));
        }
        if returned == 0 {
            self.exhausted = true;
        }
        Ok(())
    }

    /// Render one event to XML and parse it. The handle is closed when the
    /// guard drops, whatever the outcome.
    fn render_and_parse(&self, event: EvtHandle) -> Result<RawEvent, FetchError> {
        let Some(xml) = render_xml(event.0) else {
            return Err(FetchError::Render {
                channel: self.channel.clone(),
            });
        };
        event_xml::parse_rendered_event(&xml, &self.channel)
    }
}

impl Iterator for ChannelCursor {
    type Item = Result<RawEvent, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.batch.pop_front() {
                return Some(self.render_and_parse(event));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fill_batch() {
                return Some(Err(e));
            }
        }
    }
}

/// Two-call `EvtRender`: size probe, then the actual render into a UTF-16
/// buffer. Returns `None` when the OS cannot render the event.
fn render_xml(event: EVT_HANDLE) -> Option<String> {
    let mut used: u32 = 0;
    let mut property_count: u32 = 0;

    let ok = unsafe {
        EvtRender(
            0,
            event,
            EvtRenderEventXml,
            0,
            std::ptr::null_mut(),
            &mut used,
            &mut property_count,
        )
    };
    let needed = if ok == 0 { used } else { 0 };
    if needed == 0 {
        return None;
    }

    let mut buffer: Vec<u16> = vec![0u16; (needed as usize).div_ceil(2)];
    let ok = unsafe {
        EvtRender(
            0,
            event,
            EvtRenderEventXml,
            needed,
            buffer.as_mut_ptr().cast(),
            &mut used,
            &mut property_count,
        )
    };
    if ok == 0 {
        return None;
    }

    let rendered = String::from_utf16_lossy(&buffer);
    Some(rendered.trim_matches(char::from(0)).to_string())
}
