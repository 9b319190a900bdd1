//! Splitting raw network reads back into one packet per frame

use tracing::{debug, trace};

use crate::recording::Frame;

/// Length of the prefix preceding every packet
const PREFIX_LEN: usize = 2;

/// Packets recovered from a sequence of raw reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reassembled {
    /// One frame per packet, stamped with the time of the read holding its length prefix
    pub frames: Vec<Frame>,

    /// Bytes at the end of the stream that do not form a complete packet
    pub dangling: usize,
}

/// Concatenate `raw` and split the result on the packet length prefixes
///
/// Packets with a zero length prefix carry nothing and are dropped.
pub fn reassemble(raw: &[Frame]) -> Reassembled {
    let mut buffer = Vec::with_capacity(raw.iter().map(|frame| frame.data.len()).sum());
    // (offset into buffer, time) for every read that contributed data
    let mut starts = Vec::with_capacity(raw.len());
    for frame in raw.iter().filter(|frame| !frame.data.is_empty()) {
        starts.push((buffer.len(), frame.time));
        buffer.extend_from_slice(&frame.data);
    }

    let time_at = |offset: usize| {
        let index = starts.partition_point(|(start, _)| *start <= offset);
        starts[index.saturating_sub(1)].1
    };

    let mut frames = Vec::with_capacity(raw.len());
    let mut offset = 0;
    while buffer.len() - offset >= PREFIX_LEN {
        let length = usize::from(u16::from_le_bytes([buffer[offset], buffer[offset + 1]]));
        let start = offset + PREFIX_LEN;
        let end = start + length;
        if end > buffer.len() {
            break;
        }

        if length == 0 {
            trace!(offset, "skipping empty packet");
        } else {
            frames.push(Frame::new(time_at(offset), &buffer[start..end]));
        }

        offset = end;
    }

    let dangling = buffer.len() - offset;
    if dangling > 0 {
        debug!(dangling, "incomplete packet at end of stream");
    }

    Reassembled { frames, dangling }
}

/// Move every timestamp so the first frame starts at zero
pub(crate) fn rebase_times(frames: &mut [Frame]) {
    let Some(first) = frames.first().map(|frame| frame.time) else {
        return;
    };

    for frame in frames.iter_mut() {
        frame.time = frame.time.saturating_sub(first);
    }
}
